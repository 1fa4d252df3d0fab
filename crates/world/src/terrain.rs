//! Live terrain: segment health, destruction and timed regeneration.

use std::collections::BTreeMap;

use cavewar_core::{SimTick, Theme};
use cavewar_physics::{BodyHandle, Circle, CollisionCategory, PhysicsWorld};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::debris::DebrisField;
use crate::level::{Level, LevelConfig};
use crate::segment::{Segment, SegmentId, SegmentIdentity, SegmentKind, IDENTITY_TOLERANCE};

/// Damage at or above this value destroys a segment outright.
pub const FORCE_DESTROY: f32 = 9999.0;

/// What a damage call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// No live segment with that id (already destroyed or never existed).
    Ignored,
    /// Boundary segment; nothing changed.
    Immune,
    /// Health dropped but the segment survives.
    Damaged { health: f32 },
    /// The segment was removed and queued for regeneration.
    Destroyed,
}

/// Pending regeneration of a destroyed segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyedRecord {
    pub identity: SegmentIdentity,
    pub theme: Theme,
    pub max_health: f32,
    pub regenerate_at: SimTick,
}

/// Terrain lifecycle notifications, drained by the owner each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerrainEvent {
    Damaged { id: SegmentId, amount: f32, health: f32 },
    Destroyed { id: SegmentId },
    Regenerated { id: SegmentId },
    RegenerationDeferred { id: SegmentId },
}

/// Serializable view of the terrain for cross-peer comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub live: Vec<SegmentSnapshot>,
    pub destroyed: Vec<SegmentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    pub id: SegmentId,
    pub identity: SegmentIdentity,
    pub kind: SegmentKind,
}

/// The live wall set of one room.
pub struct Terrain {
    seed: i32,
    theme: Theme,
    regeneration_ticks: u64,
    segments: BTreeMap<SegmentId, Segment>,
    destroyed: BTreeMap<SegmentId, DestroyedRecord>,
    debris: DebrisField,
    events: Vec<TerrainEvent>,
}

impl Terrain {
    /// Load a generated level, inserting one static body per segment.
    pub fn from_level<P: PhysicsWorld + ?Sized>(
        level: Level,
        config: &LevelConfig,
        debris: DebrisField,
        physics: &mut P,
    ) -> Self {
        let mut segments = BTreeMap::new();
        for mut segment in level.segments {
            let body = physics.add_static_body(segment.identity.rect(), CollisionCategory::WALL);
            segment.body = Some(body);
            segments.insert(segment.id, segment);
        }
        info!(seed = level.seed, segments = segments.len(), "terrain loaded");
        Self {
            seed: level.seed,
            theme: level.theme,
            regeneration_ticks: config.regeneration_ticks(),
            segments,
            destroyed: BTreeMap::new(),
            debris,
            events: Vec::new(),
        }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Live segments in id order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    pub fn live_count(&self) -> usize {
        self.segments.len()
    }

    pub fn destructible_count(&self) -> usize {
        self.segments.values().filter(|s| s.is_voxel()).count()
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed.len()
    }

    pub fn destroyed(&self) -> impl Iterator<Item = (SegmentId, &DestroyedRecord)> {
        self.destroyed.iter().map(|(id, record)| (*id, record))
    }

    pub fn is_destroyed(&self, id: SegmentId) -> bool {
        self.destroyed.contains_key(&id)
    }

    pub fn debris(&self) -> &DebrisField {
        &self.debris
    }

    /// Live segment owning a physics body.
    pub fn segment_for_body(&self, body: BodyHandle) -> Option<SegmentId> {
        self.segments
            .values()
            .find(|s| s.body == Some(body))
            .map(|s| s.id)
    }

    /// Identity of a live or pending-regeneration segment.
    pub fn identity_of(&self, id: SegmentId) -> Option<SegmentIdentity> {
        self.segments
            .get(&id)
            .map(|s| s.identity)
            .or_else(|| self.destroyed.get(&id).map(|r| r.identity))
    }

    /// Live segment whose identity matches within tolerance.
    pub fn find_by_identity(&self, identity: &SegmentIdentity) -> Option<SegmentId> {
        self.segments
            .values()
            .find(|s| s.identity.matches(identity, IDENTITY_TOLERANCE))
            .map(|s| s.id)
    }

    /// Resolve a remote reference: the id is trusted when its identity
    /// agrees, otherwise fall back to an identity scan.
    pub fn resolve(&self, id: SegmentId, identity: &SegmentIdentity) -> Option<SegmentId> {
        match self.segments.get(&id) {
            Some(segment) if segment.identity.matches(identity, IDENTITY_TOLERANCE) => Some(id),
            _ => self.find_by_identity(identity),
        }
    }

    /// Apply `amount` damage to a live segment.
    pub fn apply_damage<P: PhysicsWorld + ?Sized>(
        &mut self,
        id: SegmentId,
        amount: f32,
        now: SimTick,
        physics: &mut P,
    ) -> DamageOutcome {
        let Some(segment) = self.segments.get_mut(&id) else {
            trace!(?id, "damage for unknown segment ignored");
            return DamageOutcome::Ignored;
        };
        let SegmentKind::Destructible { health, .. } = &mut segment.kind else {
            return DamageOutcome::Immune;
        };
        let center = segment.identity.center();
        if amount >= FORCE_DESTROY {
            *health = 0.0;
        } else {
            *health -= amount;
            let remaining = *health;
            self.debris.damage_burst(center, amount);
            self.events.push(TerrainEvent::Damaged {
                id,
                amount,
                health: remaining,
            });
            if remaining > 0.0 {
                return DamageOutcome::Damaged { health: remaining };
            }
        }
        self.destroy(id, now, physics);
        DamageOutcome::Destroyed
    }

    fn destroy<P: PhysicsWorld + ?Sized>(&mut self, id: SegmentId, now: SimTick, physics: &mut P) {
        let max_health = match self.segments.get(&id).map(|s| s.kind) {
            Some(SegmentKind::Destructible { max_health, .. }) => max_health,
            _ => return,
        };
        let Some(segment) = self.segments.remove(&id) else {
            return;
        };
        if let Some(body) = segment.body {
            physics.remove_body(body);
        }
        self.debris.destroy_burst(segment.identity.center());
        self.destroyed.insert(
            id,
            DestroyedRecord {
                identity: segment.identity,
                theme: segment.theme,
                max_health,
                regenerate_at: now.advance(self.regeneration_ticks),
            },
        );
        self.events.push(TerrainEvent::Destroyed { id });
        debug!(?id, x = segment.identity.x, y = segment.identity.y, "segment destroyed");
    }

    /// Damage every live destructible segment whose centre lies within
    /// `radius` of `center`, with linear falloff from `max_damage`.
    pub fn apply_explosion<P: PhysicsWorld + ?Sized>(
        &mut self,
        center: Vec2,
        radius: f32,
        max_damage: f32,
        now: SimTick,
        physics: &mut P,
    ) -> Vec<(SegmentId, f32, DamageOutcome)> {
        let targets: Vec<(SegmentId, f32)> = self
            .segments
            .values()
            .filter(|s| s.is_voxel())
            .filter_map(|s| {
                let distance = s.identity.center().distance(center);
                (distance < radius).then(|| (s.id, max_damage * (1.0 - distance / radius)))
            })
            .collect();
        targets
            .into_iter()
            .map(|(id, damage)| (id, damage, self.apply_damage(id, damage, now, physics)))
            .collect()
    }

    /// Bring back every due record that no occupant overlaps.
    ///
    /// Blocked records stay queued and are retried on the next call.
    pub fn regenerate<P: PhysicsWorld + ?Sized>(
        &mut self,
        now: SimTick,
        occupants: &[Circle],
        physics: &mut P,
    ) -> usize {
        let due: Vec<SegmentId> = self
            .destroyed
            .iter()
            .filter(|(_, record)| now >= record.regenerate_at)
            .map(|(id, _)| *id)
            .collect();
        let mut restored = 0;
        for id in due {
            let Some(record) = self.destroyed.get(&id).copied() else {
                continue;
            };
            let bounds = record.identity.rect();
            if occupants.iter().any(|c| bounds.intersects_circle(c)) {
                self.events.push(TerrainEvent::RegenerationDeferred { id });
                trace!(?id, "regeneration blocked by occupant");
                continue;
            }
            self.destroyed.remove(&id);
            let mut segment =
                Segment::destructible(id, record.identity, record.theme, record.max_health);
            segment.body = Some(physics.add_static_body(bounds, CollisionCategory::WALL));
            self.segments.insert(id, segment);
            self.events.push(TerrainEvent::Regenerated { id });
            debug!(?id, "segment regenerated");
            restored += 1;
        }
        restored
    }

    /// Per-tick housekeeping: regeneration and debris.
    pub fn tick<P: PhysicsWorld + ?Sized>(
        &mut self,
        now: SimTick,
        occupants: &[Circle],
        physics: &mut P,
    ) -> usize {
        self.debris.tick();
        self.regenerate(now, occupants, physics)
    }

    /// Remove every body and forget pending regenerations.
    pub fn clear<P: PhysicsWorld + ?Sized>(&mut self, physics: &mut P) {
        for segment in self.segments.values() {
            if let Some(body) = segment.body {
                physics.remove_body(body);
            }
        }
        let dropped = self.destroyed.len();
        self.segments.clear();
        self.destroyed.clear();
        self.debris.clear();
        self.events.clear();
        debug!(dropped_regenerations = dropped, "terrain cleared");
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<TerrainEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot {
            live: self
                .segments
                .values()
                .map(|s| SegmentSnapshot {
                    id: s.id,
                    identity: s.identity,
                    kind: s.kind,
                })
                .collect(),
            destroyed: self.destroyed.keys().copied().collect(),
        }
    }
}
