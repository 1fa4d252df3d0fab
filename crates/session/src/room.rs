//! One peer's view of a room: terrain, players and the link to other peers.

use cavewar_core::{scoped_rng, RoomSeed, SimTick, Theme};
use cavewar_net::{
    LinkStats, NetError, PeerId, PeerLink, PeerMessage, SchemaHash, Transport, PROTOCOL_VERSION,
};
use cavewar_physics::{PhysicsWorld, StaticBodySet};
use cavewar_world::{
    build_level, DamageOutcome, DebrisField, LevelConfig, SegmentId, Terrain, TerrainEvent,
    TerrainSnapshot,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::combat::{
    wall_contacts, Projectile, ProjectileKind, EXPLOSION_RADIUS, EXPLOSION_WALL_DAMAGE,
};
use crate::players::{PlayerRegistry, PlayerState};
use crate::sync::{apply_remote_damage, damage_messages};

/// RNG domain of the cosmetic debris stream.
pub const DEBRIS_DOMAIN: u64 = 0xDEB;

/// Room activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStats {
    /// Local damage applications (bullet hits and explosion targets).
    pub local_hits: u64,
    /// Inbound deltas that matched a live segment.
    pub remote_applied: u64,
    /// Inbound deltas with no matching live segment.
    pub remote_ignored: u64,
    /// Peers that announced a different seed.
    pub seed_mismatches: u64,
    /// Room rebuilds after the initial join.
    pub rebuilds: u64,
}

/// A joined room.
pub struct Room<T> {
    config: LevelConfig,
    room: RoomSeed,
    physics: StaticBodySet,
    terrain: Terrain,
    link: PeerLink<T>,
    players: PlayerRegistry,
    now: SimTick,
    stats: RoomStats,
}

fn build_terrain(room: &RoomSeed, config: &LevelConfig, physics: &mut StaticBodySet) -> Terrain {
    let theme = Theme::from_room_name(&room.name);
    let level = build_level(room.seed, theme, config);
    let debris = DebrisField::new(
        config.debris.clone(),
        scoped_rng(room.seed, DEBRIS_DOMAIN, SimTick::ZERO),
    );
    Terrain::from_level(level, config, debris, physics)
}

impl<T: Transport> Room<T> {
    /// Derive the seed from `name`, build the terrain and announce ourselves.
    #[instrument(skip(config, transport), fields(peer = transport.local_peer()))]
    pub fn join(
        name: &str,
        config: LevelConfig,
        transport: T,
        spawn: Vec2,
    ) -> Result<Self, NetError> {
        let room = RoomSeed::derive(name);
        let mut physics = StaticBodySet::new();
        let terrain = build_terrain(&room, &config, &mut physics);
        let link = PeerLink::new(transport);
        let players = PlayerRegistry::new(link.local_peer(), PlayerState::at(spawn));
        info!(room = %room.name, seed = room.seed, theme = terrain.theme().as_str(), "joined room");

        let mut this = Self {
            config,
            room,
            physics,
            terrain,
            link,
            players,
            now: SimTick::ZERO,
            stats: RoomStats::default(),
        };
        this.announce()?;
        Ok(this)
    }

    fn announce(&mut self) -> Result<(), NetError> {
        let position = self
            .players
            .local()
            .map(|p| p.position)
            .unwrap_or(Vec2::ZERO);
        self.link.send(&PeerMessage::Join {
            player: self.link.local_peer(),
            version: PROTOCOL_VERSION,
            schema_hash: SchemaHash::current().0,
            seed: self.room.seed,
            x: position.x,
            y: position.y,
        })
    }

    /// Leave the current room and join `name` over `transport`.
    ///
    /// Every body, pending regeneration, particle and remote player of the
    /// old room is discarded before the new level is built.
    #[instrument(skip(self, transport), fields(from = %self.room.name))]
    pub fn change_room(&mut self, name: &str, transport: T) -> Result<(), NetError> {
        self.send_best_effort(PeerMessage::Leave {
            player: self.link.local_peer(),
        });
        self.terrain.clear(&mut self.physics);
        self.physics.clear();
        self.players.clear_remote();

        self.room = RoomSeed::derive(name);
        self.terrain = build_terrain(&self.room, &self.config, &mut self.physics);
        self.link = PeerLink::new(transport);
        self.stats.rebuilds += 1;
        info!(room = %self.room.name, seed = self.room.seed, "room rebuilt");
        self.announce()
    }

    /// Announce departure and drop the room.
    pub fn leave(mut self) {
        self.send_best_effort(PeerMessage::Leave {
            player: self.link.local_peer(),
        });
    }

    /// Update and broadcast the local player's state.
    pub fn move_local(&mut self, position: Vec2, crouching: bool) -> Result<(), NetError> {
        let local = self.link.local_peer();
        let msg = PeerMessage::PlayerState {
            player: local,
            x: position.x,
            y: position.y,
            crouching,
        };
        msg.verify().map_err(NetError::Invalid)?;
        self.players.upsert(local, PlayerState { position, crouching });
        self.link.send(&msg)
    }

    /// Apply wall contacts of projectiles in flight.
    ///
    /// Returns the indices of projectiles that touched a wall. Terrain is
    /// only changed for locally owned projectiles; peers report their own.
    pub fn resolve_projectiles(&mut self, projectiles: &[Projectile]) -> Vec<usize> {
        let mut consumed: Vec<usize> = Vec::new();
        for contact in wall_contacts(&self.physics, projectiles) {
            if consumed.contains(&contact.probe) {
                continue;
            }
            let Some(id) = self.terrain.segment_for_body(contact.body) else {
                continue;
            };
            let projectile = projectiles[contact.probe];
            consumed.push(contact.probe);
            if projectile.owner != self.link.local_peer() {
                continue;
            }
            match projectile.kind {
                ProjectileKind::Bullet { damage } => {
                    self.hit_segment(id, damage);
                }
                ProjectileKind::Rocket => {
                    self.explode(projectile.position);
                }
            }
        }
        consumed
    }

    /// Damage one segment locally and broadcast the result.
    pub fn hit_segment(&mut self, id: SegmentId, damage: f32) -> DamageOutcome {
        let Some(identity) = self.terrain.segment(id).map(|s| s.identity) else {
            return DamageOutcome::Ignored;
        };
        let outcome = self
            .terrain
            .apply_damage(id, damage, self.now, &mut self.physics);
        if matches!(outcome, DamageOutcome::Immune) {
            return outcome;
        }
        self.stats.local_hits += 1;
        for msg in damage_messages(self.link.local_peer(), id, &identity, damage, outcome) {
            self.send_best_effort(msg);
        }
        outcome
    }

    /// Detonate a rocket at `center`, damaging walls in range.
    pub fn explode(&mut self, center: Vec2) -> Vec<(SegmentId, DamageOutcome)> {
        let results = self.terrain.apply_explosion(
            center,
            EXPLOSION_RADIUS,
            EXPLOSION_WALL_DAMAGE,
            self.now,
            &mut self.physics,
        );
        let local = self.link.local_peer();
        let mut outcomes = Vec::with_capacity(results.len());
        for (id, damage, outcome) in results {
            self.stats.local_hits += 1;
            if let Some(identity) = self.terrain.identity_of(id) {
                for msg in damage_messages(local, id, &identity, damage, outcome) {
                    self.send_best_effort(msg);
                }
            }
            outcomes.push((id, outcome));
        }
        debug!(x = center.x, y = center.y, targets = outcomes.len(), "explosion");
        outcomes
    }

    /// Process inbound messages, run regeneration and advance one tick.
    #[instrument(skip(self), fields(tick = self.now.0, room = %self.room.name))]
    pub fn step(&mut self) -> Vec<TerrainEvent> {
        for (from, msg) in self.link.receive() {
            self.handle_message(from, msg);
        }
        let occupants = self.players.occupants();
        let restored = self.terrain.tick(self.now, &occupants, &mut self.physics);
        if restored > 0 {
            debug!(restored, "segments regenerated");
        }
        self.now = self.now.advance(1);
        self.terrain.drain_events()
    }

    fn handle_message(&mut self, from: PeerId, msg: PeerMessage) {
        match msg {
            PeerMessage::Join {
                player,
                version,
                schema_hash,
                seed,
                x,
                y,
            } => {
                if player != from {
                    warn!(from, player, "join for another peer ignored");
                    return;
                }
                if version != PROTOCOL_VERSION || !SchemaHash::current().compatible_with(schema_hash)
                {
                    warn!(from, version, "peer speaks a different protocol");
                }
                if seed != self.room.seed {
                    self.stats.seed_mismatches += 1;
                    warn!(from, theirs = seed, ours = self.room.seed, "peer seed differs; terrain will desync");
                }
                self.players.upsert(from, PlayerState::at(Vec2::new(x, y)));
                info!(from, players = self.players.len(), "peer joined");
                if let Some(local) = self.players.local().copied() {
                    self.send_best_effort(PeerMessage::PlayerState {
                        player: self.link.local_peer(),
                        x: local.position.x,
                        y: local.position.y,
                        crouching: local.crouching,
                    });
                }
            }
            PeerMessage::PlayerState {
                player,
                x,
                y,
                crouching,
            } => {
                if player != from {
                    warn!(from, player, "state for another peer ignored");
                    return;
                }
                self.players.upsert(
                    from,
                    PlayerState {
                        position: Vec2::new(x, y),
                        crouching,
                    },
                );
            }
            PeerMessage::VoxelDamage(delta) => {
                let outcome =
                    apply_remote_damage(&mut self.terrain, &delta, self.now, &mut self.physics);
                match outcome {
                    DamageOutcome::Damaged { .. } | DamageOutcome::Destroyed => {
                        self.stats.remote_applied += 1;
                    }
                    DamageOutcome::Ignored | DamageOutcome::Immune => {
                        self.stats.remote_ignored += 1;
                    }
                }
            }
            PeerMessage::Leave { player } => {
                if player != from {
                    warn!(from, player, "leave for another peer ignored");
                    return;
                }
                if self.players.remove(from).is_some() {
                    info!(from, "peer left");
                }
            }
        }
    }

    fn send_best_effort(&mut self, msg: PeerMessage) {
        if let Err(err) = self.link.send(&msg) {
            warn!(%err, channel = msg.channel().name(), "broadcast failed");
        }
    }

    /// Sanitised room name.
    pub fn name(&self) -> &str {
        &self.room.name
    }

    /// Level seed.
    pub fn seed(&self) -> i32 {
        self.room.seed
    }

    /// Identifier of the local peer.
    pub fn local_peer(&self) -> PeerId {
        self.link.local_peer()
    }

    /// Current tick.
    pub fn now(&self) -> SimTick {
        self.now
    }

    /// Live terrain.
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Static bodies of the room.
    pub fn physics(&self) -> &StaticBodySet {
        &self.physics
    }

    /// Known players.
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// Level configuration in use.
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Room counters.
    pub fn stats(&self) -> RoomStats {
        self.stats
    }

    /// Link counters.
    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }

    /// Comparable view of the terrain.
    pub fn snapshot(&self) -> TerrainSnapshot {
        self.terrain.snapshot()
    }
}
