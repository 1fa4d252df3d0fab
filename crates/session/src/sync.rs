//! Terrain damage deltas between peers.
//!
//! Local damage is applied first and then broadcast. Receivers resolve the
//! segment by id, confirm it by identity within tolerance and fall back to an
//! identity scan; anything unresolved is dropped without reconciliation.

use cavewar_core::SimTick;
use cavewar_net::{PeerId, PeerMessage, SegmentRef, VoxelDamage};
use cavewar_physics::PhysicsWorld;
use cavewar_world::{DamageOutcome, SegmentId, SegmentIdentity, Terrain, FORCE_DESTROY};
use tracing::trace;

/// Wire reference for a segment.
pub fn segment_ref(id: SegmentId, identity: &SegmentIdentity) -> SegmentRef {
    SegmentRef {
        id: id.0,
        x: identity.x,
        y: identity.y,
        width: identity.width,
        height: identity.height,
    }
}

/// Messages announcing a local damage result.
///
/// A destroying hit is followed by a force-destroy delta so peers that lost
/// an earlier partial hit still remove the segment.
pub fn damage_messages(
    source: PeerId,
    id: SegmentId,
    identity: &SegmentIdentity,
    amount: f32,
    outcome: DamageOutcome,
) -> Vec<PeerMessage> {
    let segment = segment_ref(id, identity);
    let delta = |damage| {
        PeerMessage::VoxelDamage(VoxelDamage {
            source,
            segment,
            damage,
        })
    };
    match outcome {
        DamageOutcome::Damaged { .. } => vec![delta(amount)],
        DamageOutcome::Destroyed if amount >= FORCE_DESTROY => vec![delta(FORCE_DESTROY)],
        DamageOutcome::Destroyed => vec![delta(amount), delta(FORCE_DESTROY)],
        DamageOutcome::Ignored | DamageOutcome::Immune => Vec::new(),
    }
}

/// Apply a validated inbound delta to the local terrain.
pub fn apply_remote_damage<P: PhysicsWorld + ?Sized>(
    terrain: &mut Terrain,
    delta: &VoxelDamage,
    now: SimTick,
    physics: &mut P,
) -> DamageOutcome {
    let identity = SegmentIdentity::new(
        delta.segment.x,
        delta.segment.y,
        delta.segment.width,
        delta.segment.height,
    );
    match terrain.resolve(SegmentId(delta.segment.id), &identity) {
        Some(id) => terrain.apply_damage(id, delta.damage, now, physics),
        None => {
            trace!(id = delta.segment.id, source = delta.source, "no matching segment");
            DamageOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SegmentIdentity {
        SegmentIdentity::new(400.0, 208.0, 96.0, 32.0)
    }

    #[test]
    fn partial_hit_sends_one_delta() {
        let msgs = damage_messages(
            1,
            SegmentId(12),
            &identity(),
            10.0,
            DamageOutcome::Damaged { health: 40.0 },
        );
        assert_eq!(msgs.len(), 1);
        let PeerMessage::VoxelDamage(delta) = &msgs[0] else {
            panic!("expected damage delta");
        };
        assert_eq!(delta.damage, 10.0);
        assert_eq!(delta.segment.id, 12);
        assert_eq!(delta.segment.width, 96.0);
    }

    #[test]
    fn destroying_hit_adds_force_destroy() {
        let msgs = damage_messages(1, SegmentId(12), &identity(), 10.0, DamageOutcome::Destroyed);
        let amounts: Vec<f32> = msgs
            .iter()
            .filter_map(|m| match m {
                PeerMessage::VoxelDamage(d) => Some(d.damage),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![10.0, FORCE_DESTROY]);
    }

    #[test]
    fn nothing_sent_for_immune_or_missing() {
        for outcome in [DamageOutcome::Immune, DamageOutcome::Ignored] {
            assert!(damage_messages(1, SegmentId(0), &identity(), 10.0, outcome).is_empty());
        }
    }
}
