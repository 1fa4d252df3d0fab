//! Property-based tests for terrain damage.
//!
//! Critical invariants:
//! - Boundary segments never change or disappear, whatever the damage
//! - Destructible health only ever decreases until destruction
//! - A destroyed segment is recorded exactly once

use cavewar_core::{SimTick, Theme};
use cavewar_physics::{PhysicsWorld, StaticBodySet};
use cavewar_world::{
    build_level, DamageOutcome, DebrisField, DebrisSettings, LevelConfig, Terrain, FORCE_DESTROY,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn terrain(seed: i32) -> (Terrain, StaticBodySet) {
    let config = LevelConfig::default();
    let level = build_level(seed, Theme::Default, &config);
    let debris = DebrisField::new(DebrisSettings::default(), StdRng::seed_from_u64(0));
    let mut physics = StaticBodySet::new();
    let terrain = Terrain::from_level(level, &config, debris, &mut physics);
    (terrain, physics)
}

fn damage_amount() -> impl Strategy<Value = f32> {
    prop_oneof![
        0.0f32..200.0,
        Just(FORCE_DESTROY),
        FORCE_DESTROY..1.0e9,
        Just(f32::MAX),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn boundary_segments_are_immutable(
        seed in any::<i32>(),
        hits in prop::collection::vec((any::<prop::sample::Index>(), damage_amount()), 1..40),
    ) {
        let (mut terrain, mut physics) = terrain(seed);
        let boundaries: Vec<_> = terrain.segments().filter(|s| !s.is_voxel()).cloned().collect();
        prop_assert!(!boundaries.is_empty());

        for (tick, (index, amount)) in hits.into_iter().enumerate() {
            let target = index.get(&boundaries).id;
            let outcome = terrain.apply_damage(target, amount, SimTick(tick as u64), &mut physics);
            prop_assert_eq!(outcome, DamageOutcome::Immune);
        }
        for boundary in &boundaries {
            prop_assert_eq!(terrain.segment(boundary.id), Some(boundary));
        }
        prop_assert_eq!(terrain.destroyed_count(), 0);
        prop_assert_eq!(physics.body_count(), terrain.live_count());
    }

    #[test]
    fn destructible_health_is_monotonic(
        seed in any::<i32>(),
        pick in any::<prop::sample::Index>(),
        hits in prop::collection::vec(damage_amount(), 1..20),
    ) {
        let (mut terrain, mut physics) = terrain(seed);
        let voxels: Vec<_> = terrain.segments().filter(|s| s.is_voxel()).map(|s| s.id).collect();
        let id = *pick.get(&voxels);
        let mut last = 50.0f32;
        let mut destroyed = false;

        for (tick, amount) in hits.into_iter().enumerate() {
            match terrain.apply_damage(id, amount, SimTick(tick as u64), &mut physics) {
                DamageOutcome::Damaged { health } => {
                    prop_assert!(!destroyed);
                    prop_assert!(health <= last && health > 0.0);
                    last = health;
                }
                DamageOutcome::Destroyed => {
                    prop_assert!(!destroyed);
                    destroyed = true;
                }
                DamageOutcome::Ignored => prop_assert!(destroyed),
                DamageOutcome::Immune => prop_assert!(false, "voxel reported immune"),
            }
        }
        prop_assert_eq!(terrain.destroyed_count(), usize::from(destroyed));
    }
}
