//! Cosmetic debris bursts spawned when segments are hit or destroyed.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::ops::Range;

use glam::Vec2;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Upper bound on recycled particles kept for reuse.
pub const MAX_POOL_SIZE: usize = 200;
/// Particles emitted when a segment is destroyed.
pub const DESTROY_BURST: usize = 15;

const ANGLE_JITTER: f32 = 0.3;
const GRAVITY: f32 = 0.15;

/// Debris tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebrisSettings {
    pub enabled: bool,
    /// Multiplier on particle lifetimes.
    pub duration_scale: f32,
    /// Live particle cap; the oldest particle is evicted first.
    pub max_particles: usize,
}

impl Default for DebrisSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_scale: 3.0,
            max_particles: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// Remaining lifetime in ticks.
    pub life: u32,
}

struct Burst {
    count: usize,
    speed: Range<f32>,
    size: Range<f32>,
    life: Range<f32>,
}

/// Live debris plus a bounded recycling pool.
pub struct DebrisField {
    settings: DebrisSettings,
    live: VecDeque<Particle>,
    pool: Vec<Particle>,
    rng: StdRng,
}

impl DebrisField {
    /// `rng` must be independent of the level generator stream.
    pub fn new(settings: DebrisSettings, rng: StdRng) -> Self {
        Self {
            settings,
            live: VecDeque::new(),
            pool: Vec::new(),
            rng,
        }
    }

    pub fn settings(&self) -> &DebrisSettings {
        &self.settings
    }

    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.live.iter()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Small burst for a hit that did not destroy the segment.
    pub fn damage_burst(&mut self, at: Vec2, damage: f32) {
        let count = ((damage / 10.0).floor().max(0.0) as usize).max(3);
        self.emit(
            at,
            Burst {
                count,
                speed: 1.0..4.0,
                size: 1.0..3.0,
                life: 20.0..35.0,
            },
        );
    }

    /// Larger burst for a destroyed segment.
    pub fn destroy_burst(&mut self, at: Vec2) {
        self.emit(
            at,
            Burst {
                count: DESTROY_BURST,
                speed: 2.0..6.0,
                size: 2.0..5.0,
                life: 30.0..50.0,
            },
        );
    }

    fn emit(&mut self, at: Vec2, burst: Burst) {
        if !self.settings.enabled || self.settings.max_particles == 0 {
            return;
        }
        let step = TAU / burst.count as f32;
        for i in 0..burst.count {
            let angle = step * i as f32 + (self.rng.gen::<f32>() - 0.5) * ANGLE_JITTER;
            let speed = self.rng.gen_range(burst.speed.clone());
            let size = self.rng.gen_range(burst.size.clone());
            let life = self.rng.gen_range(burst.life.clone());
            while self.live.len() >= self.settings.max_particles {
                if let Some(oldest) = self.live.pop_front() {
                    self.recycle(oldest);
                }
            }
            let mut particle = self.pool.pop().unwrap_or(Particle {
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
                size: 0.0,
                life: 0,
            });
            particle.position = at;
            particle.velocity = Vec2::from_angle(angle) * speed;
            particle.size = size;
            particle.life = (life * self.settings.duration_scale).floor().max(1.0) as u32;
            self.live.push_back(particle);
        }
    }

    /// Advance every particle one tick and retire the expired ones.
    pub fn tick(&mut self) {
        let mut index = 0;
        while index < self.live.len() {
            let particle = &mut self.live[index];
            particle.position += particle.velocity;
            particle.velocity.y += GRAVITY;
            particle.life = particle.life.saturating_sub(1);
            if particle.life == 0 {
                if let Some(done) = self.live.remove(index) {
                    self.recycle(done);
                }
            } else {
                index += 1;
            }
        }
    }

    /// Drop every live particle (room teardown).
    pub fn clear(&mut self) {
        while let Some(particle) = self.live.pop_front() {
            self.recycle(particle);
        }
    }

    fn recycle(&mut self, particle: Particle) {
        if self.pool.len() < MAX_POOL_SIZE {
            self.pool.push(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn field(enabled: bool, cap: usize) -> DebrisField {
        DebrisField::new(
            DebrisSettings {
                enabled,
                duration_scale: 1.0,
                max_particles: cap,
            },
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn disabled_field_spawns_nothing() {
        let mut debris = field(false, 50);
        debris.destroy_burst(Vec2::ZERO);
        assert_eq!(debris.live_count(), 0);
    }

    #[test]
    fn damage_burst_scales_with_damage() {
        let mut debris = field(true, 500);
        debris.damage_burst(Vec2::ZERO, 10.0);
        assert_eq!(debris.live_count(), 3);
        debris.damage_burst(Vec2::ZERO, 60.0);
        assert_eq!(debris.live_count(), 9);
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut debris = field(true, 20);
        debris.destroy_burst(Vec2::ZERO);
        debris.destroy_burst(Vec2::new(100.0, 0.0));
        assert_eq!(debris.live_count(), 20);
        // Ten of the first burst were evicted; the newest fifteen remain.
        let newest = debris.live().filter(|p| p.position.x > 50.0).count();
        assert_eq!(newest, 15);
        assert_eq!(debris.pooled_count(), 0);
    }

    #[test]
    fn particles_expire_into_pool() {
        let mut debris = field(true, 50);
        debris.destroy_burst(Vec2::ZERO);
        for _ in 0..60 {
            debris.tick();
        }
        assert_eq!(debris.live_count(), 0);
        assert_eq!(debris.pooled_count(), DESTROY_BURST);
    }

    #[test]
    fn pool_is_bounded() {
        let mut debris = field(true, 1000);
        for _ in 0..20 {
            debris.destroy_burst(Vec2::ZERO);
        }
        debris.clear();
        assert_eq!(debris.live_count(), 0);
        assert_eq!(debris.pooled_count(), MAX_POOL_SIZE);
    }
}
