use anyhow::{Context, Result};
use cavewar_core::{scoped_rng, SimTick};
use cavewar_net::{LoopbackHub, LoopbackPeer, PeerId};
use cavewar_session::{Projectile, Room};
use cavewar_testkit::{canonical_digest, canonical_json, EventRecord, JsonlSink};
use cavewar_world::{LevelConfig, TerrainEvent};
use glam::Vec2;
use rand::{rngs::StdRng, seq::IteratorRandom, Rng};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// RNG domain of the scripted peers.
const SCRIPT_DOMAIN: u64 = 0x5C21;
/// Every n-th shot of a peer is a rocket.
const ROCKET_EVERY: u64 = 4;
/// Ticks between scripted position changes.
const MOVE_INTERVAL: u64 = 30;
/// Extra ticks after the script so in-flight deltas land.
const SETTLE_TICKS: u64 = 2;

pub struct HeadlessConfig {
    pub room: String,
    pub ticks: u64,
    pub peers: u32,
    pub level: LevelConfig,
    /// Ticks between shots across all peers; peers take turns.
    pub shot_interval: u64,
    /// Probability of losing an unreliable frame.
    pub drop_rate: f64,
    pub event_log: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct PeerSummary {
    pub peer: PeerId,
    pub live: usize,
    pub destroyed: usize,
    pub local_hits: u64,
    pub remote_applied: u64,
    pub remote_ignored: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub messages_rejected: u64,
    pub debris: usize,
    pub digest: String,
}

#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub room: String,
    pub seed: i32,
    pub theme: String,
    pub ticks: u64,
    pub peers: Vec<PeerSummary>,
    /// All peers hold identical terrain.
    pub converged: bool,
    pub events_logged: usize,
}

struct ScriptedPeer {
    room: Room<LoopbackPeer>,
    rng: StdRng,
    shots: u64,
}

impl ScriptedPeer {
    /// Fire at a random destructible wall of our own terrain.
    fn shoot(&mut self) {
        let Some(target) = self
            .room
            .terrain()
            .segments()
            .filter(|s| s.is_voxel())
            .map(|s| s.identity.center())
            .choose(&mut self.rng)
        else {
            return;
        };
        self.shots += 1;
        let owner = self.room.local_peer();
        let projectile = if self.shots % ROCKET_EVERY == 0 {
            Projectile::rocket(owner, target)
        } else {
            Projectile::bullet(owner, target)
        };
        self.room.resolve_projectiles(&[projectile]);
    }

    /// Stand on top of a random wall, sometimes crouched.
    fn wander(&mut self) -> Result<()> {
        let Some(perch) = self
            .room
            .terrain()
            .segments()
            .map(|s| Vec2::new(s.identity.x, s.identity.y - s.identity.height / 2.0 - 20.0))
            .choose(&mut self.rng)
        else {
            return Ok(());
        };
        let crouching = self.rng.gen_bool(0.3);
        self.room
            .move_local(perch, crouching)
            .context("broadcasting player state")
    }
}

fn event_kind(event: &TerrainEvent) -> &'static str {
    match event {
        TerrainEvent::Damaged { .. } => "damaged",
        TerrainEvent::Destroyed { .. } => "destroyed",
        TerrainEvent::Regenerated { .. } => "regenerated",
        TerrainEvent::RegenerationDeferred { .. } => "deferred",
    }
}

pub fn run(cfg: HeadlessConfig) -> Result<HeadlessReport> {
    let peers = cfg.peers.max(1);
    let hub = LoopbackHub::lossy(cfg.drop_rate, u64::from(peers));
    let mut sink = cfg
        .event_log
        .as_ref()
        .map(JsonlSink::create)
        .transpose()?;

    let mut scripted = Vec::with_capacity(peers as usize);
    for id in 1..=peers {
        let spawn = Vec2::new(-100.0 * id as f32, -100.0);
        let room = Room::join(&cfg.room, cfg.level.clone(), hub.connect(id), spawn)
            .with_context(|| format!("peer {id} joining {}", cfg.room))?;
        let rng = scoped_rng(room.seed(), SCRIPT_DOMAIN ^ u64::from(id), SimTick::ZERO);
        scripted.push(ScriptedPeer {
            room,
            rng,
            shots: 0,
        });
    }
    let first = &scripted[0].room;
    let (room_name, seed, theme) = (
        first.name().to_string(),
        first.seed(),
        first.terrain().theme().as_str().to_string(),
    );
    info!(room = %room_name, seed, peers, ticks = cfg.ticks, "headless run starting");

    let interval = cfg.shot_interval.max(1);
    let total = cfg.ticks + SETTLE_TICKS;
    for tick in 0..total {
        let scripted_phase = tick < cfg.ticks;
        // Local actions first; at most one peer shoots per tick so every
        // peer applies each delta in the same order.
        if scripted_phase && tick % interval == 0 {
            let shooter = ((tick / interval) % u64::from(peers)) as usize;
            scripted[shooter].shoot();
        }
        if scripted_phase && tick % MOVE_INTERVAL == 0 {
            for peer in &mut scripted {
                peer.wander()?;
            }
        }
        for peer in &mut scripted {
            let now = peer.room.now();
            let events = peer.room.step();
            if let Some(sink) = sink.as_mut() {
                for event in &events {
                    sink.write(&EventRecord {
                        tick: now,
                        peer: peer.room.local_peer(),
                        kind: event_kind(event),
                        payload: event,
                    })?;
                }
            }
        }
    }

    let mut summaries = Vec::with_capacity(scripted.len());
    let mut canonical = Vec::with_capacity(scripted.len());
    for peer in &scripted {
        let room = &peer.room;
        let snapshot = room.snapshot();
        canonical.push(canonical_json(&snapshot)?);
        let (stats, link) = (room.stats(), room.link_stats());
        summaries.push(PeerSummary {
            peer: room.local_peer(),
            live: room.terrain().live_count(),
            destroyed: room.terrain().destroyed_count(),
            local_hits: stats.local_hits,
            remote_applied: stats.remote_applied,
            remote_ignored: stats.remote_ignored,
            messages_sent: link.sent,
            messages_received: link.received,
            messages_rejected: link.rejected,
            debris: room.terrain().debris().live_count(),
            digest: canonical_digest(&snapshot)?,
        });
    }
    let converged = canonical.windows(2).all(|pair| pair[0] == pair[1]);
    if converged {
        debug!("all peer terrains identical");
    } else {
        warn!(drop_rate = cfg.drop_rate, "peer terrains diverged");
    }

    let events_logged = match sink.as_mut() {
        Some(sink) => {
            sink.flush()?;
            sink.lines()
        }
        None => 0,
    };

    Ok(HeadlessReport {
        room: room_name,
        seed,
        theme,
        ticks: cfg.ticks,
        peers: summaries,
        converged,
        events_logged,
    })
}
