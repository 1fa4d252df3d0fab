//! cavewar - deterministic destructible-cave arena simulation
//!
//! Headless runner: several peers share one room over an in-process hub,
//! shoot at the walls and check that their terrains stay identical.

mod config;
mod headless;

use anyhow::Result;
use clap::Parser;
use config::{ArenaConfig, DEFAULT_ARENA_PATH};
use headless::{HeadlessConfig, HeadlessReport};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless multi-peer cave arena simulation", long_about = None)]
struct Cli {
    /// Room name; every peer derives the level seed from it
    #[arg(short, long, default_value = "room1")]
    room: String,

    /// Scripted simulation ticks (60 per second)
    #[arg(short, long, default_value_t = 1800)]
    ticks: u64,

    /// Number of peers in the room
    #[arg(short, long, default_value_t = 2)]
    peers: u32,

    /// Arena configuration (TOML)
    #[arg(short, long, default_value = DEFAULT_ARENA_PATH)]
    config: PathBuf,

    /// Write terrain events as JSON lines to this path
    #[arg(long)]
    events: Option<PathBuf>,

    /// Ticks between shots, peers taking turns
    #[arg(long, default_value_t = 10)]
    shot_interval: u64,

    /// Probability of dropping an unreliable frame
    #[arg(long, default_value_t = 0.0)]
    drop_rate: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting cavewar v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let arena = ArenaConfig::load_from_path(&cli.config);
    if !(0.0..=1.0).contains(&cli.drop_rate) {
        anyhow::bail!("--drop-rate must be within 0..=1, got {}", cli.drop_rate);
    }

    let report = headless::run(HeadlessConfig {
        room: cli.room,
        ticks: cli.ticks,
        peers: cli.peers,
        level: arena.level(),
        shot_interval: cli.shot_interval,
        drop_rate: cli.drop_rate,
        event_log: cli.events,
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &HeadlessReport) {
    println!(
        "room {} (seed {}, theme {}) after {} ticks",
        report.room, report.seed, report.theme, report.ticks
    );
    for peer in &report.peers {
        println!(
            "  peer {}: {} live, {} destroyed, {} hits, {} remote applied, {} remote ignored, digest {}",
            peer.peer,
            peer.live,
            peer.destroyed,
            peer.local_hits,
            peer.remote_applied,
            peer.remote_ignored,
            &peer.digest[..12.min(peer.digest.len())]
        );
    }
    println!(
        "terrains {}",
        if report.converged { "identical" } else { "DIVERGED" }
    );
    if report.events_logged > 0 {
        println!("{} events logged", report.events_logged);
    }
}
