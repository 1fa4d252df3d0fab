//! Micro-worldtest harness for deterministic, tick-based traces.
//!
//! A micro-worldtest steps a small simulation for a fixed number of ticks and
//! records a snapshot each tick. Running the same scenario twice and comparing
//! the digests checks that nothing outside the seed leaks into the run.

use crate::snapshot::canonical_digest;
use anyhow::Result;
use cavewar_core::SimTick;
use serde::Serialize;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Human-readable name (written into the report).
    pub name: String,
    /// Number of ticks to step (report includes the initial snapshot at tick 0).
    pub ticks: u64,
    /// Record a frame only every `stride` ticks (1 = every tick).
    pub stride: u64,
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Captured trace of a micro-worldtest.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Scenario name.
    pub name: String,
    /// Recorded frames in tick order.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

impl<S: Serialize> MicroWorldtestReport<S> {
    /// Canonical digest of the whole trace.
    pub fn digest(&self) -> Result<String> {
        canonical_digest(self)
    }
}

/// Run a micro-worldtest and return its trace.
///
/// Captures the initial snapshot at tick 0, then steps `config.ticks` times,
/// capturing a snapshot after every `stride`-th step and after the last one.
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> MicroWorldtestReport<Snapshot>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let stride = config.stride.max(1);
    let mut frames = Vec::new();

    let mut tick = SimTick::ZERO;
    frames.push(MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for i in 1..=config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        if i % stride == 0 || i == config.ticks {
            frames.push(MicroWorldtestFrame {
                tick: tick.0,
                snapshot: snapshot(tick, &state),
            });
        }
    }

    MicroWorldtestReport {
        name: config.name,
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(ticks: u64, stride: u64) -> MicroWorldtestReport<u64> {
        run_micro_worldtest(
            MicroWorldtestConfig {
                name: "counter".into(),
                ticks,
                stride,
            },
            0u64,
            |tick, state| *state += tick.0,
            |_, state| *state,
        )
    }

    #[test]
    fn frames_follow_stride() {
        let report = counter(10, 4);
        let ticks: Vec<u64> = report.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 4, 8, 10]);
        assert_eq!(report.frames.last().map(|f| f.snapshot), Some(45));
    }

    #[test]
    fn identical_runs_share_digest() {
        let a = counter(20, 1).digest().expect("digest");
        let b = counter(20, 1).digest().expect("digest");
        assert_eq!(a, b);
        assert_ne!(a, counter(21, 1).digest().expect("digest"));
    }
}
