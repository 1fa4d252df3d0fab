#![warn(missing_docs)]
//! Deterministic testing surfaces: JSONL event logs, metrics reports and
//! canonical JSON for comparing peer worlds.

mod metrics;
mod micro_worldtest;
mod snapshot;

use anyhow::{Context, Result};
use cavewar_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use metrics::*;
pub use micro_worldtest::*;
pub use snapshot::*;

/// One line of a headless run's event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a, T: Serialize> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Peer that observed the event.
    pub peer: u32,
    /// Short kind label (`damage`, `destroyed`, `regenerated`, ...).
    pub kind: &'a str,
    /// Structured payload.
    pub payload: T,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    writer: BufWriter<File>,
    lines: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("creating event log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    /// Append an event to the log.
    pub fn write<T: Serialize>(&mut self, event: &EventRecord<'_, T>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flushing event log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Hit {
        segment: u32,
        damage: f32,
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("events.jsonl");
        let mut sink = JsonlSink::create(&path).expect("sink create");
        for tick in 0..3 {
            sink.write(&EventRecord {
                tick: SimTick(tick),
                peer: 1,
                kind: "damage",
                payload: Hit {
                    segment: 42,
                    damage: 10.0,
                },
            })
            .expect("write succeeds");
        }
        sink.flush().expect("flush");
        assert_eq!(sink.lines(), 3);
        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["kind"], "damage");
        assert_eq!(first["payload"]["segment"], 42);
    }
}
