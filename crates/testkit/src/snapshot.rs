//! Canonical JSON for comparing independently built worlds.
//!
//! Values are serialized with object keys sorted so two peers that hold the
//! same state produce byte-identical text, whatever map types they used.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Serialize `value` as pretty JSON with object keys sorted.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let value = canonicalize_value(value);
    let mut s = serde_json::to_string_pretty(&value).context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

/// blake3 hex digest of the canonical JSON of `value`.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String> {
    let json = canonical_json(value)?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

/// Fail when the canonical forms of `left` and `right` differ.
pub fn assert_same_json<A: Serialize, B: Serialize>(left: &A, right: &B) -> Result<()> {
    let left = canonical_json(left)?;
    let right = canonical_json(right)?;
    if left != right {
        let line = left
            .lines()
            .zip(right.lines())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| left.lines().count().min(right.lines().count()))
            + 1;
        anyhow::bail!("Canonical JSON differs (first difference at line {line})");
    }
    Ok(())
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}
