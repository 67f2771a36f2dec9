// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! The core has no clock, so commits are laid out on a synthetic timeline:
//! commit `n` starts at `n * COMMIT_SPACING_US`. Registrations become instant
//! events on a per-depth track, and every commit summary becomes a counter
//! sample of open sheets and the deepest open depth.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Distance between consecutive commits on the exported timeline, in
/// microseconds.
pub const COMMIT_SPACING_US: u64 = 1_000;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = commit_ts(recorded.commit_index());
        match recorded {
            RecordedEvent::Register(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Register",
                    "cat": "Registry",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.depth,
                    "s": "t",
                    "args": {
                        "sheet": e.sheet,
                        "generation": e.generation,
                        "depth": e.depth,
                        "deepest_open_depth": e.deepest_open_depth,
                    }
                }));
            }
            RecordedEvent::Unregister(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Unregister",
                    "cat": "Registry",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.depth,
                    "s": "t",
                    "args": {
                        "sheet": e.sheet,
                        "generation": e.generation,
                        "depth": e.depth,
                        "deepest_open_depth": e.deepest_open_depth,
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::DeepNesting(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "DeepNesting",
                    "cat": "Advisory",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "depth": e.depth,
                        "threshold": e.threshold,
                        "message": e.to_string(),
                    }
                }));
            }
            RecordedEvent::CommitSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Nesting",
                    "cat": "Commit",
                    "ts": ts,
                    "pid": 0,
                    "args": {
                        "open_sheets": s.open_sheets,
                        "deepest_open_depth": s.deepest_open_depth,
                    }
                }));
                events.push(json!({
                    "ph": "i",
                    "name": "CommitSummary",
                    "cat": "Commit",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "commit_index": s.commit_index,
                        "registered": s.registered,
                        "unregistered": s.unregistered,
                        "geometry_updates": s.geometry_updates,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn commit_ts(commit_index: u64) -> u64 {
    commit_index.saturating_mul(COMMIT_SPACING_US)
}
