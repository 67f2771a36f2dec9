// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). The deep
//! nesting line carries the advisory text verbatim, so piping the sink to
//! stderr gives the usual development warning.

use std::io::Write;

use sheaf_core::trace::{
    CommitSummary, DeepNestingEvent, RegisterEvent, TraceSink, UnregisterEvent, UnregisterReason,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn reason_name(reason: UnregisterReason) -> &'static str {
    match reason {
        UnregisterReason::Closed => "closed",
        UnregisterReason::Unmounted => "unmounted",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_register(&mut self, e: &RegisterEvent) {
        let _ = writeln!(
            self.writer,
            "[register] commit={} sheet={}@gen{} depth={} deepest={}",
            e.commit_index, e.sheet, e.generation, e.depth, e.deepest_open_depth,
        );
    }

    fn on_unregister(&mut self, e: &UnregisterEvent) {
        let _ = writeln!(
            self.writer,
            "[unregister] commit={} sheet={}@gen{} depth={} deepest={} reason={}",
            e.commit_index,
            e.sheet,
            e.generation,
            e.depth,
            e.deepest_open_depth,
            reason_name(e.reason),
        );
    }

    fn on_deep_nesting(&mut self, e: &DeepNestingEvent) {
        let _ = writeln!(self.writer, "[deep-nesting] {e}");
    }

    fn on_commit_summary(&mut self, s: &CommitSummary) {
        let _ = writeln!(
            self.writer,
            "[commit] commit={} +{} -{} open={} deepest={} geometry={}",
            s.commit_index,
            s.registered,
            s.unregistered,
            s.open_sheets,
            s.deepest_open_depth,
            s.geometry_updates,
        );
    }
}
