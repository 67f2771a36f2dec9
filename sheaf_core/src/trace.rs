// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the commit phase.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`SheafStack::commit_traced`](crate::sheet::SheafStack::commit_traced)
//! calls as registrations change. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! The deep-nesting advisory is also returned in
//! [`SheetChanges::deep_nesting`](crate::sheet::SheetChanges::deep_nesting),
//! so it is observable with tracing compiled out.

use core::fmt;

use crate::sheet::DeepNesting;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a registration ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnregisterReason {
    /// The sheet's `open` flag became false.
    Closed,
    /// The sheet was unmounted while still registered.
    Unmounted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an open sheet is inserted into the registry.
#[derive(Clone, Copy, Debug)]
pub struct RegisterEvent {
    /// Monotonic commit counter.
    pub commit_index: u64,
    /// Raw slot index of the sheet.
    pub sheet: u32,
    /// Generation of the sheet's handle.
    pub generation: u32,
    /// Depth the sheet registered at.
    pub depth: u32,
    /// Deepest open depth right after the registration.
    pub deepest_open_depth: u32,
}

/// Emitted when a registration is removed.
#[derive(Clone, Copy, Debug)]
pub struct UnregisterEvent {
    /// Monotonic commit counter.
    pub commit_index: u64,
    /// Raw slot index of the sheet.
    pub sheet: u32,
    /// Generation of the sheet's handle.
    pub generation: u32,
    /// Depth the sheet was registered at.
    pub depth: u32,
    /// Deepest open depth right after the removal.
    pub deepest_open_depth: u32,
    /// What ended the registration.
    pub reason: UnregisterReason,
}

/// Emitted once each time the deepest open depth climbs above the safe
/// threshold.
#[derive(Clone, Copy, Debug)]
pub struct DeepNestingEvent {
    /// Monotonic commit counter.
    pub commit_index: u64,
    /// Deepest open depth that crossed the threshold.
    pub depth: u32,
    /// Configured threshold.
    pub threshold: u32,
}

impl DeepNestingEvent {
    /// The advisory this event carries.
    #[must_use]
    pub const fn advisory(&self) -> DeepNesting {
        DeepNesting {
            depth: self.depth,
            threshold: self.threshold,
        }
    }
}

impl fmt::Display for DeepNestingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.advisory(), f)
    }
}

/// Per-commit summary.
#[derive(Clone, Copy, Debug)]
pub struct CommitSummary {
    /// Monotonic commit counter.
    pub commit_index: u64,
    /// Registrations added by this commit.
    pub registered: u32,
    /// Registrations removed since the previous commit (closes and unmounts).
    pub unregistered: u32,
    /// Sheets registered after this commit.
    pub open_sheets: u32,
    /// Deepest open depth after this commit.
    pub deepest_open_depth: u32,
    /// Sheets whose geometry was recomputed.
    pub geometry_updates: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the commit phase.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a sheet is registered.
    fn on_register(&mut self, e: &RegisterEvent) {
        _ = e;
    }

    /// Called when a registration is removed.
    fn on_unregister(&mut self, e: &UnregisterEvent) {
        _ = e;
    }

    /// Called when the deepest open depth crosses the safe threshold.
    fn on_deep_nesting(&mut self, e: &DeepNestingEvent) {
        _ = e;
    }

    /// Called at the end of every commit.
    fn on_commit_summary(&mut self, s: &CommitSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RegisterEvent`].
    #[inline]
    pub fn register(&mut self, e: &RegisterEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_register(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UnregisterEvent`].
    #[inline]
    pub fn unregister(&mut self, e: &UnregisterEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unregister(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DeepNestingEvent`].
    #[inline]
    pub fn deep_nesting(&mut self, e: &DeepNestingEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_deep_nesting(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitSummary`].
    #[inline]
    pub fn commit_summary(&mut self, s: &CommitSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_commit_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
