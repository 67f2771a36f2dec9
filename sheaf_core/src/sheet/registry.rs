// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open-sheet registry.
//!
//! The [`Registry`] maps the identity of every open, mounted sheet to the
//! depth it was declared at. Everything else the engine derives (the deepest
//! open depth, whether a sheet has something deeper open above it) is read
//! from this map.
//!
//! Both mutations are total: [`register`](Registry::register) overwrites an
//! existing entry and [`unregister`](Registry::unregister) ignores an absent
//! one, so callers never need to check state first.
//!
//! The deep-nesting advisory is not decided per mutation. A batch of closes
//! and opens can dip below the threshold and climb back within one turn, so
//! the owner calls [`check_deep_nesting`](Registry::check_deep_nesting) once
//! the batch is applied.

use core::fmt;

use hashbrown::HashMap;

use super::id::SheetId;
use crate::config::StackConfig;

/// Advisory emitted when the deepest open depth climbs above the safe
/// threshold.
///
/// Not an error: rendering proceeds, and the geometry floor still applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeepNesting {
    /// Deepest open depth that crossed the threshold.
    pub depth: u32,
    /// Configured threshold.
    pub threshold: u32,
}

impl fmt::Display for DeepNesting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deep nesting detected ({} levels). Consider limiting nesting depth for better UX.",
            self.depth
        )
    }
}

/// Result of a registry mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistryChange {
    /// Deepest open depth before the mutation.
    pub previous_deepest: u32,
    /// Deepest open depth after the mutation.
    pub deepest: u32,
}

impl RegistryChange {
    /// Whether the deepest open depth moved.
    #[must_use]
    pub const fn deepest_changed(&self) -> bool {
        self.previous_deepest != self.deepest
    }
}

/// Mapping from open sheet identity to depth.
///
/// Owned by a [`SheafStack`](super::SheafStack), which is the only caller of
/// the mutating methods. The map itself is never exposed mutably.
#[derive(Clone, Debug)]
pub struct Registry {
    depths: HashMap<SheetId, u32>,
    deepest: u32,
    safe_nesting_threshold: u32,
    deep_nesting_reported: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with the default safe-nesting threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_safe_nesting_threshold(StackConfig::DEFAULT_SAFE_NESTING_THRESHOLD)
    }

    /// Creates an empty registry with the given safe-nesting threshold.
    #[must_use]
    pub fn with_safe_nesting_threshold(threshold: u32) -> Self {
        Self {
            depths: HashMap::new(),
            deepest: 0,
            safe_nesting_threshold: threshold,
            deep_nesting_reported: false,
        }
    }

    /// Inserts or overwrites the entry for `id`.
    pub fn register(&mut self, id: SheetId, depth: u32) -> RegistryChange {
        let previous = self.deepest;
        self.depths.insert(id, depth);
        self.finish_change(previous)
    }

    /// Removes the entry for `id`. Does nothing if there is none.
    pub fn unregister(&mut self, id: SheetId) -> RegistryChange {
        let previous = self.deepest;
        if self.depths.remove(&id).is_some() {
            self.finish_change(previous)
        } else {
            RegistryChange {
                previous_deepest: previous,
                deepest: previous,
            }
        }
    }

    /// Returns whether another registered sheet sits strictly deeper than
    /// `id`.
    ///
    /// Always `false` for an unregistered `id`. Sheets at the same depth do
    /// not count.
    #[must_use]
    pub fn has_deeper_open(&self, id: SheetId) -> bool {
        // Any entry at the deepest level is a different sheet whenever the
        // own depth is below it.
        self.depths
            .get(&id)
            .is_some_and(|&depth| depth < self.deepest)
    }

    /// Returns the maximum registered depth, or 0 when nothing is registered.
    #[must_use]
    pub fn deepest_open_depth(&self) -> u32 {
        self.deepest
    }

    /// Returns the depth `id` is registered at.
    #[must_use]
    pub fn depth_of(&self, id: SheetId) -> Option<u32> {
        self.depths.get(&id).copied()
    }

    /// Returns whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: SheetId) -> bool {
        self.depths.contains_key(&id)
    }

    /// Number of registered sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether no sheet is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Iterates over `(identity, depth)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (SheetId, u32)> + '_ {
        self.depths.iter().map(|(&id, &depth)| (id, depth))
    }

    /// The configured safe-nesting threshold.
    #[must_use]
    pub fn safe_nesting_threshold(&self) -> u32 {
        self.safe_nesting_threshold
    }

    /// Runs the threshold check against the current deepest open depth.
    ///
    /// Returns the advisory the first time the depth is seen above the
    /// threshold. Seeing it at or below the threshold re-arms the check.
    /// Call it once per settled batch of mutations, not after each one.
    pub fn check_deep_nesting(&mut self) -> Option<DeepNesting> {
        if self.deepest <= self.safe_nesting_threshold {
            self.deep_nesting_reported = false;
            return None;
        }
        if self.deep_nesting_reported {
            return None;
        }
        self.deep_nesting_reported = true;
        Some(DeepNesting {
            depth: self.deepest,
            threshold: self.safe_nesting_threshold,
        })
    }

    /// Recomputes the deepest depth.
    fn finish_change(&mut self, previous: u32) -> RegistryChange {
        self.deepest = self.depths.values().copied().max().unwrap_or(0);
        RegistryChange {
            previous_deepest: previous,
            deepest: self.deepest,
        }
    }
}
