// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sheet, scope, and stack identity types.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Sentinel value indicating "no sheet" in index fields.
pub const INVALID: u32 = u32::MAX;

/// Identifies one [`SheafStack`](super::SheafStack) instance.
///
/// Every stack draws a fresh value at construction, so handles minted by one
/// stack are recognized as foreign by every other stack.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackId(pub(crate) u32);

impl StackId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StackId({})", self.0)
    }
}

/// A handle to a mounted sheet in a [`SheafStack`](super::SheafStack).
///
/// The handle is the sheet's identity in the [`Registry`](super::Registry).
/// It stays the same for the whole mounted lifetime of the sheet, whether the
/// sheet is open or closed. Unmounting bumps the slot's generation so the old
/// handle becomes stale even after the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId {
    /// Owning stack.
    pub(crate) stack: StackId,
    /// Slot index into the stack's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the stack's generation for this slot.
    pub(crate) generation: u32,
}

impl SheetId {
    /// Returns the raw slot index (for diagnostics and `*_at` accessors).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SheetId({}@gen{})", self.idx, self.generation)
    }
}

/// The depth context a sheet is declared in.
///
/// Scopes are only handed out by [`SheafStack::root_scope`] and
/// [`SheafStack::child_scope`], so the depth of a scope is always the depth of
/// its parent sheet plus one (or 0 at the root).
///
/// [`SheafStack::root_scope`]: super::SheafStack::root_scope
/// [`SheafStack::child_scope`]: super::SheafStack::child_scope
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    pub(crate) stack: StackId,
    pub(crate) depth: u32,
    pub(crate) parent: Option<SheetId>,
}

impl ScopeId {
    /// Depth assigned to sheets mounted in this scope.
    #[inline]
    #[must_use]
    pub const fn depth(self) -> u32 {
        self.depth
    }

    /// The sheet this scope is declared inside, or `None` at the root.
    #[inline]
    #[must_use]
    pub const fn parent(self) -> Option<SheetId> {
        self.parent
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "ScopeId(depth {} in {parent:?})", self.depth),
            None => write!(f, "ScopeId(root)"),
        }
    }
}
