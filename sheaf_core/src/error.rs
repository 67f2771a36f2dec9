// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural misuse errors.
//!
//! Wiring mistakes, such as declaring a sheet against a scope that belongs to
//! another stack, are reported as [`NestingError`]. The `try_*` methods of
//! [`SheafStack`](crate::sheet::SheafStack) return them; the infallible
//! variants panic with the same message, since there is no sensible render
//! for a sheet that is not part of its provider's tree.
//!
//! Deep nesting is *not* an error; see
//! [`DeepNesting`](crate::sheet::DeepNesting).

use core::fmt;

use crate::sheet::SheetId;

/// Errors from wiring sheets into a [`SheafStack`](crate::sheet::SheafStack).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NestingError {
    /// The scope or sheet handle was issued by a different stack.
    ForeignScope,
    /// The scope's parent sheet has been unmounted.
    StaleParent(SheetId),
    /// The sheet handle refers to a sheet that has been unmounted.
    StaleSheet(SheetId),
}

impl fmt::Display for NestingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignScope => {
                write!(f, "sheet used outside of the SheafStack that provides it")
            }
            Self::StaleParent(id) => {
                write!(f, "sheet declared inside unmounted parent {id:?}")
            }
            Self::StaleSheet(id) => write!(f, "stale SheetId: {id:?}"),
        }
    }
}

impl core::error::Error for NestingError {}
