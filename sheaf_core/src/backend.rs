// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presenter contract for rendering integrations.
//!
//! The engine never draws anything. A *presenter* owns the visual surface of
//! each sheet (a DOM element, a retained widget, a compositor layer) and
//! applies the derived props and geometry after each commit.
//!
//! ```rust,ignore
//! fn on_render_turn(stack: &mut SheafStack, presenter: &mut impl SheetPresenter) {
//!     // Owner state changed during the event turn.
//!     stack.set_open(settings, true);
//!
//!     // Reconcile: register/unregister, recompute what changed.
//!     let changes = stack.commit();
//!
//!     // Present: apply incremental changes to the native surfaces.
//!     presenter.apply(stack, &changes);
//! }
//! ```

use crate::sheet::{SheafStack, SheetChanges};

/// Applies committed sheet changes to a presentation surface.
pub trait SheetPresenter {
    /// Applies the given [`SheetChanges`], reading current values from
    /// `stack` via the `*_at` accessors.
    fn apply(&mut self, stack: &SheafStack, changes: &SheetChanges);
}
