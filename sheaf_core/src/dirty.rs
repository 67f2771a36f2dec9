// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Sheaf uses multi-channel dirty tracking (via [`understory_dirty`]) so that
//! a commit only recomputes what actually changed. Each channel is an
//! independent category of change:
//!
//! - [`PROPS`]: the content props of a sheet (depth, deepest open depth,
//!   "deeper sheet open", side) may differ from the cached value.
//! - [`GEOMETRY`]: one of the geometry inputs (deepest open depth or the
//!   content offset override) changed. Only sheets on this channel get their
//!   geometry recomputed.
//! - [`TOPOLOGY`]: a sheet was mounted or unmounted. Triggers a traversal
//!   order rebuild.
//!
//! All channels are local-only: the depth of a sheet never changes while it
//! is mounted, so nothing propagates through parent links.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`SheafStack::commit`](crate::sheet::SheafStack::commit) drains all
//! channels and surfaces the results as
//! [`SheetChanges`](crate::sheet::SheetChanges).

use understory_dirty::Channel;

/// Content props may have changed.
pub const PROPS: Channel = Channel::new(0);

/// Geometry inputs changed; the cached geometry must be recomputed.
pub const GEOMETRY: Channel = Channel::new(1);

/// A sheet was mounted or unmounted.
pub const TOPOLOGY: Channel = Channel::new(2);
