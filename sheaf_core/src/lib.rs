// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nesting-state registry and depth geometry for stacked overlay sheets.
//!
//! `sheaf_core` renders nothing itself. It keeps the bookkeeping that lets a
//! stack of overlay panels ("sheets") demote their ancestors: every open sheet
//! is registered with its nesting depth, the deepest open depth is derived
//! from the registry, and each sheet's geometry (horizontal scale plus
//! vertical offset) follows from its distance to that deepest level. It is
//! `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   owner state ──► SheafStack::set_open / set_content
//!                          │
//!                          ▼
//!   SheafStack::commit() ──► Registry::register / unregister
//!                          │
//!                          ▼
//!   SheetChanges ──► SheetPresenter::apply() ──► sheet_geometry() per sheet
//! ```
//!
//! **[`sheet`]**: The nesting tree. [`SheafStack`](sheet::SheafStack) is the
//! root provider; it owns the [`Registry`](sheet::Registry), mounts sheets
//! into scopes, and reconciles `open` flags with registrations at commit.
//!
//! **[`geometry`]**: Pure mapping from `(depth, deepest_open_depth, offset)`
//! to [`SheetGeometry`](geometry::SheetGeometry).
//!
//! **[`config`]**: [`StackConfig`](config::StackConfig) and
//! [`Side`](config::Side).
//!
//! **[`dirty`]**: Dirty-tracking channels via `understory_dirty`.
//!
//! **[`backend`]**: The [`SheetPresenter`](backend::SheetPresenter) trait.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! commit instrumentation, with the zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`error`]**: [`NestingError`](error::NestingError) for structural
//! misuse.
//!
//! # Depth convention
//!
//! The root scope has depth 0, so sheets declared at the root have depth 0,
//! sheets declared inside them depth 1, and so on. With nothing open the
//! deepest open depth is also 0.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod dirty;
pub mod error;
pub mod geometry;
pub mod sheet;
pub mod trace;
