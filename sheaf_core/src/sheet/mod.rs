// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sheet tree data model.
//!
//! A *sheet* is one overlay panel declared somewhere in a nesting tree. Each
//! sheet has:
//!
//! - An identity ([`SheetId`]): a generational handle minted at mount and
//!   stale after unmount. It is the key the sheet registers under.
//! - A depth, fixed at mount by the [`ScopeId`] it was declared in: 0 at the
//!   root, parent depth + 1 inside another sheet.
//! - **Controlled inputs** set by the owner: [`open`](SheafStack::set_open),
//!   the [content slot](SheafStack::set_content), and the
//!   [open-change callback](SheafStack::set_on_open_change).
//! - **Derived outputs** produced by [`commit`](SheafStack::commit):
//!   [`ContentProps`] and [`SheetGeometry`](crate::geometry::SheetGeometry).
//!
//! The [`Registry`] inside the stack holds exactly the sheets that are open
//! and mounted. A sheet registers at the first commit that sees it open, and
//! its registration is released exactly once, at the first commit that sees
//! it closed or at unmount, whichever comes first.
//!
//! Closing a sheet does not close the sheets declared inside it. Their `open`
//! flags are independent inputs, so they stay registered until their own
//! owner closes them or they are unmounted.

mod commit;
mod id;
mod registry;
mod stack;
mod traverse;

pub use commit::SheetChanges;
pub use id::{INVALID, ScopeId, SheetId, StackId};
pub use registry::{DeepNesting, Registry, RegistryChange};
pub use stack::{ContentProps, ContentSlot, OpenChangeFn, SheafStack};
pub use traverse::Children;
