// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for sheaf.
//!
//! This crate provides [`DomSheetPresenter`], which keeps one DOM element per
//! mounted sheet and writes the committed geometry to its inline style.

#![no_std]

extern crate alloc;

mod presenter;

pub use presenter::{DomSheetPresenter, style_properties};
pub use sheaf_core::backend::SheetPresenter;
