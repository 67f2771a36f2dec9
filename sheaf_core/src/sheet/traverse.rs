// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, SheetId};
use super::stack::SheafStack;

/// An iterator over the sheets declared directly inside a sheet.
///
/// Created by [`SheafStack::children`].
#[derive(Debug)]
pub struct Children<'a> {
    stack: &'a SheafStack,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(stack: &'a SheafStack, first: u32) -> Self {
        Self {
            stack,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = SheetId;

    fn next(&mut self) -> Option<SheetId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.stack.next_sibling[idx as usize];
        Some(self.stack.handle(idx))
    }
}
