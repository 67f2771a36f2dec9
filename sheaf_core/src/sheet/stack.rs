// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays sheet storage with mounting, scopes, and controlled state.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{INVALID, ScopeId, SheetId, StackId};
use super::registry::Registry;
use super::traverse::Children;
use crate::config::{Side, StackConfig};
use crate::dirty;
use crate::error::NestingError;
use crate::geometry::{SheetGeometry, sheet_geometry};

/// Callback the sheet's owner installs to hear visibility requests.
pub type OpenChangeFn = Box<dyn FnMut(bool)>;

/// The content slot of a sheet.
///
/// A sheet with a slot has a content renderer; the slot carries the
/// renderer's own inputs. The renderer receives its derived inputs as
/// [`ContentProps`] and [`SheetGeometry`] from the stack.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentSlot {
    /// Explicit offset, replacing `depth * offset_multiplier`.
    pub offset: Option<f64>,
}

impl ContentSlot {
    /// A slot with no overrides.
    #[must_use]
    pub const fn new() -> Self {
        Self { offset: None }
    }

    /// Returns a copy with an explicit offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Derived inputs delivered to a sheet's content renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentProps {
    /// Depth the sheet was declared at.
    pub depth: u32,
    /// Deepest depth currently open in the stack.
    pub deepest_open_depth: u32,
    /// Whether a sheet deeper than this one is open.
    pub has_deeper_open: bool,
    /// Edge the stack attaches to.
    pub side: Side,
}

/// Root provider and storage for all sheets of one nesting tree.
///
/// Sheets are addressed by [`SheetId`] handles. Internally each sheet occupies
/// a slot in parallel arrays; unmounted slots are recycled via a free list and
/// generation counters reject stale handles.
///
/// `open` is a controlled input: [`set_open`](Self::set_open) only records the
/// value. Registration and unregistration happen in
/// [`commit`](Self::commit), or at [`unmount`](Self::unmount) for a sheet that
/// is still registered.
pub struct SheafStack {
    pub(crate) id: StackId,
    pub(crate) config: StackConfig,
    pub(crate) registry: Registry,

    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) depth: Vec<u32>,

    // -- Controlled state (set by callers) --
    pub(crate) open: Vec<bool>,
    pub(crate) content: Vec<Option<ContentSlot>>,
    pub(crate) on_open_change: Vec<Option<OpenChangeFn>>,

    // -- Registration token: the depth registered at, taken on unregister --
    pub(crate) registration: Vec<Option<u32>>,

    // -- Computed (written by commit) --
    pub(crate) props: Vec<ContentProps>,
    pub(crate) geometry: Vec<SheetGeometry>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking (drained by commit) --
    pub(crate) commit_index: u64,
    pub(crate) committed_deepest: u32,
    pub(crate) pending_mounted: Vec<u32>,
    pub(crate) pending_unmounted: Vec<u32>,
    pub(crate) pending_unregistered: Vec<(SheetId, u32)>,
}

impl fmt::Debug for SheafStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheafStack")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("len", &self.len)
            .field("commit_index", &self.commit_index)
            .finish_non_exhaustive()
    }
}

impl Default for SheafStack {
    fn default() -> Self {
        Self::new(StackConfig::default())
    }
}

impl SheafStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new(config: StackConfig) -> Self {
        Self {
            id: StackId::next(),
            config,
            registry: Registry::with_safe_nesting_threshold(config.safe_nesting_threshold),
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            depth: Vec::new(),
            open: Vec::new(),
            content: Vec::new(),
            on_open_change: Vec::new(),
            registration: Vec::new(),
            props: Vec::new(),
            geometry: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            commit_index: 0,
            committed_deepest: 0,
            pending_mounted: Vec::new(),
            pending_unmounted: Vec::new(),
            pending_unregistered: Vec::new(),
        }
    }

    /// Identity of this stack.
    #[must_use]
    pub fn id(&self) -> StackId {
        self.id
    }

    /// The configuration the stack was created with.
    #[must_use]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// The edge every sheet in the stack attaches to.
    #[must_use]
    pub fn side(&self) -> Side {
        self.config.side
    }

    /// Read-only view of the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // -- Scope API --

    /// Returns the root scope. Sheets mounted in it have depth 0.
    #[must_use]
    pub fn root_scope(&self) -> ScopeId {
        ScopeId {
            stack: self.id,
            depth: 0,
            parent: None,
        }
    }

    /// Returns the scope for sheets declared inside `sheet`, one level deeper.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn child_scope(&self, sheet: SheetId) -> ScopeId {
        self.validate(sheet);
        ScopeId {
            stack: self.id,
            depth: self.depth[sheet.idx as usize] + 1,
            parent: Some(sheet),
        }
    }

    // -- Mount API --

    /// Mounts a new, closed sheet in `scope` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `scope` belongs to another stack or its parent sheet has been
    /// unmounted. Use [`try_mount`](Self::try_mount) to handle that case.
    pub fn mount(&mut self, scope: ScopeId) -> SheetId {
        match self.try_mount(scope) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Mounts a new, closed sheet in `scope`.
    ///
    /// # Errors
    ///
    /// [`NestingError::ForeignScope`] if `scope` was issued by another stack,
    /// [`NestingError::StaleParent`] if its parent sheet has been unmounted.
    pub fn try_mount(&mut self, scope: ScopeId) -> Result<SheetId, NestingError> {
        if scope.stack != self.id {
            return Err(NestingError::ForeignScope);
        }
        let parent = match scope.parent {
            Some(p) if !self.is_alive(p) => return Err(NestingError::StaleParent(p)),
            Some(p) => p.idx,
            None => INVALID,
        };

        let deepest = self.registry.deepest_open_depth();
        let props = ContentProps {
            depth: scope.depth,
            deepest_open_depth: deepest,
            has_deeper_open: false,
            side: self.config.side,
        };
        let geometry = sheet_geometry(scope.depth, deepest, None, &self.config.geometry);

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; the generation was bumped at unmount.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.depth[i] = scope.depth;
            self.open[i] = false;
            self.content[i] = None;
            self.on_open_change[i] = None;
            self.registration[i] = None;
            self.props[i] = props;
            self.geometry[i] = geometry;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.depth.push(scope.depth);
            self.open.push(false);
            self.content.push(None);
            self.on_open_change.push(None);
            self.registration.push(None);
            self.props.push(props);
            self.geometry.push(geometry);
            self.generation.push(0);
            idx
        };

        if parent != INVALID {
            self.link_last_child(parent, idx);
        }

        self.traversal_dirty = true;
        self.pending_mounted.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::PROPS);
        self.dirty.mark(idx, dirty::GEOMETRY);

        Ok(SheetId {
            stack: self.id,
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Unmounts a sheet together with every sheet declared inside it.
    ///
    /// Descendants go first. A sheet that is still registered is unregistered
    /// here, exactly once; the removal is reported by the next commit.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    pub fn unmount(&mut self, sheet: SheetId) {
        if let Err(err) = self.try_unmount(sheet) {
            panic!("{err}");
        }
    }

    /// Unmounts a sheet together with every sheet declared inside it.
    ///
    /// # Errors
    ///
    /// [`NestingError::ForeignScope`] or [`NestingError::StaleSheet`] if the
    /// handle does not refer to a live sheet of this stack.
    pub fn try_unmount(&mut self, sheet: SheetId) -> Result<(), NestingError> {
        self.check(sheet)?;
        self.unmount_subtree(sheet.idx);
        Ok(())
    }

    /// Returns whether the given handle refers to a live sheet of this stack.
    #[must_use]
    pub fn is_alive(&self, id: SheetId) -> bool {
        id.stack == self.id
            && id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Controlled state API --

    /// Records the controlled `open` value of a sheet.
    ///
    /// Takes effect at the next [`commit`](Self::commit). Only the last value
    /// before a commit matters, so toggling several times in one batch leaves
    /// exactly the registration the final value implies.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    pub fn set_open(&mut self, sheet: SheetId, open: bool) {
        self.validate(sheet);
        self.open[sheet.idx as usize] = open;
    }

    /// Installs the callback that receives visibility requests for `sheet`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    pub fn set_on_open_change(&mut self, sheet: SheetId, callback: Option<OpenChangeFn>) {
        self.validate(sheet);
        self.on_open_change[sheet.idx as usize] = callback;
    }

    /// Forwards a visibility request (e.g. a backdrop dismissal) to the
    /// sheet's owner.
    ///
    /// The sheet does not change its own `open` value; the owner answers with
    /// [`set_open`](Self::set_open). Returns `false` when no callback is
    /// installed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    pub fn request_open_change(&mut self, sheet: SheetId, open: bool) -> bool {
        self.validate(sheet);
        match self.on_open_change[sheet.idx as usize].as_mut() {
            Some(callback) => {
                callback(open);
                true
            }
            None => false,
        }
    }

    /// Sets or clears the content slot of a sheet.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    pub fn set_content(&mut self, sheet: SheetId, content: Option<ContentSlot>) {
        self.validate(sheet);
        let idx = sheet.idx;
        if self.content[idx as usize] != content {
            self.content[idx as usize] = content;
            self.dirty.mark(idx, dirty::GEOMETRY);
            self.dirty.mark(idx, dirty::PROPS);
        }
    }

    // -- Queries --

    /// Depth the sheet was declared at.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn depth(&self, sheet: SheetId) -> u32 {
        self.validate(sheet);
        self.depth[sheet.idx as usize]
    }

    /// The controlled `open` value last passed to [`set_open`](Self::set_open).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn is_open(&self, sheet: SheetId) -> bool {
        self.validate(sheet);
        self.open[sheet.idx as usize]
    }

    /// Whether the sheet is currently in the registry.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn is_registered(&self, sheet: SheetId) -> bool {
        self.validate(sheet);
        self.registration[sheet.idx as usize].is_some()
    }

    /// Whether a sheet deeper than `sheet` is registered.
    ///
    /// Reads the registry directly, so it reflects the latest commit.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn has_deeper_open(&self, sheet: SheetId) -> bool {
        self.validate(sheet);
        self.registry.has_deeper_open(sheet)
    }

    /// Deepest registered depth, or 0 when nothing is open.
    #[must_use]
    pub fn deepest_open_depth(&self) -> u32 {
        self.registry.deepest_open_depth()
    }

    /// Returns the content slot of a sheet.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn content(&self, sheet: SheetId) -> Option<ContentSlot> {
        self.validate(sheet);
        self.content[sheet.idx as usize]
    }

    /// Returns the content props of a sheet.
    ///
    /// Only valid after [`commit`](Self::commit) has been called.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn content_props(&self, sheet: SheetId) -> ContentProps {
        self.validate(sheet);
        self.props[sheet.idx as usize]
    }

    /// Returns the geometry of a sheet.
    ///
    /// Only valid after [`commit`](Self::commit) has been called.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn geometry(&self, sheet: SheetId) -> SheetGeometry {
        self.validate(sheet);
        self.geometry[sheet.idx as usize]
    }

    /// Returns the sheet `sheet` is declared inside, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn parent(&self, sheet: SheetId) -> Option<SheetId> {
        self.validate(sheet);
        let p = self.parent[sheet.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the sheets declared directly inside `sheet`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another stack.
    #[must_use]
    pub fn children(&self, sheet: SheetId) -> Children<'_> {
        self.validate(sheet);
        Children::new(self, self.first_child[sheet.idx as usize])
    }

    /// Returns the sheets mounted in the root scope.
    #[must_use]
    pub fn roots(&self) -> Vec<SheetId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.handle(idx))
            .collect()
    }

    /// Number of mounted sheets.
    #[must_use]
    pub fn mounted_len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Raw-index accessors for presenters --
    //
    // These accept raw slot indices (as found in `SheetChanges`) rather than
    // `SheetId` handles, skipping generation validation.

    /// Returns the content props at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn props_at(&self, idx: u32) -> ContentProps {
        self.check_slot(idx);
        self.props[idx as usize]
    }

    /// Returns the geometry at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn geometry_at(&self, idx: u32) -> SheetGeometry {
        self.check_slot(idx);
        self.geometry[idx as usize]
    }

    /// Returns the content slot at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> Option<ContentSlot> {
        self.check_slot(idx);
        self.content[idx as usize]
    }

    // -- Internal helpers --

    /// Builds the current handle for a live slot.
    pub(crate) fn handle(&self, idx: u32) -> SheetId {
        SheetId {
            stack: self.id,
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Checks that the handle refers to a live sheet of this stack.
    fn check(&self, id: SheetId) -> Result<(), NestingError> {
        if id.stack != self.id {
            Err(NestingError::ForeignScope)
        } else if id.idx >= self.len || self.generation[id.idx as usize] != id.generation {
            Err(NestingError::StaleSheet(id))
        } else {
            Ok(())
        }
    }

    /// Panics if the handle is stale or foreign.
    fn validate(&self, id: SheetId) {
        if let Err(err) = self.check(id) {
            panic!("{err}");
        }
    }

    fn check_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    fn link_last_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn unmount_subtree(&mut self, idx: u32) {
        while self.first_child[idx as usize] != INVALID {
            let child = self.first_child[idx as usize];
            self.unmount_subtree(child);
        }

        let id = self.handle(idx);
        if let Some(depth) = self.registration[idx as usize].take() {
            self.registry.unregister(id);
            self.pending_unregistered.push((id, depth));
        }

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.open[idx as usize] = false;
        self.content[idx as usize] = None;
        self.on_open_change[idx as usize] = None;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        // A sheet mounted since the last commit was never reported, so its
        // unmount is not reported either.
        if let Some(pos) = self.pending_mounted.iter().position(|&m| m == idx) {
            self.pending_mounted.remove(pos);
        } else {
            self.pending_unmounted.push(idx);
        }
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }
}
