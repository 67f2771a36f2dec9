// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit phase and change tracking.
//!
//! A commit is the reconciliation step that runs after the owner's state for
//! a turn is settled:
//!
//! 1. **Unmount releases**: registrations released by
//!    [`unmount`](SheafStack::unmount) since the last commit are reported.
//! 2. **Reconcile**: in tree pre-order, every open sheet without a
//!    registration registers at its depth, and every closed sheet holding one
//!    gives it up. The registration is a token taken on release, so a release
//!    can never fire twice or while the sheet is open. The deep-nesting
//!    check runs once afterwards, on the settled deepest open depth.
//! 3. **PROPS**: content props are refreshed; sheets whose props differ are
//!    marked and drained.
//! 4. **GEOMETRY**: if the deepest open depth moved, every sheet is marked.
//!    Marked sheets (plus those with a new content slot) get their geometry
//!    recomputed; the rest keep the cached value.
//! 5. **TOPOLOGY**: drained and discarded (the traversal order was already
//!    rebuilt at the start of the commit if needed).
//!
//! [`SheetChanges`] uses raw slot indices (`u32`) rather than [`SheetId`]
//! handles so presenters can read the stack through the `*_at` accessors
//! (e.g. [`geometry_at`](SheafStack::geometry_at)) without generation checks.
//!
//! [`SheetId`]: super::SheetId

use alloc::vec::Vec;

use super::id::INVALID;
use super::registry::DeepNesting;
use super::stack::{ContentProps, SheafStack};
use crate::dirty;
use crate::geometry::sheet_geometry;
use crate::trace::{
    CommitSummary, DeepNestingEvent, RegisterEvent, Tracer, UnregisterEvent, UnregisterReason,
};

/// The set of changes produced by a single [`SheafStack::commit`] call.
#[derive(Clone, Debug, Default)]
pub struct SheetChanges {
    /// Sheets registered by this commit.
    pub registered: Vec<u32>,
    /// Sheets whose registration was released since the last commit, whether
    /// by closing or by unmounting.
    pub unregistered: Vec<u32>,
    /// Sheets whose content props changed.
    pub props: Vec<u32>,
    /// Sheets whose geometry was recomputed.
    pub geometry: Vec<u32>,
    /// Sheets mounted since the last commit.
    pub mounted: Vec<u32>,
    /// Sheets unmounted since the last commit.
    pub unmounted: Vec<u32>,
    /// Deepest open depth at the end of the previous commit.
    pub previous_deepest_open_depth: u32,
    /// Deepest open depth after this commit.
    pub deepest_open_depth: u32,
    /// Set when this commit pushed the deepest open depth above the safe
    /// threshold.
    pub deep_nesting: Option<DeepNesting>,
    /// Whether sheets were mounted or unmounted (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl SheetChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.registered.clear();
        self.unregistered.clear();
        self.props.clear();
        self.geometry.clear();
        self.mounted.clear();
        self.unmounted.clear();
        self.previous_deepest_open_depth = 0;
        self.deepest_open_depth = 0;
        self.deep_nesting = None;
        self.topology_changed = false;
    }

    /// Whether the deepest open depth moved during this commit.
    #[must_use]
    pub fn deepest_changed(&self) -> bool {
        self.previous_deepest_open_depth != self.deepest_open_depth
    }
}

impl SheafStack {
    /// Reconciles `open` flags with the registry and recomputes what changed.
    pub fn commit(&mut self) -> SheetChanges {
        let mut changes = SheetChanges::default();
        self.commit_into(&mut changes, &mut Tracer::none());
        changes
    }

    /// Like [`commit`](Self::commit), reporting to the given tracer.
    pub fn commit_traced(&mut self, tracer: &mut Tracer<'_>) -> SheetChanges {
        let mut changes = SheetChanges::default();
        self.commit_into(&mut changes, tracer);
        changes
    }

    /// Like [`commit_traced`](Self::commit_traced), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn commit_into(&mut self, changes: &mut SheetChanges, tracer: &mut Tracer<'_>) {
        changes.clear();
        self.commit_index += 1;
        let commit_index = self.commit_index;
        let previous_deepest = self.committed_deepest;

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // Releases that already happened at unmount.
        for (id, depth) in self.pending_unregistered.drain(..) {
            changes.unregistered.push(id.idx);
            tracer.unregister(&UnregisterEvent {
                commit_index,
                sheet: id.idx,
                generation: id.generation,
                depth,
                deepest_open_depth: self.registry.deepest_open_depth(),
                reason: UnregisterReason::Unmounted,
            });
        }

        // Reconcile open flags with registrations.
        for i in 0..self.traversal_order.len() {
            let idx = self.traversal_order[i];
            let slot = idx as usize;
            let id = self.handle(idx);

            if self.open[slot] {
                if self.registration[slot].is_none() {
                    let depth = self.depth[slot];
                    let change = self.registry.register(id, depth);
                    self.registration[slot] = Some(depth);
                    changes.registered.push(idx);
                    tracer.register(&RegisterEvent {
                        commit_index,
                        sheet: idx,
                        generation: id.generation,
                        depth,
                        deepest_open_depth: change.deepest,
                    });
                }
            } else if let Some(depth) = self.registration[slot].take() {
                let change = self.registry.unregister(id);
                changes.unregistered.push(idx);
                tracer.unregister(&UnregisterEvent {
                    commit_index,
                    sheet: idx,
                    generation: id.generation,
                    depth,
                    deepest_open_depth: change.deepest,
                    reason: UnregisterReason::Closed,
                });
            }
        }

        let deepest = self.registry.deepest_open_depth();

        if let Some(warning) = self.registry.check_deep_nesting() {
            changes.deep_nesting = Some(warning);
            tracer.deep_nesting(&DeepNestingEvent {
                commit_index,
                depth: warning.depth,
                threshold: warning.threshold,
            });
        }

        // Refresh props, marking only the ones that moved.
        for i in 0..self.traversal_order.len() {
            let idx = self.traversal_order[i];
            let slot = idx as usize;
            let props = ContentProps {
                depth: self.depth[slot],
                deepest_open_depth: deepest,
                has_deeper_open: self.registry.has_deeper_open(self.handle(idx)),
                side: self.config.side,
            };
            if props != self.props[slot] {
                self.props[slot] = props;
                self.dirty.mark(idx, dirty::PROPS);
            }
            if deepest != previous_deepest {
                self.dirty.mark(idx, dirty::GEOMETRY);
            }
        }
        changes.props = self
            .dirty
            .drain(dirty::PROPS)
            .deterministic()
            .run()
            .collect();

        // Recompute geometry only where its inputs changed.
        let dirty_geometry: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_geometry {
            let slot = idx as usize;
            let offset = self.content[slot].and_then(|c| c.offset);
            self.geometry[slot] =
                sheet_geometry(self.depth[slot], deepest, offset, &self.config.geometry);
        }
        changes.geometry = dirty_geometry;

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_mounted, &mut changes.mounted);
        core::mem::swap(&mut self.pending_unmounted, &mut changes.unmounted);

        self.committed_deepest = deepest;
        changes.previous_deepest_open_depth = previous_deepest;
        changes.deepest_open_depth = deepest;

        tracer.commit_summary(&CommitSummary {
            commit_index,
            registered: count(&changes.registered),
            unregistered: count(&changes.unregistered),
            open_sheets: u32::try_from(self.registry.len()).unwrap_or(u32::MAX),
            deepest_open_depth: deepest,
            geometry_updates: count(&changes.geometry),
        });
    }

    /// Number of commits run so far.
    #[must_use]
    pub fn commit_index(&self) -> u64 {
        self.commit_index
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`commit`](Self::commit) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the depth-first pre-order traversal of all mounted sheets.
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

fn count(indices: &[u32]) -> u32 {
    u32::try_from(indices.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::config::StackConfig;
    use crate::sheet::{ContentSlot, SheetId};

    const EPS: f64 = 1e-9;

    /// Mounts a chain of `n` sheets, each inside the previous one.
    fn chain(stack: &mut SheafStack, n: usize) -> Vec<SheetId> {
        let mut sheets = Vec::with_capacity(n);
        let mut scope = stack.root_scope();
        for _ in 0..n {
            let sheet = stack.mount(scope);
            scope = stack.child_scope(sheet);
            sheets.push(sheet);
        }
        sheets
    }

    #[test]
    fn open_registers_at_commit() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        stack.set_open(a, true);

        let changes = stack.commit();
        assert_eq!(changes.registered, vec![a.index()]);
        assert!(stack.is_registered(a));
        assert_eq!(stack.registry().depth_of(a), Some(0));
    }

    #[test]
    fn nested_open_scenario() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        let b = stack.mount(stack.child_scope(a));
        stack.set_content(a, Some(ContentSlot::new()));
        stack.set_content(b, Some(ContentSlot::new()));

        // Open A.
        stack.set_open(a, true);
        let _ = stack.commit();
        assert_eq!(stack.registry().len(), 1);
        assert_eq!(stack.deepest_open_depth(), 0);
        assert!(!stack.has_deeper_open(a));
        let ga = stack.geometry(a);
        assert_eq!(ga.scale_x, None);
        assert_eq!(ga.transform(), None);

        // Open B inside A.
        stack.set_open(b, true);
        let changes = stack.commit();
        assert_eq!(changes.registered, vec![b.index()]);
        assert_eq!(stack.registry().depth_of(a), Some(0));
        assert_eq!(stack.registry().depth_of(b), Some(1));
        assert_eq!(stack.deepest_open_depth(), 1);
        assert!(stack.has_deeper_open(a));
        assert!(!stack.has_deeper_open(b));

        let pa = stack.content_props(a);
        assert_eq!(pa.depth, 0);
        assert_eq!(pa.deepest_open_depth, 1);
        assert!(pa.has_deeper_open);

        let ga = stack.geometry(a);
        assert!((ga.scale_x.unwrap_or(1.0) - 0.95).abs() < EPS);
        assert_eq!(ga.translate_y, None);
        assert_eq!(ga.transform().as_deref(), Some("scaleX(0.95)"));

        let gb = stack.geometry(b);
        assert_eq!(gb.scale_x, None);
        assert_eq!(gb.translate_y, Some(16.0));
        assert_eq!(gb.bottom, Some(24.0));
    }

    #[test]
    fn closing_parent_does_not_cascade() {
        let mut stack = SheafStack::default();
        let s = chain(&mut stack, 2);
        stack.set_open(s[0], true);
        stack.set_open(s[1], true);
        let _ = stack.commit();

        stack.set_open(s[0], false);
        let changes = stack.commit();
        assert_eq!(changes.unregistered, vec![s[0].index()]);
        assert!(!stack.is_registered(s[0]));
        assert!(stack.is_registered(s[1]));
        assert_eq!(stack.deepest_open_depth(), 1);
        assert!(!stack.content_props(s[0]).has_deeper_open, "closed sheet");
    }

    #[test]
    fn closing_child_restores_parent() {
        let mut stack = SheafStack::default();
        let s = chain(&mut stack, 2);
        stack.set_open(s[0], true);
        stack.set_open(s[1], true);
        let _ = stack.commit();

        stack.set_open(s[1], false);
        let changes = stack.commit();
        assert_eq!(changes.unregistered, vec![s[1].index()]);
        assert!(changes.props.contains(&s[0].index()));
        assert!(changes.geometry.contains(&s[0].index()));
        assert_eq!(stack.geometry(s[0]).scale_x, None);
        assert!(!stack.has_deeper_open(s[0]));
    }

    #[test]
    fn rapid_toggle_leaves_one_registration() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        stack.set_open(a, true);
        stack.set_open(a, false);
        stack.set_open(a, true);
        let changes = stack.commit();
        assert_eq!(changes.registered, vec![a.index()]);
        assert!(changes.unregistered.is_empty());
        assert_eq!(stack.registry().len(), 1);

        // Toggling while registered does not release and re-acquire.
        stack.set_open(a, false);
        stack.set_open(a, true);
        let changes = stack.commit();
        assert!(changes.registered.is_empty());
        assert!(changes.unregistered.is_empty());
        assert_eq!(stack.registry().len(), 1);
    }

    #[test]
    fn close_releases_exactly_once() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        stack.set_open(a, true);
        let _ = stack.commit();

        stack.set_open(a, false);
        let first = stack.commit();
        let second = stack.commit();
        assert_eq!(first.unregistered, vec![a.index()]);
        assert!(second.unregistered.is_empty());

        // Unmounting a closed sheet has nothing left to release.
        stack.unmount(a);
        let third = stack.commit();
        assert!(third.unregistered.is_empty());
        assert_eq!(third.unmounted, vec![a.index()]);
    }

    #[test]
    fn unmount_while_open_releases_registration() {
        let mut stack = SheafStack::default();
        let s = chain(&mut stack, 3);
        for &sheet in &s {
            stack.set_open(sheet, true);
        }
        let _ = stack.commit();
        assert_eq!(stack.deepest_open_depth(), 2);

        stack.unmount(s[1]);
        // The release is immediate; no stale entry survives the unmount.
        assert_eq!(stack.registry().len(), 1);
        assert_eq!(stack.deepest_open_depth(), 0);

        let changes = stack.commit();
        assert_eq!(changes.unregistered.len(), 2);
        assert!(changes.unregistered.contains(&s[1].index()));
        assert!(changes.unregistered.contains(&s[2].index()));
        assert_eq!(changes.previous_deepest_open_depth, 2);
        assert_eq!(changes.deepest_open_depth, 0);
        assert!(changes.topology_changed);
        assert!(changes.geometry.contains(&s[0].index()));
        assert!(!stack.has_deeper_open(s[0]));
    }

    #[test]
    fn remount_in_reused_slot_is_a_new_identity() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        stack.set_open(a, true);
        let _ = stack.commit();
        stack.unmount(a);

        let b = stack.mount(stack.root_scope());
        assert_eq!(a.index(), b.index());
        assert!(!stack.is_registered(b));
        let changes = stack.commit();
        assert_eq!(changes.unregistered, vec![a.index()]);
        assert_eq!(changes.mounted, vec![b.index()]);
        assert!(!stack.registry().contains(a));
        assert!(stack.registry().is_empty());
    }

    #[test]
    fn geometry_is_only_recomputed_when_inputs_change() {
        let mut stack = SheafStack::default();
        let s = chain(&mut stack, 2);
        let first = stack.commit();
        assert_eq!(first.geometry.len(), 2, "new sheets get geometry");

        let idle = stack.commit();
        assert!(idle.geometry.is_empty());
        assert!(idle.props.is_empty());

        stack.set_content(s[1], Some(ContentSlot::new().with_offset(40.0)));
        let changes = stack.commit();
        assert_eq!(changes.geometry, vec![s[1].index()]);
        assert_eq!(stack.geometry(s[1]).translate_y, Some(40.0));
        assert_eq!(stack.geometry(s[1]).bottom, Some(48.0));
    }

    #[test]
    fn siblings_at_same_depth_do_not_demote_each_other() {
        let mut stack = SheafStack::default();
        let root = stack.mount(stack.root_scope());
        let scope = stack.child_scope(root);
        let a = stack.mount(scope);
        let b = stack.mount(scope);
        stack.set_open(root, true);
        stack.set_open(a, true);
        stack.set_open(b, true);
        let _ = stack.commit();

        assert!(stack.has_deeper_open(root));
        assert!(!stack.has_deeper_open(a));
        assert!(!stack.has_deeper_open(b));
        assert_eq!(stack.geometry(a).scale_x, None);
        assert_eq!(stack.geometry(b).scale_x, None);
    }

    #[test]
    fn deep_nesting_warns_once_per_crossing() {
        let config = StackConfig::new().with_safe_nesting_threshold(2);
        let mut stack = SheafStack::new(config);
        let s = chain(&mut stack, 5);

        for &sheet in &s[..3] {
            stack.set_open(sheet, true);
        }
        assert_eq!(stack.commit().deep_nesting, None, "depth 2 is safe");

        stack.set_open(s[3], true);
        let changes = stack.commit();
        let warning = changes.deep_nesting.map(|w| w.depth);
        assert_eq!(warning, Some(3));

        stack.set_open(s[4], true);
        assert_eq!(stack.commit().deep_nesting, None, "already reported");
        assert_eq!(stack.commit().deep_nesting, None, "no change, no warning");

        stack.set_open(s[3], false);
        stack.set_open(s[4], false);
        let _ = stack.commit();
        stack.set_open(s[3], true);
        assert_eq!(stack.commit().deep_nesting.map(|w| w.depth), Some(3));
    }

    #[test]
    fn swapping_the_deepest_sheet_in_one_batch_does_not_warn_again() {
        let config = StackConfig::new().with_safe_nesting_threshold(2);
        let mut stack = SheafStack::new(config);
        let s = chain(&mut stack, 3);
        let scope = stack.child_scope(s[2]);
        let x = stack.mount(scope);
        let y = stack.mount(scope);
        for &sheet in &s {
            stack.set_open(sheet, true);
        }
        stack.set_open(x, true);
        assert_eq!(stack.commit().deep_nesting.map(|w| w.depth), Some(3));

        // `x` precedes `y` in traversal order, so the close is applied first.
        stack.set_open(x, false);
        stack.set_open(y, true);
        let changes = stack.commit();
        assert_eq!(changes.unregistered, vec![x.index()]);
        assert_eq!(changes.registered, vec![y.index()]);
        assert_eq!(changes.previous_deepest_open_depth, 3);
        assert_eq!(changes.deepest_open_depth, 3);
        assert_eq!(changes.deep_nesting, None);
    }

    #[test]
    fn unmount_below_threshold_between_commits_rearms_warning() {
        let config = StackConfig::new().with_safe_nesting_threshold(1);
        let mut stack = SheafStack::new(config);
        let s = chain(&mut stack, 3);
        for &sheet in &s {
            stack.set_open(sheet, true);
        }
        assert_eq!(stack.commit().deep_nesting.map(|w| w.depth), Some(2));

        stack.unmount(s[2]);
        assert_eq!(stack.commit().deep_nesting, None);

        let deeper = stack.mount(stack.child_scope(s[1]));
        stack.set_open(deeper, true);
        assert_eq!(stack.commit().deep_nesting.map(|w| w.depth), Some(2));
    }

    #[test]
    fn deep_nesting_still_clamps_geometry() {
        let mut stack = SheafStack::default();
        let s = chain(&mut stack, 30);
        for &sheet in &s {
            stack.set_open(sheet, true);
        }
        let changes = stack.commit();
        assert_eq!(changes.deep_nesting.map(|w| w.depth), Some(29));
        assert_eq!(stack.geometry(s[0]).scale_x, Some(0.5));
        assert!((stack.geometry(s[20]).scale_x.unwrap_or(1.0) - 0.55).abs() < EPS);
        assert_eq!(stack.geometry(s[29]).scale_x, None);
    }

    #[test]
    fn traversal_is_pre_order() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        let b = stack.mount(stack.root_scope());
        let a1 = stack.mount(stack.child_scope(a));
        let _ = stack.commit();
        assert_eq!(
            stack.traversal_order(),
            &[a.index(), a1.index(), b.index()]
        );
        assert_eq!(stack.commit_index(), 1);
    }

    #[test]
    fn commit_into_reuses_buffer() {
        let mut stack = SheafStack::default();
        let a = stack.mount(stack.root_scope());
        let mut changes = SheetChanges::default();
        stack.set_open(a, true);
        stack.commit_into(&mut changes, &mut Tracer::none());
        assert_eq!(changes.registered, vec![a.index()]);

        stack.commit_into(&mut changes, &mut Tracer::none());
        assert!(changes.registered.is_empty());
        assert!(!changes.topology_changed);
        assert!(!changes.deepest_changed());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn commit_traced_reports_events() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Counts {
            registers: u32,
            unregisters: Vec<UnregisterReason>,
            summaries: u32,
        }
        impl TraceSink for Counts {
            fn on_register(&mut self, _: &RegisterEvent) {
                self.registers += 1;
            }
            fn on_unregister(&mut self, e: &UnregisterEvent) {
                self.unregisters.push(e.reason);
            }
            fn on_commit_summary(&mut self, _: &CommitSummary) {
                self.summaries += 1;
            }
        }

        let mut stack = SheafStack::default();
        let s = chain(&mut stack, 2);
        stack.set_open(s[0], true);
        stack.set_open(s[1], true);

        let mut sink = Counts::default();
        let _ = stack.commit_traced(&mut Tracer::new(&mut sink));
        stack.set_open(s[1], false);
        let _ = stack.commit_traced(&mut Tracer::new(&mut sink));
        stack.unmount(s[0]);
        let _ = stack.commit_traced(&mut Tracer::new(&mut sink));

        assert_eq!(sink.registers, 2);
        assert_eq!(
            sink.unregisters,
            vec![UnregisterReason::Closed, UnregisterReason::Unmounted]
        );
        assert_eq!(sink.summaries, 3);
    }
}
