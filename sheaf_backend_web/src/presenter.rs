// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM element management.
//!
//! Translates [`SheafStack`] state into a set of `<div>` elements by applying
//! incremental updates from [`SheetChanges`].
//!
//! [`SheafStack`]: sheaf_core::sheet::SheafStack
//! [`SheetChanges`]: sheaf_core::sheet::SheetChanges

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use sheaf_core::backend::SheetPresenter;
use sheaf_core::geometry::SheetGeometry;
use sheaf_core::sheet::{ContentProps, SheafStack, SheetChanges};
use wasm_bindgen::JsCast as _;
use web_sys::HtmlElement;

/// Maps a [`SheafStack`] to live DOM elements, applying incremental updates
/// from [`SheetChanges`].
///
/// The presenter owns a container `HtmlElement` to which one child `<div>` per
/// mounted sheet is added and removed. Call [`apply`](SheetPresenter::apply)
/// after each commit to synchronize the DOM with the stack. The sheet's
/// content is rendered into [`element`](Self::element) by the caller.
pub struct DomSheetPresenter {
    container: HtmlElement,
    elements: Vec<Option<HtmlElement>>,
}

impl core::fmt::Debug for DomSheetPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomSheetPresenter")
            .field("container", &"HtmlElement")
            .field("elements_len", &self.elements.len())
            .finish()
    }
}

impl DomSheetPresenter {
    /// Creates a new presenter that manages child elements of `container`.
    #[must_use]
    pub fn new(container: HtmlElement) -> Self {
        Self {
            container,
            elements: Vec::new(),
        }
    }

    /// Returns a reference to the container element.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Returns the DOM element for the given slot index, if it exists.
    #[must_use]
    pub fn element(&self, idx: u32) -> Option<&HtmlElement> {
        self.elements
            .get(idx as usize)
            .and_then(|slot| slot.as_ref())
    }

    fn take_element(&mut self, idx: u32) -> Option<HtmlElement> {
        self.elements.get_mut(idx as usize)?.take()
    }

    fn put_element(&mut self, idx: u32, el: HtmlElement) {
        let slot = idx as usize;
        if self.elements.len() <= slot {
            self.elements.resize_with(slot + 1, || None);
        }
        if let Some(old) = self.elements[slot].replace(el) {
            old.remove();
        }
    }

    /// Creates a hidden sheet element, or `None` if the container is detached.
    fn create_element(&self, stack: &SheafStack) -> Option<HtmlElement> {
        let doc = self.container.owner_document()?;
        let el: HtmlElement = doc.create_element("div").ok()?.unchecked_into();
        let s = el.style();
        let _ = s.set_property("position", "fixed");
        let _ = s.set_property("top", "0");
        let _ = s.set_property(stack.side().as_str(), "0");
        let _ = s.set_property("display", "none");
        let _ = el.set_attribute("data-side", stack.side().as_str());
        Some(el)
    }
}

impl SheetPresenter for DomSheetPresenter {
    /// Applies incremental changes from a [`SheetChanges`] to the DOM.
    fn apply(&mut self, stack: &SheafStack, changes: &SheetChanges) {
        // 1. Removals
        for &idx in &changes.unmounted {
            if let Some(el) = self.take_element(idx) {
                el.remove();
            }
        }

        // 2. Additions
        for &idx in &changes.mounted {
            if let Some(el) = self.create_element(stack) {
                let _ = self.container.append_child(&el);
                self.put_element(idx, el);
            }
        }

        // 3. Visibility. Released slots may already hold a new sheet, so
        //    hide before showing.
        for &idx in &changes.unregistered {
            if let Some(el) = self.element(idx) {
                let _ = el.style().set_property("display", "none");
            }
        }
        for &idx in &changes.registered {
            if let Some(el) = self.element(idx) {
                let _ = el.style().remove_property("display");
            }
        }

        // 4. Props
        for &idx in &changes.props {
            if let Some(el) = self.element(idx) {
                apply_props(el, &stack.props_at(idx));
            }
        }

        // 5. Geometry
        for &idx in &changes.geometry {
            if let Some(el) = self.element(idx) {
                apply_geometry(el, &stack.geometry_at(idx));
            }
        }

        // 6. Topology reorder
        if changes.topology_changed {
            for &idx in stack.traversal_order() {
                if let Some(el) = self.element(idx) {
                    // DOM re-append moves an existing child, so deeper sheets
                    // end up after (above) the ones they are declared in.
                    let _ = self.container.append_child(el);
                }
            }
        }
    }
}

/// Returns the inline style properties for a sheet's geometry.
///
/// A `None` value means the property is removed from the element.
#[must_use]
pub fn style_properties(geometry: &SheetGeometry) -> [(&'static str, Option<String>); 3] {
    [
        ("transform", geometry.transform()),
        ("bottom", geometry.bottom_css()),
        ("transition", Some(geometry.transition_css())),
    ]
}

fn apply_geometry(el: &HtmlElement, geometry: &SheetGeometry) {
    let s = el.style();
    for (name, value) in style_properties(geometry) {
        match value {
            Some(v) => {
                let _ = s.set_property(name, &v);
            }
            None => {
                let _ = s.remove_property(name);
            }
        }
    }
}

fn apply_props(el: &HtmlElement, props: &ContentProps) {
    let _ = el.set_attribute("data-side", props.side.as_str());
    let _ = el.set_attribute("data-depth", &props.depth.to_string());
    if props.has_deeper_open {
        let _ = el.set_attribute("data-has-deeper-open", "");
    } else {
        let _ = el.remove_attribute("data-has-deeper-open");
    }
}
