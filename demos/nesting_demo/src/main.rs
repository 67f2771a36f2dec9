// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted nested-sheet session that exercises the tracing and diagnostics
//! pipeline.
//!
//! Opens a three-level settings flow, dismisses it from the middle, unmounts
//! it, then drills a deep chain past the safe nesting threshold. Events go to
//! both a [`PrettyPrintSink`](sheaf_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](sheaf_debug::recorder::RecorderSink), and the recording is
//! exported as a Chrome trace JSON file.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufWriter};
use std::rc::Rc;

use sheaf_core::config::{Side, StackConfig};
use sheaf_core::sheet::{ContentSlot, SheafStack, SheetChanges, SheetId};
use sheaf_core::trace::{
    CommitSummary, DeepNestingEvent, RegisterEvent, TraceSink, Tracer, UnregisterEvent,
};

use sheaf_debug::pretty::PrettyPrintSink;
use sheaf_debug::recorder::RecorderSink;

/// Number of sheets in the deep chain; two more than the default threshold.
const DEEP_CHAIN: usize = 12;

/// Forwards every event to two sinks.
struct Fanout<'a> {
    first: &'a mut dyn TraceSink,
    second: &'a mut dyn TraceSink,
}

impl TraceSink for Fanout<'_> {
    fn on_register(&mut self, e: &RegisterEvent) {
        self.first.on_register(e);
        self.second.on_register(e);
    }

    fn on_unregister(&mut self, e: &UnregisterEvent) {
        self.first.on_unregister(e);
        self.second.on_unregister(e);
    }

    fn on_deep_nesting(&mut self, e: &DeepNestingEvent) {
        self.first.on_deep_nesting(e);
        self.second.on_deep_nesting(e);
    }

    fn on_commit_summary(&mut self, s: &CommitSummary) {
        self.first.on_commit_summary(s);
        self.second.on_commit_summary(s);
    }
}

fn main() -> io::Result<()> {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(io::stdout()));
    let mut recorder = RecorderSink::new();

    let mut stack = SheafStack::new(StackConfig::new().with_side(Side::Right));

    // -- three-level flow --------------------------------------------------
    let settings = stack.mount(stack.root_scope());
    let account = stack.mount(stack.child_scope(settings));
    let confirm = stack.mount(stack.child_scope(account));
    for sheet in [settings, account, confirm] {
        stack.set_content(sheet, Some(ContentSlot::new()));
    }

    // The owner keeps `open` state; the backdrop of `account` asks to close.
    let account_request = Rc::new(Cell::new(None::<bool>));
    let sink = Rc::clone(&account_request);
    stack.set_on_open_change(account, Some(Box::new(move |open: bool| sink.set(Some(open)))));

    for sheet in [settings, account, confirm] {
        stack.set_open(sheet, true);
        let changes = commit(&mut stack, &mut pretty, &mut recorder);
        report(&stack, &changes, &[settings, account, confirm]);
    }

    let _ = stack.request_open_change(account, false);
    if let Some(open) = account_request.take() {
        // Closing the middle sheet leaves `confirm` registered.
        stack.set_open(account, open);
    }
    let changes = commit(&mut stack, &mut pretty, &mut recorder);
    report(&stack, &changes, &[settings, account, confirm]);

    stack.unmount(settings);
    let _ = commit(&mut stack, &mut pretty, &mut recorder);

    // -- deep chain --------------------------------------------------------
    let mut scope = stack.root_scope();
    let mut chain = Vec::with_capacity(DEEP_CHAIN);
    for _ in 0..DEEP_CHAIN {
        let sheet = stack.mount(scope);
        stack.set_open(sheet, true);
        scope = stack.child_scope(sheet);
        chain.push(sheet);
    }
    let changes = commit(&mut stack, &mut pretty, &mut recorder);
    if let Some(warning) = changes.deep_nesting {
        println!("advisory: {warning}");
    }
    report(&stack, &changes, &chain[..3]);

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    sheaf_debug::chrome::export(recorder.as_bytes(), &mut writer)?;

    println!("Wrote {path} ({} commits)", stack.commit_index());
    Ok(())
}

fn commit(
    stack: &mut SheafStack,
    pretty: &mut PrettyPrintSink,
    recorder: &mut RecorderSink,
) -> SheetChanges {
    let mut fanout = Fanout {
        first: pretty,
        second: recorder,
    };
    stack.commit_traced(&mut Tracer::new(&mut fanout))
}

fn report(stack: &SheafStack, changes: &SheetChanges, sheets: &[SheetId]) {
    for &sheet in sheets {
        if !stack.is_alive(sheet) || !changes.geometry.contains(&sheet.index()) {
            continue;
        }
        let geometry = stack.geometry(sheet);
        println!(
            "  {sheet:?} depth={} open={} deeper={} transform={} bottom={}",
            stack.depth(sheet),
            stack.is_open(sheet),
            stack.has_deeper_open(sheet),
            geometry.transform().as_deref().unwrap_or("none"),
            geometry.bottom_css().as_deref().unwrap_or("none"),
        );
    }
}
