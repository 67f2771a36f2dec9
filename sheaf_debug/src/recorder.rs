// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`].

use sheaf_core::trace::{
    CommitSummary, DeepNestingEvent, RegisterEvent, TraceSink, UnregisterEvent, UnregisterReason,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_REGISTER: u8 = 1;
const TAG_UNREGISTER: u8 = 2;
const TAG_DEEP_NESTING: u8 = 3;
const TAG_COMMIT_SUMMARY: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_reason(&mut self, r: UnregisterReason) {
        self.write_u8(match r {
            UnregisterReason::Closed => 0,
            UnregisterReason::Unmounted => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_register(&mut self, e: &RegisterEvent) {
        self.write_u8(TAG_REGISTER);
        self.write_u64(e.commit_index);
        self.write_u32(e.sheet);
        self.write_u32(e.generation);
        self.write_u32(e.depth);
        self.write_u32(e.deepest_open_depth);
    }

    fn on_unregister(&mut self, e: &UnregisterEvent) {
        self.write_u8(TAG_UNREGISTER);
        self.write_u64(e.commit_index);
        self.write_u32(e.sheet);
        self.write_u32(e.generation);
        self.write_u32(e.depth);
        self.write_u32(e.deepest_open_depth);
        self.write_reason(e.reason);
    }

    fn on_deep_nesting(&mut self, e: &DeepNestingEvent) {
        self.write_u8(TAG_DEEP_NESTING);
        self.write_u64(e.commit_index);
        self.write_u32(e.depth);
        self.write_u32(e.threshold);
    }

    fn on_commit_summary(&mut self, s: &CommitSummary) {
        self.write_u8(TAG_COMMIT_SUMMARY);
        self.write_u64(s.commit_index);
        self.write_u32(s.registered);
        self.write_u32(s.unregistered);
        self.write_u32(s.open_sheets);
        self.write_u32(s.deepest_open_depth);
        self.write_u32(s.geometry_updates);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`RegisterEvent`].
    Register(RegisterEvent),
    /// An [`UnregisterEvent`].
    Unregister(UnregisterEvent),
    /// A [`DeepNestingEvent`].
    DeepNesting(DeepNestingEvent),
    /// A [`CommitSummary`].
    CommitSummary(CommitSummary),
}

impl RecordedEvent {
    /// The commit the event belongs to.
    #[must_use]
    pub fn commit_index(&self) -> u64 {
        match self {
            Self::Register(e) => e.commit_index,
            Self::Unregister(e) => e.commit_index,
            Self::DeepNesting(e) => e.commit_index,
            Self::CommitSummary(s) => s.commit_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first record that does not decode, including an
/// out-of-range enum byte.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_reason(&mut self) -> Option<UnregisterReason> {
        match self.read_u8()? {
            0 => Some(UnregisterReason::Closed),
            1 => Some(UnregisterReason::Unmounted),
            _ => None,
        }
    }

    fn decode_register(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Register(RegisterEvent {
            commit_index: self.read_u64()?,
            sheet: self.read_u32()?,
            generation: self.read_u32()?,
            depth: self.read_u32()?,
            deepest_open_depth: self.read_u32()?,
        }))
    }

    fn decode_unregister(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Unregister(UnregisterEvent {
            commit_index: self.read_u64()?,
            sheet: self.read_u32()?,
            generation: self.read_u32()?,
            depth: self.read_u32()?,
            deepest_open_depth: self.read_u32()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_deep_nesting(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DeepNesting(DeepNestingEvent {
            commit_index: self.read_u64()?,
            depth: self.read_u32()?,
            threshold: self.read_u32()?,
        }))
    }

    fn decode_commit_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CommitSummary(CommitSummary {
            commit_index: self.read_u64()?,
            registered: self.read_u32()?,
            unregistered: self.read_u32()?,
            open_sheets: self.read_u32()?,
            deepest_open_depth: self.read_u32()?,
            geometry_updates: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_REGISTER => self.decode_register(),
            TAG_UNREGISTER => self.decode_unregister(),
            TAG_DEEP_NESTING => self.decode_deep_nesting(),
            TAG_COMMIT_SUMMARY => self.decode_commit_summary(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use sheaf_core::config::StackConfig;
    use sheaf_core::sheet::SheafStack;
    use sheaf_core::trace::Tracer;

    use super::*;

    #[test]
    fn records_a_commit_sequence() {
        let mut stack = SheafStack::new(StackConfig::new().with_safe_nesting_threshold(1));
        let a = stack.mount(stack.root_scope());
        let b = stack.mount(stack.child_scope(a));
        let c = stack.mount(stack.child_scope(b));
        stack.set_open(a, true);
        stack.set_open(b, true);
        stack.set_open(c, true);

        let mut rec = RecorderSink::new();
        let _ = stack.commit_traced(&mut Tracer::new(&mut rec));
        stack.unmount(b);
        let _ = stack.commit_traced(&mut Tracer::new(&mut rec));

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        let tags: Vec<&str> = events
            .iter()
            .map(|e| match e {
                RecordedEvent::Register(_) => "register",
                RecordedEvent::Unregister(_) => "unregister",
                RecordedEvent::DeepNesting(_) => "deep",
                RecordedEvent::CommitSummary(_) => "summary",
            })
            .collect();
        assert_eq!(
            tags,
            [
                "register",
                "register",
                "register",
                "deep",
                "summary",
                "unregister",
                "unregister",
                "summary",
            ]
        );

        match &events[3] {
            RecordedEvent::DeepNesting(e) => {
                assert_eq!(e.depth, 2);
                assert_eq!(e.threshold, 1);
            }
            other => panic!("expected DeepNesting, got {other:?}"),
        }
        match &events[5] {
            RecordedEvent::Unregister(e) => {
                assert_eq!(e.sheet, c.index());
                assert_eq!(e.reason, UnregisterReason::Unmounted);
            }
            other => panic!("expected Unregister, got {other:?}"),
        }
        match &events[7] {
            RecordedEvent::CommitSummary(s) => {
                assert_eq!(s.commit_index, 2);
                assert_eq!(s.unregistered, 2);
                assert_eq!(s.open_sheets, 1);
                assert_eq!(s.deepest_open_depth, 0);
            }
            other => panic!("expected CommitSummary, got {other:?}"),
        }
        assert!(events[..5].iter().all(|e| e.commit_index() == 1));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_deep_nesting(&DeepNestingEvent {
            commit_index: 1,
            depth: 12,
            threshold: 10,
        });
        rec.on_deep_nesting(&DeepNestingEvent {
            commit_index: 2,
            depth: 13,
            threshold: 10,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn corrupt_reason_stops_iteration() {
        let event = UnregisterEvent {
            commit_index: 4,
            sheet: 2,
            generation: 1,
            depth: 1,
            deepest_open_depth: 0,
            reason: UnregisterReason::Unmounted,
        };
        let mut rec = RecorderSink::new();
        rec.on_unregister(&event);
        rec.on_unregister(&event);
        let mut bytes = rec.into_bytes();

        // The reason is the last byte of each record.
        let record_len = bytes.len() / 2;
        bytes[record_len - 1] = 7;
        assert_eq!(decode(&bytes).count(), 0);

        bytes[record_len - 1] = 1;
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 2);
        match &events[1] {
            RecordedEvent::Unregister(e) => assert_eq!(e.reason, UnregisterReason::Unmounted),
            other => panic!("expected Unregister, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        assert_eq!(decode(&[0xff, 0, 0, 0]).count(), 0);
        assert_eq!(decode(&[]).count(), 0);
    }
}
