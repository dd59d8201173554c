//! Fixed-capacity history of snapshots for rewinding.
//!
//! Recording writes at the cursor and moves it forward, overwriting the
//! oldest entry once the ring is full. Rewinding walks the cursor backwards
//! and hands out what it finds. A run of rewinds with no recording in
//! between is a rewind session; it can walk back over everything recorded
//! before the session began but no further, and once it runs out of history
//! it keeps returning the oldest snapshot instead of empty slots.

use crate::snapshot::Snapshot;
use tracing::debug;

pub struct RewindBuffer {
    buf: Vec<Option<Snapshot>>,
    /// next slot to overwrite
    cursor: usize,
    /// snapshots still reachable by rewinding; this is what stops a session
    /// walking past where recording began
    count: usize,
    /// cursor position when the current rewind session began, only reported
    /// by `in_session` and the debug log
    session_start: Option<usize>,
}

impl RewindBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rewind buffer needs at least one slot");
        RewindBuffer {
            buf: vec![None; capacity],
            cursor: 0,
            count: 0,
            session_start: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// snapshots reachable by rewinding
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// true between the first rewind and the next record
    pub fn in_session(&self) -> bool {
        self.session_start.is_some()
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        self.session_start = None;
        self.buf[self.cursor] = Some(snapshot);
        self.cursor = (self.cursor + 1) % self.buf.len();
        self.count = (self.count + 1).min(self.buf.len());
    }

    /// Step back one snapshot. The first call hands back the most recent
    /// recording; when history runs out the oldest one comes back again.
    /// `None` only if nothing has ever been recorded.
    pub fn rewind(&mut self) -> Option<&Snapshot> {
        let start = *self.session_start.get_or_insert(self.cursor);
        if self.count > 0 {
            let previous = (self.cursor + self.buf.len() - 1) % self.buf.len();
            self.cursor = previous;
            self.count -= 1;
            debug!(
                cursor = self.cursor,
                remaining = self.count,
                session_start = start,
                "rewound"
            );
        }
        // with nothing left to step over the cursor already sits on the oldest
        // recording, or on an empty slot if there never was one
        self.buf[self.cursor].as_ref()
    }

    /// forget everything, e.g. when a new program is loaded
    pub fn clear(&mut self) {
        self.buf.iter_mut().for_each(|s| *s = None);
        self.cursor = 0;
        self.count = 0;
        self.session_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Chip8Interpreter, Mode};

    /// snapshot distinguishable by V0
    fn make_snap(frame: u8) -> Snapshot {
        let mut i = Chip8Interpreter::with_seed(Mode::default(), 1);
        i.load_program(&[0x60, frame]).unwrap();
        i.cycle().unwrap();
        i.snapshot()
    }

    fn frame(s: Option<&Snapshot>) -> u8 {
        s.expect("snapshot").state().registers[0]
    }

    #[test]
    fn test_empty_rewind() {
        let mut rb = RewindBuffer::new(4);
        assert!(rb.rewind().is_none());
        assert!(rb.rewind().is_none());
        assert!(rb.in_session());
    }

    #[test]
    fn test_record_then_rewind_returns_latest() {
        let mut rb = RewindBuffer::new(4);
        rb.record(make_snap(1));
        rb.record(make_snap(2));
        assert_eq!(frame(rb.rewind()), 2);
    }

    #[test]
    fn test_single_record_saturates() {
        let mut rb = RewindBuffer::new(4);
        rb.record(make_snap(7));
        assert_eq!(frame(rb.rewind()), 7);
        assert_eq!(frame(rb.rewind()), 7);
        assert_eq!(frame(rb.rewind()), 7);
    }

    #[test]
    fn test_rewind_saturates_at_oldest() {
        let mut rb = RewindBuffer::new(5);
        for f in 1..=3 {
            rb.record(make_snap(f));
        }
        let seen: Vec<u8> = (0..6).map(|_| frame(rb.rewind())).collect();
        assert_eq!(seen, vec![3, 2, 1, 1, 1, 1]);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_wrapped_buffer_keeps_capacity_frames() {
        let mut rb = RewindBuffer::new(3);
        for f in 1..=5 {
            rb.record(make_snap(f));
        }
        assert_eq!(rb.len(), 3);
        let seen: Vec<u8> = (0..5).map(|_| frame(rb.rewind())).collect();
        // 1 and 2 were overwritten, 3 is the oldest left
        assert_eq!(seen, vec![5, 4, 3, 3, 3]);
    }

    #[test]
    fn test_record_mid_session_starts_over() {
        let mut rb = RewindBuffer::new(4);
        for f in 1..=3 {
            rb.record(make_snap(f));
        }
        assert_eq!(frame(rb.rewind()), 3);
        assert_eq!(frame(rb.rewind()), 2);
        assert!(rb.in_session());
        // the machine resumed from frame 2 and recorded a new frame
        rb.record(make_snap(9));
        assert!(!rb.in_session());
        assert_eq!(rb.len(), 2);
        let seen: Vec<u8> = (0..4).map(|_| frame(rb.rewind())).collect();
        assert_eq!(seen, vec![9, 1, 1, 1]);
    }

    #[test]
    fn test_clear() {
        let mut rb = RewindBuffer::new(2);
        rb.record(make_snap(1));
        rb.clear();
        assert!(rb.is_empty());
        assert!(rb.rewind().is_none());
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = RewindBuffer::new(0);
    }
}
