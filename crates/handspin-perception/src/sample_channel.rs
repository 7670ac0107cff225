//! Latest-wins hand-off of [`PerceptionSample`]s between two cadences.
//!
//! The capture cadence owns a [`SampleWriter`]; the render cadence owns a
//! [`SampleReader`].  The channel holds exactly one slot:
//!
//! - [`SampleWriter::write`] replaces the whole sample in one step and never
//!   blocks, even when the reader is gone.
//! - [`SampleReader::read`] returns the most recently completed write and
//!   never waits for a new one.  A reader can never observe a mix of two
//!   writes' fields.
//!
//! Before any write the slot holds [`PerceptionSample::default`].
//!
//! Backed by [`tokio::sync::watch`], which is usable from plain threads.
//!
//! # Example
//!
//! ```rust
//! use handspin_perception::sample_channel::sample_channel;
//! use handspin_types::{GestureState, PerceptionSample};
//!
//! let (writer, mut reader) = sample_channel();
//! assert_eq!(reader.read(), PerceptionSample::default());
//!
//! writer.write(PerceptionSample::new(0.2, 0.4, GestureState::Fist));
//! writer.write(PerceptionSample::new(0.9, 0.1, GestureState::Open));
//! assert_eq!(reader.read(), PerceptionSample::new(0.9, 0.1, GestureState::Open));
//! ```

use handspin_types::PerceptionSample;
use tokio::sync::watch;
use tracing::trace;

/// Create a connected writer/reader pair seeded with the default sample.
pub fn sample_channel() -> (SampleWriter, SampleReader) {
    let (tx, rx) = watch::channel(PerceptionSample::default());
    (SampleWriter { tx }, SampleReader { rx })
}

/// Capture-side handle.
#[derive(Debug)]
pub struct SampleWriter {
    tx: watch::Sender<PerceptionSample>,
}

impl SampleWriter {
    /// Replace the current sample.
    pub fn write(&self, sample: PerceptionSample) {
        trace!(?sample, "perception sample written");
        self.tx.send_replace(sample);
    }

    /// Create an additional reader, e.g. for a HUD that runs on yet another
    /// cadence.  It starts out having seen the current sample.
    pub fn subscribe(&self) -> SampleReader {
        SampleReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Render-side handle.
#[derive(Debug, Clone)]
pub struct SampleReader {
    rx: watch::Receiver<PerceptionSample>,
}

impl SampleReader {
    /// Return the latest sample and mark it as seen.
    pub fn read(&mut self) -> PerceptionSample {
        *self.rx.borrow_and_update()
    }

    /// Return the latest sample, mark it as seen, and report whether it
    /// arrived since the previous read.
    ///
    /// Both come from the same borrow, so a write landing concurrently is
    /// either returned as fresh or left unseen for the next call.
    pub fn read_fresh(&mut self) -> (PerceptionSample, bool) {
        let current = self.rx.borrow_and_update();
        (*current, current.has_changed())
    }

    /// Return the latest sample without marking it as seen.
    pub fn peek(&self) -> PerceptionSample {
        *self.rx.borrow()
    }

    /// `true` when a write has landed since the previous [`read`][Self::read].
    ///
    /// Returns `false` once the writer is dropped; the last sample stays
    /// readable.
    pub fn has_update(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// `true` once the writer has been dropped (capture has ended).
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handspin_types::GestureState;
    use std::thread;

    #[test]
    fn starts_with_default_sample() {
        let (_writer, mut reader) = sample_channel();
        assert!(!reader.has_update());
        assert_eq!(reader.read(), PerceptionSample::new(0.5, 0.5, GestureState::Open));
    }

    #[test]
    fn latest_write_wins() {
        let (writer, mut reader) = sample_channel();
        for i in 0..10 {
            writer.write(PerceptionSample::new(i as f32 / 10.0, 0.0, GestureState::Other));
        }
        assert!(reader.has_update());
        assert_eq!(reader.read().hand_x, 0.9);
        assert!(!reader.has_update());
    }

    #[test]
    fn read_fresh_flags_each_write_once() {
        let (writer, mut reader) = sample_channel();
        assert_eq!(reader.read_fresh(), (PerceptionSample::default(), false));

        let s = PerceptionSample::new(0.2, 0.3, GestureState::Fist);
        writer.write(s);
        assert_eq!(reader.read_fresh(), (s, true));
        assert_eq!(reader.read_fresh(), (s, false));
        assert!(!reader.has_update());
    }

    #[test]
    fn read_fresh_never_returns_a_new_sample_as_stale() {
        let (writer, mut reader) = sample_channel();
        let producer = thread::spawn(move || {
            for i in 1..=5_000u32 {
                writer.write(PerceptionSample::new(i as f32, 0.0, GestureState::Open));
            }
        });

        let mut last = PerceptionSample::default();
        for _ in 0..20_000 {
            let (s, fresh) = reader.read_fresh();
            if s != last {
                assert!(fresh, "sample {} returned without the fresh flag", s.hand_x);
            }
            last = s;
        }
        producer.join().unwrap();
    }

    #[test]
    fn read_is_repeatable_without_new_writes() {
        let (writer, mut reader) = sample_channel();
        writer.write(PerceptionSample::new(0.3, 0.7, GestureState::Fist));
        let a = reader.read();
        let b = reader.read();
        assert_eq!(a, b);
        assert_eq!(reader.peek(), a);
    }

    #[test]
    fn write_after_reader_dropped_does_not_fail() {
        let (writer, reader) = sample_channel();
        drop(reader);
        writer.write(PerceptionSample::new(0.1, 0.1, GestureState::Fist));
        let mut late = writer.subscribe();
        assert_eq!(late.read().gesture, GestureState::Fist);
    }

    #[test]
    fn reader_keeps_last_sample_after_writer_drops() {
        let (writer, mut reader) = sample_channel();
        writer.write(PerceptionSample::new(0.6, 0.4, GestureState::Other));
        drop(writer);
        assert!(reader.is_closed());
        assert!(!reader.has_update());
        assert_eq!(reader.read(), PerceptionSample::new(0.6, 0.4, GestureState::Other));
    }

    #[test]
    fn concurrent_reads_never_observe_torn_samples() {
        let (writer, mut reader) = sample_channel();
        // Every written sample satisfies hand_y == 1 - hand_x and carries a
        // gesture derived from hand_x, so a torn read would break the relation.
        let producer = thread::spawn(move || {
            for i in 0..5_000u32 {
                let x = (i % 100) as f32 / 100.0;
                let gesture = if i % 2 == 0 {
                    GestureState::Fist
                } else {
                    GestureState::Other
                };
                writer.write(PerceptionSample::new(x, 1.0 - x, gesture));
            }
        });

        for _ in 0..5_000 {
            let s = reader.read();
            if s == PerceptionSample::default() {
                continue;
            }
            assert!((s.hand_x + s.hand_y - 1.0).abs() < 1e-6, "torn sample {s:?}");
            assert_ne!(s.gesture, GestureState::Open);
        }
        producer.join().unwrap();
    }
}
