//! [`CaptureLoop`] – the perception cadence.
//!
//! Each iteration blocks on [`LandmarkSource::try_get_frame`], then:
//!
//! | Outcome | Action |
//! |---|---|
//! | hand with 21 landmarks | classify, publish one [`PerceptionSample`][handspin_types::PerceptionSample] |
//! | no hand | nothing; the previous sample stays current |
//! | failed read | `warn!`, skip the frame |
//! | wrong landmark count | `warn!`, skip the frame |
//! | source exhausted | stop |
//!
//! The stop flag is checked between frames, so capture winds down within one
//! frame of being signalled.  The source is released on the way out and the
//! [`SampleWriter`] is dropped, which readers can observe via
//! [`SampleReader::is_closed`][handspin_perception::SampleReader::is_closed].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use handspin_hal::sim::{ScriptedFrame, ScriptedLandmarkSource};
//! use handspin_perception::sample_channel;
//! use handspin_runtime::capture_loop::CaptureLoop;
//! use handspin_types::GestureState;
//!
//! let source = ScriptedLandmarkSource::new(
//!     "sim",
//!     vec![ScriptedFrame::hand(0.8, 0.4, GestureState::Fist)],
//! )
//! .with_frame_interval(Duration::ZERO);
//! let (writer, mut reader) = sample_channel();
//!
//! let stats = CaptureLoop::new(Box::new(source), writer, Arc::new(AtomicBool::new(false))).run();
//! assert_eq!(stats.samples_written, 1);
//! assert_eq!(reader.read().gesture, GestureState::Fist);
//! ```

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use handspin_hal::LandmarkSource;
use handspin_perception::{SampleWriter, sample_from_landmarks};
use handspin_types::{HandLandmarks, HandspinError};
use tracing::{debug, info, trace, warn};

/// Counters reported when capture stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frames requested from the source.
    pub frames: u64,
    pub samples_written: u64,
    pub no_hand: u64,
    pub read_failures: u64,
    pub malformed: u64,
}

/// Drives one [`LandmarkSource`] and publishes what it sees.
pub struct CaptureLoop {
    source: Box<dyn LandmarkSource>,
    writer: SampleWriter,
    stop: Arc<AtomicBool>,
}

impl CaptureLoop {
    pub fn new(source: Box<dyn LandmarkSource>, writer: SampleWriter, stop: Arc<AtomicBool>) -> Self {
        Self {
            source,
            writer,
            stop,
        }
    }

    /// Run on a dedicated `handspin-capture` thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(self) -> io::Result<CaptureHandle> {
        let stop = Arc::clone(&self.stop);
        let thread = thread::Builder::new()
            .name("handspin-capture".to_string())
            .spawn(move || self.run())?;
        Ok(CaptureHandle { stop, thread })
    }

    /// Run on the current thread until stopped or the source is exhausted.
    pub fn run(mut self) -> CaptureStats {
        let mut stats = CaptureStats::default();
        info!(source = %self.source.id(), "capture loop started");

        while !self.stop.load(Ordering::Acquire) {
            stats.frames += 1;
            match self.source.try_get_frame() {
                Ok(Some(points)) => match HandLandmarks::try_from(points) {
                    Ok(hand) => {
                        let sample = sample_from_landmarks(&hand);
                        self.writer.write(sample);
                        stats.samples_written += 1;
                        debug!(
                            hand_x = sample.hand_x,
                            hand_y = sample.hand_y,
                            gesture = %sample.gesture,
                            "hand classified"
                        );
                    }
                    Err(e) => {
                        stats.malformed += 1;
                        warn!(source = %self.source.id(), error = %e, "skipping malformed landmark set");
                    }
                },
                Ok(None) => {
                    stats.no_hand += 1;
                    trace!("no hand in frame");
                }
                Err(HandspinError::SourceExhausted(id)) => {
                    info!(source = %id, "landmark source exhausted");
                    break;
                }
                Err(e) => {
                    stats.read_failures += 1;
                    warn!(source = %self.source.id(), error = %e, "frame read failed; skipping");
                }
            }
        }

        self.source.release();
        info!(
            frames = stats.frames,
            samples = stats.samples_written,
            no_hand = stats.no_hand,
            read_failures = stats.read_failures,
            malformed = stats.malformed,
            "capture loop stopped"
        );
        stats
    }
}

/// Handle to a capture loop running on its own thread.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<CaptureStats>,
}

impl CaptureHandle {
    /// Ask the loop to stop after the current frame.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Signal stop and wait for the loop to exit.
    ///
    /// Returns `None` if the capture thread panicked.
    pub fn join(self) -> Option<CaptureStats> {
        self.stop();
        self.thread.join().ok()
    }

    /// Signal stop and wait at most `timeout` for the loop to exit.
    ///
    /// A source blocked on a read that never completes (e.g. an idle stdin
    /// pipe) cannot observe the stop flag; in that case the thread is left
    /// behind and `None` is returned.
    pub fn join_timeout(self, timeout: Duration) -> Option<CaptureStats> {
        self.stop();
        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                warn!(?timeout, "capture thread did not stop in time; abandoning it");
                return None;
            }
            thread::sleep(Duration::from_millis(5));
        }
        self.thread.join().ok()
    }
}
