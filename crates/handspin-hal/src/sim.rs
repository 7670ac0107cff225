//! In-process simulation drivers for running the stack without a camera or a
//! display.
//!
//! [`ScriptedLandmarkSource`] plays back a list of [`ScriptedFrame`]s at a
//! fixed frame interval, synthesising 21-point hands that classify to the
//! requested gesture.  [`RecordingRenderTarget`] keeps the last values the
//! controller wrote so they can be asserted on from another thread.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use handspin_hal::LandmarkSource;
//! use handspin_hal::sim::{ScriptedFrame, ScriptedLandmarkSource};
//! use handspin_types::GestureState;
//!
//! let mut source = ScriptedLandmarkSource::new(
//!     "sim",
//!     vec![ScriptedFrame::hand(0.7, 0.3, GestureState::Open), ScriptedFrame::NoHand],
//! )
//! .with_frame_interval(Duration::ZERO);
//!
//! let points = source.try_get_frame().unwrap().expect("hand present");
//! assert_eq!(points.len(), 21);
//! assert!(source.try_get_frame().unwrap().is_none());
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use handspin_types::{GestureState, HandspinError, LANDMARK_COUNT, Landmark, MotionMode, Rgb};
use tracing::debug;

use crate::landmark_source::LandmarkSource;
use crate::render_target::RenderTarget;

// ────────────────────────────────────────────────────────────────────────────
// Hand synthesis
// ────────────────────────────────────────────────────────────────────────────

/// Horizontal offsets of index, middle, ring and pinky from the index finger.
const FINGER_SPREAD: [f32; 4] = [0.0, 0.03, 0.06, 0.09];

/// Build a right hand, as seen in a mirrored feed, whose index fingertip sits
/// at `(x, y)` and whose finger layout classifies as `gesture`.
///
/// FIST curls every finger, OPEN raises all five, OTHER raises only the index
/// finger.
pub fn synthesize_hand(x: f32, y: f32, gesture: GestureState) -> Vec<Landmark> {
    let (thumb_up, fingers_up) = match gesture {
        GestureState::Fist => (false, [false; 4]),
        GestureState::Open => (true, [true; 4]),
        GestureState::Other => (false, [true, false, false, false]),
    };

    let mut points = vec![Landmark::default(); LANDMARK_COUNT];
    points[0] = Landmark::new(x + 0.04, y + 0.30);

    // Thumb: 1..=4, CMC → TIP.  Up means tip left of the IP joint.
    points[1] = Landmark::new(x - 0.01, y + 0.25);
    points[2] = Landmark::new(x - 0.04, y + 0.20);
    points[3] = Landmark::new(x - 0.06, y + 0.15);
    points[4] = if thumb_up {
        Landmark::new(x - 0.10, y + 0.12)
    } else {
        Landmark::new(x - 0.03, y + 0.15)
    };

    // Fingers: MCP, PIP, DIP, TIP at 5..=8, 9..=12, 13..=16, 17..=20.
    for (f, (&dx, &up)) in FINGER_SPREAD.iter().zip(fingers_up.iter()).enumerate() {
        let base = 5 + 4 * f;
        let fx = x + dx;
        // Every fingertip sits on row `y`, curled or not.
        let tip_y = y;
        let (mcp, pip, dip) = if up {
            (tip_y + 0.15, tip_y + 0.10, tip_y + 0.05)
        } else {
            (tip_y + 0.04, tip_y - 0.04, tip_y - 0.02)
        };
        points[base] = Landmark::new(fx, mcp);
        points[base + 1] = Landmark::new(fx, pip);
        points[base + 2] = Landmark::new(fx, dip);
        points[base + 3] = Landmark::new(fx, tip_y);
    }

    points
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted landmark source
// ────────────────────────────────────────────────────────────────────────────

/// One step of a scripted capture session.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedFrame {
    /// A detected hand with its index fingertip at `(x, y)`.
    Hand { x: f32, y: f32, gesture: GestureState },
    /// A frame with no hand in view.
    NoHand,
    /// A frame the camera failed to deliver.
    ReadFailure,
    /// A detector bug: a landmark set with the wrong number of points.
    Malformed(usize),
}

impl ScriptedFrame {
    pub fn hand(x: f32, y: f32, gesture: GestureState) -> Self {
        ScriptedFrame::Hand { x, y, gesture }
    }
}

/// Plays back [`ScriptedFrame`]s, sleeping `frame_interval` before each one
/// to stand in for a blocking camera read.
#[derive(Debug)]
pub struct ScriptedLandmarkSource {
    id: String,
    frames: Vec<ScriptedFrame>,
    cursor: usize,
    looping: bool,
    frame_interval: Duration,
    released: Arc<Mutex<bool>>,
}

impl ScriptedLandmarkSource {
    /// Default pacing, roughly a 30 fps webcam.
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

    pub fn new(id: impl Into<String>, frames: Vec<ScriptedFrame>) -> Self {
        Self {
            id: id.into(),
            frames,
            cursor: 0,
            looping: false,
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
            released: Arc::new(Mutex::new(false)),
        }
    }

    /// Restart from the first frame instead of reporting exhaustion.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Shared flag that flips to `true` once [`LandmarkSource::release`] runs.
    pub fn release_flag(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.released)
    }

    /// A looping tour through every behaviour of the controller: slow
    /// open-hand tracking, a flick, a hold, a fist, an in-between gesture and
    /// a few bad frames.
    pub fn demo() -> Self {
        let mut frames = Vec::new();

        // Settle at the centre.
        frames.extend((0..30).map(|_| ScriptedFrame::hand(0.5, 0.5, GestureState::Open)));

        // Slow sweep right and down: direct tracking.
        for i in 0..60 {
            let t = i as f32 / 60.0;
            frames.push(ScriptedFrame::hand(0.5 + 0.2 * t, 0.5 + 0.1 * t, GestureState::Open));
        }

        // Flick back left across the frame, then hold still.
        for x in [0.6, 0.45, 0.3] {
            frames.push(ScriptedFrame::hand(x, 0.6, GestureState::Open));
        }
        frames.extend((0..60).map(|_| ScriptedFrame::hand(0.3, 0.6, GestureState::Open)));

        // Fist: colour cycle.
        frames.extend((0..90).map(|_| ScriptedFrame::hand(0.3, 0.6, GestureState::Fist)));

        // Hand leaves, one dropped frame, one detector glitch.
        frames.extend((0..15).map(|_| ScriptedFrame::NoHand));
        frames.push(ScriptedFrame::ReadFailure);
        frames.push(ScriptedFrame::Malformed(17));

        // Pointing finger: rotates like an open hand.
        frames.extend((0..30).map(|_| ScriptedFrame::hand(0.5, 0.5, GestureState::Other)));

        Self::new("demo", frames).looping()
    }
}

impl LandmarkSource for ScriptedLandmarkSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn try_get_frame(&mut self) -> Result<Option<Vec<Landmark>>, HandspinError> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Err(HandspinError::SourceExhausted(self.id.clone()));
            }
            debug!(source = %self.id, "script restarted");
            self.cursor = 0;
        }

        if !self.frame_interval.is_zero() {
            thread::sleep(self.frame_interval);
        }

        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;

        match frame {
            ScriptedFrame::Hand { x, y, gesture } => Ok(Some(synthesize_hand(x, y, gesture))),
            ScriptedFrame::NoHand => Ok(None),
            ScriptedFrame::ReadFailure => Err(HandspinError::AcquisitionFailure {
                source_id: self.id.clone(),
                details: "scripted read failure".to_string(),
            }),
            ScriptedFrame::Malformed(n) => Ok(Some(vec![Landmark::new(0.5, 0.5); n])),
        }
    }

    fn release(&mut self) {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner) = true;
        debug!(source = %self.id, "scripted source released");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recording render target
// ────────────────────────────────────────────────────────────────────────────

/// Last values written to a [`RecordingRenderTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderSnapshot {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub color: Rgb,
    pub mode: Option<MotionMode>,
    pub gesture: Option<GestureState>,
    /// Number of `set_rotation` calls so far.
    pub writes: u64,
}

/// A render target that stores what it is told.  Clones share one snapshot,
/// so a test can keep a clone while the render loop owns the original.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderTarget {
    inner: Arc<Mutex<RenderSnapshot>>,
}

impl RecordingRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut RenderSnapshot)) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard);
    }
}

impl RenderTarget for RecordingRenderTarget {
    fn set_rotation(&mut self, x_deg: f32, y_deg: f32) {
        self.update(|s| {
            s.rotation_x = x_deg;
            s.rotation_y = y_deg;
            s.writes += 1;
        });
    }

    fn set_color(&mut self, color: Rgb) {
        self.update(|s| s.color = color);
    }

    fn show_gesture(&mut self, gesture: GestureState) {
        self.update(|s| s.gesture = Some(gesture));
    }

    fn show_mode(&mut self, mode: MotionMode) {
        self.update(|s| s.mode = Some(mode));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
