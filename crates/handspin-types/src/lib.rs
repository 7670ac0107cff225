//! Shared data model for the handspin stack: hand landmarks, gesture states,
//! perception samples, colours and the workspace-wide error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks produced per hand by the landmark detector.
pub const LANDMARK_COUNT: usize = 21;

/// A single tracked hand point in normalised image coordinates.
///
/// `x` grows to the right and `y` grows downward.  Values are nominally in
/// `[0, 1]` but tracking noise may push them slightly outside; they are never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A complete, validated set of [`LANDMARK_COUNT`] landmarks for one hand.
///
/// The only way to build one from detector output is
/// [`HandLandmarks::try_from`], which rejects any other point count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub const fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Landmark at anatomical index `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= LANDMARK_COUNT`.
    pub fn point(&self, idx: usize) -> Landmark {
        self.points[idx]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarks {
    type Error = HandspinError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        let count = points.len();
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| HandspinError::MalformedLandmarkSet { count })?;
        Ok(Self { points })
    }
}

/// Discrete hand pose recognised from a landmark set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GestureState {
    /// No finger counted as raised.
    Fist,
    /// Four or five fingers counted as raised.
    Open,
    /// Anything in between.
    Other,
}

impl GestureState {
    pub fn label(&self) -> &'static str {
        match self {
            GestureState::Fist => "FIST",
            GestureState::Open => "OPEN",
            GestureState::Other => "OTHER",
        }
    }

    /// Colour used for the hand skeleton overlay while this gesture is held.
    pub fn indicator_color(&self) -> Rgb {
        match self {
            GestureState::Fist => Rgb::new(1.0, 0.0, 0.0),
            GestureState::Open => Rgb::new(0.0, 1.0, 0.0),
            GestureState::Other => Rgb::new(1.0, 0.0, 1.0),
        }
    }
}

impl std::fmt::Display for GestureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The latest reading handed from the capture cadence to the render cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptionSample {
    /// Horizontal hand position, normalised.
    pub hand_x: f32,
    /// Vertical hand position, normalised (grows downward).
    pub hand_y: f32,
    pub gesture: GestureState,
}

impl PerceptionSample {
    pub const fn new(hand_x: f32, hand_y: f32, gesture: GestureState) -> Self {
        Self {
            hand_x,
            hand_y,
            gesture,
        }
    }
}

impl Default for PerceptionSample {
    /// Centre of the frame with an open hand, used before the first detection.
    fn default() -> Self {
        Self::new(0.5, 0.5, GestureState::Open)
    }
}

/// Behaviour the motion controller applies on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Fist held: rainbow colour cycle with a constant idle spin.
    ColorCycle,
    /// Any other gesture: hand-driven rotation with flick momentum.
    Rotate,
}

impl MotionMode {
    /// On-screen mode label.
    pub fn label(&self) -> &'static str {
        match self {
            MotionMode::ColorCycle => "MODE: COLOR CYCLE (Fist)",
            MotionMode::Rotate => "MODE: PHYSICS ROTATE (Open Hand)",
        }
    }

    /// Colour of the on-screen mode label.
    pub fn label_color(&self) -> Rgb {
        match self {
            MotionMode::ColorCycle => Rgb::new(1.0, 0.0, 0.0),
            MotionMode::Rotate => Rgb::new(0.0, 1.0, 0.0),
        }
    }
}

impl From<GestureState> for MotionMode {
    /// Only a fist selects the colour cycle; OPEN and OTHER both rotate.
    fn from(gesture: GestureState) -> Self {
        match gesture {
            GestureState::Fist => MotionMode::ColorCycle,
            GestureState::Open | GestureState::Other => MotionMode::Rotate,
        }
    }
}

/// Linear RGB colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` representation, channels clamped to `[0, 1]`.
    pub fn to_hex(&self) -> String {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
    }
}

/// Hue/saturation/value colour; `h` in degrees, `s` and `v` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }
}

/// Error type shared by every handspin crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandspinError {
    #[error("Malformed landmark set: expected 21 points, got {count}")]
    MalformedLandmarkSet { count: usize },

    #[error("Acquisition failure on {source_id}: {details}")]
    AcquisitionFailure { source_id: String, details: String },

    #[error("Landmark source {0} is exhausted")]
    SourceExhausted(String),

    #[error("Replay error at line {line}: {details}")]
    Replay { line: usize, details: String },
}
