//! Inertial motion controller.
//!
//! Once per render tick, [`InertialController::tick`] consumes the latest
//! [`PerceptionSample`] and advances the controlled object's rotation and
//! colour.  The mode is re-derived from the gesture on every tick, with no
//! hysteresis:
//!
//! **Colour cycle** (fist held)
//!
//! - momentum is cancelled on the spot;
//! - hue follows the wall clock at `hue_deg_per_sec`, independent of `dt`;
//! - the object idles around its vertical axis by a fixed step per tick.
//!
//! **Rotate** (any other gesture)
//!
//! - colour is reset to `base_color`;
//! - hand velocity is the per-tick position delta times `velocity_scale`;
//! - a *flick* (either component above `flick_threshold`) integrates
//!   `hand_velocity * dt` into the rotational velocity;
//! - otherwise the rotation eases toward the hand-derived target
//!   `((x - 0.5) * 360, -(y - 0.5) * 360)` by `smoothing` per tick, and
//!   momentum is cleared (see [`MomentumPolicy`] for when);
//! - while momentum exceeds `momentum_epsilon` on either axis the rotation
//!   advances by `velocity * dt`, then velocity is multiplied by `friction`;
//! - once horizontal velocity drops below `snap_threshold` the horizontal
//!   rotation eases toward the nearest multiple of `snap_step_deg`.
//!
//! `friction` and `smoothing` are applied once per tick rather than scaled by
//! `dt`, so settle times are tied to the render rate.  The snap only acts on
//! the horizontal axis.
//!
//! # Example
//!
//! ```rust
//! use handspin_motion::{InertialController, MotionConfig, MotionMode};
//! use handspin_types::{GestureState, PerceptionSample};
//!
//! let mut ctl = InertialController::new(MotionConfig::default());
//!
//! // A fast sideways hand motion imparts horizontal spin.
//! let out = ctl.tick(&PerceptionSample::new(0.9, 0.5, GestureState::Open), 0.016, 0.0);
//! assert_eq!(out.mode, MotionMode::Rotate);
//! assert!(out.flick);
//! assert!(ctl.state().rot_vel_y > 0.0);
//!
//! // Closing the hand kills it immediately.
//! ctl.tick(&PerceptionSample::new(0.9, 0.5, GestureState::Fist), 0.016, 0.016);
//! assert_eq!(ctl.state().rot_vel_y, 0.0);
//! ```

use handspin_types::{Hsv, MotionMode, PerceptionSample, Rgb};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{AZURE, hsv_to_rgb};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// What a non-flick tick does to momentum that is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumPolicy {
    /// Track the hand on every non-flick tick and clear momentum each time,
    /// so spin only lasts while the hand keeps moving fast.
    #[default]
    Reference,
    /// Track the hand only once the object has come to rest.  A flick keeps
    /// spinning after the hand stops, decays and snaps to a quadrant.  Suits
    /// a render rate well above the capture rate, where most render ticks see
    /// no hand motion at all.
    Coast,
}

/// Tuning constants for [`InertialController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Converts a normalised position delta per tick into hand velocity.
    pub velocity_scale: f32,
    /// Hand velocity above which a motion counts as a flick.
    pub flick_threshold: f32,
    /// Rotational velocity at or below which momentum is considered spent.
    pub momentum_epsilon: f32,
    /// Per-tick multiplicative velocity decay.
    pub friction: f32,
    /// Horizontal velocity below which the rotation snaps to the grid.
    pub snap_threshold: f32,
    /// Grid spacing for the snap, in degrees.
    pub snap_step_deg: f32,
    /// Per-tick interpolation factor for tracking and snapping.
    pub smoothing: f32,
    /// Constant spin applied each tick while the colour cycles.
    pub idle_spin_deg_per_tick: f32,
    pub hue_deg_per_sec: f32,
    pub cycle_saturation: f32,
    pub cycle_value: f32,
    pub base_color: Rgb,
    pub momentum_policy: MomentumPolicy,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            velocity_scale: 2000.0,
            flick_threshold: 10.0,
            momentum_epsilon: 0.1,
            friction: 0.96,
            snap_threshold: 3.0,
            snap_step_deg: 90.0,
            smoothing: 0.1,
            idle_spin_deg_per_tick: 1.0,
            hue_deg_per_sec: 50.0,
            cycle_saturation: 0.8,
            cycle_value: 0.8,
            base_color: AZURE,
            momentum_policy: MomentumPolicy::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State and output
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the controller remembers between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub prev_hand_x: f32,
    pub prev_hand_y: f32,
    /// Rotational velocity around the horizontal (pitch) axis.
    pub rot_vel_x: f32,
    /// Rotational velocity around the vertical (yaw) axis.
    pub rot_vel_y: f32,
    /// Degrees, unbounded.
    pub rotation_x: f32,
    /// Degrees, unbounded.
    pub rotation_y: f32,
    pub color: Rgb,
}

impl ControllerState {
    /// Object at rest, hand assumed at the frame centre.
    pub fn at_rest(color: Rgb) -> Self {
        Self {
            prev_hand_x: 0.5,
            prev_hand_y: 0.5,
            rot_vel_x: 0.0,
            rot_vel_y: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            color,
        }
    }
}

/// Values to push to the render target after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionOutput {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub color: Rgb,
    pub mode: MotionMode,
    /// `true` when this tick injected flick momentum.
    pub flick: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// InertialController
// ─────────────────────────────────────────────────────────────────────────────

/// Hand-driven rotation with flick momentum, friction and snap settling.
#[derive(Debug, Clone)]
pub struct InertialController {
    config: MotionConfig,
    state: ControllerState,
    last_mode: Option<MotionMode>,
}

impl InertialController {
    pub fn new(config: MotionConfig) -> Self {
        let state = ControllerState::at_rest(config.base_color);
        Self::with_state(config, state)
    }

    /// Start from an explicit state instead of rest.
    pub fn with_state(config: MotionConfig, state: ControllerState) -> Self {
        Self {
            config,
            state,
            last_mode: None,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Rotation the hand position asks for, `(x_deg, y_deg)`.
    pub fn target_rotation(sample: &PerceptionSample) -> (f32, f32) {
        let target_y = (sample.hand_x - 0.5) * 360.0;
        let target_x = -(sample.hand_y - 0.5) * 360.0;
        (target_x, target_y)
    }

    /// `true` while either axis still carries momentum.
    pub fn has_momentum(&self) -> bool {
        let eps = self.config.momentum_epsilon;
        self.state.rot_vel_x.abs() > eps || self.state.rot_vel_y.abs() > eps
    }

    /// Advance by one render tick.
    ///
    /// `dt` is the tick duration in seconds; `elapsed_secs` is a monotonic
    /// wall-clock reading that drives the colour-cycle phase.
    pub fn tick(&mut self, sample: &PerceptionSample, dt: f32, elapsed_secs: f64) -> MotionOutput {
        let hand_vel_x = (sample.hand_x - self.state.prev_hand_x) * self.config.velocity_scale;
        let hand_vel_y = (sample.hand_y - self.state.prev_hand_y) * self.config.velocity_scale;
        self.state.prev_hand_x = sample.hand_x;
        self.state.prev_hand_y = sample.hand_y;

        let mode = MotionMode::from(sample.gesture);
        if self.last_mode != Some(mode) {
            debug!(?mode, gesture = %sample.gesture, "motion mode changed");
            self.last_mode = Some(mode);
        }

        let flick = match mode {
            MotionMode::ColorCycle => {
                self.color_cycle(elapsed_secs);
                false
            }
            MotionMode::Rotate => self.rotate(sample, hand_vel_x, hand_vel_y, dt),
        };

        MotionOutput {
            rotation_x: self.state.rotation_x,
            rotation_y: self.state.rotation_y,
            color: self.state.color,
            mode,
            flick,
        }
    }

    fn color_cycle(&mut self, elapsed_secs: f64) {
        self.state.rot_vel_x = 0.0;
        self.state.rot_vel_y = 0.0;

        let hue = (elapsed_secs * f64::from(self.config.hue_deg_per_sec)).rem_euclid(360.0) as f32;
        self.state.color = hsv_to_rgb(Hsv::new(
            hue,
            self.config.cycle_saturation,
            self.config.cycle_value,
        ));

        self.state.rotation_y += self.config.idle_spin_deg_per_tick;
    }

    /// Returns `true` when the tick was a flick.
    fn rotate(&mut self, sample: &PerceptionSample, hand_vel_x: f32, hand_vel_y: f32, dt: f32) -> bool {
        let cfg = &self.config;
        self.state.color = cfg.base_color;

        let flick = hand_vel_x.abs() > cfg.flick_threshold || hand_vel_y.abs() > cfg.flick_threshold;
        if flick {
            self.state.rot_vel_y += hand_vel_x * dt;
            self.state.rot_vel_x += hand_vel_y * dt;
            debug!(
                hand_vel_x,
                hand_vel_y,
                rot_vel_x = self.state.rot_vel_x,
                rot_vel_y = self.state.rot_vel_y,
                "flick"
            );
        } else if cfg.momentum_policy == MomentumPolicy::Reference || !self.has_momentum() {
            let (target_x, target_y) = Self::target_rotation(sample);
            let t = self.config.smoothing;
            self.state.rotation_y = lerp(self.state.rotation_y, target_y, t);
            self.state.rotation_x = lerp(self.state.rotation_x, target_x, t);
            self.state.rot_vel_x = 0.0;
            self.state.rot_vel_y = 0.0;
        }

        if self.has_momentum() {
            let cfg = &self.config;
            self.state.rotation_y += self.state.rot_vel_y * dt;
            self.state.rotation_x += self.state.rot_vel_x * dt;
            self.state.rot_vel_y *= cfg.friction;
            self.state.rot_vel_x *= cfg.friction;

            if self.state.rot_vel_y.abs() < cfg.snap_threshold {
                let snapped = snap_to_grid(self.state.rotation_y, cfg.snap_step_deg);
                self.state.rotation_y = lerp(self.state.rotation_y, snapped, cfg.smoothing);
            }
        }

        flick
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Nearest multiple of `step`; exact midpoints go to the even multiple
/// (45° → 0°, 135° → 180°).
pub fn snap_to_grid(angle: f32, step: f32) -> f32 {
    (angle / step).round_ties_even() * step
}
