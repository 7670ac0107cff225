//! `handspin-motion` – the inertial motion controller.
//!
//! # Modules
//!
//! - [`controller`] – [`InertialController`][controller::InertialController]:
//!   turns the latest perception sample into rotation and colour each render
//!   tick, with flick momentum, friction and snap-to-quadrant settling.
//! - [`color`] – HSV → RGB conversion for the colour cycle.
//! - [`clock`] – monotonic [`Clock`][clock::Clock] used for the colour-cycle
//!   phase.

pub mod clock;
pub mod color;
pub mod controller;

pub use clock::{Clock, ManualClock, SystemClock};
pub use color::{AZURE, hsv_to_rgb};
pub use controller::{ControllerState, InertialController, MomentumPolicy, MotionConfig, MotionOutput};
pub use handspin_types::MotionMode;
