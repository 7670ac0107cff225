//! `handspin-runtime` – the two cadences and their wiring.
//!
//! # Modules
//!
//! - [`capture_loop`] – [`CaptureLoop`][capture_loop::CaptureLoop]: polls a
//!   [`LandmarkSource`][handspin_hal::LandmarkSource] on its own thread,
//!   classifies each hand and publishes the sample.
//! - [`render_loop`] – [`RenderLoop`][render_loop::RenderLoop]: reads the
//!   latest sample every display frame, runs the
//!   [`InertialController`][handspin_motion::InertialController] and writes the
//!   result to a [`RenderTarget`][handspin_hal::RenderTarget].
//! - [`watchdog`] – [`PerceptionWatchdog`][watchdog::PerceptionWatchdog]:
//!   notices when perception stops delivering updates.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP export.
//!
//! The two loops share nothing but the
//! [`sample_channel`][handspin_perception::sample_channel]; neither ever waits
//! on the other.

pub mod capture_loop;
pub mod render_loop;
pub mod telemetry;
pub mod watchdog;

pub use capture_loop::{CaptureHandle, CaptureLoop, CaptureStats};
pub use render_loop::{RenderLoop, RenderStats};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use watchdog::{PerceptionHealth, PerceptionWatchdog};
