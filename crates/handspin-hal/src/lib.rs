//! `handspin-hal` – boundary with the outside world.
//!
//! The rest of the stack only talks to the two traits defined here, so a
//! webcam + detector pipeline, a recorded session or a scripted simulation can
//! be swapped without touching the motion logic.
//!
//! # Modules
//!
//! - [`landmark_source`] – [`LandmarkSource`]: yields one landmark frame (or
//!   "no hand") per capture iteration.
//! - [`render_target`] – [`RenderTarget`]: write-only sink for the controlled
//!   object's rotation, colour and mode label.
//! - [`sim`] – scripted source and recording target for headless runs and
//!   tests.
//! - [`replay`] – [`JsonlLandmarkSource`][replay::JsonlLandmarkSource]: reads
//!   frames emitted by an external detector as JSON lines.

pub mod landmark_source;
pub mod render_target;
pub mod replay;
pub mod sim;

pub use landmark_source::LandmarkSource;
pub use render_target::RenderTarget;
