//! `handspin-perception` – turns raw hand landmarks into perception samples.
//!
//! # Modules
//!
//! - [`landmarks`] – anatomical indices of the 21-point hand model.
//! - [`classifier`] – [`classify`][classifier::classify]: coarse finger
//!   counting that maps a landmark set to a
//!   [`GestureState`][handspin_types::GestureState].
//! - [`sample_channel`] – [`sample_channel`][sample_channel::sample_channel]:
//!   single-slot, latest-wins hand-off of
//!   [`PerceptionSample`][handspin_types::PerceptionSample]s between the
//!   capture and render cadences.

pub mod classifier;
pub mod landmarks;
pub mod sample_channel;

pub use classifier::{classify, count_fingers_up, sample_from_landmarks};
pub use sample_channel::{SampleReader, SampleWriter, sample_channel};
