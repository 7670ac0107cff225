//! `LandmarkSource` trait for hand-landmark producers.

use handspin_types::{HandspinError, Landmark};

/// A producer of hand landmarks, polled once per capture iteration.
///
/// The detector behind it is a black box.  Points are returned unvalidated;
/// the capture loop checks the count before classifying.
pub trait LandmarkSource: Send {
    /// Stable identifier, e.g. `"webcam0"` or `"demo"`.
    fn id(&self) -> &str;

    /// Block until the next frame is available and return its landmarks.
    ///
    /// Returns `Ok(None)` when the frame contains no hand.
    ///
    /// # Errors
    ///
    /// - [`HandspinError::AcquisitionFailure`] or [`HandspinError::Replay`]
    ///   when this frame could not be read; the caller skips it.
    /// - [`HandspinError::SourceExhausted`] when no further frames will ever
    ///   arrive.
    fn try_get_frame(&mut self) -> Result<Option<Vec<Landmark>>, HandspinError>;

    /// Release the underlying device.  Called once when capture stops.
    fn release(&mut self) {}
}
