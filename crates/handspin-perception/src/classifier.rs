//! Gesture classifier.
//!
//! Counts raised fingers and thresholds the count:
//!
//! ```text
//! fingers_up == 0  → FIST
//! fingers_up >= 4  → OPEN
//! otherwise        → OTHER
//! ```
//!
//! A non-thumb finger is up when its tip sits above its PIP joint (smaller
//! `y`, image rows grow downward).  The thumb is up when its tip is left of
//! its IP joint (smaller `x`).
//!
//! # Laterality
//!
//! The thumb test assumes a horizontally mirrored, front-facing camera feed
//! showing a right hand.  A left hand, or an unmirrored feed, inverts the
//! thumb result.  The threshold policy is deliberately coarse: four raised
//! fingers already count as OPEN.
//!
//! # Example
//!
//! ```rust
//! use handspin_perception::classifier::classify;
//! use handspin_types::{GestureState, HandLandmarks, Landmark};
//!
//! // Every point at the same spot: no tip is above (or left of) its joint.
//! let hand = HandLandmarks::new([Landmark::new(0.5, 0.5); 21]);
//! assert_eq!(classify(&hand), GestureState::Fist);
//! ```

use handspin_types::{GestureState, HandLandmarks, PerceptionSample};

use crate::landmarks::{FINGER_PIPS, FINGER_TIPS, INDEX_TIP, THUMB_IP, THUMB_TIP};

/// Number of fingers (0–5) counted as raised.
pub fn count_fingers_up(hand: &HandLandmarks) -> u8 {
    let fingers = FINGER_TIPS
        .iter()
        .zip(FINGER_PIPS.iter())
        .filter(|&(&tip, &pip)| hand.point(tip).y < hand.point(pip).y)
        .count() as u8;

    let thumb = u8::from(hand.point(THUMB_TIP).x < hand.point(THUMB_IP).x);
    fingers + thumb
}

/// Classify a landmark set.  Stateless: the previous gesture plays no part.
pub fn classify(hand: &HandLandmarks) -> GestureState {
    match count_fingers_up(hand) {
        0 => GestureState::Fist,
        n if n >= 4 => GestureState::Open,
        _ => GestureState::Other,
    }
}

/// Build the sample published for a detected hand.
///
/// The hand position is tracked at the index fingertip.
pub fn sample_from_landmarks(hand: &HandLandmarks) -> PerceptionSample {
    let tip = hand.point(INDEX_TIP);
    PerceptionSample::new(tip.x, tip.y, classify(hand))
}
