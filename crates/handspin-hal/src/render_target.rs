//! `RenderTarget` trait for the object the controller drives.

use handspin_types::{GestureState, MotionMode, Rgb};

/// The on-screen object whose transform and colour the controller writes.
///
/// Write-only from the controller's point of view.  Rotations are in degrees
/// and unbounded; presentation wraps them implicitly.
pub trait RenderTarget: Send {
    fn set_rotation(&mut self, x_deg: f32, y_deg: f32);

    fn set_color(&mut self, color: Rgb);

    /// Display the gesture perception currently reports, drawn in
    /// [`GestureState::indicator_color`].  Called before
    /// [`show_mode`][Self::show_mode] each frame.  Targets without a HUD
    /// ignore it.
    fn show_gesture(&mut self, _gesture: GestureState) {}

    /// Display the active mode label.  Called last in each frame.  Targets
    /// without a HUD ignore it.
    fn show_mode(&mut self, _mode: MotionMode) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockTarget {
        rotation: (f32, f32),
        color: Rgb,
    }

    impl RenderTarget for MockTarget {
        fn set_rotation(&mut self, x_deg: f32, y_deg: f32) {
            self.rotation = (x_deg, y_deg);
        }

        fn set_color(&mut self, color: Rgb) {
            self.color = color;
        }
    }

    #[test]
    fn mock_target_records_writes() {
        let mut t = MockTarget::default();
        t.set_rotation(-12.5, 400.0);
        t.set_color(Rgb::new(0.0, 0.5, 1.0));
        t.show_mode(MotionMode::Rotate);
        assert_eq!(t.rotation, (-12.5, 400.0));
        assert_eq!(t.color, Rgb::new(0.0, 0.5, 1.0));
    }
}
