//! `ConsoleRenderTarget` – a terminal HUD standing in for a 3-D viewport.

use colored::{ColoredString, Colorize};
use handspin_hal::RenderTarget;
use handspin_types::{GestureState, MotionMode, Rgb};
use std::io::{self, Stdout, Write};

/// Prints one status line every `every` frames, plus one whenever the mode
/// changes.
pub struct ConsoleRenderTarget<W: Write + Send> {
    out: W,
    every: u64,
    frames: u64,
    rotation: (f32, f32),
    color: Rgb,
    gesture: Option<GestureState>,
    mode: Option<MotionMode>,
}

impl ConsoleRenderTarget<Stdout> {
    pub fn stdout(every: u32) -> Self {
        Self::new(io::stdout(), every)
    }
}

impl<W: Write + Send> ConsoleRenderTarget<W> {
    /// `every == 0` is treated as 1.
    pub fn new(out: W, every: u32) -> Self {
        Self {
            out,
            every: u64::from(every.max(1)),
            frames: 0,
            rotation: (0.0, 0.0),
            color: Rgb::default(),
            gesture: None,
            mode: None,
        }
    }

    /// Frames shown so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn hud_line(&self, mode: MotionMode) -> String {
        let (x, y) = self.rotation;
        let gesture = self
            .gesture
            .map(gesture_label)
            .unwrap_or_else(|| "Mode: -".dimmed());
        format!(
            "  {}  {}  rot x={:>8.1}° y={:>8.1}°  color {} {}",
            gesture,
            mode_label(mode),
            x,
            y,
            self.color.to_hex(),
            swatch(self.color),
        )
    }
}

impl<W: Write + Send> RenderTarget for ConsoleRenderTarget<W> {
    fn set_rotation(&mut self, x_deg: f32, y_deg: f32) {
        self.rotation = (x_deg, y_deg);
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn show_gesture(&mut self, gesture: GestureState) {
        self.gesture = Some(gesture);
    }

    /// Called last in each frame, so it doubles as the frame boundary.
    fn show_mode(&mut self, mode: MotionMode) {
        let changed = self.mode != Some(mode);
        self.mode = Some(mode);
        self.frames += 1;

        if changed || self.frames % self.every == 0 {
            let line = self.hud_line(mode);
            // A closed stdout must not take the render loop down.
            let _ = writeln!(self.out, "{line}");
        }
    }
}

fn mode_label(mode: MotionMode) -> ColoredString {
    let c = mode.label_color();
    mode.label().truecolor(channel(c.r), channel(c.g), channel(c.b)).bold()
}

/// `Mode: FIST` and friends, in the gesture's skeleton colour.
fn gesture_label(gesture: GestureState) -> ColoredString {
    let c = gesture.indicator_color();
    format!("Mode: {gesture}").truecolor(channel(c.r), channel(c.g), channel(c.b))
}

fn swatch(color: Rgb) -> ColoredString {
    "■■".truecolor(channel(color.r), channel(color.g), channel(color.b))
}

fn channel(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(t: &mut ConsoleRenderTarget<Vec<u8>>, rot: (f32, f32), color: Rgb, mode: MotionMode) {
        t.set_rotation(rot.0, rot.1);
        t.set_color(color);
        t.show_mode(mode);
    }

    #[test]
    fn hud_shows_the_perceived_gesture() {
        let mut t = ConsoleRenderTarget::new(Vec::new(), 1);
        frame(&mut t, (0.0, 0.0), Rgb::default(), MotionMode::Rotate);
        t.show_gesture(GestureState::Other);
        frame(&mut t, (0.0, 0.0), Rgb::default(), MotionMode::Rotate);

        let out = lines(t);
        assert!(out[0].contains("Mode: -"));
        assert!(out[1].contains("Mode: OTHER"));
        assert!(out[1].contains("PHYSICS ROTATE"));
    }

    #[test]
    fn gesture_label_uses_indicator_color() {
        colored::control::set_override(true);
        let fist = gesture_label(GestureState::Fist).to_string();
        assert!(fist.contains("Mode: FIST"));
        // Truecolor escape for pure red.
        assert!(fist.contains("38;2;255;0;0"), "{fist:?}");
    }

    fn lines(t: ConsoleRenderTarget<Vec<u8>>) -> Vec<String> {
        String::from_utf8(t.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn first_frame_prints_label_rotation_and_hex() {
        let mut t = ConsoleRenderTarget::new(Vec::new(), 15);
        frame(&mut t, (12.5, -90.0), Rgb::new(0.0, 0.5, 1.0), MotionMode::Rotate);

        let out = lines(t);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("MODE: PHYSICS ROTATE (Open Hand)"));
        assert!(out[0].contains("12.5"));
        assert!(out[0].contains("-90.0"));
        assert!(out[0].contains("#0080ff"));
    }

    #[test]
    fn prints_every_nth_frame_while_mode_is_steady() {
        let mut t = ConsoleRenderTarget::new(Vec::new(), 3);
        for _ in 0..9 {
            frame(&mut t, (0.0, 0.0), Rgb::default(), MotionMode::Rotate);
        }
        assert_eq!(t.frames(), 9);
        // frame 1 (new mode), then 3, 6, 9
        assert_eq!(lines(t).len(), 4);
    }

    #[test]
    fn mode_change_prints_immediately() {
        let mut t = ConsoleRenderTarget::new(Vec::new(), 100);
        frame(&mut t, (0.0, 0.0), Rgb::default(), MotionMode::Rotate);
        frame(&mut t, (0.0, 0.0), Rgb::default(), MotionMode::Rotate);
        frame(&mut t, (0.0, 0.0), Rgb::new(0.8, 0.16, 0.16), MotionMode::ColorCycle);

        let out = lines(t);
        assert_eq!(out.len(), 2);
        assert!(out[1].contains("COLOR CYCLE (Fist)"));
    }

    #[test]
    fn zero_interval_prints_every_frame() {
        let mut t = ConsoleRenderTarget::new(Vec::new(), 0);
        for _ in 0..4 {
            frame(&mut t, (0.0, 0.0), Rgb::default(), MotionMode::ColorCycle);
        }
        assert_eq!(lines(t).len(), 4);
    }

    #[test]
    fn channel_quantisation_clamps() {
        assert_eq!(channel(-0.2), 0);
        assert_eq!(channel(0.5), 128);
        assert_eq!(channel(1.3), 255);
    }
}
