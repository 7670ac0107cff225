//! [`RenderLoop`] – the display cadence.
//!
//! Every frame the loop takes whatever sample is current (never waiting for
//! a fresh one), advances the [`InertialController`] by the measured frame
//! time and pushes rotation, colour, the perceived gesture and the mode to
//! the [`RenderTarget`].
//!
//! The loop ends when the shared stop flag is raised or when the capture side
//! has shut down and dropped its writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use handspin_hal::RenderTarget;
use handspin_motion::{Clock, InertialController, MotionOutput};
use handspin_perception::SampleReader;
use tracing::{info, trace, warn};

use crate::watchdog::{PerceptionHealth, PerceptionWatchdog};

/// Counters reported when the render loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub ticks: u64,
    /// Number of times perception went quiet for longer than the timeout.
    pub stale_episodes: u64,
}

/// Owns the controller and everything it reads from or writes to.
pub struct RenderLoop<T, C> {
    controller: InertialController,
    reader: SampleReader,
    clock: C,
    target: T,
    watchdog: PerceptionWatchdog,
    stats: RenderStats,
}

impl<T: RenderTarget, C: Clock> RenderLoop<T, C> {
    /// `stale_after` only affects logging; see
    /// [`PerceptionWatchdog`][crate::watchdog::PerceptionWatchdog].
    pub fn new(
        controller: InertialController,
        reader: SampleReader,
        clock: C,
        target: T,
        stale_after: Duration,
    ) -> Self {
        Self {
            controller,
            reader,
            clock,
            target,
            watchdog: PerceptionWatchdog::new(stale_after, Instant::now()),
            stats: RenderStats::default(),
        }
    }

    pub fn controller(&self) -> &InertialController {
        &self.controller
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Run one frame of duration `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> MotionOutput {
        self.tick_at(dt, Instant::now())
    }

    /// [`tick`][Self::tick] with an explicit reading of the monotonic clock
    /// used for staleness tracking.
    pub fn tick_at(&mut self, dt: f32, now: Instant) -> MotionOutput {
        let (sample, updated) = self.reader.read_fresh();

        match self.watchdog.observe(updated, now) {
            Some(PerceptionHealth::Stale) => {
                self.stats.stale_episodes += 1;
                warn!(
                    silence_ms = self.watchdog.silence(now).as_millis() as u64,
                    "perception stale; holding last sample"
                );
            }
            Some(PerceptionHealth::Fresh) => info!("perception updates resumed"),
            None => {}
        }

        let out = self.controller.tick(&sample, dt, self.clock.elapsed_secs());
        self.target.set_rotation(out.rotation_x, out.rotation_y);
        self.target.set_color(out.color);
        self.target.show_gesture(sample.gesture);
        self.target.show_mode(out.mode);
        self.stats.ticks += 1;

        trace!(
            dt,
            rotation_x = out.rotation_x,
            rotation_y = out.rotation_y,
            mode = ?out.mode,
            "render tick"
        );
        out
    }

    /// Tick every `frame_interval` until `stop` is raised or capture ends.
    ///
    /// `dt` is measured between consecutive ticks, so a late frame integrates
    /// over the longer interval.  A frame that overruns its slot does not
    /// cause a burst of catch-up ticks.
    pub fn run(&mut self, stop: &AtomicBool, frame_interval: Duration) -> RenderStats {
        info!(frame_interval_ms = frame_interval.as_millis() as u64, "render loop started");

        let mut last = Instant::now();
        let mut next = last + frame_interval;

        while !stop.load(Ordering::Acquire) {
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            next += frame_interval;
            if next < now {
                next = now + frame_interval;
            }

            self.tick_at(dt, now);

            if self.reader.is_closed() {
                info!("perception closed; render loop ending");
                break;
            }
        }

        info!(
            ticks = self.stats.ticks,
            stale_episodes = self.stats.stale_episodes,
            "render loop stopped"
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handspin_hal::sim::RecordingRenderTarget;
    use handspin_motion::{AZURE, ManualClock, MotionConfig, MotionMode};
    use handspin_perception::{SampleWriter, sample_channel};
    use handspin_types::{GestureState, PerceptionSample};
    use std::sync::Arc;

    const DT: f32 = 0.016;

    fn harness() -> (
        SampleWriter,
        RenderLoop<RecordingRenderTarget, ManualClock>,
        RecordingRenderTarget,
        ManualClock,
    ) {
        let (writer, reader) = sample_channel();
        let target = RecordingRenderTarget::new();
        let clock = ManualClock::new();
        let render = RenderLoop::new(
            InertialController::new(MotionConfig::default()),
            reader,
            clock.clone(),
            target.clone(),
            Duration::from_millis(500),
        );
        (writer, render, target, clock)
    }

    #[test]
    fn tick_before_any_detection_uses_default_sample() {
        let (_writer, mut render, target, _clock) = harness();
        let out = render.tick(DT);
        assert_eq!(out.mode, MotionMode::Rotate);
        assert!(!out.flick);
        assert_eq!(out.color, AZURE);
        assert_eq!(target.snapshot().writes, 1);
    }

    #[test]
    fn tick_writes_controller_output_to_target() {
        let (writer, mut render, target, clock) = harness();
        writer.write(PerceptionSample::new(0.5, 0.5, GestureState::Fist));
        clock.set(2.4);

        let out = render.tick(DT);
        let snap = target.snapshot();
        assert_eq!(snap.mode, Some(MotionMode::ColorCycle));
        assert_eq!(snap.color, out.color);
        assert!((snap.color.g - 0.8).abs() < 1e-4);
        assert_eq!((snap.rotation_x, snap.rotation_y), (out.rotation_x, out.rotation_y));
    }

    #[test]
    fn fresh_sample_between_ticks_becomes_a_flick() {
        let (writer, mut render, _target, _clock) = harness();
        render.tick(DT);
        writer.write(PerceptionSample::new(0.9, 0.5, GestureState::Open));
        let out = render.tick(DT);
        assert!(out.flick);
        assert!(render.controller().state().rot_vel_y > 0.0);
    }

    #[test]
    fn only_the_latest_of_several_writes_is_seen() {
        let (writer, mut render, _target, _clock) = harness();
        writer.write(PerceptionSample::new(0.1, 0.5, GestureState::Open));
        writer.write(PerceptionSample::new(0.5, 0.5, GestureState::Open));
        // Intermediate 0.1 was never observed, so no velocity.
        let out = render.tick(DT);
        assert!(!out.flick);
    }

    #[test]
    fn stale_perception_is_reported_but_not_acted_on() {
        let (writer, mut render, _target, _clock) = harness();
        writer.write(PerceptionSample::new(0.7, 0.5, GestureState::Open));
        let t0 = Instant::now();
        render.tick_at(DT, t0);

        let mut shadow = render.controller().clone();
        let sample = PerceptionSample::new(0.7, 0.5, GestureState::Open);
        let out = render.tick_at(DT, t0 + Duration::from_secs(5));
        assert_eq!(render.stats().stale_episodes, 1);
        assert_eq!(out, shadow.tick(&sample, DT, 0.0));

        render.tick_at(DT, t0 + Duration::from_secs(6));
        assert_eq!(render.stats().stale_episodes, 1);

        writer.write(sample);
        render.tick_at(DT, t0 + Duration::from_secs(7));
        assert_eq!(render.stats().stale_episodes, 1);
        assert_eq!(render.stats().ticks, 4);
    }

    #[test]
    fn perceived_gesture_reaches_the_target() {
        let (writer, mut render, target, _clock) = harness();
        render.tick(DT);
        assert_eq!(target.snapshot().gesture, Some(GestureState::Open));

        writer.write(PerceptionSample::new(0.5, 0.5, GestureState::Other));
        render.tick(DT);
        let snap = target.snapshot();
        assert_eq!(snap.gesture, Some(GestureState::Other));
        assert_eq!(snap.mode, Some(MotionMode::Rotate));
    }

    #[test]
    fn every_consumed_write_counts_as_a_heartbeat() {
        let (writer, mut render, _target, _clock) = harness();
        let t0 = Instant::now();
        for i in 1..=10u32 {
            writer.write(PerceptionSample::new(0.5, 0.5, GestureState::Open));
            render.tick_at(DT, t0 + Duration::from_millis(400) * i);
        }
        assert_eq!(render.stats().stale_episodes, 0);
    }

    #[test]
    fn run_returns_when_stop_is_raised() {
        let (_writer, mut render, target, _clock) = harness();
        let stop = Arc::new(AtomicBool::new(false));
        let stopper = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                stop.store(true, Ordering::Release);
            })
        };

        let stats = render.run(&stop, Duration::from_millis(5));
        stopper.join().unwrap();
        assert!(stats.ticks > 0);
        assert_eq!(target.snapshot().writes, stats.ticks);
    }

    #[test]
    fn run_returns_when_capture_side_closes() {
        let (writer, mut render, target, _clock) = harness();
        writer.write(PerceptionSample::new(0.3, 0.3, GestureState::Fist));
        drop(writer);

        let stop = AtomicBool::new(false);
        let stats = render.run(&stop, Duration::from_millis(1));
        assert_eq!(stats.ticks, 1);
        assert_eq!(target.snapshot().mode, Some(MotionMode::ColorCycle));
    }
}
