//! Time-driven sequencing for the clean-up choreography.
//!
//! Both sequencers are advanced with explicit durations, so the same code
//! runs on frame time in the app and on hand-picked steps in tests.

use std::collections::VecDeque;
use std::time::Duration;

/// Ordered steps, each firing `delay` after the previous one.
#[derive(Debug, Clone)]
pub struct TimedSteps<T> {
    steps: VecDeque<(Duration, T)>,
    elapsed: Duration,
}

impl<T> Default for TimedSteps<T> {
    fn default() -> Self {
        Self {
            steps: VecDeque::new(),
            elapsed: Duration::ZERO,
        }
    }
}

impl<T> TimedSteps<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delay: Duration, step: T) {
        self.steps.push_back((delay, step));
    }

    /// Move time forward and fire every step that became due, in order.
    pub fn advance(&mut self, delta: Duration, mut on_step: impl FnMut(T)) {
        self.elapsed += delta;
        while let Some((delay, _)) = self.steps.front() {
            if self.elapsed < *delay {
                break;
            }
            self.elapsed -= *delay;
            if let Some((_, step)) = self.steps.pop_front() {
                on_step(step);
            }
        }
        if self.steps.is_empty() {
            self.elapsed = Duration::ZERO;
        }
    }
}

#[cfg(test)]
impl<T> TimedSteps<T> {
    pub fn then(mut self, delay: Duration, step: T) -> Self {
        self.push(delay, step);
        self
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Linear 0 → 1 progress sampled at a fixed polling interval.
#[derive(Debug, Clone)]
pub struct FadeRamp {
    duration: Duration,
    tick: Duration,
    elapsed: Duration,
    since_tick: Duration,
    progress: f32,
}

impl FadeRamp {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            duration,
            tick,
            elapsed: Duration::ZERO,
            since_tick: Duration::ZERO,
            progress: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Returns the new progress when a poll fell due during `delta`.
    pub fn advance(&mut self, delta: Duration) -> Option<f32> {
        if self.is_finished() {
            return None;
        }
        self.elapsed += delta;
        self.since_tick += delta;
        if self.since_tick < self.tick {
            return None;
        }
        // Late polls do not queue up.
        self.since_tick = Duration::ZERO;

        self.progress = if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        Some(self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn steps_fire_in_order_at_their_delays() {
        let mut steps = TimedSteps::new()
            .then(ms(200), 'a')
            .then(ms(200), 'b')
            .then(ms(200), 'c');
        let mut fired = Vec::new();

        steps.advance(ms(199), |step| fired.push(step));
        assert!(fired.is_empty());
        steps.advance(ms(1), |step| fired.push(step));
        assert_eq!(fired, ['a']);
        steps.advance(ms(150), |step| fired.push(step));
        assert_eq!(fired, ['a']);
        steps.advance(ms(250), |step| fired.push(step));
        assert_eq!(fired, ['a', 'b']);
        assert_eq!(steps.remaining(), 1);
    }

    #[test]
    fn a_long_frame_fires_every_due_step() {
        let mut steps = TimedSteps::new().then(ms(200), 1).then(ms(200), 2).then(ms(200), 3);
        let mut fired = Vec::new();
        steps.advance(ms(450), |step| fired.push(step));
        assert_eq!(fired, [1, 2]);
        steps.advance(ms(150), |step| fired.push(step));
        assert_eq!(fired, [1, 2, 3]);
        assert!(steps.is_finished());
    }

    #[test]
    fn ramp_reports_on_poll_ticks_only() {
        let mut ramp = FadeRamp::new(ms(800), ms(16));
        assert_eq!(ramp.advance(ms(10)), None);
        let first = ramp.advance(ms(10)).unwrap();
        assert!((first - 20.0 / 800.0).abs() < 1e-6);
    }

    #[test]
    fn ramp_is_monotonic_and_ends_at_one() {
        let mut ramp = FadeRamp::new(ms(800), ms(16));
        let mut last = 0.0;
        let mut polls = 0;
        while !ramp.is_finished() {
            if let Some(progress) = ramp.advance(ms(16)) {
                assert!(progress >= last);
                last = progress;
                polls += 1;
            }
            assert!(polls <= 100, "ramp never finished");
        }
        assert_eq!(last, 1.0);
        assert_eq!(polls, 50);
        assert_eq!(ramp.advance(ms(16)), None);
    }
}
