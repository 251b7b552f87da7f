//! Simulation clock: fixed-timestep tick accumulation.

use std::time::{Duration, Instant};

/// Accumulates real time and hands out fixed simulation ticks.
///
/// The simulation step is constant: slow mode changes how often ticks fire,
/// not how much simulated time each tick advances, which is what makes the
/// 20 Hz precision-targeting mode play out in slow motion.
#[derive(Debug)]
pub struct SimClock {
    /// Wall-clock time of the last `update()` call.
    last_update: Instant,
    /// Real time accumulated toward the next tick.
    accumulator: Duration,
    /// Interval between ticks at normal speed.
    normal_interval: Duration,
    /// Interval between ticks in slow mode.
    slow_interval: Duration,
    /// Whether slow mode is currently active.
    slow_mode: bool,
    /// Simulated seconds advanced per tick (constant).
    step: f32,
    /// Ticks produced since construction.
    tick_count: u64,
}

impl SimClock {
    /// Create a clock ticking at `tick_hz` normally and `slow_hz` in slow mode.
    pub fn new(tick_hz: f64, slow_hz: f64) -> Self {
        Self {
            last_update: Instant::now(),
            accumulator: Duration::ZERO,
            normal_interval: Duration::from_secs_f64(1.0 / tick_hz),
            slow_interval: Duration::from_secs_f64(1.0 / slow_hz),
            slow_mode: false,
            step: (1.0 / tick_hz) as f32,
            tick_count: 0,
        }
    }

    /// Accumulate real time elapsed since the previous call.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.accumulator += now - self.last_update;
        self.last_update = now;
    }

    /// Check if a tick should run and consume its interval.
    ///
    /// When the loop falls behind, repeated calls return `true` back-to-back
    /// until the backlog drains; ticks are never skipped or merged.
    pub fn should_tick(&mut self) -> bool {
        let interval = self.interval();
        if self.accumulator >= interval {
            self.accumulator -= interval;
            self.tick_count += 1;
            true
        } else {
            false
        }
    }

    /// Forget accumulated time and restart from now. Called on resume so a
    /// long pause does not burst a backlog of catch-up ticks.
    pub fn skip_to_now(&mut self) {
        self.last_update = Instant::now();
        self.accumulator = Duration::ZERO;
    }

    /// Enable or disable slow mode.
    pub fn set_slow_mode(&mut self, on: bool) {
        self.slow_mode = on;
    }

    pub fn slow_mode(&self) -> bool {
        self.slow_mode
    }

    /// Current interval between ticks.
    pub fn interval(&self) -> Duration {
        if self.slow_mode {
            self.slow_interval
        } else {
            self.normal_interval
        }
    }

    /// Simulated seconds each tick advances.
    pub fn step_seconds(&self) -> f32 {
        self.step
    }

    /// Ticks produced since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time remaining until the next tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.interval().saturating_sub(self.accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_step_is_fixed_regardless_of_mode() {
        let mut clock = SimClock::new(60.0, 20.0);
        let step = clock.step_seconds();
        clock.set_slow_mode(true);
        assert_eq!(clock.step_seconds(), step);
        assert!((step - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn clock_slow_mode_widens_interval() {
        let mut clock = SimClock::new(60.0, 20.0);
        let normal = clock.interval();
        clock.set_slow_mode(true);
        assert!(clock.interval() > normal);
    }

    #[test]
    fn clock_backlog_drains_tick_by_tick() {
        let mut clock = SimClock::new(60.0, 20.0);
        // Simulate falling behind by three intervals.
        clock.accumulator = clock.interval() * 3;
        let mut fired = 0;
        while clock.should_tick() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(clock.tick_count(), 3);
    }

    #[test]
    fn clock_skip_to_now_clears_backlog() {
        let mut clock = SimClock::new(60.0, 20.0);
        clock.accumulator = clock.interval() * 5;
        clock.skip_to_now();
        assert!(!clock.should_tick());
    }
}
