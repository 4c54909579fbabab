/// Fires once per elapsed interval while running, driven by the fixed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    interval_seconds: f32,
    elapsed_seconds: f32,
    running: bool,
}

impl IntervalTimer {
    /// A stopped timer. Non-positive or non-finite intervals fall back to one second.
    pub fn new(interval_seconds: f32) -> Self {
        let interval_seconds = if interval_seconds.is_finite() && interval_seconds > 0.0 {
            interval_seconds
        } else {
            1.0
        };
        Self {
            interval_seconds,
            elapsed_seconds: 0.0,
            running: false,
        }
    }

    /// Resumes without discarding the partial interval.
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Starts a fresh interval from zero.
    pub fn restart(&mut self) {
        self.elapsed_seconds = 0.0;
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns how many intervals completed during `dt_seconds`.
    pub fn advance(&mut self, dt_seconds: f32) -> u32 {
        if !self.running || !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return 0;
        }
        self.elapsed_seconds += dt_seconds;
        let mut fired = 0;
        while self.elapsed_seconds >= self.interval_seconds {
            self.elapsed_seconds -= self.interval_seconds;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = IntervalTimer::new(1.0);
        assert_eq!(timer.advance(5.0), 0);
    }

    #[test]
    fn fires_once_per_interval_and_keeps_remainder() {
        let mut timer = IntervalTimer::new(1.0);
        timer.start();
        assert_eq!(timer.advance(0.75), 0);
        assert_eq!(timer.advance(0.5), 1);
        assert_eq!(timer.advance(0.75), 1);
        assert_eq!(timer.advance(2.0), 2);
    }

    #[test]
    fn sixty_fixed_ticks_make_one_second() {
        let mut timer = IntervalTimer::new(1.0);
        timer.start();
        let fired: u32 = (0..60).map(|_| timer.advance(1.0 / 60.0)).sum();
        let fired = fired + timer.advance(1e-4);
        assert_eq!(fired, 1);
    }

    #[test]
    fn restart_discards_partial_interval() {
        let mut timer = IntervalTimer::new(1.0);
        timer.start();
        timer.advance(0.9);
        timer.restart();
        assert_eq!(timer.advance(0.5), 0);
        assert!(timer.is_running());
    }

    #[test]
    fn invalid_interval_falls_back_to_one_second() {
        let mut timer = IntervalTimer::new(0.0);
        timer.start();
        assert_eq!(timer.advance(1.0), 1);
    }
}
