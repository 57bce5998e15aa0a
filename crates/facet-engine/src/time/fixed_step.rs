/// Fixed-timestep accumulator.
///
/// Rendering runs once per loop iteration; simulation steps run at a fixed
/// rate and consume the accumulated wall time.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f64,
    accumulator: f64,
    max_steps: u32,
}

impl FixedStep {
    /// Creates an accumulator running `hz` steps per second.
    pub fn new(hz: f64) -> Self {
        debug_assert!(hz > 0.0);
        Self {
            step: 1.0 / hz,
            accumulator: 0.0,
            max_steps: 8,
        }
    }

    /// Adds `dt` seconds and runs `update` once per whole step available.
    ///
    /// At most `max_steps` steps run per call; leftover time beyond that is
    /// dropped so a long stall cannot cascade into a spiral of catch-up work.
    /// Returns the number of steps executed.
    pub fn advance(&mut self, dt: f64, mut update: impl FnMut(f64)) -> u32 {
        self.accumulator += dt.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step {
            if steps == self.max_steps {
                self.accumulator = 0.0;
                break;
            }
            update(self.step);
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    /// Fraction of a step currently accumulated, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(120.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_whole_steps_and_keeps_remainder() {
        let mut fs = FixedStep::new(10.0);
        let mut calls = 0;
        let n = fs.advance(0.25, |_| calls += 1);
        assert_eq!(n, 2);
        assert_eq!(calls, 2);
        assert!((fs.alpha() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn remainder_carries_into_next_advance() {
        let mut fs = FixedStep::new(10.0);
        assert_eq!(fs.advance(0.06, |_| {}), 0);
        assert_eq!(fs.advance(0.06, |_| {}), 1);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut fs = FixedStep::new(120.0);
        let n = fs.advance(10.0, |_| {});
        assert_eq!(n, 8);
        assert_eq!(fs.alpha(), 0.0);
    }
}
