/// Converts wall-clock frame deltas into whole fixed sub-steps.
///
/// Leftover time is carried to the next frame. A single frame never catches
/// up on more than `max_frame_ms`, so a backgrounded tab does not come back
/// to a burst of thousands of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    step_ms: f32,
    max_frame_ms: f32,
    accumulator: f32,
}

impl FrameClock {
    /// Tolerance for float drift when the delta is an exact multiple of the step.
    const EPSILON_MS: f32 = 1e-3;

    pub fn new(step_ms: f32, max_frame_ms: f32) -> Self {
        Self {
            step_ms,
            max_frame_ms,
            accumulator: 0.0,
        }
    }

    /// Adds `elapsed_ms` and returns how many sub-steps are now due.
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed_ms.min(self.max_frame_ms);

        let mut steps = 0;
        while self.accumulator + Self::EPSILON_MS >= self.step_ms {
            self.accumulator = (self.accumulator - self.step_ms).max(0.0);
            steps += 1;
        }
        steps
    }

    /// Time carried over to the next frame.
    pub fn leftover_ms(&self) -> f32 {
        self.accumulator
    }

    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
