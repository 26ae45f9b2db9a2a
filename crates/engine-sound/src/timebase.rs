use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct TimeBase {
    start: Instant,
}

impl TimeBase {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Monotonic seconds since start.
    pub fn now_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}
