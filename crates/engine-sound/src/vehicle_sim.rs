use crate::vehicle::{EngineStats, VehicleEngine};

/// Buggy engine with first-order spool up and engine braking.
#[derive(Debug, Clone)]
pub struct SimulatedBuggy {
    rpm: f32,
    throttle: f32,

    idle_rpm: f32,
    max_rpm: f32,
    spool_up_time: f32,
    spool_down_time: f32,

    stats: EngineStats,
}

impl SimulatedBuggy {
    pub fn new() -> Self {
        Self {
            rpm: 800.0,
            throttle: 0.0,
            idle_rpm: 800.0,
            max_rpm: 7000.0,
            spool_up_time: 0.6,
            spool_down_time: 1.2,
            stats: EngineStats::default(),
        }
    }

    fn update_stats(&mut self) {
        self.stats.peak_rpm = self.stats.peak_rpm.max(self.rpm);
    }
}

impl Default for SimulatedBuggy {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleEngine for SimulatedBuggy {
    fn step(&mut self, dt_s: f32) {
        // Reverse revs the engine too; only the magnitude matters for RPM.
        let demand = self.throttle.abs();
        let target = self.idle_rpm + demand * (self.max_rpm - self.idle_rpm);
        let time_constant = if target > self.rpm {
            self.spool_up_time
        } else {
            self.spool_down_time
        };
        self.rpm += (target - self.rpm) * (1.0 - (-dt_s / time_constant).exp());
        self.rpm = self.rpm.clamp(0.0, self.max_rpm);

        self.update_stats();
    }

    fn set_throttle(&mut self, throttle: f32) {
        self.throttle = if throttle.is_finite() {
            throttle.clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }

    fn engine_rotation_speed(&self) -> f32 {
        self.rpm.abs()
    }

    fn engine_max_rotation_speed(&self) -> f32 {
        self.max_rpm
    }

    fn stats(&self) -> EngineStats {
        self.stats.clone()
    }

    fn is_healthy(&self) -> bool {
        self.rpm.is_finite() && self.rpm >= 0.0 && self.rpm <= self.max_rpm
    }
}

/// Throttle input over simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleProfile {
    Constant(f32),
    /// Triangle wave from 0 to full throttle and back over `period_s`.
    Sweep { period_s: f32 },
}

impl ThrottleProfile {
    pub fn throttle_at(&self, sim_time: f64) -> f32 {
        match *self {
            ThrottleProfile::Constant(value) => value,
            ThrottleProfile::Sweep { period_s } if period_s > 0.0 => {
                let phase = (sim_time / period_s as f64).fract() as f32;
                1.0 - (2.0 * phase - 1.0).abs()
            }
            ThrottleProfile::Sweep { .. } => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idles_without_throttle() {
        let mut buggy = SimulatedBuggy::new();
        for _ in 0..600 {
            buggy.step(1.0 / 60.0);
        }
        assert!((buggy.engine_rotation_speed() - 800.0).abs() < 1.0);
        assert!(buggy.is_healthy());
    }

    #[test]
    fn full_throttle_approaches_max_rpm() {
        let mut buggy = SimulatedBuggy::new();
        buggy.set_throttle(1.0);
        for _ in 0..600 {
            buggy.step(1.0 / 60.0);
        }
        let rpm = buggy.engine_rotation_speed();
        assert!(rpm > 6900.0 && rpm <= 7000.0, "rpm = {rpm}");
        assert_eq!(buggy.engine_max_rotation_speed(), 7000.0);
        assert!(buggy.stats().peak_rpm >= rpm);
    }

    #[test]
    fn non_finite_throttle_is_ignored() {
        let mut buggy = SimulatedBuggy::new();
        buggy.set_throttle(f32::NAN);
        buggy.step(0.1);
        assert!(buggy.is_healthy());
    }

    #[test]
    fn sweep_is_a_triangle() {
        let sweep = ThrottleProfile::Sweep { period_s: 4.0 };
        assert_eq!(sweep.throttle_at(0.0), 0.0);
        assert_eq!(sweep.throttle_at(2.0), 1.0);
        assert_eq!(sweep.throttle_at(1.0), 0.5);
        assert_eq!(sweep.throttle_at(4.0), 0.0);
        assert_eq!(ThrottleProfile::Constant(0.3).throttle_at(12.0), 0.3);
        // Six days in, the phase still resolves a quarter period.
        let late = 6.0 * 86_400.0;
        assert_eq!(sweep.throttle_at(late + 1.0), 0.5);
    }
}
