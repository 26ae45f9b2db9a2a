#[derive(Clone, Default, Debug)]
pub struct EngineStats {
    pub peak_rpm: f32,
}

/// Engine side of a simulated vehicle, as seen by the driver loop.
pub trait VehicleEngine: Send {
    fn step(&mut self, dt_s: f32);
    /// Throttle in `[-1, 1]`; negative values brake/reverse.
    fn set_throttle(&mut self, throttle: f32);
    /// Absolute engine speed in RPM.
    fn engine_rotation_speed(&self) -> f32;
    /// Redline in RPM; 1.0 when the engine does not know it.
    fn engine_max_rotation_speed(&self) -> f32 {
        1.0
    }
    fn stats(&self) -> EngineStats;
    /// The driver releases the vehicle once this turns false.
    fn is_healthy(&self) -> bool;
}
