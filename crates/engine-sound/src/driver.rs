use crate::rpm_cache::{RpmPublisher, VehicleId};
use crate::vehicle::VehicleEngine;
use crate::vehicle_sim::ThrottleProfile;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub step_time: Duration,
    pub watchdog_timeout: Duration,
    pub throttle: ThrottleProfile,
    /// Simulation time after which the controller lets go of the vehicle.
    pub unpossess_after: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            step_time: Duration::from_micros(16_667),
            watchdog_timeout: Duration::from_millis(250),
            throttle: ThrottleProfile::Sweep { period_s: 6.0 },
            unpossess_after: None,
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct DriverStats {
    pub steps_executed: u64,
    pub steps_missed: u64,
    pub publishes: u64,
    pub max_jitter_us: u64,
    pub peak_rpm: f32,
}

/// Simulation side of one vehicle: steps the engine at a fixed rate and
/// publishes its RPM for as long as a controller possesses it.
pub struct VehicleDriver<E: VehicleEngine> {
    engine: E,
    config: DriverConfig,
    publisher: RpmPublisher,
    controller: Option<VehicleId>,
    /// Seconds of simulated time; published as `f32` timestamps.
    sim_time: f64,
    stats: DriverStats,
}

impl<E: VehicleEngine> VehicleDriver<E> {
    pub fn new(engine: E, config: DriverConfig, publisher: RpmPublisher) -> Self {
        Self {
            engine,
            config,
            publisher,
            controller: None,
            sim_time: 0.0,
            stats: DriverStats::default(),
        }
    }

    pub fn possess(&mut self, vehicle: VehicleId) {
        if let Some(previous) = self.controller.replace(vehicle) {
            if previous != vehicle {
                self.publisher.retract(previous);
            }
        }
    }

    pub fn unpossess(&mut self) {
        if let Some(vehicle) = self.controller.take() {
            log::debug!("vehicle {vehicle} unpossessed at {:.3}s", self.sim_time);
            self.publisher.retract(vehicle);
        }
    }

    pub fn is_possessed(&self) -> bool {
        self.controller.is_some()
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Advances the simulation by one fixed step. An unhealthy engine is
    /// released instead of published.
    pub fn step(&mut self) {
        let dt_s = self.config.step_time.as_secs_f64();

        self.engine
            .set_throttle(self.config.throttle.throttle_at(self.sim_time));
        self.engine.step(dt_s as f32);
        self.sim_time += dt_s;
        self.stats.steps_executed += 1;
        self.stats.peak_rpm = self.engine.stats().peak_rpm;

        if !self.engine.is_healthy() {
            if self.is_possessed() {
                log::warn!("engine unhealthy at {:.3}s, releasing vehicle", self.sim_time);
            }
            self.unpossess();
            return;
        }

        if let Some(vehicle) = self.controller {
            self.publisher.publish(
                vehicle,
                self.engine.engine_rotation_speed(),
                self.sim_time as f32,
            );
            self.stats.publishes += 1;
        }
    }

    pub fn run(&mut self, stop: &AtomicBool) {
        let mut next_step = Instant::now();
        let unpossess_after = self.config.unpossess_after.map(|d| d.as_secs_f64());

        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < next_step {
                thread::sleep(next_step - now);
            } else {
                let overrun = now.duration_since(next_step);
                if overrun > self.config.step_time {
                    self.stats.steps_missed += 1;
                }
                if overrun > self.config.watchdog_timeout {
                    log::warn!(
                        "simulation overran by {}ms, releasing vehicle",
                        overrun.as_millis()
                    );
                    self.unpossess();
                    break;
                }
            }

            let step_start = Instant::now();
            self.step();
            if !self.engine.is_healthy() {
                break;
            }

            if let Some(limit) = unpossess_after {
                if self.sim_time >= limit {
                    self.unpossess();
                }
            }

            let step_duration = step_start.elapsed();
            let jitter_us = step_duration
                .saturating_sub(self.config.step_time)
                .as_micros() as u64;
            self.stats.max_jitter_us = self.stats.max_jitter_us.max(jitter_us);

            next_step += self.config.step_time;
        }
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }
}

impl<E: VehicleEngine> Drop for VehicleDriver<E> {
    fn drop(&mut self) {
        self.unpossess();
    }
}
