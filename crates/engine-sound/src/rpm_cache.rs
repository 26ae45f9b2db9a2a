use crossbeam::channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use std::collections::HashMap;

/// Opaque, process-unique identifier of a controlled vehicle.
pub type VehicleId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VehicleRpmSample {
    pub desired_rpm: f32,
    /// Simulation time in seconds at which `desired_rpm` was computed.
    pub timestamp: f32,
}

#[derive(Debug, Clone, Copy)]
enum RpmCommand {
    Publish {
        vehicle: VehicleId,
        sample: VehicleRpmSample,
    },
    Retract {
        vehicle: VehicleId,
    },
}

/// Creates a connected publisher/table pair.
///
/// The publisher belongs to the simulation side and may be cloned freely. The
/// table belongs to the audio side; it is the only place the samples are
/// mutated, and only while draining the queued commands.
pub fn rpm_channel() -> (RpmPublisher, RpmTable) {
    let (tx, rx) = unbounded();
    (
        RpmPublisher { tx },
        RpmTable {
            rx,
            samples: HashMap::new(),
        },
    )
}

#[derive(Debug, Clone)]
pub struct RpmPublisher {
    tx: Sender<RpmCommand>,
}

impl RpmPublisher {
    /// Called by the simulation every step (non-blocking).
    pub fn publish(&self, vehicle: VehicleId, desired_rpm: f32, sim_time: f32) {
        self.send(RpmCommand::Publish {
            vehicle,
            sample: VehicleRpmSample {
                desired_rpm,
                timestamp: sim_time,
            },
        });
    }

    /// Called when the vehicle stops being controlled or is destroyed.
    pub fn retract(&self, vehicle: VehicleId) {
        self.send(RpmCommand::Retract { vehicle });
    }

    fn send(&self, command: RpmCommand) {
        if self.tx.send(command).is_err() {
            log::trace!("rpm table dropped, discarding {:?}", command);
        }
    }
}

/// Audio-side view of the most recent desired RPM per vehicle.
#[derive(Debug)]
pub struct RpmTable {
    rx: Receiver<RpmCommand>,
    samples: HashMap<VehicleId, VehicleRpmSample>,
}

impl RpmTable {
    /// Applies every queued command in arrival order. Returns how many were applied.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.rx.try_recv() {
            match command {
                RpmCommand::Publish { vehicle, sample } => {
                    self.samples.insert(vehicle, sample);
                }
                RpmCommand::Retract { vehicle } => {
                    self.samples.remove(&vehicle);
                }
            }
            applied += 1;
        }
        applied
    }

    pub fn lookup(&self, vehicle: VehicleId) -> Option<VehicleRpmSample> {
        self.samples.get(&vehicle).copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
