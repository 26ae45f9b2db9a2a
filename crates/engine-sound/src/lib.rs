pub mod authoring;
pub mod driver;
pub mod engine_sound;
mod engine_sound_proptest;
pub mod error;
pub mod graph;
pub mod preset;
pub mod render;
pub mod rpm_cache;
pub mod timebase;
pub mod vehicle;
pub mod vehicle_sim;

pub use authoring::AuthoringIssue;
pub use driver::{DriverConfig, DriverStats, VehicleDriver};
pub use engine_sound::{
    EngineSample, EngineSampleConfig, EngineSoundNode, MixerRuntimeState, SampleMix,
    MAX_CHILD_NODES, RPM_INTERP_SPEED,
};
pub use error::{EngineSoundError, PresetError};
pub use graph::{
    ActiveSound, ParseContext, ParseParams, SilentNode, SoundNode, WaveInstance, WavePlayer,
};
pub use preset::{EngineSoundPreset, PresetSample};
pub use render::{AudioRenderer, RenderConfig, RenderPass, RenderStats};
pub use rpm_cache::{rpm_channel, RpmPublisher, RpmTable, VehicleId, VehicleRpmSample};
pub use timebase::TimeBase;
pub use vehicle::{EngineStats, VehicleEngine};
pub use vehicle_sim::{SimulatedBuggy, ThrottleProfile};
