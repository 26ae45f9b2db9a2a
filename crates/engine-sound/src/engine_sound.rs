//! RPM driven crossfade between engine loops.
//!
//! Each child of an [`EngineSoundNode`] is one engine recording (idle, low,
//! mid, high...) paired with the RPM window in which it is audible. Every
//! render the node smooths the published desired RPM of its owning vehicle,
//! then gives each child a volume ramp and a pitch bend derived from where
//! that RPM sits inside the child's window.

use crate::error::EngineSoundError;
use crate::graph::{
    child_node_hash, ParseContext, ParseParams, SilentNode, SoundNode, WaveInstance,
};
use serde::{Deserialize, Serialize};

/// Interpolation speed (per second) of the smoothed RPM toward its target.
pub const RPM_INTERP_SPEED: f32 = 10.0;

pub const MAX_CHILD_NODES: usize = 32;

const SMALL_NUMBER: f32 = 1.0e-8;

/// Exponential approach of `current` toward `target`.
///
/// Moves a `delta_time * speed` fraction of the remaining distance, clamped to
/// `[0, 1]`, so large steps land on the target instead of overshooting.
pub fn interp_to(current: f32, target: f32, delta_time: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < SMALL_NUMBER {
        return target;
    }
    current + dist * (delta_time * speed).clamp(0.0, 1.0)
}

pub fn lerp(a: f32, b: f32, alpha: f32) -> f32 {
    a + (b - a) * alpha
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSampleConfig {
    /// RPM at which this sample starts to be heard.
    pub fade_in_rpm_start: f32,
    /// RPM at which this sample has faded in completely.
    pub fade_in_rpm_end: f32,
    /// RPM at which this sample starts fading out.
    pub fade_out_rpm_start: f32,
    /// RPM at which this sample is no longer audible.
    pub fade_out_rpm_end: f32,
    /// Pitch multiplier at the end of the RPM range.
    pub max_pitch_multiplier: f32,
}

impl Default for EngineSampleConfig {
    fn default() -> Self {
        Self {
            fade_in_rpm_start: 0.0,
            fade_in_rpm_end: 0.0,
            fade_out_rpm_start: 0.0,
            fade_out_rpm_end: 0.0,
            max_pitch_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMix {
    pub volume: f32,
    pub pitch: f32,
}

impl EngineSampleConfig {
    pub fn new(
        fade_in: (f32, f32),
        fade_out: (f32, f32),
        max_pitch_multiplier: f32,
    ) -> Self {
        Self {
            fade_in_rpm_start: fade_in.0,
            fade_in_rpm_end: fade_in.1,
            fade_out_rpm_start: fade_out.0,
            fade_out_rpm_end: fade_out.1,
            max_pitch_multiplier,
        }
    }

    /// Volume and pitch multipliers of this sample at `rpm`.
    pub fn evaluate(&self, rpm: f32) -> SampleMix {
        let fade_in_min = self.fade_in_rpm_start;
        let fade_in_max = self.fade_in_rpm_end;
        let fade_out_min = self.fade_out_rpm_start;
        let fade_out_max = self.fade_out_rpm_end;

        let range = fade_out_max - fade_in_min;
        let alpha = if range == 0.0 {
            0.0
        } else {
            (rpm - fade_in_min) / range
        };

        let mut pitch = lerp(1.0, self.max_pitch_multiplier, alpha);
        let mut volume = 1.0;

        if rpm >= fade_in_min && rpm <= fade_in_max && fade_in_min != fade_in_max {
            volume = (rpm - fade_in_min) / (fade_in_max - fade_in_min);
        } else if rpm >= fade_out_min && rpm <= fade_out_max && fade_out_min != fade_out_max {
            volume = 1.0 - (rpm - fade_out_min) / (fade_out_max - fade_out_min);
        } else if rpm < fade_in_max || rpm > fade_out_max {
            volume = 0.0;
            pitch = 1.0;
        }

        SampleMix { volume, pitch }
    }
}

/// One input of the engine node together with its RPM window.
pub struct EngineSample {
    pub config: EngineSampleConfig,
    child: Box<dyn SoundNode>,
}

impl EngineSample {
    pub fn new(config: EngineSampleConfig, child: impl SoundNode + 'static) -> Self {
        Self {
            config,
            child: Box::new(child),
        }
    }

    fn from_boxed(config: EngineSampleConfig, child: Box<dyn SoundNode>) -> Self {
        Self { config, child }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MixerRuntimeState {
    pub current_rpm: f32,
    /// Highest fade-out end seen so far; ceiling for the desired RPM.
    pub current_max_rpm: f32,
    pub last_store_time: f32,
}

#[derive(Default)]
pub struct EngineSoundNode {
    samples: Vec<EngineSample>,
    state: MixerRuntimeState,
    warned_missing_rpm: bool,
    /// A sample was found on the previous render, so `last_store_time` is live.
    tracking_sample: bool,
}

impl EngineSoundNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// A freshly authored node with two unconnected inputs.
    pub fn with_starting_connectors() -> Self {
        let mut node = Self::new();
        for _ in 0..2 {
            node.samples
                .push(EngineSample::new(EngineSampleConfig::default(), SilentNode));
        }
        node
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[EngineSample] {
        &self.samples
    }

    pub fn configs(&self) -> impl Iterator<Item = &EngineSampleConfig> {
        self.samples.iter().map(|sample| &sample.config)
    }

    pub fn config_mut(&mut self, index: usize) -> Option<&mut EngineSampleConfig> {
        self.samples.get_mut(index).map(|sample| &mut sample.config)
    }

    pub fn state(&self) -> MixerRuntimeState {
        self.state
    }

    pub fn current_rpm(&self) -> f32 {
        self.state.current_rpm
    }

    pub fn clamp_ceiling(&self) -> f32 {
        self.state.current_max_rpm
    }

    /// Appends a configured sample.
    pub fn push_sample(
        &mut self,
        config: EngineSampleConfig,
        child: impl SoundNode + 'static,
    ) -> Result<(), EngineSoundError> {
        if self.samples.len() >= self.max_child_nodes() {
            return Err(EngineSoundError::TooManyChildren {
                max: self.max_child_nodes(),
            });
        }
        self.samples.push(EngineSample::new(config, child));
        Ok(())
    }

    /// Inserts `child` at `index` with a default (silent window, neutral pitch) config.
    pub fn insert_child(
        &mut self,
        index: usize,
        child: impl SoundNode + 'static,
    ) -> Result<(), EngineSoundError> {
        if index > self.samples.len() {
            return Err(EngineSoundError::ChildIndexOutOfRange {
                index,
                len: self.samples.len(),
            });
        }
        if self.samples.len() >= self.max_child_nodes() {
            return Err(EngineSoundError::TooManyChildren {
                max: self.max_child_nodes(),
            });
        }
        self.samples
            .insert(index, EngineSample::new(EngineSampleConfig::default(), child));
        log::debug!("inserted engine sample at {index}, now {}", self.samples.len());
        Ok(())
    }

    pub fn remove_child(&mut self, index: usize) -> Result<EngineSample, EngineSoundError> {
        if index >= self.samples.len() {
            return Err(EngineSoundError::ChildIndexOutOfRange {
                index,
                len: self.samples.len(),
            });
        }
        let removed = self.samples.remove(index);
        log::debug!("removed engine sample at {index}, now {}", self.samples.len());
        Ok(removed)
    }

    /// Replaces the children, keeping configs by position. Missing configs are
    /// defaulted, extra configs are dropped from the end.
    pub fn set_children(
        &mut self,
        children: Vec<Box<dyn SoundNode>>,
    ) -> Result<(), EngineSoundError> {
        if children.len() > self.max_child_nodes() {
            return Err(EngineSoundError::TooManyChildren {
                max: self.max_child_nodes(),
            });
        }

        let mut configs: Vec<EngineSampleConfig> =
            self.samples.drain(..).map(|sample| sample.config).collect();
        configs.resize(children.len(), EngineSampleConfig::default());

        self.samples = configs
            .into_iter()
            .zip(children)
            .map(|(config, child)| EngineSample::from_boxed(config, child))
            .collect();
        Ok(())
    }

    fn store_current_rpm(&mut self, ctx: &ParseContext<'_>) {
        let (desired_rpm, delta_time) = match ctx.rpm_table.lookup(ctx.owner_id) {
            Some(sample) => {
                self.warned_missing_rpm = false;
                // First sample after an absence: its timestamp is not relative
                // to anything we stored, so step by audio time instead.
                let delta_time = if self.tracking_sample {
                    sample.timestamp - self.state.last_store_time
                } else {
                    ctx.delta_time
                };
                self.tracking_sample = true;
                self.state.last_store_time = sample.timestamp;
                (sample.desired_rpm, delta_time)
            }
            None => {
                if !self.warned_missing_rpm {
                    log::warn!(
                        "engine sound for owner {} has no cached desired rpm",
                        ctx.owner_id
                    );
                    self.warned_missing_rpm = true;
                }
                self.tracking_sample = false;
                self.state.last_store_time = 0.0;
                (0.0, ctx.delta_time)
            }
        };

        self.state.current_rpm = interp_to(
            self.state.current_rpm,
            desired_rpm.min(self.state.current_max_rpm),
            delta_time,
            RPM_INTERP_SPEED,
        );
    }
}

impl SoundNode for EngineSoundNode {
    fn parse(
        &mut self,
        ctx: &mut ParseContext<'_>,
        node_hash: u64,
        params: &ParseParams,
        out: &mut Vec<WaveInstance>,
    ) {
        self.store_current_rpm(ctx);
        let rpm = self.state.current_rpm;

        for (index, sample) in self.samples.iter_mut().enumerate() {
            self.state.current_max_rpm = self
                .state
                .current_max_rpm
                .max(sample.config.fade_out_rpm_end);

            let mix = sample.config.evaluate(rpm);
            let child_params = ParseParams {
                volume: params.volume * mix.volume,
                pitch: params.pitch * mix.pitch,
            };

            sample
                .child
                .parse(ctx, child_node_hash(node_hash, index), &child_params, out);
        }
    }

    fn max_child_nodes(&self) -> usize {
        MAX_CHILD_NODES
    }
}
