use crate::rpm_cache::{RpmTable, VehicleId};
use serde::Serialize;

/// Name of a wave asset to be played by the audio backend.
pub type WaveId = String;

/// Volume and pitch carried down the graph, multiplied at every level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseParams {
    pub volume: f32,
    pub pitch: f32,
}

impl Default for ParseParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

/// A wave that should be audible this pass, with its final volume and pitch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveInstance {
    pub wave: WaveId,
    pub node_hash: u64,
    pub volume: f32,
    pub pitch: f32,
    pub looping: bool,
}

/// Ambient state for one render of one active sound.
pub struct ParseContext<'a> {
    pub owner_id: VehicleId,
    pub rpm_table: &'a RpmTable,
    /// Audio-side seconds elapsed since the previous render pass.
    pub delta_time: f32,
}

pub trait SoundNode: Send {
    fn parse(
        &mut self,
        ctx: &mut ParseContext<'_>,
        node_hash: u64,
        params: &ParseParams,
        out: &mut Vec<WaveInstance>,
    );

    fn max_child_nodes(&self) -> usize {
        0
    }
}

const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
pub const ROOT_NODE_HASH: u64 = 0xcbf2_9ce4_8422_2325;

/// Stable identity of the child at `index` beneath the node hashed as `parent`.
pub fn child_node_hash(parent: u64, index: usize) -> u64 {
    let mut hash = parent;
    for byte in (index as u64 + 1).to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[derive(Debug, Clone)]
pub struct WavePlayer {
    wave: WaveId,
    looping: bool,
}

impl WavePlayer {
    pub fn new(wave: impl Into<WaveId>, looping: bool) -> Self {
        Self {
            wave: wave.into(),
            looping,
        }
    }
}

impl SoundNode for WavePlayer {
    fn parse(
        &mut self,
        _ctx: &mut ParseContext<'_>,
        node_hash: u64,
        params: &ParseParams,
        out: &mut Vec<WaveInstance>,
    ) {
        out.push(WaveInstance {
            wave: self.wave.clone(),
            node_hash,
            volume: params.volume,
            pitch: params.pitch,
            looping: self.looping,
        });
    }
}

/// Unconnected input; emits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNode;

impl SoundNode for SilentNode {
    fn parse(
        &mut self,
        _ctx: &mut ParseContext<'_>,
        _node_hash: u64,
        _params: &ParseParams,
        _out: &mut Vec<WaveInstance>,
    ) {
    }
}

/// A sound graph playing on behalf of one vehicle.
pub struct ActiveSound {
    owner_id: VehicleId,
    root: Box<dyn SoundNode>,
    params: ParseParams,
}

impl ActiveSound {
    pub fn new(owner_id: VehicleId, root: impl SoundNode + 'static) -> Self {
        Self {
            owner_id,
            root: Box::new(root),
            params: ParseParams::default(),
        }
    }

    pub fn with_params(mut self, params: ParseParams) -> Self {
        self.params = params;
        self
    }

    pub fn owner_id(&self) -> VehicleId {
        self.owner_id
    }

    pub fn render(&mut self, rpm_table: &RpmTable, delta_time: f32) -> Vec<WaveInstance> {
        let mut out = Vec::new();
        let mut ctx = ParseContext {
            owner_id: self.owner_id,
            rpm_table,
            delta_time,
        };
        self.root
            .parse(&mut ctx, ROOT_NODE_HASH, &self.params, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpm_cache::rpm_channel;

    #[test]
    fn wave_player_forwards_params() {
        let (_publisher, table) = rpm_channel();
        let params = ParseParams {
            volume: 0.25,
            pitch: 1.5,
        };
        let mut sound = ActiveSound::new(1, WavePlayer::new("engine_idle", true)).with_params(params);

        let waves = sound.render(&table, 0.016);
        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].wave, "engine_idle");
        assert_eq!(waves[0].volume, 0.25);
        assert_eq!(waves[0].pitch, 1.5);
        assert_eq!(waves[0].node_hash, ROOT_NODE_HASH);
        assert!(waves[0].looping);
    }

    #[test]
    fn silent_node_emits_nothing() {
        let (_publisher, table) = rpm_channel();
        let mut sound = ActiveSound::new(1, SilentNode);
        assert!(sound.render(&table, 0.016).is_empty());
    }

    #[test]
    fn child_hashes_differ_by_index_and_parent() {
        let a = child_node_hash(ROOT_NODE_HASH, 0);
        let b = child_node_hash(ROOT_NODE_HASH, 1);
        let c = child_node_hash(a, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, child_node_hash(ROOT_NODE_HASH, 0));
    }
}
