//! JSONL trace of what the mixer asked to play.
//!
//! One line per emitted wave per render pass, so a run can be replayed or
//! plotted offline.

use engine_sound::{RenderPass, VehicleId};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single mix trace line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixTraceEntry {
    /// Render pass index
    pub pass: u64,
    /// Seconds since the renderer's time base started
    pub audio_time_s: f32,
    pub owner_id: VehicleId,
    pub wave: String,
    pub node_hash: u64,
    pub volume: f32,
    pub pitch: f32,
}

/// Writes render passes to a JSONL file. Owned by the audio thread.
pub struct MixTraceWriter {
    writer: BufWriter<File>,
}

impl MixTraceWriter {
    /// Create a trace writer at the specified path, truncating any previous run.
    pub fn new(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::with_capacity(8192, file),
        })
    }

    pub fn log(&mut self, entry: &MixTraceEntry) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")
    }

    /// Writes every wave of the pass and flushes. Returns the lines written.
    pub fn write_pass(&mut self, pass: &RenderPass) -> std::io::Result<usize> {
        for (owner_id, wave) in &pass.waves {
            self.log(&MixTraceEntry {
                pass: pass.index,
                audio_time_s: pass.audio_time,
                owner_id: *owner_id,
                wave: wave.wave.clone(),
                node_hash: wave.node_hash,
                volume: wave.volume,
                pitch: wave.pitch,
            })?;
        }
        self.writer.flush()?;
        Ok(pass.waves.len())
    }
}
