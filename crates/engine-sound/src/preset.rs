use crate::engine_sound::{EngineSampleConfig, EngineSoundNode};
use crate::error::PresetError;
use crate::graph::{WaveId, WavePlayer};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Authored description of an engine sound: one looping wave per RPM band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSoundPreset {
    pub name: String,
    pub samples: Vec<PresetSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetSample {
    pub wave: WaveId,
    #[serde(default = "default_looping")]
    pub looping: bool,
    #[serde(flatten)]
    pub config: EngineSampleConfig,
}

fn default_looping() -> bool {
    true
}

impl EngineSoundPreset {
    pub fn from_json_str(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Four-band buggy engine covering idle through redline.
    pub fn builtin_buggy() -> Self {
        let sample = |wave: &str, fade_in, fade_out, pitch| PresetSample {
            wave: wave.to_string(),
            looping: true,
            config: EngineSampleConfig::new(fade_in, fade_out, pitch),
        };

        Self {
            name: "buggy".to_string(),
            samples: vec![
                sample("engine_idle", (0.0, 0.0), (1200.0, 2000.0), 1.3),
                sample("engine_low", (1000.0, 1800.0), (3000.0, 3800.0), 1.3),
                sample("engine_mid", (2800.0, 3600.0), (5000.0, 5800.0), 1.25),
                sample("engine_high", (4800.0, 5600.0), (7200.0, 7500.0), 1.2),
            ],
        }
    }

    pub fn build(&self) -> Result<EngineSoundNode, PresetError> {
        let mut node = EngineSoundNode::new();
        for (index, sample) in self.samples.iter().enumerate() {
            for issue in sample.config.authoring_issues() {
                log::warn!(
                    "preset '{}' sample {index} ({}): {:?}",
                    self.name,
                    sample.wave,
                    issue
                );
            }
            node.push_sample(sample.config, WavePlayer::new(sample.wave.clone(), sample.looping))?;
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineSoundError;
    use std::io::Write;

    #[test]
    fn parses_and_defaults_missing_fields() {
        let preset = EngineSoundPreset::from_json_str(
            r#"{
                "name": "kart",
                "samples": [
                    { "wave": "kart_idle", "fade_out_rpm_start": 800, "fade_out_rpm_end": 1500 },
                    { "wave": "kart_rev", "looping": false,
                      "fade_in_rpm_start": 1000, "fade_in_rpm_end": 1500,
                      "fade_out_rpm_start": 5000, "fade_out_rpm_end": 6000,
                      "max_pitch_multiplier": 1.8 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(preset.samples.len(), 2);
        assert!(preset.samples[0].looping);
        assert_eq!(preset.samples[0].config.max_pitch_multiplier, 1.0);
        assert_eq!(preset.samples[0].config.fade_in_rpm_end, 0.0);
        assert!(!preset.samples[1].looping);
        assert_eq!(preset.samples[1].config.max_pitch_multiplier, 1.8);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineSoundPreset::from_json_str("{ \"name\": 3 }").unwrap_err();
        assert!(matches!(err, PresetError::Parse(_)));
    }

    #[test]
    fn builtin_builds_one_child_per_sample() {
        let preset = EngineSoundPreset::builtin_buggy();
        let node = preset.build().unwrap();
        assert_eq!(node.len(), preset.samples.len());
        for (config, sample) in node.configs().zip(&preset.samples) {
            assert_eq!(*config, sample.config);
            assert!(config.authoring_issues().is_empty());
        }
    }

    #[test]
    fn too_many_samples_fail_to_build() {
        let mut preset = EngineSoundPreset::builtin_buggy();
        let first = preset.samples[0].clone();
        preset.samples = vec![first; 40];
        assert!(matches!(
            preset.build(),
            Err(PresetError::Graph(EngineSoundError::TooManyChildren { .. }))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&EngineSoundPreset::builtin_buggy()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = EngineSoundPreset::load(file.path()).unwrap();
        assert_eq!(loaded, EngineSoundPreset::builtin_buggy());

        let missing = EngineSoundPreset::load(Path::new("/nonexistent/preset.json"));
        assert!(matches!(missing, Err(PresetError::Io(_))));
    }
}
