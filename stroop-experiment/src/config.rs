use crate::error::{ExperimentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use stroop_core::{InkColor, Key, PrimeType, StroopType};

/// Number of distinct Stroop conditions (prime × stroop × color)
pub const STROOP_COMBINATIONS: usize = PrimeType::ALL.len() * StroopType::ALL.len() * InkColor::ALL.len();
/// Number of distinct color-block conditions (prime × color)
pub const COLOR_BLOCK_COMBINATIONS: usize = PrimeType::ALL.len() * InkColor::ALL.len();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub stroop: StroopConfig,
    pub detection: DetectionConfig,
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses and validates a (possibly partial) JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.stroop.validate()?;
        self.detection.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseKeys {
    pub green: char,
    pub red: char,
}

impl Default for ResponseKeys {
    fn default() -> Self {
        Self { green: 'z', red: 'm' }
    }
}

impl ResponseKeys {
    pub fn key_for(&self, color: InkColor) -> Key {
        match color {
            InkColor::Green => Key::char(self.green),
            InkColor::Red => Key::char(self.red),
        }
    }

    pub fn color_for(&self, key: Key) -> Option<InkColor> {
        InkColor::ALL.into_iter().find(|c| self.key_for(*c) == key)
    }

    pub fn response_set(&self) -> Vec<Key> {
        vec![Key::char(self.green), Key::char(self.red), Key::Escape]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopTiming {
    pub fixation_ms: u64,
    pub mask_ms: u64,
    pub prime_ms: u64,
    pub blank_ms: u64,
    /// `None` waits for a response indefinitely
    pub response_timeout_ms: Option<u64>,
}

impl Default for StroopTiming {
    fn default() -> Self {
        Self {
            fixation_ms: 200,
            mask_ms: 71,
            prime_ms: 43,
            blank_ms: 100,
            response_timeout_ms: None,
        }
    }
}

impl StroopTiming {
    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub blocks: u32,
    pub stroop_replication: usize,
    pub stroop_sample_size: usize,
    pub color_block_replication: usize,
    pub timing: StroopTiming,
    pub keys: ResponseKeys,
    pub stimulus_height: f32,
    pub color_block_size: (f32, f32),
    pub message_height: f32,
    pub wrap_width: f32,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            blocks: 8,
            stroop_replication: 3,
            stroop_sample_size: 30,
            color_block_replication: 5,
            timing: StroopTiming::default(),
            keys: ResponseKeys::default(),
            stimulus_height: 60.0,
            color_block_size: (200.0, 100.0),
            message_height: 30.0,
            wrap_width: 800.0,
        }
    }
}

impl StroopConfig {
    pub fn stroop_pool_size(&self) -> usize {
        STROOP_COMBINATIONS * self.stroop_replication
    }

    pub fn color_block_trials(&self) -> usize {
        COLOR_BLOCK_COMBINATIONS * self.color_block_replication
    }

    pub fn trials_per_block(&self) -> usize {
        self.stroop_sample_size + self.color_block_trials()
    }

    pub fn validate(&self) -> Result<()> {
        if self.stroop_sample_size > self.stroop_pool_size() {
            return Err(ExperimentError::SampleExceedsPool {
                requested: self.stroop_sample_size,
                available: self.stroop_pool_size(),
            });
        }
        validate_keys(self.keys.green, self.keys.red)?;
        if self.stimulus_height <= 0.0 || self.message_height <= 0.0 {
            return Err(ExperimentError::InvalidConfig(
                "text heights must be positive".into(),
            ));
        }
        let (w, h) = self.color_block_size;
        if w <= 0.0 || h <= 0.0 {
            return Err(ExperimentError::InvalidConfig(
                "color block size must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionKeys {
    pub yes: char,
    pub no: char,
}

impl Default for DetectionKeys {
    fn default() -> Self {
        Self { yes: 'z', no: 'm' }
    }
}

impl DetectionKeys {
    pub fn response_set(&self) -> Vec<Key> {
        vec![Key::char(self.yes), Key::char(self.no), Key::Escape]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub durations_ms: Vec<u64>,
    pub trials_per_duration: usize,
    pub blocks: u32,
    pub trials_per_block: usize,
    pub fixation_ms: u64,
    pub mask_ms: u64,
    pub string_length: usize,
    pub keys: DetectionKeys,
    pub text_height: f32,
    pub wrap_width: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            durations_ms: vec![0, 29, 43, 57, 114, 200],
            trials_per_duration: 30,
            blocks: 4,
            trials_per_block: 45,
            fixation_ms: 500,
            mask_ms: 500,
            string_length: 6,
            keys: DetectionKeys::default(),
            text_height: 40.0,
            wrap_width: 900.0,
        }
    }
}

impl DetectionConfig {
    pub fn pool_size(&self) -> usize {
        self.durations_ms.len() * self.trials_per_duration
    }

    pub fn validate(&self) -> Result<()> {
        if self.durations_ms.is_empty() {
            return Err(ExperimentError::InvalidConfig(
                "at least one prime duration is required".into(),
            ));
        }
        if self.blocks == 0 || self.trials_per_block == 0 {
            return Err(ExperimentError::InvalidConfig(format!(
                "detection needs at least one block and one trial per block, got {} x {}",
                self.blocks, self.trials_per_block
            )));
        }
        let needed = self.blocks as usize * self.trials_per_block;
        if needed > self.pool_size() {
            return Err(ExperimentError::SampleExceedsPool {
                requested: needed,
                available: self.pool_size(),
            });
        }
        if self.string_length == 0 {
            return Err(ExperimentError::InvalidConfig(
                "random strings need at least one letter".into(),
            ));
        }
        validate_keys(self.keys.yes, self.keys.no)
    }
}

fn validate_keys(a: char, b: char) -> Result<()> {
    if !a.is_ascii_alphanumeric() || !b.is_ascii_alphanumeric() {
        return Err(ExperimentError::InvalidConfig(format!(
            "response keys must be letters or digits, got `{a}` and `{b}`"
        )));
    }
    if a.eq_ignore_ascii_case(&b) {
        return Err(ExperimentError::InvalidConfig(format!(
            "response keys must differ, both are `{a}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_sixty_trial_blocks() {
        let config = StroopConfig::default();
        assert_eq!(config.stroop_pool_size(), 36);
        assert_eq!(config.color_block_trials(), 30);
        assert_eq!(config.trials_per_block(), 60);
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn oversized_sample_is_rejected() {
        let config = StroopConfig {
            stroop_sample_size: 37,
            ..StroopConfig::default()
        };
        match config.validate() {
            Err(ExperimentError::SampleExceedsPool { requested, available }) => {
                assert_eq!(requested, 37);
                assert_eq!(available, 36);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let config = StroopConfig {
            keys: ResponseKeys { green: 'z', red: 'Z' },
            ..StroopConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExperimentError::InvalidConfig(_))));
    }

    #[test]
    fn detection_blocks_must_fit_pool() {
        let config = DetectionConfig {
            trials_per_block: 46,
            ..DetectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExperimentError::SampleExceedsPool { requested: 184, available: 180 })
        ));
    }

    #[test]
    fn empty_detection_blocks_are_rejected() {
        for (blocks, trials_per_block) in [(0, 45), (4, 0)] {
            let config = DetectionConfig {
                blocks,
                trials_per_block,
                ..DetectionConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ExperimentError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ExperimentConfig::from_json(
            r#"{ "stroop": { "blocks": 2, "timing": { "response_timeout_ms": 1500 } } }"#,
        )
        .unwrap();
        assert_eq!(config.stroop.blocks, 2);
        assert_eq!(config.stroop.timing.fixation_ms, 200);
        assert_eq!(
            config.stroop.timing.response_timeout(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.detection, DetectionConfig::default());
    }

    #[test]
    fn invalid_json_config_fails_validation() {
        let err = ExperimentConfig::from_json(r#"{ "stroop": { "stroop_sample_size": 100 } }"#)
            .unwrap_err();
        assert!(matches!(err, ExperimentError::SampleExceedsPool { .. }));
    }

    #[test]
    fn key_mapping_round_trips() {
        let keys = ResponseKeys::default();
        assert_eq!(keys.key_for(InkColor::Green), Key::Char('z'));
        assert_eq!(keys.color_for(Key::Char('m')), Some(InkColor::Red));
        assert_eq!(keys.color_for(Key::Space), None);
        assert!(keys.response_set().contains(&Key::Escape));
    }
}
