//! Processing Configuration

use serde::{Deserialize, Serialize};

/// Processing context fixed at prepare time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: f32,

    /// Maximum samples per processed block
    pub max_block_size: usize,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_size: 512,
            channels: 2,
        }
    }
}

impl ProcessConfig {
    /// Calculate worst-case block latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.max_block_size as f32 / self.sample_rate) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(8000.0..=192000.0).contains(&self.sample_rate) {
            return Err(format!("Invalid sample rate: {}", self.sample_rate));
        }
        if self.channels == 0 || self.channels > 8 {
            return Err(format!("Invalid channel count: {}", self.channels));
        }
        if self.max_block_size == 0 || self.max_block_size > 8192 {
            return Err(format!("Invalid block size: {}", self.max_block_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.channels, 2);
        assert_eq!(config.max_block_size, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_latency_calculation() {
        let config = ProcessConfig::default();
        // 512 frames at 48kHz is ~10.7ms
        assert!((config.latency_ms() - 10.67).abs() < 0.1);
    }

    #[test]
    fn test_validation_bounds() {
        let mut config = ProcessConfig::default();
        config.sample_rate = 1000.0;
        assert!(config.validate().is_err());

        let mut config = ProcessConfig::default();
        config.channels = 0;
        assert!(config.validate().is_err());

        let mut config = ProcessConfig::default();
        config.max_block_size = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ProcessConfig {
            sample_rate: 96000.0,
            max_block_size: 256,
            channels: 1,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ProcessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sample_rate, config.sample_rate);
        assert_eq!(back.max_block_size, config.max_block_size);
        assert_eq!(back.channels, config.channels);
    }
}
