//! Configuration for the harvestgate simulator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default simulation parameters, loaded from the platform config dir and
/// overridable per run from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Samples per packet
    pub packet_size: usize,

    /// Passive leakage rate in Watts
    pub leakage: f64,

    /// Dispatch policy identifier
    pub policy: String,

    /// Path for exporting run reports
    pub export_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harvestgate");

        Self {
            packet_size: 16,
            leakage: 6e-6, // 6 uW
            policy: "opportunistic".to_string(),
            export_path: data_dir.join("runs"),
        }
    }
}

impl SimConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: SimConfig = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harvestgate")
            .join("config.json")
    }

    /// Ensure the export directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.packet_size, 16);
        assert_eq!(config.policy, "opportunistic");
        assert!((config.leakage - 6e-6).abs() < 1e-15);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.packet_size, config.packet_size);
        assert_eq!(back.policy, config.policy);
    }
}
