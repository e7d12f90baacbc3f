use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::core::bluetooth::commands::LedColor;
use crate::core::bluetooth::constants::DEFAULT_SCAN_DURATION_SECS;
use crate::sensors::SensorType;
use crate::utils::ensure_parent_directory;

pub const CONFIG_FILE_NAME: &str = "thingy52_bridge.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "THINGY52_BRIDGE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long to scan for a Thingy before giving up
    pub scan_timeout_secs: u64,

    /// Sensor names to back with the Thingy. Names the Thingy cannot provide
    /// are ignored.
    pub sensors: Vec<String>,

    /// Colour written to the LED once the device is open
    pub led_on_connect: Option<LedColor>,

    /// Log filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            scan_timeout_secs: DEFAULT_SCAN_DURATION_SECS,
            sensors: SensorType::ALL.iter().map(|t| t.name().to_string()).collect(),
            led_on_connect: None,
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Picks the config file: `explicit`, else `$THINGY52_BRIDGE_CONFIG`, else
    /// `thingy52_bridge.json` in the working directory
    pub fn resolve_path(explicit: Option<String>) -> PathBuf {
        explicit
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    /// Loads the config from a configuration file.
    pub async fn load_config(file_path: &Path) -> Result<Self> {
        let file_path_str = file_path.to_string_lossy().into_owned();

        if !file_path.exists() {
            warn!("Config file not found at {:?}, using default.", file_path_str);
            return Ok(Self::default());
        }

        let config_json = fs::read_to_string(file_path).await?;
        let config: Self = serde_json::from_str(&config_json)?;

        info!("Config loaded from {:?}", file_path_str);
        Ok(config)
    }

    /// Saves the current config to a configuration file.
    pub async fn save_config(&self, file_path: &Path) -> Result<()> {
        ensure_parent_directory(file_path).await?;
        let file_path_str = file_path.to_string_lossy().into_owned();

        let config_json = match serde_json::to_string_pretty(&self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize bridge config to JSON: {}", e);
                return Err(e.into());
            }
        };

        fs::write(file_path, config_json).await?;

        info!("Bridge config saved to {:?}.", file_path_str);
        Ok(())
    }
}
