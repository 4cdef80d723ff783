//! # Scanner Configuration
//!
//! Tunables for the camera request and the scan loop.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKSCAN_SCAN_INTERVAL_MS=250                                     │
//! │     STOCKSCAN_READY_TIMEOUT_MS=10000                                   │
//! │     STOCKSCAN_FACING=environment                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockscan/scanner.toml (Linux)                           │
//! │     ~/Library/Application Support/com.stockscan.scanner/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     250 ms ticks, 10 s readiness timeout, rear camera 640×480          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanner.toml
//! [scan]
//! interval_ms = 250
//! ready_timeout_ms = 10000
//!
//! [camera]
//! facing = "environment"
//! ideal_width = 640
//! max_width = 1280
//! ideal_height = 480
//! max_height = 720
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::device::{CameraConstraints, DimensionRange, FacingMode};
use crate::error::{ScanError, ScannerResult};

// =============================================================================
// Scan Settings
// =============================================================================

/// Scan loop timing.
///
/// ## Interval Trade-off
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  shorter interval  → faster first hit, more CPU / battery per second   │
/// │  longer interval   → cheaper, but the user holds the code up longer    │
/// │                                                                         │
/// │  250 ms decodes 4 frames/s, which feels instant on a phone.            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Sampling period (milliseconds).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// How long to wait for the sink to report buffered data before the
    /// attempt fails as unresponsive (milliseconds).
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

fn default_interval_ms() -> u64 {
    250
}

fn default_ready_timeout_ms() -> u64 {
    10_000
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            interval_ms: default_interval_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

// =============================================================================
// Camera Settings
// =============================================================================

/// Camera request preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default)]
    pub facing: FacingMode,

    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,

    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,

    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

fn default_ideal_width() -> u32 {
    640
}
fn default_max_width() -> u32 {
    1280
}
fn default_ideal_height() -> u32 {
    480
}
fn default_max_height() -> u32 {
    720
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            facing: FacingMode::default(),
            ideal_width: default_ideal_width(),
            max_width: default_max_width(),
            ideal_height: default_ideal_height(),
            max_height: default_max_height(),
        }
    }
}

// =============================================================================
// Main Scanner Configuration
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub camera: CameraSettings,
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scanner.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ScannerResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load scanner config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ScannerResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ScanError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ScanError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ScanError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ScannerResult<()> {
        if self.scan.interval_ms == 0 {
            return Err(ScanError::InvalidConfig(
                "scan.interval_ms must be greater than 0".into(),
            ));
        }

        if self.scan.ready_timeout_ms == 0 {
            return Err(ScanError::InvalidConfig(
                "scan.ready_timeout_ms must be greater than 0".into(),
            ));
        }

        let c = &self.camera;
        if c.ideal_width == 0 || c.ideal_height == 0 {
            return Err(ScanError::InvalidConfig(
                "camera ideal resolution must be non-zero".into(),
            ));
        }
        if c.ideal_width > c.max_width || c.ideal_height > c.max_height {
            return Err(ScanError::InvalidConfig(format!(
                "camera ideal resolution {}x{} exceeds max {}x{}",
                c.ideal_width, c.ideal_height, c.max_width, c.max_height
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("STOCKSCAN_SCAN_INTERVAL_MS") {
            match value.parse::<u64>() {
                Ok(ms) => {
                    debug!(interval_ms = ms, "Overriding scan interval from environment");
                    self.scan.interval_ms = ms;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKSCAN_SCAN_INTERVAL_MS"),
            }
        }

        if let Ok(value) = std::env::var("STOCKSCAN_READY_TIMEOUT_MS") {
            match value.parse::<u64>() {
                Ok(ms) => {
                    debug!(ready_timeout_ms = ms, "Overriding ready timeout from environment");
                    self.scan.ready_timeout_ms = ms;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKSCAN_READY_TIMEOUT_MS"),
            }
        }

        if let Ok(value) = std::env::var("STOCKSCAN_FACING") {
            match value.parse::<FacingMode>() {
                Ok(facing) => self.camera.facing = facing,
                Err(e) => warn!(error = %e, "Ignoring invalid STOCKSCAN_FACING"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockscan", "scanner")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan.interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.scan.ready_timeout_ms)
    }

    /// The camera request built from `[camera]`.
    pub fn constraints(&self) -> CameraConstraints {
        CameraConstraints {
            facing: Some(self.camera.facing),
            width: Some(DimensionRange {
                ideal: self.camera.ideal_width,
                max: self.camera.max_width,
            }),
            height: Some(DimensionRange {
                ideal: self.camera.ideal_height,
                max: self.camera.max_height,
            }),
            audio: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.scan_interval(), Duration::from_millis(250));
        assert_eq!(config.ready_timeout(), Duration::from_secs(10));
        assert_eq!(config.constraints(), CameraConstraints::preferred());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ScannerConfig::default();
        config.scan.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.scan.ready_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.camera.ideal_width = 1920;
        assert!(matches!(config.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ScannerConfig = toml::from_str("[scan]\ninterval_ms = 100\n").unwrap();
        assert_eq!(config.scan.interval_ms, 100);
        assert_eq!(config.scan.ready_timeout_ms, 10_000);
        assert_eq!(config.camera.max_height, 720);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scanner.toml");

        let mut config = ScannerConfig::default();
        config.scan.interval_ms = 500;
        config.camera.facing = FacingMode::User;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[scan]"));
        assert!(contents.contains("[camera]"));

        let loaded: ScannerConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.scan.interval_ms, 500);
        assert_eq!(loaded.camera.facing, FacingMode::User);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.toml");
        std::fs::write(&path, "[scan]\ninterval_ms = \"fast\"\n").unwrap();

        let err = ScannerConfig::load(Some(path)).unwrap_err();
        assert!(err.is_config_error());
    }
}
