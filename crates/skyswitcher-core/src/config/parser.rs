// SkySwitcher Config Parser - TOML with Serde
// Parses configuration from TOML files

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::Config;

const DOUBLE_PRESS_RANGE_MS: RangeInclusive<u64> = 50..=2000;
const BUFFER_CAP_RANGE: RangeInclusive<usize> = 1..=1024;
const DELAY_RANGE_MS: RangeInclusive<u64> = 0..=1000;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub general: Option<GeneralConfig>,

    #[serde(default)]
    pub timeouts: Option<TimeoutConfig>,

    #[serde(default)]
    pub buffer: Option<BufferConfig>,

    /// Device filter configuration
    #[serde(default)]
    pub devices: Option<DevicesConfig>,

    /// Output throttle delays
    #[serde(default)]
    pub delays: Option<DelayConfig>,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Trigger style name, e.g. "double-right-shift"
    pub trigger: Option<String>,
    /// "en" or "ua"
    pub initial_layout: Option<String>,
    /// Layout switch combo, e.g. "Meta+Space"
    pub switch_combo: Option<String>,
    /// "before-retype" or "after-retype"
    pub switch_order: Option<String>,
    pub wait_for_release: Option<bool>,
}

/// Timeout configuration (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    pub double_press_ms: Option<u64>,
    /// 0 disables the pause-based word reset
    pub idle_reset_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferConfig {
    pub cap: Option<usize>,
}

/// Device filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevicesConfig {
    /// Explicit device names/paths to use
    #[serde(default)]
    pub only: Vec<String>,
}

/// Output delay configuration (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelayConfig {
    /// Delay before key output
    pub key_pre_delay_ms: Option<u64>,
    /// Delay after key output
    pub key_post_delay_ms: Option<u64>,
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Get the default config path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skyswitcher").join("config.toml"))
    }

    /// Load from default location (~/.config/skyswitcher/config.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                return Self::from_toml_path(path);
            }
        }
        Ok(Self::default())
    }
}

impl ConfigToml {
    /// Convert parsed TOML to internal Config structure
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(general) = &self.general {
            if let Some(trigger) = &general.trigger {
                config.trigger = trigger
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(format!("unknown trigger '{}'", trigger)))?;
            }
            if let Some(layout) = &general.initial_layout {
                config.initial_layout = layout
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(format!("unknown layout '{}'", layout)))?;
            }
            if let Some(combo) = &general.switch_combo {
                config.switch_combo = combo
                    .parse()
                    .map_err(|e| ConfigError::InvalidKey(format!("switch_combo: {}", e)))?;
            }
            if let Some(order) = &general.switch_order {
                config.switch_order = order.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!("unknown switch_order '{}'", order))
                })?;
            }
            if let Some(wait) = general.wait_for_release {
                config.wait_for_release = wait;
            }
        }

        if let Some(timeouts) = &self.timeouts {
            if let Some(ms) = timeouts.double_press_ms {
                check_range("timeouts.double_press_ms", ms, &DOUBLE_PRESS_RANGE_MS)?;
                config.double_press = Duration::from_millis(ms);
            }
            if let Some(ms) = timeouts.idle_reset_ms {
                config.idle_reset = (ms > 0).then(|| Duration::from_millis(ms));
            }
        }

        if let Some(cap) = self.buffer.as_ref().and_then(|b| b.cap) {
            check_range("buffer.cap", cap, &BUFFER_CAP_RANGE)?;
            config.buffer_cap = cap;
        }

        if let Some(devices) = &self.devices {
            config.device_filter = devices.only.clone();
        }

        if let Some(delays) = &self.delays {
            if let Some(ms) = delays.key_pre_delay_ms {
                check_range("delays.key_pre_delay_ms", ms, &DELAY_RANGE_MS)?;
                config.key_pre_delay_ms = ms;
            }
            if let Some(ms) = delays.key_post_delay_ms {
                check_range("delays.key_post_delay_ms", ms, &DELAY_RANGE_MS)?;
                config.key_post_delay_ms = ms;
            }
        }

        Ok(config)
    }
}

fn check_range<T>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{} = {} is outside {}..={}",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}
