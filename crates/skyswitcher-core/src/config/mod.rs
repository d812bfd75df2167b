// SkySwitcher Configuration
// Runtime engine settings with their defaults

#[cfg(feature = "pure-rust")]
pub mod parser;

use std::time::Duration;

use crate::correction::SwitchOrder;
use crate::gesture::{TriggerStyle, DEFAULT_THRESHOLD_MS};
use crate::layout::LayoutId;
use crate::output::SwitchCombo;
use crate::tracker::{DEFAULT_BUFFER_CAP, DEFAULT_IDLE_RESET_MS};

#[cfg(feature = "pure-rust")]
pub use parser::{ConfigError, ConfigToml};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gesture that requests a correction
    pub trigger: TriggerStyle,
    /// Maximum gap between the two taps
    pub double_press: Duration,
    /// Typing pause that starts a new word (None = never)
    pub idle_reset: Option<Duration>,
    /// Longest word kept in the buffer
    pub buffer_cap: usize,
    /// Layout assumed active at startup
    pub initial_layout: LayoutId,
    /// Key combination the desktop uses to switch layouts
    pub switch_combo: SwitchCombo,
    pub switch_order: SwitchOrder,
    /// Hold the correction back until every modifier key is released
    pub wait_for_release: bool,
    /// Device name/path filter (empty = autodetect keyboards)
    pub device_filter: Vec<String>,
    /// Pre-key output delay in milliseconds
    pub key_pre_delay_ms: u64,
    /// Post-key output delay in milliseconds
    pub key_post_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger: TriggerStyle::default(),
            double_press: Duration::from_millis(DEFAULT_THRESHOLD_MS),
            idle_reset: Some(Duration::from_millis(DEFAULT_IDLE_RESET_MS)),
            buffer_cap: DEFAULT_BUFFER_CAP,
            initial_layout: LayoutId::English,
            switch_combo: SwitchCombo::default(),
            switch_order: SwitchOrder::default(),
            wait_for_release: false,
            device_filter: vec![],
            key_pre_delay_ms: 0,
            key_post_delay_ms: 0,
        }
    }
}
