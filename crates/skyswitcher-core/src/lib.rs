// SkySwitcher Core Library
// Keyboard layout auto-correction: gesture, word tracking, transliteration, output

pub mod action;
pub mod config;
pub mod correction;
pub mod daemon;
pub mod gesture;
pub mod input;
pub mod key;
pub mod layout;
pub mod modifier;
pub mod output;
pub mod tracker;

#[cfg(feature = "pure-rust")]
pub mod event;

pub use action::Action;
pub use config::Config;
pub use correction::{CorrectionEmitter, CorrectionOutcome, FailReason, SkipReason, SwitchOrder};
pub use daemon::Daemon;
pub use gesture::{GestureDetector, TriggerStyle};
pub use input::{
    classify, is_keyboard, is_virtual_device, matches_device_filter, DeviceCapabilities, KeyClass,
    KeyEvent,
};
pub use key::Key;
pub use layout::{LayoutId, LayoutTable, TranslateError, Translation, Transliterator};
pub use modifier::{Modifier, Modifiers};
pub use output::{ComboParseError, KeySink, RecordingSink, SinkEvent, SwitchCombo, UInputError};
pub use tracker::{TypedKey, WordBuffer, WordTracker};

#[cfg(feature = "pure-rust")]
pub use config::ConfigError;
#[cfg(feature = "pure-rust")]
pub use event::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult};
#[cfg(feature = "pure-rust")]
pub use output::VirtualDevice;
