// SkySwitcher Output Layer
// Synthetic key emission: sink abstraction, layout-switch combo, uinput device

mod combo;
mod sink;

#[cfg(feature = "pure-rust")]
mod uinput;

pub use combo::{ComboParseError, SwitchCombo};
pub use sink::{KeySink, RecordingSink, SinkEvent, UInputError};

#[cfg(feature = "pure-rust")]
pub use uinput::VirtualDevice;
