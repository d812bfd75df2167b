// SkySwitcher Event Handling
// Passive evdev reader merging every selected keyboard

pub mod r#loop;

pub use r#loop::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult, RawKeyEvent};
