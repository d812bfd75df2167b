// SkySwitcher Input Layer
// Key event model and device detection logic

mod device;
mod event;
mod filter;

pub use device::{
    has_ignored_keyword, is_keyboard, is_virtual_device, looks_like_keyboard, DeviceCapabilities,
};
pub use event::{classify, KeyClass, KeyEvent};
pub use filter::{matches_device_filter, resolve_device_filter};
