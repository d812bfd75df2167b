// SkySwitcher Input Layer - Device Detection
// Device capability analysis and keyboard detection

use std::collections::HashSet;

/// Device capabilities extracted from evdev device.supported_keys()
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// Supported key codes (EV_KEY capability codes)
    pub supported_keys: HashSet<u16>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: impl IntoIterator<Item = u16>) -> Self {
        Self {
            has_ev_key,
            supported_keys: supported_keys.into_iter().collect(),
        }
    }

    /// Check if a specific key code is supported
    pub fn supports_key(&self, key_code: u16) -> bool {
        self.supported_keys.contains(&key_code)
    }
}

// QWERTY row key codes: Q, W, E, R, T, Y
const QWERTY_CODES: &[u16] = &[16, 17, 18, 19, 20, 21];

// SPACE, ENTER, A, Z
const REQUIRED_CODES: &[u16] = &[57, 28, 30, 44];

/// Name fragments of devices that advertise EV_KEY but are not typing
/// keyboards (media remotes, headsets, docks, the Logitech receiver tool).
const IGNORED_KEYWORDS: &[&str] = &[
    "mouse", "webcam", "audio", "video", "consumer", "control", "headset", "receiver", "solaar",
    "hotkeys", "button", "switch", "hda", "dock",
];

/// Determine if a device is a keyboard based on its capabilities.
///
/// A keyboard supports EV_KEY, the whole QWERTY row, and
/// SPACE / ENTER / A / Z.
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    if !capabilities.has_ev_key {
        return false;
    }

    let qwerty_present = QWERTY_CODES.iter().all(|code| capabilities.supports_key(*code));
    let required_present = REQUIRED_CODES.iter().all(|code| capabilities.supports_key(*code));

    qwerty_present && required_present
}

/// Check if a device is a virtual device based on its name.
///
/// The sink's own uinput device must never be read back, or every
/// correction would be fed into the word buffer again.
pub fn is_virtual_device(name: &str, prefix: &str) -> bool {
    name.contains(prefix)
}

/// Check whether a device name contains a non-keyboard keyword
pub fn has_ignored_keyword(name: &str) -> bool {
    let lower = name.to_lowercase();
    IGNORED_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Whether the name itself says "keyboard" (used to order candidates)
pub fn looks_like_keyboard(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("keyboard") || lower.contains("kbd")
}
