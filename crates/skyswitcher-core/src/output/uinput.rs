// SkySwitcher Pure Rust uinput Output Layer
// Virtual device creation and key event emission

use std::collections::HashSet;
use std::io::ErrorKind;
use std::time::Duration;

use evdev::uinput::VirtualDeviceBuilder;
use evdev::{AttributeSet, EventType, InputEvent};

use super::sink::{KeySink, UInputError};
use crate::{Action, Key};

/// Virtual uinput keyboard used to delete and retype words.
///
/// Held keys are tracked so that closing or dropping the device never
/// leaves a key stuck down on the desktop.
pub struct VirtualDevice {
    device: evdev::uinput::VirtualDevice,
    pressed: HashSet<Key>,
    key_pre_delay: Duration,
    key_post_delay: Duration,
}

impl VirtualDevice {
    /// Name prefix; the event loop skips devices carrying it
    pub const NAME_PREFIX: &'static str = "SkySwitcher (virtual)";
    const NAME: &'static str = "SkySwitcher (virtual) Keyboard";

    /// Create the virtual keyboard
    pub fn new() -> Result<Self, UInputError> {
        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(creation_error)?
            .name(Self::NAME)
            .with_keys(&keys)
            .map_err(creation_error)?
            .build()
            .map_err(creation_error)?;

        log::info!("virtual keyboard created");

        Ok(Self {
            device,
            pressed: HashSet::new(),
            key_pre_delay: Duration::ZERO,
            key_post_delay: Duration::ZERO,
        })
    }

    /// Configure output throttle delays in milliseconds.
    ///
    /// Some applications drop characters when synthetic events arrive
    /// back to back.
    pub fn set_throttle_delays(&mut self, key_pre_delay_ms: u64, key_post_delay_ms: u64) {
        self.key_pre_delay = Duration::from_millis(key_pre_delay_ms);
        self.key_post_delay = Duration::from_millis(key_post_delay_ms);
    }

    fn write_key_event(&mut self, key: Key, action: Action) -> Result<(), UInputError> {
        let key_event = InputEvent::new(EventType::KEY, key.code(), action as i32);
        // SYN event is required for the kernel to process the key event
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);

        self.device
            .emit(&[key_event, syn_event])
            .map_err(|e| UInputError::WriteError(e.to_string()))?;

        match action {
            Action::Press => {
                self.pressed.insert(key);
            }
            Action::Release => {
                self.pressed.remove(&key);
            }
            Action::Repeat => {}
        }
        Ok(())
    }

    /// Release every key this device still holds
    pub fn release_all(&mut self) -> Result<(), UInputError> {
        let held: Vec<Key> = self.pressed.iter().copied().collect();
        for key in held {
            self.write_key_event(key, Action::Release)?;
        }
        Ok(())
    }

    /// Close the virtual device, releasing held keys first
    pub fn close(mut self) -> Result<(), UInputError> {
        self.release_all()
    }
}

impl KeySink for VirtualDevice {
    fn send_key(&mut self, key: Key, action: Action) -> Result<(), UInputError> {
        if !self.key_pre_delay.is_zero() {
            std::thread::sleep(self.key_pre_delay);
        }
        self.write_key_event(key, action)?;
        if !self.key_post_delay.is_zero() {
            std::thread::sleep(self.key_post_delay);
        }
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if let Err(e) = self.release_all() {
            log::warn!("could not release held keys on shutdown: {}", e);
        }
    }
}

fn creation_error(e: std::io::Error) -> UInputError {
    if e.kind() == ErrorKind::PermissionDenied {
        UInputError::PermissionDenied(e.to_string())
    } else {
        UInputError::DeviceCreation(e.to_string())
    }
}
