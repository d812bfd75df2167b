// SkySwitcher Pure Rust Event Loop
// Direct evdev reading for keyboard observation

use std::os::unix::io::AsRawFd;
use std::time::{Instant, SystemTime};

use evdev::{Device, EventType, InputEventKind};

use crate::input::{
    has_ignored_keyword, is_keyboard, is_virtual_device, looks_like_keyboard,
    matches_device_filter, resolve_device_filter, DeviceCapabilities,
};
use crate::output::VirtualDevice;
use crate::{Action, Key};

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event device error: {0}")]
    Evdev(String),
}

/// Device information for listing devices
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub path: String,
    /// Passes the keyboard capability check
    pub is_keyboard: bool,
}

/// One key action read from a device, before modifier bookkeeping, with
/// the moment the kernel stamped it
pub type RawKeyEvent = (Key, Action, Instant);

/// Map a kernel event timestamp onto the monotonic clock.
///
/// `wall` and `now` are read together right after the poll. Stamps from
/// the future (clock adjustments) map to `now`.
fn event_instant(stamp: SystemTime, wall: SystemTime, now: Instant) -> Instant {
    let age = wall.duration_since(stamp).unwrap_or_default();
    now.checked_sub(age).unwrap_or(now)
}

/// Event loop over the selected keyboards.
///
/// Devices are never grabbed: the user's keystrokes must keep reaching
/// applications, the engine only watches them.
pub struct EventLoop {
    devices: Vec<Device>,
    poll_fds: Vec<libc::pollfd>,
}

impl EventLoop {
    /// Open every autodetected keyboard
    pub fn new() -> EventLoopResult<Self> {
        Self::new_filtered(&[])
    }

    /// Open the devices matching `filter_names` (paths or exact names), or
    /// autodetect keyboards when the filter is empty.
    pub fn new_filtered(filter_names: &[String]) -> EventLoopResult<Self> {
        let devices = Self::find_keyboards_filtered(filter_names)?;
        for device in &devices {
            log::info!("watching {}", device.name().unwrap_or("Unknown"));
        }
        let poll_fds = Self::create_poll_fds(&devices);
        Ok(Self { devices, poll_fds })
    }

    fn create_poll_fds(devices: &[Device]) -> Vec<libc::pollfd> {
        devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect()
    }

    /// List every input device, flagging the ones that look like keyboards.
    ///
    /// Used by `--list-devices`.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices: Vec<DeviceInfo> = evdev::enumerate()
            .map(|(path, device)| DeviceInfo {
                name: device.name().unwrap_or("Unknown").to_string(),
                path: path.display().to_string(),
                is_keyboard: is_keyboard(&Self::capabilities(&device)),
            })
            .collect();
        devices.sort_by(|a, b| a.path.cmp(&b.path));
        devices
    }

    fn find_keyboards_filtered(filter_names: &[String]) -> EventLoopResult<Vec<Device>> {
        let filter_names = resolve_device_filter(filter_names);
        let mut keyboards = Vec::new();

        for (path, device) in evdev::enumerate() {
            let device_name = device.name().unwrap_or("Unknown");
            let device_path = path.to_str().unwrap_or_default();
            let keyboard = is_keyboard(&Self::capabilities(&device));
            let is_virtual = is_virtual_device(device_name, VirtualDevice::NAME_PREFIX);
            let is_ignored = has_ignored_keyword(device_name);

            if matches_device_filter(
                device_name,
                device_path,
                &filter_names,
                keyboard,
                is_virtual,
                is_ignored,
            ) {
                log::debug!("selected {} ({})", device_name, device_path);
                keyboards.push(device);
            }
        }

        if keyboards.is_empty() {
            return Err(EventLoopError::DeviceNotFound(
                "No keyboard devices found".to_string(),
            ));
        }

        // Devices named like keyboards first; only affects log order
        keyboards.sort_by_key(|d| !looks_like_keyboard(d.name().unwrap_or("")));
        Ok(keyboards)
    }

    fn capabilities(device: &Device) -> DeviceCapabilities {
        let has_ev_key = device.supported_events().contains(EventType::KEY);
        let keys = device
            .supported_keys()
            .map(|keys| keys.iter().map(|k| k.code()).collect::<Vec<_>>())
            .unwrap_or_default();
        DeviceCapabilities::new(has_ev_key, keys)
    }

    /// Wait up to `timeout_ms` for key events from any device.
    ///
    /// Returns an empty vector on timeout or EINTR (a signal was
    /// delivered); the caller checks its running flag and calls again.
    /// Non-key events are dropped.
    pub fn poll(&mut self, timeout_ms: i32) -> EventLoopResult<Vec<RawKeyEvent>> {
        let mut events = Vec::new();

        let poll_result = unsafe {
            libc::poll(
                self.poll_fds.as_mut_ptr(),
                self.poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(events);
            }
            return Err(EventLoopError::Io(err));
        }

        if poll_result == 0 {
            return Ok(events);
        }

        let (wall, now) = (SystemTime::now(), Instant::now());

        for (i, device) in self.devices.iter_mut().enumerate() {
            let revents = self.poll_fds[i].revents;
            if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
                return Err(EventLoopError::Evdev(format!(
                    "device {} went away",
                    device.name().unwrap_or("Unknown")
                )));
            }
            if revents & libc::POLLIN == 0 {
                continue;
            }
            match device.fetch_events() {
                Ok(device_events) => {
                    for event in device_events {
                        if let InputEventKind::Key(key) = event.kind() {
                            if let Some(action) = Action::from_i32(event.value()) {
                                let at = event_instant(event.timestamp(), wall, now);
                                events.push((Key::from(key.code()), action, at));
                            }
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(EventLoopError::Io(e)),
            }
        }

        Ok(events)
    }

    /// Get the names of all devices
    pub fn device_names(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|d| d.name().unwrap_or("Unknown").to_string())
            .collect()
    }

    /// Get number of devices managed by this event loop
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
