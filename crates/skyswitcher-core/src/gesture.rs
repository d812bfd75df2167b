// SkySwitcher Gesture Detector
// Recognizes a double tap of the trigger within a timing window

use std::time::{Duration, Instant};

use strum_macros::{Display, EnumIter, EnumString};

use crate::input::KeyEvent;
use crate::{Key, Modifier};

/// Default maximum gap between the two taps
pub const DEFAULT_THRESHOLD_MS: u64 = 400;

/// The gesture styles an operator can choose from.
///
/// Every style is a double tap. Chord styles tap their second key twice
/// while the first key's modifier stays held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum TriggerStyle {
    #[default]
    #[strum(serialize = "double-right-shift")]
    DoubleRightShift,
    #[strum(serialize = "alt+shift")]
    AltShift,
    #[strum(serialize = "meta+space")]
    MetaSpace,
    #[strum(serialize = "ctrl+shift")]
    CtrlShift,
    #[strum(serialize = "capslock")]
    CapsLock,
}

impl TriggerStyle {
    /// Keys whose press counts as a tap
    pub fn tap_keys(self) -> &'static [Key] {
        match self {
            TriggerStyle::DoubleRightShift => &[Key::RIGHT_SHIFT],
            TriggerStyle::AltShift | TriggerStyle::CtrlShift => Modifier::Shift.keys(),
            TriggerStyle::MetaSpace => &[Key::SPACE],
            TriggerStyle::CapsLock => &[Key::CAPSLOCK],
        }
    }

    /// Modifier that must be held for a tap to count
    pub fn chord(self) -> Option<Modifier> {
        match self {
            TriggerStyle::AltShift => Some(Modifier::Alt),
            TriggerStyle::MetaSpace => Some(Modifier::Meta),
            TriggerStyle::CtrlShift => Some(Modifier::Control),
            TriggerStyle::DoubleRightShift | TriggerStyle::CapsLock => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerState {
    Idle,
    /// First tap seen at this instant
    Armed(Instant),
}

/// Two-state machine: `Idle` and armed-waiting-for-second-tap.
///
/// Only press actions drive transitions. The window is checked against
/// the timestamp of the next event; `expire` gives the event loop a way
/// to disarm on a timer as well.
#[derive(Debug, Clone)]
pub struct GestureDetector {
    style: TriggerStyle,
    threshold: Duration,
    state: TriggerState,
}

impl GestureDetector {
    pub fn new(style: TriggerStyle, threshold: Duration) -> Self {
        Self {
            style,
            threshold,
            state: TriggerState::Idle,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, TriggerState::Armed(_))
    }

    /// Whether the event is a tap of the trigger (any action)
    pub fn is_trigger(&self, event: &KeyEvent) -> bool {
        if !self.style.tap_keys().contains(&event.key) {
            return false;
        }
        match self.style.chord() {
            Some(modifier) => event.modifiers.is_held(modifier),
            None => true,
        }
    }

    /// Feed one event. Returns true when the gesture fires.
    pub fn on_event(&mut self, event: &KeyEvent) -> bool {
        if !event.action.is_press() {
            return false;
        }

        if !self.is_trigger(event) {
            if self.is_armed() {
                log::trace!("gesture disarmed by {}", event.key);
            }
            self.state = TriggerState::Idle;
            return false;
        }

        match self.state {
            TriggerState::Armed(first) if event.time.saturating_duration_since(first) <= self.threshold => {
                self.state = TriggerState::Idle;
                true
            }
            _ => {
                // Idle, or the window already elapsed: this tap starts a new cycle
                self.state = TriggerState::Armed(event.time);
                false
            }
        }
    }

    /// Disarm if the window has elapsed. Returns true if it disarmed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            TriggerState::Armed(first) if now.saturating_duration_since(first) > self.threshold => {
                self.state = TriggerState::Idle;
                true
            }
            _ => false,
        }
    }
}
