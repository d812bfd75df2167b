// SkySwitcher Input Layer - Key Events
// The immutable event record fed to the detector and the tracker

use std::time::Instant;

use crate::{Action, Key, Modifier, Modifiers};

/// One physical key action, as delivered by the raw event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: Action,
    /// Modifier state at the moment of the event, including this event
    pub modifiers: Modifiers,
    pub time: Instant,
}

impl KeyEvent {
    pub fn new(key: Key, action: Action, modifiers: Modifiers, time: Instant) -> Self {
        Self {
            key,
            action,
            modifiers,
            time,
        }
    }

    /// Whether a shift key was held when this key went down
    pub fn shift_active(&self) -> bool {
        self.modifiers.shift()
    }
}

/// How the typed-text tracker treats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Produces a glyph on the printable block
    Character,
    Backspace,
    /// Shift / Ctrl / Alt / Meta / CapsLock: no effect on the word
    Modifier,
    /// Ends the current word (separators, navigation, unknown codes)
    Boundary,
}

/// Classify a key code.
///
/// The printable block is the same on every layout the engine knows:
/// the digit row, the three letter rows with their punctuation keys, and
/// the extra ISO key. Anything not recognised ends the word.
pub fn classify(key: Key) -> KeyClass {
    match key.code() {
        2..=13 | 16..=27 | 30..=41 | 43..=53 | 86 => KeyClass::Character,
        14 => KeyClass::Backspace,
        58 => KeyClass::Modifier,
        _ if Modifier::is_key_modifier(key) => KeyClass::Modifier,
        _ => KeyClass::Boundary,
    }
}
