// SkySwitcher Modifier State
// Tracks which of Shift / Ctrl / Alt / Meta are currently held

use crate::{Action, Key};

/// Modifier groups the engine distinguishes. Left and right keys of a
/// group are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

impl Modifier {
    /// Physical keys that belong to this modifier group
    pub fn keys(self) -> &'static [Key] {
        match self {
            Modifier::Shift => &[Key::LEFT_SHIFT, Key::RIGHT_SHIFT],
            Modifier::Control => &[Key::LEFT_CTRL, Key::RIGHT_CTRL],
            Modifier::Alt => &[Key::LEFT_ALT, Key::RIGHT_ALT],
            Modifier::Meta => &[Key::LEFT_META, Key::RIGHT_META],
        }
    }

    /// The modifier group a key belongs to, if any
    pub fn from_key(key: Key) -> Option<Self> {
        [Modifier::Shift, Modifier::Control, Modifier::Alt, Modifier::Meta]
            .into_iter()
            .find(|m| m.keys().contains(&key))
    }

    /// Check if a key is a modifier key
    pub fn is_key_modifier(key: Key) -> bool {
        Self::from_key(key).is_some()
    }
}

/// Snapshot of held modifiers.
///
/// Each side is tracked separately so releasing left shift while right
/// shift is still down keeps `shift` active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    held: [bool; 8],
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(key: Key) -> Option<usize> {
        match key {
            Key::LEFT_SHIFT => Some(0),
            Key::RIGHT_SHIFT => Some(1),
            Key::LEFT_CTRL => Some(2),
            Key::RIGHT_CTRL => Some(3),
            Key::LEFT_ALT => Some(4),
            Key::RIGHT_ALT => Some(5),
            Key::LEFT_META => Some(6),
            Key::RIGHT_META => Some(7),
            _ => None,
        }
    }

    /// Apply a key event. Returns true if the key was a modifier.
    pub fn update(&mut self, key: Key, action: Action) -> bool {
        match Self::slot(key) {
            Some(slot) => {
                self.held[slot] = action.is_down();
                true
            }
            None => false,
        }
    }

    /// Check whether any key of a modifier group is held
    pub fn is_held(&self, modifier: Modifier) -> bool {
        modifier
            .keys()
            .iter()
            .filter_map(|k| Self::slot(*k))
            .any(|slot| self.held[slot])
    }

    pub fn shift(&self) -> bool {
        self.is_held(Modifier::Shift)
    }

    /// Ctrl, Alt or Meta held: a character press is a shortcut, not text
    pub fn shortcut_active(&self) -> bool {
        self.is_held(Modifier::Control) || self.is_held(Modifier::Alt) || self.is_held(Modifier::Meta)
    }

    /// Any modifier key at all is down
    pub fn any_held(&self) -> bool {
        self.held.iter().any(|held| *held)
    }

    /// Builder used by tests and by synthetic events
    pub fn with(mut self, key: Key) -> Self {
        self.update(key, Action::Press);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_from_key() {
        assert_eq!(Modifier::from_key(Key::RIGHT_SHIFT), Some(Modifier::Shift));
        assert_eq!(Modifier::from_key(Key::RIGHT_ALT), Some(Modifier::Alt));
        assert_eq!(Modifier::from_key(Key::A), None);
        assert!(Modifier::is_key_modifier(Key::LEFT_META));
    }

    #[test]
    fn test_shift_tracking_both_sides() {
        let mut mods = Modifiers::new();
        assert!(mods.update(Key::LEFT_SHIFT, Action::Press));
        assert!(mods.update(Key::RIGHT_SHIFT, Action::Press));
        mods.update(Key::LEFT_SHIFT, Action::Release);
        assert!(mods.shift());
        mods.update(Key::RIGHT_SHIFT, Action::Release);
        assert!(!mods.shift());
    }

    #[test]
    fn test_repeat_keeps_modifier_held() {
        let mut mods = Modifiers::new();
        mods.update(Key::LEFT_CTRL, Action::Press);
        mods.update(Key::LEFT_CTRL, Action::Repeat);
        assert!(mods.shortcut_active());
    }

    #[test]
    fn test_non_modifier_ignored() {
        let mut mods = Modifiers::new();
        assert!(!mods.update(Key::A, Action::Press));
        assert_eq!(mods, Modifiers::new());
    }

    #[test]
    fn test_shift_is_not_a_shortcut() {
        let mods = Modifiers::new().with(Key::LEFT_SHIFT);
        assert!(mods.shift());
        assert!(!mods.shortcut_active());
        assert!(mods.any_held());
        assert!(!Modifiers::new().any_held());
    }
}
