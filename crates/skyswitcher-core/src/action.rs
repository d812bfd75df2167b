use std::fmt;

/// Value field of an EV_KEY event.
///
///   0 == released
///   1 == pressed
///   2 == auto-repeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Create Action from the evdev event value
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            2 => Some(Action::Repeat),
            _ => None,
        }
    }

    /// True for PRESS and REPEAT: the key is down and produces output
    pub fn is_down(self) -> bool {
        matches!(self, Action::Press | Action::Repeat)
    }

    /// True only for the initial PRESS
    pub fn is_press(self) -> bool {
        matches!(self, Action::Press)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
            Action::Repeat => write!(f, "repeat"),
        }
    }
}
