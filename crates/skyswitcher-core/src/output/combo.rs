// SkySwitcher Output Layer - Layout Switch Combo
// Parses strings like "Meta+Space" and plays them on a sink

use std::fmt;
use std::str::FromStr;

use super::sink::{KeySink, UInputError};
use crate::key::key_from_name;
use crate::{Action, Key};

/// Errors that can occur during combo parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboParseError {
    #[error("combo string cannot be empty")]
    EmptyInput,

    #[error("unknown key name: '{0}'")]
    UnknownKey(String),

    #[error("combo string has an empty component: '{0}'")]
    EmptyComponent(String),
}

/// The key combination the desktop uses to switch keyboard layouts.
///
/// Keys are pressed in order and released in reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCombo {
    keys: Vec<Key>,
}

impl Default for SwitchCombo {
    fn default() -> Self {
        Self {
            keys: vec![Key::LEFT_META, Key::SPACE],
        }
    }
}

impl SwitchCombo {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Play the combo on a sink.
    ///
    /// Every write is retried once. If a press still fails, the keys
    /// already down are released before the error is returned.
    pub fn emit<S: KeySink + ?Sized>(&self, sink: &mut S) -> Result<(), UInputError> {
        let mut pressed = Vec::with_capacity(self.keys.len());
        let mut result = Ok(());

        for key in &self.keys {
            match send_retrying(sink, *key, Action::Press) {
                Ok(()) => pressed.push(*key),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        for key in pressed.iter().rev() {
            let released = send_retrying(sink, *key, Action::Release);
            if result.is_ok() {
                result = released;
            }
        }

        result
    }
}

fn send_retrying<S: KeySink + ?Sized>(
    sink: &mut S,
    key: Key,
    action: Action,
) -> Result<(), UInputError> {
    sink.send_key(key, action)
        .or_else(|_| sink.send_key(key, action))
}

impl FromStr for SwitchCombo {
    type Err = ComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ComboParseError::EmptyInput);
        }

        let keys = trimmed
            .split('+')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return Err(ComboParseError::EmptyComponent(trimmed.to_string()));
                }
                key_from_name(part).ok_or_else(|| ComboParseError::UnknownKey(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { keys })
    }
}

impl fmt::Display for SwitchCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.keys.iter().map(|k| k.name()).collect();
        write!(f, "{}", names.join("+"))
    }
}
