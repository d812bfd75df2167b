// SkySwitcher Output Layer - Sink Abstraction
// The seam between the correction logic and the virtual input device

use crate::{Action, Key};

/// Error types for synthetic output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UInputError {
    #[error("Permission denied creating virtual device: {0}")]
    PermissionDenied(String),

    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),
}

/// Anything that accepts synthetic key actions.
///
/// Implemented by the uinput `VirtualDevice`; tests use `RecordingSink`.
pub trait KeySink {
    /// Emit one key action. Implementations flush (SYN) before returning.
    fn send_key(&mut self, key: Key, action: Action) -> Result<(), UInputError>;

    /// Press and release a key, retrying the pair once on failure.
    fn tap(&mut self, key: Key) -> Result<(), UInputError> {
        // Each half is retried on its own so a press is never sent twice
        retry_once(|| self.send_key(key, Action::Press))?;
        retry_once(|| self.send_key(key, Action::Release))
    }

    /// Tap a key with left shift held around it when `shift` is set
    fn tap_shifted(&mut self, key: Key, shift: bool) -> Result<(), UInputError> {
        if !shift {
            return self.tap(key);
        }
        retry_once(|| self.send_key(Key::LEFT_SHIFT, Action::Press))?;
        let tapped = self.tap(key);
        // Shift must come back up even when the tap failed
        let released = retry_once(|| self.send_key(Key::LEFT_SHIFT, Action::Release));
        tapped.and(released)
    }
}

impl<S: KeySink + ?Sized> KeySink for &mut S {
    fn send_key(&mut self, key: Key, action: Action) -> Result<(), UInputError> {
        (**self).send_key(key, action)
    }
}

fn retry_once<F>(mut op: F) -> Result<(), UInputError>
where
    F: FnMut() -> Result<(), UInputError>,
{
    match op() {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!("synthetic write failed ({}), retrying once", e);
            op()
        }
    }
}

/// One recorded key action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkEvent {
    pub key: Key,
    pub action: Action,
}

/// In-memory sink that records every action. Can be told to fail the
/// next N writes.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
    failures_left: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` writes fail
    pub fn fail_next(&mut self, count: usize) {
        self.failures_left = count;
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Keys of the recorded press actions, in order
    pub fn pressed_keys(&self) -> Vec<Key> {
        self.events
            .iter()
            .filter(|e| e.action == Action::Press)
            .map(|e| e.key)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl KeySink for RecordingSink {
    fn send_key(&mut self, key: Key, action: Action) -> Result<(), UInputError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(UInputError::WriteError("injected failure".to_string()));
        }
        self.events.push(SinkEvent { key, action });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_emits_press_release() {
        let mut sink = RecordingSink::new();
        sink.tap(Key::A).unwrap();
        assert_eq!(
            sink.events(),
            &[
                SinkEvent { key: Key::A, action: Action::Press },
                SinkEvent { key: Key::A, action: Action::Release },
            ]
        );
    }

    #[test]
    fn test_tap_shifted_wraps_with_left_shift() {
        let mut sink = RecordingSink::new();
        sink.tap_shifted(Key::G, true).unwrap();
        let keys: Vec<(Key, Action)> = sink.events().iter().map(|e| (e.key, e.action)).collect();
        assert_eq!(
            keys,
            vec![
                (Key::LEFT_SHIFT, Action::Press),
                (Key::G, Action::Press),
                (Key::G, Action::Release),
                (Key::LEFT_SHIFT, Action::Release),
            ]
        );
    }

    #[test]
    fn test_single_failure_is_retried() {
        let mut sink = RecordingSink::new();
        sink.fail_next(1);
        sink.tap(Key::B).unwrap();
        assert_eq!(sink.pressed_keys(), vec![Key::B]);
    }

    #[test]
    fn test_two_failures_give_up() {
        let mut sink = RecordingSink::new();
        sink.fail_next(2);
        assert!(matches!(sink.tap(Key::B), Err(UInputError::WriteError(_))));
        assert!(sink.events().is_empty());
    }

    /// Fails the first release it sees, records everything else
    struct FailFirstRelease {
        inner: RecordingSink,
        failed: bool,
    }

    impl KeySink for FailFirstRelease {
        fn send_key(&mut self, key: Key, action: Action) -> Result<(), UInputError> {
            if action == Action::Release && !self.failed {
                self.failed = true;
                return Err(UInputError::WriteError("release dropped".to_string()));
            }
            self.inner.send_key(key, action)
        }
    }

    #[test]
    fn test_failed_release_does_not_repeat_press() {
        let mut sink = FailFirstRelease {
            inner: RecordingSink::new(),
            failed: false,
        };
        sink.tap(Key::D).unwrap();
        assert_eq!(
            sink.inner.events(),
            &[
                SinkEvent { key: Key::D, action: Action::Press },
                SinkEvent { key: Key::D, action: Action::Release },
            ]
        );
    }

    #[test]
    fn test_mut_ref_is_a_sink() {
        fn emit<S: KeySink>(mut sink: S) {
            sink.tap(Key::C).unwrap();
        }

        let mut sink = RecordingSink::new();
        emit(&mut sink);
        assert_eq!(sink.pressed_keys(), vec![Key::C]);
    }
}
