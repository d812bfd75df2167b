// SkySwitcher Typed-Text Tracker
// Records the word in progress as physical keys, not glyphs

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::input::{classify, KeyClass, KeyEvent};
use crate::layout::LayoutTable;
use crate::Key;

/// Default buffer cap; a longer token is not a realistic correction target
pub const DEFAULT_BUFFER_CAP: usize = 64;

/// Default pause after which the next keystroke starts a new word
pub const DEFAULT_IDLE_RESET_MS: u64 = 3000;

/// One recorded keystroke: the key and whether shift was held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypedKey {
    pub key: Key,
    pub shift: bool,
}

impl TypedKey {
    pub fn new(key: Key, shift: bool) -> Self {
        Self { key, shift }
    }
}

/// The keys typed since the last word boundary
pub type WordBuffer = SmallVec<[TypedKey; DEFAULT_BUFFER_CAP]>;

/// Maintains the current word.
///
/// Boundaries (separators, navigation, shortcuts, unknown keys, reaching
/// the cap, a long typing pause) clear the whole buffer at once.
#[derive(Debug, Clone)]
pub struct WordTracker {
    buffer: WordBuffer,
    cap: usize,
    idle_reset: Option<Duration>,
    last_key_time: Option<Instant>,
}

impl Default for WordTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAP, Some(Duration::from_millis(DEFAULT_IDLE_RESET_MS)))
    }
}

impl WordTracker {
    /// `cap` is clamped to at least 1; `idle_reset` of `None` disables the
    /// pause-based reset.
    pub fn new(cap: usize, idle_reset: Option<Duration>) -> Self {
        Self {
            buffer: WordBuffer::new(),
            cap: cap.max(1),
            idle_reset,
            last_key_time: None,
        }
    }

    /// Update the buffer from one key event.
    pub fn on_key_event(&mut self, event: &KeyEvent) {
        if !event.action.is_down() {
            return;
        }

        let class = classify(event.key);
        if class == KeyClass::Modifier {
            return;
        }

        if let (Some(limit), Some(last)) = (self.idle_reset, self.last_key_time) {
            if event.time.saturating_duration_since(last) > limit && !self.buffer.is_empty() {
                log::trace!("typing pause over {:?}, word buffer reset", limit);
                self.buffer.clear();
            }
        }
        self.last_key_time = Some(event.time);

        match class {
            KeyClass::Character if event.modifiers.shortcut_active() => self.buffer.clear(),
            KeyClass::Character => {
                self.buffer.push(TypedKey::new(event.key, event.shift_active()));
                if self.buffer.len() >= self.cap {
                    log::trace!("word buffer reached cap {}, reset", self.cap);
                    self.buffer.clear();
                }
            }
            KeyClass::Backspace => {
                self.buffer.pop();
            }
            KeyClass::Boundary => self.buffer.clear(),
            KeyClass::Modifier => {}
        }
    }

    /// The keys of the word in progress, in typing order
    pub fn current_buffer(&self) -> &[TypedKey] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Readable text of the buffer under a layout, for logging.
    /// Unmapped keys show as `?`.
    pub fn render(&self, table: &LayoutTable) -> String {
        self.buffer
            .iter()
            .map(|typed| table.glyph(typed.key, typed.shift).unwrap_or('?'))
            .collect()
    }
}
