// SkySwitcher Transliteration Engine
// Reinterprets typed physical keys under another keyboard layout

mod tables;

use std::collections::HashMap;
use std::sync::OnceLock;

use strum_macros::{Display, EnumIter, EnumString};

use crate::tracker::TypedKey;
use crate::Key;

/// The two layouts the engine switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum LayoutId {
    #[strum(serialize = "en", serialize = "us", serialize = "english", to_string = "en")]
    English,
    #[strum(serialize = "ua", serialize = "uk", serialize = "ukrainian", to_string = "ua")]
    Ukrainian,
}

impl LayoutId {
    /// The layout a correction switches to
    pub fn other(self) -> Self {
        match self {
            LayoutId::English => LayoutId::Ukrainian,
            LayoutId::Ukrainian => LayoutId::English,
        }
    }

    /// Built-in table for this layout
    pub fn table(self) -> &'static LayoutTable {
        static ENGLISH: OnceLock<LayoutTable> = OnceLock::new();
        static UKRAINIAN: OnceLock<LayoutTable> = OnceLock::new();
        match self {
            LayoutId::English => ENGLISH.get_or_init(|| LayoutTable::from_entries(tables::US_QWERTY)),
            LayoutId::Ukrainian => UKRAINIAN.get_or_init(|| LayoutTable::from_entries(tables::UKRAINIAN)),
        }
    }
}

/// Errors from the transliteration engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("Key {key} (shift={shift}) has no glyph in layout {layout}")]
    UnmappableKey {
        key: Key,
        shift: bool,
        layout: LayoutId,
    },
}

/// Mapping from (key, shift) to the glyph that key produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTable {
    glyphs: HashMap<Key, [Option<char>; 2]>,
}

impl LayoutTable {
    /// Build a table from `(code, unshifted, shifted)` rows
    pub fn from_entries(entries: &[(u16, char, char)]) -> Self {
        let glyphs = entries
            .iter()
            .map(|(code, plain, shifted)| (Key::from(*code), [Some(*plain), Some(*shifted)]))
            .collect();
        Self { glyphs }
    }

    /// Glyph produced by a key, or None if the layout has nothing there
    pub fn glyph(&self, key: Key, shift: bool) -> Option<char> {
        self.glyphs.get(&key).and_then(|pair| pair[usize::from(shift)])
    }

    /// Drop a key from the table
    pub fn without(mut self, key: Key) -> Self {
        self.glyphs.remove(&key);
        self
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// What a word looked like and what it becomes after correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Text as rendered under the source layout (`?` for unmapped keys)
    pub original: String,
    /// Text the same keys produce under the target layout
    pub replacement: String,
}

/// Holds one table per known layout. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Transliterator {
    english: LayoutTable,
    ukrainian: LayoutTable,
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Transliterator {
    /// Engine backed by the built-in US / Ukrainian tables
    pub fn builtin() -> Self {
        Self::with_tables(
            LayoutId::English.table().clone(),
            LayoutId::Ukrainian.table().clone(),
        )
    }

    pub fn with_tables(english: LayoutTable, ukrainian: LayoutTable) -> Self {
        Self { english, ukrainian }
    }

    pub fn table(&self, id: LayoutId) -> &LayoutTable {
        match id {
            LayoutId::English => &self.english,
            LayoutId::Ukrainian => &self.ukrainian,
        }
    }

    /// Reinterpret `buffer` under `target`.
    ///
    /// Lookups use the same key and the recorded shift state. All or
    /// nothing: one unmapped key fails the whole word.
    pub fn translate(
        &self,
        buffer: &[TypedKey],
        source: LayoutId,
        target: LayoutId,
    ) -> Result<Translation, TranslateError> {
        let source_table = self.table(source);
        let target_table = self.table(target);

        let replacement = buffer
            .iter()
            .map(|typed| {
                target_table
                    .glyph(typed.key, typed.shift)
                    .ok_or(TranslateError::UnmappableKey {
                        key: typed.key,
                        shift: typed.shift,
                        layout: target,
                    })
            })
            .collect::<Result<String, _>>()?;

        let original = buffer
            .iter()
            .map(|typed| source_table.glyph(typed.key, typed.shift).unwrap_or('?'))
            .collect();

        Ok(Translation {
            original,
            replacement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn typed(keys: &[Key]) -> Vec<TypedKey> {
        keys.iter().map(|k| TypedKey::new(*k, false)).collect()
    }

    #[test]
    fn test_english_to_ukrainian() {
        let engine = Transliterator::builtin();
        let buffer = typed(&[Key::G, Key::H, Key::B, Key::D, Key::S, Key::N]);
        let result = engine
            .translate(&buffer, LayoutId::English, LayoutId::Ukrainian)
            .unwrap();
        assert_eq!(result.original, "ghbdsn");
        assert_eq!(result.replacement, "привіт");
    }

    #[test]
    fn test_ukrainian_to_english_keeps_shift() {
        let engine = Transliterator::builtin();
        let buffer = vec![
            TypedKey::new(Key::R, true),
            TypedKey::new(Key::B, false),
            TypedKey::new(Key::Y, false),
            TypedKey::new(Key::J, false),
        ];
        let result = engine
            .translate(&buffer, LayoutId::Ukrainian, LayoutId::English)
            .unwrap();
        assert_eq!(result.original, "Кино");
        assert_eq!(result.replacement, "Rbyj");
    }

    #[test]
    fn test_punctuation_keys_translate() {
        let engine = Transliterator::builtin();
        let buffer = vec![
            TypedKey::new(Key::LEFT_BRACE, false),
            TypedKey::new(Key::RIGHT_BRACE, false),
            TypedKey::new(Key::SEMICOLON, false),
            TypedKey::new(Key::APOSTROPHE, false),
            TypedKey::new(Key::COMMA, false),
            TypedKey::new(Key::DOT, false),
            TypedKey::new(Key::KEY_3, true),
        ];
        let result = engine
            .translate(&buffer, LayoutId::English, LayoutId::Ukrainian)
            .unwrap();
        assert_eq!(result.replacement, "хїжєбю№");
    }

    #[test]
    fn test_round_trip_by_key_identity() {
        let engine = Transliterator::builtin();
        let all: Vec<TypedKey> = tables::US_QWERTY
            .iter()
            .flat_map(|(code, _, _)| [TypedKey::new(Key::from(*code), false), TypedKey::new(Key::from(*code), true)])
            .collect();

        for source in LayoutId::iter() {
            let forward = engine.translate(&all, source, source.other()).unwrap();
            let back = engine.translate(&all, source.other(), source).unwrap();
            assert_eq!(forward.original, back.replacement);
            assert_eq!(forward.replacement, back.original);
        }
    }

    #[test]
    fn test_unmappable_key_fails_whole_word() {
        let ukrainian = LayoutId::Ukrainian.table().clone().without(Key::KEY_1);
        let engine = Transliterator::with_tables(LayoutId::English.table().clone(), ukrainian);
        let buffer = typed(&[Key::A, Key::KEY_1, Key::B]);
        let err = engine
            .translate(&buffer, LayoutId::English, LayoutId::Ukrainian)
            .unwrap_err();
        assert_eq!(
            err,
            TranslateError::UnmappableKey {
                key: Key::KEY_1,
                shift: false,
                layout: LayoutId::Ukrainian
            }
        );
    }

    #[test]
    fn test_empty_buffer_translates_to_empty() {
        let engine = Transliterator::builtin();
        let result = engine.translate(&[], LayoutId::English, LayoutId::Ukrainian).unwrap();
        assert!(result.replacement.is_empty());
    }

    #[test]
    fn test_tables_cover_same_keys() {
        let en = LayoutId::English.table();
        let ua = LayoutId::Ukrainian.table();
        assert_eq!(en.len(), ua.len());
        for (code, _, _) in tables::US_QWERTY {
            assert!(ua.glyph(Key::from(*code), false).is_some(), "code {code}");
        }
    }

    #[test]
    fn test_layout_id_parsing() {
        assert_eq!("ua".parse::<LayoutId>().unwrap(), LayoutId::Ukrainian);
        assert_eq!("US".parse::<LayoutId>().unwrap(), LayoutId::English);
        assert_eq!(LayoutId::English.to_string(), "en");
        assert_eq!(LayoutId::English.other(), LayoutId::Ukrainian);
        assert_eq!(LayoutId::Ukrainian.other().other(), LayoutId::Ukrainian);
    }
}
