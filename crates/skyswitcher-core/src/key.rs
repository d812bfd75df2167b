// SkySwitcher Key Type
// A single key code from Linux input-event-codes.h

use std::fmt;
use std::str::FromStr;

/// Represents a single keyboard key code.
///
/// Newtype around u16; the numeric values match the Linux
/// input-event-codes.h definitions, so an evdev code converts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    pub const ESC: Key = Key(1);
    pub const KEY_1: Key = Key(2);
    pub const KEY_2: Key = Key(3);
    pub const KEY_3: Key = Key(4);
    pub const KEY_4: Key = Key(5);
    pub const KEY_5: Key = Key(6);
    pub const KEY_6: Key = Key(7);
    pub const KEY_7: Key = Key(8);
    pub const KEY_8: Key = Key(9);
    pub const KEY_9: Key = Key(10);
    pub const KEY_0: Key = Key(11);
    pub const MINUS: Key = Key(12);
    pub const EQUAL: Key = Key(13);
    pub const BACKSPACE: Key = Key(14);
    pub const TAB: Key = Key(15);
    pub const Q: Key = Key(16);
    pub const W: Key = Key(17);
    pub const E: Key = Key(18);
    pub const R: Key = Key(19);
    pub const T: Key = Key(20);
    pub const Y: Key = Key(21);
    pub const U: Key = Key(22);
    pub const I: Key = Key(23);
    pub const O: Key = Key(24);
    pub const P: Key = Key(25);
    pub const LEFT_BRACE: Key = Key(26);
    pub const RIGHT_BRACE: Key = Key(27);
    pub const ENTER: Key = Key(28);
    pub const LEFT_CTRL: Key = Key(29);
    pub const A: Key = Key(30);
    pub const S: Key = Key(31);
    pub const D: Key = Key(32);
    pub const F: Key = Key(33);
    pub const G: Key = Key(34);
    pub const H: Key = Key(35);
    pub const J: Key = Key(36);
    pub const K: Key = Key(37);
    pub const L: Key = Key(38);
    pub const SEMICOLON: Key = Key(39);
    pub const APOSTROPHE: Key = Key(40);
    pub const GRAVE: Key = Key(41);
    pub const LEFT_SHIFT: Key = Key(42);
    pub const BACKSLASH: Key = Key(43);
    pub const Z: Key = Key(44);
    pub const X: Key = Key(45);
    pub const C: Key = Key(46);
    pub const V: Key = Key(47);
    pub const B: Key = Key(48);
    pub const N: Key = Key(49);
    pub const M: Key = Key(50);
    pub const COMMA: Key = Key(51);
    pub const DOT: Key = Key(52);
    pub const SLASH: Key = Key(53);
    pub const RIGHT_SHIFT: Key = Key(54);
    pub const LEFT_ALT: Key = Key(56);
    pub const SPACE: Key = Key(57);
    pub const CAPSLOCK: Key = Key(58);
    pub const KEY_102ND: Key = Key(86);
    pub const RIGHT_CTRL: Key = Key(97);
    pub const RIGHT_ALT: Key = Key(100);
    pub const HOME: Key = Key(102);
    pub const UP: Key = Key(103);
    pub const PAGE_UP: Key = Key(104);
    pub const LEFT: Key = Key(105);
    pub const RIGHT: Key = Key(106);
    pub const END: Key = Key(107);
    pub const DOWN: Key = Key(108);
    pub const PAGE_DOWN: Key = Key(109);
    pub const DELETE: Key = Key(111);
    pub const LEFT_META: Key = Key(125);
    pub const RIGHT_META: Key = Key(126);

    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Canonical `(code, name)` pairs, searched linearly. Codes missing from
/// the list are reported as `UNKNOWN`.
const KEY_NAMES: &[(u16, &str)] = &[
    (0, "RESERVED"),
    (1, "ESC"),
    (2, "KEY_1"),
    (3, "KEY_2"),
    (4, "KEY_3"),
    (5, "KEY_4"),
    (6, "KEY_5"),
    (7, "KEY_6"),
    (8, "KEY_7"),
    (9, "KEY_8"),
    (10, "KEY_9"),
    (11, "KEY_0"),
    (12, "MINUS"),
    (13, "EQUAL"),
    (14, "BACKSPACE"),
    (15, "TAB"),
    (16, "Q"),
    (17, "W"),
    (18, "E"),
    (19, "R"),
    (20, "T"),
    (21, "Y"),
    (22, "U"),
    (23, "I"),
    (24, "O"),
    (25, "P"),
    (26, "LEFT_BRACE"),
    (27, "RIGHT_BRACE"),
    (28, "ENTER"),
    (29, "LEFT_CTRL"),
    (30, "A"),
    (31, "S"),
    (32, "D"),
    (33, "F"),
    (34, "G"),
    (35, "H"),
    (36, "J"),
    (37, "K"),
    (38, "L"),
    (39, "SEMICOLON"),
    (40, "APOSTROPHE"),
    (41, "GRAVE"),
    (42, "LEFT_SHIFT"),
    (43, "BACKSLASH"),
    (44, "Z"),
    (45, "X"),
    (46, "C"),
    (47, "V"),
    (48, "B"),
    (49, "N"),
    (50, "M"),
    (51, "COMMA"),
    (52, "DOT"),
    (53, "SLASH"),
    (54, "RIGHT_SHIFT"),
    (55, "KPASTERISK"),
    (56, "LEFT_ALT"),
    (57, "SPACE"),
    (58, "CAPSLOCK"),
    (59, "F1"),
    (60, "F2"),
    (61, "F3"),
    (62, "F4"),
    (63, "F5"),
    (64, "F6"),
    (65, "F7"),
    (66, "F8"),
    (67, "F9"),
    (68, "F10"),
    (69, "NUMLOCK"),
    (70, "SCROLLLOCK"),
    (86, "KEY_102ND"),
    (87, "F11"),
    (88, "F12"),
    (96, "KPENTER"),
    (97, "RIGHT_CTRL"),
    (100, "RIGHT_ALT"),
    (102, "HOME"),
    (103, "UP"),
    (104, "PAGE_UP"),
    (105, "LEFT"),
    (106, "RIGHT"),
    (107, "END"),
    (108, "DOWN"),
    (109, "PAGE_DOWN"),
    (110, "INSERT"),
    (111, "DELETE"),
    (125, "LEFT_META"),
    (126, "RIGHT_META"),
    (127, "COMPOSE"),
];

/// Extra spellings accepted by `key_from_name`
const KEY_ALIASES: &[(&str, u16)] = &[
    ("ESCAPE", 1),
    ("1", 2),
    ("2", 3),
    ("3", 4),
    ("4", 5),
    ("5", 6),
    ("6", 7),
    ("7", 8),
    ("8", 9),
    ("9", 10),
    ("0", 11),
    ("RETURN", 28),
    ("CTRL", 29),
    ("LCTRL", 29),
    ("CONTROL", 29),
    ("SHIFT", 42),
    ("LSHIFT", 42),
    ("RSHIFT", 54),
    ("ALT", 56),
    ("LALT", 56),
    ("RCTRL", 97),
    ("RALT", 100),
    ("ALTGR", 100),
    ("CAPS", 58),
    ("META", 125),
    ("SUPER", 125),
    ("WIN", 125),
    ("LMETA", 125),
    ("RMETA", 126),
];

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("UNKNOWN")
}

/// Try to parse a key name to a key code
pub fn key_from_name(name: &str) -> Option<Key> {
    let name_upper = name.trim().to_uppercase();
    KEY_NAMES
        .iter()
        .find(|(_, n)| *n == name_upper)
        .map(|(code, _)| Key(*code))
        .or_else(|| {
            KEY_ALIASES
                .iter()
                .find(|(n, _)| *n == name_upper)
                .map(|(_, code)| Key(*code))
        })
}
