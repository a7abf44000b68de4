// Keychord Key Types
// Physical key identifiers: evdev key codes and their XKB keycode form

use std::fmt;
use std::str::FromStr;

/// Offset between kernel key codes and XKB keycodes.
pub const EVDEV_OFFSET: u32 = 8;

/// Represents a single physical key code.
///
/// The numeric values match Linux input-event-codes.h definitions. This is the
/// code the hardware reports and the code forwarded to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }

    /// The XKB keycode addressing this key in a keymap
    pub fn keycode(self) -> Keycode {
        Keycode(self.0 as u32 + EVDEV_OFFSET)
    }
}

#[allow(missing_docs)]
impl Key {
    pub const ESC: Key = Key(1);
    pub const KEY_1: Key = Key(2);
    pub const KEY_2: Key = Key(3);
    pub const KEY_3: Key = Key(4);
    pub const Q: Key = Key(16);
    pub const Y: Key = Key(21);
    pub const ENTER: Key = Key(28);
    pub const LEFT_CTRL: Key = Key(29);
    pub const A: Key = Key(30);
    pub const S: Key = Key(31);
    pub const LEFT_SHIFT: Key = Key(42);
    pub const Z: Key = Key(44);
    pub const B: Key = Key(48);
    pub const RIGHT_SHIFT: Key = Key(54);
    pub const LEFT_ALT: Key = Key(56);
    pub const SPACE: Key = Key(57);
    pub const CAPSLOCK: Key = Key(58);
    pub const RIGHT_CTRL: Key = Key(97);
    pub const RIGHT_ALT: Key = Key(100);
    pub const LEFT_META: Key = Key(125);
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

/// A keycode in XKB numbering (evdev code + 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Keycode(pub u32);

impl Keycode {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The evdev key for this keycode, if it is in evdev range
    pub fn to_key(self) -> Option<Key> {
        self.0
            .checked_sub(EVDEV_OFFSET)
            .and_then(|code| u16::try_from(code).ok())
            .map(Key)
    }
}

impl From<Key> for Keycode {
    fn from(key: Key) -> Self {
        key.keycode()
    }
}

// First entry for a code is its display name, later entries are aliases.
const KEY_NAMES: &[(&str, u16)] = &[
    ("RESERVED", 0),
    ("ESC", 1),
    ("KEY_1", 2),
    ("KEY_2", 3),
    ("KEY_3", 4),
    ("KEY_4", 5),
    ("KEY_5", 6),
    ("KEY_6", 7),
    ("KEY_7", 8),
    ("KEY_8", 9),
    ("KEY_9", 10),
    ("KEY_0", 11),
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
    ("MINUS", 12),
    ("EQUAL", 13),
    ("BACKSPACE", 14),
    ("TAB", 15),
    ("Q", 16),
    ("W", 17),
    ("E", 18),
    ("R", 19),
    ("T", 20),
    ("Y", 21),
    ("U", 22),
    ("I", 23),
    ("O", 24),
    ("P", 25),
    ("LEFT_BRACE", 26),
    ("RIGHT_BRACE", 27),
    ("ENTER", 28),
    ("LEFT_CTRL", 29),
    ("A", 30),
    ("S", 31),
    ("D", 32),
    ("F", 33),
    ("G", 34),
    ("H", 35),
    ("J", 36),
    ("K", 37),
    ("L", 38),
    ("SEMICOLON", 39),
    ("APOSTROPHE", 40),
    ("GRAVE", 41),
    ("LEFT_SHIFT", 42),
    ("BACKSLASH", 43),
    ("Z", 44),
    ("X", 45),
    ("C", 46),
    ("V", 47),
    ("B", 48),
    ("N", 49),
    ("M", 50),
    ("COMMA", 51),
    ("DOT", 52),
    ("SLASH", 53),
    ("RIGHT_SHIFT", 54),
    ("LEFT_ALT", 56),
    ("SPACE", 57),
    ("CAPSLOCK", 58),
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("NUMLOCK", 69),
    ("SCROLLLOCK", 70),
    ("KEY_102ND", 86),
    ("F11", 87),
    ("F12", 88),
    ("RIGHT_CTRL", 97),
    ("SYSRQ", 99),
    ("PRINT", 99),
    ("RIGHT_ALT", 100),
    ("HOME", 102),
    ("UP", 103),
    ("PAGE_UP", 104),
    ("LEFT", 105),
    ("RIGHT", 106),
    ("END", 107),
    ("DOWN", 108),
    ("PAGE_DOWN", 109),
    ("INSERT", 110),
    ("DELETE", 111),
    ("PAUSE", 119),
    ("LEFT_META", 125),
    ("RIGHT_META", 126),
    ("MENU", 139),
];

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Look up a key by name (case-insensitive)
pub fn key_from_name(name: &str) -> Option<Key> {
    let upper = name.to_uppercase();
    KEY_NAMES
        .iter()
        .find(|(n, _)| *n == upper)
        .map(|(_, code)| Key::from(*code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("a"), Some(Key::from(30)));
        assert_eq!(key_from_name("A"), Some(Key::from(30)));
        assert_eq!(key_from_name("ENTER"), Some(Key::from(28)));
        assert_eq!(key_from_name("2"), Some(Key::from(3)));
        assert_eq!(key_from_name("left_alt"), Some(Key::from(56)));
        assert_eq!(key_from_name("NOPE"), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from(30).to_string(), "A");
        assert_eq!(Key::from(3).to_string(), "KEY_2");
        assert_eq!(Key::from(99).to_string(), "SYSRQ");
        assert_eq!(Key::from(500).to_string(), "UNKNOWN");
    }

    #[test]
    fn test_keycode_offset() {
        let key = Key::from(30);
        assert_eq!(key.keycode(), Keycode(38));
        assert_eq!(Keycode(38).to_key(), Some(key));
        assert_eq!(Keycode(3).to_key(), None);
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("SPACE".parse::<Key>(), Ok(Key::from(57)));
        assert!("bogus".parse::<Key>().is_err());
    }
}
