// Keychord Builtin Layouts
// Static key tables for the pure-Rust keymap

use crate::hardware::LevelIndex;
use crate::keysym::{self, Keysym};
use crate::modifier::ModifierMask;

/// XKB key types supported by the builtin keymap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Single level, no modifier affects the symbol
    OneLevel,
    /// Shift selects level 1
    TwoLevel,
    /// Shift xor Lock selects level 1
    Alphabetic,
}

impl KeyType {
    /// Modifiers that take part in level selection for this type
    pub fn mods(self) -> ModifierMask {
        match self {
            KeyType::OneLevel => ModifierMask::empty(),
            KeyType::TwoLevel => ModifierMask::SHIFT,
            KeyType::Alphabetic => ModifierMask::SHIFT | ModifierMask::CAPS,
        }
    }

    /// Level chosen by the given modifier state
    pub fn level(self, mods: ModifierMask) -> LevelIndex {
        let shift = mods.contains(ModifierMask::SHIFT);
        let caps = mods.contains(ModifierMask::CAPS);
        match self {
            KeyType::OneLevel => 0,
            KeyType::TwoLevel => shift as LevelIndex,
            KeyType::Alphabetic => (shift ^ caps) as LevelIndex,
        }
    }
}

/// One key of a layout, addressed by kernel key code
#[derive(Debug)]
pub struct KeyDef {
    pub key: u16,
    pub kind: KeyType,
    pub levels: &'static [Keysym],
}

#[derive(Debug)]
pub struct Layout {
    pub name: &'static str,
    pub keys: &'static [KeyDef],
}

impl Layout {
    /// Key definition for `key`, falling back to the keys every layout shares
    pub fn key(&self, key: u16) -> Option<&'static KeyDef> {
        self.keys
            .iter()
            .chain(COMMON.iter())
            .find(|def| def.key == key)
    }
}

const fn sym(c: char) -> Keysym {
    Keysym(c as u32)
}

macro_rules! one {
    ($key:expr, $sym:expr) => {
        KeyDef {
            key: $key,
            kind: KeyType::OneLevel,
            levels: &[$sym],
        }
    };
}

macro_rules! two {
    ($key:expr, $base:expr, $shifted:expr) => {
        KeyDef {
            key: $key,
            kind: KeyType::TwoLevel,
            levels: &[$base, $shifted],
        }
    };
}

macro_rules! alpha {
    ($key:expr, $lower:expr) => {
        KeyDef {
            key: $key,
            kind: KeyType::Alphabetic,
            levels: &[sym($lower), Keysym(sym($lower).0 - 0x20)],
        }
    };
}

/// Keys whose symbols do not depend on the layout
static COMMON: &[KeyDef] = &[
    one!(1, keysym::ESCAPE),
    one!(14, keysym::BACKSPACE),
    one!(15, keysym::TAB),
    one!(28, keysym::RETURN),
    one!(29, keysym::CONTROL_L),
    one!(42, keysym::SHIFT_L),
    one!(54, keysym::SHIFT_R),
    one!(56, keysym::ALT_L),
    one!(57, keysym::SPACE),
    one!(58, keysym::CAPS_LOCK),
    one!(59, keysym::F1),
    one!(60, keysym::F2),
    one!(61, keysym::F3),
    one!(62, keysym::F4),
    one!(63, keysym::F5),
    one!(64, keysym::F6),
    one!(65, keysym::F7),
    one!(66, keysym::F8),
    one!(67, keysym::F9),
    one!(68, keysym::F10),
    one!(69, keysym::NUM_LOCK),
    one!(70, keysym::SCROLL_LOCK),
    one!(87, keysym::F11),
    one!(88, keysym::F12),
    one!(97, keysym::CONTROL_R),
    one!(99, keysym::PRINT),
    one!(100, keysym::ALT_R),
    one!(102, keysym::HOME),
    one!(103, keysym::UP),
    one!(104, keysym::PAGE_UP),
    one!(105, keysym::LEFT),
    one!(106, keysym::RIGHT),
    one!(107, keysym::END),
    one!(108, keysym::DOWN),
    one!(109, keysym::PAGE_DOWN),
    one!(110, keysym::INSERT),
    one!(111, keysym::DELETE),
    one!(119, keysym::PAUSE),
    one!(125, keysym::SUPER_L),
    one!(126, keysym::SUPER_R),
    one!(139, keysym::MENU),
];

pub static US: Layout = Layout {
    name: "us",
    keys: &[
        two!(2, sym('1'), keysym::EXCLAM),
        two!(3, sym('2'), keysym::AT),
        two!(4, sym('3'), keysym::NUMBERSIGN),
        two!(5, sym('4'), keysym::DOLLAR),
        two!(6, sym('5'), keysym::PERCENT),
        two!(7, sym('6'), keysym::ASCIICIRCUM),
        two!(8, sym('7'), keysym::AMPERSAND),
        two!(9, sym('8'), keysym::ASTERISK),
        two!(10, sym('9'), keysym::PARENLEFT),
        two!(11, sym('0'), keysym::PARENRIGHT),
        two!(12, keysym::MINUS, keysym::UNDERSCORE),
        two!(13, keysym::EQUAL, keysym::PLUS),
        alpha!(16, 'q'),
        alpha!(17, 'w'),
        alpha!(18, 'e'),
        alpha!(19, 'r'),
        alpha!(20, 't'),
        alpha!(21, 'y'),
        alpha!(22, 'u'),
        alpha!(23, 'i'),
        alpha!(24, 'o'),
        alpha!(25, 'p'),
        two!(26, keysym::BRACKETLEFT, keysym::BRACELEFT),
        two!(27, keysym::BRACKETRIGHT, keysym::BRACERIGHT),
        alpha!(30, 'a'),
        alpha!(31, 's'),
        alpha!(32, 'd'),
        alpha!(33, 'f'),
        alpha!(34, 'g'),
        alpha!(35, 'h'),
        alpha!(36, 'j'),
        alpha!(37, 'k'),
        alpha!(38, 'l'),
        two!(39, keysym::SEMICOLON, keysym::COLON),
        two!(40, keysym::APOSTROPHE, keysym::QUOTEDBL),
        two!(41, keysym::GRAVE, keysym::ASCIITILDE),
        two!(43, keysym::BACKSLASH, keysym::BAR),
        alpha!(44, 'z'),
        alpha!(45, 'x'),
        alpha!(46, 'c'),
        alpha!(47, 'v'),
        alpha!(48, 'b'),
        alpha!(49, 'n'),
        alpha!(50, 'm'),
        two!(51, keysym::COMMA, keysym::LESS),
        two!(52, keysym::PERIOD, keysym::GREATER),
        two!(53, keysym::SLASH, keysym::QUESTION),
    ],
};

pub static DE: Layout = Layout {
    name: "de",
    keys: &[
        two!(2, sym('1'), keysym::EXCLAM),
        two!(3, sym('2'), keysym::QUOTEDBL),
        two!(4, sym('3'), keysym::SECTION),
        two!(5, sym('4'), keysym::DOLLAR),
        two!(6, sym('5'), keysym::PERCENT),
        two!(7, sym('6'), keysym::AMPERSAND),
        two!(8, sym('7'), keysym::SLASH),
        two!(9, sym('8'), keysym::PARENLEFT),
        two!(10, sym('9'), keysym::PARENRIGHT),
        two!(11, sym('0'), keysym::EQUAL),
        two!(12, keysym::SSHARP, keysym::QUESTION),
        two!(13, keysym::DEAD_ACUTE, keysym::DEAD_GRAVE),
        alpha!(16, 'q'),
        alpha!(17, 'w'),
        alpha!(18, 'e'),
        alpha!(19, 'r'),
        alpha!(20, 't'),
        alpha!(21, 'z'),
        alpha!(22, 'u'),
        alpha!(23, 'i'),
        alpha!(24, 'o'),
        alpha!(25, 'p'),
        KeyDef {
            key: 26,
            kind: KeyType::Alphabetic,
            levels: &[keysym::UDIAERESIS, keysym::UDIAERESIS_UPPER],
        },
        two!(27, keysym::PLUS, keysym::ASTERISK),
        alpha!(30, 'a'),
        alpha!(31, 's'),
        alpha!(32, 'd'),
        alpha!(33, 'f'),
        alpha!(34, 'g'),
        alpha!(35, 'h'),
        alpha!(36, 'j'),
        alpha!(37, 'k'),
        alpha!(38, 'l'),
        KeyDef {
            key: 39,
            kind: KeyType::Alphabetic,
            levels: &[keysym::ODIAERESIS, keysym::ODIAERESIS_UPPER],
        },
        KeyDef {
            key: 40,
            kind: KeyType::Alphabetic,
            levels: &[keysym::ADIAERESIS, keysym::ADIAERESIS_UPPER],
        },
        two!(41, keysym::DEAD_CIRCUMFLEX, keysym::DEGREE),
        two!(43, keysym::NUMBERSIGN, keysym::APOSTROPHE),
        alpha!(44, 'y'),
        alpha!(45, 'x'),
        alpha!(46, 'c'),
        alpha!(47, 'v'),
        alpha!(48, 'b'),
        alpha!(49, 'n'),
        alpha!(50, 'm'),
        two!(51, keysym::COMMA, keysym::SEMICOLON),
        two!(52, keysym::PERIOD, keysym::COLON),
        two!(53, keysym::MINUS, keysym::UNDERSCORE),
        two!(86, keysym::LESS, keysym::GREATER),
    ],
};

/// All builtin layouts, looked up by name
pub static LAYOUTS: &[&Layout] = &[&US, &DE];

pub fn find(name: &str) -> Option<&'static Layout> {
    LAYOUTS.iter().copied().find(|layout| layout.name == name)
}

/// Replacement symbols for the Caps Lock key selected by options
pub static CAPS_AS_ESCAPE: [Keysym; 1] = [keysym::ESCAPE];
pub static CAPS_AS_CONTROL: [Keysym; 1] = [keysym::CONTROL_L];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_levels() {
        let shift = ModifierMask::SHIFT;
        let caps = ModifierMask::CAPS;
        assert_eq!(KeyType::OneLevel.level(shift), 0);
        assert_eq!(KeyType::TwoLevel.level(shift), 1);
        assert_eq!(KeyType::TwoLevel.level(caps), 0);
        assert_eq!(KeyType::Alphabetic.level(caps), 1);
        assert_eq!(KeyType::Alphabetic.level(shift | caps), 0);
    }

    #[test]
    fn test_layout_lookup_falls_back_to_common() {
        let def = US.key(3).unwrap();
        assert_eq!(def.levels, &[sym('2'), keysym::AT]);
        let esc = US.key(1).unwrap();
        assert_eq!(esc.kind, KeyType::OneLevel);
        assert!(US.key(600).is_none());
    }

    #[test]
    fn test_de_swaps_y_and_z() {
        assert_eq!(DE.key(21).unwrap().levels[0], keysym::KEY_Z);
        assert_eq!(DE.key(44).unwrap().levels[0], keysym::KEY_Y);
        assert_eq!(US.key(21).unwrap().levels[0], keysym::KEY_Y);
    }

    #[test]
    fn test_find_layout() {
        assert_eq!(find("de").map(|l| l.name), Some("de"));
        assert!(find("fr").is_none());
    }
}
