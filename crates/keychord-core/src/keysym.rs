// Keychord Keysym Type
// Layout-independent symbolic key meanings (X11 keysym numbering)

use std::fmt;
use std::str::FromStr;

/// A keysym, the symbol a keymap produces for a key.
///
/// Values follow the X11/XKB keysym encoding so they can be exchanged with
/// libxkbcommon unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Keysym(pub u32);

/// The "no symbol" sentinel, also used for empty pressed-set slots.
pub const NO_SYMBOL: Keysym = Keysym(0);

macro_rules! keysyms {
    ($($name:ident = $value:expr, $text:expr;)*) => {
        $(pub const $name: Keysym = Keysym($value);)*

        const NAMED: &[(&str, Keysym)] = &[$(($text, $name),)*];
    };
}

keysyms! {
    SPACE = 0x0020, "space";
    EXCLAM = 0x0021, "exclam";
    QUOTEDBL = 0x0022, "quotedbl";
    NUMBERSIGN = 0x0023, "numbersign";
    DOLLAR = 0x0024, "dollar";
    PERCENT = 0x0025, "percent";
    AMPERSAND = 0x0026, "ampersand";
    APOSTROPHE = 0x0027, "apostrophe";
    PARENLEFT = 0x0028, "parenleft";
    PARENRIGHT = 0x0029, "parenright";
    ASTERISK = 0x002a, "asterisk";
    PLUS = 0x002b, "plus";
    COMMA = 0x002c, "comma";
    MINUS = 0x002d, "minus";
    PERIOD = 0x002e, "period";
    SLASH = 0x002f, "slash";
    COLON = 0x003a, "colon";
    SEMICOLON = 0x003b, "semicolon";
    LESS = 0x003c, "less";
    EQUAL = 0x003d, "equal";
    GREATER = 0x003e, "greater";
    QUESTION = 0x003f, "question";
    AT = 0x0040, "at";
    BRACKETLEFT = 0x005b, "bracketleft";
    BACKSLASH = 0x005c, "backslash";
    BRACKETRIGHT = 0x005d, "bracketright";
    ASCIICIRCUM = 0x005e, "asciicircum";
    UNDERSCORE = 0x005f, "underscore";
    GRAVE = 0x0060, "grave";
    BRACELEFT = 0x007b, "braceleft";
    BAR = 0x007c, "bar";
    BRACERIGHT = 0x007d, "braceright";
    ASCIITILDE = 0x007e, "asciitilde";
    SECTION = 0x00a7, "section";
    DEGREE = 0x00b0, "degree";
    ACUTE = 0x00b4, "acute";
    ADIAERESIS_UPPER = 0x00c4, "Adiaeresis";
    ODIAERESIS_UPPER = 0x00d6, "Odiaeresis";
    UDIAERESIS_UPPER = 0x00dc, "Udiaeresis";
    SSHARP = 0x00df, "ssharp";
    ADIAERESIS = 0x00e4, "adiaeresis";
    ODIAERESIS = 0x00f6, "odiaeresis";
    UDIAERESIS = 0x00fc, "udiaeresis";
    DEAD_CIRCUMFLEX = 0xfe52, "dead_circumflex";
    DEAD_ACUTE = 0xfe51, "dead_acute";
    DEAD_GRAVE = 0xfe50, "dead_grave";
    BACKSPACE = 0xff08, "BackSpace";
    TAB = 0xff09, "Tab";
    RETURN = 0xff0d, "Return";
    PAUSE = 0xff13, "Pause";
    SCROLL_LOCK = 0xff14, "Scroll_Lock";
    SYS_REQ = 0xff15, "Sys_Req";
    ESCAPE = 0xff1b, "Escape";
    HOME = 0xff50, "Home";
    LEFT = 0xff51, "Left";
    UP = 0xff52, "Up";
    RIGHT = 0xff53, "Right";
    DOWN = 0xff54, "Down";
    PAGE_UP = 0xff55, "Prior";
    PAGE_DOWN = 0xff56, "Next";
    END = 0xff57, "End";
    PRINT = 0xff61, "Print";
    INSERT = 0xff63, "Insert";
    MENU = 0xff67, "Menu";
    NUM_LOCK = 0xff7f, "Num_Lock";
    F1 = 0xffbe, "F1";
    F2 = 0xffbf, "F2";
    F3 = 0xffc0, "F3";
    F4 = 0xffc1, "F4";
    F5 = 0xffc2, "F5";
    F6 = 0xffc3, "F6";
    F7 = 0xffc4, "F7";
    F8 = 0xffc5, "F8";
    F9 = 0xffc6, "F9";
    F10 = 0xffc7, "F10";
    F11 = 0xffc8, "F11";
    F12 = 0xffc9, "F12";
    SHIFT_L = 0xffe1, "Shift_L";
    SHIFT_R = 0xffe2, "Shift_R";
    CONTROL_L = 0xffe3, "Control_L";
    CONTROL_R = 0xffe4, "Control_R";
    CAPS_LOCK = 0xffe5, "Caps_Lock";
    SHIFT_LOCK = 0xffe6, "Shift_Lock";
    META_L = 0xffe7, "Meta_L";
    META_R = 0xffe8, "Meta_R";
    ALT_L = 0xffe9, "Alt_L";
    ALT_R = 0xffea, "Alt_R";
    SUPER_L = 0xffeb, "Super_L";
    SUPER_R = 0xffec, "Super_R";
    HYPER_L = 0xffed, "Hyper_L";
    HYPER_R = 0xffee, "Hyper_R";
    DELETE = 0xffff, "Delete";
}

// Lowercase letters and digits are the keysyms equal to their ASCII code.
pub const KEY_0: Keysym = Keysym(0x0030);
pub const KEY_2: Keysym = Keysym(0x0032);
pub const KEY_A: Keysym = Keysym(0x0061);
pub const KEY_Y: Keysym = Keysym(0x0079);
pub const KEY_Z: Keysym = Keysym(0x007a);

impl Keysym {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == NO_SYMBOL
    }

    /// The keysym for a character.
    ///
    /// Latin-1 characters map directly; everything else uses the Unicode
    /// keysym range (0x01000000 + code point).
    pub fn from_char(c: char) -> Keysym {
        let cp = c as u32;
        match cp {
            0x20..=0x7e | 0xa0..=0xff => Keysym(cp),
            _ => Keysym(0x0100_0000 | cp),
        }
    }

    /// The character this keysym stands for, if it is a printable one
    pub fn to_char(self) -> Option<char> {
        match self.0 {
            0x20..=0x7e | 0xa0..=0xff => char::from_u32(self.0),
            0x0100_0100..=0x0110_ffff => char::from_u32(self.0 - 0x0100_0000),
            _ => None,
        }
    }

    /// Look up a keysym by its XKB name.
    ///
    /// Exact names win; otherwise a case-insensitive match is tried, and
    /// single characters resolve to their character keysym.
    pub fn from_name(name: &str) -> Option<Keysym> {
        if let Some((_, sym)) = NAMED.iter().find(|(n, _)| *n == name) {
            return Some(*sym);
        }
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_graphic() {
                return Some(Keysym::from_char(c));
            }
        }
        NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, sym)| *sym)
    }

    /// The XKB name of this keysym (or a `U+XXXX`/hex form for unnamed ones)
    pub fn name(self) -> String {
        if self.is_none() {
            return "NoSymbol".to_string();
        }
        if let Some((n, _)) = NAMED.iter().find(|(_, sym)| *sym == self) {
            return (*n).to_string();
        }
        match self.to_char() {
            Some(c) if c.is_ascii_alphanumeric() => c.to_string(),
            Some(c) if !c.is_ascii() => format!("U{:04X}", c as u32),
            _ => format!("0x{:08x}", self.0),
        }
    }

    /// Upper-case form of a Latin-1 letter keysym
    pub fn to_upper(self) -> Keysym {
        match self.0 {
            0x61..=0x7a | 0xe0..=0xf6 | 0xf8..=0xfe => Keysym(self.0 - 0x20),
            _ => self,
        }
    }
}

impl From<u32> for Keysym {
    fn from(raw: u32) -> Self {
        Keysym(raw)
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Keysym {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Keysym::from_name(s).ok_or_else(|| format!("Unknown keysym: {}", s))
    }
}
