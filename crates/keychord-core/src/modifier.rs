// Keychord Modifier System
// Modifier masks and the modifier keysym classifier

use std::fmt;

use bitflags::bitflags;

use crate::keysym::{self, Keysym};

bitflags! {
    /// Set of active modifiers.
    ///
    /// Bit order matches the core X11 modifiers (Shift, Lock, Control,
    /// Mod1..Mod5), which is also the order compositors report to clients.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const CAPS  = 1 << 1;
        const CTRL  = 1 << 2;
        const ALT   = 1 << 3;
        const MOD2  = 1 << 4;
        const MOD3  = 1 << 5;
        const LOGO  = 1 << 6;
        const MOD5  = 1 << 7;
    }
}

/// Canonical display names, in bit order
const MODIFIER_NAMES: &[(ModifierMask, &str)] = &[
    (ModifierMask::SHIFT, "Shift"),
    (ModifierMask::CAPS, "Lock"),
    (ModifierMask::CTRL, "Ctrl"),
    (ModifierMask::ALT, "Mod1"),
    (ModifierMask::MOD2, "Mod2"),
    (ModifierMask::MOD3, "Mod3"),
    (ModifierMask::LOGO, "Mod4"),
    (ModifierMask::MOD5, "Mod5"),
];

/// Accepted spellings when parsing bindings
const MODIFIER_ALIASES: &[(&str, ModifierMask)] = &[
    ("shift", ModifierMask::SHIFT),
    ("lock", ModifierMask::CAPS),
    ("caps", ModifierMask::CAPS),
    ("ctrl", ModifierMask::CTRL),
    ("control", ModifierMask::CTRL),
    ("mod1", ModifierMask::ALT),
    ("alt", ModifierMask::ALT),
    ("mod2", ModifierMask::MOD2),
    ("mod3", ModifierMask::MOD3),
    ("mod4", ModifierMask::LOGO),
    ("super", ModifierMask::LOGO),
    ("logo", ModifierMask::LOGO),
    ("mod5", ModifierMask::MOD5),
];

impl ModifierMask {
    /// Parse a single modifier name (case-insensitive)
    pub fn from_alias(name: &str) -> Option<ModifierMask> {
        let lower = name.to_ascii_lowercase();
        MODIFIER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map(|(_, mask)| *mask)
    }
}

impl fmt::Display for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = MODIFIER_NAMES
            .iter()
            .filter(|(mask, _)| self.contains(*mask))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join("+"))
    }
}

/// Check whether a keysym is a modifier key.
///
/// Modifier keysyms never take part in chord tracking; modifier state is
/// carried separately in a [`ModifierMask`].
#[inline]
pub const fn is_modifier(sym: Keysym) -> bool {
    matches!(
        sym,
        keysym::SHIFT_L
            | keysym::SHIFT_R
            | keysym::CONTROL_L
            | keysym::CONTROL_R
            | keysym::CAPS_LOCK
            | keysym::SHIFT_LOCK
            | keysym::META_L
            | keysym::META_R
            | keysym::ALT_L
            | keysym::ALT_R
            | keysym::SUPER_L
            | keysym::SUPER_R
            | keysym::HYPER_L
            | keysym::HYPER_R
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::*;

    #[test]
    fn test_is_modifier_closed_set() {
        for sym in [
            SHIFT_L, SHIFT_R, CONTROL_L, CONTROL_R, CAPS_LOCK, SHIFT_LOCK, META_L, META_R, ALT_L,
            ALT_R, SUPER_L, SUPER_R, HYPER_L, HYPER_R,
        ] {
            assert!(is_modifier(sym), "{} should be a modifier", sym);
        }
    }

    #[test]
    fn test_is_modifier_regular_keys() {
        assert!(!is_modifier(KEY_A));
        assert!(!is_modifier(AT));
        assert!(!is_modifier(RETURN));
        assert!(!is_modifier(NUM_LOCK));
        assert!(!is_modifier(NO_SYMBOL));
    }

    #[test]
    fn test_from_alias() {
        assert_eq!(ModifierMask::from_alias("Mod1"), Some(ModifierMask::ALT));
        assert_eq!(ModifierMask::from_alias("alt"), Some(ModifierMask::ALT));
        assert_eq!(ModifierMask::from_alias("Super"), Some(ModifierMask::LOGO));
        assert_eq!(ModifierMask::from_alias("Control"), Some(ModifierMask::CTRL));
        assert_eq!(ModifierMask::from_alias("Hyper"), None);
    }

    #[test]
    fn test_display() {
        let mask = ModifierMask::ALT | ModifierMask::SHIFT;
        assert_eq!(mask.to_string(), "Shift+Mod1");
        assert_eq!(ModifierMask::empty().to_string(), "");
    }
}
