// Keychord Keysym Resolver
// Translated and raw interpretations of a physical key

use std::fmt;

use crate::hardware::{HardwareKeyboard, Keysyms};
use crate::key::Keycode;
use crate::modifier::ModifierMask;

/// Which interpretation of a key to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveMode {
    /// Layout-aware: keysyms under the full state, consumed modifiers removed.
    ///
    /// On a US layout Alt+Shift+2 resolves to `at` with only Alt held.
    Translated,
    /// Layout-independent: level 0 keysyms, every active modifier kept.
    ///
    /// On a US layout Alt+Shift+2 resolves to `2` with Alt and Shift held.
    Raw,
}

impl ResolveMode {
    /// Both modes, in processing order
    pub const ALL: [ResolveMode; 2] = [ResolveMode::Translated, ResolveMode::Raw];
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveMode::Translated => write!(f, "translated"),
            ResolveMode::Raw => write!(f, "raw"),
        }
    }
}

/// Keysyms and effective modifiers for one key under one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub keysyms: Keysyms,
    pub modifiers: ModifierMask,
}

/// Resolve `keycode` on `keyboard` under `mode`.
///
/// Unknown keycodes produce an empty keysym list, never an error.
pub fn resolve<H>(keyboard: &H, keycode: Keycode, mode: ResolveMode) -> Resolved
where
    H: HardwareKeyboard + ?Sized,
{
    let active = keyboard.modifiers();
    let resolved = match mode {
        ResolveMode::Translated => Resolved {
            keysyms: keyboard.keysyms(keycode),
            modifiers: active - keyboard.consumed_modifiers(keycode),
        },
        ResolveMode::Raw => {
            let layout = keyboard.layout_index(keycode);
            Resolved {
                keysyms: keyboard.keysyms_at_level(keycode, layout, 0),
                modifiers: active,
            }
        }
    };
    log::trace!(
        "resolved keycode {} ({}): {:?} mods [{}]",
        keycode.raw(),
        mode,
        resolved.keysyms,
        resolved.modifiers
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{BuiltinCompiler, BuiltinKeyboard};
    use crate::hardware::KeyState;
    use crate::key::Key;
    use crate::keymap::{KeymapCompiler, RuleNames};
    use crate::keysym;

    fn us_keyboard() -> BuiltinKeyboard {
        let keymap = BuiltinCompiler.compile(&RuleNames::default()).unwrap();
        let mut keyboard = BuiltinKeyboard::new();
        keyboard.set_keymap(&keymap);
        keyboard
    }

    fn hold(keyboard: &mut BuiltinKeyboard, key: Key) {
        keyboard.update_key(key.keycode(), KeyState::Pressed);
    }

    #[test]
    fn test_alt_shift_2_translated() {
        let mut kb = us_keyboard();
        hold(&mut kb, Key::LEFT_ALT);
        hold(&mut kb, Key::LEFT_SHIFT);
        let r = resolve(&kb, Key::KEY_2.keycode(), ResolveMode::Translated);
        assert_eq!(r.keysyms.as_slice(), &[keysym::AT]);
        assert_eq!(r.modifiers, ModifierMask::ALT);
    }

    #[test]
    fn test_alt_shift_2_raw() {
        let mut kb = us_keyboard();
        hold(&mut kb, Key::LEFT_ALT);
        hold(&mut kb, Key::LEFT_SHIFT);
        let r = resolve(&kb, Key::KEY_2.keycode(), ResolveMode::Raw);
        assert_eq!(r.keysyms.as_slice(), &[keysym::KEY_2]);
        assert_eq!(r.modifiers, ModifierMask::ALT | ModifierMask::SHIFT);
    }

    #[test]
    fn test_no_modifiers_same_in_both_modes() {
        let kb = us_keyboard();
        let translated = resolve(&kb, Key::A.keycode(), ResolveMode::Translated);
        let raw = resolve(&kb, Key::A.keycode(), ResolveMode::Raw);
        assert_eq!(translated, raw);
        assert_eq!(raw.keysyms.as_slice(), &[keysym::KEY_A]);
    }

    #[test]
    fn test_unknown_keycode_is_empty() {
        let kb = us_keyboard();
        for mode in ResolveMode::ALL {
            let r = resolve(&kb, Keycode(4000), mode);
            assert!(r.keysyms.is_empty());
        }
    }

    #[test]
    fn test_caps_lock_consumed_on_letters_only() {
        let mut kb = us_keyboard();
        hold(&mut kb, Key::CAPSLOCK);
        let letter = resolve(&kb, Key::A.keycode(), ResolveMode::Translated);
        assert_eq!(letter.modifiers, ModifierMask::empty());
        let digit = resolve(&kb, Key::KEY_2.keycode(), ResolveMode::Translated);
        assert_eq!(digit.modifiers, ModifierMask::CAPS);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ResolveMode::Translated.to_string(), "translated");
        assert_eq!(ResolveMode::Raw.to_string(), "raw");
    }
}
