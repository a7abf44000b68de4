// Keychord xkbcommon Backend
// Keymap compilation and keyboard state through libxkbcommon

use std::fmt;

use xkbcommon::xkb;

use crate::hardware::{HardwareKeyboard, KeyState, Keysyms, LayoutIndex, LevelIndex};
use crate::key::Keycode;
use crate::keymap::{KeymapCompiler, KeymapError, RuleNames};
use crate::keysym::Keysym;
use crate::modifier::ModifierMask;

/// Real modifier names, paired with the bit each one sets in a [`ModifierMask`]
const MOD_NAMES: [(&str, ModifierMask); 8] = [
    (xkb::MOD_NAME_SHIFT, ModifierMask::SHIFT),
    (xkb::MOD_NAME_CAPS, ModifierMask::CAPS),
    (xkb::MOD_NAME_CTRL, ModifierMask::CTRL),
    (xkb::MOD_NAME_ALT, ModifierMask::ALT),
    (xkb::MOD_NAME_NUM, ModifierMask::MOD2),
    ("Mod3", ModifierMask::MOD3),
    (xkb::MOD_NAME_LOGO, ModifierMask::LOGO),
    ("Mod5", ModifierMask::MOD5),
];

/// Compiles rule names with libxkbcommon
pub struct XkbCompiler {
    context: xkb::Context,
}

impl XkbCompiler {
    pub fn new() -> Self {
        Self {
            context: xkb::Context::new(xkb::CONTEXT_NO_FLAGS),
        }
    }
}

impl Default for XkbCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeymapCompiler for XkbCompiler {
    type Keymap = xkb::Keymap;

    fn compile(&self, names: &RuleNames) -> Result<xkb::Keymap, KeymapError> {
        let options = names.options.clone().filter(|options| !options.is_empty());
        xkb::Keymap::new_from_names(
            &self.context,
            names.rules(),
            names.model(),
            names.layout(),
            names.variant(),
            options,
            xkb::COMPILE_NO_FLAGS,
        )
        .ok_or_else(|| KeymapError::Compile(names.to_string()))
    }
}

/// Maps xkb modifier indices of one keymap onto [`ModifierMask`] bits
#[derive(Debug, Clone, Default)]
struct ModIndices {
    indices: Vec<(xkb::ModIndex, ModifierMask)>,
}

impl ModIndices {
    fn new(keymap: &xkb::Keymap) -> Self {
        let indices = MOD_NAMES
            .iter()
            .map(|(name, mask)| (keymap.mod_get_index(name), *mask))
            .filter(|(index, _)| *index != xkb::MOD_INVALID)
            .collect();
        Self { indices }
    }

    fn to_mask(&self, mods: xkb::ModMask) -> ModifierMask {
        self.indices
            .iter()
            .filter(|(index, _)| mods & (1 << index) != 0)
            .fold(ModifierMask::empty(), |acc, (_, mask)| acc | *mask)
    }
}

struct Loaded {
    keymap: xkb::Keymap,
    state: xkb::State,
    mods: ModIndices,
}

/// Keyboard state tracked by libxkbcommon
#[derive(Default)]
pub struct XkbKeyboard {
    loaded: Option<Loaded>,
    repeat: Option<(i32, i32)>,
}

impl XkbKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repeat_info(&self) -> Option<(i32, i32)> {
        self.repeat
    }

    /// Lock the effective layout group
    pub fn lock_layout(&mut self, layout: LayoutIndex) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        if layout >= loaded.keymap.num_layouts() {
            return false;
        }
        let depressed = loaded.state.serialize_mods(xkb::STATE_MODS_DEPRESSED);
        let latched = loaded.state.serialize_mods(xkb::STATE_MODS_LATCHED);
        let locked = loaded.state.serialize_mods(xkb::STATE_MODS_LOCKED);
        let changed = loaded
            .state
            .update_mask(depressed, latched, locked, 0, 0, layout);
        changed & xkb::STATE_LAYOUT_EFFECTIVE != 0
    }
}

fn convert(syms: &[xkb::Keysym]) -> Keysyms {
    syms.iter().map(|sym| Keysym(sym.raw())).collect()
}

fn xkb_keycode(keycode: Keycode) -> xkb::Keycode {
    xkb::Keycode::new(keycode.raw())
}

impl HardwareKeyboard for XkbKeyboard {
    type Keymap = xkb::Keymap;

    fn modifiers(&self) -> ModifierMask {
        self.loaded.as_ref().map_or(ModifierMask::empty(), |l| {
            l.mods
                .to_mask(l.state.serialize_mods(xkb::STATE_MODS_EFFECTIVE))
        })
    }

    fn consumed_modifiers(&self, keycode: Keycode) -> ModifierMask {
        self.loaded.as_ref().map_or(ModifierMask::empty(), |l| {
            // libxkbcommon's default consumed mode is XKB mode
            l.mods
                .to_mask(l.state.key_get_consumed_mods(xkb_keycode(keycode)))
        })
    }

    fn keysyms(&self, keycode: Keycode) -> Keysyms {
        self.loaded
            .as_ref()
            .map(|l| convert(l.state.key_get_syms(xkb_keycode(keycode))))
            .unwrap_or_default()
    }

    fn keysyms_at_level(
        &self,
        keycode: Keycode,
        layout: LayoutIndex,
        level: LevelIndex,
    ) -> Keysyms {
        self.loaded
            .as_ref()
            .map(|l| {
                convert(
                    l.keymap
                        .key_get_syms_by_level(xkb_keycode(keycode), layout, level),
                )
            })
            .unwrap_or_default()
    }

    fn layout_index(&self, keycode: Keycode) -> LayoutIndex {
        self.loaded
            .as_ref()
            .map_or(0, |l| l.state.key_get_layout(xkb_keycode(keycode)))
    }

    fn set_keymap(&mut self, keymap: &xkb::Keymap) {
        self.loaded = Some(Loaded {
            keymap: keymap.clone(),
            state: xkb::State::new(keymap),
            mods: ModIndices::new(keymap),
        });
    }

    fn set_repeat_info(&mut self, rate: i32, delay: i32) {
        self.repeat = Some((rate, delay));
    }

    fn update_key(&mut self, keycode: Keycode, state: KeyState) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let direction = match state {
            KeyState::Pressed => xkb::KeyDirection::Down,
            KeyState::Released => xkb::KeyDirection::Up,
        };
        let changed = loaded.state.update_key(xkb_keycode(keycode), direction);
        changed & (xkb::STATE_MODS_EFFECTIVE | xkb::STATE_LAYOUT_EFFECTIVE) != 0
    }
}

impl fmt::Debug for XkbKeyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XkbKeyboard")
            .field("loaded", &self.loaded.is_some())
            .field("modifiers", &self.modifiers())
            .field("repeat", &self.repeat)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::keysym;
    use crate::resolve::{resolve, ResolveMode};

    fn us_keyboard() -> Option<XkbKeyboard> {
        let names = RuleNames::default().with_rules("evdev").with_layout("us");
        // Hosts without xkeyboard-config data cannot compile any keymap
        let keymap = XkbCompiler::new().compile(&names).ok()?;
        let mut keyboard = XkbKeyboard::new();
        keyboard.set_keymap(&keymap);
        Some(keyboard)
    }

    #[test]
    fn test_invalid_rules_fail() {
        let names = RuleNames::default().with_rules("nonexistent-rules-file");
        assert!(XkbCompiler::new().compile(&names).is_err());
    }

    #[test]
    fn test_alt_shift_2() {
        let Some(mut kb) = us_keyboard() else {
            return;
        };
        assert!(kb.update_key(Key::LEFT_ALT.keycode(), KeyState::Pressed));
        assert!(kb.update_key(Key::LEFT_SHIFT.keycode(), KeyState::Pressed));

        let translated = resolve(&kb, Key::KEY_2.keycode(), ResolveMode::Translated);
        assert_eq!(translated.keysyms.as_slice(), &[keysym::AT]);
        assert_eq!(translated.modifiers, ModifierMask::ALT);

        let raw = resolve(&kb, Key::KEY_2.keycode(), ResolveMode::Raw);
        assert_eq!(raw.keysyms.as_slice(), &[keysym::KEY_2]);
        assert_eq!(raw.modifiers, ModifierMask::ALT | ModifierMask::SHIFT);
    }
}
