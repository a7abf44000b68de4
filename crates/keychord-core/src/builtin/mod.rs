// Keychord Builtin Keymap
// A small pure-Rust keymap service with XKB-compatible level selection

mod layouts;

pub use layouts::KeyType;

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::hardware::{HardwareKeyboard, KeyState, Keysyms, LayoutIndex, LevelIndex};
use crate::key::Keycode;
use crate::keymap::{KeymapCompiler, KeymapError, RuleNames};
use crate::keysym::{self, Keysym};
use crate::modifier::ModifierMask;

use layouts::{KeyDef, Layout};

/// XKB never exposes more groups than this
pub const MAX_LAYOUTS: usize = 4;

const CAPS_LOCK_KEY: u16 = 58;

#[derive(Debug)]
struct KeymapData {
    names: RuleNames,
    layouts: Vec<&'static Layout>,
    caps_override: Option<&'static [Keysym]>,
}

/// A compiled builtin keymap. Cloning shares the underlying tables.
#[derive(Clone)]
pub struct BuiltinKeymap {
    inner: Arc<KeymapData>,
}

impl BuiltinKeymap {
    /// Rule names this keymap was compiled from
    pub fn names(&self) -> &RuleNames {
        &self.inner.names
    }

    pub fn num_layouts(&self) -> usize {
        self.inner.layouts.len()
    }

    pub fn layout_names(&self) -> Vec<&'static str> {
        self.inner.layouts.iter().map(|layout| layout.name).collect()
    }

    /// Key type and symbols for `keycode` in the given layout
    fn key(&self, keycode: Keycode, layout: LayoutIndex) -> Option<(KeyType, &'static [Keysym])> {
        let key = keycode.to_key()?.code();
        if key == CAPS_LOCK_KEY {
            if let Some(levels) = self.inner.caps_override {
                return Some((KeyType::OneLevel, levels));
            }
        }
        let layout = self.inner.layouts.get(layout as usize)?;
        layout
            .key(key)
            .map(|def: &'static KeyDef| (def.kind, def.levels))
    }

    /// Symbols at an explicit layout and level
    pub fn key_get_syms_by_level(
        &self,
        keycode: Keycode,
        layout: LayoutIndex,
        level: LevelIndex,
    ) -> Keysyms {
        self.key(keycode, layout)
            .and_then(|(_, levels)| levels.get(level as usize).copied())
            .into_iter()
            .collect()
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for BuiltinKeymap {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for BuiltinKeymap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinKeymap")
            .field("layouts", &self.layout_names())
            .field("names", &self.inner.names)
            .finish()
    }
}

/// Compiles rule names against the builtin layout tables.
///
/// Supported rules are `evdev` and `base` (or empty), layouts `us` and `de`,
/// no variants beyond `basic`, and the `caps:escape` and `ctrl:nocaps` options.
/// Other options are ignored with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCompiler;

impl BuiltinCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl KeymapCompiler for BuiltinCompiler {
    type Keymap = BuiltinKeymap;

    fn compile(&self, names: &RuleNames) -> Result<BuiltinKeymap, KeymapError> {
        match names.rules() {
            "" | "evdev" | "base" => {}
            other => return Err(KeymapError::UnknownRules(other.to_string())),
        }
        if !names.model().is_empty() {
            log::debug!("Builtin keymap ignores model {:?}", names.model());
        }

        let layout_list: Vec<&str> = names.layout().split(',').map(str::trim).collect();
        let variants: Vec<&str> = names.variant().split(',').map(str::trim).collect();

        let mut layouts = Vec::with_capacity(layout_list.len());
        for (index, name) in layout_list.iter().enumerate() {
            let name = if name.is_empty() { "us" } else { name };
            let layout =
                layouts::find(name).ok_or_else(|| KeymapError::UnknownLayout(name.to_string()))?;
            match variants.get(index).copied().unwrap_or("") {
                "" | "basic" => {}
                variant => {
                    return Err(KeymapError::UnknownVariant {
                        layout: name.to_string(),
                        variant: variant.to_string(),
                    })
                }
            }
            layouts.push(layout);
        }
        if layouts.len() > MAX_LAYOUTS {
            log::warn!(
                "Keymap lists {} layouts, keeping the first {}",
                layouts.len(),
                MAX_LAYOUTS
            );
            layouts.truncate(MAX_LAYOUTS);
        }

        let mut caps_override = None;
        for option in names.options().split(',').map(str::trim) {
            match option {
                "" => {}
                "caps:escape" => caps_override = Some(&layouts::CAPS_AS_ESCAPE[..]),
                "ctrl:nocaps" => caps_override = Some(&layouts::CAPS_AS_CONTROL[..]),
                other => log::warn!("Ignoring unsupported XKB option {:?}", other),
            }
        }

        log::debug!("Compiled builtin keymap: {}", names);
        Ok(BuiltinKeymap {
            inner: Arc::new(KeymapData {
                names: names.clone(),
                layouts,
                caps_override,
            }),
        })
    }
}

/// Modifier role of a keysym when it sits at level 0 of a pressed key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModRole {
    Depress(ModifierMask),
    Lock(ModifierMask),
}

fn mod_role(sym: Keysym) -> Option<ModRole> {
    let role = match sym {
        keysym::SHIFT_L | keysym::SHIFT_R => ModRole::Depress(ModifierMask::SHIFT),
        keysym::CONTROL_L | keysym::CONTROL_R => ModRole::Depress(ModifierMask::CTRL),
        keysym::ALT_L | keysym::ALT_R | keysym::META_L | keysym::META_R => {
            ModRole::Depress(ModifierMask::ALT)
        }
        keysym::SUPER_L | keysym::SUPER_R | keysym::HYPER_L | keysym::HYPER_R => {
            ModRole::Depress(ModifierMask::LOGO)
        }
        keysym::CAPS_LOCK | keysym::SHIFT_LOCK => ModRole::Lock(ModifierMask::CAPS),
        keysym::NUM_LOCK => ModRole::Lock(ModifierMask::MOD2),
        _ => return None,
    };
    Some(role)
}

/// Keyboard state backed by a [`BuiltinKeymap`]
#[derive(Debug, Default)]
pub struct BuiltinKeyboard {
    keymap: Option<BuiltinKeymap>,
    held: SmallVec<[(Keycode, ModifierMask); 8]>,
    locked: ModifierMask,
    layout: LayoutIndex,
    repeat: Option<(i32, i32)>,
}

impl BuiltinKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keymap(&self) -> Option<&BuiltinKeymap> {
        self.keymap.as_ref()
    }

    /// Repeat rate and delay last applied, if any
    pub fn repeat_info(&self) -> Option<(i32, i32)> {
        self.repeat
    }

    /// Active layout group
    pub fn active_layout(&self) -> LayoutIndex {
        self.layout
    }

    /// Lock the active layout group. Out of range indices are ignored.
    pub fn lock_layout(&mut self, layout: LayoutIndex) -> bool {
        let count = self.keymap.as_ref().map_or(0, BuiltinKeymap::num_layouts);
        if (layout as usize) >= count || layout == self.layout {
            return false;
        }
        self.layout = layout;
        true
    }

    fn depressed(&self) -> ModifierMask {
        self.held
            .iter()
            .fold(ModifierMask::empty(), |acc, (_, mask)| acc | *mask)
    }

    fn key(&self, keycode: Keycode) -> Option<(KeyType, &'static [Keysym])> {
        self.keymap.as_ref()?.key(keycode, self.layout)
    }
}

impl HardwareKeyboard for BuiltinKeyboard {
    type Keymap = BuiltinKeymap;

    fn modifiers(&self) -> ModifierMask {
        self.depressed() | self.locked
    }

    fn consumed_modifiers(&self, keycode: Keycode) -> ModifierMask {
        self.key(keycode)
            .map_or(ModifierMask::empty(), |(kind, _)| kind.mods())
    }

    fn keysyms(&self, keycode: Keycode) -> Keysyms {
        let Some((kind, levels)) = self.key(keycode) else {
            return Keysyms::new();
        };
        let level = kind.level(self.modifiers()) as usize;
        levels
            .get(level)
            .or_else(|| levels.first())
            .copied()
            .into_iter()
            .collect()
    }

    fn keysyms_at_level(
        &self,
        keycode: Keycode,
        layout: LayoutIndex,
        level: LevelIndex,
    ) -> Keysyms {
        self.keymap
            .as_ref()
            .map(|keymap| keymap.key_get_syms_by_level(keycode, layout, level))
            .unwrap_or_default()
    }

    fn layout_index(&self, _keycode: Keycode) -> LayoutIndex {
        self.layout
    }

    fn set_keymap(&mut self, keymap: &BuiltinKeymap) {
        self.keymap = Some(keymap.clone());
        self.held.clear();
        self.locked = ModifierMask::empty();
        self.layout = 0;
    }

    fn set_repeat_info(&mut self, rate: i32, delay: i32) {
        self.repeat = Some((rate, delay));
    }

    fn update_key(&mut self, keycode: Keycode, state: KeyState) -> bool {
        let before = self.modifiers();
        let role = self
            .key(keycode)
            .and_then(|(_, levels)| levels.first().copied())
            .and_then(mod_role);

        match (state, role) {
            (KeyState::Pressed, Some(ModRole::Depress(mask))) => {
                if !self.held.iter().any(|(code, _)| *code == keycode) {
                    self.held.push((keycode, mask));
                }
            }
            (KeyState::Pressed, Some(ModRole::Lock(mask))) => self.locked.toggle(mask),
            (KeyState::Released, _) => self.held.retain(|(code, _)| *code != keycode),
            _ => {}
        }

        self.modifiers() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn keyboard(names: RuleNames) -> BuiltinKeyboard {
        let keymap = BuiltinCompiler.compile(&names).unwrap();
        let mut keyboard = BuiltinKeyboard::new();
        keyboard.set_keymap(&keymap);
        keyboard
    }

    fn kc(code: u16) -> Keycode {
        Key(code).keycode()
    }

    #[test]
    fn test_compile_defaults_to_us() {
        let keymap = BuiltinCompiler.compile(&RuleNames::default()).unwrap();
        assert_eq!(keymap.layout_names(), vec!["us"]);
    }

    #[test]
    fn test_compile_rejects_unknown_names() {
        let err = BuiltinCompiler
            .compile(&RuleNames::default().with_rules("nonexistent"))
            .unwrap_err();
        assert_eq!(err, KeymapError::UnknownRules("nonexistent".into()));

        let err = BuiltinCompiler
            .compile(&RuleNames::default().with_layout("zz"))
            .unwrap_err();
        assert_eq!(err, KeymapError::UnknownLayout("zz".into()));

        let err = BuiltinCompiler
            .compile(&RuleNames::default().with_layout("us").with_variant("dvorak"))
            .unwrap_err();
        assert!(matches!(err, KeymapError::UnknownVariant { .. }));
    }

    #[test]
    fn test_compile_multiple_layouts() {
        let keymap = BuiltinCompiler
            .compile(&RuleNames::default().with_layout("us,de"))
            .unwrap();
        assert_eq!(keymap.layout_names(), vec!["us", "de"]);
    }

    #[test]
    fn test_shift_selects_level_one() {
        let mut kb = keyboard(RuleNames::default());
        assert_eq!(kb.keysyms(kc(3)).as_slice(), &[keysym::KEY_2]);
        assert!(kb.update_key(kc(42), KeyState::Pressed));
        assert_eq!(kb.keysyms(kc(3)).as_slice(), &[keysym::AT]);
        assert_eq!(kb.consumed_modifiers(kc(3)), ModifierMask::SHIFT);
        assert!(kb.update_key(kc(42), KeyState::Released));
        assert_eq!(kb.modifiers(), ModifierMask::empty());
    }

    #[test]
    fn test_caps_lock_toggles() {
        let mut kb = keyboard(RuleNames::default());
        assert!(kb.update_key(kc(58), KeyState::Pressed));
        assert!(!kb.update_key(kc(58), KeyState::Released));
        assert_eq!(kb.modifiers(), ModifierMask::CAPS);
        assert_eq!(kb.keysyms(kc(30)).as_slice(), &[Keysym(0x41)]);
        // Digits are TWO_LEVEL, Lock does not affect them
        assert_eq!(kb.keysyms(kc(3)).as_slice(), &[keysym::KEY_2]);
        kb.update_key(kc(58), KeyState::Pressed);
        assert_eq!(kb.modifiers(), ModifierMask::empty());
    }

    #[test]
    fn test_non_modifier_key_does_not_change_state() {
        let mut kb = keyboard(RuleNames::default());
        assert!(!kb.update_key(kc(30), KeyState::Pressed));
        assert!(!kb.update_key(kc(30), KeyState::Released));
    }

    #[test]
    fn test_two_shift_keys_held() {
        let mut kb = keyboard(RuleNames::default());
        kb.update_key(kc(42), KeyState::Pressed);
        kb.update_key(kc(54), KeyState::Pressed);
        assert!(!kb.update_key(kc(42), KeyState::Released));
        assert_eq!(kb.modifiers(), ModifierMask::SHIFT);
    }

    #[test]
    fn test_raw_level_ignores_modifiers() {
        let mut kb = keyboard(RuleNames::default());
        kb.update_key(kc(42), KeyState::Pressed);
        assert_eq!(kb.keysyms_at_level(kc(3), 0, 0).as_slice(), &[keysym::KEY_2]);
        assert_eq!(kb.keysyms_at_level(kc(3), 0, 1).as_slice(), &[keysym::AT]);
        assert!(kb.keysyms_at_level(kc(3), 0, 5).is_empty());
    }

    #[test]
    fn test_lock_layout_switches_group() {
        let mut kb = keyboard(RuleNames::default().with_layout("us,de"));
        assert_eq!(kb.keysyms(kc(21)).as_slice(), &[keysym::KEY_Y]);
        assert!(kb.lock_layout(1));
        assert_eq!(kb.layout_index(kc(21)), 1);
        assert_eq!(kb.keysyms(kc(21)).as_slice(), &[keysym::KEY_Z]);
        assert!(!kb.lock_layout(2));
    }

    #[test]
    fn test_caps_options() {
        let mut kb = keyboard(RuleNames::default().with_options("caps:escape"));
        assert_eq!(kb.keysyms(kc(58)).as_slice(), &[keysym::ESCAPE]);
        assert!(!kb.update_key(kc(58), KeyState::Pressed));

        let mut kb = keyboard(RuleNames::default().with_options("ctrl:nocaps,foo:bar"));
        assert_eq!(kb.keysyms(kc(58)).as_slice(), &[keysym::CONTROL_L]);
        assert!(kb.update_key(kc(58), KeyState::Pressed));
        assert_eq!(kb.modifiers(), ModifierMask::CTRL);
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let kb = keyboard(RuleNames::default());
        assert!(kb.keysyms(Keycode(5000)).is_empty());
        assert_eq!(kb.consumed_modifiers(Keycode(5000)), ModifierMask::empty());
        assert!(BuiltinKeyboard::new().keysyms(kc(30)).is_empty());
    }

    #[test]
    fn test_set_keymap_resets_state() {
        let mut kb = keyboard(RuleNames::default());
        kb.update_key(kc(58), KeyState::Pressed);
        let keymap = kb.keymap().cloned().unwrap();
        kb.set_keymap(&keymap);
        assert_eq!(kb.modifiers(), ModifierMask::empty());
    }
}
