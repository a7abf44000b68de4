// Keychord Hardware Layer
// Keyboard state interface and raw key events

use serde::Deserialize;
use smallvec::SmallVec;
use strum_macros::{Display, EnumString};

use crate::key::{Key, Keycode};
use crate::keysym::Keysym;
use crate::modifier::ModifierMask;

/// Key repeat rate applied on configure (repeats per second)
pub const REPEAT_RATE: i32 = 25;
/// Key repeat delay applied on configure (milliseconds)
pub const REPEAT_DELAY: i32 = 600;

/// Index of a layout (XKB group) within a keymap
pub type LayoutIndex = u32;

/// Shift level within a layout; level 0 is the unshifted symbol
pub type LevelIndex = u32;

/// Keysyms produced by one key. Almost always a single symbol.
pub type Keysyms = SmallVec<[Keysym; 4]>;

/// Physical key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    #[strum(to_string = "released", serialize = "release")]
    #[serde(alias = "release")]
    Released,
    #[strum(to_string = "pressed", serialize = "press")]
    #[serde(alias = "press")]
    Pressed,
}

impl KeyState {
    pub fn is_pressed(self) -> bool {
        matches!(self, KeyState::Pressed)
    }

    /// Map an evdev event value (0 = release, 1 = press). Repeats yield `None`.
    pub fn from_evdev_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            _ => None,
        }
    }
}

/// One physical key event as delivered by the hardware layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Event time in milliseconds
    pub time_msec: u32,
    /// Kernel key code (no XKB offset)
    pub key: Key,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn new(time_msec: u32, key: Key, state: KeyState) -> Self {
        Self {
            time_msec,
            key,
            state,
        }
    }

    pub fn pressed(time_msec: u32, key: Key) -> Self {
        Self::new(time_msec, key, KeyState::Pressed)
    }

    pub fn released(time_msec: u32, key: Key) -> Self {
        Self::new(time_msec, key, KeyState::Released)
    }

    /// The XKB keycode addressed by this event
    pub fn keycode(&self) -> Keycode {
        self.key.keycode()
    }
}

/// Keyboard state as maintained by the hardware layer.
///
/// Implementations hold the compiled keymap pushed by [`set_keymap`] plus the
/// live modifier/layout state. Queries for keycodes the keymap does not know
/// return no keysyms rather than failing.
///
/// [`set_keymap`]: HardwareKeyboard::set_keymap
pub trait HardwareKeyboard {
    /// Compiled keymap type this keyboard accepts
    type Keymap: Clone;

    /// Currently active (effective) modifiers
    fn modifiers(&self) -> ModifierMask;

    /// Modifiers the keymap consumes to produce the keysyms of `keycode`
    fn consumed_modifiers(&self, keycode: Keycode) -> ModifierMask;

    /// Keysyms for `keycode` under the full current state
    fn keysyms(&self, keycode: Keycode) -> Keysyms;

    /// Keysyms for `keycode` at a fixed layout and shift level
    fn keysyms_at_level(&self, keycode: Keycode, layout: LayoutIndex, level: LevelIndex)
        -> Keysyms;

    /// Layout the key is currently interpreted in
    fn layout_index(&self, keycode: Keycode) -> LayoutIndex;

    /// Install a new keymap, resetting the keyboard state
    fn set_keymap(&mut self, keymap: &Self::Keymap);

    fn set_repeat_info(&mut self, rate: i32, delay: i32);

    /// Apply a physical transition to the state.
    ///
    /// Returns true if the effective modifiers or active layout changed.
    fn update_key(&mut self, keycode: Keycode, state: KeyState) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_from_evdev_value() {
        assert_eq!(KeyState::from_evdev_value(0), Some(KeyState::Released));
        assert_eq!(KeyState::from_evdev_value(1), Some(KeyState::Pressed));
        assert_eq!(KeyState::from_evdev_value(2), None);
    }

    #[test]
    fn test_key_state_strings() {
        assert_eq!(KeyState::Pressed.to_string(), "pressed");
        assert_eq!("released".parse::<KeyState>(), Ok(KeyState::Released));
        assert_eq!("press".parse::<KeyState>(), Ok(KeyState::Pressed));
    }

    #[test]
    fn test_key_event_keycode() {
        let event = KeyEvent::pressed(10, Key::from(3));
        assert_eq!(event.keycode(), Keycode(11));
        assert!(event.state.is_pressed());
    }
}
