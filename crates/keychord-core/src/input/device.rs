// Keychord Input Layer - Device Detection
// Decide from reported key capabilities whether a device is a keyboard

use std::collections::HashSet;

use crate::key::Key;

/// Key capabilities of an input device
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// Supported key codes
    pub supported_keys: HashSet<Key>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            has_ev_key,
            supported_keys: supported_keys.into_iter().collect(),
        }
    }

    pub fn supports(&self, key: Key) -> bool {
        self.supported_keys.contains(&key)
    }
}

/// Kernel codes of the 26 letter keys
const LETTER_CODES: [u16; 26] = [
    16, 17, 18, 19, 20, 21, 22, 23, 24, 25, // Q..P
    30, 31, 32, 33, 34, 35, 36, 37, 38, // A..L
    44, 45, 46, 47, 48, 49, 50, // Z..M
];

/// Keys every keyboard we accept must report
const REQUIRED: [Key; 4] = [Key::ESC, Key::ENTER, Key::SPACE, Key::LEFT_SHIFT];

/// Letters a compact keyboard may leave out and still qualify
const MISSING_LETTERS_ALLOWED: usize = 2;

/// Determine if a device is a full keyboard.
///
/// Power buttons, media remotes and mice also report EV_KEY, so the device must
/// carry Escape, Enter, Space, Left Shift and nearly all letter keys.
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    if !capabilities.has_ev_key {
        return false;
    }
    if !REQUIRED.iter().all(|key| capabilities.supports(*key)) {
        return false;
    }
    let letters = LETTER_CODES
        .iter()
        .filter(|code| capabilities.supports(Key(**code)))
        .count();
    letters + MISSING_LETTERS_ALLOWED >= LETTER_CODES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_keys() -> Vec<Key> {
        let mut keys: Vec<Key> = LETTER_CODES.iter().map(|c| Key(*c)).collect();
        keys.extend(REQUIRED);
        keys.extend((2..=11).map(Key)); // digits
        keys
    }

    #[test]
    fn test_full_keyboard() {
        let caps = DeviceCapabilities::new(true, keyboard_keys());
        assert!(is_keyboard(&caps));
    }

    #[test]
    fn test_no_ev_key() {
        let caps = DeviceCapabilities::new(false, keyboard_keys());
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_mouse_buttons_only() {
        let caps = DeviceCapabilities::new(true, [Key(272), Key(273), Key(274)]);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_missing_letters() {
        let mut keys = keyboard_keys();
        keys.retain(|k| !matches!(k.code(), 16 | 17 | 18));
        assert!(!is_keyboard(&DeviceCapabilities::new(true, keys)));

        let mut keys = keyboard_keys();
        keys.retain(|k| k.code() != 16);
        assert!(is_keyboard(&DeviceCapabilities::new(true, keys)));
    }

    #[test]
    fn test_power_button() {
        // KEY_POWER only
        let caps = DeviceCapabilities::new(true, [Key(116)]);
        assert!(!is_keyboard(&caps));
    }
}
