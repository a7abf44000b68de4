// Keychord Pressed Keysym Set
// Fixed-capacity set of currently-down non-modifier keysyms for one track

use std::fmt;

use crate::hardware::KeyState;
use crate::keysym::{Keysym, NO_SYMBOL};
use crate::modifier::is_modifier;

/// Maximum number of simultaneously tracked keysyms per track
pub const PRESSED_KEYSYMS_CAP: usize = 32;

/// Tracks pressed keysyms in a fixed array of slots.
///
/// Empty slots hold [`NO_SYMBOL`]. A keysym occupies at most one slot and slot
/// order carries no meaning. Presses beyond capacity are dropped silently,
/// which bounds chord depth without allocating on the input path.
#[derive(Clone)]
pub struct PressedSet {
    slots: [Keysym; PRESSED_KEYSYMS_CAP],
}

impl Default for PressedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PressedSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            slots: [NO_SYMBOL; PRESSED_KEYSYMS_CAP],
        }
    }

    /// Slot index holding `sym`, if present
    pub fn index_of(&self, sym: Keysym) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == sym)
    }

    /// Check if a keysym is currently pressed
    pub fn contains(&self, sym: Keysym) -> bool {
        !sym.is_none() && self.index_of(sym).is_some()
    }

    /// Number of occupied slots
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub const fn capacity(&self) -> usize {
        PRESSED_KEYSYMS_CAP
    }

    /// Insert a keysym into the first free slot.
    ///
    /// No-op if already present; dropped without error if the set is full.
    pub fn add(&mut self, sym: Keysym) {
        if sym.is_none() || self.index_of(sym).is_some() {
            return;
        }
        match self.index_of(NO_SYMBOL) {
            Some(i) => self.slots[i] = sym,
            None => log::trace!("pressed set full, dropping {}", sym),
        }
    }

    /// Clear the slot holding `sym`, if any
    pub fn remove(&mut self, sym: Keysym) {
        if sym.is_none() {
            return;
        }
        if let Some(i) = self.index_of(sym) {
            self.slots[i] = NO_SYMBOL;
        }
    }

    /// Apply one key transition for every resolved non-modifier keysym
    pub fn update(&mut self, syms: &[Keysym], state: KeyState) {
        for &sym in syms.iter().filter(|sym| !is_modifier(**sym)) {
            match state {
                KeyState::Pressed => self.add(sym),
                KeyState::Released => self.remove(sym),
            }
        }
    }

    /// Iterate over the pressed keysyms (slot order)
    pub fn iter(&self) -> impl Iterator<Item = Keysym> + '_ {
        self.slots.iter().copied().filter(|slot| !slot.is_none())
    }

    /// Check that the set holds exactly the given keysyms
    pub fn matches(&self, syms: &[Keysym]) -> bool {
        self.count() == syms.len() && syms.iter().all(|sym| self.contains(*sym))
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.slots = [NO_SYMBOL; PRESSED_KEYSYMS_CAP];
    }
}

impl PartialEq for PressedSet {
    fn eq(&self, other: &Self) -> bool {
        self.count() == other.count() && self.iter().all(|sym| other.contains(sym))
    }
}

impl Eq for PressedSet {}

impl fmt::Debug for PressedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym;

    fn sym(raw: u32) -> Keysym {
        Keysym(raw)
    }

    #[test]
    fn test_new_is_empty() {
        let set = PressedSet::new();
        assert_eq!(set.count(), 0);
        assert!(set.is_empty());
        assert_eq!(set.capacity(), PRESSED_KEYSYMS_CAP);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = PressedSet::new();
        set.add(keysym::KEY_A);
        set.add(keysym::KEY_A);
        assert_eq!(set.count(), 1);
        assert_eq!(set.index_of(keysym::KEY_A), Some(0));
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let mut set = PressedSet::new();
        set.add(keysym::KEY_A);
        let before = set.clone();

        set.add(keysym::AT);
        set.remove(keysym::AT);
        assert_eq!(set, before);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut set = PressedSet::new();
        set.add(keysym::KEY_A);
        set.remove(keysym::AT);
        assert_eq!(set.count(), 1);
        assert!(set.contains(keysym::KEY_A));
    }

    #[test]
    fn test_add_reuses_first_free_slot() {
        let mut set = PressedSet::new();
        set.add(sym(0x61));
        set.add(sym(0x62));
        set.add(sym(0x63));
        set.remove(sym(0x62));
        set.add(sym(0x64));
        assert_eq!(set.index_of(sym(0x64)), Some(1));
    }

    #[test]
    fn test_overflow_is_dropped_silently() {
        let mut set = PressedSet::new();
        for i in 0..(PRESSED_KEYSYMS_CAP as u32 + 1) {
            set.add(sym(0x1000 + i));
        }
        assert_eq!(set.count(), PRESSED_KEYSYMS_CAP);
        assert!(!set.contains(sym(0x1000 + PRESSED_KEYSYMS_CAP as u32)));
    }

    #[test]
    fn test_no_symbol_never_tracked() {
        let mut set = PressedSet::new();
        set.add(NO_SYMBOL);
        assert_eq!(set.count(), 0);
        assert!(!set.contains(NO_SYMBOL));
    }

    #[test]
    fn test_update_skips_modifiers() {
        let mut set = PressedSet::new();
        set.update(&[keysym::SHIFT_L, keysym::KEY_A], KeyState::Pressed);
        assert!(set.matches(&[keysym::KEY_A]));

        set.update(&[keysym::KEY_A], KeyState::Released);
        assert!(set.is_empty());
    }

    #[test]
    fn test_equality_ignores_slot_order() {
        let mut left = PressedSet::new();
        left.add(keysym::KEY_A);
        left.add(keysym::AT);

        let mut right = PressedSet::new();
        right.add(keysym::AT);
        right.add(keysym::KEY_A);

        assert_eq!(left, right);
    }
}
