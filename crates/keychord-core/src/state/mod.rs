// Keychord State
// Per-device key tracking

pub mod pressed;

pub use pressed::{PressedSet, PRESSED_KEYSYMS_CAP};
