// Keychord Dispatch
// The chord view handed to a binding dispatcher

use std::fmt;

use crate::keysym::Keysym;
use crate::modifier::ModifierMask;
use crate::resolve::ResolveMode;
use crate::seat::DeviceId;
use crate::state::PressedSet;

/// A candidate chord: the keysyms of the key just pressed, the effective
/// modifiers, and every non-modifier keysym currently down on the same track.
#[derive(Debug, Clone, Copy)]
pub struct Chord<'a> {
    pub device: DeviceId,
    pub mode: ResolveMode,
    pub keysyms: &'a [Keysym],
    pub modifiers: ModifierMask,
    pub pressed: &'a PressedSet,
}

impl fmt::Display for Chord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{}+", self.modifiers)?;
        }
        let names: Vec<String> = self.pressed.iter().map(|sym| sym.name()).collect();
        write!(f, "{} ({})", names.join("+"), self.mode)
    }
}

/// Looks a chord up and runs whatever it is bound to.
pub trait BindingDispatcher {
    /// Returns true when the chord was handled and must not reach clients
    fn try_dispatch(&mut self, chord: &Chord<'_>) -> bool;
}

impl<F> BindingDispatcher for F
where
    F: FnMut(&Chord<'_>) -> bool,
{
    fn try_dispatch(&mut self, chord: &Chord<'_>) -> bool {
        self(chord)
    }
}

/// Dispatcher with no bindings; every key passes through
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBindings;

impl BindingDispatcher for NoBindings {
    fn try_dispatch(&mut self, _chord: &Chord<'_>) -> bool {
        false
    }
}
