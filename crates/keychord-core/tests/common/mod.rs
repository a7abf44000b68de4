// Shared collaborators for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use keychord_core::{
    BindingDispatcher, BuiltinCompiler, BuiltinKeyboard, Chord, DeviceId, Key, KeyState,
    KeyboardDevice, Keysym, ModifierMask, Passthrough, ResolveMode, RuleNames, Seat, SeatHandle,
};

/// What the seat handed to the focused client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forwarded {
    Active(DeviceId),
    Key(u32, Key, KeyState),
    Modifiers(ModifierMask),
}

#[derive(Clone, Default)]
pub struct RecordingPassthrough(Arc<Mutex<Vec<Forwarded>>>);

impl RecordingPassthrough {
    pub fn take(&self) -> Vec<Forwarded> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn keys(&self) -> Vec<(Key, KeyState)> {
        self.0
            .lock()
            .iter()
            .filter_map(|f| match f {
                Forwarded::Key(_, key, state) => Some((*key, *state)),
                _ => None,
            })
            .collect()
    }
}

impl Passthrough for RecordingPassthrough {
    fn set_active_keyboard(&mut self, device: DeviceId) {
        self.0.lock().push(Forwarded::Active(device));
    }

    fn notify_key(&mut self, time_msec: u32, key: Key, state: KeyState) {
        self.0.lock().push(Forwarded::Key(time_msec, key, state));
    }

    fn notify_modifiers(&mut self, modifiers: ModifierMask) {
        self.0.lock().push(Forwarded::Modifiers(modifiers));
    }
}

/// One observed dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub mode: ResolveMode,
    pub keysyms: Vec<Keysym>,
    pub modifiers: ModifierMask,
    pub pressed: Vec<Keysym>,
}

/// Records every chord and never handles one
#[derive(Default)]
pub struct RecordingDispatcher {
    pub attempts: Vec<Attempt>,
}

impl BindingDispatcher for RecordingDispatcher {
    fn try_dispatch(&mut self, chord: &Chord<'_>) -> bool {
        let mut pressed: Vec<Keysym> = chord.pressed.iter().collect();
        pressed.sort();
        self.attempts.push(Attempt {
            mode: chord.mode,
            keysyms: chord.keysyms.to_vec(),
            modifiers: chord.modifiers,
            pressed,
        });
        false
    }
}

pub struct Harness {
    pub seat: SeatHandle,
    pub passthrough: RecordingPassthrough,
    pub device: KeyboardDevice<BuiltinKeyboard>,
}

impl Harness {
    /// A configured keyboard on a fresh seat, recordings cleared
    pub fn new(names: RuleNames) -> Self {
        let passthrough = RecordingPassthrough::default();
        let seat = Seat::new("seat0", passthrough.clone()).into_handle();
        let mut device = KeyboardDevice::new(DeviceId(0), &seat, BuiltinKeyboard::new());
        device
            .configure(&BuiltinCompiler, &names, &RuleNames::default())
            .expect("builtin keymap compiles");
        passthrough.take();
        Self {
            seat,
            passthrough,
            device,
        }
    }

    pub fn us() -> Self {
        Self::new(RuleNames::default().with_layout("us"))
    }
}
