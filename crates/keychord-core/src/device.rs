// Keychord Keyboard Device
// Per-keyboard lifecycle and the key event pipeline

use std::fmt;
use std::sync::Weak;

use parking_lot::RwLock;

use crate::dispatch::{BindingDispatcher, Chord};
use crate::hardware::{HardwareKeyboard, KeyEvent, KeyState, REPEAT_DELAY, REPEAT_RATE};
use crate::keymap::{KeymapCompiler, KeymapError, RuleNames};
use crate::resolve::{resolve, ResolveMode, Resolved};
use crate::seat::{DeviceId, Seat, SeatHandle, SubscriptionKind};
use crate::state::PressedSet;

/// A device's registration for one kind of seat event.
///
/// Dropping the handle unregisters it.
pub struct Subscription {
    seat: Weak<RwLock<Seat>>,
    device: DeviceId,
    kind: SubscriptionKind,
}

impl Subscription {
    fn new(seat: &SeatHandle, device: DeviceId, kind: SubscriptionKind) -> Self {
        seat.write().add_listener(device, kind);
        Self {
            seat: SeatHandle::downgrade(seat),
            device,
            kind,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(seat) = self.seat.upgrade() {
            seat.write().remove_listener(self.device, self.kind);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("device", &self.device)
            .field("kind", &self.kind)
            .finish()
    }
}

/// What became of one key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A binding consumed the key under the given mode
    Handled(ResolveMode),
    /// Sent on to the focused client
    Forwarded,
    /// The device has no key subscription (not configured yet)
    Ignored,
}

impl KeyOutcome {
    pub fn is_handled(self) -> bool {
        matches!(self, KeyOutcome::Handled(_))
    }
}

/// One physical keyboard attached to a seat
pub struct KeyboardDevice<H: HardwareKeyboard> {
    id: DeviceId,
    seat: Weak<RwLock<Seat>>,
    hardware: H,
    keymap: Option<H::Keymap>,
    pressed_translated: PressedSet,
    pressed_raw: PressedSet,
    key_listener: Option<Subscription>,
    modifiers_listener: Option<Subscription>,
}

impl<H: HardwareKeyboard> KeyboardDevice<H> {
    /// Create an unconfigured device. It has no keymap and ignores events
    /// until [`configure`](Self::configure) succeeds.
    pub fn new(id: DeviceId, seat: &SeatHandle, hardware: H) -> Self {
        log::debug!("Creating {}", id);
        Self {
            id,
            seat: SeatHandle::downgrade(seat),
            hardware,
            keymap: None,
            pressed_translated: PressedSet::new(),
            pressed_raw: PressedSet::new(),
            key_listener: None,
            modifiers_listener: None,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn keymap(&self) -> Option<&H::Keymap> {
        self.keymap.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.keymap.is_some()
    }

    /// Whether key and modifier events are currently delivered
    pub fn is_subscribed(&self) -> bool {
        self.key_listener.is_some() && self.modifiers_listener.is_some()
    }

    /// Pressed-set for one resolution track
    pub fn pressed(&self, mode: ResolveMode) -> &PressedSet {
        match mode {
            ResolveMode::Translated => &self.pressed_translated,
            ResolveMode::Raw => &self.pressed_raw,
        }
    }

    fn pressed_mut(&mut self, mode: ResolveMode) -> &mut PressedSet {
        match mode {
            ResolveMode::Translated => &mut self.pressed_translated,
            ResolveMode::Raw => &mut self.pressed_raw,
        }
    }

    /// Compile a keymap and install it.
    ///
    /// Each name comes from `device` when set there, else from `defaults`.
    /// On failure the previous keymap and subscriptions stay in place.
    pub fn configure<C>(
        &mut self,
        compiler: &C,
        device: &RuleNames,
        defaults: &RuleNames,
    ) -> Result<(), KeymapError>
    where
        C: KeymapCompiler<Keymap = H::Keymap> + ?Sized,
    {
        let names = device.or(defaults);
        let keymap = match compiler.compile(&names) {
            Ok(keymap) => keymap,
            Err(err) => {
                log::warn!("{}: cannot configure keymap {}: {}", self.id, names, err);
                return Err(err);
            }
        };

        self.hardware.set_keymap(&keymap);
        self.keymap = Some(keymap);
        self.hardware.set_repeat_info(REPEAT_RATE, REPEAT_DELAY);

        // Old subscriptions go first so a reconfigure never double-registers
        self.key_listener = None;
        self.modifiers_listener = None;

        match self.seat.upgrade() {
            Some(seat) => {
                seat.write().set_active_keyboard(self.id);
                let key = Subscription::new(&seat, self.id, SubscriptionKind::Key);
                let modifiers = Subscription::new(&seat, self.id, SubscriptionKind::Modifiers);
                self.key_listener = Some(key);
                self.modifiers_listener = Some(modifiers);
            }
            None => log::warn!("{}: seat is gone, not subscribing", self.id),
        }

        log::info!("{}: configured keymap {}", self.id, names);
        Ok(())
    }

    /// Resolve `event` under `mode` and apply it to that mode's pressed-set
    fn track(&mut self, event: &KeyEvent, mode: ResolveMode) -> Resolved {
        let resolved = resolve(&self.hardware, event.keycode(), mode);
        self.pressed_mut(mode).update(&resolved.keysyms, event.state);
        resolved
    }

    fn dispatch<D>(
        &self,
        dispatcher: &mut D,
        mode: ResolveMode,
        resolved: &Resolved,
    ) -> bool
    where
        D: BindingDispatcher + ?Sized,
    {
        let chord = Chord {
            device: self.id,
            mode,
            keysyms: &resolved.keysyms,
            modifiers: resolved.modifiers,
            pressed: self.pressed(mode),
        };
        dispatcher.try_dispatch(&chord)
    }

    /// Run one key event through both resolution tracks.
    ///
    /// Both pressed-sets see every transition. Dispatch is tried on press only,
    /// translated first; anything left unhandled goes to the seat.
    pub fn handle_key<D>(&mut self, event: &KeyEvent, dispatcher: &mut D) -> KeyOutcome
    where
        D: BindingDispatcher + ?Sized,
    {
        if self.key_listener.is_none() {
            return KeyOutcome::Ignored;
        }
        let pressed = event.state == KeyState::Pressed;
        let mut handled = None;

        for mode in ResolveMode::ALL {
            let resolved = self.track(event, mode);
            if pressed && handled.is_none() && self.dispatch(dispatcher, mode, &resolved) {
                log::debug!("{}: {} handled by {} binding", self.id, event.key, mode);
                handled = Some(mode);
            }
        }

        match handled {
            Some(mode) => KeyOutcome::Handled(mode),
            None => {
                self.forward_key(event);
                KeyOutcome::Forwarded
            }
        }
    }

    fn forward_key(&self, event: &KeyEvent) {
        let Some(seat) = self.seat.upgrade() else {
            log::warn!("{}: seat is gone, dropping {} {}", self.id, event.key, event.state);
            return;
        };
        let mut seat = seat.write();
        if !seat.is_subscribed(self.id, SubscriptionKind::Key) {
            log::debug!("{}: not a key listener of seat {}", self.id, seat.name());
            return;
        }
        seat.set_active_keyboard(self.id);
        seat.notify_key(event.time_msec, event.key, event.state);
    }

    /// Forward the current modifier state to the seat
    pub fn handle_modifiers(&mut self) {
        if self.modifiers_listener.is_none() {
            return;
        }
        let Some(seat) = self.seat.upgrade() else {
            log::warn!("{}: seat is gone, dropping modifiers", self.id);
            return;
        };
        let modifiers = self.hardware.modifiers();
        log::trace!("{}: modifiers [{}]", self.id, modifiers);
        let mut seat = seat.write();
        if !seat.is_subscribed(self.id, SubscriptionKind::Modifiers) {
            log::debug!("{}: not a modifiers listener of seat {}", self.id, seat.name());
            return;
        }
        seat.set_active_keyboard(self.id);
        seat.notify_modifiers(modifiers);
    }

    /// Feed a hardware key transition: handle the key against the state
    /// before the transition, apply it, then report changed modifiers.
    pub fn notify_key<D>(&mut self, event: &KeyEvent, dispatcher: &mut D) -> KeyOutcome
    where
        D: BindingDispatcher + ?Sized,
    {
        let outcome = self.handle_key(event, dispatcher);
        if self.hardware.update_key(event.keycode(), event.state) {
            self.handle_modifiers();
        }
        outcome
    }

    /// Detach the device. Subscriptions are removed before anything else
    /// is released.
    pub fn destroy(mut self) {
        self.key_listener = None;
        self.modifiers_listener = None;
        if let Some(seat) = self.seat.upgrade() {
            seat.write().remove_device(self.id);
        }
        log::debug!("Destroyed {}", self.id);
    }
}

impl<H: HardwareKeyboard> fmt::Debug for KeyboardDevice<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardDevice")
            .field("id", &self.id)
            .field("configured", &self.is_configured())
            .field("subscribed", &self.is_subscribed())
            .field("pressed_translated", &self.pressed_translated)
            .field("pressed_raw", &self.pressed_raw)
            .finish_non_exhaustive()
    }
}
