// Keychord Seat
// The shared seat a keyboard forwards unhandled input to

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::hardware::KeyState;
use crate::key::Key;
use crate::modifier::ModifierMask;

/// Identifies one keyboard device within a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keyboard#{}", self.0)
    }
}

/// Delivery of unhandled input to the focused client.
pub trait Passthrough: Send + Sync {
    /// The seat switched the keyboard whose keymap and state clients see
    fn set_active_keyboard(&mut self, device: DeviceId);

    /// Forward a key transition with its original evdev code
    fn notify_key(&mut self, time_msec: u32, key: Key, state: KeyState);

    /// Forward the active keyboard's new modifier state
    fn notify_modifiers(&mut self, modifiers: ModifierMask);
}

/// Passthrough that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPassthrough;

impl Passthrough for NullPassthrough {
    fn set_active_keyboard(&mut self, _device: DeviceId) {}
    fn notify_key(&mut self, _time_msec: u32, _key: Key, _state: KeyState) {}
    fn notify_modifiers(&mut self, _modifiers: ModifierMask) {}
}

/// Kind of event a device listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    Key,
    Modifiers,
}

/// Shared handle to a seat. Devices keep only a weak reference.
pub type SeatHandle = Arc<RwLock<Seat>>;

pub struct Seat {
    name: String,
    passthrough: Box<dyn Passthrough>,
    active_keyboard: Option<DeviceId>,
    listeners: Vec<(DeviceId, SubscriptionKind)>,
}

impl Seat {
    pub fn new(name: impl Into<String>, passthrough: impl Passthrough + 'static) -> Self {
        Self {
            name: name.into(),
            passthrough: Box::new(passthrough),
            active_keyboard: None,
            listeners: Vec::new(),
        }
    }

    /// Wrap the seat for sharing between devices
    pub fn into_handle(self) -> SeatHandle {
        Arc::new(RwLock::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active_keyboard(&self) -> Option<DeviceId> {
        self.active_keyboard
    }

    /// Make `device` the active keyboard. Repeated calls for the same device
    /// do not reach the passthrough again.
    pub fn set_active_keyboard(&mut self, device: DeviceId) {
        if self.active_keyboard == Some(device) {
            return;
        }
        log::debug!("Seat {}: active keyboard is now {}", self.name, device);
        self.active_keyboard = Some(device);
        self.passthrough.set_active_keyboard(device);
    }

    pub fn notify_key(&mut self, time_msec: u32, key: Key, state: KeyState) {
        self.passthrough.notify_key(time_msec, key, state);
    }

    pub fn notify_modifiers(&mut self, modifiers: ModifierMask) {
        self.passthrough.notify_modifiers(modifiers);
    }

    /// Whether `device` currently listens for `kind` events
    pub fn is_subscribed(&self, device: DeviceId, kind: SubscriptionKind) -> bool {
        self.listeners.contains(&(device, kind))
    }

    /// Number of live subscriptions across all devices
    pub fn subscription_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn add_listener(&mut self, device: DeviceId, kind: SubscriptionKind) {
        self.listeners.push((device, kind));
    }

    pub(crate) fn remove_listener(&mut self, device: DeviceId, kind: SubscriptionKind) {
        if let Some(pos) = self.listeners.iter().position(|l| *l == (device, kind)) {
            self.listeners.swap_remove(pos);
        }
    }

    /// Forget a detached device's listeners. The active keyboard is left as
    /// the passthrough last saw it until another device becomes active.
    pub(crate) fn remove_device(&mut self, device: DeviceId) {
        self.listeners.retain(|(id, _)| *id != device);
    }
}

impl fmt::Debug for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seat")
            .field("name", &self.name)
            .field("active_keyboard", &self.active_keyboard)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
