// Keychord Core Library
// Keysym translation and chord tracking for keyboard input

pub mod binding;
pub mod builtin;
pub mod device;
pub mod dispatch;
pub mod hardware;
pub mod input;
pub mod key;
pub mod keymap;
pub mod keysym;
pub mod modifier;
pub mod resolve;
pub mod seat;
pub mod state;

#[cfg(feature = "config")]
pub mod config;

#[cfg(feature = "evdev")]
pub mod event;

#[cfg(feature = "xkb")]
pub mod xkb;

pub use binding::{Binding, BindingError, BindingTable, CommandExecutor, KeyCombo};
pub use builtin::{BuiltinCompiler, BuiltinKeyboard, BuiltinKeymap};
pub use device::{KeyOutcome, KeyboardDevice, Subscription};
pub use dispatch::{BindingDispatcher, Chord, NoBindings};
pub use hardware::{HardwareKeyboard, KeyEvent, KeyState, Keysyms, REPEAT_DELAY, REPEAT_RATE};
pub use input::{is_keyboard, DeviceCapabilities, DeviceFilter};
pub use key::{Key, Keycode};
pub use keymap::{KeymapCompiler, KeymapError, RuleNames};
pub use keysym::{Keysym, NO_SYMBOL};
pub use modifier::{is_modifier, ModifierMask};
pub use resolve::{resolve, ResolveMode, Resolved};
pub use seat::{DeviceId, NullPassthrough, Passthrough, Seat, SeatHandle, SubscriptionKind};
pub use state::{PressedSet, PRESSED_KEYSYMS_CAP};

#[cfg(feature = "config")]
pub use config::{Config, ConfigError};

#[cfg(feature = "evdev")]
pub use event::{EventLoop, EventLoopError, EventLoopResult, PolledEvent};

#[cfg(feature = "xkb")]
pub use xkb::{XkbCompiler, XkbKeyboard};
