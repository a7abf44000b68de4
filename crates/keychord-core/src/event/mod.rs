// Keychord Event Handling
// evdev polling for live keyboards

pub mod r#loop;

pub use r#loop::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult, PolledEvent};
