// Keychord Input Layer
// Keyboard detection and device selection

mod device;
mod filter;

pub use device::{is_keyboard, DeviceCapabilities};
pub use filter::DeviceFilter;
