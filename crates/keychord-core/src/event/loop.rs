// Keychord evdev Event Loop
// Polls keyboard devices and turns EV_KEY input into key events

use std::os::unix::io::AsRawFd;
use std::time::{SystemTime, UNIX_EPOCH};

use evdev::{Device, EventType, InputEvent};

use crate::hardware::{KeyEvent, KeyState};
use crate::input::{is_keyboard, DeviceCapabilities, DeviceFilter};
use crate::key::Key;
use crate::seat::DeviceId;

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An opened (or openable) input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub path: String,
}

/// Key event annotated with its source device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolledEvent {
    pub device: DeviceId,
    pub event: KeyEvent,
}

/// Event loop over a fixed set of evdev devices.
///
/// Devices are read without grabbing, so other clients keep receiving input.
pub struct EventLoop {
    devices: Vec<(DeviceInfo, Device)>,
    poll_fds: Vec<libc::pollfd>,
}

impl EventLoop {
    /// Open every device accepted by `filter`
    pub fn new(filter: &DeviceFilter) -> EventLoopResult<Self> {
        let devices: Vec<(DeviceInfo, Device)> = Self::enumerate(filter).collect();
        if devices.is_empty() {
            return Err(EventLoopError::DeviceNotFound(
                "No keyboard devices found".to_string(),
            ));
        }
        for (info, _) in &devices {
            log::info!("Using {} {:?} ({})", info.id, info.name, info.path);
        }
        let poll_fds = devices
            .iter()
            .map(|(_, d)| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        Ok(Self { devices, poll_fds })
    }

    /// List the devices `filter` would open
    ///
    /// This is useful for the --list-devices CLI flag.
    pub fn list_devices(filter: &DeviceFilter) -> Vec<DeviceInfo> {
        Self::enumerate(filter).map(|(info, _)| info).collect()
    }

    fn enumerate(filter: &DeviceFilter) -> impl Iterator<Item = (DeviceInfo, Device)> + '_ {
        evdev::enumerate()
            .filter(move |(path, device)| {
                let name = device.name().unwrap_or("Unknown");
                let path = path.to_str().unwrap_or_default();
                filter.matches(name, path, is_keyboard(&capabilities(device)))
            })
            .enumerate()
            .map(|(index, (path, device))| {
                let info = DeviceInfo {
                    id: DeviceId(index as u32),
                    name: device.name().unwrap_or("Unknown").to_string(),
                    path: path.display().to_string(),
                };
                (info, device)
            })
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.devices.iter().map(|(info, _)| info)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Poll for key events with timeout
    ///
    /// `timeout_ms` follows poll(2): 0 returns immediately, -1 waits forever.
    /// Interrupted waits return no events so the caller can check its
    /// shutdown flag. Key repeats are dropped.
    pub fn poll(&mut self, timeout_ms: i32) -> EventLoopResult<Vec<PolledEvent>> {
        let mut events = Vec::new();

        let poll_result = unsafe {
            libc::poll(
                self.poll_fds.as_mut_ptr(),
                self.poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(events);
            }
            return Err(EventLoopError::Io(err));
        }

        if poll_result == 0 {
            return Ok(events);
        }

        for (i, (info, device)) in self.devices.iter_mut().enumerate() {
            if self.poll_fds[i].revents & libc::POLLIN == 0 {
                continue;
            }
            match device.fetch_events() {
                Ok(batch) => events.extend(batch.filter_map(|e| {
                    key_event(&e).map(|event| PolledEvent {
                        device: info.id,
                        event,
                    })
                })),
                Err(err) => log::warn!("{}: read failed: {}", info.id, err),
            }
        }

        Ok(events)
    }
}

fn capabilities(device: &Device) -> DeviceCapabilities {
    let keys = device
        .supported_keys()
        .map(|keys| keys.iter().map(|k| Key(k.code())).collect::<Vec<_>>())
        .unwrap_or_default();
    DeviceCapabilities::new(device.supported_events().contains(EventType::KEY), keys)
}

/// Convert an EV_KEY press or release. Other events yield `None`.
fn key_event(event: &InputEvent) -> Option<KeyEvent> {
    if event.event_type() != EventType::KEY {
        return None;
    }
    let state = KeyState::from_evdev_value(event.value())?;
    Some(KeyEvent::new(
        time_msec(event.timestamp()),
        Key(event.code()),
        state,
    ))
}

/// Milliseconds of a timestamp, truncated to 32 bits like wire event times
fn time_msec(time: SystemTime) -> u32 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}
