// Keychord Input Layer - Device Filtering
// Explicit device selection and keyboard autodetection

/// Which input devices to open.
///
/// With no names every keyboard is used; otherwise exactly the devices whose
/// name or path is listed, keyboard or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    names: Vec<String>,
}

impl DeviceFilter {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that picks every keyboard
    pub fn autodetect() -> Self {
        Self::default()
    }

    pub fn is_autodetect(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Check if a device should be used
    pub fn matches(&self, device_name: &str, device_path: &str, is_keyboard: bool) -> bool {
        if self.is_autodetect() {
            return is_keyboard;
        }
        self.names
            .iter()
            .any(|name| name == device_path || name == device_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_by_path() {
        let filter = DeviceFilter::new(["/dev/input/event0"]);
        assert!(filter.matches("Logitech Keyboard", "/dev/input/event0", true));
    }

    #[test]
    fn test_matches_by_name() {
        let filter = DeviceFilter::new(["Logitech Keyboard"]);
        assert!(filter.matches("Logitech Keyboard", "/dev/input/event5", true));
        assert!(!filter.matches("Other Device", "/dev/input/event1", true));
    }

    #[test]
    fn test_explicit_match_ignores_detection() {
        let filter = DeviceFilter::new(["Macro Pad"]);
        assert!(filter.matches("Macro Pad", "/dev/input/event9", false));
    }

    #[test]
    fn test_autodetect() {
        let filter = DeviceFilter::autodetect();
        assert!(filter.is_autodetect());
        assert!(filter.matches("Generic Keyboard", "/dev/input/event0", true));
        assert!(!filter.matches("Generic Mouse", "/dev/input/event1", false));
    }
}
