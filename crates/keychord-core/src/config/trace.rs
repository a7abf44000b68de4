// Keychord Trace Files
// Recorded key events for replay through a virtual keyboard

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::hardware::{KeyEvent, KeyState};
use crate::key::Key;

use super::parser::ConfigError;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TraceToml {
    #[serde(default)]
    event: Vec<TraceEventToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TraceEventToml {
    key: String,
    state: KeyState,
    /// Milliseconds; defaults to the previous event's time
    #[serde(default)]
    time: Option<u32>,
}

/// Parse `[[event]]` entries into key events, in file order
pub fn parse_trace(content: &str) -> Result<Vec<KeyEvent>, ConfigError> {
    let trace: TraceToml =
        toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

    let mut time_msec = 0;
    trace
        .event
        .into_iter()
        .map(|event| {
            let key: Key = event
                .key
                .parse()
                .map_err(|_| ConfigError::InvalidKey(event.key.clone()))?;
            time_msec = event.time.unwrap_or(time_msec);
            Ok(KeyEvent::new(time_msec, key, event.state))
        })
        .collect()
}

/// Read and parse a trace file
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<KeyEvent>, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_trace(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let events = parse_trace(
            r#"
            [[event]]
            key = "left_alt"
            state = "press"
            time = 100

            [[event]]
            key = "2"
            state = "pressed"

            [[event]]
            key = "2"
            state = "release"
            time = 180
        "#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                KeyEvent::pressed(100, Key::LEFT_ALT),
                KeyEvent::pressed(100, Key::KEY_2),
                KeyEvent::released(180, Key::KEY_2),
            ]
        );
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = parse_trace("[[event]]\nkey = \"nokey\"\nstate = \"press\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(name) if name == "nokey"));
    }

    #[test]
    fn test_bad_state_is_an_error() {
        let err = parse_trace("[[event]]\nkey = \"a\"\nstate = \"tap\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
