// Keychord Config
// TOML configuration and recorded key traces

pub mod parser;
pub mod trace;

pub use parser::{Config, ConfigError, ConfigToml, InputToml};
pub use trace::{parse_trace, read_trace};
