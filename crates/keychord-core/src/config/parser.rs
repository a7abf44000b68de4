// Keychord Config Parser - TOML with Serde
// Per-device keymap names, bindings and device selection

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::binding::{BindingError, BindingTable, CommandExecutor, KeyCombo};
use crate::keymap::RuleNames;

/// Input table that applies to every device
pub const WILDCARD: &str = "*";

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid binding {keys:?}: {source}")]
    InvalidBinding {
        keys: String,
        #[source]
        source: BindingError,
    },

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Keymap settings per device name, `*` for all devices
    #[serde(default)]
    pub input: HashMap<String, InputToml>,

    /// Keybindings, matched in file order
    #[serde(default)]
    pub binding: Vec<BindingToml>,

    /// Device filter configuration
    #[serde(default)]
    pub devices: Option<DevicesToml>,
}

/// Keymap names for one input
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct InputToml {
    pub xkb_rules: Option<String>,
    pub xkb_model: Option<String>,
    pub xkb_layout: Option<String>,
    pub xkb_variant: Option<String>,
    pub xkb_options: Option<String>,
}

impl InputToml {
    fn rule_names(&self) -> RuleNames {
        RuleNames {
            rules: self.xkb_rules.clone(),
            model: self.xkb_model.clone(),
            layout: self.xkb_layout.clone(),
            variant: self.xkb_variant.clone(),
            options: self.xkb_options.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingToml {
    pub keys: String,
    pub command: String,
}

/// Device filtering configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DevicesToml {
    /// Explicit device names/paths to use
    #[serde(default)]
    pub only: Vec<String>,
}

/// Validated configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    inputs: HashMap<String, RuleNames>,
    bindings: Vec<(String, String)>,
    devices: Vec<String>,
    source_path: Option<PathBuf>,
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml(&content)?;
        config.source_path = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Default config path (~/.config/keychord/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keychord").join("config.toml"))
    }

    /// Load the default config file, or an empty config when there is none
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_toml_path(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Keymap names configured for `device`.
    ///
    /// Fields set for the device itself win over the `*` table.
    pub fn rule_names(&self, device: &str) -> RuleNames {
        let wildcard = self.inputs.get(WILDCARD).cloned().unwrap_or_default();
        match self.inputs.get(device) {
            Some(names) => names.or(&wildcard),
            None => wildcard,
        }
    }

    /// Device names or paths to restrict live input to
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Build a binding table in file order
    pub fn binding_table<E: CommandExecutor>(&self, executor: E) -> BindingTable<E> {
        let mut table = BindingTable::new(executor);
        for (keys, command) in &self.bindings {
            if let Err(err) = table.bind(keys, command.clone()) {
                log::warn!("Skipping binding {:?}: {}", keys, err);
            }
        }
        table
    }
}

impl ConfigToml {
    fn to_config(&self) -> Result<Config, ConfigError> {
        let inputs = self
            .input
            .iter()
            .map(|(name, input)| (name.clone(), input.rule_names()))
            .collect();

        let mut bindings = Vec::with_capacity(self.binding.len());
        for entry in &self.binding {
            if let Err(source) = entry.keys.parse::<KeyCombo>() {
                return Err(ConfigError::InvalidBinding {
                    keys: entry.keys.clone(),
                    source,
                });
            }
            bindings.push((entry.keys.clone(), entry.command.clone()));
        }

        let devices = self
            .devices
            .as_ref()
            .map(|d| d.only.clone())
            .unwrap_or_default();

        log::debug!(
            "Loaded config: {} inputs, {} bindings",
            self.input.len(),
            bindings.len()
        );
        Ok(Config {
            inputs,
            bindings,
            devices,
            source_path: None,
        })
    }
}
