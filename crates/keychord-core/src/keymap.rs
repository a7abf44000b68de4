// Keychord Keymap Names
// Rule/model/layout/variant/options selection and the keymap compiler interface

use std::fmt;

/// Environment variables consulted for defaults, in field order
const ENV_RULES: &str = "XKB_DEFAULT_RULES";
const ENV_MODEL: &str = "XKB_DEFAULT_MODEL";
const ENV_LAYOUT: &str = "XKB_DEFAULT_LAYOUT";
const ENV_VARIANT: &str = "XKB_DEFAULT_VARIANT";
const ENV_OPTIONS: &str = "XKB_DEFAULT_OPTIONS";

/// Names selecting a keymap, each independently optional.
///
/// Unset fields let the keymap compiler pick its own default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleNames {
    pub rules: Option<String>,
    pub model: Option<String>,
    pub layout: Option<String>,
    pub variant: Option<String>,
    pub options: Option<String>,
}

impl RuleNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Read defaults from the `XKB_DEFAULT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build names from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            rules: get(ENV_RULES),
            model: get(ENV_MODEL),
            layout: get(ENV_LAYOUT),
            variant: get(ENV_VARIANT),
            options: get(ENV_OPTIONS),
        }
    }

    /// Per-field fallback: fields set here win, unset ones come from `fallback`
    pub fn or(&self, fallback: &RuleNames) -> RuleNames {
        RuleNames {
            rules: self.rules.clone().or_else(|| fallback.rules.clone()),
            model: self.model.clone().or_else(|| fallback.model.clone()),
            layout: self.layout.clone().or_else(|| fallback.layout.clone()),
            variant: self.variant.clone().or_else(|| fallback.variant.clone()),
            options: self.options.clone().or_else(|| fallback.options.clone()),
        }
    }

    pub fn rules(&self) -> &str {
        self.rules.as_deref().unwrap_or("")
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("")
    }

    pub fn layout(&self) -> &str {
        self.layout.as_deref().unwrap_or("")
    }

    pub fn variant(&self) -> &str {
        self.variant.as_deref().unwrap_or("")
    }

    pub fn options(&self) -> &str {
        self.options.as_deref().unwrap_or("")
    }
}

impl fmt::Display for RuleNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rules={:?} model={:?} layout={:?} variant={:?} options={:?}",
            self.rules(),
            self.model(),
            self.layout(),
            self.variant(),
            self.options()
        )
    }
}

/// Errors from keymap compilation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("unknown rules: {0}")]
    UnknownRules(String),

    #[error("unknown layout: {0}")]
    UnknownLayout(String),

    #[error("unknown variant '{variant}' for layout '{layout}'")]
    UnknownVariant { layout: String, variant: String },

    #[error("keymap compilation failed for {0}")]
    Compile(String),
}

/// Keymap resolution service: turns names into a compiled keymap
pub trait KeymapCompiler {
    type Keymap: Clone;

    fn compile(&self, names: &RuleNames) -> Result<Self::Keymap, KeymapError>;
}
