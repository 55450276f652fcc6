//! Configuration schema types for `themevars.toml`
//!
//! Defines the structure and validation rules for resolver configuration.

use crate::batch::{RecordResolver, DEFAULT_SCRATCH_PREFIX};
use crate::theme::{ColorVarPolicy, DEFAULT_COLOR_VAR_PATTERN};
use serde::{Deserialize, Serialize};

/// Batch resolver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSection {
    /// Prefix for scratch custom properties (`--{prefix}-{index}`)
    #[serde(default = "default_scratch_prefix")]
    pub scratch_prefix: String,
    /// Emit `#rrggbb` for opaque colors instead of `#rrggbbff`
    #[serde(default)]
    pub alpha_optional: bool,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self { scratch_prefix: default_scratch_prefix(), alpha_optional: false }
    }
}

fn default_scratch_prefix() -> String {
    DEFAULT_SCRATCH_PREFIX.to_string()
}

/// Theme variable settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSection {
    /// Regex that theme color variable names must match
    #[serde(default = "default_color_var_pattern")]
    pub color_var_pattern: String,
}

impl Default for ThemeSection {
    fn default() -> Self {
        Self { color_var_pattern: default_color_var_pattern() }
    }
}

fn default_color_var_pattern() -> String {
    DEFAULT_COLOR_VAR_PATTERN.to_string()
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub resolver: ResolverSection,
    #[serde(default)]
    pub theme: ThemeSection,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "resolver.scratch_prefix")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "themevars.toml: '{}' {}", self.field, self.message)
    }
}

impl ResolverConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        // The prefix becomes part of a custom property name
        let prefix = &self.resolver.scratch_prefix;
        if prefix.is_empty()
            || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.push(ConfigValidationError {
                field: "resolver.scratch_prefix".to_string(),
                message: "must be a non-empty identifier of letters, digits, '-' or '_'".to_string(),
            });
        }

        if let Err(e) = ColorVarPolicy::new(&self.theme.color_var_pattern) {
            errors.push(ConfigValidationError {
                field: "theme.color_var_pattern".to_string(),
                message: format!("is not a valid regex: {}", e),
            });
        }

        errors
    }

    /// Build a batch resolver from the `[resolver]` section
    pub fn record_resolver(&self) -> RecordResolver {
        RecordResolver::new()
            .with_scratch_prefix(self.resolver.scratch_prefix.clone())
            .with_alpha_optional(self.resolver.alpha_optional)
    }

    /// Build the color variable policy from the `[theme]` section
    pub fn color_var_policy(&self) -> Result<ColorVarPolicy, regex::Error> {
        ColorVarPolicy::new(&self.theme.color_var_pattern)
    }
}
