//! Validation of externally supplied theme color variables
//!
//! Themes provided by an embedding application arrive as plain name/value
//! pairs. Only pairs whose name matches the color variable pattern and whose
//! value is a valid color are kept; the rest are dropped before the theme is
//! turned into style content.

use crate::host::StyleHost;
use regex::Regex;

/// Default pattern for theme color variable names
pub const DEFAULT_COLOR_VAR_PATTERN: &str = "^--dh-color-[a-z0-9_-]+$";

/// Decides which custom properties are acceptable theme color variables
#[derive(Debug, Clone)]
pub struct ColorVarPolicy {
    name_pattern: Regex,
}

impl Default for ColorVarPolicy {
    fn default() -> Self {
        Self { name_pattern: Regex::new(DEFAULT_COLOR_VAR_PATTERN).expect("default pattern is valid") }
    }
}

impl ColorVarPolicy {
    /// Build a policy from a custom name pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { name_pattern: Regex::new(pattern)? })
    }

    pub fn pattern(&self) -> &str {
        self.name_pattern.as_str()
    }

    /// Whether `name` is a color variable name and `value` a color the host accepts
    pub fn is_valid_color_var<H: StyleHost>(&self, host: &H, name: &str, value: &str) -> bool {
        self.name_pattern.is_match(name) && host.supports_color(value)
    }

    /// Build `:root{name:value;...}` from the valid pairs, in input order.
    ///
    /// Returns an empty string when no pair is valid.
    ///
    /// ```
    /// use themevars::dom::MemoryDocument;
    /// use themevars::theme::ColorVarPolicy;
    ///
    /// let doc = MemoryDocument::new();
    /// let policy = ColorVarPolicy::default();
    /// let content = policy.color_var_style_content(
    ///     &doc,
    ///     [("--dh-color-fg", "#fff"), ("--dh-color-bg", "not a color"), ("--other", "red")],
    /// );
    /// assert_eq!(content, ":root{--dh-color-fg:#fff;}");
    /// ```
    pub fn color_var_style_content<H, I, K, V>(&self, host: &H, vars: I) -> String
    where
        H: StyleHost,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let sanitized: Vec<String> = vars
            .into_iter()
            .filter(|(name, value)| self.is_valid_color_var(host, name.as_ref(), value.as_ref()))
            .map(|(name, value)| format!("{}:{};", name.as_ref(), value.as_ref()))
            .collect();

        if sanitized.is_empty() {
            String::new()
        } else {
            format!(":root{{{}}}", sanitized.concat())
        }
    }
}

/// Check a pair against the default color variable policy
pub fn is_valid_color_var<H: StyleHost>(host: &H, name: &str, value: &str) -> bool {
    ColorVarPolicy::default().is_valid_color_var(host, name, value)
}
