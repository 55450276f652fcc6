//! Configuration loading and discovery for `themevars.toml`
//!
//! Provides functions to find, load, and override configuration.

use super::schema::ResolverConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "themevars.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse themevars.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the scratch property prefix
    pub scratch_prefix: Option<String>,
    /// Override alpha handling
    pub alpha_optional: Option<bool>,
    /// Override the color variable name pattern
    pub color_var_pattern: Option<String>,
}

/// Find themevars.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for themevars.toml
/// 2. Check XDG_CONFIG_HOME/themevars/themevars.toml (or ~/.config/themevars/themevars.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find themevars.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("themevars").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find themevars.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a themevars.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// default configuration.
pub fn load_config(path: Option<&Path>) -> Result<ResolverConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("Loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(ResolverConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ResolverConfig = toml::from_str(&contents)?;
    validated(config)
}

fn validated(config: ResolverConfig) -> Result<ResolverConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration and re-validate it.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(
    mut config: ResolverConfig,
    overrides: &CliOverrides,
) -> Result<ResolverConfig, ConfigError> {
    if let Some(ref prefix) = overrides.scratch_prefix {
        config.resolver.scratch_prefix = prefix.clone();
    }

    if let Some(alpha_optional) = overrides.alpha_optional {
        config.resolver.alpha_optional = alpha_optional;
    }

    if let Some(ref pattern) = overrides.color_var_pattern {
        config.theme.color_var_pattern = pattern.clone();
    }

    validated(config)
}
