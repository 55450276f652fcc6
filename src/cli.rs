//! Command-line interface implementation

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, ResolverConfig};
use crate::dom::MemoryDocument;
use crate::expression::{extract_distinct, scan};
use crate::host::StyleHost;
use crate::resolver::preload_style_content;

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Themevars - scan and resolve CSS custom property expressions
#[derive(Parser)]
#[command(name = "themevars")]
#[command(about = "Themevars - scan and resolve CSS custom property expressions")]
#[command(version)]
pub struct Cli {
    /// Path to themevars.toml (discovered from the current directory if omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the top-level expression ranges of a CSS value as JSON
    Scan {
        /// CSS value, e.g. "var(--a) 1px solid"
        value: String,
    },
    /// List the distinct var() expressions used by a theme's record
    Extract {
        /// Theme TOML file with a [record] table
        theme: PathBuf,
    },
    /// Resolve a theme's record against its variables and print JSON
    Resolve {
        /// Theme TOML file with [variables] and [record] tables
        theme: PathBuf,

        /// Emit #rrggbb for opaque colors
        #[arg(long)]
        alpha_optional: bool,

        /// Prefix for scratch custom properties
        #[arg(long)]
        scratch_prefix: Option<String>,
    },
    /// Print :root{...} preload content for a theme's [defaults]
    Preload {
        /// Theme TOML file with [variables] and [defaults] tables
        theme: PathBuf,
    },
    /// Print :root{...} content with only the valid color variables
    Sanitize {
        /// Theme TOML file with a [variables] table
        theme: PathBuf,

        /// Regex color variable names must match
        #[arg(long)]
        pattern: Option<String>,
    },
}

/// A theme description file
///
/// ```toml
/// [variables]
/// "--dh-color-bg" = "#1a171a"
///
/// [record]
/// background = "var(--dh-color-bg)"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeFile {
    /// Custom properties declared on the document root
    #[serde(default)]
    pub variables: toml::Table,
    /// Values to resolve, in file order
    #[serde(default)]
    pub record: toml::Table,
    /// Preload variables and their default values
    #[serde(default)]
    pub defaults: toml::Table,
}

impl ThemeFile {
    /// Read and parse a theme file
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            fs::read_to_string(path).map_err(|e| format!("Cannot open theme file '{}': {}", path.display(), e))?;
        toml::from_str(&contents).map_err(|e| format!("Cannot parse theme file '{}': {}", path.display(), e))
    }

    pub fn variables(&self) -> Result<Vec<(String, String)>, String> {
        string_entries(&self.variables, "variables")
    }

    pub fn record(&self) -> Result<Vec<(String, String)>, String> {
        string_entries(&self.record, "record")
    }

    pub fn defaults(&self) -> Result<Vec<(String, String)>, String> {
        string_entries(&self.defaults, "defaults")
    }

    /// A document whose root declares the theme's variables
    pub fn document(&self) -> Result<MemoryDocument, String> {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        for (name, value) in self.variables()? {
            doc.set_property(&root, &name, &value);
        }
        Ok(doc)
    }
}

/// Flatten a table of string values, keeping file order
fn string_entries(table: &toml::Table, section: &str) -> Result<Vec<(String, String)>, String> {
    table
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(s) => Ok((key.clone(), s.to_string())),
            None => Err(format!("[{}] '{}' must be a string, found {}", section, key, value.type_str())),
        })
        .collect()
}

/// One scanned expression in `scan` output
#[derive(Debug, Serialize)]
struct ScannedExpression<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match cli.command {
        Commands::Scan { value } => run_scan(&value),
        Commands::Extract { theme } => run_extract(&theme),
        Commands::Resolve { theme, alpha_optional, scratch_prefix } => {
            let overrides = CliOverrides {
                scratch_prefix,
                alpha_optional: alpha_optional.then_some(true),
                ..Default::default()
            };
            match merge_cli_overrides(config, &overrides) {
                Ok(config) => run_resolve(&theme, &config),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(EXIT_INVALID_ARGS)
                }
            }
        }
        Commands::Preload { theme } => run_preload(&theme),
        Commands::Sanitize { theme, pattern } => {
            let overrides = CliOverrides { color_var_pattern: pattern, ..Default::default() };
            match merge_cli_overrides(config, &overrides) {
                Ok(config) => run_sanitize(&theme, &config),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(EXIT_INVALID_ARGS)
                }
            }
        }
    }
}

/// Install env_logger; RUST_LOG takes precedence over -v
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A logger may already be installed when embedded
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Print JSON to stdout
fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn load_theme(path: &Path) -> Result<ThemeFile, ExitCode> {
    ThemeFile::load(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Execute the scan command
fn run_scan(value: &str) -> ExitCode {
    let expressions: Vec<ScannedExpression> = scan(value)
        .into_iter()
        .map(|range| ScannedExpression { start: range.start, end: range.end, text: range.text(value) })
        .collect();
    print_json(&expressions)
}

/// Execute the extract command
fn run_extract(theme_path: &Path) -> ExitCode {
    let theme = match load_theme(theme_path) {
        Ok(theme) => theme,
        Err(code) => return code,
    };

    let record = match theme.record() {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut expressions: Vec<String> = extract_distinct(record).into_iter().collect();
    expressions.sort();
    print_json(&expressions)
}

/// Execute the resolve command
fn run_resolve(theme_path: &Path, config: &ResolverConfig) -> ExitCode {
    let theme = match load_theme(theme_path) {
        Ok(theme) => theme,
        Err(code) => return code,
    };

    let (mut doc, record) = match theme.document().and_then(|doc| Ok((doc, theme.record()?))) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let root = doc.root();
    let resolved = match config.record_resolver().resolve(&mut doc, &root, record) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let object: serde_json::Map<String, serde_json::Value> =
        resolved.into_iter().map(|(key, value)| (key, serde_json::Value::String(value))).collect();
    print_json(&object)
}

/// Execute the preload command
fn run_preload(theme_path: &Path) -> ExitCode {
    let theme = match load_theme(theme_path) {
        Ok(theme) => theme,
        Err(code) => return code,
    };

    let (mut doc, defaults) = match theme.document().and_then(|doc| Ok((doc, theme.defaults()?))) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let root = doc.root();
    let defaults = defaults.into_iter().collect();
    match preload_style_content(&mut doc, &root, &defaults) {
        Ok(content) => {
            println!("{}", content);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the sanitize command
fn run_sanitize(theme_path: &Path, config: &ResolverConfig) -> ExitCode {
    let theme = match load_theme(theme_path) {
        Ok(theme) => theme,
        Err(code) => return code,
    };

    let variables = match theme.variables() {
        Ok(variables) => variables,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Pattern was validated with the rest of the config
    let policy = match config.color_var_policy() {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let doc = MemoryDocument::new();
    println!("{}", policy.color_var_style_content(&doc, variables));
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME: &str = r##"
[variables]
"--dh-color-bg" = "#1a171a"
"--dh-color-fg" = "var(--dh-color-bg)"
"--space" = "4px"

[record]
zeta = "var(--dh-color-bg)"
alpha = "var(--space) solid var(--dh-color-fg)"
plain = "Arial"

[defaults]
"--dh-color-bg" = "#000"
"--dh-color-spinner" = "#0af"
"##;

    #[test]
    fn test_theme_file_keeps_order() {
        let theme: ThemeFile = toml::from_str(THEME).unwrap();
        let keys: Vec<String> = theme.record().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "plain"]);
    }

    #[test]
    fn test_theme_file_document() {
        let theme: ThemeFile = toml::from_str(THEME).unwrap();
        let mut doc = theme.document().unwrap();
        let root = doc.root();
        let resolved = ResolverConfig::default()
            .record_resolver()
            .resolve(&mut doc, &root, theme.record().unwrap())
            .unwrap();

        assert_eq!(resolved[0], ("zeta".to_string(), "#1a171aff".to_string()));
        assert_eq!(resolved[1], ("alpha".to_string(), "4px solid #1a171a".to_string()));
        assert_eq!(resolved[2], ("plain".to_string(), "Arial".to_string()));
    }

    #[test]
    fn test_non_string_entry_rejected() {
        let theme: ThemeFile = toml::from_str("[record]\nwidth = 3\n").unwrap();
        let err = theme.record().unwrap_err();
        assert_eq!(err, "[record] 'width' must be a string, found integer");
    }

    #[test]
    fn test_empty_theme_file() {
        let theme: ThemeFile = toml::from_str("").unwrap();
        assert!(theme.record().unwrap().is_empty());
        assert!(theme.defaults().unwrap().is_empty());
    }

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::parse_from(["themevars", "-v", "resolve", "theme.toml", "--alpha-optional"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Resolve { theme, alpha_optional, scratch_prefix } => {
                assert_eq!(theme, PathBuf::from("theme.toml"));
                assert!(alpha_optional);
                assert!(scratch_prefix.is_none());
            }
            _ => panic!("expected resolve command"),
        }
    }
}
