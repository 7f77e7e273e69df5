//! Configuration module for ino2cpp.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.ino2cpp/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the binary)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `INO2CPP_` and use double
//! underscores to separate nested levels:
//! - `INO2CPP_OUTPUT_DIR=build` sets `output_dir`
//! - `INO2CPP_PARSER__REJECT_SYNTAX_ERRORS=false` sets `parser.reject_syntax_errors`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the settings file, searched from the current
/// directory upwards
pub const CONFIG_DIR: &str = ".ino2cpp";

const ENV_PREFIX: &str = "INO2CPP_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory receiving the generated `.h`/`.cpp` pair
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Enable debug logging
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Parser settings
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ParserConfig {
    /// Abort a file when its syntax tree contains errors
    #[serde(default = "default_true")]
    pub reject_syntax_errors: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            output_dir: default_output_dir(),
            debug: false,
            parser: ParserConfig::default(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reject_syntax_errors: true,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring
    /// environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels, single underscore
            // stays part of the field name
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.ino2cpp/settings.toml` from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    // Loading reads the process environment, which one test mutates.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert!(!settings.debug);
        assert!(settings.parser.reject_syntax_errors);
    }

    #[test]
    fn test_load_from_toml() {
        let _guard = env_lock();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2
output_dir = "build/generated"
debug = true

[parser]
reject_syntax_errors = false
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.output_dir, PathBuf::from("build/generated"));
        assert!(settings.debug);
        assert!(!settings.parser.reject_syntax_errors);
    }

    #[test]
    fn test_partial_config() {
        let _guard = env_lock();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "debug = true\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert!(settings.debug);
        // Everything else keeps its default
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert!(settings.parser.reject_syntax_errors);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let _guard = env_lock();
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let _guard = env_lock();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "debug = \"not a bool\"\n").unwrap();

        assert!(Settings::load_from(&config_path).is_err());
    }

    #[test]
    fn test_save_settings() {
        let _guard = env_lock();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_DIR).join("settings.toml");

        let mut settings = Settings::default();
        settings.output_dir = PathBuf::from("out");
        settings.parser.reject_syntax_errors = false;

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.output_dir, PathBuf::from("out"));
        assert!(!loaded.parser.reject_syntax_errors);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = env_lock();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "output_dir = \"from-file\"\n").unwrap();

        unsafe {
            std::env::set_var("INO2CPP_PARSER__REJECT_SYNTAX_ERRORS", "false");
        }

        let settings = Settings::load_from(&config_path).unwrap();

        unsafe {
            std::env::remove_var("INO2CPP_PARSER__REJECT_SYNTAX_ERRORS");
        }

        // Config file value is used when no env var targets it
        assert_eq!(settings.output_dir, PathBuf::from("from-file"));
        // Environment variable reaches the nested section
        assert!(!settings.parser.reject_syntax_errors);
    }
}
