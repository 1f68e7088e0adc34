use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::targets::TargetsConfig;

const CONFIG_FILE_NAME: &str = "presetenv.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pass `loose` to every plugin that supports it
    #[serde(default)]
    pub loose: bool,

    /// Module transform: "amd", "umd", "systemjs", "commonjs" or false
    #[serde(default)]
    pub modules: ModulesSetting,

    /// Plugins and built-ins to always use
    #[serde(default)]
    pub include: Vec<String>,

    /// Plugins and built-ins to never use
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Select polyfills for the targets as well as syntax plugins
    #[serde(default, alias = "useBuiltIns")]
    pub use_built_ins: bool,

    /// Log the resolved targets and selected plugins
    #[serde(default)]
    pub debug: bool,

    /// Environments to support
    #[serde(default)]
    pub targets: TargetsConfig,
}

/// Raw `modules` option, validated when the preset is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModulesSetting {
    Flag(bool),
    Name(String),
}

impl Default for ModulesSetting {
    fn default() -> Self {
        Self::Name("commonjs".to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loose: false,
            modules: ModulesSetting::default(),
            include: Vec::new(),
            exclude: Vec::new(),
            use_built_ins: false,
            debug: false,
            targets: TargetsConfig::new(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::find_config_file()?,
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

            Self::parse(&content, &config_path)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
        } else if path.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display())
        } else {
            Ok(Config::default())
        }
    }

    /// Parse TOML, or JSON when the file has a `.json` extension
    fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    /// Initialize configuration file
    pub fn init(output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let config_path = output_dir.join(CONFIG_FILE_NAME);
        let config = Config::default();

        let content = toml::to_string_pretty(&config)
            .context("Failed to serialize default configuration")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(config_path)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<PathBuf> {
        let current_dir = std::env::current_dir()
            .context("Failed to get current directory")?;

        // Look for presetenv.toml in current directory and parents
        let mut dir = current_dir.as_path();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("presetenv").join("config.toml");
            if config_path.exists() {
                return Ok(config_path);
            }
        }

        // Return default path (may not exist)
        Ok(current_dir.join(CONFIG_FILE_NAME))
    }
}
