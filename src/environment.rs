use std::fmt;
use std::process::Command;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{PresetError, Result};
use crate::version::VersionTriple;

/// Configuration key holding a browser query.
pub const BROWSERS_KEY: &str = "browsers";

/// Configuration key holding an Electron version.
pub const ELECTRON_KEY: &str = "electron";

/// Configuration key of the minifier toggle.
pub const UGLIFY_KEY: &str = "uglify";

/// A versioned target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Android,
    Chrome,
    Edge,
    Firefox,
    Ie,
    Ios,
    Node,
    Opera,
    Safari,
}

impl Environment {
    pub const ALL: [Environment; 9] = [
        Self::Android,
        Self::Chrome,
        Self::Edge,
        Self::Firefox,
        Self::Ie,
        Self::Ios,
        Self::Node,
        Self::Opera,
        Self::Safari,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Chrome => "chrome",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
            Self::Ie => "ie",
            Self::Ios => "ios",
            Self::Node => "node",
            Self::Opera => "opera",
            Self::Safari => "safari",
        }
    }

    /// Map a browserslist browser name onto an environment. Browsers we
    /// keep no compatibility data for map to `None`.
    pub fn from_browserslist(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "android" => Some(Self::Android),
            "chrome" => Some(Self::Chrome),
            "edge" => Some(Self::Edge),
            "firefox" | "ff" => Some(Self::Firefox),
            "ie" | "explorer" => Some(Self::Ie),
            "ios_saf" | "ios" => Some(Self::Ios),
            "opera" => Some(Self::Opera),
            "safari" => Some(Self::Safari),
            "node" => Some(Self::Node),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| PresetError::unknown_environment(s))
    }
}

/// Reports the version of the runtime hosting the build.
pub trait RuntimeProbe {
    fn current_version(&self, environment: Environment) -> Result<VersionTriple>;
}

/// Asks the installed `node` binary for its version.
#[derive(Debug, Clone)]
pub struct NodeProbe {
    binary: String,
}

impl NodeProbe {
    pub fn new() -> Self {
        Self {
            binary: "node".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for NodeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeProbe for NodeProbe {
    fn current_version(&self, environment: Environment) -> Result<VersionTriple> {
        let unavailable = |source: Option<Box<dyn std::error::Error + Send + Sync>>| {
            PresetError::RuntimeUnavailable {
                runtime: environment.to_string(),
                source,
            }
        };

        if environment != Environment::Node {
            return Err(unavailable(None));
        }

        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(Some(e.into())))?;

        if !output.status.success() {
            return Err(unavailable(None));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} --version reported {}", self.binary, stdout.trim());

        parse_runtime_version(&stdout).map_err(|e| unavailable(Some(e.into())))
    }
}

/// Parse `v18.17.1`-style runtime version output.
pub fn parse_runtime_version(output: &str) -> std::result::Result<VersionTriple, semver::Error> {
    let trimmed = output.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    semver::Version::parse(bare).map(VersionTriple::from)
}

/// Probe returning a fixed version, for callers that already know it.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub VersionTriple);

impl RuntimeProbe for FixedProbe {
    fn current_version(&self, _environment: Environment) -> Result<VersionTriple> {
        Ok(self.0)
    }
}
