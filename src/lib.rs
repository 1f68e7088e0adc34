//! presetenv - decide which JavaScript transforms and polyfills a set of
//! target environments needs
//!
//! Given the environments a bundle has to run in (browser versions, Node.js,
//! Electron, a browserslist query, a minifier that only understands ES5),
//! presetenv resolves them into canonical minimum versions and decides for
//! every syntax plugin and built-in polyfill whether at least one target
//! lacks native support.
//!
//! # Features
//!
//! - Version normalization (`49`, `6.9`, `"1.0"`, `"10.13.0"`)
//! - Browser queries (`"last 2 Chrome versions"`, `"ie >= 10"`)
//! - Electron versions mapped to their Chromium release
//! - `node: true` resolved to the installed Node.js version
//! - Include/exclude lists and built-in polyfill selection
//!
//! # Example
//!
//! ```rust,no_run
//! use presetenv::{is_plugin_required, Registry, TargetResolver};
//! use presetenv::targets::targets_config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let targets = TargetResolver::new()?
//!         .resolve(&targets_config([("chrome", 49u64)]))?;
//!
//!     let registry = Registry::bundled()?;
//!     for (name, support) in registry.plugins() {
//!         if is_plugin_required(&targets, support) {
//!             println!("{}", name);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod browsers;
pub mod cli;
pub mod config;
pub mod electron;
pub mod environment;
pub mod errors;
pub mod plan;
pub mod preset;
pub mod registry;
pub mod requirement;
pub mod targets;
pub mod version;

// Re-export main types for convenience
pub use config::Config;
pub use environment::Environment;
pub use errors::{PresetError, Result};
pub use plan::{transform_includes_and_excludes, InclusionPlan};
pub use preset::{ModuleType, Preset, PresetResult};
pub use registry::{is_built_in, Registry};
pub use requirement::{is_plugin_required, Support, SupportTable};
pub use targets::{TargetResolver, TargetValue, Targets, TargetsConfig};
pub use version::{normalize, RawVersion, VersionTriple};

/// Current version of presetenv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve targets with the bundled data and the local Node.js runtime.
pub fn get_targets(config: &TargetsConfig) -> Result<Targets> {
    TargetResolver::new()?.resolve(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.chars().next().unwrap().is_ascii_digit());
    }

    #[test]
    fn test_get_targets() {
        let targets = get_targets(&targets::targets_config([("firefox", "52")])).unwrap();
        assert_eq!(targets.get(Environment::Firefox), Some(VersionTriple::new(52, 0, 0)));
    }
}
