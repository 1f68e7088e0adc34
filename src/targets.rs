//! Resolution of user supplied targets into canonical per-environment
//! versions.
//!
//! Precedence, lowest first:
//!
//! 1. releases matched by the `browsers` query (lowest release per browser);
//! 2. explicit root-level entries, which always replace query results;
//! 3. `electron`, folded into `chrome` keeping the lower of the two.
//!
//! `node: true` (or `"current"`) asks the [`RuntimeProbe`] for the running
//! version. `uglify: true` sets the minifier toggle; `false` drops it.

use std::collections::BTreeMap;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browsers::{release_start, BrowserQuery, Browserslist};
use crate::electron::EmbeddingTable;
use crate::environment::{
    Environment, NodeProbe, RuntimeProbe, BROWSERS_KEY, ELECTRON_KEY, UGLIFY_KEY,
};
use crate::errors::{PresetError, Result};
use crate::version::{normalize_for, RawVersion, VersionTriple};

const CURRENT_SENTINEL: &str = "current";

/// A single value of the `targets` configuration map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetValue {
    Flag(bool),
    Version(RawVersion),
    Queries(Vec<String>),
}

/// Targets as written in configuration. `None` stands for an explicit null.
pub type TargetsConfig = BTreeMap<String, Option<TargetValue>>;

/// Canonical targets: at most one version per environment plus the
/// minifier toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Targets {
    #[serde(flatten)]
    versions: BTreeMap<Environment, VersionTriple>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    uglify: bool,
}

impl Targets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, environment: Environment, version: VersionTriple) -> Self {
        self.versions.insert(environment, version);
        self
    }

    pub fn with_uglify(mut self, uglify: bool) -> Self {
        self.uglify = uglify;
        self
    }

    pub fn get(&self, environment: Environment) -> Option<VersionTriple> {
        self.versions.get(&environment).copied()
    }

    pub fn uglify(&self) -> bool {
        self.uglify
    }

    /// No version constraint and no toggle.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && !self.uglify
    }

    pub fn iter(&self) -> impl Iterator<Item = (Environment, VersionTriple)> + '_ {
        self.versions.iter().map(|(env, version)| (*env, *version))
    }
}

impl From<&str> for TargetValue {
    fn from(value: &str) -> Self {
        Self::Version(RawVersion::from(value))
    }
}

impl From<u64> for TargetValue {
    fn from(value: u64) -> Self {
        Self::Version(RawVersion::Integer(value))
    }
}

impl From<f64> for TargetValue {
    fn from(value: f64) -> Self {
        Self::Version(RawVersion::Decimal(value))
    }
}

impl From<bool> for TargetValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Build a [`TargetsConfig`] from `(key, value)` pairs.
pub fn targets_config<K, V, I>(entries: I) -> TargetsConfig
where
    K: Into<String>,
    V: Into<TargetValue>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), Some(value.into())))
        .collect()
}

/// Resolves [`TargetsConfig`] into [`Targets`].
pub struct TargetResolver {
    probe: Box<dyn RuntimeProbe>,
    browsers: Box<dyn BrowserQuery>,
    electron: EmbeddingTable,
}

enum Key {
    Environment(Environment),
    Browsers,
    Electron,
    Uglify,
}

impl FromStr for Key {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            BROWSERS_KEY => Ok(Self::Browsers),
            ELECTRON_KEY => Ok(Self::Electron),
            UGLIFY_KEY => Ok(Self::Uglify),
            other => other.parse().map(Self::Environment),
        }
    }
}

impl TargetResolver {
    /// Resolver backed by the local `node` binary and the bundled data.
    pub fn new() -> Result<Self> {
        Ok(Self {
            probe: Box::new(NodeProbe::new()),
            browsers: Box::new(Browserslist::bundled()?),
            electron: EmbeddingTable::bundled()?,
        })
    }

    pub fn with_probe(mut self, probe: impl RuntimeProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_browser_query(mut self, browsers: impl BrowserQuery + 'static) -> Self {
        self.browsers = Box::new(browsers);
        self
    }

    pub fn with_embedding_table(mut self, electron: EmbeddingTable) -> Self {
        self.electron = electron;
        self
    }

    pub fn resolve(&self, config: &TargetsConfig) -> Result<Targets> {
        let mut explicit = BTreeMap::new();
        let mut query = None;
        let mut electron = None;
        let mut uglify = false;

        for (name, value) in config {
            let key: Key = name.parse()?;

            // null and false mean "not set" for every key
            let value = match value {
                None | Some(TargetValue::Flag(false)) => continue,
                Some(value) => value,
            };

            match key {
                Key::Environment(env) => {
                    explicit.insert(env, self.resolve_environment(env, value)?);
                }
                Key::Browsers => query = Some(query_string(value)?),
                Key::Electron => electron = Some(version_of(ELECTRON_KEY, value)?),
                Key::Uglify => match value {
                    TargetValue::Flag(true) => uglify = true,
                    _ => return Err(PresetError::invalid_option(UGLIFY_KEY, "expected a boolean")),
                },
            }
        }

        if let Some(electron) = electron {
            let chrome = self.electron.chrome_version(electron)?;
            let merged = match explicit.get(&Environment::Chrome) {
                Some(existing) if *existing < chrome => *existing,
                _ => chrome,
            };
            explicit.insert(Environment::Chrome, merged);
        }

        let mut versions = match query {
            Some(query) => self.lowest_versions(&query)?,
            None => BTreeMap::new(),
        };
        versions.extend(explicit);

        let targets = Targets { versions, uglify };
        debug!("Resolved targets: {:?}", targets);
        Ok(targets)
    }

    fn resolve_environment(&self, env: Environment, value: &TargetValue) -> Result<VersionTriple> {
        let current = matches!(value, TargetValue::Flag(true))
            || matches!(value, TargetValue::Version(RawVersion::Text(s)) if s == CURRENT_SENTINEL);

        if current {
            if env != Environment::Node {
                return Err(PresetError::invalid_version(env.as_str(), "true"));
            }
            return self.probe.current_version(env);
        }

        version_of(env.as_str(), value)
    }

    /// Lowest release per environment matched by `query`.
    fn lowest_versions(&self, query: &str) -> Result<BTreeMap<Environment, VersionTriple>> {
        let mut lowest: BTreeMap<Environment, VersionTriple> = BTreeMap::new();

        for (browser, release) in self.browsers.resolve(query)? {
            let Some(env) = Environment::from_browserslist(&browser) else {
                debug!("Skipping {} {}: no compatibility data", browser, release);
                continue;
            };
            let Some(version) = release_start(&release) else {
                debug!("Skipping {} {}: unparseable release", browser, release);
                continue;
            };

            lowest
                .entry(env)
                .and_modify(|current| *current = (*current).min(version))
                .or_insert(version);
        }

        Ok(lowest)
    }
}

fn version_of(environment: &str, value: &TargetValue) -> Result<VersionTriple> {
    match value {
        TargetValue::Version(raw) => normalize_for(environment, raw),
        TargetValue::Flag(flag) => Err(PresetError::invalid_version(environment, flag)),
        TargetValue::Queries(list) => Err(PresetError::invalid_version(environment, list.join(", "))),
    }
}

fn query_string(value: &TargetValue) -> Result<String> {
    match value {
        TargetValue::Version(RawVersion::Text(query)) => Ok(query.clone()),
        TargetValue::Queries(list) => Ok(list.join(", ")),
        TargetValue::Version(raw) => Err(PresetError::invalid_query(raw.to_string(), "expected a query string")),
        TargetValue::Flag(flag) => Err(PresetError::invalid_query(flag.to_string(), "expected a query string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FixedProbe;

    fn v(major: u64) -> VersionTriple {
        VersionTriple::new(major, 0, 0)
    }

    fn resolver() -> TargetResolver {
        TargetResolver::new()
            .unwrap()
            .with_probe(FixedProbe(VersionTriple::new(18, 17, 1)))
    }

    #[test]
    fn test_plain_versions() {
        let targets = resolver()
            .resolve(&targets_config([("chrome", TargetValue::from(49u64)), ("node", "6.10".into())]))
            .unwrap();
        assert_eq!(targets.get(Environment::Chrome), Some(v(49)));
        assert_eq!(targets.get(Environment::Node), Some(VersionTriple::new(6, 10, 0)));
        assert!(!targets.uglify());
    }

    #[test]
    fn test_node_current() {
        for value in [TargetValue::Flag(true), TargetValue::from("current")] {
            let targets = resolver().resolve(&targets_config([("node", value)])).unwrap();
            assert_eq!(targets.get(Environment::Node), Some(VersionTriple::new(18, 17, 1)));
        }
    }

    #[test]
    fn test_true_on_other_environment_is_invalid() {
        let err = resolver().resolve(&targets_config([("chrome", true)])).unwrap_err();
        assert!(matches!(err, PresetError::InvalidVersion { .. }));
    }

    #[test]
    fn test_uglify_toggle() {
        let targets = resolver().resolve(&targets_config([("uglify", true)])).unwrap();
        assert!(targets.uglify());
        assert_eq!(serde_json::to_value(&targets).unwrap(), serde_json::json!({"uglify": true}));

        let targets = resolver().resolve(&targets_config([("uglify", false)])).unwrap();
        assert!(targets.is_empty());

        let mut config = TargetsConfig::new();
        config.insert("uglify".to_string(), None);
        assert!(resolver().resolve(&config).unwrap().is_empty());
    }

    #[test]
    fn test_electron_maps_to_chrome() {
        for value in [TargetValue::from("1.0"), TargetValue::from(1.0f64)] {
            let targets = resolver().resolve(&targets_config([("electron", value)])).unwrap();
            assert_eq!(targets, Targets::new().with(Environment::Chrome, v(49)));
        }
    }

    #[test]
    fn test_electron_keeps_lower_chrome() {
        let targets = resolver()
            .resolve(&targets_config([("electron", TargetValue::from(1.4f64)), ("chrome", 50u64.into())]))
            .unwrap();
        assert_eq!(targets.get(Environment::Chrome), Some(v(50)));

        let targets = resolver()
            .resolve(&targets_config([("electron", TargetValue::from(1.0f64)), ("chrome", 50u64.into())]))
            .unwrap();
        assert_eq!(targets.get(Environment::Chrome), Some(v(49)));
    }

    #[test]
    fn test_unknown_electron_version() {
        for value in [TargetValue::from("0.19"), TargetValue::from(0.19f64), TargetValue::from(999u64), TargetValue::from("999")] {
            let err = resolver().resolve(&targets_config([("electron", value)])).unwrap_err();
            assert!(matches!(err, PresetError::UnknownEmbeddingVersion { .. }));
        }
    }

    #[test]
    fn test_browsers_query_keeps_lowest() {
        let targets = resolver().resolve(&targets_config([("browsers", "chrome > 50")])).unwrap();
        assert_eq!(targets.get(Environment::Chrome), Some(v(51)));
    }

    #[test]
    fn test_root_entry_overrides_query() {
        let targets = resolver()
            .resolve(&targets_config([("browsers", TargetValue::from("chrome > 50")), ("chrome", 44u64.into())]))
            .unwrap();
        assert_eq!(targets.get(Environment::Chrome), Some(v(44)));

        let targets = resolver()
            .resolve(&targets_config([("browsers", TargetValue::from("chrome > 50")), ("chrome", 60u64.into())]))
            .unwrap();
        assert_eq!(targets.get(Environment::Chrome), Some(v(60)));
    }

    #[test]
    fn test_query_list_and_skipped_browsers() {
        let config = targets_config([(
            "browsers",
            TargetValue::Queries(vec!["ie 11".to_string(), "last 1 op_mini version".to_string()]),
        )]);
        let targets = resolver().resolve(&config).unwrap();
        assert_eq!(targets, Targets::new().with(Environment::Ie, v(11)));
    }

    #[test]
    fn test_unknown_environment() {
        let err = resolver().resolve(&targets_config([("netscape", 4u64)])).unwrap_err();
        assert!(matches!(err, PresetError::UnknownEnvironment { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = resolver().resolve(&targets_config([("chrome", "fifty")])).unwrap_err();
        assert!(matches!(err, PresetError::InvalidVersion { .. }));

        let err = resolver().resolve(&targets_config([("browsers", 50u64)])).unwrap_err();
        assert!(matches!(err, PresetError::InvalidQuery { .. }));

        let err = resolver().resolve(&targets_config([("uglify", "yes")])).unwrap_err();
        assert!(matches!(err, PresetError::InvalidOption { .. }));
    }

    #[test]
    fn test_deserialize_config() {
        let config: TargetsConfig = serde_json::from_str(
            r#"{"chrome": 49, "node": 6.9, "safari": "10.1", "uglify": null, "browsers": ["ie 11"]}"#,
        )
        .unwrap();
        assert_eq!(config["chrome"], Some(TargetValue::from(49u64)));
        assert_eq!(config["node"], Some(TargetValue::from(6.9f64)));
        assert_eq!(config["uglify"], None);

        let targets = resolver().resolve(&config).unwrap();
        assert_eq!(targets.get(Environment::Safari), Some(VersionTriple::new(10, 1, 0)));
        assert_eq!(targets.get(Environment::Ie), Some(v(11)));
    }
}
