use std::collections::BTreeMap;
use std::sync::LazyLock;
use regex::Regex;

use crate::errors::{PresetError, Result};
use crate::requirement::SupportTable;

const PLUGINS: &str = include_str!("../data/plugins.json");
const BUILT_INS: &str = include_str!("../data/built-ins.json");

static BUILT_IN_NAME: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(es\d+|web)\..+"));

/// Web built-ins added whenever built-ins are enabled.
pub const DEFAULT_WEB_BUILT_INS: [&str; 3] = ["web.timers", "web.immediate", "web.dom.iterable"];

/// Known syntax plugins and built-ins with their support tables.
#[derive(Debug, Clone)]
pub struct Registry {
    plugins: BTreeMap<String, SupportTable>,
    built_ins: BTreeMap<String, SupportTable>,
}

impl Registry {
    /// Load the bundled compatibility data.
    pub fn bundled() -> Result<Self> {
        Self::from_json(PLUGINS, BUILT_INS)
    }

    pub fn from_json(plugins: &str, built_ins: &str) -> Result<Self> {
        let plugins = serde_json::from_str(plugins)
            .map_err(|e| PresetError::data_error("plugins", e))?;
        let built_ins = serde_json::from_str(built_ins)
            .map_err(|e| PresetError::data_error("built-ins", e))?;

        Ok(Self { plugins, built_ins })
    }

    pub fn plugins(&self) -> impl Iterator<Item = (&str, &SupportTable)> {
        self.plugins.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn built_ins(&self) -> impl Iterator<Item = (&str, &SupportTable)> {
        self.built_ins.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Support table of a plugin or built-in.
    pub fn support(&self, name: &str) -> Option<&SupportTable> {
        self.plugins.get(name).or_else(|| self.built_ins.get(name))
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn has_built_in(&self, name: &str) -> bool {
        self.built_ins.contains_key(name) || DEFAULT_WEB_BUILT_INS.contains(&name)
    }

    /// Names accepted in `include` and `exclude`.
    pub fn is_known(&self, name: &str) -> bool {
        self.has_plugin(name) || self.has_built_in(name)
    }
}

/// Built-ins are named after the standard or platform API they polyfill
/// (`es6.map`, `es7.object.values`, `web.timers`).
pub fn is_built_in(name: &str) -> bool {
    BUILT_IN_NAME.as_ref().is_ok_and(|re| re.is_match(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::requirement::Support;
    use crate::version::VersionTriple;

    #[test]
    fn test_bundled_registry() {
        let registry = Registry::bundled().unwrap();
        assert!(registry.has_plugin("transform-es2015-arrow-functions"));
        assert!(registry.has_built_in("es6.map"));
        assert!(registry.has_built_in("web.timers"));
        assert!(!registry.is_known("transform-nope"));
    }

    #[test]
    fn test_support_lookup() {
        let registry = Registry::bundled().unwrap();
        let table = registry.support("transform-es2015-destructuring").unwrap();
        assert_eq!(table.get(Environment::Node), Some(Support::SupportedFrom(VersionTriple::new(6, 5, 0))));

        let table = registry.support("es6.number.is-nan").unwrap();
        assert_eq!(table.get(Environment::Node), Some(Support::SupportedFrom(VersionTriple::new(0, 12, 0))));
    }

    #[test]
    fn test_bundled_names_classify_consistently() {
        let registry = Registry::bundled().unwrap();
        assert!(registry.plugins().all(|(name, _)| !is_built_in(name)));
        assert!(registry.built_ins().all(|(name, _)| is_built_in(name)));
        assert!(DEFAULT_WEB_BUILT_INS.iter().all(|name| is_built_in(name)));
    }

    #[test]
    fn test_is_built_in() {
        assert!(is_built_in("es6.map"));
        assert!(is_built_in("es2017.object.values"));
        assert!(is_built_in("web.dom.iterable"));
        assert!(!is_built_in("transform-es2015-arrow-functions"));
        assert!(!is_built_in("es.map"));
        assert!(!is_built_in("es6."));
        assert!(!is_built_in("es6"));
        assert!(!is_built_in("xes6.map"));
        assert!(!is_built_in("website.map"));
    }

    #[test]
    fn test_malformed_data() {
        let err = Registry::from_json(r#"{"x": {"chrome": "soon"}}"#, "{}").unwrap_err();
        assert!(matches!(err, PresetError::DataError { .. }));
    }
}
