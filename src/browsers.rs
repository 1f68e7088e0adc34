//! Browser queries (`"last 2 Chrome versions"`, `"chrome > 50"`) expanded
//! into explicit browser releases.
//!
//! [`Browserslist`] understands the subset of the browserslist language that
//! does not need usage statistics:
//!
//! * `last N versions` / `last N <browser> versions`
//! * `<browser> > V`, `>=`, `<`, `<=`
//! * `<browser> V`
//!
//! joined with `,` or `or`.

use std::collections::BTreeMap;
use regex::Regex;
use tracing::debug;

use crate::errors::{PresetError, Result};
use crate::version::{normalize, RawVersion, VersionTriple};

const BROWSER_RELEASES: &str = include_str!("../data/browsers.json");

/// Expands a query into `(browser, version)` pairs.
///
/// Browser names use browserslist spelling (`ios_saf`, `op_mini`); versions
/// may be ranges such as `11.0-11.2`.
pub trait BrowserQuery {
    fn resolve(&self, query: &str) -> Result<Vec<(String, String)>>;
}

/// Bundled browserslist subset backed by static release data.
#[derive(Debug, Clone)]
pub struct Browserslist {
    releases: BTreeMap<String, Vec<String>>,
    last_all: Regex,
    last_browser: Regex,
    comparison: Regex,
    exact: Regex,
    separator: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Browserslist {
    /// Load the bundled release data.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BROWSER_RELEASES)
    }

    /// Build from a JSON object mapping browser names to their released
    /// versions, oldest first.
    pub fn from_json(json: &str) -> Result<Self> {
        let releases: BTreeMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| PresetError::data_error("browsers", e))?;

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| PresetError::data_error("browser query grammar", e))
        };

        Ok(Self {
            releases,
            last_all: compile(r"(?i)^last\s+(\d+)\s+versions?$")?,
            last_browser: compile(r"(?i)^last\s+(\d+)\s+(\w+)\s+versions?$")?,
            comparison: compile(r"^(\w+)\s*(>=|<=|>|<)\s*(\d+(?:\.\d+){0,2})$")?,
            exact: compile(r"^(\w+)\s+(\d+(?:\.\d+){0,2})$")?,
            separator: compile(r"(?i),|\s+or\s+")?,
        })
    }

    /// Browser names known to the release data.
    pub fn browsers(&self) -> impl Iterator<Item = &str> {
        self.releases.keys().map(String::as_str)
    }

    fn canonical_name<'a>(&'a self, query: &str, name: &str) -> Result<(&'a str, &'a [String])> {
        let lower = name.to_ascii_lowercase();
        let alias = match lower.as_str() {
            "ff" => "firefox",
            "explorer" => "ie",
            "ios" => "ios_saf",
            "operamini" => "op_mini",
            other => other,
        };

        self.releases
            .get_key_value(alias)
            .map(|(name, versions)| (name.as_str(), versions.as_slice()))
            .ok_or_else(|| PresetError::invalid_query(query, format!("unknown browser `{}`", name)))
    }

    fn resolve_term(&self, query: &str, term: &str) -> Result<Vec<(String, String)>> {
        if let Some(caps) = self.last_all.captures(term) {
            let count = parse_count(query, &caps[1])?;
            return Ok(self
                .releases
                .iter()
                .flat_map(|(name, versions)| last_versions(name, versions, count))
                .collect());
        }

        if let Some(caps) = self.last_browser.captures(term) {
            let count = parse_count(query, &caps[1])?;
            let (name, versions) = self.canonical_name(query, &caps[2])?;
            return Ok(last_versions(name, versions, count));
        }

        if let Some(caps) = self.comparison.captures(term) {
            let (name, versions) = self.canonical_name(query, &caps[1])?;
            let op = match &caps[2] {
                ">" => Comparison::Greater,
                ">=" => Comparison::GreaterOrEqual,
                "<" => Comparison::Less,
                _ => Comparison::LessOrEqual,
            };
            let bound = normalize(&RawVersion::from(&caps[3]))?;

            return Ok(versions
                .iter()
                .filter(|v| release_start(v).is_some_and(|start| op.matches(start, bound)))
                .map(|v| (name.to_string(), v.clone()))
                .collect());
        }

        if let Some(caps) = self.exact.captures(term) {
            let (name, versions) = self.canonical_name(query, &caps[1])?;
            let wanted = normalize(&RawVersion::from(&caps[2]))?;

            return versions
                .iter()
                .find(|v| release_start(v) == Some(wanted))
                .map(|v| vec![(name.to_string(), v.clone())])
                .ok_or_else(|| {
                    PresetError::invalid_query(query, format!("unknown version {} of {}", &caps[2], name))
                });
        }

        Err(PresetError::invalid_query(query, format!("unsupported term `{}`", term)))
    }
}

impl BrowserQuery for Browserslist {
    fn resolve(&self, query: &str) -> Result<Vec<(String, String)>> {
        let mut result: Vec<(String, String)> = Vec::new();

        for term in self.separator.split(query).map(str::trim) {
            if term.is_empty() {
                return Err(PresetError::invalid_query(query, "empty term"));
            }
            for pair in self.resolve_term(query, term)? {
                if !result.contains(&pair) {
                    result.push(pair);
                }
            }
        }

        debug!("Browser query `{}` matched {} releases", query, result.len());
        Ok(result)
    }
}

impl Comparison {
    fn matches(self, version: VersionTriple, bound: VersionTriple) -> bool {
        match self {
            Self::Greater => version > bound,
            Self::GreaterOrEqual => version >= bound,
            Self::Less => version < bound,
            Self::LessOrEqual => version <= bound,
        }
    }
}

fn parse_count(query: &str, digits: &str) -> Result<usize> {
    digits
        .parse()
        .map_err(|_| PresetError::invalid_query(query, format!("invalid count `{}`", digits)))
}

fn last_versions(name: &str, versions: &[String], count: usize) -> Vec<(String, String)> {
    versions
        .iter()
        .rev()
        .take(count)
        .map(|v| (name.to_string(), v.clone()))
        .collect()
}

/// First version of a release range (`11.0-11.2` -> `11.0.0`).
pub fn release_start(release: &str) -> Option<VersionTriple> {
    let start = release.split('-').next()?;
    normalize(&RawVersion::from(start)).ok()
}
