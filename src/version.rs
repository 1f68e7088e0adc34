//! Canonical `major.minor.patch` versions and the normalizer that produces
//! them from loosely typed configuration values.
//!
//! Configuration files carry versions as bare integers (`49`), decimals
//! (`6.9`), partial strings (`"1.0"`) or full triples (`"10.13.0"`). All of
//! them are folded into a [`VersionTriple`] once, at the boundary; nothing
//! downstream looks at the raw value again.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::{PresetError, Result};

/// `major.minor.patch` without leading zeros.
static CANONICAL: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)$"));

/// Decimals outside this range have no plain decimal rendering.
const MIN_PLAIN_DECIMAL: f64 = 1e-6;
const MAX_PLAIN_DECIMAL: f64 = 1e21;

/// Ordered `(major, minor, patch)` triple. Comparison is numeric, component
/// by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// A version exactly as it appeared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVersion {
    Integer(u64),
    Decimal(f64),
    Text(String),
}

impl VersionTriple {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a strict `major.minor.patch` string.
    fn parse_canonical(input: &str) -> Option<Self> {
        let caps = CANONICAL.as_ref().ok()?.captures(input)?;
        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        let patch = caps[3].parse().ok()?;

        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(&RawVersion::Text(s.to_string()))
    }
}

impl Serialize for VersionTriple {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionTriple {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawVersion::deserialize(deserializer)?;
        normalize(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<semver::Version> for VersionTriple {
    fn from(version: semver::Version) -> Self {
        Self::new(version.major, version.minor, version.patch)
    }
}

impl fmt::Display for RawVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Decimal(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RawVersion {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawVersion {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for RawVersion {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Convert any raw version into a [`VersionTriple`].
///
/// `2.5 -> 2.5.0`, `1 -> 1.0.0`, `"1.0" -> 1.0.0`, `"10.13.0"` is kept as is.
///
/// Numbers only carry the precision of their shortest decimal rendering, so
/// the number `6.10` becomes `6.1.0` while the string `"6.10"` becomes
/// `6.10.0`. Pass full triples as strings when the minor has two digits.
pub fn normalize(raw: &RawVersion) -> Result<VersionTriple> {
    let invalid = || PresetError::invalid_version("version", raw);

    let candidate = match raw {
        RawVersion::Integer(n) => format!("{}.0.0", n),
        RawVersion::Decimal(n) => {
            if !n.is_finite() || n.is_sign_negative() {
                return Err(invalid());
            }
            if *n >= MAX_PLAIN_DECIMAL || (*n > 0.0 && *n < MIN_PLAIN_DECIMAL) {
                return Err(invalid());
            }
            if n.fract() == 0.0 {
                format!("{}.0.0", n.trunc())
            } else {
                format!("{}.0", n)
            }
        }
        RawVersion::Text(s) => {
            if let Some(version) = VersionTriple::parse_canonical(s) {
                return Ok(version);
            }
            match s.split('.').count() {
                1 => format!("{}.0.0", s),
                2 => format!("{}.0", s),
                _ => return Err(invalid()),
            }
        }
    };

    VersionTriple::parse_canonical(&candidate).ok_or_else(invalid)
}

/// Like [`normalize`], with the environment name in the error.
pub fn normalize_for(environment: &str, raw: &RawVersion) -> Result<VersionTriple> {
    normalize(raw).map_err(|_| PresetError::invalid_version(environment, raw))
}
