use std::collections::BTreeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::environment::Environment;
use crate::targets::Targets;
use crate::version::{normalize, RawVersion, VersionTriple};

/// Native support for a feature in one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Unsupported,
    SupportedFrom(VersionTriple),
}

/// First version of each environment that implements a feature natively.
/// Environments without an entry are treated as unsupported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportTable(BTreeMap<Environment, Support>);

impl SupportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, environment: Environment, support: Support) -> Self {
        self.0.insert(environment, support);
        self
    }

    pub fn supported_from(self, environment: Environment, version: VersionTriple) -> Self {
        self.with(environment, Support::SupportedFrom(version))
    }

    pub fn get(&self, environment: Environment) -> Option<Support> {
        self.0.get(&environment).copied()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SupportRepr {
    Flag(bool),
    Version(RawVersion),
}

impl<'de> Deserialize<'de> for Support {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SupportRepr::deserialize(deserializer)? {
            SupportRepr::Flag(false) => Ok(Self::Unsupported),
            SupportRepr::Flag(true) => Err(serde::de::Error::custom(
                "`true` is not a support version; use the first supporting version",
            )),
            SupportRepr::Version(raw) => normalize(&raw)
                .map(Self::SupportedFrom)
                .map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for Support {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unsupported => serializer.serialize_bool(false),
            Self::SupportedFrom(version) => version.serialize(serializer),
        }
    }
}

/// Environments of `targets` that lack native support for the feature.
pub fn unsupported_environments(targets: &Targets, support: &SupportTable) -> Vec<Environment> {
    targets
        .iter()
        .filter(|(env, target)| match support.get(*env) {
            None | Some(Support::Unsupported) => true,
            Some(Support::SupportedFrom(first)) => *target < first,
        })
        .map(|(env, _)| env)
        .collect()
}

/// Whether a transform or polyfill has to be applied for `targets`.
///
/// Required when no targets are given, when the minifier toggle is set, or
/// when any targeted environment is older than the first version with
/// native support.
pub fn is_plugin_required(targets: &Targets, support: &SupportTable) -> bool {
    if targets.is_empty() || targets.uglify() {
        return true;
    }

    let missing = unsupported_environments(targets, support);
    if !missing.is_empty() {
        debug!("Required for {:?}", missing);
    }
    !missing.is_empty()
}
