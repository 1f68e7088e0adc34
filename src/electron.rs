use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::{PresetError, Result};
use crate::version::{normalize, RawVersion, VersionTriple};

const ELECTRON_TO_CHROMIUM: &str = include_str!("../data/electron-to-chromium.json");

/// Maps Electron releases onto the Chromium version they embed.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    versions: BTreeMap<VersionTriple, VersionTriple>,
}

impl EmbeddingTable {
    /// Load the bundled Electron to Chromium table.
    pub fn bundled() -> Result<Self> {
        Self::from_json(ELECTRON_TO_CHROMIUM)
    }

    /// Build a table from a JSON object of `"electron": "chrome"` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawVersion> = serde_json::from_str(json)
            .map_err(|e| PresetError::data_error("electron-to-chromium", e))?;

        let mut versions = BTreeMap::new();
        for (electron, chrome) in raw {
            let electron = normalize(&RawVersion::Text(electron))
                .map_err(|e| PresetError::data_error("electron-to-chromium", e))?;
            let chrome = normalize(&chrome)
                .map_err(|e| PresetError::data_error("electron-to-chromium", e))?;
            versions.insert(electron, chrome);
        }

        Ok(Self { versions })
    }

    /// Chromium version embedded by an Electron release. Lookups are exact.
    pub fn chrome_version(&self, electron: VersionTriple) -> Result<VersionTriple> {
        let chrome = self
            .versions
            .get(&electron)
            .copied()
            .ok_or_else(|| PresetError::unknown_embedding_version(electron))?;

        debug!("Electron {} embeds Chrome {}", electron, chrome);
        Ok(chrome)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VersionTriple, &VersionTriple)> {
        self.versions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(table: &EmbeddingTable, raw: RawVersion) -> Result<VersionTriple> {
        table.chrome_version(normalize(&raw)?)
    }

    #[test]
    fn test_bundled_table_loads() {
        let table = EmbeddingTable::bundled().unwrap();
        assert!(!table.is_empty());
    }

    #[test]
    fn test_string_and_number_agree() {
        let table = EmbeddingTable::bundled().unwrap();
        let expected = VersionTriple::new(49, 0, 0);
        assert_eq!(lookup(&table, "1.0".into()).unwrap(), expected);
        assert_eq!(lookup(&table, 1.0f64.into()).unwrap(), expected);
        assert_eq!(lookup(&table, 1u64.into()).unwrap(), expected);
    }

    #[test]
    fn test_every_entry_resolves() {
        let table = EmbeddingTable::bundled().unwrap();
        for (electron, chrome) in table.iter() {
            assert_eq!(table.chrome_version(*electron).unwrap(), *chrome);
        }
    }

    #[test]
    fn test_unknown_versions() {
        let table = EmbeddingTable::bundled().unwrap();
        for raw in [RawVersion::from("0.19"), RawVersion::Decimal(0.19), RawVersion::Integer(999), RawVersion::from("999")] {
            let err = lookup(&table, raw).unwrap_err();
            assert!(matches!(err, PresetError::UnknownEmbeddingVersion { .. }));
        }
    }

    #[test]
    fn test_malformed_table() {
        let err = EmbeddingTable::from_json(r#"{"1.0": "forty-nine"}"#).unwrap_err();
        assert!(matches!(err, PresetError::DataError { .. }));
    }
}
