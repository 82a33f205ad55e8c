//! Column-name configuration. The two datasets describe the same address
//! fields under different raw headers, and the transfer stage copies a fixed
//! set of measurement columns; both mappings live here, compiled-in defaults
//! overridable from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw header names of the six address fields in one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressColumns {
    pub street_number: String,
    pub street_name: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// One measurement column copied from the source table to the target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub source_columns: AddressColumns,
    pub target_columns: AddressColumns,
    /// Name of the working column holding the assembled canonical address.
    pub address_column: String,
    pub transfer_columns: Vec<ColumnPair>,
}

fn pair(source: &str, target: &str) -> ColumnPair {
    ColumnPair {
        source: source.to_string(),
        target: target.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_columns: AddressColumns {
                street_number: "Street Number".into(),
                street_name: "Street Name".into(),
                apartment: "Apt".into(),
                city: "City".into(),
                state: "State".into(),
                zip: "Zip Code".into(),
            },
            target_columns: AddressColumns {
                street_number: "Street_num".into(),
                street_name: "street_name".into(),
                apartment: "apt".into(),
                city: "city".into(),
                state: "state".into(),
                zip: "zip".into(),
            },
            address_column: "Address".into(),
            // The measurement columns of the water-sampling datasets. Some
            // source headers carry a trailing space; that is how the real
            // files are labelled.
            transfer_columns: vec![
                pair("pH Before Acidification 1", "pH_before_acidification1"),
                pair("pH After Acidification 1", "pH_after_acidification1"),
                pair("Conductivity 1 (µS/cm) ", "conductivity1_uscm"),
                pair("Turbidity 1 (NTU)", "turbidity1_NTU"),
                pair("Pb of AAS 1 (ppb) ", "Pb_of_AAS1_ppb"),
                pair("Cu of AAS 1 (ppm)", "Cu_of_AAS1_ppm"),
                pair("Pb of E-Tongue 1 (ppb)", "Pb_of_E_Tongue1_ppb"),
                pair("Cu of E-Tongue 1 (ppm)", "Cu_of_E_Tongue1_ppm"),
                pair("pH Before Acidification 5", "pH_before_acidification5"),
                pair("pH After Acidification 5", "pH_after_acidification5"),
                pair("Conductivity 5 (µS/cm) ", "conductivity5_uscm"),
                pair("Turbidity 5 (NTU)", "turbidity5_NTU"),
                pair("Pb of AAS 5 (ppb)", "Pb_of_AAS5_ppb"),
                pair("Cu of AAS 5 (ppm)", "Cu_of_AAS5_ppm"),
                pair("Pb of E-Tongue 5 (ppb)", "Pb_of_E_Tongue5_ppb"),
                pair("Cu of E-Tongue 5 (ppm)", "Cu_of_E_Tongue5_ppm"),
            ],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("cannot read config {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("invalid config {:?}", path))
    }

    /// The compiled-in defaults, or the given JSON file when provided.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dataset_headers() {
        let config = Config::default();
        assert_eq!(config.source_columns.zip, "Zip Code");
        assert_eq!(config.target_columns.zip, "zip");
        assert_eq!(config.address_column, "Address");
        assert_eq!(config.transfer_columns.len(), 16);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn load_or_default_without_a_path() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_reads_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.address_column = "Full Address".into();
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.address_column, "Full Address");
    }
}
