use crate::core::utils::identifiers;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unrecognized amino acid '{token}' in '{path}'")]
    AminoAcid { path: String, token: String },
}

#[derive(Debug, Deserialize)]
struct ValueRecord {
    position: usize,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct CountRecord {
    position: usize,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct ScaleRecord {
    amino_acid: String,
    value: f64,
}

fn read_csv<T>(path: &Path) -> Result<Vec<T>, DataLoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let csv_error = |source| DataLoadError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)
}

/// Reference index → value, from a `position,value` CSV file.
pub fn load_values(path: &Path) -> Result<BTreeMap<usize, f64>, DataLoadError> {
    Ok(read_csv::<ValueRecord>(path)?
        .into_iter()
        .map(|r| (r.position, r.value))
        .collect())
}

/// Reference index → variant allele count, from a `position,count` CSV file.
pub fn load_variant_counts(path: &Path) -> Result<BTreeMap<usize, u32>, DataLoadError> {
    Ok(read_csv::<CountRecord>(path)?
        .into_iter()
        .map(|r| (r.position, r.count))
        .collect())
}

/// Amino acid → scale value. `.toml` files map residue names to values; anything else is
/// read as an `amino_acid,value` CSV file. Keys may be one- or three-letter codes.
pub fn load_scale(path: &Path) -> Result<HashMap<char, f64>, DataLoadError> {
    let entries: Vec<(String, f64)> = if path.extension().is_some_and(|e| e == "toml") {
        let content = std::fs::read_to_string(path).map_err(|e| DataLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let table: HashMap<String, f64> =
            toml::from_str(&content).map_err(|e| DataLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        table.into_iter().collect()
    } else {
        read_csv::<ScaleRecord>(path)?
            .into_iter()
            .map(|r| (r.amino_acid, r.value))
            .collect()
    };

    entries
        .into_iter()
        .map(|(token, value)| {
            identifiers::parse_amino_acid(&token)
                .map(|code| (code, value))
                .ok_or_else(|| DataLoadError::AminoAcid {
                    path: path.to_string_lossy().to_string(),
                    token,
                })
        })
        .collect()
}
