use super::config::MappingParams;
use super::error::EngineError;
use super::numbering::CorrespondenceMap;
use crate::core::models::chain::Chain;
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::debug;

/// Identifies a chain within a structure without borrowing it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainKey {
    pub model_id: usize,
    pub chain_id: String,
}

impl ChainKey {
    pub fn of(chain: &Chain) -> Self {
        Self {
            model_id: chain.model_id(),
            chain_id: chain.id().to_string(),
        }
    }
}

/// Aggregated values keyed by structural residue number.
///
/// Residues without a reference counterpart have no entry; residues whose window
/// aggregated to nothing have an entry holding `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMap {
    pub chain: ChainKey,
    pub params: MappingParams,
    pub method: String,
    pub values: BTreeMap<isize, Option<f64>>,
}

impl DataMap {
    /// Entry for `residue`; the outer `None` means the residue was not mapped.
    pub fn get(&self, residue: isize) -> Option<Option<f64>> {
        self.values.get(&residue).copied()
    }

    /// Defined value for `residue`, if any.
    pub fn value(&self, residue: isize) -> Option<f64> {
        self.get(residue).flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (isize, Option<f64>)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `radius-<r>_selector-<s>`, parameter names in sorted order.
    pub fn parameter_string(&self) -> String {
        let params = BTreeMap::from([
            ("radius", self.params.radius.to_string()),
            ("selector", self.params.selector.to_string()),
        ]);
        params
            .iter()
            .map(|(name, value)| format!("{}-{}", name, value))
            .join("_")
    }

    pub fn default_file_name(&self, structure_name: &str) -> String {
        format!("{}_{}.pdb", structure_name, self.parameter_string())
    }

    /// Re-keys the values by reference index. Residues without a reference index are skipped.
    pub fn to_reference(&self, map: &CorrespondenceMap<usize>) -> BTreeMap<usize, Option<f64>> {
        self.values
            .iter()
            .filter_map(|(&residue, &value)| match map.reference(residue) {
                Some(index) => Some((index, value)),
                None => {
                    debug!(
                        "Residue {} of chain {} has no reference index; skipped.",
                        residue, self.chain.chain_id
                    );
                    None
                }
            })
            .collect()
    }

    /// Atom serial → value for every atom of `chain`; atoms of residues without a defined
    /// value get `default`.
    pub fn atom_values(&self, chain: &Chain, default: f64) -> Result<Vec<(usize, f64)>, EngineError> {
        if ChainKey::of(chain) != self.chain {
            return Err(EngineError::InvalidInput {
                argument: "chain",
                reason: format!(
                    "values were mapped on chain {} of model {}, not chain {} of model {}",
                    self.chain.chain_id,
                    self.chain.model_id,
                    chain.id(),
                    chain.model_id()
                ),
            });
        }
        Ok(chain
            .residues()
            .iter()
            .flat_map(|residue| {
                let value = self.value(residue.number).unwrap_or(default);
                residue.atoms().iter().map(move |atom| (atom.serial, value))
            })
            .collect())
    }
}
