use super::annotation::{AnnotationTable, SharedAnnotation};
use super::atom::Atom;
use super::chain::Chain;
use super::model::{CANONICAL_MODEL_ID, Model};
use super::residue::Residue;
use super::structure::Structure;
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BuildError {
    #[error("Cannot start residue {number} before starting a chain")]
    ResidueWithoutChain { number: isize },
    #[error("Cannot add atom {serial} before starting a residue")]
    AtomWithoutResidue { serial: usize },
}

#[derive(Debug, Default)]
struct ChainDraft {
    id: String,
    residues: Vec<Residue>,
}

/// Incremental construction of a [`Structure`], in file order.
///
/// Misuse (an atom outside a residue, a residue outside a chain) is recorded and
/// reported by [`StructureBuilder::build`].
#[derive(Debug, Default)]
pub struct StructureBuilder {
    name: String,
    models: BTreeMap<usize, Vec<ChainDraft>>,
    header_sequences: BTreeMap<String, String>,
    current_model: usize,
    current_chain: Option<usize>,
    current_residue: Option<usize>,
    error: Option<BuildError>,
}

impl StructureBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn start_model(&mut self, id: usize) -> &mut Self {
        self.models.entry(id).or_default();
        self.current_model = id;
        self.current_chain = None;
        self.current_residue = None;
        self
    }

    pub fn start_chain(&mut self, id: &str) -> &mut Self {
        let id = id.trim();
        let drafts = self.models.entry(self.current_model).or_default();
        let idx = match drafts.iter().position(|c| c.id == id) {
            Some(idx) => idx,
            None => {
                drafts.push(ChainDraft {
                    id: id.to_string(),
                    residues: Vec::new(),
                });
                drafts.len() - 1
            }
        };
        self.current_chain = Some(idx);
        self.current_residue = None;
        self
    }

    /// Consecutive calls with the same number and insertion code continue one residue.
    pub fn start_residue(
        &mut self,
        number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> &mut Self {
        let Some(chain) = self.current_chain_draft() else {
            self.record(BuildError::ResidueWithoutChain { number });
            return self;
        };
        let continues = chain
            .residues
            .last()
            .is_some_and(|r| r.number == number && r.insertion_code == insertion_code);
        if !continues {
            chain
                .residues
                .push(Residue::new(number, insertion_code, name));
        }
        let idx = chain.residues.len() - 1;
        self.current_residue = Some(idx);
        self
    }

    pub fn add_atom(
        &mut self,
        serial: usize,
        name: &str,
        position: Point3<f64>,
        is_hetero: bool,
    ) -> &mut Self {
        let residue_idx = self.current_residue;
        let residue = self
            .current_chain_draft()
            .zip(residue_idx)
            .and_then(|(chain, idx)| chain.residues.get_mut(idx));
        match residue {
            Some(residue) => residue
                .atoms
                .push(Atom::new(serial, name, position).with_hetero(is_hetero)),
            None => self.record(BuildError::AtomWithoutResidue { serial }),
        }
        self
    }

    /// Sequence from header records (e.g. SEQRES); takes precedence over residue-derived sequences.
    pub fn header_sequence(&mut self, chain_id: &str, sequence: &str) -> &mut Self {
        self.header_sequences
            .insert(chain_id.trim().to_string(), sequence.to_string());
        self
    }

    pub fn build(self) -> Result<Structure, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut sequences = self.header_sequences.clone();
        let mut models = BTreeMap::new();

        for (model_id, drafts) in self.models {
            let annotation: SharedAnnotation = if model_id == CANONICAL_MODEL_ID {
                Arc::new(OnceLock::new())
            } else {
                Arc::new(OnceLock::from(AnnotationTable::default()))
            };

            let mut chains = BTreeMap::new();
            for draft in drafts {
                let sequence = match self.header_sequences.get(&draft.id) {
                    Some(header) => header.clone(),
                    None => draft
                        .residues
                        .iter()
                        .filter(|r| r.is_polymer())
                        .map(|r| r.code)
                        .collect(),
                };
                sequences
                    .entry(draft.id.clone())
                    .or_insert_with(|| sequence.clone());

                let chain = Chain::new(
                    draft.id.clone(),
                    model_id,
                    draft.residues,
                    sequence,
                    Arc::clone(&annotation),
                );
                chains.insert(draft.id, chain);
            }
            models.insert(model_id, Model::new(model_id, chains, annotation));
        }

        Ok(Structure::new(self.name, models, sequences))
    }

    fn current_chain_draft(&mut self) -> Option<&mut ChainDraft> {
        let idx = self.current_chain?;
        self.models
            .get_mut(&self.current_model)
            .and_then(|drafts| drafts.get_mut(idx))
    }

    fn record(&mut self, error: BuildError) {
        self.error.get_or_insert(error);
    }
}
