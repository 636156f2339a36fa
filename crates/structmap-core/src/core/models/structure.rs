use super::annotation::AnnotationTable;
use super::chain::Chain;
use super::model::{CANONICAL_MODEL_ID, Model};
use crate::core::io::traits::AnnotationProvider;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Ownership root of a parsed coordinate file. Read-only once built.
#[derive(Debug)]
pub struct Structure {
    name: String,
    models: BTreeMap<usize, Model>,
    sequences: BTreeMap<String, String>,
}

impl Structure {
    pub(crate) fn new(
        name: String,
        models: BTreeMap<usize, Model>,
        sequences: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name,
            models,
            sequences,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Models in ascending id order.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    pub fn model(&self, id: usize) -> Option<&Model> {
        self.models.get(&id)
    }

    pub fn chain(&self, model_id: usize, chain_id: &str) -> Option<&Chain> {
        self.models.get(&model_id).and_then(|m| m.chain(chain_id))
    }

    /// Every chain of every model, in model then chain order.
    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.models.values().flat_map(Model::chains)
    }

    /// Chain id → sequence, from header records or reconstructed from residues.
    pub fn sequences(&self) -> &BTreeMap<String, String> {
        &self.sequences
    }

    pub fn sequence(&self, chain_id: &str) -> Option<&str> {
        self.sequences.get(chain_id).map(String::as_str)
    }

    /// Annotates the canonical model once. A failing provider leaves an empty table.
    pub fn annotate<P>(&self, provider: &P) -> &AnnotationTable
    where
        P: AnnotationProvider + ?Sized,
    {
        static EMPTY: AnnotationTable = AnnotationTable::empty();

        let Some(model) = self.models.get(&CANONICAL_MODEL_ID) else {
            debug!("Structure has no canonical model; skipping annotation.");
            return &EMPTY;
        };
        model.annotation.get_or_init(|| match provider.annotate(model) {
            Ok(table) => {
                debug!("Annotated {} residues of model 0.", table.len());
                table
            }
            Err(e) => {
                warn!("Annotation unavailable for '{}': {}", self.name, e);
                AnnotationTable::default()
            }
        })
    }
}
