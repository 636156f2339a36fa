use super::annotation::{AnnotationTable, SharedAnnotation};
use super::chain::Chain;
use std::collections::BTreeMap;

/// Model id whose annotation is computed; other models carry an empty table.
pub const CANONICAL_MODEL_ID: usize = 0;

#[derive(Debug)]
pub struct Model {
    id: usize,
    chains: BTreeMap<String, Chain>,
    pub(crate) annotation: SharedAnnotation,
}

impl Model {
    pub(crate) fn new(id: usize, chains: BTreeMap<String, Chain>, annotation: SharedAnnotation) -> Self {
        Self {
            id,
            chains,
            annotation,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_canonical(&self) -> bool {
        self.id == CANONICAL_MODEL_ID
    }

    /// Chains in sorted id order.
    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    pub fn chain(&self, id: &str) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn annotation(&self) -> Option<&AnnotationTable> {
        self.annotation.get()
    }
}
