use super::aggregation::{
    Aggregator, MappingData, MethodRegistry, ReferencePosition, Reducer, Window, WindowMember,
};
use super::config::MappingConfig;
use super::datamap::{ChainKey, DataMap};
use super::error::EngineError;
use super::numbering::NumberingResolver;
use super::spatial::SpatialIndex;
use crate::core::models::chain::Chain;
use crate::core::sequence::aligner::SequenceAligner;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Maps per-reference data onto the residues of a chain through a 3D window.
pub struct MappingDispatcher<'a, A: SequenceAligner + ?Sized> {
    resolver: NumberingResolver<'a, A>,
    registry: &'a MethodRegistry,
}

impl<'a, A: SequenceAligner + ?Sized> MappingDispatcher<'a, A> {
    pub fn new(aligner: &'a A, registry: &'a MethodRegistry) -> Self {
        Self {
            resolver: NumberingResolver::new(aligner),
            registry,
        }
    }

    /// Aggregates `data` over the neighborhood of every residue of `chain`.
    ///
    /// # Arguments
    ///
    /// * `chain` - The chain to map onto.
    /// * `data` - Per-reference input; its kind must suit the method.
    /// * `config` - Method name, window parameters and optional reference sequence.
    ///
    /// # Return
    ///
    /// A [`DataMap`] with one entry per residue that has a reference counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownMethod`] for unregistered names,
    /// [`EngineError::InvalidInput`] when the data kind does not suit the method,
    /// [`EngineError::MissingReference`] when `tajimasd` has no genomic reference, and
    /// [`EngineError::Aggregation`] when the reducer fails on a window.
    pub fn map(
        &self,
        chain: &Chain,
        data: &MappingData,
        config: &MappingConfig,
    ) -> Result<DataMap, EngineError> {
        let aggregator = self.registry.resolve(&config.method)?;
        let builtin;
        let reducer: &dyn Reducer = match &aggregator {
            Aggregator::Builtin(method) => {
                builtin = method.reducer(data)?;
                builtin.as_ref()
            }
            Aggregator::Custom { reducer, .. } => reducer.as_ref(),
        };

        let positions = self.reference_positions(chain, data, config, &aggregator)?;
        info!(
            "Chain {}: {} of {} residues correspond to the reference.",
            chain.id(),
            positions.len(),
            chain.polymer_residues().count()
        );

        let neighbors = SpatialIndex::neighbors(chain, config.params.radius, &config.params.selector);
        let mut values = BTreeMap::new();
        let mut members = Vec::new();
        for (&center, neighborhood) in neighbors.iter() {
            if !positions.contains_key(&center) {
                continue;
            }
            members.clear();
            members.extend(neighborhood.iter().map(|&residue| WindowMember {
                residue,
                code: chain.amino_acid(residue),
                reference: positions.get(&residue).copied(),
            }));
            let window = Window {
                center,
                members: &members,
            };
            let value = reducer
                .reduce(&window, data)
                .map_err(|e| EngineError::Aggregation {
                    method: aggregator.name().to_string(),
                    residue: center,
                    reason: e.to_string(),
                })?;
            values.insert(center, value);
        }
        debug!(
            "Chain {}: {} residues mapped with '{}', {} with a defined value.",
            chain.id(),
            values.len(),
            aggregator.name(),
            values.values().filter(|v| v.is_some()).count()
        );

        Ok(DataMap {
            chain: ChainKey::of(chain),
            params: config.params.clone(),
            method: aggregator.name().to_string(),
            values,
        })
    }

    fn reference_positions(
        &self,
        chain: &Chain,
        data: &MappingData,
        config: &MappingConfig,
        aggregator: &Aggregator,
    ) -> Result<BTreeMap<isize, ReferencePosition>, EngineError> {
        if !aggregator.uses_genome_reference() {
            let map = self
                .resolver
                .resolve_reference(chain, config.reference.as_deref());
            if let Some(score) = map.score() {
                debug!("Chain {}: reference alignment score {}.", chain.id(), score);
            }
            return Ok(map
                .structure_to_reference()
                .iter()
                .map(|(&residue, &index)| (residue, ReferencePosition::Index(index)))
                .collect());
        }

        let genomic = match (&config.reference, data) {
            (Some(reference), _) => reference.as_str(),
            (None, MappingData::Alignment(alignment)) => alignment
                .row(0)
                .filter(|row| !row.is_empty())
                .ok_or_else(|| EngineError::MissingReference {
                    argument: "ref",
                    method: aggregator.name().to_string(),
                })?,
            (None, _) => {
                return Err(EngineError::MissingReference {
                    argument: "ref",
                    method: aggregator.name().to_string(),
                });
            }
        };
        let map = self.resolver.resolve_genome(chain, genomic);
        Ok(map
            .structure_to_reference()
            .iter()
            .map(|(&residue, &codon)| (residue, ReferencePosition::Codon(codon)))
            .collect())
    }
}
