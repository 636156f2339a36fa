use crate::core::models::chain::Chain;
use crate::core::models::structure::Structure;
use crate::core::sequence::aligner::SequenceAligner;
use crate::engine::aggregation::{MappingData, MethodRegistry};
use crate::engine::config::MappingConfig;
use crate::engine::datamap::{ChainKey, DataMap};
use crate::engine::dispatch::MappingDispatcher;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[instrument(skip_all, name = "map_chain", fields(model = chain.model_id(), chain = chain.id()))]
pub fn map_chain<A>(
    chain: &Chain,
    data: &MappingData,
    config: &MappingConfig,
    aligner: &A,
    registry: &MethodRegistry,
) -> Result<DataMap, EngineError>
where
    A: SequenceAligner + ?Sized,
{
    MappingDispatcher::new(aligner, registry).map(chain, data, config)
}

/// Maps every chain of every model of `structure`.
///
/// Chains are independent and are processed concurrently with the `parallel` feature.
/// The first failing chain aborts the run.
#[instrument(skip_all, name = "map_structure", fields(structure = structure.name()))]
pub fn map_structure<A>(
    structure: &Structure,
    data: &MappingData,
    config: &MappingConfig,
    aligner: &A,
    registry: &MethodRegistry,
    reporter: &ProgressReporter,
) -> Result<BTreeMap<ChainKey, DataMap>, EngineError>
where
    A: SequenceAligner + ?Sized,
{
    let chains: Vec<&Chain> = structure.chains().collect();
    info!(
        "Mapping '{}' onto {} chain(s) (radius {}, selector {}).",
        config.method,
        chains.len(),
        config.params.radius,
        config.params.selector
    );
    reporter.report(Progress::PhaseStart { name: "Mapping" });
    reporter.report(Progress::TaskStart {
        total_steps: chains.len() as u64,
    });

    let dispatcher = MappingDispatcher::new(aligner, registry);
    let map_one = |chain: &&Chain| -> Result<DataMap, EngineError> {
        let result = dispatcher.map(chain, data, config)?;
        reporter.report(Progress::ChainMapped {
            model_id: chain.model_id(),
            chain_id: chain.id().to_string(),
            residues: result.len(),
        });
        reporter.report(Progress::TaskIncrement);
        Ok(result)
    };

    #[cfg(feature = "parallel")]
    let results: Vec<DataMap> = chains.par_iter().map(map_one).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let results: Vec<DataMap> = chains.iter().map(map_one).collect::<Result<_, _>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!("Mapped {} chain(s).", results.len());

    Ok(results
        .into_iter()
        .map(|map| (map.chain.clone(), map))
        .collect())
}
