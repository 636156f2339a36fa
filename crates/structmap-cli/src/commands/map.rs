use super::{open_output, output_error, read_sequence};
use crate::cli::{MapArgs, OutputFormat};
use crate::config::{OutputSettings, PartialConfig};
use crate::error::{CliError, Result};
use crate::pdb::PdbStructureParser;
use crate::utils::progress::CliProgressHandler;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use structmap::core::io::dssp::DsspAnnotator;
use structmap::core::io::fasta::FastaAlignmentReader;
use structmap::core::io::traits::{AlignmentReader, StructureParser};
use structmap::core::io::{data, writers};
use structmap::core::models::model::CANONICAL_MODEL_ID;
use structmap::core::models::structure::Structure;
use structmap::core::sequence::aligner::LocalAligner;
use structmap::engine::aggregation::{AggregationMethod, MappingData, MethodRegistry};
use structmap::engine::datamap::DataMap;
use structmap::engine::error::EngineError;
use structmap::engine::progress::ProgressReporter;
use structmap::workflows;
use tracing::{info, warn};

pub fn run(args: MapArgs) -> Result<()> {
    let settings = PartialConfig::load(args.config.as_deref())?.merge_map_args(&args)?;

    let reference = settings
        .reference
        .as_deref()
        .map(read_sequence)
        .transpose()?;
    let config = settings
        .builder
        .reference(reference)
        .build()
        .map_err(EngineError::from)?;
    let method: AggregationMethod = config.method.parse()?;

    info!("Loading {} data from {:?}", method, &args.data);
    let data = load_data(method, &args.data)?;

    info!("Loading input structure from {:?}", &args.input);
    let structure = PdbStructureParser
        .parse_path(&args.input)
        .map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    if args.dssp {
        let table = structure.annotate(&DsspAnnotator::new(&args.input));
        info!("DSSP annotated {} residue(s).", table.len());
    }

    let aligner = LocalAligner::new();
    let registry = MethodRegistry::new();
    let maps: Vec<DataMap> = match &args.chain {
        Some(chain_id) => {
            let chain = structure
                .chain(CANONICAL_MODEL_ID, chain_id)
                .ok_or_else(|| CliError::Argument(format!("Chain '{}' not found", chain_id)))?;
            vec![workflows::map::map_chain(
                chain, &data, &config, &aligner, &registry,
            )?]
        }
        None => {
            let progress_handler = CliProgressHandler::new();
            let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
            workflows::map::map_structure(&structure, &data, &config, &aligner, &registry, &reporter)?
                .into_values()
                .collect()
        }
    };

    if maps.iter().all(DataMap::is_empty) {
        warn!("No residue could be related to the reference; the output will be empty.");
    }

    write_output(
        &structure,
        &maps,
        &settings.output,
        args.output.as_deref(),
        &args.input,
        args.dssp,
    )
}

fn load_data(method: AggregationMethod, path: &Path) -> Result<MappingData> {
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    };
    Ok(match method {
        AggregationMethod::Default => {
            MappingData::Values(data::load_values(path).map_err(|e| parse_error(e.into()))?)
        }
        AggregationMethod::Snps | AggregationMethod::SnpFrequency => MappingData::Variants(
            data::load_variant_counts(path).map_err(|e| parse_error(e.into()))?,
        ),
        AggregationMethod::AminoAcidScale => {
            MappingData::Scale(data::load_scale(path).map_err(|e| parse_error(e.into()))?)
        }
        AggregationMethod::TajimasD => MappingData::Alignment(
            FastaAlignmentReader::read_from_path(path).map_err(|e| parse_error(e.into()))?,
        ),
    })
}

/// Atom serial → value over the chains of the first model.
fn canonical_atom_values(
    structure: &Structure,
    maps: &[DataMap],
    default: f64,
) -> Result<Vec<(usize, f64)>> {
    let mut values = Vec::new();
    for map in maps.iter().filter(|m| m.chain.model_id == CANONICAL_MODEL_ID) {
        if let Some(chain) = structure.chain(map.chain.model_id, &map.chain.chain_id) {
            values.extend(map.atom_values(chain, default)?);
        }
    }
    Ok(values)
}

fn write_output(
    structure: &Structure,
    maps: &[DataMap],
    output: &OutputSettings,
    path: Option<&Path>,
    input: &Path,
    annotated: bool,
) -> Result<()> {
    match output.format {
        OutputFormat::Residue => {
            let writer = open_output(path)?;
            let written = if annotated {
                writers::write_residue_values(writer, annotated_rows(structure, maps), output.delimiter)
            } else {
                let rows = maps.iter().flat_map(|map| {
                    map.iter().map(move |(residue, value)| {
                        (map.chain.model_id, map.chain.chain_id.as_str(), residue, value)
                    })
                });
                writers::write_residue_values(writer, rows, output.delimiter)
            };
            written.map_err(|e| output_error(path, e))
        }
        OutputFormat::Atom => {
            let values = canonical_atom_values(structure, maps, output.default_value)?;
            let writer = open_output(path)?;
            writers::write_atom_values(writer, &values, output.delimiter)
                .map_err(|e| output_error(path, e))
        }
        OutputFormat::BFactor => {
            let values: HashMap<usize, f64> =
                canonical_atom_values(structure, maps, output.default_value)?
                    .into_iter()
                    .collect();
            let target = match (path, maps.first()) {
                (Some(path), _) => path.to_path_buf(),
                (None, Some(map)) => PathBuf::from(map.default_file_name(structure.name())),
                (None, None) => {
                    return Err(CliError::Argument(
                        "No chain was mapped; nothing to write".to_string(),
                    ));
                }
            };
            let source = BufReader::new(File::open(input)?);
            let writer = open_output(Some(target.as_path()))?;
            let rewritten = writers::write_b_factors(source, &values, output.default_value, writer)
                .map_err(|e| output_error(Some(target.as_path()), e))?;
            info!("Rewrote {} atom record(s).", rewritten);
            println!("Values written to: {}", target.display());
            Ok(())
        }
    }
}

type AnnotatedRow<'a> = (usize, &'a str, isize, Option<f64>, Option<char>, Option<f64>);

fn annotated_rows<'a>(structure: &'a Structure, maps: &'a [DataMap]) -> Vec<AnnotatedRow<'a>> {
    let mut rows = Vec::new();
    for map in maps {
        let chain = structure.chain(map.chain.model_id, &map.chain.chain_id);
        let secondary = chain.map(|c| c.secondary_structure()).unwrap_or_default();
        let accessibility = chain
            .map(|c| c.relative_solvent_accessibility())
            .unwrap_or_default();
        for (residue, value) in map.iter() {
            rows.push((
                map.chain.model_id,
                map.chain.chain_id.as_str(),
                residue,
                value,
                secondary.get(&residue).map(|ss| ss.code()),
                accessibility.get(&residue).copied().flatten(),
            ));
        }
    }
    rows
}
