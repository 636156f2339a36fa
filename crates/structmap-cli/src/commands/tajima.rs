use super::{open_output, output_error, read_sequence};
use crate::cli::TajimaArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use structmap::core::io::fasta::FastaAlignmentReader;
use structmap::core::io::traits::AlignmentReader;
use structmap::core::io::writers;
use structmap::core::sequence::aligner::LocalAligner;
use structmap::engine::progress::ProgressReporter;
use structmap::workflows::tajima::{self, TajimaResult};
use tracing::info;

pub fn run(args: TajimaArgs) -> Result<()> {
    let settings = PartialConfig::load(args.config.as_deref())?.merge_tajima_args(&args)?;

    info!("Loading alignment from {:?}", &args.alignment);
    let alignment =
        FastaAlignmentReader::read_from_path(&args.alignment).map_err(|e| CliError::FileParsing {
            path: args.alignment.clone(),
            source: e.into(),
        })?;
    info!(
        "Alignment has {} sequence(s) from {} isolate(s) over {} columns.",
        alignment.num_sequences(),
        alignment.isolate_ids().len(),
        alignment.width()
    );

    let protein = args.protein_ref.as_deref().map(read_sequence).transpose()?;
    let genome = args.genome_ref.as_deref().map(read_sequence).transpose()?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let result = tajima::run(
        &alignment,
        &settings.config,
        protein.as_deref(),
        genome.as_deref(),
        &LocalAligner::new(),
        &reporter,
    )?;

    let path = args.output.as_deref();
    let writer = open_output(path)?;
    let written = match result {
        TajimaResult::Whole(value) => {
            info!("Tajima's D over the whole alignment: {:?}", value);
            writers::write_residue_values(writer, [(value,)], settings.delimiter)
        }
        TajimaResult::Windowed(windows) => {
            info!("Evaluated {} window(s).", windows.len());
            writers::write_residue_values(writer, windows, settings.delimiter)
        }
        TajimaResult::Coding(coding) if args.protein_numbering => {
            writers::write_residue_values(writer, coding.by_protein, settings.delimiter)
        }
        TajimaResult::Coding(coding) => {
            info!("Evaluated {} coding window(s).", coding.by_genome.len());
            writers::write_residue_values(writer, coding.by_genome, settings.delimiter)
        }
    };
    written.map_err(|e| output_error(path, e))
}
