pub mod map;
pub mod tajima;

use crate::error::{CliError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use structmap::core::io::fasta::FastaAlignmentReader;
use tracing::debug;

/// Buffered writer for `path`, or stdout when no path is given.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            debug!("Writing output to {:?}", path);
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn output_error(path: Option<&Path>, source: impl Into<anyhow::Error>) -> CliError {
    CliError::Output {
        path: path.map_or_else(|| PathBuf::from("<stdout>"), Path::to_path_buf),
        source: source.into(),
    }
}

/// Sequence of the first record of a FASTA file.
fn read_sequence(path: &Path) -> Result<String> {
    FastaAlignmentReader::read_first_sequence(path)
        .map(|record| {
            debug!("Read reference '{}' from {:?}", record.id, path);
            record.sequence
        })
        .map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
}
