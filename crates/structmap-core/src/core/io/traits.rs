use crate::core::models::annotation::AnnotationTable;
use crate::core::models::model::Model;
use crate::core::models::structure::Structure;
use crate::core::sequence::alignment::SequenceAlignment;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Turns a coordinate file into a [`Structure`].
///
/// Implementors own every detail of the file format; the library only sees the
/// resulting tree, typically assembled with
/// [`StructureBuilder`](crate::core::models::builder::StructureBuilder).
pub trait StructureParser {
    /// The error type for parse failures.
    type Error: Error;

    /// Parses the file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The coordinate file to read.
    ///
    /// # Return
    ///
    /// Returns the parsed structure, with models numbered from 0 in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid structure.
    fn parse_path(&self, path: &Path) -> Result<Structure, Self::Error>;
}

/// Reads a multi-sequence alignment.
pub trait AlignmentReader {
    /// The error type for read failures.
    type Error: Error + From<io::Error>;

    /// Reads an alignment from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or the sequences differ in length.
    fn read_from(reader: &mut impl BufRead) -> Result<SequenceAlignment, Self::Error>;

    /// Reads an alignment from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or [`Self::read_from`] fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<SequenceAlignment, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Annotation unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error while annotating: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed annotation output at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Computes per-residue secondary structure and relative accessibility for one model.
///
/// Failures are recoverable: [`Structure::annotate`] logs them and stores an empty table.
pub trait AnnotationProvider {
    fn annotate(&self, model: &Model) -> Result<AnnotationTable, AnnotationError>;
}
