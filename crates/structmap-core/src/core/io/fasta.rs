use super::traits::AlignmentReader;
use crate::core::sequence::alignment::{AlignmentError, SequenceAlignment, SequenceRecord};
use bio::io::fasta;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Record '{id}' is not valid UTF-8")]
    Encoding { id: String },
    #[error("No sequences found")]
    Empty,
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

pub struct FastaAlignmentReader;

impl FastaAlignmentReader {
    /// Reads every record, aligned or not.
    pub fn read_records(reader: &mut impl BufRead) -> Result<Vec<SequenceRecord>, FastaError> {
        let mut records = Vec::new();
        for record in fasta::Reader::new(reader).records() {
            let record = record?;
            let sequence =
                std::str::from_utf8(record.seq()).map_err(|_| FastaError::Encoding {
                    id: record.id().to_string(),
                })?;
            let id = match record.desc() {
                Some(desc) => format!("{} {}", record.id(), desc),
                None => record.id().to_string(),
            };
            records.push(SequenceRecord::new(&id, sequence));
        }
        Ok(records)
    }

    /// First record of a FASTA file, e.g. a reference sequence.
    pub fn read_first_sequence<P: AsRef<Path>>(path: P) -> Result<SequenceRecord, FastaError> {
        let file = std::fs::File::open(path)?;
        let mut reader = io::BufReader::new(file);
        Self::read_records(&mut reader)?
            .into_iter()
            .next()
            .ok_or(FastaError::Empty)
    }
}

impl AlignmentReader for FastaAlignmentReader {
    type Error = FastaError;

    fn read_from(reader: &mut impl BufRead) -> Result<SequenceAlignment, Self::Error> {
        let records = Self::read_records(reader)?;
        Ok(SequenceAlignment::new(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ALIGNMENT: &str = ">iso1 sampled 2009\nACGT\nAC\n>iso2\nACGTTC\n";

    #[test]
    fn reads_multiline_records_into_an_alignment() {
        let mut reader = ALIGNMENT.as_bytes();
        let alignment = FastaAlignmentReader::read_from(&mut reader).unwrap();
        assert_eq!(alignment.num_sequences(), 2);
        assert_eq!(alignment.width(), 6);
        assert_eq!(alignment.row(0), Some("ACGTAC"));
        assert_eq!(alignment.isolate_ids(), ["iso1", "iso2"]);
        assert_eq!(alignment.records()[0].id, "iso1 sampled 2009");
    }

    #[test]
    fn unequal_records_are_rejected() {
        let mut reader = ">a\nACGT\n>b\nAC\n".as_bytes();
        let result = FastaAlignmentReader::read_from(&mut reader);
        assert!(matches!(
            result,
            Err(FastaError::Alignment(AlignmentError::UnequalLength { .. }))
        ));
    }

    #[test]
    fn reads_alignment_and_first_sequence_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(ALIGNMENT.as_bytes()).unwrap();

        let alignment = FastaAlignmentReader::read_from_path(file.path()).unwrap();
        assert_eq!(alignment.num_sequences(), 2);

        let first = FastaAlignmentReader::read_first_sequence(file.path()).unwrap();
        assert_eq!(first.sequence, "ACGTAC");
    }

    #[test]
    fn first_sequence_of_empty_file_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            FastaAlignmentReader::read_first_sequence(file.path()),
            Err(FastaError::Empty)
        ));
    }
}
