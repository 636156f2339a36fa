use std::collections::BTreeSet;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AlignmentError {
    #[error("Sequence '{id}' has length {length}, expected {expected}")]
    UnequalLength {
        id: String,
        length: usize,
        expected: usize,
    },
    #[error("Sequence '{id}' contains non-ASCII characters")]
    NonAscii { id: String },
    #[error("Column {column} is out of range for an alignment of width {width}")]
    ColumnOutOfRange { column: usize, width: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(id: &str, sequence: &str) -> Self {
        Self {
            id: id.to_string(),
            sequence: sequence.trim().to_ascii_uppercase(),
        }
    }

    /// First whitespace-delimited token of the record id.
    pub fn isolate_id(&self) -> &str {
        self.id.split_whitespace().next().unwrap_or("")
    }
}

/// Equal-length aligned sequences with lazily cached per-column character sets.
#[derive(Debug, Clone, Default)]
pub struct SequenceAlignment {
    records: Vec<SequenceRecord>,
    width: usize,
    column_sets: Vec<OnceLock<BTreeSet<u8>>>,
    isolate_ids: OnceLock<Vec<String>>,
}

impl SequenceAlignment {
    pub fn new(records: Vec<SequenceRecord>) -> Result<Self, AlignmentError> {
        let width = records.first().map_or(0, |r| r.sequence.len());
        for record in &records {
            if !record.sequence.is_ascii() {
                return Err(AlignmentError::NonAscii {
                    id: record.id.clone(),
                });
            }
            if record.sequence.len() != width {
                return Err(AlignmentError::UnequalLength {
                    id: record.id.clone(),
                    length: record.sequence.len(),
                    expected: width,
                });
            }
        }
        Ok(Self {
            records,
            width,
            column_sets: (0..width).map(|_| OnceLock::new()).collect(),
            isolate_ids: OnceLock::new(),
        })
    }

    /// Builds an alignment with generated ids `seq1`, `seq2`, ...
    pub fn from_sequences<I, S>(sequences: I) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = sequences
            .into_iter()
            .enumerate()
            .map(|(i, s)| SequenceRecord::new(&format!("seq{}", i + 1), s.as_ref()))
            .collect();
        Self::new(records)
    }

    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    pub fn num_sequences(&self) -> usize {
        self.records.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() || self.width == 0
    }

    pub fn row(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(|r| r.sequence.as_str())
    }

    /// Characters of column `index` (0-based), one per sequence.
    pub fn column(&self, index: usize) -> impl Iterator<Item = u8> + '_ {
        self.records
            .iter()
            .filter_map(move |r| r.sequence.as_bytes().get(index).copied())
    }

    pub fn column_characters(&self, index: usize) -> Option<&BTreeSet<u8>> {
        let slot = self.column_sets.get(index)?;
        Some(slot.get_or_init(|| self.column(index).collect()))
    }

    pub fn isolate_ids(&self) -> &[String] {
        self.isolate_ids.get_or_init(|| {
            self.records
                .iter()
                .map(|r| r.isolate_id().to_string())
                .collect()
        })
    }

    /// Sub-alignment made of the given 0-based columns, in the order given.
    pub fn select_columns(&self, columns: &[usize]) -> Result<Self, AlignmentError> {
        if let Some(&column) = columns.iter().find(|&&c| c >= self.width) {
            return Err(AlignmentError::ColumnOutOfRange {
                column,
                width: self.width,
            });
        }
        let records = self
            .records
            .iter()
            .map(|r| {
                let bytes = r.sequence.as_bytes();
                let sequence: String = columns.iter().map(|&c| bytes[c] as char).collect();
                SequenceRecord {
                    id: r.id.clone(),
                    sequence,
                }
            })
            .collect();
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_unequal_lengths() {
        let records = vec![
            SequenceRecord::new("a", "ACGT"),
            SequenceRecord::new("b", "ACG"),
        ];
        assert_eq!(
            SequenceAlignment::new(records).unwrap_err(),
            AlignmentError::UnequalLength {
                id: "b".to_string(),
                length: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn empty_alignment_is_valid_and_empty() {
        let alignment = SequenceAlignment::new(Vec::new()).unwrap();
        assert!(alignment.is_empty());
        assert_eq!(alignment.width(), 0);
        assert!(alignment.column_characters(0).is_none());
    }

    #[test]
    fn sequences_are_uppercased() {
        let alignment = SequenceAlignment::from_sequences(["acgt", "ACGA"]).unwrap();
        assert_eq!(alignment.row(0), Some("ACGT"));
        assert_eq!(alignment.records()[1].id, "seq2");
    }

    #[test]
    fn column_characters_are_cached_sets() {
        let alignment = SequenceAlignment::from_sequences(["AC-T", "AGNT", "ACGT"]).unwrap();
        let column = alignment.column_characters(1).unwrap();
        assert_eq!(column.iter().copied().collect::<Vec<_>>(), b"CG".to_vec());
        assert!(std::ptr::eq(column, alignment.column_characters(1).unwrap()));
        assert_eq!(alignment.column_characters(2).unwrap().len(), 3);
        assert!(alignment.column_characters(4).is_none());
    }

    #[test]
    fn isolate_ids_use_the_first_token() {
        let records = vec![
            SequenceRecord::new("iso1 collected 2009", "AC"),
            SequenceRecord::new("iso2", "AG"),
        ];
        let alignment = SequenceAlignment::new(records).unwrap();
        assert_eq!(alignment.isolate_ids(), ["iso1", "iso2"]);
    }

    #[test]
    fn select_columns_builds_a_sub_alignment() {
        let alignment = SequenceAlignment::from_sequences(["ACGTAC", "TTGTAA"]).unwrap();
        let sub = alignment.select_columns(&[0, 2, 5]).unwrap();
        assert_eq!(sub.width(), 3);
        assert_eq!(sub.row(0), Some("AGC"));
        assert_eq!(sub.row(1), Some("TGA"));

        assert_eq!(
            alignment.select_columns(&[6]).unwrap_err(),
            AlignmentError::ColumnOutOfRange {
                column: 6,
                width: 6
            }
        );
    }
}
