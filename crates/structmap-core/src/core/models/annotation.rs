use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// DSSP secondary structure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecondaryStructure {
    AlphaHelix,
    IsolatedBridge,
    Strand,
    Helix310,
    PiHelix,
    Turn,
    Bend,
    Coil,
}

impl SecondaryStructure {
    /// Classes in index order.
    pub const ALL: [SecondaryStructure; 8] = [
        Self::AlphaHelix,
        Self::IsolatedBridge,
        Self::Strand,
        Self::Helix310,
        Self::PiHelix,
        Self::Turn,
        Self::Bend,
        Self::Coil,
    ];

    pub fn from_code(code: char) -> Self {
        match code {
            'H' => Self::AlphaHelix,
            'B' => Self::IsolatedBridge,
            'E' => Self::Strand,
            'G' => Self::Helix310,
            'I' => Self::PiHelix,
            'T' => Self::Turn,
            'S' => Self::Bend,
            _ => Self::Coil,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::AlphaHelix => 'H',
            Self::IsolatedBridge => 'B',
            Self::Strand => 'E',
            Self::Helix310 => 'G',
            Self::PiHelix => 'I',
            Self::Turn => 'T',
            Self::Bend => 'S',
            Self::Coil => '-',
        }
    }

    /// Numeric class index: H0 B1 E2 G3 I4 T5 S6, coil 7.
    pub fn index(&self) -> u8 {
        match self {
            Self::AlphaHelix => 0,
            Self::IsolatedBridge => 1,
            Self::Strand => 2,
            Self::Helix310 => 3,
            Self::PiHelix => 4,
            Self::Turn => 5,
            Self::Bend => 6,
            Self::Coil => 7,
        }
    }

    /// Inverse of [`Self::index`].
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }
}

impl fmt::Display for SecondaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueAnnotation {
    pub secondary_structure: SecondaryStructure,
    pub relative_accessibility: Option<f64>,
}

/// Per-residue annotations of one model, keyed by chain id and residue number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    entries: BTreeMap<(String, isize), ResidueAnnotation>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, chain_id: &str, residue_number: isize, annotation: ResidueAnnotation) {
        self.entries
            .insert((chain_id.to_string(), residue_number), annotation);
    }

    pub fn get(&self, chain_id: &str, residue_number: isize) -> Option<&ResidueAnnotation> {
        self.entries.get(&(chain_id.to_string(), residue_number))
    }

    pub fn for_chain<'a>(
        &'a self,
        chain_id: &'a str,
    ) -> impl Iterator<Item = (isize, &'a ResidueAnnotation)> + 'a {
        self.entries
            .iter()
            .filter(move |((chain, _), _)| chain == chain_id)
            .map(|((_, number), annotation)| (*number, annotation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Annotation slot shared by a model and its chains; set at most once.
pub(crate) type SharedAnnotation = Arc<OnceLock<AnnotationTable>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_structure_indices_follow_dssp_order() {
        let codes = ['H', 'B', 'E', 'G', 'I', 'T', 'S', '-'];
        let indices: Vec<u8> = codes
            .iter()
            .map(|&c| SecondaryStructure::from_code(c).index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn numeric_codes_round_trip() {
        for index in 0..=7u8 {
            let class = SecondaryStructure::from_index(index).unwrap();
            assert_eq!(class.index(), index);
            assert_eq!(SecondaryStructure::from_code(class.code()), class);
        }
        assert_eq!(SecondaryStructure::from_index(0).map(|c| c.code()), Some('H'));
        assert_eq!(SecondaryStructure::from_index(7).map(|c| c.code()), Some('-'));
        assert_eq!(SecondaryStructure::from_index(8), None);
    }

    #[test]
    fn unrecognized_codes_are_coil() {
        assert_eq!(SecondaryStructure::from_code(' '), SecondaryStructure::Coil);
        assert_eq!(SecondaryStructure::from_code('P'), SecondaryStructure::Coil);
        assert_eq!(SecondaryStructure::Coil.code(), '-');
    }

    #[test]
    fn table_filters_entries_by_chain() {
        let mut table = AnnotationTable::new();
        let helix = ResidueAnnotation {
            secondary_structure: SecondaryStructure::AlphaHelix,
            relative_accessibility: Some(0.5),
        };
        table.insert("A", 1, helix);
        table.insert("A", 2, helix);
        table.insert("B", 1, helix);

        assert_eq!(table.len(), 3);
        assert_eq!(table.for_chain("A").count(), 2);
        assert!(table.get("B", 1).is_some());
        assert!(table.get("B", 2).is_none());
    }
}
