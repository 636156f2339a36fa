use crate::core::models::chain::Chain;
use crate::core::sequence::aligner::SequenceAligner;
use crate::core::utils::identifiers;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// 1-based genomic positions of the three nucleotides of a codon.
pub type Codon = [usize; 3];

/// Correspondence between sequence indices, structural residue numbers and a reference.
///
/// All sequence and reference indices are 1-based. The structure → reference leg is
/// the composition of the other two over the intersection of their domains.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrespondenceMap<R> {
    sequence_to_structure: BTreeMap<usize, isize>,
    structure_to_sequence: BTreeMap<isize, usize>,
    sequence_to_reference: BTreeMap<usize, R>,
    structure_to_reference: BTreeMap<isize, R>,
    score: Option<f64>,
}

impl<R: Copy> CorrespondenceMap<R> {
    pub fn compose(
        sequence_to_structure: BTreeMap<usize, isize>,
        sequence_to_reference: BTreeMap<usize, R>,
        score: Option<f64>,
    ) -> Self {
        let structure_to_sequence = sequence_to_structure
            .iter()
            .map(|(&index, &number)| (number, index))
            .collect();
        let structure_to_reference = sequence_to_structure
            .iter()
            .filter_map(|(index, &number)| {
                sequence_to_reference
                    .get(index)
                    .map(|&reference| (number, reference))
            })
            .collect();
        Self {
            sequence_to_structure,
            structure_to_sequence,
            sequence_to_reference,
            structure_to_reference,
            score,
        }
    }

    pub fn reference(&self, residue: isize) -> Option<R> {
        self.structure_to_reference.get(&residue).copied()
    }

    pub fn structure_number(&self, sequence_index: usize) -> Option<isize> {
        self.sequence_to_structure.get(&sequence_index).copied()
    }

    pub fn sequence_index(&self, residue: isize) -> Option<usize> {
        self.structure_to_sequence.get(&residue).copied()
    }

    pub fn sequence_to_structure(&self) -> &BTreeMap<usize, isize> {
        &self.sequence_to_structure
    }

    pub fn sequence_to_reference(&self) -> &BTreeMap<usize, R> {
        &self.sequence_to_reference
    }

    pub fn structure_to_reference(&self) -> &BTreeMap<isize, R> {
        &self.structure_to_reference
    }

    /// Alignment score of the sequence → reference leg, if an alignment was run.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn is_empty(&self) -> bool {
        self.structure_to_reference.is_empty()
    }
}

/// Numbering gaps up to this length are padded with placeholders before alignment.
const MAX_PADDED_GAP: isize = 30;

/// One-letter sequence of the polymer residues of `chain` and the structural number at
/// each position. Short numbering gaps are padded with `X`, which carry no number.
fn atom_sequence(chain: &Chain) -> (String, Vec<Option<isize>>) {
    let mut sequence = String::new();
    let mut numbers = Vec::new();
    let mut previous: Option<isize> = None;
    for residue in chain.polymer_residues() {
        let missing = previous.map_or(0, |p| residue.number - p - 1);
        if (1..=MAX_PADDED_GAP).contains(&missing) {
            for _ in 0..missing {
                sequence.push(identifiers::UNKNOWN_RESIDUE_CODE);
                numbers.push(None);
            }
        }
        sequence.push(residue.code);
        numbers.push(Some(residue.number));
        previous = Some(residue.number);
    }
    (sequence, numbers)
}

/// Builds correspondences through a [`SequenceAligner`]. Failed alignments give empty maps.
pub struct NumberingResolver<'a, A: SequenceAligner + ?Sized> {
    aligner: &'a A,
}

impl<'a, A: SequenceAligner + ?Sized> NumberingResolver<'a, A> {
    pub fn new(aligner: &'a A) -> Self {
        Self { aligner }
    }

    /// Sequence index (1-based) → structural number of the polymer residues of `chain`.
    ///
    /// The residues' own sequence is aligned to the chain sequence and aligned pairs place
    /// the residues, so repeats are resolved by the whole chain rather than a local match.
    /// Residues outside the alignment are left out; without an alignment the map is empty.
    pub fn sequence_to_structure(&self, chain: &Chain) -> BTreeMap<usize, isize> {
        let (atoms, numbers) = atom_sequence(chain);
        let sequence = chain.sequence();
        if atoms.is_empty() || sequence.trim().is_empty() {
            return BTreeMap::new();
        }
        if atoms.eq_ignore_ascii_case(sequence) {
            return numbers
                .iter()
                .enumerate()
                .filter_map(|(i, number)| number.map(|n| (i + 1, n)))
                .collect();
        }

        let Some(alignment) = self.aligner.align(&atoms, sequence) else {
            debug!(
                "Chain {}: residues could not be aligned to the chain sequence.",
                chain.id()
            );
            return BTreeMap::new();
        };
        let placed: BTreeMap<usize, isize> = alignment
            .pairs
            .into_iter()
            .filter_map(|(q, t)| numbers.get(q).copied().flatten().map(|n| (t + 1, n)))
            .collect();
        trace!(
            "Chain {}: {} of {} residues placed in the chain sequence (score {}).",
            chain.id(),
            placed.len(),
            chain.polymer_residues().count(),
            alignment.score
        );
        placed
    }

    /// Sequence index → reference index (both 1-based), with the alignment score.
    pub fn correspond_to_reference(
        &self,
        sequence: &str,
        reference: &str,
    ) -> (BTreeMap<usize, usize>, f64) {
        if sequence.trim().is_empty() || reference.trim().is_empty() {
            return (BTreeMap::new(), 0.0);
        }
        match self.aligner.align(sequence, reference) {
            Some(alignment) => (
                alignment
                    .pairs
                    .into_iter()
                    .map(|(q, t)| (q + 1, t + 1))
                    .collect(),
                alignment.score,
            ),
            None => {
                debug!("No alignment between sequence and reference.");
                (BTreeMap::new(), 0.0)
            }
        }
    }

    /// Sequence index → codon of 1-based positions in `genomic`. Gap characters in
    /// `genomic` are skipped for alignment but keep their positions.
    pub fn correspond_to_genome(&self, protein: &str, genomic: &str) -> BTreeMap<usize, Codon> {
        let (ungapped, columns): (String, Vec<usize>) = genomic
            .char_indices()
            .filter(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, c)| (c, i + 1))
            .unzip();
        if protein.trim().is_empty() || ungapped.is_empty() {
            return BTreeMap::new();
        }
        let Some(alignment) = self.aligner.align_to_nucleotides(protein, &ungapped) else {
            debug!("No protein-to-nucleotide alignment could be established.");
            return BTreeMap::new();
        };
        alignment
            .codons
            .into_iter()
            .filter_map(|(p, codon)| {
                let positions = [
                    *columns.get(codon[0])?,
                    *columns.get(codon[1])?,
                    *columns.get(codon[2])?,
                ];
                Some((p + 1, positions))
            })
            .collect()
    }

    /// Structure → reference correspondence. Without a reference, the chain sequence is its own reference.
    pub fn resolve_reference(
        &self,
        chain: &Chain,
        reference: Option<&str>,
    ) -> CorrespondenceMap<usize> {
        let to_structure = self.sequence_to_structure(chain);
        match reference {
            Some(reference) => {
                let (to_reference, score) = self.correspond_to_reference(chain.sequence(), reference);
                CorrespondenceMap::compose(to_structure, to_reference, Some(score))
            }
            None => {
                let identity = (1..=chain.sequence().chars().count())
                    .map(|i| (i, i))
                    .collect();
                CorrespondenceMap::compose(to_structure, identity, None)
            }
        }
    }

    pub fn resolve_genome(&self, chain: &Chain, genomic: &str) -> CorrespondenceMap<Codon> {
        let to_structure = self.sequence_to_structure(chain);
        let to_genome = self.correspond_to_genome(chain.sequence(), genomic);
        CorrespondenceMap::compose(to_structure, to_genome, None)
    }
}
