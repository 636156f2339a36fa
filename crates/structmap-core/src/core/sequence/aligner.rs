use super::codon;
use bio::alignment::AlignmentOperation;
use bio::alignment::pairwise::Aligner;
use bio::scores::blosum62;
use tracing::trace;

/// 0-based (query, target) positions paired by an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseAlignment {
    pub pairs: Vec<(usize, usize)>,
    pub score: f64,
}

/// 0-based protein position → the three 0-based nucleotide positions of its codon.
#[derive(Debug, Clone, PartialEq)]
pub struct CodonAlignment {
    pub codons: Vec<(usize, [usize; 3])>,
    pub score: f64,
}

/// Sequence alignment collaborator. Implementations return `None` when no alignment can be established.
pub trait SequenceAligner: Send + Sync {
    fn align(&self, query: &str, target: &str) -> Option<PairwiseAlignment>;

    fn align_to_nucleotides(&self, protein: &str, nucleotides: &str) -> Option<CodonAlignment>;
}

/// Local protein alignment (Smith-Waterman, BLOSUM62, affine gaps) provided by `bio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalAligner {
    pub gap_open: i32,
    pub gap_extend: i32,
    pub min_score: i32,
}

impl Default for LocalAligner {
    fn default() -> Self {
        Self {
            gap_open: -11,
            gap_extend: -1,
            min_score: 0,
        }
    }
}

impl LocalAligner {
    pub fn new() -> Self {
        Self::default()
    }

    fn local(&self, x: &[u8], y: &[u8]) -> Option<PairwiseAlignment> {
        if x.is_empty() || y.is_empty() {
            return None;
        }
        let mut aligner =
            Aligner::with_capacity(x.len(), y.len(), self.gap_open, self.gap_extend, &blosum62);
        let alignment = aligner.local(x, y);
        if alignment.score <= self.min_score {
            return None;
        }

        let (mut i, mut j) = (alignment.xstart, alignment.ystart);
        let mut pairs = Vec::new();
        for op in &alignment.operations {
            match op {
                AlignmentOperation::Match | AlignmentOperation::Subst => {
                    pairs.push((i, j));
                    i += 1;
                    j += 1;
                }
                AlignmentOperation::Ins => i += 1,
                AlignmentOperation::Del => j += 1,
                AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {}
            }
        }
        Some(PairwiseAlignment {
            pairs,
            score: f64::from(alignment.score),
        })
    }
}

impl SequenceAligner for LocalAligner {
    fn align(&self, query: &str, target: &str) -> Option<PairwiseAlignment> {
        self.local(&sanitize(query), &sanitize(target))
    }

    fn align_to_nucleotides(&self, protein: &str, nucleotides: &str) -> Option<CodonAlignment> {
        let protein = sanitize(protein);
        let nucleotides = nucleotides.as_bytes();

        let mut best: Option<CodonAlignment> = None;
        for frame in 0..3 {
            let translated = codon::translate_frame(nucleotides, frame);
            let Some(alignment) = self.local(&protein, translated.as_bytes()) else {
                continue;
            };
            trace!("Frame {} aligned with score {}.", frame, alignment.score);
            if best.as_ref().is_some_and(|b| b.score >= alignment.score) {
                continue;
            }
            let codons = alignment
                .pairs
                .iter()
                .map(|&(p, t)| {
                    let start = frame + 3 * t;
                    (p, [start, start + 1, start + 2])
                })
                .collect();
            best = Some(CodonAlignment {
                codons,
                score: alignment.score,
            });
        }
        best
    }
}

/// Uppercases letters and replaces every other byte with `X`.
fn sanitize(sequence: &str) -> Vec<u8> {
    sequence
        .trim()
        .bytes()
        .map(|b| {
            if b.is_ascii_alphabetic() || b == b'*' {
                b.to_ascii_uppercase()
            } else {
                b'X'
            }
        })
        .collect()
}
