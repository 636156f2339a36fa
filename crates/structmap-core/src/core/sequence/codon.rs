use phf::phf_map;

pub const STOP: char = '*';

/// The standard genetic code (NCBI table 1).
static STANDARD_CODE: phf::Map<&'static str, char> = phf_map! {
    "TTT" => 'F', "TTC" => 'F', "TTA" => 'L', "TTG" => 'L',
    "CTT" => 'L', "CTC" => 'L', "CTA" => 'L', "CTG" => 'L',
    "ATT" => 'I', "ATC" => 'I', "ATA" => 'I', "ATG" => 'M',
    "GTT" => 'V', "GTC" => 'V', "GTA" => 'V', "GTG" => 'V',
    "TCT" => 'S', "TCC" => 'S', "TCA" => 'S', "TCG" => 'S',
    "CCT" => 'P', "CCC" => 'P', "CCA" => 'P', "CCG" => 'P',
    "ACT" => 'T', "ACC" => 'T', "ACA" => 'T', "ACG" => 'T',
    "GCT" => 'A', "GCC" => 'A', "GCA" => 'A', "GCG" => 'A',
    "TAT" => 'Y', "TAC" => 'Y', "TAA" => '*', "TAG" => '*',
    "CAT" => 'H', "CAC" => 'H', "CAA" => 'Q', "CAG" => 'Q',
    "AAT" => 'N', "AAC" => 'N', "AAA" => 'K', "AAG" => 'K',
    "GAT" => 'D', "GAC" => 'D', "GAA" => 'E', "GAG" => 'E',
    "TGT" => 'C', "TGC" => 'C', "TGA" => '*', "TGG" => 'W',
    "CGT" => 'R', "CGC" => 'R', "CGA" => 'R', "CGG" => 'R',
    "AGT" => 'S', "AGC" => 'S', "AGA" => 'R', "AGG" => 'R',
    "GGT" => 'G', "GGC" => 'G', "GGA" => 'G', "GGG" => 'G',
};

/// Translates one codon; gaps, ambiguity codes and short codons give `X`.
pub fn translate_codon(codon: &[u8]) -> char {
    if codon.len() != 3 {
        return 'X';
    }
    let normalized: String = codon
        .iter()
        .map(|&b| match b.to_ascii_uppercase() {
            b'U' => 'T',
            other => other as char,
        })
        .collect();
    STANDARD_CODE
        .get(normalized.as_str())
        .copied()
        .unwrap_or('X')
}

/// Translates `nucleotides` starting at `frame` (0, 1 or 2); a trailing partial codon is dropped.
pub fn translate_frame(nucleotides: &[u8], frame: usize) -> String {
    nucleotides
        .get(frame..)
        .unwrap_or_default()
        .chunks_exact(3)
        .map(translate_codon)
        .collect()
}
