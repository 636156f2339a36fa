use phf::{phf_map, phf_set};

static THREE_TO_ONE: phf::Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    // Common protonation and modification variants.
    "HID" => 'H', "HIE" => 'H', "HIP" => 'H', "HSD" => 'H', "HSE" => 'H', "HSP" => 'H',
    "CYX" => 'C', "CYM" => 'C', "ASH" => 'D', "GLH" => 'E', "LYN" => 'K',
    "MSE" => 'M', "SEC" => 'U', "PYL" => 'O', "ASX" => 'B', "GLX" => 'Z',
};

static SOLVENT_NAMES: phf::Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "TIP", "TIP3", "SOL",
};

/// Maximum accessible surface areas (Å²) from Sander & Rost (1994).
static SANDER_MAX_ASA: phf::Map<char, f64> = phf_map! {
    'A' => 106.0, 'R' => 248.0, 'N' => 157.0, 'D' => 163.0, 'C' => 135.0,
    'Q' => 198.0, 'E' => 194.0, 'G' => 84.0, 'H' => 184.0, 'I' => 169.0,
    'L' => 164.0, 'K' => 205.0, 'M' => 188.0, 'F' => 197.0, 'P' => 136.0,
    'S' => 130.0, 'T' => 142.0, 'W' => 227.0, 'Y' => 222.0, 'V' => 142.0,
};

pub const UNKNOWN_RESIDUE_CODE: char = 'X';

/// One-letter code for a three-letter residue name, `X` when the name is not recognized.
pub fn one_letter_code(residue_name: &str) -> char {
    let name = residue_name.trim().to_ascii_uppercase();
    THREE_TO_ONE
        .get(name.as_str())
        .copied()
        .unwrap_or(UNKNOWN_RESIDUE_CODE)
}

pub fn is_solvent(residue_name: &str) -> bool {
    SOLVENT_NAMES.contains(residue_name.trim().to_ascii_uppercase().as_str())
}

/// Accepts either a one-letter code or a three-letter residue name.
pub fn parse_amino_acid(token: &str) -> Option<char> {
    let token = token.trim();
    match token.len() {
        1 => token
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .filter(char::is_ascii_alphabetic),
        3 => Some(one_letter_code(token)).filter(|&c| c != UNKNOWN_RESIDUE_CODE),
        _ => None,
    }
}

pub fn max_accessible_surface_area(code: char) -> Option<f64> {
    SANDER_MAX_ASA.get(&code.to_ascii_uppercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_and_variant_names_map_to_one_letter_codes() {
        assert_eq!(one_letter_code("ALA"), 'A');
        assert_eq!(one_letter_code("trp"), 'W');
        assert_eq!(one_letter_code("HIE"), 'H');
        assert_eq!(one_letter_code("MSE"), 'M');
    }

    #[test]
    fn unknown_residue_names_map_to_x() {
        assert_eq!(one_letter_code("LIG"), 'X');
        assert_eq!(one_letter_code(""), 'X');
    }

    #[test]
    fn solvent_names_are_detected_case_insensitively() {
        assert!(is_solvent("HOH"));
        assert!(is_solvent("wat"));
        assert!(!is_solvent("ALA"));
    }

    #[test]
    fn amino_acid_tokens_accept_one_and_three_letter_forms() {
        assert_eq!(parse_amino_acid("k"), Some('K'));
        assert_eq!(parse_amino_acid("Lys"), Some('K'));
        assert_eq!(parse_amino_acid("XYZ"), None);
        assert_eq!(parse_amino_acid("1"), None);
        assert_eq!(parse_amino_acid("LYSINE"), None);
    }

    #[test]
    fn max_asa_is_defined_for_the_twenty_standard_residues() {
        let standard = "ACDEFGHIKLMNPQRSTVWY";
        assert!(standard.chars().all(|c| max_accessible_surface_area(c).is_some()));
        assert_eq!(max_accessible_surface_area('g'), Some(84.0));
        assert_eq!(max_accessible_surface_area('X'), None);
    }
}
