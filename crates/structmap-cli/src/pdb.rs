use nalgebra::Point3;
use std::collections::BTreeMap;
use std::path::Path;
use structmap::core::io::traits::StructureParser;
use structmap::core::models::builder::{BuildError, StructureBuilder};
use structmap::core::models::structure::Structure;
use structmap::core::utils::identifiers;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Read(String),
    #[error("Inconsistent structure: {0}")]
    Build(#[from] BuildError),
}

/// Reads PDB and mmCIF files through `pdbtbx`. Models are numbered from 0 in file order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdbStructureParser;

impl StructureParser for PdbStructureParser {
    type Error = PdbError;

    fn parse_path(&self, path: &Path) -> Result<Structure, Self::Error> {
        let (pdb, warnings) = pdbtbx::open(&path.to_string_lossy()).map_err(|errors| {
            PdbError::Read(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        })?;
        for warning in &warnings {
            trace!("pdbtbx: {}", warning);
        }
        debug!(
            "Read {:?}: {} model(s), {} warning(s).",
            path,
            pdb.model_count(),
            warnings.len()
        );

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "structure".to_string());
        let mut builder = StructureBuilder::new(&name);

        let text = std::fs::read_to_string(path)?;
        for (chain, sequence) in seqres_sequences(&text) {
            builder.header_sequence(&chain, &sequence);
        }

        for (model_id, model) in pdb.models().enumerate() {
            builder.start_model(model_id);
            for chain in model.chains() {
                builder.start_chain(chain.id());
                for residue in chain.residues() {
                    let (number, insertion_code) = residue.id();
                    let insertion_code = insertion_code.and_then(|code| code.chars().next());
                    builder.start_residue(number, insertion_code, residue.name().unwrap_or("UNK"));
                    for atom in residue.atoms() {
                        let (x, y, z) = atom.pos();
                        builder.add_atom(
                            atom.serial_number(),
                            atom.name(),
                            Point3::new(x, y, z),
                            atom.hetero(),
                        );
                    }
                }
            }
        }
        Ok(builder.build()?)
    }
}

/// Chain id → one-letter sequence from the SEQRES records of PDB text.
pub fn seqres_sequences(text: &str) -> BTreeMap<String, String> {
    let mut sequences: BTreeMap<String, String> = BTreeMap::new();
    for line in text.lines().filter(|l| l.starts_with("SEQRES")) {
        let (Some(chain), Some(residues)) = (line.get(11..12), line.get(19..)) else {
            continue;
        };
        sequences
            .entry(chain.trim().to_string())
            .or_default()
            .extend(residues.split_whitespace().map(identifiers::one_letter_code));
    }
    sequences
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PDB: &str = "\
ATOM      1  N   MET A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  MET A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  CA  LYS A   2      13.100   7.200  -4.100  1.00  0.00           C
ATOM      4  CA  ALA A   4      16.900   8.100  -2.000  1.00  0.00           C
HETATM    5  O   HOH A 101       1.000   1.000   1.000  1.00  0.00           O
END
";

    #[test]
    fn seqres_records_become_chain_sequences() {
        let text = "\
SEQRES   1 A    3  MET LYS THR
SEQRES   2 A    3  MSE
SEQRES   1 B    1  GLY
";
        let sequences = seqres_sequences(text);
        assert_eq!(sequences["A"], "MKTM");
        assert_eq!(sequences["B"], "G");
    }

    #[test]
    fn pdb_files_are_parsed_into_the_model_tree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mini.pdb");
        fs::write(&path, PDB).unwrap();

        let structure = PdbStructureParser.parse_path(&path).unwrap();
        assert_eq!(structure.name(), "mini");
        let chain = structure.chain(0, "A").unwrap();
        assert_eq!(chain.sequence(), "MKA");
        assert_eq!(chain.polymer_residues().count(), 3);
        assert_eq!(
            chain.residue_to_atom_map(),
            BTreeMap::from([(1, vec![1, 2]), (2, vec![3]), (4, vec![4])])
        );
    }

    #[test]
    fn selenomethionine_hetatm_records_stay_in_the_chain() {
        let text = "\
ATOM      1  CA  LYS A   2      13.100   7.200  -4.100  1.00  0.00           C
HETATM    2  N   MSE A   3      14.200   7.500  -3.600  1.00  0.00           N
HETATM    3  CA  MSE A   3      15.000   7.800  -3.000  1.00  0.00           C
ATOM      4  CA  ALA A   4      16.900   8.100  -2.000  1.00  0.00           C
END
";
        let dir = tempdir().unwrap();
        let path = dir.path().join("mse.pdb");
        fs::write(&path, text).unwrap();

        let structure = PdbStructureParser.parse_path(&path).unwrap();
        let chain = structure.chain(0, "A").unwrap();
        assert_eq!(chain.sequence(), "KMA");
        assert_eq!(chain.residue_to_atom_map()[&3], vec![2, 3]);
    }

    #[test]
    fn missing_files_fail() {
        let dir = tempdir().unwrap();
        assert!(PdbStructureParser.parse_path(&dir.path().join("none.pdb")).is_err());
    }
}
