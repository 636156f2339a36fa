use super::atom::{ALPHA_CARBON, Atom};
use crate::core::utils::identifiers;

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,
    pub insertion_code: Option<char>,
    pub name: String,
    pub code: char,
    pub(crate) atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(number: isize, insertion_code: Option<char>, name: &str) -> Self {
        let name = name.trim().to_ascii_uppercase();
        Self {
            number,
            insertion_code,
            code: identifiers::one_letter_code(&name),
            name,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name == name)
    }

    /// True for standard and modified amino acids such as MSE, which files often record as HETATM.
    pub fn is_amino_acid(&self) -> bool {
        self.code != identifiers::UNKNOWN_RESIDUE_CODE
    }

    /// Every atom of an amino acid; only the non-hetero atoms of anything else.
    pub fn polymer_atoms(&self) -> impl Iterator<Item = &Atom> {
        let amino_acid = self.is_amino_acid();
        self.atoms.iter().filter(move |a| amino_acid || !a.is_hetero)
    }

    /// A residue takes part in spatial queries only if it is not solvent and has at least one polymer atom.
    pub fn is_polymer(&self) -> bool {
        !identifiers::is_solvent(&self.name) && self.polymer_atoms().next().is_some()
    }

    pub fn named_or_alpha_carbon(&self, name: &str) -> Option<&Atom> {
        self.atom(name).or_else(|| self.atom(ALPHA_CARBON))
    }
}
