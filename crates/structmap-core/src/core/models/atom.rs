use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

pub const ALPHA_CARBON: &str = "CA";

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub serial: usize,
    pub name: String,
    pub position: Point3<f64>,
    pub is_hetero: bool,
}

impl Atom {
    pub fn new(serial: usize, name: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.trim().to_string(),
            position,
            is_hetero: false,
        }
    }

    pub fn with_hetero(mut self, is_hetero: bool) -> Self {
        self.is_hetero = is_hetero;
        self
    }
}

/// Which atoms of a residue stand in for it when measuring inter-residue distance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AtomSelector {
    /// Every polymer atom; distance is the closest pair between two residues.
    #[default]
    All,
    /// A single named atom, falling back to the alpha carbon when absent.
    Named(String),
}

impl AtomSelector {
    pub fn named(name: &str) -> Self {
        Self::Named(name.trim().to_ascii_uppercase())
    }
}

impl FromStr for AtomSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::named(trimmed))
        }
    }
}

impl fmt::Display for AtomSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_trims_name_and_defaults_to_polymer() {
        let atom = Atom::new(7, " CA ", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.serial, 7);
        assert_eq!(atom.name, "CA");
        assert!(!atom.is_hetero);
        assert!(atom.with_hetero(true).is_hetero);
    }

    #[test]
    fn selector_parses_all_and_named_atoms() {
        assert_eq!("all".parse::<AtomSelector>().unwrap(), AtomSelector::All);
        assert_eq!("ALL".parse::<AtomSelector>().unwrap(), AtomSelector::All);
        assert_eq!(
            " cb ".parse::<AtomSelector>().unwrap(),
            AtomSelector::Named("CB".to_string())
        );
    }

    #[test]
    fn selector_display_round_trips_through_parse() {
        for selector in [AtomSelector::All, AtomSelector::named("CA")] {
            let text = selector.to_string();
            assert_eq!(text.parse::<AtomSelector>().unwrap(), selector);
        }
    }
}
