use super::traits::{AnnotationError, AnnotationProvider};
use crate::core::models::annotation::{AnnotationTable, ResidueAnnotation, SecondaryStructure};
use crate::core::models::model::Model;
use crate::core::utils::identifiers;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

const DEFAULT_EXECUTABLES: [&str; 2] = ["mkdssp", "dssp"];
const HEADER_PREFIX: &str = "  #  RESIDUE";

/// Runs an external DSSP program on the structure file and reads its classic output.
#[derive(Debug, Clone)]
pub struct DsspAnnotator {
    structure_path: PathBuf,
    executables: Vec<String>,
}

impl DsspAnnotator {
    pub fn new(structure_path: impl Into<PathBuf>) -> Self {
        Self {
            structure_path: structure_path.into(),
            executables: DEFAULT_EXECUTABLES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Executables to try, in order.
    pub fn with_executables(mut self, executables: Vec<String>) -> Self {
        self.executables = executables;
        self
    }

    fn run(&self) -> Result<String, AnnotationError> {
        let mut failures = Vec::new();
        for exe in &self.executables {
            debug!("Running '{}' on {:?}", exe, self.structure_path);
            match Command::new(exe).arg(&self.structure_path).output() {
                Ok(output) if output.status.success() => {
                    return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("'{}' exited with {}: {}", exe, output.status, stderr.trim());
                    failures.push(format!("{} exited with {}", exe, output.status));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    failures.push(format!("{} not found", exe));
                }
                Err(e) => return Err(AnnotationError::Io(e)),
            }
        }
        Err(AnnotationError::Unavailable(failures.join("; ")))
    }
}

impl AnnotationProvider for DsspAnnotator {
    fn annotate(&self, model: &Model) -> Result<AnnotationTable, AnnotationError> {
        if !model.is_canonical() {
            return Ok(AnnotationTable::default());
        }
        parse_dssp(&self.run()?)
    }
}

/// Parses classic DSSP output. Relative accessibility is ACC over the Sander maximum for the residue.
pub fn parse_dssp(text: &str) -> Result<AnnotationTable, AnnotationError> {
    let mut lines = text.lines().enumerate();
    if !lines.any(|(_, line)| line.starts_with(HEADER_PREFIX)) {
        return Err(AnnotationError::Parse {
            line: 0,
            reason: "missing residue table header".to_string(),
        });
    }

    let mut table = AnnotationTable::new();
    for (idx, line) in lines {
        // Chain breaks are marked with '!' in the amino-acid column.
        if line.get(13..14) == Some("!") || line.trim().is_empty() {
            continue;
        }
        let parse_error = |reason: &str| AnnotationError::Parse {
            line: idx + 1,
            reason: reason.to_string(),
        };

        let number: isize = line
            .get(5..10)
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| parse_error("invalid residue number"))?;
        let chain_id = line.get(11..12).map(str::trim).unwrap_or_default();
        let amino_acid = line
            .get(13..14)
            .and_then(|s| s.chars().next())
            .ok_or_else(|| parse_error("missing amino acid"))?;
        // Lowercase letters denote bridged cysteines.
        let code = if amino_acid.is_ascii_lowercase() {
            'C'
        } else {
            amino_acid
        };
        let structure = line
            .get(16..17)
            .and_then(|s| s.chars().next())
            .map_or(SecondaryStructure::Coil, SecondaryStructure::from_code);
        let accessibility: Option<f64> = line.get(34..38).and_then(|s| s.trim().parse().ok());

        let relative = accessibility.and_then(|acc| {
            identifiers::max_accessible_surface_area(code).map(|max| acc / max)
        });
        table.insert(
            chain_id,
            number,
            ResidueAnnotation {
                secondary_structure: structure,
                relative_accessibility: relative,
            },
        );
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::StructureBuilder;
    use nalgebra::Point3;

    const DSSP: &str = "\
==== Secondary Structure Definition by the program DSSP ====
  #  RESIDUE AA STRUCTURE BP1 BP2  ACC     N-H-->O    O-->H-N    N-H-->O    O-->H-N    TCO  KAPPA ALPHA  PHI   PSI    X-CA   Y-CA   Z-CA
    1    1 A M              0   0  188      0, 0.0     2,-0.3     0, 0.0     0, 0.0   0.000 360.0 360.0 360.0 131.3   -2.5   14.0   -0.6
    2    2 A K  H  > S+     0   0  102      1,-0.2     4,-2.5     1,-0.1     5,-0.1   0.881 360.0 360.0 -62.0 -41.6   -2.3   11.7    2.5
    3        !              0   0    0      0, 0.0     0, 0.0     0, 0.0     0, 0.0   0.000 360.0 360.0 360.0 360.0    0.0    0.0    0.0
    4   10 B a  E     -A    0   0   27      0, 0.0     0, 0.0     0, 0.0     0, 0.0   0.000 360.0 360.0 360.0 360.0    0.0    0.0    0.0
";

    #[test]
    fn parses_structure_and_relative_accessibility() {
        let table = parse_dssp(DSSP).unwrap();
        assert_eq!(table.len(), 3);

        let first = table.get("A", 1).unwrap();
        assert_eq!(first.secondary_structure, SecondaryStructure::Coil);
        assert_eq!(first.relative_accessibility, Some(1.0));

        let helix = table.get("A", 2).unwrap();
        assert_eq!(helix.secondary_structure, SecondaryStructure::AlphaHelix);
        assert_eq!(helix.relative_accessibility, Some(102.0 / 205.0));
    }

    #[test]
    fn bridged_cysteines_use_cysteine_max_asa() {
        let table = parse_dssp(DSSP).unwrap();
        let cys = table.get("B", 10).unwrap();
        assert_eq!(cys.secondary_structure, SecondaryStructure::Strand);
        assert_eq!(cys.relative_accessibility, Some(27.0 / 135.0));
    }

    #[test]
    fn output_without_header_is_rejected() {
        assert!(matches!(
            parse_dssp("not dssp output\n"),
            Err(AnnotationError::Parse { .. })
        ));
    }

    #[test]
    fn missing_executables_make_annotation_unavailable() {
        let mut builder = StructureBuilder::new("demo");
        builder
            .start_chain("A")
            .start_residue(1, None, "ALA")
            .add_atom(1, "CA", Point3::origin(), false);
        let structure = builder.build().unwrap();
        let model = structure.model(0).unwrap();

        let annotator = DsspAnnotator::new("/nonexistent.pdb")
            .with_executables(vec!["structmap-no-such-dssp".to_string()]);
        assert!(matches!(
            annotator.annotate(model),
            Err(AnnotationError::Unavailable(_))
        ));
        assert!(structure.annotate(&annotator).is_empty());
    }
}
