use crate::core::sequence::aligner::SequenceAligner;
use crate::core::sequence::alignment::SequenceAlignment;
use crate::engine::config::TajimaConfig;
use crate::engine::error::EngineError;
use crate::engine::numbering::{Codon, NumberingResolver};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::statistic::SlidingStatisticEngine;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Windowed values over the coding columns of an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct CodingWindows {
    /// Genomic position (1-based alignment column) of the window midpoint → statistic.
    pub by_genome: BTreeMap<usize, Option<f64>>,
    /// (protein position, statistic) pairs, in genomic order.
    pub by_protein: Vec<(usize, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TajimaResult {
    Whole(Option<f64>),
    /// Window midpoint (1-based column) → statistic.
    Windowed(BTreeMap<usize, Option<f64>>),
    Coding(CodingWindows),
}

/// Tajima's D over `alignment`.
///
/// With both references, only the columns of codons that translate `protein_ref` within
/// `genome_ref` are evaluated, in protein order. Without a window the statistic covers
/// the whole (sub-)alignment.
///
/// # Errors
///
/// Returns [`EngineError::MissingReference`] when only one of the two references is
/// supplied, and [`EngineError::InvalidInput`] for a zero window or step.
#[instrument(skip_all, name = "tajima_workflow")]
pub fn run<A>(
    alignment: &SequenceAlignment,
    config: &TajimaConfig,
    protein_ref: Option<&str>,
    genome_ref: Option<&str>,
    aligner: &A,
    reporter: &ProgressReporter,
) -> Result<TajimaResult, EngineError>
where
    A: SequenceAligner + ?Sized,
{
    reporter.report(Progress::PhaseStart { name: "Tajima's D" });
    info!(
        "Evaluating Tajima's D over {} sequences and {} columns.",
        alignment.num_sequences(),
        alignment.width()
    );
    let result = evaluate(alignment, config, protein_ref, genome_ref, aligner, reporter);
    reporter.report(Progress::PhaseFinish);
    result
}

fn evaluate<A>(
    alignment: &SequenceAlignment,
    config: &TajimaConfig,
    protein_ref: Option<&str>,
    genome_ref: Option<&str>,
    aligner: &A,
    reporter: &ProgressReporter,
) -> Result<TajimaResult, EngineError>
where
    A: SequenceAligner + ?Sized,
{
    Ok(match (protein_ref, genome_ref) {
        (None, None) => {
            let engine = SlidingStatisticEngine::new(alignment);
            match config.window {
                None => TajimaResult::Whole(engine.statistic()),
                Some(window) => TajimaResult::Windowed(engine.windowed_statistic(window, config.step)?),
            }
        }
        (Some(_), None) => {
            return Err(EngineError::MissingReference {
                argument: "genome_ref",
                method: "tajimasd".to_string(),
            });
        }
        (None, Some(_)) => {
            return Err(EngineError::MissingReference {
                argument: "protein_ref",
                method: "tajimasd".to_string(),
            });
        }
        (Some(protein), Some(genome)) => {
            coding(alignment, config, protein, genome, aligner, reporter)?
        }
    })
}

fn coding<A>(
    alignment: &SequenceAlignment,
    config: &TajimaConfig,
    protein: &str,
    genome: &str,
    aligner: &A,
    reporter: &ProgressReporter,
) -> Result<TajimaResult, EngineError>
where
    A: SequenceAligner + ?Sized,
{
    let protein_to_genome: BTreeMap<usize, Codon> =
        NumberingResolver::new(aligner).correspond_to_genome(protein, genome);
    if protein_to_genome.is_empty() {
        warn!("The protein reference could not be located in the genomic reference.");
    }

    let width = alignment.width();
    let positions: Vec<usize> = protein_to_genome
        .values()
        .flatten()
        .copied()
        .filter(|&p| (1..=width).contains(&p))
        .collect();
    if positions.len() < protein_to_genome.len() * 3 {
        reporter.message(format!(
            "{} codon position(s) fall outside the alignment and are ignored.",
            protein_to_genome.len() * 3 - positions.len()
        ));
    }
    let columns: Vec<usize> = positions.iter().map(|p| p - 1).collect();
    let coding = alignment.select_columns(&columns)?;
    info!("Restricted the alignment to {} coding columns.", coding.width());

    let engine = SlidingStatisticEngine::new(&coding);
    let Some(window) = config.window else {
        return Ok(TajimaResult::Whole(engine.statistic()));
    };

    let genome_to_protein: BTreeMap<usize, usize> = protein_to_genome
        .iter()
        .flat_map(|(&residue, codon)| codon.iter().map(move |&p| (p, residue)))
        .collect();
    let mut by_genome = BTreeMap::new();
    let mut by_protein = Vec::new();
    for (midpoint, value) in engine.windowed_statistic(window, config.step)? {
        let Some(&position) = positions.get(midpoint - 1) else {
            continue;
        };
        by_genome.insert(position, value);
        if let Some(&residue) = genome_to_protein.get(&position) {
            by_protein.push((residue, value));
        }
    }
    Ok(TajimaResult::Coding(CodingWindows {
        by_genome,
        by_protein,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::aligner::LocalAligner;
    use crate::engine::config::TajimaConfigBuilder;
    use crate::engine::statistic;
    use std::sync::Mutex;

    const SEQUENCES: [&str; 5] = [
        "ATGCATGCAT",
        "ATGCATGCAA",
        "ATGGATGCAT",
        "TTGCATCCAT",
        "ATGCATGCAT",
    ];

    fn alignment() -> SequenceAlignment {
        SequenceAlignment::from_sequences(SEQUENCES).unwrap()
    }

    #[test]
    fn whole_alignment_without_window() {
        let result = run(
            &alignment(),
            &TajimaConfig::default(),
            None,
            None,
            &LocalAligner::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let TajimaResult::Whole(Some(d)) = result else {
            panic!("expected a whole-alignment value, got {:?}", result);
        };
        assert!((d - -1.0937990658235193).abs() < 1e-12);
    }

    #[test]
    fn windowed_matches_the_engine() {
        let config = TajimaConfigBuilder::new().window(Some(4)).step(2).build().unwrap();
        let result = run(
            &alignment(),
            &config,
            None,
            None,
            &LocalAligner::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(
            result,
            TajimaResult::Windowed(statistic::windowed_statistic(&alignment(), 4, 2).unwrap())
        );
    }

    #[test]
    fn a_single_reference_names_the_missing_one() {
        let aligner = LocalAligner::new();
        let reporter = ProgressReporter::new();
        let config = TajimaConfig::default();
        assert!(matches!(
            run(&alignment(), &config, Some("MH"), None, &aligner, &reporter),
            Err(EngineError::MissingReference { argument: "genome_ref", .. })
        ));
        assert!(matches!(
            run(&alignment(), &config, None, Some("ATG"), &aligner, &reporter),
            Err(EngineError::MissingReference { argument: "protein_ref", .. })
        ));
    }

    #[test]
    fn coding_windows_are_keyed_by_genome_and_protein() {
        // Rows encode M W (ATG TGG) after a one-base leader; the leader column varies.
        let alignment = SequenceAlignment::from_sequences([
            "CATGTGG",
            "GATGTGG",
            "CATGTGA",
            "CATCTGG",
        ])
        .unwrap();
        let config = TajimaConfigBuilder::new().window(Some(3)).step(3).build().unwrap();
        let result = run(
            &alignment,
            &config,
            Some("MW"),
            Some("CATGTGG"),
            &LocalAligner::new(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let TajimaResult::Coding(windows) = result else {
            panic!("expected coding windows, got {:?}", result);
        };
        let coding = alignment.select_columns(&[1, 2, 3, 4, 5, 6]).unwrap();
        let expected = statistic::windowed_statistic(&coding, 3, 3).unwrap();
        // Midpoints 2 and 5 of the coding columns are genomic columns 3 and 6.
        assert_eq!(
            windows.by_genome,
            BTreeMap::from([(3, expected[&2]), (6, expected[&5])])
        );
        assert_eq!(windows.by_protein, vec![(1, expected[&2]), (2, expected[&5])]);
    }

    #[test]
    fn coding_without_window_evaluates_the_coding_columns() {
        let alignment =
            SequenceAlignment::from_sequences(["CATGTGG", "GATGTGG", "CATGTGA", "CATCTGG"]).unwrap();
        let result = run(
            &alignment,
            &TajimaConfig::default(),
            Some("MW"),
            Some("CATGTGG"),
            &LocalAligner::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let coding = alignment.select_columns(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(result, TajimaResult::Whole(statistic::statistic(&coding)));
    }

    #[test]
    fn failed_runs_still_finish_the_phase() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            events.lock().unwrap().push(event);
        }));
        let result = run(
            &alignment(),
            &TajimaConfig::default(),
            Some("MH"),
            None,
            &LocalAligner::new(),
            &reporter,
        );
        drop(reporter);

        assert!(result.is_err());
        let events = events.into_inner().unwrap();
        assert!(matches!(events.first(), Some(Progress::PhaseStart { .. })));
        assert!(matches!(events.last(), Some(Progress::PhaseFinish)));
    }

    #[test]
    fn codons_past_the_alignment_are_reported() {
        // The genomic reference encodes M W, but the alignment ends after codon 1.
        let alignment = SequenceAlignment::from_sequences(["CATG", "GATG", "CATC"]).unwrap();
        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            if let Progress::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        }));
        let result = run(
            &alignment,
            &TajimaConfig::default(),
            Some("MW"),
            Some("CATGTGG"),
            &LocalAligner::new(),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let coding = alignment.select_columns(&[1, 2, 3]).unwrap();
        assert_eq!(result, TajimaResult::Whole(statistic::statistic(&coding)));
        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("3 codon position(s)"));
    }
}
