//! Tajima's D over alignment columns, whole-alignment or in sliding windows.
//!
//! Only unambiguous nucleotides (A, C, G, T/U, any case) count; gaps and ambiguity codes
//! are ignored column by column. A column is segregating when it holds at least two
//! distinct nucleotides. The statistic is undefined (`None`) for fewer than two
//! sequences, zero segregating sites, or a degenerate variance.

use super::error::EngineError;
use crate::core::sequence::alignment::SequenceAlignment;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSummary {
    /// Pairs of sequences with different nucleotides in this column.
    pub pairwise_differences: u64,
    pub segregating: bool,
}

impl ColumnSummary {
    pub fn from_column(column: impl IntoIterator<Item = u8>) -> Self {
        let mut counts = [0u64; 4];
        for base in column {
            match base.to_ascii_uppercase() {
                b'A' => counts[0] += 1,
                b'C' => counts[1] += 1,
                b'G' => counts[2] += 1,
                b'T' | b'U' => counts[3] += 1,
                _ => {}
            }
        }
        let total: u64 = counts.iter().sum();
        let identical: u64 = counts.iter().map(|&c| choose_two(c)).sum();
        Self {
            pairwise_differences: choose_two(total) - identical,
            segregating: counts.iter().filter(|&&c| c > 0).count() >= 2,
        }
    }
}

fn choose_two(n: u64) -> u64 {
    n * n.saturating_sub(1) / 2
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    differences: u64,
    segregating: u64,
}

impl Totals {
    fn add(&mut self, column: &ColumnSummary) {
        self.differences += column.pairwise_differences;
        self.segregating += u64::from(column.segregating);
    }

    fn remove(&mut self, column: &ColumnSummary) {
        self.differences -= column.pairwise_differences;
        self.segregating -= u64::from(column.segregating);
    }
}

/// Tajima's D from the summed pairwise differences and segregating sites of `num_sequences` sequences.
pub fn tajimas_d(num_sequences: usize, pairwise_differences: u64, segregating_sites: u64) -> Option<f64> {
    if num_sequences < 2 || segregating_sites == 0 {
        return None;
    }
    let n = num_sequences as f64;
    let pi = pairwise_differences as f64 / (n * (n - 1.0) / 2.0);

    let a1: f64 = (1..num_sequences).map(|i| 1.0 / i as f64).sum();
    let a2: f64 = (1..num_sequences).map(|i| 1.0 / (i as f64).powi(2)).sum();
    let b1 = (n + 1.0) / (3.0 * (n - 1.0));
    let b2 = 2.0 * (n * n + n + 3.0) / (9.0 * n * (n - 1.0));
    let c1 = b1 - 1.0 / a1;
    let c2 = b2 - (n + 2.0) / (a1 * n) + a2 / (a1 * a1);
    let e1 = c1 / a1;
    let e2 = c2 / (a1 * a1 + a2);

    let s = segregating_sites as f64;
    let variance = e1 * s + e2 * s * (s - 1.0);
    if variance <= 0.0 {
        return None;
    }
    let d = (pi - s / a1) / variance.sqrt();
    d.is_finite().then_some(d)
}

/// Evaluates Tajima's D over one alignment, summarizing each column at most once.
///
/// Windows reuse the running totals of the previous window when they overlap: only the
/// columns leaving and entering are subtracted and added. Totals are integers, so the
/// result is identical to evaluating every window from scratch.
pub struct SlidingStatisticEngine<'a> {
    alignment: &'a SequenceAlignment,
    summaries: Vec<OnceLock<ColumnSummary>>,
    evaluated: AtomicUsize,
}

impl<'a> SlidingStatisticEngine<'a> {
    pub fn new(alignment: &'a SequenceAlignment) -> Self {
        Self {
            alignment,
            summaries: (0..alignment.width()).map(|_| OnceLock::new()).collect(),
            evaluated: AtomicUsize::new(0),
        }
    }

    pub fn alignment(&self) -> &SequenceAlignment {
        self.alignment
    }

    /// Summary of a 0-based column, computed on first access.
    pub fn column(&self, index: usize) -> Option<&ColumnSummary> {
        let slot = self.summaries.get(index)?;
        Some(slot.get_or_init(|| {
            self.evaluated.fetch_add(1, Ordering::Relaxed);
            ColumnSummary::from_column(self.alignment.column(index))
        }))
    }

    /// Number of distinct columns summarized so far.
    pub fn columns_evaluated(&self) -> usize {
        self.evaluated.load(Ordering::Relaxed)
    }

    pub fn polymorphic_columns(&self) -> Vec<usize> {
        (0..self.alignment.width())
            .filter(|&i| self.column(i).is_some_and(|c| c.segregating))
            .collect()
    }

    pub fn statistic(&self) -> Option<f64> {
        self.statistic_over(0..self.alignment.width())
    }

    /// Statistic over the given 0-based columns; out-of-range columns are ignored.
    pub fn statistic_over<I>(&self, columns: I) -> Option<f64>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut totals = Totals::default();
        for summary in columns.into_iter().filter_map(|i| self.column(i)) {
            totals.add(summary);
        }
        tajimas_d(
            self.alignment.num_sequences(),
            totals.differences,
            totals.segregating,
        )
    }

    /// Window midpoint (1-based column) → statistic, over full windows only.
    pub fn windowed_statistic(
        &self,
        window: usize,
        step: usize,
    ) -> Result<BTreeMap<usize, Option<f64>>, EngineError> {
        if window == 0 || step == 0 {
            return Err(EngineError::InvalidInput {
                argument: if window == 0 { "window" } else { "step" },
                reason: "must be positive".to_string(),
            });
        }

        let width = self.alignment.width();
        let n = self.alignment.num_sequences();
        let mut results = BTreeMap::new();
        let mut totals = Totals::default();
        let mut previous: Option<(usize, usize)> = None;
        let mut start = 0;

        while start + window <= width {
            let end = start + window;
            match previous {
                Some((prev_start, prev_end)) if start < prev_end => {
                    for i in prev_start..start {
                        if let Some(c) = self.column(i) {
                            totals.remove(c);
                        }
                    }
                    for i in prev_end..end {
                        if let Some(c) = self.column(i) {
                            totals.add(c);
                        }
                    }
                }
                _ => {
                    totals = Totals::default();
                    for i in start..end {
                        if let Some(c) = self.column(i) {
                            totals.add(c);
                        }
                    }
                }
            }
            results.insert(
                start + window / 2 + 1,
                tajimas_d(n, totals.differences, totals.segregating),
            );
            previous = Some((start, end));
            start += step;
        }

        debug!(
            "Evaluated {} windows (window {}, step {}) over {} columns.",
            results.len(),
            window,
            step,
            width
        );
        Ok(results)
    }
}

/// Whole-alignment Tajima's D.
pub fn statistic(alignment: &SequenceAlignment) -> Option<f64> {
    SlidingStatisticEngine::new(alignment).statistic()
}

/// Windowed Tajima's D keyed by 1-based window midpoint.
pub fn windowed_statistic(
    alignment: &SequenceAlignment,
    window: usize,
    step: usize,
) -> Result<BTreeMap<usize, Option<f64>>, EngineError> {
    SlidingStatisticEngine::new(alignment).windowed_statistic(window, step)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn assert_close(a: Option<f64>, b: Option<f64>) {
        match (a, b) {
            (Some(x), Some(y)) => assert!((x - y).abs() < 1e-12, "{} != {}", x, y),
            (None, None) => {}
            _ => panic!("{:?} != {:?}", a, b),
        }
    }

    #[test]
    fn column_summary_counts_differing_pairs() {
        let summary = ColumnSummary::from_column(*b"AACG");
        assert_eq!(summary.pairwise_differences, 5);
        assert!(summary.segregating);

        let invariant = ColumnSummary::from_column(*b"TTuT");
        assert_eq!(invariant.pairwise_differences, 0);
        assert!(!invariant.segregating);
    }

    #[test]
    fn gaps_and_ambiguity_codes_are_ignored() {
        let summary = ColumnSummary::from_column(*b"A-NA");
        assert_eq!(summary, ColumnSummary::default());
        let summary = ColumnSummary::from_column(*b"A-NG");
        assert_eq!(summary.pairwise_differences, 1);
        assert!(summary.segregating);
    }

    #[test]
    fn whole_alignment_matches_reference_value() {
        assert_close(statistic(&alignment()), Some(-1.0937990658235193));
    }

    #[test]
    fn undefined_cases_are_none() {
        assert_eq!(tajimas_d(1, 0, 3), None);
        assert_eq!(tajimas_d(5, 0, 0), None);
        // With two sequences the variance term vanishes.
        assert_eq!(tajimas_d(2, 1, 1), None);

        let identical = SequenceAlignment::from_sequences(["ACGT"; 4]).unwrap();
        assert_eq!(statistic(&identical), None);
    }

    #[test]
    fn incremental_windows_equal_independent_sub_alignments() {
        let alignment = alignment();
        for (window, step) in [(3, 1), (4, 2), (5, 5), (2, 3), (10, 1)] {
            let windows = windowed_statistic(&alignment, window, step).unwrap();
            let mut start = 0;
            while start + window <= alignment.width() {
                let columns: Vec<usize> = (start..start + window).collect();
                let sub = alignment.select_columns(&columns).unwrap();
                assert_close(windows[&(start + window / 2 + 1)], statistic(&sub));
                start += step;
            }
            assert_eq!(windows.len(), (alignment.width() - window) / step + 1);
        }
    }

    #[test]
    fn each_column_is_summarized_once() {
        let alignment = alignment();
        let engine = SlidingStatisticEngine::new(&alignment);
        engine.windowed_statistic(4, 1).unwrap();
        assert_eq!(engine.columns_evaluated(), alignment.width());
        engine.windowed_statistic(6, 2).unwrap();
        engine.statistic();
        assert_eq!(engine.columns_evaluated(), alignment.width());
    }

    #[test]
    fn removing_invariant_columns_does_not_change_the_result() {
        let alignment = alignment();
        let engine = SlidingStatisticEngine::new(&alignment);
        let polymorphic = engine.polymorphic_columns();
        assert_eq!(polymorphic, vec![0, 3, 6, 9]);
        let reduced = alignment.select_columns(&polymorphic).unwrap();
        assert_close(statistic(&reduced), engine.statistic());
    }

    #[test]
    fn oversized_windows_produce_nothing_and_zero_sizes_fail() {
        let alignment = alignment();
        assert!(windowed_statistic(&alignment, 11, 1).unwrap().is_empty());
        assert!(matches!(
            windowed_statistic(&alignment, 0, 1),
            Err(EngineError::InvalidInput { argument: "window", .. })
        ));
        assert!(matches!(
            windowed_statistic(&alignment, 3, 0),
            Err(EngineError::InvalidInput { argument: "step", .. })
        ));
    }

    #[test]
    fn identical_sequences_give_none_in_every_window() {
        let identical = SequenceAlignment::from_sequences(["ACGTACGTAC"; 4]).unwrap();
        let windows = windowed_statistic(&identical, 4, 2).unwrap();
        assert_eq!(windows.len(), 4);
        assert!(windows.values().all(Option::is_none));
    }
}
