use structmap::core::sequence::aligner::LocalAligner;
use structmap::core::sequence::alignment::SequenceAlignment;
use structmap::engine::config::TajimaConfigBuilder;
use structmap::engine::progress::ProgressReporter;
use structmap::engine::statistic::SlidingStatisticEngine;
use structmap::workflows::tajima::{self, TajimaResult};

fn alignment(rows: &[&str]) -> SequenceAlignment {
    SequenceAlignment::from_sequences(rows.iter().copied()).unwrap()
}

#[test]
fn identical_sequences_have_no_defined_statistic() {
    let rows = ["ATGAAACCCGGGTTT"; 4];
    let config = TajimaConfigBuilder::new().window(Some(5)).step(2).build().unwrap();
    let result = tajima::run(
        &alignment(&rows),
        &config,
        None,
        None,
        &LocalAligner::new(),
        &ProgressReporter::new(),
    )
    .unwrap();

    let TajimaResult::Windowed(windows) = result else {
        panic!("expected windowed values, got {:?}", result);
    };
    assert_eq!(windows.len(), 6);
    assert!(windows.values().all(Option::is_none));
}

#[test]
fn incremental_windows_equal_windows_from_scratch() {
    let rows = [
        "ATGCATGCATTAGGCATACG",
        "ATGCATGCAATAGGCTTACG",
        "ATGGATGCATTACGCATACG",
        "TTGCATCCATTAGGCATTCG",
        "ATGCATGCATAAGGCATACG",
        "ATGCTTGCATTAGGCATACA",
    ];
    let data = alignment(&rows);

    for (window, step) in [(1, 1), (4, 1), (5, 3), (7, 7), (6, 10), (20, 1)] {
        let incremental = SlidingStatisticEngine::new(&data)
            .windowed_statistic(window, step)
            .unwrap();
        let scratch = SlidingStatisticEngine::new(&data);
        let mut expected = Vec::new();
        let mut start = 0;
        while start + window <= data.width() {
            expected.push((start + window / 2 + 1, scratch.statistic_over(start..start + window)));
            start += step;
        }
        assert_eq!(
            incremental.into_iter().collect::<Vec<_>>(),
            expected,
            "window {} step {}",
            window,
            step
        );
    }
}

#[test]
fn windows_wider_than_the_alignment_yield_nothing() {
    let data = alignment(&["ACGT", "ACGA"]);
    let windows = SlidingStatisticEngine::new(&data).windowed_statistic(5, 1).unwrap();
    assert!(windows.is_empty());
}

#[test]
fn column_summaries_are_computed_once() {
    let data = alignment(&["ACGTACGT", "ACGAACGT", "TCGAACGT"]);
    let engine = SlidingStatisticEngine::new(&data);
    engine.windowed_statistic(4, 1).unwrap();
    engine.windowed_statistic(2, 2).unwrap();
    engine.statistic();
    assert_eq!(engine.columns_evaluated(), 8);
    assert_eq!(engine.polymorphic_columns(), vec![0, 3]);
}
