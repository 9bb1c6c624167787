//! Text measurement and wrapping against the in-memory document.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::text_width;
use express_tables::host::{HostOp, MemoryDocument};
use express_tables::layout::{chunk_token, TextMeasurer};
use express_tables::LayoutConfig;
use test_case::test_case;

fn measurer() -> TextMeasurer {
    TextMeasurer::new(&LayoutConfig::default())
}

#[test_case("Ann", 30.0 ; "short word")]
#[test_case("hello world", 82.5 ; "exactly at threshold")]
#[test_case("!@#$%^&*() <>?", 200.0 ; "punctuation")]
#[test_case("tab\tand ünïcödé", 500.0 ; "mixed characters")]
fn test_fitting_text_unchanged(text: &str, available: f64) {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    let measured = text_width(text);
    assert!(measured <= available);
    assert_eq!(m.wrap(&mut doc, text, available, measured).unwrap(), text);
    assert_eq!(m.host_measurements(), 0);
}

#[test_case("abcdefghijklmnopqrstuvwxyzabcdefghijklmn", 100.0, 11 ; "fits eleven")]
#[test_case("abcdefghijklmnopqrstuvwxyzabcdefghijklmn", 20.0, 5 ; "floor of five")]
#[test_case("supercalifragilisticexpialidocious", 130.0, 14 ; "cell width")]
#[test_case("ééééééééééééééééééééé", 60.0, 6 ; "multibyte")]
fn test_long_token_chunked(token: &str, available: f64, chunk: usize) {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    let measured = text_width(token);
    assert_eq!(m.chunk_length(token, available, measured), chunk);

    let wrapped = m.wrap(&mut doc, token, available, measured).unwrap();
    let segments: Vec<&str> = wrapped.split('\n').collect();
    assert!(segments.len() > 1);
    for segment in &segments[..segments.len() - 1] {
        assert_eq!(segment.chars().count(), chunk);
    }
    assert!(segments[segments.len() - 1].chars().count() <= chunk);
    assert_eq!(wrapped.replace('\n', ""), token);
    assert_eq!(wrapped, chunk_token(token, chunk));
}

#[test]
fn test_greedy_lines_respect_effective_width() {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    let text = "one two three four five six seven eight nine ten";
    let wrapped = m.wrap(&mut doc, text, 100.0, text_width(text)).unwrap();

    let effective = m.effective_width(100.0);
    assert_eq!(effective, 85.0);
    for line in wrapped.lines() {
        assert!(text_width(line) <= effective, "{line:?} too wide");
    }
    assert_eq!(wrapped.replace('\n', " "), text);
    assert_eq!(
        wrapped,
        "one two\nthree four\nfive six\nseven eight\nnine ten"
    );
}

#[test]
fn test_oversized_word_gets_its_own_line() {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    let text = "see internationalization docs";
    let wrapped = m.wrap(&mut doc, text, 100.0, text_width(text)).unwrap();
    assert_eq!(wrapped, "see\ninternationalization\ndocs");
}

#[test]
fn test_extra_spaces_collapse() {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    let text = "  spaced   out  words here  ";
    let wrapped = m.wrap(&mut doc, text, 60.0, text_width(text)).unwrap();
    assert_eq!(wrapped.replace('\n', " "), "spaced out words here");
}

#[test]
fn test_empty_text() {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    assert_eq!(m.wrap(&mut doc, "", 0.0, 10.0).unwrap(), "");
}

#[test]
fn test_wrapping_leaves_no_scratch_nodes() {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    let text = "alpha beta gamma delta epsilon zeta eta theta";
    m.wrap(&mut doc, text, 80.0, text_width(text)).unwrap();
    assert!(m.host_measurements() > 0);
    assert_eq!(doc.orphan_count(), 0);
    assert_eq!(doc.created_count(), doc.removed_count());
}

#[test]
fn test_measure_failure_propagates_and_cleans_up() {
    let mut doc = MemoryDocument::new();
    let mut m = measurer();
    doc.fail(HostOp::BoundsLocal);
    let text = "alpha beta gamma delta";
    assert!(m.wrap(&mut doc, text, 50.0, text_width(text)).is_err());
    assert_eq!(doc.orphan_count(), 0);
}

#[test]
fn test_narrower_fraction_breaks_sooner() {
    let config = LayoutConfig {
        wrap_width_fraction: 0.75,
        ..LayoutConfig::default()
    };
    let mut doc = MemoryDocument::new();
    let mut m = TextMeasurer::new(&config);
    let text = "one two three four five six seven eight nine ten";
    let wrapped = m.wrap(&mut doc, text, 100.0, text_width(text)).unwrap();
    for line in wrapped.lines() {
        assert!(text_width(line) <= 75.0);
    }
}
