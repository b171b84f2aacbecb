//! End-to-end match tests against the scenarios a correct implementation must satisfy, plus
//! additional coverage for the registry lifecycle (`add`/`remove`, re-adding a removed pattern,
//! case-insensitive matching).

use std::sync::{Arc, Mutex};

use polyregex::{AddOptions, Matcher, MatcherConfig, StrInput};

/// Collects `(pattern_label, start, end_inclusive)` triples in dispatch order.
#[derive(Default, Clone)]
struct Recorder(Arc<Mutex<Vec<(&'static str, usize, Option<usize>)>>>);

impl Recorder {
    fn new() -> Self {
        Recorder(Arc::new(Mutex::new(Vec::new())))
    }

    fn sink(
        &self,
        label: &'static str,
    ) -> impl Fn(&StrInput<'static>, polyregex::Span) + Send + Sync {
        let store = self.0.clone();
        move |_buf: &StrInput<'static>, span: polyregex::Span| {
            store
                .lock()
                .unwrap()
                .push((label, span.start, span.end_inclusive()));
        }
    }

    fn take(&self) -> Vec<(&'static str, usize, Option<usize>)> {
        self.0.lock().unwrap().clone()
    }
}

fn matcher() -> Matcher<StrInput<'static>> {
    let _ = env_logger::builder().is_test(true).try_init();
    Matcher::new(MatcherConfig::default())
}

#[test]
fn s1_two_disjoint_literals() {
    let m = matcher();
    let rec = Recorder::new();
    m.add("ab", AddOptions::default(), rec.sink("1")).unwrap();
    m.add("ac", AddOptions::default(), rec.sink("2")).unwrap();

    let mut input = StrInput::new("ab ac");
    m.do_match(&mut input).unwrap();

    assert_eq!(rec.take(), vec![("1", 0, Some(1)), ("2", 3, Some(4))]);
}

#[test]
fn s2_leftmost_longest_runs_with_domination() {
    let m = matcher();
    let rec = Recorder::new();
    m.add("a+", AddOptions::default(), rec.sink("1")).unwrap();

    let mut input = StrInput::new("baaaabaa");
    m.do_match(&mut input).unwrap();

    assert_eq!(rec.take(), vec![("1", 1, Some(4)), ("1", 6, Some(7))]);
}

#[test]
fn s3_domination_across_patterns_does_not_apply() {
    // "ban" never occurs as a substring of "baaaan", so only "ba*n" reports.
    let m = matcher();
    let rec = Recorder::new();
    m.add("ba*n", AddOptions::default(), rec.sink("1")).unwrap();
    m.add("ban", AddOptions::default(), rec.sink("2")).unwrap();

    let mut input = StrInput::new("baaaan");
    m.do_match(&mut input).unwrap();

    assert_eq!(rec.take(), vec![("1", 0, Some(5))]);
}

#[test]
fn s4_alternation_single_char() {
    let m = matcher();
    let rec = Recorder::new();
    m.add("a|b", AddOptions::default(), rec.sink("1")).unwrap();

    let mut input = StrInput::new("cac");
    m.do_match(&mut input).unwrap();

    assert_eq!(rec.take(), vec![("1", 1, Some(1))]);
}

#[test]
fn s5_negated_class_zero_length_report() {
    let m = matcher();
    let rec = Recorder::new();
    m.add("[^ab]", AddOptions::default(), rec.sink("1")).unwrap();

    let mut input = StrInput::new("c");
    m.do_match(&mut input).unwrap();

    assert_eq!(rec.take(), vec![("1", 0, Some(0))]);
}

#[test]
fn s6_many_literals_over_a_larger_corpus() {
    let m = matcher();
    let rec = Recorder::new();
    let words: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
    for w in &words {
        let label: &'static str = Box::leak(w.clone().into_boxed_str());
        m.add(w, AddOptions::default(), rec.sink(label)).unwrap();
    }

    let mut corpus = String::new();
    for i in 0..200 {
        corpus.push_str(&format!("prefix word{i} suffix "));
    }
    let mut input = StrInput::new(Box::leak(corpus.into_boxed_str()));
    let count = m.do_match(&mut input).unwrap();

    assert_eq!(count, words.len());
    let seen = rec.take();
    assert_eq!(seen.len(), words.len());
    // No emission should be dominated by another of the same pattern; each word occurs once, so
    // each label appears exactly once.
    let mut labels: Vec<_> = seen.iter().map(|(l, _, _)| *l).collect();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), words.len());
}

#[test]
fn optional_and_star_quantifiers() {
    let m = matcher();
    let rec = Recorder::new();
    m.add("colou?r", AddOptions::default(), rec.sink("1")).unwrap();

    let mut input = StrInput::new("color colour");
    m.do_match(&mut input).unwrap();

    assert_eq!(rec.take(), vec![("1", 0, Some(4)), ("1", 6, Some(11))]);
}

#[test]
fn remove_stops_future_dispatch() {
    let m = matcher();
    let rec = Recorder::new();
    let id = m.add("ab", AddOptions::default(), rec.sink("1")).unwrap();

    let mut input = StrInput::new("ab");
    m.do_match(&mut input).unwrap();
    assert_eq!(rec.take().len(), 1);

    m.remove(id).unwrap();
    let mut input = StrInput::new("ab");
    m.do_match(&mut input).unwrap();
    assert!(rec.take().is_empty());
}

#[test]
fn case_insensitive_option_folds_ascii_letters() {
    let m = matcher();
    let rec = Recorder::new();
    m.add(
        "cat",
        AddOptions {
            case_insensitive: true,
        },
        rec.sink("1"),
    )
    .unwrap();

    let mut input = StrInput::new("CAT cat CaT");
    m.do_match(&mut input).unwrap();

    assert_eq!(
        rec.take(),
        vec![("1", 0, Some(2)), ("1", 4, Some(6)), ("1", 8, Some(10))]
    );
}

/// Enabling the literal prefilter must never change which matches are emitted (spec.md §8
/// property 6). `"ab|cd"` is the regression case: its only guaranteed-prefix candidate would be
/// `"ab"`, which is not a prefix of every match (a match may begin with `cd` instead), so a
/// prefilter built from it would wrongly rule out every offset that doesn't start with `"ab"`.
#[test]
fn prefilter_parity_with_top_level_alternation() {
    let with_prefilter = Matcher::new(MatcherConfig {
        prefilter_enabled: true,
        metrics: None,
    });
    let without_prefilter = Matcher::new(MatcherConfig {
        prefilter_enabled: false,
        metrics: None,
    });

    let rec_with = Recorder::new();
    let rec_without = Recorder::new();
    with_prefilter
        .add("ab|cd", AddOptions::default(), rec_with.sink("1"))
        .unwrap();
    without_prefilter
        .add("ab|cd", AddOptions::default(), rec_without.sink("1"))
        .unwrap();

    let mut input_with = StrInput::new("cd");
    let mut input_without = StrInput::new("cd");
    with_prefilter.do_match(&mut input_with).unwrap();
    without_prefilter.do_match(&mut input_without).unwrap();

    assert_eq!(rec_without.take(), vec![("1", 0, Some(1))]);
    assert_eq!(rec_with.take(), rec_without.take());
}

#[test]
fn rejects_unsupported_constructs() {
    let m = matcher();
    let rec = Recorder::new();
    let err = m.add("^anchored$", AddOptions::default(), rec.sink("x"));
    assert!(err.is_err());

    let err = m.add(r"a{2,4}", AddOptions::default(), rec.sink("x"));
    assert!(err.is_err());

    let err = m.add(r"\d+", AddOptions::default(), rec.sink("x"));
    assert!(err.is_err());
}
