use criterion::{criterion_group, criterion_main, Criterion};
use polyregex::{AddOptions, Matcher, MatcherConfig, StrInput};

fn build_corpus() -> String {
    let mut corpus = String::new();
    for i in 0..2000 {
        corpus.push_str(&format!("token{i} filler text around it "));
    }
    corpus
}

fn matcher_benchmark(c: &mut Criterion) {
    let corpus = build_corpus();

    let mut group = c.benchmark_group("polyregex");

    group.bench_function("single_literal", |b| {
        let matcher: Matcher<StrInput> = Matcher::new(MatcherConfig::default());
        matcher
            .add("token42", AddOptions::default(), |_: &StrInput, _| {})
            .unwrap();
        b.iter(|| {
            let mut input = StrInput::new(&corpus);
            matcher.do_match(&mut input).unwrap();
        });
    });

    group.bench_function("thousand_literals_with_prefilter", |b| {
        let matcher: Matcher<StrInput> = Matcher::new(MatcherConfig::default());
        for i in 0..1000 {
            matcher
                .add(&format!("token{i}"), AddOptions::default(), |_: &StrInput, _| {})
                .unwrap();
        }
        b.iter(|| {
            let mut input = StrInput::new(&corpus);
            matcher.do_match(&mut input).unwrap();
        });
    });

    group.bench_function("thousand_literals_without_prefilter", |b| {
        let matcher: Matcher<StrInput> = Matcher::new(MatcherConfig {
            prefilter_enabled: false,
            metrics: None,
        });
        for i in 0..1000 {
            matcher
                .add(&format!("token{i}"), AddOptions::default(), |_: &StrInput, _| {})
                .unwrap();
        }
        b.iter(|| {
            let mut input = StrInput::new(&corpus);
            matcher.do_match(&mut input).unwrap();
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = matcher_benchmark
}
criterion_main!(benches);
