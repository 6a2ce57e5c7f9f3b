use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glossary_tooltip::{AnnotatorConfig, Annotator, GlossaryTerm, MatchStrategy, Vocabulary};

fn synthetic_vocabulary(size: usize) -> Vocabulary {
    (0..size)
        .map(|idx| {
            GlossaryTerm::new(
                format!("Term{idx:04}"),
                format!("Description for term {idx}, long enough to need truncation. ").repeat(3),
            )
            .with_detail_url(format!("/glossary/{idx}"))
        })
        .collect()
}

fn synthetic_text(terms: usize, words: usize) -> String {
    (0..words)
        .map(|idx| {
            if idx % 7 == 0 {
                format!("Term{:04}", idx % terms)
            } else {
                "lorem".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_compile(c: &mut Criterion) {
    for &size in &[10usize, 100, 1000] {
        let vocabulary = synthetic_vocabulary(size);
        c.bench_with_input(BenchmarkId::new("compile", size), &vocabulary, |b, vocab| {
            b.iter(|| {
                let annotator =
                    Annotator::new(vocab, &AnnotatorConfig::default()).expect("annotator builds");
                black_box(annotator.is_empty());
            });
        });
    }
}

fn bench_strategies(c: &mut Criterion) {
    const CASES: &[(usize, usize)] = &[(10, 500), (100, 5_000), (1000, 20_000)];
    for &(terms, words) in CASES {
        let vocabulary = synthetic_vocabulary(terms);
        let text = synthetic_text(terms, words);
        for strategy in [MatchStrategy::Longest, MatchStrategy::Ordered] {
            let config = AnnotatorConfig::default().with_strategy(strategy);
            let annotator = Annotator::new(&vocabulary, &config).expect("annotator builds");
            let label = format!("{strategy}_{terms}x{words}");
            c.bench_with_input(BenchmarkId::new("annotate", label), &text, |b, text| {
                b.iter(|| black_box(annotator.annotate(text).matches));
            });
        }
    }
}

criterion_group!(benches, bench_compile, bench_strategies);
criterion_main!(benches);
