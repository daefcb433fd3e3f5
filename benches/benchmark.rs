use criterion::{black_box, criterion_group, criterion_main, Criterion};
use semantic_intelligence::{mann_kendall_trend, BayesianEstimator, SemanticSkillIndex, TFIDFVectorizer};

const VOCAB: &[&str] = &[
    "canvas", "render", "physics", "collision", "audio", "sound", "database", "query", "shader", "mesh",
    "network", "socket", "parser", "token", "cache", "memory", "thread", "lock", "json", "schema",
];

/// Deterministic pseudo-random documents so runs are comparable
fn synthetic_corpus(docs: usize, words: usize) -> Vec<String> {
    let mut state = 0x2545_f491_u64;
    (0..docs)
        .map(|_| {
            (0..words)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    VOCAB[(state % VOCAB.len() as u64) as usize]
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn vectorizer_benchmark(c: &mut Criterion) {
    let corpus = synthetic_corpus(2_000, 40);

    c.bench_function("fit", |b| {
        b.iter(|| {
            let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
            v.fit(black_box(&corpus));
            v
        });
    });

    let mut v: TFIDFVectorizer = TFIDFVectorizer::new();
    v.fit(&corpus);
    c.bench_function("transform", |b| {
        b.iter(|| v.transform(black_box("render the mesh with a shader and cache the json schema")));
    });
}

fn search_benchmark(c: &mut Criterion) {
    let names: Vec<String> = (0..500).map(|i| format!("skill-{i}")).collect();
    let keywords = synthetic_corpus(500, 8);
    let mut idx: SemanticSkillIndex = SemanticSkillIndex::new();
    idx.build_from_keywords(names.iter().cloned().zip(keywords.iter().map(|k| k.split(' ').collect::<Vec<_>>())));

    c.bench_function("search", |b| {
        b.iter(|| idx.search(black_box("parse network socket tokens"), 10));
    });
}

fn stats_benchmark(c: &mut Criterion) {
    let series: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin() + i as f64 * 0.01).collect();
    c.bench_function("mann_kendall_200", |b| b.iter(|| mann_kendall_trend(black_box(&series))));

    let estimator = BayesianEstimator::from_stats(37, 120);
    c.bench_function("beta_interval", |b| b.iter(|| black_box(estimator).confidence_interval(0.95)));
}

criterion_group!(benches, vectorizer_benchmark, search_benchmark, stats_benchmark);
criterion_main!(benches);
