//! Aggregation throughput on a synthetic 60-relevé survey
//!
//! Mirrors the generated data set: species-poor relevés (1-20) with high
//! scores, medium relevés (21-40), species-rich relevés (41-60) with low scores.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use releve_report::{aggregate, classify, ClassificationScheme, SurveyBatch, SurveyRecord};

fn synthetic_batch() -> SurveyBatch {
    let mut rng = StdRng::seed_from_u64(2007);
    let species: Vec<String> = (0..120).map(|i| format!("Species {:03}", i)).collect();
    let bands = [(1..=20, 1..=3, 8..=10), (21..=40, 8..=12, 3..=7), (41..=60, 18..=25, 1..=4)];

    let mut records = Vec::new();
    for (ids, richness, scores) in bands {
        for releve_id in ids {
            let n = rng.gen_range(richness.clone());
            for name in species.choose_multiple(&mut rng, n) {
                let score = rng.gen_range(scores.clone()) as f64;
                if let Ok(record) = SurveyRecord::try_new(releve_id, name.as_str(), score) {
                    records.push(record);
                }
            }
        }
    }
    SurveyBatch::from_records(records)
}

fn bench_aggregate(c: &mut Criterion) {
    let batch = synthetic_batch();
    let scheme = ClassificationScheme::default();

    c.bench_function("aggregate_60_releves", |b| {
        b.iter(|| aggregate(black_box(&batch)))
    });
    c.bench_function("classify_60_releves", |b| {
        b.iter(|| classify(black_box(&batch), black_box(&scheme)))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
