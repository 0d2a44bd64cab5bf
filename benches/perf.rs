use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use goal_rush::config::ModelConfig;
use goal_rush::fixtures::{SlateEntry, parse_slate_json};
use goal_rush::outcome::{OutcomeParams, evaluate_fixture};
use goal_rush::pipeline::evaluate_slate;
use goal_rush::InMemoryRepository;

fn bench_evaluate_fixture(c: &mut Criterion) {
    let params = OutcomeParams::default();
    c.bench_function("evaluate_fixture", |b| {
        b.iter(|| {
            let r = evaluate_fixture(black_box(1.5), black_box(0.9), 1.33, &params).unwrap();
            black_box(r.p_over);
        })
    });
}

fn bench_evaluate_fixture_high_scoring(c: &mut Criterion) {
    let params = OutcomeParams::default();
    c.bench_function("evaluate_fixture_high_scoring", |b| {
        b.iter(|| {
            let r = evaluate_fixture(black_box(4.2), black_box(3.1), 1.33, &params).unwrap();
            black_box(r.top_scores.len());
        })
    });
}

fn bench_evaluate_slate(c: &mut Criterion) {
    let repo = InMemoryRepository::from_json_str(TEAMS_JSON).expect("valid fixture json");
    let base = parse_slate_json(SLATE_JSON).expect("valid fixture json");
    let slate: Vec<SlateEntry> = base.iter().cycle().take(200).cloned().collect();
    let cfg = ModelConfig::default();

    c.bench_function("evaluate_slate_200", |b| {
        b.iter(|| {
            let reports = evaluate_slate(black_box(&repo), black_box(&slate), &cfg);
            black_box(reports.len());
        })
    });
}

criterion_group!(
    perf,
    bench_evaluate_fixture,
    bench_evaluate_fixture_high_scoring,
    bench_evaluate_slate
);
criterion_main!(perf);

static TEAMS_JSON: &str = include_str!("../tests/fixtures/teams.json");
static SLATE_JSON: &str = include_str!("../tests/fixtures/slate.json");
