// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hint::black_box;

use constraint_miner::{Engine, SimpleDataCollection, Value};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

const TEMPLATES: &str = r#"
policy DEFAULT: AND { noViolations minApplications = 1 }

group ordering {
    constraint less: a < b
    constraint nonNegative: a >= 0
}

constraint email: string.isEmail(s)
constraint nonEmpty: arrays.length(xs) > 0
"#;

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine
        .add_templates("bench.txt".to_string(), TEMPLATES.to_string())
        .unwrap();
    engine
}

fn records(n: usize) -> SimpleDataCollection {
    let entries = (0..n)
        .map(|i| {
            let value: Value = serde_json::from_value(json!({
                "id": i,
                "price": i * 3,
                "discount": i % 7,
                "email": format!("user{i}@example.com"),
                "tags": ["a", "b"],
                "items": [i, i + 1, i + 2],
            }))
            .unwrap();
            value
        })
        .collect();
    SimpleDataCollection::from_values(entries)
}

fn evaluate_terms(c: &mut Criterion) {
    let engine = engine();
    let term = engine
        .parse_term("arrays.forAll([1, 2, 3, 4, 5], ARRAY_ELEMENT * 2 < 20) && 3 + 4 * 2 > 10")
        .unwrap();

    c.bench_function("evaluate closed term", |b| {
        b.iter(|| black_box(term.evaluate()))
    });
}

fn mine_from_data(c: &mut Criterion) {
    let engine = engine();

    let mut group = c.benchmark_group("mine from data");
    for n in [10, 100, 1000] {
        let data = records(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(engine.mine_from_data(data)))
        });
    }
    group.finish();
}

fn mine_from_schema(c: &mut Criterion) {
    let engine = engine();
    let data = records(100);
    let schema = data.derive_schema().unwrap();

    c.bench_function("mine from schema", |b| {
        b.iter(|| black_box(engine.mine_from_schema(&schema, &data)))
    });
}

criterion_group!(benches, evaluate_terms, mine_from_data, mine_from_schema);
criterion_main!(benches);
