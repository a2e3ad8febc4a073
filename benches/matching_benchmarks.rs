use arch4_api::entities::ProductModel;
use arch4_api::services::{
    normalizer::normalize,
    product_matcher::{best_fuzzy_candidate, ScoreWeights},
    similarity::{partial_ratio, token_set_ratio},
};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uuid::Uuid;

const STYLES: &[&str] = &[
    "Knightsbridge Jacket",
    "Oxford Loafer",
    "Paisley Silk Scarf",
    "Chelsea Boot",
    "Wool Overcoat",
    "Cashmere Crew Neck",
    "Leather Belt",
    "Linen Shirt",
];

fn catalog(size: usize) -> Vec<ProductModel> {
    (0..size)
        .map(|i| ProductModel {
            id: Uuid::new_v4(),
            sku: format!("SKU-{:05}", i),
            name: format!("{} {}", STYLES[i % STYLES.len()], i),
            description: None,
            category: None,
            material: None,
            cost_price: None,
            wholesale_price: None,
            retail_price: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        })
        .collect()
}

// Linear fuzzy scan over the active catalog
fn fuzzy_scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuzzy_scan");
    let weights = ScoreWeights::default();
    let needle = normalize("Nice-Bridge Jacket 42");

    for size in [10usize, 100, 1_000].iter() {
        let products = catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| best_fuzzy_candidate(black_box(&needle), black_box(&products), &weights))
        });
    }

    group.finish();
}

fn normalizer_benchmark(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box("  KNIGHTSBRIDGE & Co. Leather-Watch_Strap  ")))
    });
}

fn similarity_benchmark(c: &mut Criterion) {
    let a = "knights bridge leather watch";
    let b = "leather watch strap knights";
    c.bench_function("partial_ratio", |bench| {
        bench.iter(|| partial_ratio(black_box(a), black_box(b)))
    });
    c.bench_function("token_set_ratio", |bench| {
        bench.iter(|| token_set_ratio(black_box(a), black_box(b)))
    });
}

criterion_group!(
    benches,
    fuzzy_scan_benchmark,
    normalizer_benchmark,
    similarity_benchmark
);
criterion_main!(benches);
