//! Model building and convention benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entimap_core::{
    Config, ConfigurationSource, ForeignKeyPropertyDiscoveryConvention, ModelBuilder,
    RelationshipOptions, ValueType,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EXPLICIT: ConfigurationSource = ConfigurationSource::Explicit;

/// Build a model of `type_count` types linked by `relationship_count`
/// random relationships. Every relationship gets a navigation whose
/// `<navigation>Id` property exists on the dependent half of the time.
fn build_model(config: &Config, type_count: usize, relationship_count: usize, seed: u64) -> usize {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = ModelBuilder::with_config(config);
    let types: Vec<_> = (0..type_count)
        .map(|i| {
            let et = builder.entity_named(&format!("Type{i}"), EXPLICIT).unwrap();
            builder.property(et, "Id", ValueType::Int32, EXPLICIT).unwrap();
            if !config.key_discovery {
                builder.primary_key(et, &["Id"], EXPLICIT).unwrap();
            }
            et
        })
        .collect();

    for r in 0..relationship_count {
        let principal = types[rng.gen_range(0..types.len())];
        let dependent = types[rng.gen_range(0..types.len())];
        let navigation = format!("Ref{r}");
        if rng.gen_bool(0.5) {
            builder
                .property(dependent, &format!("{navigation}Id"), ValueType::Int32, EXPLICIT)
                .unwrap();
        }
        builder
            .relationship(
                principal,
                dependent,
                RelationshipOptions::new().navigation_to_principal(navigation),
                EXPLICIT,
            )
            .unwrap();
    }

    builder.build().foreign_keys().count()
}

/// Benchmark model building with and without conventions.
fn bench_build_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_model");
    let with = Config::default();
    let without = Config::without_conventions();

    for types in [10, 100].iter() {
        let relationships = types * 3;
        group.throughput(Throughput::Elements(relationships as u64));
        group.bench_with_input(BenchmarkId::new("conventions", types), types, |b, &types| {
            b.iter(|| black_box(build_model(&with, types, relationships, 1)));
        });
        group.bench_with_input(BenchmarkId::new("bare", types), types, |b, &types| {
            b.iter(|| black_box(build_model(&without, types, relationships, 1)));
        });
    }

    group.finish();
}

/// Benchmark a single discovery pass over a composite key.
fn bench_discover_composite(c: &mut Criterion) {
    c.bench_function("discover_composite", |b| {
        b.iter_batched(
            || {
                let mut builder = ModelBuilder::with_config(&Config::without_conventions());
                let principal = builder.entity_named("Order", EXPLICIT).unwrap();
                builder.property(principal, "Region", ValueType::String, EXPLICIT).unwrap();
                builder.property(principal, "Number", ValueType::Int64, EXPLICIT).unwrap();
                builder.primary_key(principal, &["Region", "Number"], EXPLICIT).unwrap();
                let dependent = builder.entity_named("Line", EXPLICIT).unwrap();
                builder.property(dependent, "Id", ValueType::Int64, EXPLICIT).unwrap();
                builder.primary_key(dependent, &["Id"], EXPLICIT).unwrap();
                builder.property(dependent, "OrderRegion", ValueType::String, EXPLICIT).unwrap();
                builder.property(dependent, "OrderNumber", ValueType::Int64, EXPLICIT).unwrap();
                let relationship = builder
                    .relationship(
                        principal,
                        dependent,
                        RelationshipOptions::new().navigation_to_principal("Order"),
                        ConfigurationSource::Convention,
                    )
                    .unwrap();
                (builder, relationship)
            },
            |(mut builder, relationship)| {
                let discovered = ForeignKeyPropertyDiscoveryConvention
                    .discover(builder.model_mut(), relationship)
                    .unwrap();
                black_box(discovered);
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_build_model, bench_discover_composite);

criterion_main!(benches);
