//! Benchmarks for version selection and spec graph construction.
//!
//! - Picking a runtime directory among typical installation layouts
//! - Parsing lenient version strings
//! - Building a generated graph sequentially and in parallel

extern crate dotspec;

use criterion::{criterion_group, criterion_main, Criterion};
use dotspec::{
    metadata::{AssemblyReference, MethodDefinition},
    prelude::*,
    version::SemanticVersion,
};
use std::{hint::black_box, sync::Arc};

/// Installed shared runtimes of a machine that has seen a few years of updates.
fn runtime_directories() -> Vec<String> {
    let mut versions = Vec::new();
    for major in 3..=9 {
        for minor in 0..=1 {
            for patch in [0, 4, 11, 25, 100, 203] {
                versions.push(format!("{major}.{minor}.{patch}"));
            }
        }
    }
    versions.push("9.0.0-rc.2.24473.5".to_string());
    versions
}

/// Benchmark picking a directory for a minor-only target (`8.0`).
fn bench_pick_minor_target(c: &mut Criterion) {
    let available = runtime_directories();

    c.bench_function("pick_minor_target", |b| {
        b.iter(|| {
            let picked = pick_best_version(black_box(&available), black_box("8.0")).unwrap();
            black_box(picked)
        });
    });
}

/// Benchmark picking a directory when only a higher major qualifies.
fn bench_pick_higher_major(c: &mut Criterion) {
    let available = runtime_directories();

    c.bench_function("pick_higher_major", |b| {
        b.iter(|| {
            let picked = pick_best_version(black_box(&available), black_box("2.2.8")).unwrap();
            black_box(picked)
        });
    });
}

/// Benchmark parsing version strings in the forms found in directory names.
fn bench_parse_versions(c: &mut Criterion) {
    let inputs = ["8", "v8.0", "8.0.11", "1.2.3-rc.1+abc", "4.0.30319.42000"];

    c.bench_function("parse_versions", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(SemanticVersion::parse(black_box(input)).unwrap());
            }
        });
    });
}

fn generated_images() -> MemoryReader {
    let mut lib = ModuleImage::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
    let mut list = TypeDefinition::new("Lib", "List`1");
    list.generic_parameters
        .push(dotspec::metadata::GenericParameterDefinition::new("T"));
    lib.types.push(list);

    let mut app = ModuleImage::new("App", AssemblyVersion::new(1, 0, 0, 0));
    app.references.push(AssemblyReference::new("Lib", None));
    for index in 0..256 {
        let mut definition = TypeDefinition::new("App", &format!("Type{index}"));
        if index > 0 {
            definition.base = Some(TypeReference::local("App", &format!("Type{}", index / 2)));
        }
        let mut method = MethodDefinition::new(
            "Run",
            vec![TypeReference::generic_instance(
                TypeReference::external("Lib", "Lib", "List`1"),
                vec![TypeReference::local("App", &format!("Type{}", (index + 7) % 256))],
            )],
        );
        let next = format!("Type{}", (index + 1) % 256);
        method
            .body
            .push(Operand::Type(TypeReference::local("App", &next)));
        definition.methods.push(method);
        app.types.push(definition);
    }

    MemoryReader::new()
        .with_image("/bench/Lib.json", lib)
        .with_image("/bench/App.json", app)
}

fn build_graph(parallel: bool) -> usize {
    let manager = SpecManager::builder()
        .root("/bench/App.json")
        .reader(Arc::new(generated_images()))
        .parallel(parallel)
        .build();
    manager.load_root().unwrap();
    manager.build_all()
}

/// Benchmark building a generated graph on one thread.
fn bench_build_sequential(c: &mut Criterion) {
    c.bench_function("build_sequential", |b| {
        b.iter(|| black_box(build_graph(false)));
    });
}

/// Benchmark building the same graph over the rayon pool.
fn bench_build_parallel(c: &mut Criterion) {
    c.bench_function("build_parallel", |b| {
        b.iter(|| black_box(build_graph(true)));
    });
}

criterion_group!(
    benches,
    // Version selection
    bench_pick_minor_target,
    bench_pick_higher_major,
    bench_parse_versions,
    // Graph construction
    bench_build_sequential,
    bench_build_parallel,
);
criterion_main!(benches);
