//! Benchmarks for sidebar resolution and full site builds.

use std::fs;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use locdoc_site::{
    DiscoveredFiles, LocaleRegistry, Scanner, SiteBuilder, SiteLoader, resolve, validate,
};
use serde_json::{Value, json};

const LOCALES: &[&str] = &["/", "/zh/", "/ja/", "/ko/"];

/// Site document with `sections` sidebar sections of `pages` pages per locale.
fn create_site_document(sections: usize, pages: usize) -> Value {
    let mut locales = serde_json::Map::new();
    for prefix in LOCALES {
        let mut sidebar = serde_json::Map::new();
        for s in 0..sections {
            let mut entries = vec![json!(["./", format!("Section {s}")])];
            entries.extend((0..pages).map(|p| json!(format!("page-{p}"))));
            sidebar.insert(format!("{prefix}section-{s}/"), Value::Array(entries));
        }
        locales.insert(
            (*prefix).to_owned(),
            json!({ "lang": "en-US", "sidebar": sidebar }),
        );
    }
    json!({ "title": "Bench", "locales": locales })
}

/// Files matching [`create_site_document`], every page present.
fn create_files(sections: usize, pages: usize) -> Vec<String> {
    let mut files = Vec::new();
    for prefix in LOCALES {
        let base = prefix.trim_start_matches('/');
        for s in 0..sections {
            files.push(format!("{base}section-{s}/README.md"));
            files.extend((0..pages).map(|p| format!("{base}section-{s}/page-{p}.md")));
        }
    }
    files
}

fn write_files(root: &Path, files: &[String]) {
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "# Page").unwrap();
    }
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for (sections, pages) in [(2, 10), (5, 20), (10, 50)] {
        let raw = create_site_document(sections, pages);
        let registry = LocaleRegistry::from_config(&raw).unwrap();
        let nav = validate(&raw, &registry).unwrap().config;
        let files: DiscoveredFiles = create_files(sections, pages).into_iter().collect();

        group.bench_with_input(
            BenchmarkId::new("all_present", format!("s{sections}_p{pages}")),
            &(nav, files),
            |b, (nav, files)| b.iter(|| resolve(nav, files)),
        );
    }

    group.finish();
}

fn bench_resolve_all_dangling(c: &mut Criterion) {
    let raw = create_site_document(5, 20);
    let registry = LocaleRegistry::from_config(&raw).unwrap();
    let nav = validate(&raw, &registry).unwrap().config;
    let files = DiscoveredFiles::default();

    c.bench_function("resolve_all_dangling", |b| b.iter(|| resolve(&nav, &files)));
}

fn bench_validate(c: &mut Criterion) {
    let raw = create_site_document(10, 50);
    let registry = LocaleRegistry::from_config(&raw).unwrap();

    c.bench_function("validate_large", |b| b.iter(|| validate(&raw, &registry)));
}

fn bench_scan(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    write_files(temp_dir.path(), &create_files(5, 20));
    let scanner = Scanner::new(temp_dir.path());

    c.bench_function("scan", |b| b.iter(|| scanner.scan()));
}

fn bench_build(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    write_files(temp_dir.path(), &create_files(5, 20));
    let raw = create_site_document(5, 20);

    let mut group = c.benchmark_group("build");

    group.bench_function("full_pipeline", |b| {
        b.iter(|| SiteBuilder::new(&raw, temp_dir.path()).build())
    });

    let loader = SiteLoader::new(temp_dir.path());
    // Prime the loader
    let _ = loader.reload_if_needed(&raw);

    group.bench_function("reload_cached", |b| {
        b.iter(|| loader.reload_if_needed(&raw))
    });

    group.bench_function("reload_after_invalidate", |b| {
        b.iter(|| {
            loader.invalidate();
            loader.reload_if_needed(&raw)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve,
    bench_resolve_all_dangling,
    bench_validate,
    bench_scan,
    bench_build,
);

criterion_main!(benches);
