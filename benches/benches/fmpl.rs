//! Benchmark template compilation and rendering time.

use criterion::{criterion_group, criterion_main, Criterion};

use benches::{context, repeat, PAGE};

criterion_main! { benches }
criterion_group! { benches, bench_compile, bench_render, bench_include }

/// Benchmarks the time taken to compile a template.
fn bench_compile(c: &mut Criterion) {
    let mut g = c.benchmark_group("compile");
    let engine = fmpl::Engine::new();

    for n in [1, 50] {
        let source = repeat(PAGE, n);
        g.bench_function(format!("page x{n}"), |b| {
            b.iter(|| engine.compile(&source).unwrap());
        });
    }
}

/// Benchmarks the time taken to render a compiled template as a string.
fn bench_render(c: &mut Criterion) {
    let mut g = c.benchmark_group("render");
    let engine = fmpl::Engine::new();

    for users in [10, 150] {
        let ctx = context::random(users);
        let procedure = engine.compile(&repeat(PAGE, 20)).unwrap();
        g.bench_function(format!("page x20, {users} users"), |b| {
            b.iter(|| procedure.render(&ctx).to_string().unwrap());
        });
    }
}

/// Benchmarks compiling a template that splices in includes.
fn bench_include(c: &mut Criterion) {
    let mut g = c.benchmark_group("include");

    let mut engine = fmpl::Engine::new();
    engine.clear_default_resolver();
    engine.add_resolver(|name: &str, _: Option<&str>| (name == "page").then(|| PAGE.to_owned()));

    let source = repeat("{% include page %}\n", 50);
    g.bench_function("page x50", |b| {
        b.iter(|| engine.compile(&source).unwrap());
    });
}
