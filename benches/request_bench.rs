// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for `/cmd` request validation and error body rendering.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cmdsrv_daemon::handler::validate;
use cmdsrv_error::{ApiError, to_error_response};

// ── Helpers ─────────────────────────────────────────────────────────────

fn cmd_body(args: usize) -> Vec<u8> {
    let mut cmd = vec!["echo".to_string()];
    cmd.extend((0..args).map(|i| format!("arg-{i}")));
    serde_json::to_vec(&serde_json::json!({ "cmd": cmd })).unwrap_or_default()
}

// ── Validation ──────────────────────────────────────────────────────────

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    for args in [0, 8, 256] {
        let body = cmd_body(args);
        group.bench_with_input(BenchmarkId::new("valid", args), &body, |b, body| {
            b.iter(|| validate(black_box(body), Some("application/json")))
        });
    }
    group.bench_function("invalid_json", |b| {
        b.iter(|| validate(black_box(b"{\"cmd\":[\"ls\""), Some("application/json")))
    });
    group.bench_function("wrong_content_type", |b| {
        let body = cmd_body(1);
        b.iter(|| validate(black_box(&body), Some("text/plain")))
    });
    group.finish();
}

// ── Error rendering ─────────────────────────────────────────────────────

fn bench_render(c: &mut Criterion) {
    let spawn = ApiError::spawn("No such file or directory (os error 2)");
    c.bench_function("render/spawn", |b| b.iter(|| black_box(&spawn).render()));
    c.bench_function("render/transport_404", |b| {
        b.iter(|| to_error_response(black_box(404), "Not found: '/nope'"))
    });
}

criterion_group!(benches, bench_validate, bench_render);
criterion_main!(benches);
