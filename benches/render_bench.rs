//! Performance benchmarks for the render + write hot path.
//!
//! Exercises document assembly over records of growing size and a full
//! store-to-disk batch.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tempfile::tempdir;

use failscribe::model::{FailureRecord, Fixture, LocalVariable};
use failscribe::store::FailureStore;
use failscribe::{ReportWriter, render_report};

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// Build a synthetic record with a configurable number of locals and
/// fixtures to exercise different document sizes.
fn make_record(test_name: &str, num_locals: usize, num_fixtures: usize) -> FailureRecord {
    let mut record = FailureRecord::new(test_name);
    record.test_module = Some("bench".to_owned());
    record.test_file = Some("tests/bench.rs".to_owned());
    record.line_number = Some(100);
    record.exception_type = Some("assertion failed".to_owned());
    record.exception_message = Some("left != right".to_owned());
    record.exception_traceback = Some("0: bench::case\n1: core::panicking::panic".repeat(8));
    record.local_variables = (0..num_locals)
        .map(|i| LocalVariable::new(format!("var_{i}"), "value ".repeat(50)))
        .collect();
    record.test_source = Some("fn case() {\n    assert_eq!(1, 2);\n}".to_owned());
    record.fixtures = Some(
        (0..num_fixtures)
            .map(|i| {
                Fixture::custom(
                    format!("fixture_{i}"),
                    "function",
                    Some("fn fixture() {}".repeat(30)),
                )
            })
            .collect(),
    );
    record.markers = vec!["slow".to_owned()];
    record.duration = Some(0.321);
    record
}

fn bench_render(c: &mut Criterion) {
    let generated_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut group = c.benchmark_group("render_report");

    for size in [0usize, 10, 100] {
        let record = make_record("bench::test_render", size, size.min(20));
        group.bench_with_input(BenchmarkId::from_parameter(size), &record, |b, record| {
            b.iter(|| render_report(record, generated_at));
        });
    }
    group.finish();
}

fn bench_write_all(c: &mut Criterion) {
    let mut store = FailureStore::new();
    for i in 0..50 {
        store.record_failure(make_record(&format!("bench::test_{i}"), 10, 5));
    }

    c.bench_function("write_all_50_records", |b| {
        b.iter_batched(
            || tempdir().expect("tempdir"),
            |dir| {
                let writer = ReportWriter::new(dir.path().join("reports"));
                writer.write_all(&store).expect("write_all");
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_render, bench_write_all);
criterion_main!(benches);
