//! Membership Reconciliation Benchmarks
//!
//! Measures set differencing for groups of various sizes and a full
//! sync/diff/apply pass against the in-memory transport.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use okta_provider::client::InMemoryGroupsApi;
use okta_provider::membership::{MembershipReconciler, diff};
use okta_provider::resource::GroupConfig;
use okta_provider::value_objects::MemberSet;
use serde_json::json;
use std::hint::black_box;
use tokio_util::sync::CancellationToken;

/// Members `00u{start}`..`00u{end}`, zero padded so order matches numbering.
fn member_range(start: usize, end: usize) -> MemberSet {
    MemberSet::try_from_strs((start..end).map(|i| format!("00u{:08}", i))).unwrap()
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership_diff");

    for size in [10usize, 100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        // Half the members overlap, a quarter are added and a quarter removed
        let desired = member_range(0, *size);
        let observed = member_range(size / 4, size + size / 4);

        group.bench_with_input(BenchmarkId::new("partial_overlap", size), size, |b, _| {
            b.iter(|| black_box(diff(black_box(&desired), black_box(&observed))));
        });

        group.bench_with_input(BenchmarkId::new("in_sync", size), size, |b, _| {
            b.iter(|| black_box(diff(black_box(&desired), black_box(&desired))));
        });
    }

    group.finish();
}

fn bench_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_config");

    for size in [0usize, 100, 1_000].iter() {
        let users: Vec<String> = (0..*size).map(|i| format!("00u{:08}", i)).collect();
        let raw = json!({
            "name": "Engineering",
            "description": "Benchmark group",
            "users": users,
        });

        group.bench_with_input(BenchmarkId::new("from_value", size), size, |b, _| {
            b.iter(|| black_box(GroupConfig::from_value(black_box(&raw))));
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_in_memory");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for size in [100usize, 1_000].iter() {
        let desired = member_range(0, *size);

        group.bench_with_input(BenchmarkId::new("sync_diff_apply", size), size, |b, &size| {
            b.iter(|| {
                runtime.block_on(async {
                    let api = InMemoryGroupsApi::with_page_size(200);
                    let group_id = api.seed_group("Bench", None).await;
                    let observed = member_range(size / 2, size + size / 2);
                    api.seed_members(&group_id, observed.to_strings())
                        .await
                        .unwrap();

                    let reconciler = MembershipReconciler::new(&api);
                    let outcome = reconciler
                        .reconcile(&group_id, false, &desired, &CancellationToken::new())
                        .await
                        .unwrap();
                    black_box(outcome)
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_config_parsing, bench_reconcile);
criterion_main!(benches);
