//! # Anchor Pipeline Benchmarks
//!
//! | Crate | Path | Scaling |
//! |-------|------|---------|
//! | st-02 Anchor Files | core index encode + parse | linear in creates |
//! | st-03 Fee Manager | minimum fee | constant |
//! | st-05 Resolver | fold an update chain | linear in chain length |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_stores::MemoryOperationStore;
use shared_types::{AnchoredOperation, ProtocolParameters};
use st_01_operations::{
    create_request, update_request, CreateOperation, KeySet, Operation, OperationRequest,
};
use st_02_anchor_files::CoreIndexFile;
use st_03_fee_manager::FeeManager;
use st_05_resolver::{Resolver, ResolverConfig};
use std::sync::Arc;

fn creates(count: u64, params: &ProtocolParameters) -> Vec<CreateOperation> {
    (0..count)
        .map(|seed| {
            let request = create_request(&KeySet::from_seed(seed), vec![], params).unwrap();
            match Operation::parse(&request.operation_buffer, params).unwrap() {
                Operation::Create(op) => op,
                _ => unreachable!("create request parses as create"),
            }
        })
        .collect()
}

fn anchored(request: &OperationRequest, transaction_number: u64) -> AnchoredOperation {
    AnchoredOperation {
        operation_type: request.operation_type,
        did_unique_suffix: request.did_unique_suffix.clone(),
        operation_buffer: request.operation_buffer.clone(),
        transaction_number,
        transaction_time: transaction_number,
        operation_index: 0,
    }
}

// ============================================================================
// ST-02: Core Index File
// ============================================================================

fn bench_core_index_file(c: &mut Criterion) {
    let params = ProtocolParameters::default();
    let uri = "a".repeat(64);
    let mut group = c.benchmark_group("st-02-core-index-file");

    for size in [10u64, 100, 1_000] {
        let ops = creates(size, &params);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("create_then_parse", size), &ops, |b, ops| {
            b.iter(|| {
                let buffer =
                    CoreIndexFile::create_buffer(None, Some(&uri), None, ops, &[], &[]).unwrap();
                black_box(CoreIndexFile::parse(&buffer, &params).unwrap())
            })
        });
    }

    group.finish();
}

// ============================================================================
// ST-03: Fee Manager
// ============================================================================

fn bench_minimum_fee(c: &mut Criterion) {
    let fees = FeeManager::new(&ProtocolParameters::default());
    c.bench_function("st-03-minimum-transaction-fee", |b| {
        b.iter(|| {
            black_box(
                fees.compute_minimum_transaction_fee(black_box(1_000), black_box(10_000))
                    .unwrap(),
            )
        })
    });
}

// ============================================================================
// ST-05: Resolver
// ============================================================================

fn bench_resolve_update_chain(c: &mut Criterion) {
    let params = ProtocolParameters::default();
    let resolver = Resolver::new(
        ResolverConfig::default(),
        params.clone(),
        Arc::new(MemoryOperationStore::new()),
    );
    let mut group = c.benchmark_group("st-05-resolver");

    for length in [10u64, 50, 200] {
        let keys: Vec<KeySet> = (0..=length).map(KeySet::from_seed).collect();
        let create = create_request(&keys[0], vec![], &params).unwrap();
        let mut operations = vec![anchored(&create, 1)];
        for i in 0..length as usize {
            let update = update_request(
                &create.did_unique_suffix,
                &keys[i],
                &keys[i + 1],
                vec![],
                &params,
            )
            .unwrap();
            operations.push(anchored(&update, i as u64 + 2));
        }
        operations.reverse();

        group.throughput(Throughput::Elements(length));
        group.bench_with_input(
            BenchmarkId::new("resolve_operations", length),
            &operations,
            |b, operations| b.iter(|| black_box(resolver.resolve_operations(operations))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_core_index_file,
    bench_minimum_fee,
    bench_resolve_update_chain
);
criterion_main!(benches);
