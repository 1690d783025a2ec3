//! The final counts of an engine must not depend on how many threads filled it.
//!
//! Every test inserts the same 10,000 strings (length 20, alphabet of 5
//! letters, 2,000 of them duplicates) with 1, 2 and 16 threads, each into a
//! fresh engine, and compares every count with the reference.

use countset::{
    harness::{GeneratorConfig, Workload, WorkloadGenerator},
    sync::{ConcurrentHashTable, ConcurrentTrie},
    unsync::ReferenceMultiset,
    Engine,
};
use paste::paste;
use std::{sync::Barrier, thread};

const WORKER_COUNTS: [usize; 3] = [1, 2, 16];

fn workload(shared_prefix: bool) -> Workload {
    let config = GeneratorConfig::new(20, 5, 8_000, 2_000).shared_prefix(shared_prefix);
    let generated = WorkloadGenerator::new(0x5eed)
        .generate(&config)
        .expect("Failed to generate");

    let mut inserts = generated.inserts().to_vec();
    inserts.extend_from_slice(&generated.inserts()[..2_000]);
    Workload::new(generated.label(), inserts, generated.queries().to_vec())
        .expect("Failed to build the workload")
}

fn insert_with_threads(engine: &Engine, workload: &Workload, num_threads: usize) {
    let chunk_len = (workload.inserts().len() + num_threads - 1) / num_threads;
    let chunks: Vec<_> = workload.inserts().chunks(chunk_len).collect();
    let barrier = &Barrier::new(chunks.len());

    thread::scope(|s| {
        for chunk in chunks {
            s.spawn(move || {
                barrier.wait();
                for key in chunk {
                    engine.insert(key).expect("Insert failed");
                }
            });
        }
    });
}

fn check_worker_counts(workload: &Workload, new_engine: impl Fn(&Workload) -> Engine) {
    let reference: ReferenceMultiset = workload.inserts().iter().map(String::as_str).collect();
    let keys: Vec<&String> = workload.inserts().iter().chain(workload.queries()).collect();
    let expected: Vec<u64> = keys.iter().map(|k| reference.count(k)).collect();
    assert!(expected.iter().any(|&c| c >= 2), "no duplicate keys");

    for num_threads in WORKER_COUNTS {
        let engine = new_engine(workload);
        insert_with_threads(&engine, workload, num_threads);

        let counts: Vec<u64> = keys
            .iter()
            .map(|k| engine.count(k).expect("Query failed"))
            .collect();

        if let Some(i) = (0..keys.len()).find(|&i| counts[i] != expected[i]) {
            panic!(
                "{} with {num_threads} threads: count({}) = {}, expected {}",
                engine.name(),
                keys[i],
                counts[i],
                expected[i]
            );
        }
    }
}

fn new_trie(workload: &Workload) -> Engine {
    ConcurrentTrie::for_strings(5, workload.inserts())
        .expect("Failed to create a trie")
        .into()
}

fn new_hash_table(workload: &Workload) -> Engine {
    ConcurrentHashTable::with_expected_keys(workload.inserts().len())
        .expect("Failed to create a hash table")
        .into()
}

macro_rules! generate_contention_tests {
    ($name:ident, $new_engine:expr) => {
        paste! {
            #[test]
            fn [<test_ $name _random_keys>]() {
                check_worker_counts(&workload(false), $new_engine);
            }

            #[test]
            fn [<test_ $name _shared_prefix_keys>]() {
                check_worker_counts(&workload(true), $new_engine);
            }
        }
    };
}

generate_contention_tests!(trie, new_trie);
generate_contention_tests!(hash_table, new_hash_table);
