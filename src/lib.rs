#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! Countset provides two concurrent, fixed-capacity multisets of strings and a
//! harness that checks them against a sequential reference.
//!
//! - [`sync::ConcurrentTrie`] stores strings in a trie over a small lowercase
//!   alphabet, with one lock per node.
//! - [`sync::ConcurrentHashTable`] stores string [fingerprints][fingerprint] in
//!   an open-addressing table, with one lock per bucket.
//! - [`unsync::ReferenceMultiset`] is a single-threaded map from string to
//!   count, used as ground truth.
//!
//! Both concurrent engines can be filled from many threads at once. Neither
//! ever resizes or removes a key, and both reject an operation rather than
//! corrupt their state when a precondition does not hold.
//!
//! The [`harness`] module generates random workloads, drives every engine with
//! a bounded pool of worker threads, and reports the first query on which an
//! engine disagrees with the reference.
//!
//! # Example
//!
//! ```rust
//! use countset::harness::{DifferentialRunner, GeneratorConfig, WorkloadGenerator};
//!
//! // 10,000 strings of length 20 over "abcde". The first 10 characters of
//! // every string are 'a', so all inserts contend on the same trie path.
//! let config = GeneratorConfig::new(20, 5, 10_000, 10_000).shared_prefix(true);
//! let workload = WorkloadGenerator::new(2024).generate(&config).unwrap();
//!
//! let runner = DifferentialRunner::builder().workers(8).build();
//! let report = runner.run(&workload).unwrap();
//!
//! for run in report.runs() {
//!     println!("{}: {:?}", run.engine, run.elapsed());
//! }
//! ```
//!
//! # Logging
//!
//! With the optional `logging` feature, the runner reports phase timings,
//! passing runs and divergences through the [`log`](https://docs.rs/log) crate.

pub(crate) mod common;
mod engine;
pub mod harness;
pub mod sync;
pub mod unsync;

pub use common::{
    error::{EngineError, HarnessError},
    fingerprint::fingerprint,
};
pub use engine::{Engine, EngineKind, ExecutionMode};
