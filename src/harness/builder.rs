use super::DifferentialRunner;
use crate::{
    common::concurrent::{constants::DEFAULT_CAPACITY_MULTIPLIER, thread_pool::WorkerPool},
    EngineKind, ExecutionMode,
};

use std::path::PathBuf;

/// Builds a [`DifferentialRunner`] with various configuration knobs.
///
/// # Examples
///
/// ```rust
/// use countset::harness::RunnerBuilder;
/// use countset::{EngineKind, ExecutionMode};
///
/// let runner = RunnerBuilder::new()
///     // Split every phase across 8 threads.
///     .workers(8)
///     // Drive the trie twice, once from a single thread.
///     .engine(EngineKind::Trie, ExecutionMode::Sequential)
///     .engine(EngineKind::Trie, ExecutionMode::Parallel)
///     // Give every engine twice the minimum capacity.
///     .capacity_multiplier(2)
///     // Write reproduction files here when an engine diverges.
///     .artifact_dir(std::env::temp_dir())
///     .build();
///
/// assert_eq!(runner.workers(), 8);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RunnerBuilder {
    workers: Option<usize>,
    engines: Vec<(EngineKind, ExecutionMode)>,
    capacity_multiplier: Option<usize>,
    artifact_dir: Option<PathBuf>,
}

impl RunnerBuilder {
    /// Constructs a new `RunnerBuilder`.
    ///
    /// Without further configuration the runner uses one worker per available
    /// CPU, drives the trie and the hash table in parallel mode, sizes engines
    /// with a multiplier of 1 and writes no artifacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads used in parallel mode. Zero is treated
    /// as one.
    pub fn workers(self, num_workers: usize) -> Self {
        Self {
            workers: Some(num_workers),
            ..self
        }
    }

    /// Adds an engine to drive after the reference.
    ///
    /// Engines run in the order they are added. The same kind can be added
    /// more than once, e.g. in both execution modes.
    pub fn engine(mut self, kind: EngineKind, mode: ExecutionMode) -> Self {
        self.engines.push((kind, mode));
        self
    }

    /// Sets the factor applied to the minimum engine capacities: the trie's
    /// node pool of `sum(len(s) + 1)` and the table's expected key count of
    /// one per insert.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is zero.
    pub fn capacity_multiplier(self, multiplier: usize) -> Self {
        assert!(multiplier > 0);

        Self {
            capacity_multiplier: Some(multiplier),
            ..self
        }
    }

    /// Sets the directory under which reproduction artifacts are written when
    /// an engine diverges.
    pub fn artifact_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: Some(dir.into()),
            ..self
        }
    }

    /// Builds a `DifferentialRunner`.
    pub fn build(self) -> DifferentialRunner {
        let pool = self.workers.map(WorkerPool::new).unwrap_or_default();
        let engines = if self.engines.is_empty() {
            vec![
                (EngineKind::Trie, ExecutionMode::Parallel),
                (EngineKind::HashTable, ExecutionMode::Parallel),
            ]
        } else {
            self.engines
        };

        DifferentialRunner {
            pool,
            engines,
            capacity_multiplier: self
                .capacity_multiplier
                .unwrap_or(DEFAULT_CAPACITY_MULTIPLIER),
            artifact_dir: self.artifact_dir,
        }
    }
}
