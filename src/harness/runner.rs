use super::{artifact, RunnerBuilder, Workload};
use crate::{
    common::{concurrent::thread_pool::WorkerPool, error::HarnessError},
    sync::{ConcurrentHashTable, ConcurrentTrie},
    Engine, EngineKind, ExecutionMode,
};

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

/// The outcome of one engine on one workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineRun {
    pub engine: &'static str,
    pub mode: ExecutionMode,
    /// Time spent in the insert phase.
    pub insert_time: Duration,
    /// Time spent in the query phase.
    pub query_time: Duration,
    /// One count per query, in query order.
    pub results: Vec<u64>,
}

impl EngineRun {
    pub fn elapsed(&self) -> Duration {
        self.insert_time + self.query_time
    }
}

/// The outcome of a workload on which every engine agreed with the reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    // The reference run comes first.
    runs: Vec<EngineRun>,
}

impl RunReport {
    /// Returns the run of the reference multiset.
    pub fn reference(&self) -> &EngineRun {
        &self.runs[0]
    }

    /// Returns the runs of the engines under test, in the order they ran.
    pub fn engines(&self) -> &[EngineRun] {
        &self.runs[1..]
    }

    /// Returns all runs, starting with the reference.
    pub fn runs(&self) -> &[EngineRun] {
        &self.runs
    }

    /// Returns the agreed result vector.
    pub fn results(&self) -> &[u64] {
        &self.reference().results
    }
}

/// Drives multiset engines against the reference on the same workload and
/// compares their result vectors element by element.
///
/// For every engine, the insert phase runs to completion before the query
/// phase starts. In [`ExecutionMode::Parallel`] each phase is split across the
/// runner's worker threads, and every worker is joined before the next phase.
///
/// The first engine whose result vector differs from the reference's stops the
/// run with [`HarnessError::Divergence`]. If an artifact directory is
/// configured, the workload and both result vectors are written into a fresh
/// subdirectory first (see [`artifact`][super::artifact]).
///
/// # Examples
///
/// ```rust
/// use countset::harness::{DifferentialRunner, GeneratorConfig, WorkloadGenerator};
/// use countset::{EngineKind, ExecutionMode};
///
/// let runner = DifferentialRunner::builder()
///     .workers(4)
///     .engine(EngineKind::Trie, ExecutionMode::Parallel)
///     .engine(EngineKind::HashTable, ExecutionMode::Parallel)
///     .build();
///
/// let config = GeneratorConfig::new(12, 3, 1_000, 1_000);
/// let workload = WorkloadGenerator::new(0).generate(&config).unwrap();
///
/// let report = runner.run(&workload).unwrap();
/// assert_eq!(report.engines().len(), 2);
/// assert_eq!(report.results().len(), 1_000);
/// ```
#[derive(Clone, Debug)]
pub struct DifferentialRunner {
    pub(crate) pool: WorkerPool,
    pub(crate) engines: Vec<(EngineKind, ExecutionMode)>,
    pub(crate) capacity_multiplier: usize,
    pub(crate) artifact_dir: Option<PathBuf>,
}

impl Default for DifferentialRunner {
    fn default() -> Self {
        RunnerBuilder::default().build()
    }
}

impl DifferentialRunner {
    /// Returns a [`RunnerBuilder`], which can build a runner with various
    /// configurations.
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::default()
    }

    pub fn workers(&self) -> usize {
        self.pool.num_workers()
    }

    pub fn engine_kinds(&self) -> &[(EngineKind, ExecutionMode)] {
        &self.engines
    }

    pub fn capacity_multiplier(&self) -> usize {
        self.capacity_multiplier
    }

    pub fn artifact_dir(&self) -> Option<&std::path::Path> {
        self.artifact_dir.as_deref()
    }

    /// Runs `workload` on the reference and on a fresh instance of every
    /// configured engine, sized for the workload.
    ///
    /// Each engine is dropped before the next one is built.
    pub fn run(&self, workload: &Workload) -> Result<RunReport, HarnessError> {
        let reference = self.execute(&Engine::reference(), ExecutionMode::Sequential, workload)?;
        let mut runs = vec![reference];

        for &(kind, mode) in &self.engines {
            let engine = self.build_engine(kind, workload)?;
            let run = self.execute(&engine, mode, workload)?;
            self.check(workload, &runs[0], &run)?;
            runs.push(run);
        }

        self.log_pass(workload, &runs);
        Ok(RunReport { runs })
    }

    /// Runs `workload` on the reference and on caller-constructed engines.
    ///
    /// The engines must be empty. A reference engine passed here is always
    /// driven sequentially.
    pub fn run_engines<I>(&self, workload: &Workload, engines: I) -> Result<RunReport, HarnessError>
    where
        I: IntoIterator<Item = (Engine, ExecutionMode)>,
    {
        let reference = self.execute(&Engine::reference(), ExecutionMode::Sequential, workload)?;
        let mut runs = vec![reference];

        for (engine, mode) in engines {
            let run = self.execute(&engine, mode, workload)?;
            self.check(workload, &runs[0], &run)?;
            runs.push(run);
        }

        self.log_pass(workload, &runs);
        Ok(RunReport { runs })
    }

    /// Creates an empty engine of the given kind, sized for `workload`.
    pub fn build_engine(&self, kind: EngineKind, workload: &Workload) -> Result<Engine, HarnessError> {
        let inserts = workload.inserts();
        let engine = match kind {
            EngineKind::Trie => {
                let capacity = ConcurrentTrie::required_capacity(inserts)
                    .saturating_mul(self.capacity_multiplier);
                ConcurrentTrie::new(workload.alphabet_size(), capacity).map(Engine::from)
            }
            EngineKind::HashTable => ConcurrentHashTable::with_expected_keys(
                inserts.len().saturating_mul(self.capacity_multiplier),
            )
            .map(Engine::from),
        };
        engine.map_err(HarnessError::engine(kind.name()))
    }

    fn execute(
        &self,
        engine: &Engine,
        mode: ExecutionMode,
        workload: &Workload,
    ) -> Result<EngineRun, HarnessError> {
        let name = engine.name();
        let mode = if engine.supports_parallel() {
            mode
        } else {
            ExecutionMode::Sequential
        };
        let pool = match mode {
            ExecutionMode::Sequential => WorkerPool::new(1),
            ExecutionMode::Parallel => self.pool,
        };

        let start = Instant::now();
        pool.try_for_each(workload.inserts(), |key| {
            engine.insert(key).map_err(HarnessError::engine(name))
        })?;
        // Every insert worker has been joined here.
        let insert_time = start.elapsed();

        let start = Instant::now();
        let mut results = vec![0; workload.queries().len()];
        pool.try_map_into(workload.queries(), &mut results, |key| {
            engine.count(key).map_err(HarnessError::engine(name))
        })?;
        let query_time = start.elapsed();

        #[cfg(feature = "logging")]
        log::debug!(
            "{name} ({mode:?}, {} workers): inserts {insert_time:?}, queries {query_time:?}",
            pool.num_workers()
        );

        Ok(EngineRun {
            engine: name,
            mode,
            insert_time,
            query_time,
            results,
        })
    }

    fn check(
        &self,
        workload: &Workload,
        reference: &EngineRun,
        run: &EngineRun,
    ) -> Result<(), HarnessError> {
        let Some(index) = first_mismatch(&reference.results, &run.results) else {
            return Ok(());
        };

        let artifacts = self.artifact_dir.as_deref().and_then(|root| {
            match artifact::write_divergence(root, workload, &reference.results, &run.results) {
                Ok(dir) => Some(dir),
                Err(_e) => {
                    #[cfg(feature = "logging")]
                    log::error!(
                        "Failed to write divergence artifacts under {}: {_e}",
                        root.display()
                    );
                    None
                }
            }
        });

        #[cfg(feature = "logging")]
        if let Some(dir) = &artifacts {
            log::error!("Divergence artifacts written to {}", dir.display());
        }

        let error = HarnessError::Divergence {
            engine: run.engine,
            index,
            expected: reference.results.get(index).copied().unwrap_or_default(),
            actual: run.results.get(index).copied().unwrap_or_default(),
            artifacts,
        };

        #[cfg(feature = "logging")]
        log::error!("{}: {error}", workload.label());

        Err(error)
    }

    fn log_pass(&self, _workload: &Workload, _runs: &[EngineRun]) {
        #[cfg(feature = "logging")]
        for run in &_runs[1..] {
            log::info!(
                "{}: {} ({:?}) agrees with the reference in {:?}",
                _workload.label(),
                run.engine,
                run.mode,
                run.elapsed()
            );
        }
    }
}

fn first_mismatch(expected: &[u64], actual: &[u64]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then_some(expected.len().min(actual.len())))
}

#[cfg(test)]
mod tests {
    use super::{first_mismatch, DifferentialRunner};
    use crate::{
        harness::{GeneratorConfig, Workload, WorkloadGenerator},
        sync::{ConcurrentHashTable, ConcurrentTrie},
        Engine, EngineKind, ExecutionMode, HarnessError,
    };

    fn workload(inserts: &[&str], queries: &[&str]) -> Workload {
        let strings = |s: &[&str]| s.iter().map(|s| s.to_string()).collect();
        Workload::new("test", strings(inserts), strings(queries)).unwrap()
    }

    #[test]
    fn mismatch_index() {
        assert_eq!(first_mismatch(&[1, 2, 3], &[1, 2, 3]), None);
        assert_eq!(first_mismatch(&[1, 2, 3], &[1, 0, 0]), Some(1));
        assert_eq!(first_mismatch(&[1, 2], &[1, 2, 3]), Some(2));
        assert_eq!(first_mismatch(&[], &[]), None);
    }

    #[test]
    fn default_configuration() {
        let runner = DifferentialRunner::default();
        assert!(runner.workers() >= 1);
        assert_eq!(runner.capacity_multiplier(), 1);
        assert!(runner.artifact_dir().is_none());
        assert_eq!(
            runner.engine_kinds(),
            [
                (EngineKind::Trie, ExecutionMode::Parallel),
                (EngineKind::HashTable, ExecutionMode::Parallel)
            ]
        );
    }

    #[test]
    fn reports_counts_in_query_order() {
        let runner = DifferentialRunner::builder()
            .workers(3)
            .engine(EngineKind::Trie, ExecutionMode::Sequential)
            .engine(EngineKind::Trie, ExecutionMode::Parallel)
            .engine(EngineKind::HashTable, ExecutionMode::Parallel)
            .build();
        let workload = workload(&["ab", "ba", "ab", "", "ab"], &["ab", "b", "", "ba", "abc"]);

        let report = runner.run(&workload).unwrap();
        assert_eq!(report.results(), [3, 0, 1, 1, 0]);
        assert_eq!(report.reference().engine, "reference");
        assert_eq!(report.reference().mode, ExecutionMode::Sequential);

        let engines: Vec<_> = report.engines().iter().map(|r| (r.engine, r.mode)).collect();
        assert_eq!(
            engines,
            vec![
                ("trie", ExecutionMode::Sequential),
                ("trie", ExecutionMode::Parallel),
                ("hash table", ExecutionMode::Parallel)
            ]
        );
        assert!(report
            .engines()
            .iter()
            .all(|r| r.results == report.results()));
    }

    #[test]
    fn engines_are_sized_from_the_workload() {
        let runner = DifferentialRunner::builder().capacity_multiplier(2).build();
        let workload = workload(&["abc", "d"], &["a"]);

        match runner.build_engine(EngineKind::Trie, &workload).unwrap() {
            Engine::Trie(trie) => {
                assert_eq!(trie.capacity(), 12);
                assert_eq!(trie.alphabet_size(), 4);
            }
            other => panic!("unexpected engine: {other:?}"),
        }
        match runner.build_engine(EngineKind::HashTable, &workload).unwrap() {
            Engine::HashTable(table) => assert_eq!(table.capacity(), 16),
            other => panic!("unexpected engine: {other:?}"),
        }
    }

    #[test]
    fn engine_errors_name_the_engine() {
        let runner = DifferentialRunner::builder().workers(2).build();
        let workload = workload(&["ab", "a-b"], &["ab"]);

        match runner.run(&workload) {
            Err(HarnessError::Engine { engine, .. }) => assert_eq!(engine, "trie"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn undersized_trie_is_rejected() {
        let runner = DifferentialRunner::builder().workers(2).build();
        let workload = workload(&["ab", "cd"], &["ab", "cd"]);
        let trie = ConcurrentTrie::new(4, 4).unwrap();

        assert!(matches!(
            runner.run_engines(&workload, [(Engine::from(trie), ExecutionMode::Parallel)]),
            Err(HarnessError::Engine { engine: "trie", .. })
        ));
    }

    #[test]
    fn detects_divergence() {
        let runner = DifferentialRunner::builder().workers(2).build();
        let workload = workload(&["aa", "ab"], &["aa", "ab", "ba"]);

        // A table that already holds an entry reports a wrong count.
        let dirty = ConcurrentHashTable::with_expected_keys(4).unwrap();
        dirty.insert("ab").unwrap();

        let trie = ConcurrentTrie::for_strings(2, workload.inserts()).unwrap();
        let engines = [
            (Engine::from(trie), ExecutionMode::Parallel),
            (Engine::from(dirty), ExecutionMode::Parallel),
        ];

        match runner.run_engines(&workload, engines) {
            Err(HarnessError::Divergence {
                engine,
                index,
                expected,
                actual,
                artifacts,
            }) => {
                assert_eq!(engine, "hash table");
                assert_eq!(index, 1);
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
                assert!(artifacts.is_none());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn generated_workload_passes() {
        let runner = DifferentialRunner::builder().workers(4).build();
        let config = GeneratorConfig::new(16, 4, 2_000, 2_000).shared_prefix(true);
        let workload = WorkloadGenerator::new(11).generate(&config).unwrap();

        let report = runner.run(&workload).unwrap();
        assert_eq!(report.runs().len(), 3);
        assert_eq!(
            report.results().iter().sum::<u64>(),
            workload
                .queries()
                .iter()
                .map(|q| workload.inserts().iter().filter(|s| *s == q).count() as u64)
                .sum::<u64>()
        );
    }
}
