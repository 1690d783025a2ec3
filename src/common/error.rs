use std::{io, path::PathBuf};

/// The error type for the operations of the multiset engines.
///
/// Every variant rejects the operation that produced it. The engine is left in
/// a consistent state: no edge or bucket is ever written for a rejected key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A key contains a byte outside of the engine's alphabet, which always
    /// starts at `b'a'`.
    #[error("byte {byte:#04x} at position {position} is outside of the alphabet")]
    OutOfAlphabet { byte: u8, position: usize },

    /// The requested alphabet size is zero or larger than `b'a'..=b'z'`.
    #[error("alphabet size must be in 1..={max}, got {size}")]
    InvalidAlphabet { size: usize, max: usize },

    /// The requested capacity cannot be used to build an engine.
    #[error("invalid capacity {capacity}: {reason}")]
    InvalidCapacity {
        capacity: usize,
        reason: &'static str,
    },

    /// The trie's node pool has no free node left for this insert.
    ///
    /// The pool size must be at least `sum(len(s) + 1)` over the inserted
    /// strings.
    #[error("trie node pool of {capacity} nodes is exhausted")]
    CapacityExceeded { capacity: usize },

    /// Every bucket of the hash table is claimed by another fingerprint.
    #[error("hash table of {capacity} buckets is full")]
    TableFull { capacity: usize },
}

/// The error type for the differential runner and the workload artifacts.
#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    /// An engine rejected an insert or a query.
    #[error("engine `{engine}` failed: {source}")]
    Engine {
        engine: &'static str,
        #[source]
        source: EngineError,
    },

    /// Reading or writing a workload or result file failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A workload or result file is malformed.
    #[error("malformed input at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// An insert or query string contains `'\n'` or `'\r'`, which the
    /// workload file format cannot represent.
    #[error("{sequence} string {index} contains a line break")]
    LineBreak {
        sequence: &'static str,
        index: usize,
    },

    /// The workload generator rejected its configuration.
    #[error("failed to generate a workload: {0}")]
    Generator(#[source] EngineError),

    /// An engine's result vector disagrees with the reference.
    ///
    /// `artifacts` is the directory holding `workload.txt`, `expected.txt` and
    /// `actual.txt` when the runner was configured with an artifact root.
    #[error(
        "engine `{engine}` diverged from the reference at query {index}: \
    expected {expected}, got {actual}"
    )]
    Divergence {
        engine: &'static str,
        index: usize,
        expected: u64,
        actual: u64,
        artifacts: Option<PathBuf>,
    },
}

impl HarnessError {
    pub(crate) fn engine(engine: &'static str) -> impl FnOnce(EngineError) -> Self {
        move |source| Self::Engine { engine, source }
    }

    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            msg: msg.into(),
        }
    }
}
