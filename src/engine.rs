use crate::{
    common::error::EngineError,
    sync::{ConcurrentHashTable, ConcurrentTrie},
    unsync::ReferenceMultiset,
};

use parking_lot::Mutex;

/// One of the multiset engines the differential runner can drive.
///
/// The set of engines is closed. All variants share one interface: `insert`,
/// `count` and `name`, callable through `&self`.
///
/// The reference variant is wrapped in a mutex only so that `Engine` is `Sync`.
/// The runner always drives it from a single thread.
#[derive(Debug)]
pub enum Engine {
    Reference(Mutex<ReferenceMultiset>),
    Trie(ConcurrentTrie),
    HashTable(ConcurrentHashTable),
}

/// The concurrent engines a runner builds for every workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Trie,
    HashTable,
}

/// How a phase of a run is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Every operation runs on the calling thread, in workload order.
    Sequential,
    /// Operations are split across the runner's worker threads.
    Parallel,
}

impl Engine {
    /// Creates an empty reference engine.
    pub fn reference() -> Self {
        Self::Reference(Mutex::new(ReferenceMultiset::new()))
    }

    /// Increments the count of `key`.
    pub fn insert(&self, key: &str) -> Result<(), EngineError> {
        match self {
            Self::Reference(set) => {
                set.lock().insert(key);
                Ok(())
            }
            Self::Trie(trie) => trie.insert(key),
            Self::HashTable(table) => table.insert(key),
        }
    }

    /// Returns how many times `key` has been inserted.
    pub fn count(&self, key: &str) -> Result<u64, EngineError> {
        match self {
            Self::Reference(set) => Ok(set.lock().count(key)),
            Self::Trie(trie) => trie.count(key),
            Self::HashTable(table) => Ok(table.count(key)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reference(_) => "reference",
            Self::Trie(_) => EngineKind::Trie.name(),
            Self::HashTable(_) => EngineKind::HashTable.name(),
        }
    }

    /// Returns `false` for engines that must only be driven by one thread.
    pub fn supports_parallel(&self) -> bool {
        !matches!(self, Self::Reference(_))
    }
}

impl EngineKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Trie => "trie",
            Self::HashTable => "hash table",
        }
    }
}

impl From<ReferenceMultiset> for Engine {
    fn from(set: ReferenceMultiset) -> Self {
        Self::Reference(Mutex::new(set))
    }
}

impl From<ConcurrentTrie> for Engine {
    fn from(trie: ConcurrentTrie) -> Self {
        Self::Trie(trie)
    }
}

impl From<ConcurrentHashTable> for Engine {
    fn from(table: ConcurrentHashTable) -> Self {
        Self::HashTable(table)
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{
        sync::{ConcurrentHashTable, ConcurrentTrie},
        EngineError,
    };

    fn engines() -> Vec<Engine> {
        vec![
            Engine::reference(),
            ConcurrentTrie::new(3, 32).unwrap().into(),
            ConcurrentHashTable::with_expected_keys(8).unwrap().into(),
        ]
    }

    #[test]
    fn names() {
        let names: Vec<_> = engines().iter().map(Engine::name).collect();
        assert_eq!(names, vec!["reference", "trie", "hash table"]);
    }

    #[test]
    fn parallel_support() {
        let support: Vec<_> = engines().iter().map(Engine::supports_parallel).collect();
        assert_eq!(support, vec![false, true, true]);
    }

    #[test]
    fn same_counts_through_every_variant() -> Result<(), EngineError> {
        for engine in engines() {
            for key in ["abc", "ab", "abc", "c", ""] {
                engine.insert(key)?;
            }
            assert_eq!(engine.count("abc")?, 2, "{}", engine.name());
            assert_eq!(engine.count("ab")?, 1, "{}", engine.name());
            assert_eq!(engine.count("")?, 1, "{}", engine.name());
            assert_eq!(engine.count("b")?, 0, "{}", engine.name());
        }
        Ok(())
    }

    #[test]
    fn trie_errors_pass_through() {
        let engine = Engine::from(ConcurrentTrie::new(1, 4).unwrap());
        assert!(matches!(
            engine.insert("b"),
            Err(EngineError::OutOfAlphabet { byte: b'b', .. })
        ));
    }
}
