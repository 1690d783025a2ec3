//! Provides the thread-safe multiset engines.
//!
//! Both engines have a fixed capacity chosen at construction, never resize and
//! never remove keys. All of their methods take `&self` and can be called from
//! any number of threads.

mod hash_table;
mod trie;

pub use {hash_table::ConcurrentHashTable, trie::ConcurrentTrie};
