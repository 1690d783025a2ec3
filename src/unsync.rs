//! Provides the single-threaded reference multiset.

mod multiset;

pub use multiset::ReferenceMultiset;
