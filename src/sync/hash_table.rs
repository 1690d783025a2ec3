use crate::common::{
    concurrent::constants::GROWTH_FACTOR, error::EngineError, fingerprint::fingerprint,
};

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use std::{
    fmt,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

#[derive(Default)]
struct Bucket {
    // `None` until a fingerprint claims the bucket. Never reset afterwards.
    occupant: Mutex<Option<u64>>,
    count: AtomicU64,
}

/// A thread-safe multiset of strings stored in an open-addressing hash table.
///
/// Keys are identified by their [fingerprint][crate::fingerprint] only; the
/// strings themselves are not stored. The bucket array has a fixed power-of-two
/// length and is never resized. A key's probe sequence starts at
/// `fingerprint & (capacity - 1)` and walks forward one bucket at a time,
/// wrapping around at the end of the array.
///
/// Every bucket has its own lock, which guards its occupant fingerprint. An
/// insert claims the first empty bucket on the probe sequence unless it finds
/// its own fingerprint first. Claiming and checking happen under the same lock,
/// so two threads inserting the same key always end up in the same bucket. The
/// multiplicity is an atomic counter incremented after the lock is released.
///
/// Buckets are never freed, so a lookup can stop at the first empty bucket.
///
/// # Examples
///
/// ```rust
/// use countset::sync::ConcurrentHashTable;
///
/// let table = ConcurrentHashTable::with_expected_keys(100).unwrap();
/// assert_eq!(table.capacity(), 512);
///
/// table.insert("Hello").unwrap();
/// table.insert("Hello").unwrap();
///
/// assert_eq!(table.count("Hello"), 2);
/// assert_eq!(table.count("World"), 0);
/// ```
pub struct ConcurrentHashTable {
    buckets: Box<[Bucket]>,
    mask: usize,
    occupied: CachePadded<AtomicUsize>,
}

impl ConcurrentHashTable {
    /// Creates a table for up to `num_keys` distinct keys.
    ///
    /// The bucket array gets the smallest power-of-two length that is at least
    /// three times `num_keys`, and at least one.
    pub fn with_expected_keys(num_keys: usize) -> Result<Self, EngineError> {
        let capacity = num_keys
            .checked_mul(GROWTH_FACTOR)
            .and_then(|n| n.max(1).checked_next_power_of_two())
            .ok_or(EngineError::InvalidCapacity {
                capacity: num_keys,
                reason: "the bucket array would be too large",
            })?;
        Self::with_buckets(capacity)
    }

    /// Creates a table with exactly `capacity` buckets.
    ///
    /// # Errors
    ///
    /// Fails unless `capacity` is a power of two.
    pub fn with_buckets(capacity: usize) -> Result<Self, EngineError> {
        if !capacity.is_power_of_two() {
            return Err(EngineError::InvalidCapacity {
                capacity,
                reason: "the bucket count must be a power of two",
            });
        }

        let buckets = std::iter::repeat_with(Bucket::default)
            .take(capacity)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            buckets,
            mask: capacity - 1,
            occupied: CachePadded::new(AtomicUsize::default()),
        })
    }

    /// Increments the count of `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::TableFull`] if every bucket is claimed by other
    /// fingerprints.
    pub fn insert(&self, key: &str) -> Result<(), EngineError> {
        let hash = fingerprint(key);

        for index in self.probe(hash) {
            let bucket = &self.buckets[index];
            let occupant = *bucket.occupant.lock().get_or_insert_with(|| {
                self.occupied.fetch_add(1, Ordering::AcqRel);
                hash
            });

            if occupant == hash {
                bucket.count.fetch_add(1, Ordering::AcqRel);
                return Ok(());
            }
        }

        Err(EngineError::TableFull {
            capacity: self.capacity(),
        })
    }

    /// Returns how many times `key` has been inserted.
    pub fn count(&self, key: &str) -> u64 {
        let hash = fingerprint(key);

        for index in self.probe(hash) {
            let bucket = &self.buckets[index];
            let occupant = *bucket.occupant.lock();
            match occupant {
                None => return 0,
                Some(occupant) if occupant == hash => {
                    return bucket.count.load(Ordering::Acquire);
                }
                Some(_) => (),
            }
        }

        0
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of claimed buckets, i.e. distinct fingerprints.
    pub fn occupied(&self) -> usize {
        self.occupied.load(Ordering::Acquire)
    }

    pub fn load_factor(&self) -> f64 {
        self.occupied() as f64 / self.capacity() as f64
    }

    fn probe(&self, hash: u64) -> impl Iterator<Item = usize> {
        let mask = self.mask;
        // Only the low bits survive the mask, so truncating is fine.
        let start = hash as usize & mask;
        (0..self.buckets.len()).map(move |i| start.wrapping_add(i) & mask)
    }
}

impl fmt::Debug for ConcurrentHashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentHashTable")
            .field("capacity", &self.capacity())
            .field("occupied", &self.occupied())
            .finish()
    }
}
