// (modulus, base) pairs of the two polynomial hashes behind a fingerprint.
pub(crate) const FINGERPRINT_M1: u64 = 1_000_000_007;
pub(crate) const FINGERPRINT_P1: u64 = 259;
pub(crate) const FINGERPRINT_M2: u64 = 1_000_000_009;
pub(crate) const FINGERPRINT_P2: u64 = 133_123;

/// The bucket array of a hash table is at least this many times larger than the
/// expected number of distinct keys.
pub(crate) const GROWTH_FACTOR: usize = 3;

/// Characters are mapped to child slots relative to this byte.
pub(crate) const ALPHABET_BASE: u8 = b'a';

/// `b'a'..=b'z'`
pub(crate) const MAX_ALPHABET_SIZE: usize = 26;

pub(crate) const TRIE_ROOT: u32 = 0;

pub(crate) const DEFAULT_CAPACITY_MULTIPLIER: usize = 1;

pub(crate) const WORKER_THREAD_NAME_PREFIX: &str = "countset-worker-";
