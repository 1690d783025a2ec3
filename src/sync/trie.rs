use crate::common::{
    alphabet_slots, check_alphabet_size,
    concurrent::constants::{MAX_ALPHABET_SIZE, TRIE_ROOT},
    error::EngineError,
};

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use smallvec::{smallvec, SmallVec};
use std::{
    fmt,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

// The root is never a child of another node, so its index marks an absent edge.
const NO_CHILD: u32 = TRIE_ROOT;

type Children = SmallVec<[u32; MAX_ALPHABET_SIZE]>;

struct TrieNode {
    children: Mutex<Children>,
    count: AtomicU64,
}

impl TrieNode {
    fn new(alphabet_size: usize) -> Self {
        Self {
            children: Mutex::new(smallvec![NO_CHILD; alphabet_size]),
            count: AtomicU64::default(),
        }
    }
}

/// A thread-safe multiset of strings stored in a character-indexed trie.
///
/// All nodes are preallocated in a fixed-size pool when the trie is created.
/// Node 0 is the root; the other nodes are handed out by an atomic counter as
/// new edges are created, and are never freed.
///
/// Every node has its own lock, which guards the node's child edges. A
/// traversal holds at most one lock at a time: the lock of the current node is
/// released before the traversal moves to the child. Two traversals can
/// therefore never wait on each other in a cycle. The multiplicity of a string
/// is an atomic counter on its terminal node and is updated without a lock.
///
/// Keys must only contain bytes in `b'a'..b'a' + alphabet_size`. An insert or
/// a query with any other byte is rejected with
/// [`EngineError::OutOfAlphabet`] before the trie is touched.
///
/// # Sizing
///
/// Inserting a string of length `n` allocates at most `n` nodes. A pool of
/// `sum(len(s) + 1)` nodes over all inserted strings (see
/// [`ConcurrentTrie::for_strings`]) is always enough. An insert that needs a
/// node when the pool is exhausted fails with
/// [`EngineError::CapacityExceeded`]; the nodes it created before that remain
/// valid, so the trie stays consistent.
///
/// # Examples
///
/// ```rust
/// use countset::sync::ConcurrentTrie;
/// use std::thread;
///
/// let trie = ConcurrentTrie::new(3, 64).unwrap();
///
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| trie.insert("abc").unwrap());
///     }
/// });
///
/// assert_eq!(trie.count("abc").unwrap(), 4);
/// assert_eq!(trie.count("ab").unwrap(), 0);
/// assert!(trie.insert("abd").is_err());
/// ```
pub struct ConcurrentTrie {
    alphabet_size: usize,
    nodes: Box<[TrieNode]>,
    next_node: CachePadded<AtomicUsize>,
}

impl ConcurrentTrie {
    /// Creates a trie over an alphabet of `alphabet_size` letters starting at
    /// `'a'`, with a pool of `capacity` nodes including the root.
    ///
    /// # Errors
    ///
    /// Fails if `alphabet_size` is not in `1..=26`, or if `capacity` is zero or
    /// does not fit a 32-bit node handle.
    pub fn new(alphabet_size: usize, capacity: usize) -> Result<Self, EngineError> {
        check_alphabet_size(alphabet_size)?;
        if capacity == 0 {
            return Err(EngineError::InvalidCapacity {
                capacity,
                reason: "the node pool needs room for the root",
            });
        }
        if u32::try_from(capacity).is_err() {
            return Err(EngineError::InvalidCapacity {
                capacity,
                reason: "node handles are 32-bit",
            });
        }

        let nodes = std::iter::repeat_with(|| TrieNode::new(alphabet_size))
            .take(capacity)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            alphabet_size,
            nodes,
            // The root is allocated.
            next_node: CachePadded::new(AtomicUsize::new(1)),
        })
    }

    /// Creates a trie whose pool can hold every string in `strings`.
    pub fn for_strings<I, S>(alphabet_size: usize, strings: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(alphabet_size, Self::required_capacity(strings))
    }

    /// Returns `sum(len(s) + 1)` over `strings`, or 1 when there are none.
    pub fn required_capacity<I, S>(strings: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        strings
            .into_iter()
            .map(|s| s.as_ref().len() + 1)
            .fold(0usize, usize::saturating_add)
            .max(1)
    }

    /// Increments the count of `key`.
    pub fn insert(&self, key: &str) -> Result<(), EngineError> {
        let slots = alphabet_slots(key.as_bytes(), self.alphabet_size)?;

        let mut node = TRIE_ROOT;
        for slot in slots {
            node = self.child_or_insert(node, slot)?;
        }

        self.node(node).count.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Returns how many times `key` has been inserted.
    pub fn count(&self, key: &str) -> Result<u64, EngineError> {
        let slots = alphabet_slots(key.as_bytes(), self.alphabet_size)?;

        let mut node = TRIE_ROOT;
        for slot in slots {
            match self.child(node, slot) {
                NO_CHILD => return Ok(0),
                child => node = child,
            }
        }

        Ok(self.node(node).count.load(Ordering::Acquire))
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Returns the size of the node pool.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of allocated nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.next_node.load(Ordering::Acquire)
    }

    fn node(&self, index: u32) -> &TrieNode {
        &self.nodes[index as usize]
    }

    fn child(&self, node: u32, slot: u8) -> u32 {
        // The guard is dropped at the end of this statement.
        self.node(node).children.lock()[slot as usize]
    }

    fn child_or_insert(&self, node: u32, slot: u8) -> Result<u32, EngineError> {
        let mut children = self.node(node).children.lock();
        let child = &mut children[slot as usize];
        if *child == NO_CHILD {
            *child = self.allocate_node()?;
        }
        Ok(*child)
    }

    fn allocate_node(&self) -> Result<u32, EngineError> {
        let capacity = self.capacity();
        self.next_node
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < capacity).then_some(next + 1)
            })
            // `capacity` fits in u32, so does every index below it.
            .map(|index| index as u32)
            .map_err(|_| EngineError::CapacityExceeded { capacity })
    }
}

impl fmt::Debug for ConcurrentTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentTrie")
            .field("alphabet_size", &self.alphabet_size)
            .field("node_count", &self.node_count())
            .field("capacity", &self.capacity())
            .finish()
    }
}
