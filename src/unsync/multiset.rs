use std::collections::BTreeMap;

/// A multiset of strings that is _not_ thread-safe.
///
/// `ReferenceMultiset` stores the insertion count of every string in a
/// [`BTreeMap`][std-btreemap]. It accepts any string, has no capacity bound and is
/// correct by construction, which makes it the ground truth the concurrent
/// engines are compared against.
///
/// [std-btreemap]: https://doc.rust-lang.org/std/collections/struct.BTreeMap.html
///
/// # Examples
///
/// ```rust
/// use countset::unsync::ReferenceMultiset;
///
/// let mut set = ReferenceMultiset::new();
/// set.insert("abc");
/// set.insert("abc");
///
/// assert_eq!(set.count("abc"), 2);
/// assert_eq!(set.count("abd"), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReferenceMultiset {
    counts: BTreeMap<String, u64>,
    total: u64,
}

impl ReferenceMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of `key`.
    pub fn insert(&mut self, key: &str) {
        // Avoid allocating a new `String` for keys that are already present.
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
            }
        }
        self.total += 1;
    }

    /// Returns how many times `key` has been inserted.
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or_default()
    }

    /// Returns the number of distinct strings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the number of inserts, counting duplicates.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Iterates over the distinct strings and their counts in lexicographic
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<'a> Extend<&'a str> for ReferenceMultiset {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a> FromIterator<&'a str> for ReferenceMultiset {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
