use super::Workload;
use crate::common::{
    check_alphabet_size, concurrent::constants::ALPHABET_BASE, error::EngineError,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The shape of a randomly generated workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Length of every generated string.
    pub length: usize,
    /// Characters are drawn from the first `alphabet_size` lowercase letters.
    pub alphabet_size: usize,
    pub num_inserts: usize,
    pub num_queries: usize,
    /// When set, the first half of every string is all `'a'`. All strings
    /// then share one long trie path, and contention concentrates on the
    /// nodes near the root.
    pub shared_prefix: bool,
}

impl GeneratorConfig {
    pub fn new(length: usize, alphabet_size: usize, num_inserts: usize, num_queries: usize) -> Self {
        Self {
            length,
            alphabet_size,
            num_inserts,
            num_queries,
            shared_prefix: false,
        }
    }

    /// Sets the shared-prefix mode.
    pub fn shared_prefix(self, shared_prefix: bool) -> Self {
        Self {
            shared_prefix,
            ..self
        }
    }

    fn prefix_len(&self) -> usize {
        if self.shared_prefix {
            self.length / 2
        } else {
            0
        }
    }

    fn label(&self) -> String {
        let mut label = format!(
            "random strings of length {} over {} letters, {} inserts, {} queries",
            self.length, self.alphabet_size, self.num_inserts, self.num_queries
        );
        if self.shared_prefix {
            label.push_str(&format!(", shared prefix of {}", self.prefix_len()));
        }
        label
    }
}

/// Generates random workloads from an explicit seed.
///
/// Two generators created with the same seed produce the same sequence of
/// workloads.
///
/// # Examples
///
/// ```rust
/// use countset::harness::{GeneratorConfig, WorkloadGenerator};
///
/// let config = GeneratorConfig::new(8, 4, 100, 50).shared_prefix(true);
/// let workload = WorkloadGenerator::new(42).generate(&config).unwrap();
///
/// assert_eq!(workload.inserts().len(), 100);
/// assert_eq!(workload.queries().len(), 50);
/// assert!(workload.inserts().iter().all(|s| s.starts_with("aaaa")));
/// assert_eq!(workload, WorkloadGenerator::new(42).generate(&config).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct WorkloadGenerator {
    rng: ChaCha8Rng,
}

impl WorkloadGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates a workload.
    ///
    /// # Errors
    ///
    /// Fails if `config.alphabet_size` is not in `1..=26`.
    pub fn generate(&mut self, config: &GeneratorConfig) -> Result<Workload, EngineError> {
        check_alphabet_size(config.alphabet_size)?;

        let inserts = self.random_strings(config, config.num_inserts);
        let queries = self.random_strings(config, config.num_queries);
        // Generated strings only hold alphabet letters.
        Ok(Workload::from_parts(config.label(), inserts, queries))
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    fn random_strings(&mut self, config: &GeneratorConfig, count: usize) -> Vec<String> {
        (0..count).map(|_| self.random_string(config)).collect()
    }

    fn random_string(&mut self, config: &GeneratorConfig) -> String {
        let prefix_len = config.prefix_len();
        // `alphabet_size` is at most 26.
        let alphabet = config.alphabet_size as u8;
        (0..config.length)
            .map(|i| {
                let slot = if i < prefix_len {
                    0
                } else {
                    self.rng.gen_range(0..alphabet)
                };
                char::from(ALPHABET_BASE + slot)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{GeneratorConfig, WorkloadGenerator};
    use crate::EngineError;

    #[test]
    fn shape_and_alphabet() {
        let config = GeneratorConfig::new(20, 5, 300, 200);
        let workload = WorkloadGenerator::new(1).generate(&config).unwrap();

        assert_eq!(workload.inserts().len(), 300);
        assert_eq!(workload.queries().len(), 200);
        assert!(workload
            .inserts()
            .iter()
            .chain(workload.queries())
            .all(|s| s.len() == 20 && s.bytes().all(|b| (b'a'..=b'e').contains(&b))));
        // With 300 strings every letter shows up.
        assert_eq!(workload.alphabet_size(), 5);
        assert_eq!(
            workload.label(),
            "random strings of length 20 over 5 letters, 300 inserts, 200 queries"
        );
    }

    #[test]
    fn shared_prefix() {
        let config = GeneratorConfig::new(7, 3, 100, 100).shared_prefix(true);
        let workload = WorkloadGenerator::new(2).generate(&config).unwrap();

        assert!(workload
            .inserts()
            .iter()
            .chain(workload.queries())
            .all(|s| s.starts_with("aaa")));
        // The second half is still random.
        assert!(workload.inserts().iter().any(|s| !s.ends_with("aaaa")));
        assert!(workload.label().ends_with("shared prefix of 3"));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let config = GeneratorConfig::new(10, 26, 50, 50);
        let mut a = WorkloadGenerator::new(7);
        let mut b = WorkloadGenerator::new(7);

        let first = a.generate(&config).unwrap();
        assert_eq!(first, b.generate(&config).unwrap());
        // The generator advances between calls.
        let second = a.generate(&config).unwrap();
        assert_ne!(first, second);
        assert_eq!(second, b.generate(&config).unwrap());

        assert_ne!(first, WorkloadGenerator::new(8).generate(&config).unwrap());
    }

    #[test]
    fn degenerate_shapes() {
        let mut generator = WorkloadGenerator::new(3);

        let workload = generator.generate(&GeneratorConfig::new(0, 1, 3, 1)).unwrap();
        assert!(workload.inserts().iter().all(String::is_empty));

        let workload = generator.generate(&GeneratorConfig::new(4, 1, 2, 0)).unwrap();
        assert_eq!(workload.inserts(), ["aaaa", "aaaa"]);
        assert!(workload.queries().is_empty());

        assert!(matches!(
            generator.generate(&GeneratorConfig::new(4, 0, 1, 1)),
            Err(EngineError::InvalidAlphabet { .. })
        ));
        assert!(generator.generate(&GeneratorConfig::new(4, 27, 1, 1)).is_err());
    }
}
