use super::{DifferentialRunner, GeneratorConfig, WorkloadGenerator};
use crate::common::{concurrent::constants::MAX_ALPHABET_SIZE, error::HarnessError};

use rand::Rng;

/// Bounds of the randomly parameterized workloads of a [`stress`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StressConfig {
    pub iterations: usize,
    pub seed: u64,
    /// String lengths are drawn from `1..=max_length`.
    pub max_length: usize,
    /// Alphabet sizes are drawn from `1..=max_alphabet_size`, capped at 26.
    pub max_alphabet_size: usize,
    pub max_inserts: usize,
    pub max_queries: usize,
    pub shared_prefix: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: 0,
            max_length: 100,
            max_alphabet_size: 10,
            max_inserts: 1_000,
            max_queries: 1_000,
            shared_prefix: true,
        }
    }
}

/// Runs `config.iterations` differential rounds on random workloads.
///
/// Every round draws its string length, alphabet size, insert count and query
/// count uniformly within the configured bounds. Returns the number of rounds
/// run, or the first error, which ends the stress run.
pub fn stress(config: &StressConfig, runner: &DifferentialRunner) -> Result<usize, HarnessError> {
    let mut generator = WorkloadGenerator::new(config.seed);

    for _round in 0..config.iterations {
        let rng = generator.rng();
        let round_config = GeneratorConfig::new(
            rng.gen_range(1..=config.max_length.max(1)),
            rng.gen_range(1..=config.max_alphabet_size.clamp(1, MAX_ALPHABET_SIZE)),
            rng.gen_range(1..=config.max_inserts.max(1)),
            rng.gen_range(1..=config.max_queries.max(1)),
        )
        .shared_prefix(config.shared_prefix);

        let workload = generator
            .generate(&round_config)
            .map_err(HarnessError::Generator)?;

        #[cfg(feature = "logging")]
        log::debug!("Stress round {_round}: {}", workload.label());

        runner.run(&workload)?;
    }

    #[cfg(feature = "logging")]
    log::info!("Stress run passed {} rounds", config.iterations);

    Ok(config.iterations)
}
