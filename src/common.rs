pub(crate) mod concurrent;
pub(crate) mod error;
pub(crate) mod fingerprint;

use self::concurrent::constants::{ALPHABET_BASE, MAX_ALPHABET_SIZE};
use self::error::EngineError;

pub(crate) fn available_parallelism() -> usize {
    use std::{num::NonZeroUsize, thread::available_parallelism};
    available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
}

pub(crate) fn check_alphabet_size(alphabet_size: usize) -> Result<(), EngineError> {
    if (1..=MAX_ALPHABET_SIZE).contains(&alphabet_size) {
        Ok(())
    } else {
        Err(EngineError::InvalidAlphabet {
            size: alphabet_size,
            max: MAX_ALPHABET_SIZE,
        })
    }
}

/// Maps every byte of `key` to its slot in `0..alphabet_size`, or reports the
/// first byte outside of the alphabet.
pub(crate) fn alphabet_slots(
    key: &[u8],
    alphabet_size: usize,
) -> Result<smallvec::SmallVec<[u8; 64]>, EngineError> {
    key.iter()
        .enumerate()
        .map(|(position, &byte)| {
            let slot = byte.wrapping_sub(ALPHABET_BASE);
            if byte >= ALPHABET_BASE && (slot as usize) < alphabet_size {
                Ok(slot)
            } else {
                Err(EngineError::OutOfAlphabet { byte, position })
            }
        })
        .collect()
}
