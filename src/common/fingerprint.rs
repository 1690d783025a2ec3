use super::concurrent::constants::{FINGERPRINT_M1, FINGERPRINT_M2, FINGERPRINT_P1, FINGERPRINT_P2};

/// Returns the 64-bit fingerprint of `key`.
///
/// The fingerprint combines two independent polynomial hashes,
/// `h1 mod 1_000_000_007` (base 259) and `h2 mod 1_000_000_009` (base 133123),
/// into `h1 * 1_000_000_009 + h2`. Every byte `c` contributes `c + 1`, so a
/// leading zero byte still changes the result.
///
/// Distinct keys may share a fingerprint. The hash table treats them as the same
/// key; the probability is negligible for the workloads this crate targets.
///
/// # Examples
///
/// ```rust
/// use countset::fingerprint;
///
/// assert_eq!(fingerprint("a"), 98_000_000_980);
/// assert_eq!(fingerprint(""), 0);
/// ```
pub fn fingerprint(key: impl AsRef<[u8]>) -> u64 {
    let key = key.as_ref();
    let h1 = poly_hash(key, FINGERPRINT_M1, FINGERPRINT_P1);
    let h2 = poly_hash(key, FINGERPRINT_M2, FINGERPRINT_P2);
    // h1 < 2^30 and M2 < 2^30, so this cannot overflow.
    h1 * FINGERPRINT_M2 + h2
}

fn poly_hash(key: &[u8], modulus: u64, base: u64) -> u64 {
    key.iter()
        .fold(0, |h, &c| (h * base + u64::from(c) + 1) % modulus)
}
