use gf256::gf256;
use rand::{CryptoRng, RngCore};
use std::collections::BTreeSet;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{MAX_SHARES, MIN_THRESHOLD};
use crate::error::{Result, TssError};
use crate::field;
use crate::secret::Secret;
use crate::share::{Share, ShareSet, SharingParams};

/// Represents a polynomial over the Galois field GF(2^8).
///
/// Coefficients are stored as raw bytes, lowest degree first, so they can be
/// wiped when the polynomial goes out of scope. The constant term is the
/// secret byte.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Polynomial {
    coefficients: Vec<u8>,
}

impl Polynomial {
    /// Constructs a new polynomial of a given degree with random coefficients,
    /// where the constant term is the provided secret.
    ///
    /// # Arguments
    ///
    /// * `degree` - The degree of the polynomial.
    /// * `secret` - The secret (constant term) of the polynomial.
    /// * `rng` - A cryptographically secure source for the other coefficients.
    pub fn random<R: RngCore + CryptoRng>(degree: usize, secret: u8, rng: &mut R) -> Self {
        let mut coefficients = vec![0u8; degree + 1];
        rng.fill_bytes(&mut coefficients[1..]);
        coefficients[0] = secret;

        Polynomial { coefficients }
    }

    /// Builds a polynomial from explicit coefficients, lowest degree first.
    pub fn from_coefficients(coefficients: Vec<u8>) -> Self {
        Polynomial { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluates the polynomial at a given point (Horner's rule).
    pub fn evaluate(&self, x: gf256) -> gf256 {
        self.coefficients
            .iter()
            .rev()
            .fold(gf256::new(0), |acc, &c| field::add(field::mul(acc, x), gf256::new(c)))
    }
}

fn check_threshold(threshold: usize, total: usize) -> Result<()> {
    if threshold < MIN_THRESHOLD || threshold > total || total > MAX_SHARES {
        return Err(TssError::InvalidThreshold { threshold, total });
    }
    Ok(())
}

/// Splits a secret into `total` shares, any `threshold` of which rebuild it.
///
/// Uses the thread-local CSPRNG for the polynomial coefficients.
///
/// # Errors
/// * [`TssError::InvalidThreshold`] unless `2 <= threshold <= total <= 255`.
/// * [`TssError::SecretLengthMismatch`] if the secret is empty.
///
/// # Examples
/// ```rust
/// use shard_tss::sss::split_secret;
///
/// let set = split_secret(b"hello world", 3, 5).unwrap();
/// assert_eq!(set.len(), 5);
/// ```
pub fn split_secret(secret: &[u8], threshold: usize, total: usize) -> Result<ShareSet> {
    split_secret_with_rng(secret, threshold, total, &mut rand::thread_rng())
}

/// Same as [`split_secret`] with a caller-supplied random source.
pub fn split_secret_with_rng<R: RngCore + CryptoRng>(
    secret: &[u8],
    threshold: usize,
    total: usize,
    rng: &mut R,
) -> Result<ShareSet> {
    check_threshold(threshold, total)?;
    if secret.is_empty() {
        return Err(TssError::SecretLengthMismatch {
            expected: 1,
            actual: 0,
        });
    }

    let mut values: Vec<Vec<u8>> = vec![Vec::with_capacity(secret.len()); total];

    for &byte in secret {
        let poly = Polynomial::random(threshold - 1, byte, rng);

        for (i, value) in values.iter_mut().enumerate() {
            let x = gf256::new((i + 1) as u8);
            value.push(poly.evaluate(x).into());
        }
    }

    let shares = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| Share::new((i + 1) as u32, value))
        .collect();

    debug!(threshold, total, len = secret.len(), "split secret");
    Ok(ShareSet::new(SharingParams::new(threshold, total), shares))
}

/// Checks a set of shares before interpolation and returns their x coordinates.
fn validate_shares(shares: &[Share], threshold: usize) -> Result<Vec<gf256>> {
    if threshold < MIN_THRESHOLD || threshold > MAX_SHARES {
        return Err(TssError::InvalidThreshold {
            threshold,
            total: shares.len(),
        });
    }

    let xs = shares
        .iter()
        .map(|s| field::element_for_index(s.index()))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = BTreeSet::new();
    for share in shares {
        if !seen.insert(share.index()) {
            return Err(TssError::DuplicateShare {
                index: share.index(),
            });
        }
    }

    if shares.len() < threshold {
        return Err(TssError::InsufficientShares {
            required: threshold,
            provided: shares.len(),
        });
    }

    let len = shares[0].value().len();
    if len == 0 || shares.iter().any(|s| s.value().len() != len) {
        return Err(TssError::malformed("share values differ in length or are empty"));
    }

    Ok(xs)
}

/// Combines shares to reconstruct a secret.
///
/// Every supplied share takes part in the interpolation. No integrity check is
/// made on the result: a corrupted share yields a wrong secret, which the
/// payload cipher then rejects.
///
/// # Errors
/// * [`TssError::FieldViolation`] for an index of zero or above 255.
/// * [`TssError::DuplicateShare`] when an index repeats.
/// * [`TssError::InsufficientShares`] with fewer than `threshold` shares.
///
/// # Examples
/// ```rust
/// use shard_tss::sss::{combine_shares, split_secret};
///
/// let set = split_secret(b"hello world", 2, 3).unwrap();
/// let secret = combine_shares(&set.shares()[1..], 2).unwrap();
/// assert_eq!(secret.expose(), b"hello world");
/// ```
pub fn combine_shares(shares: &[Share], threshold: usize) -> Result<Secret> {
    let xs = validate_shares(shares, threshold)?;
    let weights = lagrange_weights(&xs, gf256::new(0))?;

    let len = shares[0].value().len();
    let mut secret = vec![0u8; len];

    for (i, byte) in secret.iter_mut().enumerate() {
        let value = shares
            .iter()
            .zip(&weights)
            .fold(gf256::new(0), |acc, (share, &w)| {
                field::add(acc, field::mul(w, gf256::new(share.value()[i])))
            });
        *byte = value.into();
    }

    debug!(threshold, provided = shares.len(), "combined shares");
    Ok(Secret::from_bytes(secret))
}

/// Lagrange basis weights for evaluating at `at`:
/// `w_i = prod_{j != i} (at - x_j) / (x_i - x_j)`.
///
/// The weights depend only on the indices, so they are computed once and
/// reused for every byte of the secret.
fn lagrange_weights(xs: &[gf256], at: gf256) -> Result<Vec<gf256>> {
    xs.iter()
        .enumerate()
        .map(|(i, &a_x)| {
            let mut weight = gf256::new(1);
            for (j, &b_x) in xs.iter().enumerate() {
                if i != j {
                    let top = field::sub(at, b_x);
                    let bottom = field::sub(a_x, b_x);
                    weight = field::mul(weight, field::div(top, bottom)?);
                }
            }
            Ok(weight)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::IteratorRandom;
    use rand::SeedableRng;
    use std::collections::HashSet;

    use super::*;

    fn interpolate(points: &[(gf256, gf256)], x: gf256) -> gf256 {
        let xs: Vec<gf256> = points.iter().map(|&(x, _)| x).collect();
        lagrange_weights(&xs, x)
            .unwrap()
            .into_iter()
            .zip(points)
            .fold(gf256::new(0), |acc, (w, &(_, y))| field::add(acc, field::mul(w, y)))
    }

    #[test]
    fn test_split_and_combine_secret() {
        let secret = "test secret";
        let threshold = 3;
        let total_shares = 5;

        let set = split_secret(secret.as_bytes(), threshold, total_shares).unwrap();
        let recovered = combine_shares(set.shares(), threshold).unwrap();

        assert_eq!(secret.as_bytes(), recovered.expose());
    }

    #[test]
    fn test_every_k_subset_reconstructs() {
        let secret = b"Remember what the dormouse said.";

        for total in 2..=6 {
            for threshold in 2..=total {
                let set = split_secret(secret, threshold, total).unwrap();
                for subset in set.shares().iter().cloned().combinations(threshold) {
                    let recovered = combine_shares(&subset, threshold).unwrap();
                    assert_eq!(recovered.expose(), secret, "k={threshold} n={total}");
                }
            }
        }
    }

    #[test]
    fn test_share_subset_combination() {
        let secret = "subset test";
        let threshold = 3;
        let total_shares = 5;

        let set = split_secret(secret.as_bytes(), threshold, total_shares).unwrap();
        let mut rng = rand::thread_rng();
        let subset: Vec<Share> = set
            .shares()
            .iter()
            .cloned()
            .choose_multiple(&mut rng, threshold);

        let recovered = combine_shares(&subset, threshold).unwrap();
        assert_eq!(secret.as_bytes(), recovered.expose());
    }

    #[test]
    fn test_more_than_threshold_shares() {
        let secret = b"all shares";
        let set = split_secret(secret, 2, 5).unwrap();
        let recovered = combine_shares(set.shares(), 2).unwrap();
        assert_eq!(recovered.expose(), secret);
    }

    #[test]
    fn test_invalid_threshold_and_share_count() {
        let secret = "invalid params";
        for (k, n) in [(0, 5), (1, 5), (6, 5), (2, 256)] {
            assert!(matches!(
                split_secret(secret.as_bytes(), k, n),
                Err(TssError::InvalidThreshold { .. })
            ));
        }
        assert!(split_secret(secret.as_bytes(), 255, 255).is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            split_secret(b"", 2, 3),
            Err(TssError::SecretLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_share_uniqueness() {
        let set = split_secret(b"unique shares", 3, 5).unwrap();
        let indices: HashSet<u32> = set.shares().iter().map(Share::index).collect();
        assert_eq!(indices.len(), 5);
        assert_eq!(set.params(), SharingParams::new(3, 5));
        assert!(set.shares().iter().all(|s| s.value().len() == 13));
    }

    #[test]
    fn test_should_fail_with_shares_below_threshold() {
        let secret = b"Remember what the dormouse said.";
        let threshold = 12;
        let set = split_secret(secret, threshold, 30).unwrap();

        let subset = &set.shares()[..threshold - 1];
        assert!(matches!(
            combine_shares(subset, threshold),
            Err(TssError::InsufficientShares {
                required: 12,
                provided: 11
            })
        ));
    }

    #[test]
    fn test_duplicate_index_rejected_even_with_enough_shares() {
        let set = split_secret(b"dup", 2, 3).unwrap();
        let s = set.shares();
        let shares = vec![s[0].clone(), s[0].clone(), s[1].clone()];
        assert!(matches!(
            combine_shares(&shares, 2),
            Err(TssError::DuplicateShare { index: 1 })
        ));
    }

    #[test]
    fn test_conflicting_values_same_index_rejected() {
        let shares = vec![Share::new(1, vec![7]), Share::new(1, vec![9])];
        assert!(matches!(
            combine_shares(&shares, 2),
            Err(TssError::DuplicateShare { index: 1 })
        ));
    }

    #[test]
    fn test_out_of_field_indices_rejected() {
        let good = Share::new(1, vec![1]);
        for bad in [0u32, 256, 1000] {
            let shares = vec![good.clone(), Share::new(bad, vec![2])];
            assert!(matches!(
                combine_shares(&shares, 2),
                Err(TssError::FieldViolation { index }) if index == bad
            ));
        }
    }

    #[test]
    fn test_mismatched_value_lengths_rejected() {
        let shares = vec![Share::new(1, vec![1, 2]), Share::new(2, vec![3])];
        assert!(matches!(
            combine_shares(&shares, 2),
            Err(TssError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_corrupted_share_changes_secret() {
        let secret = b"corruption";
        let set = split_secret(secret, 2, 3).unwrap();
        let mut value = set.shares()[0].value().to_vec();
        value[0] ^= 0x01;
        let shares = vec![Share::new(1, value), set.shares()[1].clone()];

        let recovered = combine_shares(&shares, 2).unwrap();
        assert_ne!(recovered.expose(), secret);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = split_secret_with_rng(b"seed", 3, 4, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = split_secret_with_rng(b"seed", 3, 4, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_share_is_independent_of_secret() {
        // With threshold 2 a share byte is s + c*x. For a fixed nonzero x,
        // c -> s + c*x is a bijection, so every share byte is equally likely
        // whatever the secret is.
        for x in [1u8, 2, 200, 255] {
            for s in [0u8, 1, 0x80, 0xff] {
                let seen: HashSet<u8> = (0..=255u8)
                    .map(|c| u8::from(Polynomial::from_coefficients(vec![s, c]).evaluate(gf256::new(x))))
                    .collect();
                assert_eq!(seen.len(), 256);
            }
        }
    }

    #[test]
    fn test_k_minus_one_shares_fit_any_secret() {
        // Two shares of a 3-of-n sharing are consistent with every candidate
        // secret: adding (0, candidate) always yields a degree-2 polynomial
        // passing through both shares.
        let set = split_secret(&[0x5a], 3, 5).unwrap();
        let s = set.shares();
        let p1 = (gf256::new(s[0].index() as u8), gf256::new(s[0].value()[0]));
        let p2 = (gf256::new(s[1].index() as u8), gf256::new(s[1].value()[0]));

        for candidate in 0..=255u8 {
            let points = [(gf256::new(0), gf256::new(candidate)), p1, p2];
            assert_eq!(interpolate(&points, p1.0), p1.1);
            assert_eq!(interpolate(&points, p2.0), p2.1);
            assert_eq!(interpolate(&points, gf256::new(0)), gf256::new(candidate));
        }
    }

    #[test]
    fn test_polynomial_evaluate() {
        // p(x) = 3 + 2x over GF(2^8): p(1) = 3 ^ 2 = 1.
        let poly = Polynomial::from_coefficients(vec![3, 2]);
        assert_eq!(poly.degree(), 1);
        assert_eq!(poly.evaluate(gf256::new(0)), gf256::new(3));
        assert_eq!(poly.evaluate(gf256::new(1)), gf256::new(1));
    }

    proptest! {
        #[test]
        fn prop_threshold_subset_reconstructs(
            secret in proptest::collection::vec(any::<u8>(), 1..48),
            total in 2usize..10,
            k_offset in 0usize..8,
            seed in any::<u64>(),
        ) {
            let threshold = 2 + k_offset % (total - 1);
            let mut rng = StdRng::seed_from_u64(seed);
            let set = split_secret_with_rng(&secret, threshold, total, &mut rng).unwrap();

            let subset: Vec<Share> = set
                .shares()
                .iter()
                .cloned()
                .choose_multiple(&mut rng, threshold);
            let recovered = combine_shares(&subset, threshold).unwrap();
            prop_assert_eq!(recovered.expose(), &secret[..]);

            let short = &subset[..threshold - 1];
            let is_insufficient = matches!(
                combine_shares(short, threshold),
                Err(TssError::InsufficientShares { .. })
            );
            prop_assert!(is_insufficient);
        }
    }
}
