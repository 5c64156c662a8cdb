//! Glue over the arkworks BN254 scalar field.
//!
//! All arithmetic is delegated to `ark-ff`; this module only adds the
//! conversions and reference computations the benchmark needs.

use ark_ff::{Field, PrimeField};
use num::{BigUint, Num};
use rand_core::RngCore;

pub use ark_bn254::Fr;

/// Decimal modulus of the BN254 scalar field.
pub const BN254_SCALAR_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Multiplier used by the benchmark when no `x` is supplied.
pub const DEFAULT_FACTOR: u64 = 42188824287;

/// Computes `base^size` by `size` sequential multiplications.
///
/// This mirrors the work the power-chain circuit encodes and is used as the
/// independent reference for the public output.
#[tracing::instrument(skip_all, fields(size = size))]
pub fn reference_pow<F: Field>(base: F, size: usize) -> F {
    let mut acc = F::one();
    for _ in 0..size {
        acc *= base;
    }
    acc
}

/// Square-and-multiply exponentiation, for cross-checking `reference_pow`.
pub fn fast_pow<F: Field>(base: F, exponent: u64) -> F {
    base.pow([exponent])
}

/// Parses a decimal integer of arbitrary size and reduces it modulo `p`.
pub fn from_decimal<F: PrimeField>(value: &str) -> Option<F> {
    let value = BigUint::from_str_radix(value.trim(), 10).ok()?;
    Some(F::from_le_bytes_mod_order(&value.to_bytes_le()))
}

pub fn to_decimal<F: PrimeField>(value: &F) -> String {
    let bigint: BigUint = value.into_bigint().into();
    bigint.to_str_radix(10)
}

/// Samples a uniformly random non-zero field element.
pub fn random_nonzero<F: Field, R: RngCore>(rng: &mut R) -> F {
    loop {
        let value = F::rand(rng);
        if !value.is_zero() {
            return value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, UniformRand, Zero};
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn modulus_matches_arkworks() {
        let modulus: BigUint = Fr::MODULUS.into();
        assert_eq!(modulus.to_str_radix(10), BN254_SCALAR_MODULUS);
        assert_eq!(from_decimal::<Fr>(BN254_SCALAR_MODULUS), Some(Fr::zero()));
    }

    #[test]
    fn reference_pow_small_values() {
        assert_eq!(reference_pow(Fr::from(3u64), 4), Fr::from(81u64));
        assert_eq!(reference_pow(Fr::from(7u64), 0), Fr::one());
        assert_eq!(reference_pow(Fr::zero(), 5), Fr::zero());
    }

    #[test]
    fn reference_pow_agrees_with_square_and_multiply() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for size in [1usize, 2, 16, 1000, 1 << 12] {
            let x = Fr::rand(&mut rng);
            assert_eq!(reference_pow(x, size), fast_pow(x, size as u64));
        }
    }

    #[test]
    fn decimal_round_trip_reduces_mod_p() {
        let factor = from_decimal::<Fr>("42188824287").unwrap();
        assert_eq!(factor, Fr::from(DEFAULT_FACTOR));
        assert_eq!(to_decimal(&factor), "42188824287");

        let p_plus_two = "21888242871839275222246405745257275088548364400416034343698204186575808495619";
        assert_eq!(from_decimal::<Fr>(p_plus_two), Some(Fr::from(2u64)));
        assert_eq!(from_decimal::<Fr>("not a number"), None);
    }

    #[test]
    fn random_nonzero_is_nonzero() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for _ in 0..32 {
            assert!(!random_nonzero::<Fr, _>(&mut rng).is_zero());
        }
    }
}
