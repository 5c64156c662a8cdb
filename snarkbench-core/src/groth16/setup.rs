use ark_ec::{pairing::Pairing, PrimeGroup, ScalarMul};
use ark_ff::{Field, PrimeField};
use ark_poly::EvaluationDomain;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, OsRng, RngCore, SeedableRng};
use rayon::prelude::*;

use super::qap::{domain_for, evaluate_at};
use super::{ProvingKey, VerifyingKey};
use crate::field::random_nonzero;
use crate::r1cs::ConstraintSystem;
use crate::utils::errors::SetupError;

/// Toxic waste of one setup. Dropped as soon as the keys exist.
struct Trapdoor<F: PrimeField> {
    tau: F,
    alpha: F,
    beta: F,
    gamma: F,
    delta: F,
}

impl<F: PrimeField> Trapdoor<F> {
    fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            tau: random_nonzero(rng),
            alpha: random_nonzero(rng),
            beta: random_nonzero(rng),
            gamma: random_nonzero(rng),
            delta: random_nonzero(rng),
        }
    }
}

/// Circuit-specific trusted setup.
///
/// Every call samples fresh trapdoors, so two setups over the same system
/// give key pairs whose proofs do not verify under each other.
#[tracing::instrument(skip_all, name = "Groth16::setup", fields(circuit = %cs.name()))]
pub fn setup<E: Pairing, R: RngCore + CryptoRng>(
    cs: &ConstraintSystem<E::ScalarField>,
    rng: &mut R,
) -> Result<(ProvingKey<E>, VerifyingKey<E>), SetupError> {
    if cs.num_constraints() == 0 {
        return Err(SetupError::EmptyConstraintSystem);
    }
    cs.validate()
        .map_err(|(constraint, variable)| SetupError::DanglingVariable {
            constraint,
            variable,
            num_variables: cs.num_variables(),
        })?;

    let matrices = cs.to_matrices();
    let domain = domain_for(&matrices)?;
    let Trapdoor {
        tau,
        alpha,
        beta,
        gamma,
        delta,
    } = Trapdoor::sample(rng);

    let qap = evaluate_at(&matrices, &domain, tau);
    // Both are non-zero when sampled.
    let gamma_inverse = gamma.inverse().ok_or(SetupError::Entropy("gamma is zero".into()))?;
    let delta_inverse = delta.inverse().ok_or(SetupError::Entropy("delta is zero".into()))?;

    let num_instance = matrices.num_instance;
    let combined: Vec<E::ScalarField> = qap
        .a
        .par_iter()
        .zip(qap.b.par_iter())
        .zip(qap.c.par_iter())
        .map(|((a, b), c)| beta * a + alpha * b + c)
        .collect();
    let gamma_abc: Vec<_> = combined[..num_instance]
        .iter()
        .map(|x| *x * gamma_inverse)
        .collect();
    let l: Vec<_> = combined[num_instance..]
        .par_iter()
        .map(|x| *x * delta_inverse)
        .collect();

    let h_scalars = {
        let zt_over_delta = qap.zt * delta_inverse;
        let mut powers = Vec::with_capacity(domain.size() - 1);
        let mut cur = zt_over_delta;
        for _ in 0..domain.size() - 1 {
            powers.push(cur);
            cur *= tau;
        }
        powers
    };

    let g1 = E::G1::generator();
    let g2 = E::G2::generator();

    let span = tracing::span!(tracing::Level::INFO, "fixed_base_msm");
    let _guard = span.enter();
    let a_query = g1.batch_mul(&qap.a);
    let b_g1_query = g1.batch_mul(&qap.b);
    let b_g2_query = g2.batch_mul(&qap.b);
    let h_query = g1.batch_mul(&h_scalars);
    let l_query = g1.batch_mul(&l);
    let gamma_abc_g1 = g1.batch_mul(&gamma_abc);
    drop(_guard);
    drop(span);

    let vk = VerifyingKey::<E> {
        alpha_g1: (g1 * alpha).into(),
        beta_g2: (g2 * beta).into(),
        gamma_g2: (g2 * gamma).into(),
        delta_g2: (g2 * delta).into(),
        gamma_abc_g1,
    };
    let pk = ProvingKey {
        vk: vk.clone(),
        beta_g1: (g1 * beta).into(),
        delta_g1: (g1 * delta).into(),
        a_query,
        b_g1_query,
        b_g2_query,
        h_query,
        l_query,
        matrices,
        digest: cs.digest(),
    };
    tracing::debug!(
        domain_size = domain.size(),
        h_query = pk.h_query.len(),
        "setup complete"
    );
    Ok((pk, vk))
}

/// [`setup`] with a ChaCha20 generator seeded from the operating system.
pub fn setup_from_entropy<E: Pairing>(
    cs: &ConstraintSystem<E::ScalarField>,
) -> Result<(ProvingKey<E>, VerifyingKey<E>), SetupError> {
    let mut rng =
        ChaCha20Rng::from_rng(OsRng).map_err(|e| SetupError::Entropy(e.to_string()))?;
    setup(cs, &mut rng)
}
