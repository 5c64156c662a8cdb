use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::UniformRand;
use rand_core::{CryptoRng, RngCore};

use super::qap::{domain_for, witness_map};
use super::{Backend, Proof, ProveOptions, ProvingKey};
use crate::msm::{require_icicle, VariableBaseMSM};
use crate::r1cs::Witness;
use crate::utils::errors::ProvingError;
use crate::utils::profiling::PhaseProfiler;

fn check_key<E: Pairing>(pk: &ProvingKey<E>) -> Result<(), ProvingError> {
    let num_variables = pk.matrices.num_variables();
    let malformed = |what: &str, len: usize, expected: usize| {
        ProvingError::MalformedKey(format!("{what} has {len} elements, expected {expected}"))
    };
    if pk.a_query.len() != num_variables {
        return Err(malformed("a_query", pk.a_query.len(), num_variables));
    }
    if pk.b_g1_query.len() != num_variables {
        return Err(malformed("b_g1_query", pk.b_g1_query.len(), num_variables));
    }
    if pk.b_g2_query.len() != num_variables {
        return Err(malformed("b_g2_query", pk.b_g2_query.len(), num_variables));
    }
    if pk.l_query.len() != pk.matrices.num_witness {
        return Err(malformed("l_query", pk.l_query.len(), pk.matrices.num_witness));
    }
    Ok(())
}

/// Produces a proof that `witness` satisfies the system `pk` was generated
/// for.
///
/// Neither the key nor the witness is modified. Fresh blinding factors are
/// drawn from `rng` on every call, so two proofs of the same statement differ.
#[tracing::instrument(skip_all, name = "Groth16::prove", fields(backend = %options.backend))]
pub fn prove<E, R>(
    pk: &ProvingKey<E>,
    witness: &Witness<E::ScalarField>,
    options: &ProveOptions,
    rng: &mut R,
) -> Result<Proof<E>, ProvingError>
where
    E: Pairing,
    E::G1: VariableBaseMSM,
    R: RngCore + CryptoRng,
{
    let use_icicle = match options.backend {
        Backend::Reference => false,
        Backend::Accelerated => {
            require_icicle()?;
            true
        }
    };
    if witness.digest() != pk.digest {
        return Err(ProvingError::KeyMismatch);
    }
    check_key(pk)?;
    let z = witness.assignment();
    if z.len() != pk.a_query.len() {
        return Err(ProvingError::WitnessLength {
            expected: pk.a_query.len(),
            got: z.len(),
        });
    }

    let profile_span = options
        .profile
        .then(|| tracing::info_span!("profile_window", backend = %options.backend));
    let _profile_guard = profile_span.as_ref().map(|span| span.enter());
    let mut profiler = PhaseProfiler::new(options.profile, "prove");

    let domain = domain_for(&pk.matrices).map_err(|e| ProvingError::MalformedKey(e.to_string()))?;
    let h = witness_map(&pk.matrices, &domain, z)
        .map_err(|e| ProvingError::MalformedKey(e.to_string()))?;
    if h.len() < pk.h_query.len() {
        return Err(ProvingError::MalformedKey(format!(
            "h_query has {} elements for a domain of size {}",
            pk.h_query.len(),
            h.len()
        )));
    }
    profiler.phase("witness_map");

    let r = E::ScalarField::rand(rng);
    let s = E::ScalarField::rand(rng);
    let vk = &pk.vk;
    let num_instance = pk.matrices.num_instance;

    let a_acc = <E::G1 as VariableBaseMSM>::msm(&pk.a_query, None, z, use_icicle)?;
    let g_a = a_acc + vk.alpha_g1 + pk.delta_g1 * r;
    profiler.phase("msm_a");

    let b_g1_acc = <E::G1 as VariableBaseMSM>::msm(&pk.b_g1_query, None, z, use_icicle)?;
    let g1_b = b_g1_acc + pk.beta_g1 + pk.delta_g1 * s;
    // No G2 kernel on the accelerator; this MSM always runs on the CPU.
    let b_g2_acc = <E::G2 as ark_ec::VariableBaseMSM>::msm(&pk.b_g2_query, z).map_err(|_| {
        ProvingError::KeyLength {
            bases: pk.b_g2_query.len(),
            scalars: z.len(),
        }
    })?;
    let g2_b = b_g2_acc + vk.beta_g2 + vk.delta_g2 * s;
    profiler.phase("msm_b");

    let h_acc = <E::G1 as VariableBaseMSM>::msm(
        &pk.h_query,
        None,
        &h[..pk.h_query.len()],
        use_icicle,
    )?;
    let l_acc =
        <E::G1 as VariableBaseMSM>::msm(&pk.l_query, None, &z[num_instance..], use_icicle)?;
    profiler.phase("msm_h_l");

    let g_c = g_a * s + g1_b * r - pk.delta_g1.into_group() * (r * s) + l_acc + h_acc;
    let proof = Proof {
        a: g_a.into_affine(),
        b: g2_b.into_affine(),
        c: g_c.into_affine(),
    };
    profiler.phase("assemble");
    Ok(proof)
}
