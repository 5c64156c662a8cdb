use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_serialize::Valid;

use super::{PreparedVerifyingKey, Proof, VerifyingKey};
use crate::utils::errors::VerificationError;

pub fn prepare_verifying_key<E: Pairing>(vk: &VerifyingKey<E>) -> PreparedVerifyingKey<E> {
    PreparedVerifyingKey {
        vk: vk.clone(),
        alpha_g1_beta_g2: E::pairing(vk.alpha_g1, vk.beta_g2),
        gamma_g2_neg_pc: (-vk.gamma_g2.into_group()).into_affine().into(),
        delta_g2_neg_pc: (-vk.delta_g2.into_group()).into_affine().into(),
    }
}

/// `gamma_abc[0] + sum_i inputs[i] * gamma_abc[i + 1]`.
fn prepare_inputs<E: Pairing>(
    vk: &VerifyingKey<E>,
    public_inputs: &[E::ScalarField],
) -> Result<E::G1, VerificationError> {
    let Some((constant, bases)) = vk.gamma_abc_g1.split_first() else {
        return Err(VerificationError::MalformedKey(
            "no commitment for the constant wire".to_string(),
        ));
    };
    if bases.len() != public_inputs.len() {
        return Err(VerificationError::PublicInputMismatch {
            expected: bases.len(),
            got: public_inputs.len(),
        });
    }
    let acc = E::G1::msm(bases, public_inputs).map_err(|_| {
        VerificationError::PublicInputMismatch {
            expected: bases.len(),
            got: public_inputs.len(),
        }
    })?;
    Ok(acc + constant.into_group())
}

/// Checks `e(A, B) = e(alpha, beta) e(IC, gamma) e(C, delta)`.
///
/// Costs three Miller loops and one final exponentiation whatever the size
/// of the circuit.
#[tracing::instrument(skip_all, name = "Groth16::verify")]
pub fn verify_prepared<E: Pairing>(
    pvk: &PreparedVerifyingKey<E>,
    proof: &Proof<E>,
    public_inputs: &[E::ScalarField],
) -> Result<bool, VerificationError> {
    proof
        .check()
        .map_err(|e| VerificationError::MalformedProof(e.to_string()))?;
    let prepared_inputs = prepare_inputs(&pvk.vk, public_inputs)?;

    let miller_loop = E::multi_miller_loop(
        [proof.a, prepared_inputs.into_affine(), proof.c],
        [
            E::G2Prepared::from(proof.b),
            pvk.gamma_g2_neg_pc.clone(),
            pvk.delta_g2_neg_pc.clone(),
        ],
    );
    Ok(E::final_exponentiation(miller_loop).is_some_and(|out| out == pvk.alpha_g1_beta_g2))
}

pub fn verify<E: Pairing>(
    vk: &VerifyingKey<E>,
    proof: &Proof<E>,
    public_inputs: &[E::ScalarField],
) -> Result<bool, VerificationError> {
    verify_prepared(&prepare_verifying_key(vk), proof, public_inputs)
}
