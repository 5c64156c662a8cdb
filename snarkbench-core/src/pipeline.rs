//! The five pipeline operations over BN254, with the power-chain circuit.
//!
//! Thin wrappers over [`crate::r1cs`] and [`crate::groth16`] for callers that
//! do not want to name the curve or build assignments by hand.

use ark_bn254::{Bn254, Fr};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, OsRng, RngCore, SeedableRng};

use crate::circuits::PowerChainCircuit;
use crate::groth16::{self, Backend, ProveOptions};
use crate::r1cs::{self, Assignment};
use crate::utils::errors::{
    CompileError, ProvingError, SetupError, VerificationError, WitnessError,
};

pub type ConstraintSystem = r1cs::ConstraintSystem<Fr>;
pub type Witness = r1cs::Witness<Fr>;
pub type ProvingKey = groth16::ProvingKey<Bn254>;
pub type VerificationKey = groth16::VerifyingKey<Bn254>;
pub type PreparedVerificationKey = groth16::PreparedVerifyingKey<Bn254>;
pub type Proof = groth16::Proof<Bn254>;

/// Compiles the power-chain circuit with `2^exponent` multiplications.
pub fn compile(exponent: usize) -> Result<ConstraintSystem, CompileError> {
    r1cs::compile(&PowerChainCircuit::new(exponent))
}

pub fn setup<R: RngCore + CryptoRng>(
    cs: &ConstraintSystem,
    rng: &mut R,
) -> Result<(ProvingKey, VerificationKey), SetupError> {
    groth16::setup(cs, rng)
}

/// [`setup`] with trapdoors drawn from OS entropy.
pub fn setup_from_entropy(
    cs: &ConstraintSystem,
) -> Result<(ProvingKey, VerificationKey), SetupError> {
    groth16::setup_from_entropy(cs)
}

/// Assigns the private `x` and public `y` of a two-input circuit.
pub fn compute_witness(cs: &ConstraintSystem, x: Fr, y: Fr) -> Result<Witness, WitnessError> {
    let inputs = Assignment::new().with("x", x).with("y", y);
    r1cs::compute_witness(cs, &inputs)
}

pub fn prove(pk: &ProvingKey, witness: &Witness, backend: Backend) -> Result<Proof, ProvingError> {
    prove_with(pk, witness, &ProveOptions::new(backend))
}

/// [`prove`] with explicit options, blinding drawn from OS entropy.
pub fn prove_with(
    pk: &ProvingKey,
    witness: &Witness,
    options: &ProveOptions,
) -> Result<Proof, ProvingError> {
    let mut rng =
        ChaCha20Rng::from_rng(OsRng).map_err(|e| ProvingError::Entropy(e.to_string()))?;
    groth16::prove(pk, witness, options, &mut rng)
}

pub fn verify(
    vk: &VerificationKey,
    proof: &Proof,
    public_inputs: &[Fr],
) -> Result<bool, VerificationError> {
    groth16::verify(vk, proof, public_inputs)
}

pub fn prepare_verification_key(vk: &VerificationKey) -> PreparedVerificationKey {
    groth16::prepare_verifying_key(vk)
}

pub fn verify_prepared(
    pvk: &PreparedVerificationKey,
    proof: &Proof,
    public_inputs: &[Fr],
) -> Result<bool, VerificationError> {
    groth16::verify_prepared(pvk, proof, public_inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::reference_pow;

    #[test]
    fn five_operations_end_to_end() {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let cs = compile(4).unwrap();
        assert_eq!(cs.num_constraints(), 17);
        let (pk, vk) = setup(&cs, &mut rng).unwrap();

        let x = Fr::from(42188824287u64);
        let y = reference_pow(x, 16);
        let witness = compute_witness(&cs, x, y).unwrap();
        let proof = prove(&pk, &witness, Backend::Reference).unwrap();
        assert_eq!(verify(&vk, &proof, &[y]), Ok(true));
        assert_eq!(verify(&vk, &proof, &[y + Fr::from(1u64)]), Ok(false));
    }
}
