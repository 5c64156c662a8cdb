//! Groth16 over a pairing-friendly curve, keyed to a compiled
//! [`ConstraintSystem`](crate::r1cs::ConstraintSystem).

use ark_ec::pairing::{Pairing, PairingOutput};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::r1cs::R1CSMatrices;
use crate::utils::errors::VerificationError;

pub mod prover;
pub mod qap;
pub mod setup;
pub mod verifier;


pub use prover::prove;
pub use setup::{setup, setup_from_entropy};
pub use verifier::{prepare_verifying_key, verify, verify_prepared};

/// Where the prover runs its G1 multi-scalar multiplications.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    clap::ValueEnum,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum Backend {
    /// Portable CPU implementation.
    #[strum(serialize = "reference")]
    Reference,
    /// ICICLE on a CUDA device. Requires the `icicle` feature.
    #[strum(serialize = "accelerated")]
    Accelerated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProveOptions {
    pub backend: Backend,
    /// Log per-phase timings and memory usage for this call.
    pub profile: bool,
}

impl ProveOptions {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            profile: false,
        }
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }
}

impl Default for ProveOptions {
    fn default() -> Self {
        Self::new(Backend::Reference)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<E: Pairing> {
    pub a: E::G1Affine,
    pub b: E::G2Affine,
    pub c: E::G1Affine,
}

impl<E: Pairing> Proof<E> {
    /// Decodes a compressed proof, rejecting points off the curve or outside
    /// the prime-order subgroup.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerificationError> {
        Self::deserialize_compressed(bytes)
            .map_err(|e| VerificationError::MalformedProof(e.to_string()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        // Serializing into a Vec cannot fail.
        let _ = self.serialize_compressed(&mut bytes);
        bytes
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifyingKey<E: Pairing> {
    pub alpha_g1: E::G1Affine,
    pub beta_g2: E::G2Affine,
    pub gamma_g2: E::G2Affine,
    pub delta_g2: E::G2Affine,
    /// `gamma^-1 (beta u_i(tau) + alpha v_i(tau) + w_i(tau)) G1` for every
    /// instance column, the constant wire first.
    pub gamma_abc_g1: Vec<E::G1Affine>,
}

impl<E: Pairing> VerifyingKey<E> {
    pub fn num_public_inputs(&self) -> usize {
        self.gamma_abc_g1.len().saturating_sub(1)
    }
}

/// Verifying key with the pairing-side precomputation done once.
#[derive(Clone, Debug)]
pub struct PreparedVerifyingKey<E: Pairing> {
    pub vk: VerifyingKey<E>,
    pub alpha_g1_beta_g2: PairingOutput<E>,
    pub gamma_g2_neg_pc: E::G2Prepared,
    pub delta_g2_neg_pc: E::G2Prepared,
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ProvingKey<E: Pairing> {
    pub vk: VerifyingKey<E>,
    pub beta_g1: E::G1Affine,
    pub delta_g1: E::G1Affine,
    /// One element per variable column.
    pub a_query: Vec<E::G1Affine>,
    pub b_g1_query: Vec<E::G1Affine>,
    pub b_g2_query: Vec<E::G2Affine>,
    /// `tau^i Z(tau) / delta` for `i < domain_size - 1`.
    pub h_query: Vec<E::G1Affine>,
    /// One element per witness column.
    pub l_query: Vec<E::G1Affine>,
    pub matrices: R1CSMatrices<E::ScalarField>,
    /// Shape digest of the constraint system the key was generated for.
    pub digest: [u8; 32],
}

impl<E: Pairing> ProvingKey<E> {
    pub fn verifying_key(&self) -> &VerifyingKey<E> {
        &self.vk
    }

    pub fn num_variables(&self) -> usize {
        self.a_query.len()
    }
}
