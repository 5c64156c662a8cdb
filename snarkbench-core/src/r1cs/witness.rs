use std::collections::BTreeMap;

use ark_ff::PrimeField;
use rayon::prelude::*;

use super::key::ConstraintSystem;
use super::ops::{Variable, VariableLayout};
use crate::utils::errors::WitnessError;

/// Values for the declared inputs of a circuit, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment<F: PrimeField>(BTreeMap<String, F>);

impl<F: PrimeField> Assignment<F> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, name: &str, value: F) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: F) {
        self.0.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&F> {
        self.0.get(name)
    }
}

/// A full satisfying assignment `z` of a constraint system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness<F: PrimeField> {
    pub(crate) z: Vec<F>,
    pub(crate) layout: VariableLayout,
    pub(crate) digest: [u8; 32],
}

impl<F: PrimeField> Witness<F> {
    /// Public inputs in declaration order, without the constant wire.
    pub fn public_inputs(&self) -> &[F] {
        &self.z[1..self.layout.num_instance()]
    }

    /// The instance part `[1, public..]` followed by the witness part.
    pub fn assignment(&self) -> &[F] {
        &self.z
    }

    pub fn instance(&self) -> &[F] {
        &self.z[..self.layout.num_instance()]
    }

    pub fn private(&self) -> &[F] {
        &self.z[self.layout.num_instance()..]
    }

    pub fn value(&self, var: Variable) -> F {
        self.z[self.layout.column(var)]
    }

    pub fn num_variables(&self) -> usize {
        self.z.len()
    }

    /// Digest of the constraint system this witness was computed for.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }
}

/// Fills every wire of `cs` from `inputs` and checks the result.
///
/// Returns [`WitnessError::UnsatisfiedConstraint`] naming the first violated
/// constraint; such an assignment never reaches the prover.
#[tracing::instrument(skip_all, name = "compute_witness")]
pub fn compute_witness<F: PrimeField>(
    cs: &ConstraintSystem<F>,
    inputs: &Assignment<F>,
) -> Result<Witness<F>, WitnessError> {
    if let Some(unknown) = inputs
        .0
        .keys()
        .find(|name| !cs.public_names.contains(name) && !cs.private_names.contains(name))
    {
        return Err(WitnessError::UnknownInput(unknown.clone()));
    }

    let layout = cs.layout;
    let mut z = vec![F::zero(); layout.num_variables()];
    z[0] = F::one();

    let declared = cs
        .public_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name, Variable::Public(i)))
        .chain(
            cs.private_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name, Variable::Private(i))),
        );
    for (name, var) in declared {
        let value = inputs
            .get(name)
            .ok_or_else(|| WitnessError::MissingAssignment(name.clone()))?;
        z[layout.column(var)] = *value;
    }

    // Hints only read wires assigned before them.
    for hint in &cs.hints {
        let value = hint.a.evaluate(&layout, &z) * hint.b.evaluate(&layout, &z);
        z[layout.column(hint.out)] = value;
    }

    if let Some(index) = cs.constraints.par_iter().position_first(|constraint| {
        constraint.a.evaluate(&layout, &z) * constraint.b.evaluate(&layout, &z)
            != constraint.c.evaluate(&layout, &z)
    }) {
        tracing::debug!(index, "assignment violates constraint");
        return Err(WitnessError::UnsatisfiedConstraint { index });
    }

    Ok(Witness {
        z,
        layout,
        digest: cs.digest,
    })
}
