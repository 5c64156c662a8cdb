//! Benchmark circuits.
//!
//! A circuit only describes its constraints; compiling it into a
//! [`ConstraintSystem`](crate::r1cs::ConstraintSystem) is left to
//! [`compile`](crate::r1cs::compile).

use ark_ff::PrimeField;

use crate::r1cs::R1CSBuilder;
use crate::utils::errors::CompileError;

mod cubic;
mod power_chain;

pub use cubic::CubicCircuit;
pub use power_chain::{PowerChainCircuit, DEFAULT_EXPONENT};

pub trait Circuit<F: PrimeField>: Sync {
    /// Name folded into the shape digest of the compiled system.
    fn name(&self) -> String;

    fn emit_constraints(&self, builder: &mut R1CSBuilder<F>) -> Result<(), CompileError>;

    /// Expected number of constraints, used to presize the builder.
    fn constraint_hint(&self) -> usize {
        0
    }
}
