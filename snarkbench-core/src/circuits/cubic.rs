use ark_ff::PrimeField;

use super::Circuit;
use crate::r1cs::R1CSBuilder;
use crate::utils::errors::CompileError;

/// `x^3 + x + 5 == y`, with `x` private and `y` public.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CubicCircuit;

impl<F: PrimeField> Circuit<F> for CubicCircuit {
    fn name(&self) -> String {
        "cubic".to_string()
    }

    fn emit_constraints(&self, builder: &mut R1CSBuilder<F>) -> Result<(), CompileError> {
        let x = builder.private_input("x")?;
        let y = builder.public_input("y")?;

        let x2 = builder.mul(x, x);
        let x3 = builder.mul(x2, x);
        let rhs = builder.constant(F::from(5u64)) + x3 + x;
        builder.constrain_eq(y, rhs);
        Ok(())
    }

    fn constraint_hint(&self) -> usize {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r1cs::{compile, ConstraintSystem};
    use ark_bn254::Fr;

    #[test]
    fn three_constraints() {
        let cs: ConstraintSystem<Fr> = compile(&CubicCircuit).unwrap();
        assert_eq!(cs.num_constraints(), 3);
        assert_eq!(cs.num_variables(), 5);
        assert_eq!(cs.name(), "cubic");
    }
}
