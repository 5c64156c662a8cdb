use ark_ff::PrimeField;

use super::Circuit;
use crate::r1cs::R1CSBuilder;
use crate::utils::errors::CompileError;

/// Exponent used when no size is configured: `2^24` multiplications.
pub const DEFAULT_EXPONENT: usize = 24;

/// Proves knowledge of a private `x` with `x^size == y` for a public `y`,
/// where `size = 2^exponent`.
///
/// The power is computed by `size` sequential multiplications rather than
/// by squaring, so the circuit has exactly `size + 1` constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerChainCircuit {
    pub exponent: usize,
}

impl Default for PowerChainCircuit {
    fn default() -> Self {
        Self::new(DEFAULT_EXPONENT)
    }
}

impl PowerChainCircuit {
    pub fn new(exponent: usize) -> Self {
        Self { exponent }
    }

    pub fn size(&self) -> Result<usize, CompileError> {
        u32::try_from(self.exponent)
            .ok()
            .and_then(|exponent| 1usize.checked_shl(exponent))
            .ok_or(CompileError::SizeTooLarge(self.exponent))
    }
}

impl<F: PrimeField> Circuit<F> for PowerChainCircuit {
    fn name(&self) -> String {
        format!("power-chain-{}", self.exponent)
    }

    fn emit_constraints(&self, builder: &mut R1CSBuilder<F>) -> Result<(), CompileError> {
        let size = self.size()?;
        let x = builder.private_input("x")?;
        let y = builder.public_input("y")?;

        let mut product = builder.constant(F::one());
        for _ in 0..size {
            product = builder.mul(product, x).into();
        }
        builder.constrain_eq(y, product);
        Ok(())
    }

    fn constraint_hint(&self) -> usize {
        self.size().map_or(0, |size| size + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r1cs::ops::Variable;
    use crate::r1cs::{compile, ConstraintSystem};
    use ark_bn254::Fr;

    #[test]
    fn constraint_count_is_size_plus_one() {
        for exponent in [0usize, 1, 2, 5, 10] {
            let cs: ConstraintSystem<Fr> = compile(&PowerChainCircuit::new(exponent)).unwrap();
            assert_eq!(cs.num_constraints(), (1 << exponent) + 1);
            assert_eq!(cs.layout().num_internal, 1 << exponent);
            assert_eq!(cs.num_public_inputs(), 1);
            assert_eq!(cs.public_names(), &["y".to_string()]);
            assert_eq!(cs.private_names(), &["x".to_string()]);
        }
    }

    #[test]
    fn compilation_is_deterministic() {
        let first: ConstraintSystem<Fr> = compile(&PowerChainCircuit::new(6)).unwrap();
        let second: ConstraintSystem<Fr> = compile(&PowerChainCircuit::new(6)).unwrap();
        assert_eq!(first.digest(), second.digest());
        assert_eq!(first.constraints(), second.constraints());

        let other: ConstraintSystem<Fr> = compile(&PowerChainCircuit::new(7)).unwrap();
        assert_ne!(first.digest(), other.digest());
    }

    #[test]
    fn last_row_asserts_the_public_output() {
        let cs: ConstraintSystem<Fr> = compile(&PowerChainCircuit::new(2)).unwrap();
        let last = cs.constraints().last().unwrap();
        let vars: Vec<Variable> = last.a.variables().collect();
        assert_eq!(vars, vec![Variable::Public(0), Variable::Internal(3)]);
        assert_eq!(last.b, Variable::One.into());
    }

    #[test]
    fn oversized_exponent_is_rejected() {
        let circuit = PowerChainCircuit::new(usize::BITS as usize);
        assert_eq!(
            compile::<Fr, _>(&circuit).unwrap_err(),
            CompileError::SizeTooLarge(usize::BITS as usize)
        );
    }
}
