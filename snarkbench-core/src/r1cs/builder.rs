use ark_ff::PrimeField;

use super::key::{ConstraintSystem, ProductHint};
use super::ops::{Variable, VariableLayout, LC};
use crate::circuits::Circuit;
use crate::utils::errors::CompileError;

/// A single rank-1 constraint `a * b == c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint<F: PrimeField> {
    pub a: LC<F>,
    pub b: LC<F>,
    pub c: LC<F>,
}

impl<F: PrimeField> Constraint<F> {
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.a
            .variables()
            .chain(self.b.variables())
            .chain(self.c.variables())
    }
}

/// Collects the constraints a [`Circuit`] emits.
///
/// Linear operations on [`LC`] are free; only [`R1CSBuilder::mul`] and
/// [`R1CSBuilder::constrain_eq`] add rows to the system.
pub struct R1CSBuilder<F: PrimeField> {
    pub(crate) constraints: Vec<Constraint<F>>,
    public: Vec<String>,
    private: Vec<String>,
    num_internal: usize,
    hints: Vec<ProductHint<F>>,
}

impl<F: PrimeField> Default for R1CSBuilder<F> {
    fn default() -> Self {
        Self {
            constraints: Vec::new(),
            public: Vec::new(),
            private: Vec::new(),
            num_internal: 0,
            hints: Vec::new(),
        }
    }
}

impl<F: PrimeField> R1CSBuilder<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(num_constraints: usize) -> Self {
        Self {
            constraints: Vec::with_capacity(num_constraints),
            hints: Vec::with_capacity(num_constraints),
            ..Self::default()
        }
    }

    fn ensure_fresh(&self, name: &str) -> Result<(), CompileError> {
        if self.public.iter().chain(self.private.iter()).any(|n| n == name) {
            return Err(CompileError::DuplicateVariable(name.to_string()));
        }
        Ok(())
    }

    pub fn public_input(&mut self, name: &str) -> Result<Variable, CompileError> {
        self.ensure_fresh(name)?;
        self.public.push(name.to_string());
        Ok(Variable::Public(self.public.len() - 1))
    }

    pub fn private_input(&mut self, name: &str) -> Result<Variable, CompileError> {
        self.ensure_fresh(name)?;
        self.private.push(name.to_string());
        Ok(Variable::Private(self.private.len() - 1))
    }

    /// Looks up a previously declared input by name.
    pub fn variable(&self, name: &str) -> Result<Variable, CompileError> {
        if let Some(i) = self.public.iter().position(|n| n == name) {
            return Ok(Variable::Public(i));
        }
        if let Some(i) = self.private.iter().position(|n| n == name) {
            return Ok(Variable::Private(i));
        }
        Err(CompileError::UnknownVariable(name.to_string()))
    }

    pub fn constant(&self, value: F) -> LC<F> {
        LC::constant(value)
    }

    /// Allocates an internal wire holding `left * right`.
    pub fn mul(&mut self, left: impl Into<LC<F>>, right: impl Into<LC<F>>) -> Variable {
        let a: LC<F> = left.into();
        let b: LC<F> = right.into();
        let out = Variable::Internal(self.num_internal);
        self.num_internal += 1;

        self.hints.push(ProductHint {
            a: a.clone(),
            b: b.clone(),
            out,
        });
        self.constraints.push(Constraint {
            a,
            b,
            c: out.into(),
        });
        out
    }

    pub fn constrain_eq(&mut self, left: impl Into<LC<F>>, right: impl Into<LC<F>>) {
        // left - right == 0
        let left: LC<F> = left.into();
        let right: LC<F> = right.into();

        let a = left - right;
        let b = Variable::One.into();
        self.constraints.push(Constraint {
            a,
            b,
            c: LC::zero(),
        });
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub(crate) fn layout(&self) -> VariableLayout {
        VariableLayout {
            num_public: self.public.len(),
            num_private: self.private.len(),
            num_internal: self.num_internal,
        }
    }

    /// Checks every reference against the declared layout and freezes the
    /// system.
    pub(crate) fn finalize(self, name: String) -> Result<ConstraintSystem<F>, CompileError> {
        if self.constraints.is_empty() {
            return Err(CompileError::EmptyCircuit(name));
        }
        let layout = self.layout();
        for (index, constraint) in self.constraints.iter().enumerate() {
            if let Some(variable) = constraint.variables().find(|v| !layout.contains(*v)) {
                return Err(CompileError::UndeclaredVariable {
                    constraint: index,
                    variable,
                });
            }
        }
        Ok(ConstraintSystem::new(
            name,
            self.constraints,
            layout,
            self.public,
            self.private,
            self.hints,
        ))
    }
}

/// Compiles a circuit into a constraint system. Deterministic: the same
/// circuit always yields the same system, digest included.
#[tracing::instrument(skip_all, fields(circuit = %circuit.name()))]
pub fn compile<F: PrimeField, C: Circuit<F> + ?Sized>(
    circuit: &C,
) -> Result<ConstraintSystem<F>, CompileError> {
    let mut builder = R1CSBuilder::with_capacity(circuit.constraint_hint());
    circuit.emit_constraints(&mut builder)?;
    let cs = builder.finalize(circuit.name())?;
    tracing::debug!(
        num_constraints = cs.num_constraints(),
        num_variables = cs.num_variables(),
        "compiled circuit"
    );
    Ok(cs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    struct DoubleDeclaration;

    impl Circuit<Fr> for DoubleDeclaration {
        fn name(&self) -> String {
            "double-declaration".to_string()
        }

        fn emit_constraints(&self, builder: &mut R1CSBuilder<Fr>) -> Result<(), CompileError> {
            builder.private_input("x")?;
            builder.public_input("x")?;
            Ok(())
        }
    }

    struct DanglingAssertion;

    impl Circuit<Fr> for DanglingAssertion {
        fn name(&self) -> String {
            "dangling".to_string()
        }

        fn emit_constraints(&self, builder: &mut R1CSBuilder<Fr>) -> Result<(), CompileError> {
            let y = builder.public_input("y")?;
            builder.constrain_eq(y, Variable::Private(3));
            Ok(())
        }
    }

    struct Empty;

    impl Circuit<Fr> for Empty {
        fn name(&self) -> String {
            "empty".to_string()
        }

        fn emit_constraints(&self, builder: &mut R1CSBuilder<Fr>) -> Result<(), CompileError> {
            builder.public_input("y")?;
            Ok(())
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert_eq!(
            compile::<Fr, _>(&DoubleDeclaration).unwrap_err(),
            CompileError::DuplicateVariable("x".to_string())
        );
    }

    #[test]
    fn undeclared_variable_is_rejected() {
        assert_eq!(
            compile::<Fr, _>(&DanglingAssertion).unwrap_err(),
            CompileError::UndeclaredVariable {
                constraint: 0,
                variable: Variable::Private(3),
            }
        );
    }

    #[test]
    fn empty_circuit_is_rejected() {
        assert_eq!(
            compile::<Fr, _>(&Empty).unwrap_err(),
            CompileError::EmptyCircuit("empty".to_string())
        );
    }

    #[test]
    fn lookup_by_name() {
        let mut builder = R1CSBuilder::<Fr>::new();
        let x = builder.private_input("x").unwrap();
        let y = builder.public_input("y").unwrap();
        assert_eq!(builder.variable("x"), Ok(x));
        assert_eq!(builder.variable("y"), Ok(y));
        assert_eq!(
            builder.variable("z"),
            Err(CompileError::UnknownVariable("z".to_string()))
        );
    }

    #[test]
    fn mul_allocates_one_wire_and_one_row() {
        let mut builder = R1CSBuilder::<Fr>::new();
        let x = builder.private_input("x").unwrap();
        let w0 = builder.mul(x, x);
        let w1 = builder.mul(w0, Fr::from(3u64));
        assert_eq!(w0, Variable::Internal(0));
        assert_eq!(w1, Variable::Internal(1));
        assert_eq!(builder.num_constraints(), 2);
        assert_eq!(builder.layout().num_internal, 2);
    }
}
