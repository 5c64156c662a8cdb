//! Defines the Linear Combination (LC) object and associated operations.
//! A LinearCombination is a vector of Terms, where each Term is a pair of a Variable and a coefficient.

use ark_ff::PrimeField;
use itertools::Itertools;
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A wire of the constraint system.
///
/// Indices are per kind; the column of a variable in the full assignment is
/// resolved by [`VariableLayout::column`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// The constant-1 wire.
    One,
    Public(usize),
    Private(usize),
    /// Wire introduced by the compiler for an intermediate product.
    Internal(usize),
}

/// Column layout of an assignment vector: `[1, public.., private.., internal..]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VariableLayout {
    pub num_public: usize,
    pub num_private: usize,
    pub num_internal: usize,
}

impl VariableLayout {
    /// Number of instance columns, the constant wire included.
    pub fn num_instance(&self) -> usize {
        1 + self.num_public
    }

    /// Number of witness columns (private inputs and internal wires).
    pub fn num_witness(&self) -> usize {
        self.num_private + self.num_internal
    }

    pub fn num_variables(&self) -> usize {
        self.num_instance() + self.num_witness()
    }

    pub fn contains(&self, var: Variable) -> bool {
        match var {
            Variable::One => true,
            Variable::Public(i) => i < self.num_public,
            Variable::Private(i) => i < self.num_private,
            Variable::Internal(i) => i < self.num_internal,
        }
    }

    pub fn column(&self, var: Variable) -> usize {
        match var {
            Variable::One => 0,
            Variable::Public(i) => 1 + i,
            Variable::Private(i) => self.num_instance() + i,
            Variable::Internal(i) => self.num_instance() + self.num_private + i,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Term<F: PrimeField>(pub Variable, pub F);

/// Linear Combination of terms.
#[derive(Clone, PartialEq, Eq)]
pub struct LC<F: PrimeField>(Vec<Term<F>>);

impl<F: PrimeField> LC<F> {
    pub fn new(terms: Vec<Term<F>>) -> Self {
        LC(terms)
    }

    pub fn zero() -> Self {
        LC::new(vec![])
    }

    pub fn constant(value: F) -> Self {
        LC::new(vec![Term(Variable::One, value)])
    }

    pub fn terms(&self) -> &[Term<F>] {
        &self.0
    }

    pub fn num_terms(&self) -> usize {
        self.0.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0.iter().map(|term| term.0)
    }

    /// Merges repeated variables and drops zero coefficients. Terms come out
    /// ordered by variable, so equal combinations have equal representations.
    pub fn simplify(mut self) -> Self {
        self.0.sort_by(|a, b| a.0.cmp(&b.0));
        let merged = self
            .0
            .into_iter()
            .coalesce(|prev, next| {
                if prev.0 == next.0 {
                    Ok(Term(prev.0, prev.1 + next.1))
                } else {
                    Err((prev, next))
                }
            })
            .filter(|term| !term.1.is_zero())
            .collect();
        LC(merged)
    }

    /// Evaluates the combination against a full assignment vector.
    pub fn evaluate(&self, layout: &VariableLayout, z: &[F]) -> F {
        self.0
            .iter()
            .map(|Term(var, coeff)| match var {
                Variable::One => *coeff,
                _ => *coeff * z[layout.column(*var)],
            })
            .sum()
    }

    /// Sparse row `(coeff, column)` for the constraint matrices.
    pub fn to_row(&self, layout: &VariableLayout) -> Vec<(F, usize)> {
        self.0
            .iter()
            .map(|Term(var, coeff)| (*coeff, layout.column(*var)))
            .collect()
    }
}

impl<F: PrimeField> Debug for LC<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LC(")?;
        for (index, term) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{:?}", term)?;
        }
        write!(f, ")")
    }
}

impl<F: PrimeField> Debug for Term<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{:?}", self.1, self.0)
    }
}

impl<F: PrimeField> From<Variable> for Term<F> {
    fn from(value: Variable) -> Self {
        Term(value, F::one())
    }
}

impl<F: PrimeField> From<Variable> for LC<F> {
    fn from(value: Variable) -> Self {
        LC::new(vec![Term(value, F::one())])
    }
}

impl<F: PrimeField> From<Term<F>> for LC<F> {
    fn from(value: Term<F>) -> Self {
        LC::new(vec![value])
    }
}

impl<F: PrimeField> From<Vec<Term<F>>> for LC<F> {
    fn from(value: Vec<Term<F>>) -> Self {
        LC::new(value)
    }
}

impl<F: PrimeField> From<F> for LC<F> {
    fn from(value: F) -> Self {
        LC::constant(value)
    }
}

impl<F: PrimeField, T: Into<LC<F>>> Add<T> for LC<F> {
    type Output = Self;

    fn add(self, other: T) -> Self::Output {
        let mut combined = self.0;
        combined.extend(other.into().0);
        LC::new(combined).simplify()
    }
}

impl<F: PrimeField> Neg for LC<F> {
    type Output = LC<F>;

    fn neg(self) -> Self::Output {
        LC::new(self.0.into_iter().map(|Term(var, coeff)| Term(var, -coeff)).collect())
    }
}

impl<F: PrimeField, T: Into<LC<F>>> Sub<T> for LC<F> {
    type Output = Self;

    fn sub(self, other: T) -> Self::Output {
        let other: LC<F> = other.into();
        self + (-other)
    }
}

impl<F: PrimeField> Mul<F> for LC<F> {
    type Output = Self;

    fn mul(self, scalar: F) -> Self::Output {
        LC::new(
            self.0
                .into_iter()
                .map(|Term(var, coeff)| Term(var, coeff * scalar))
                .collect(),
        )
        .simplify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    fn layout() -> VariableLayout {
        VariableLayout {
            num_public: 1,
            num_private: 2,
            num_internal: 3,
        }
    }

    #[test]
    fn columns_follow_declared_layout() {
        let layout = layout();
        assert_eq!(layout.num_instance(), 2);
        assert_eq!(layout.num_witness(), 5);
        assert_eq!(layout.num_variables(), 7);
        assert_eq!(layout.column(Variable::One), 0);
        assert_eq!(layout.column(Variable::Public(0)), 1);
        assert_eq!(layout.column(Variable::Private(1)), 3);
        assert_eq!(layout.column(Variable::Internal(2)), 6);
        assert!(layout.contains(Variable::Internal(2)));
        assert!(!layout.contains(Variable::Internal(3)));
        assert!(!layout.contains(Variable::Public(1)));
    }

    #[test]
    fn add_merges_duplicate_variables() {
        let x = Variable::Private(0);
        let lc: LC<Fr> = LC::from(x) + LC::from(x) + Fr::from(5u64);
        assert_eq!(lc.num_terms(), 2);
        assert_eq!(
            lc.terms(),
            &[Term(Variable::One, Fr::from(5u64)), Term(x, Fr::from(2u64))]
        );
    }

    #[test]
    fn sub_cancels_to_zero() {
        let y = Variable::Public(0);
        let lc: LC<Fr> = LC::from(y) - y;
        assert_eq!(lc, LC::zero());
    }

    #[test]
    fn evaluate_against_assignment() {
        let layout = layout();
        // z = [1, y, x0, x1, w0, w1, w2]
        let z: Vec<Fr> = (0..7u64).map(|i| Fr::from(i + 10)).collect();
        let lc: LC<Fr> = LC::from(Term(Variable::Internal(1), Fr::from(3u64)))
            + Variable::Public(0)
            + Fr::from(2u64);
        // 3 * 15 + 11 + 2 * 1
        assert_eq!(lc.evaluate(&layout, &z), Fr::from(45u64 + 11 + 2));
    }

    #[test]
    fn scalar_multiplication_scales_every_term() {
        let lc: LC<Fr> = LC::from(Variable::Private(0)) + Fr::from(4u64);
        let scaled = lc * Fr::from(3u64);
        assert_eq!(
            scaled.terms(),
            &[
                Term(Variable::One, Fr::from(12u64)),
                Term(Variable::Private(0), Fr::from(3u64))
            ]
        );
        assert_eq!(scaled.clone() * Fr::from(0u64), LC::zero());
    }
}
