use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rayon::prelude::*;
use sha3::{Digest, Sha3_256};

use super::builder::Constraint;
use super::ops::{Variable, VariableLayout, LC};

/// Instructs the witness generator to fill `out` with `a * b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductHint<F: PrimeField> {
    pub a: LC<F>,
    pub b: LC<F>,
    pub out: Variable,
}

/// Sparse row: `(coefficient, column)` pairs.
pub type Row<F> = Vec<(F, usize)>;

/// Sparse A/B/C matrices of a constraint system, indexed by constraint and
/// then by column of the `[1, public.., private.., internal..]` layout.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct R1CSMatrices<F: PrimeField> {
    pub a: Vec<Row<F>>,
    pub b: Vec<Row<F>>,
    pub c: Vec<Row<F>>,
    /// Columns assigned to the constant wire and the public inputs.
    pub num_instance: usize,
    pub num_witness: usize,
}

impl<F: PrimeField> R1CSMatrices<F> {
    pub fn num_constraints(&self) -> usize {
        self.a.len()
    }

    pub fn num_variables(&self) -> usize {
        self.num_instance + self.num_witness
    }
}

/// A compiled circuit. Its shape is frozen; keys and witnesses derived from it
/// carry its [`ConstraintSystem::digest`].
#[derive(Clone, Debug)]
pub struct ConstraintSystem<F: PrimeField> {
    pub(crate) name: String,
    pub(crate) constraints: Vec<Constraint<F>>,
    pub(crate) layout: VariableLayout,
    pub(crate) public_names: Vec<String>,
    pub(crate) private_names: Vec<String>,
    pub(crate) hints: Vec<ProductHint<F>>,
    pub(crate) digest: [u8; 32],
}

impl<F: PrimeField> ConstraintSystem<F> {
    pub(crate) fn new(
        name: String,
        constraints: Vec<Constraint<F>>,
        layout: VariableLayout,
        public_names: Vec<String>,
        private_names: Vec<String>,
        hints: Vec<ProductHint<F>>,
    ) -> Self {
        let mut cs = Self {
            name,
            constraints,
            layout,
            public_names,
            private_names,
            hints,
            digest: [0u8; 32],
        };
        cs.digest = cs.compute_digest();
        cs
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraints(&self) -> &[Constraint<F>] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    pub fn num_variables(&self) -> usize {
        self.layout.num_variables()
    }

    pub fn num_public_inputs(&self) -> usize {
        self.layout.num_public
    }

    pub fn public_names(&self) -> &[String] {
        &self.public_names
    }

    pub fn private_names(&self) -> &[String] {
        &self.private_names
    }

    pub fn hints(&self) -> &[ProductHint<F>] {
        &self.hints
    }

    /// SHA3-256 of the system's shape.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    pub fn digest_hex(&self) -> String {
        to_hex(&self.digest)
    }

    /// Returns the first `(constraint, variable)` that falls outside the
    /// layout, if any.
    pub fn validate(&self) -> Result<(), (usize, Variable)> {
        self.constraints
            .par_iter()
            .enumerate()
            .find_map_first(|(index, constraint)| {
                constraint
                    .variables()
                    .find(|v| !self.layout.contains(*v))
                    .map(|v| (index, v))
            })
            .map_or(Ok(()), Err)
    }

    #[tracing::instrument(skip_all, name = "ConstraintSystem::to_matrices")]
    pub fn to_matrices(&self) -> R1CSMatrices<F> {
        let layout = &self.layout;
        let rows = |select: fn(&Constraint<F>) -> &LC<F>| -> Vec<Row<F>> {
            self.constraints
                .par_iter()
                .map(|constraint| select(constraint).to_row(layout))
                .collect()
        };

        R1CSMatrices {
            a: rows(|constraint| &constraint.a),
            b: rows(|constraint| &constraint.b),
            c: rows(|constraint| &constraint.c),
            num_instance: layout.num_instance(),
            num_witness: layout.num_witness(),
        }
    }

    fn compute_digest(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(self.name.as_bytes());
        for count in [
            self.layout.num_public,
            self.layout.num_private,
            self.layout.num_internal,
            self.constraints.len(),
        ] {
            hasher.update((count as u64).to_le_bytes());
        }

        let mut buf = Vec::new();
        for constraint in &self.constraints {
            for lc in [&constraint.a, &constraint.b, &constraint.c] {
                hasher.update((lc.num_terms() as u64).to_le_bytes());
                for term in lc.terms() {
                    hasher.update((self.layout.column(term.0) as u64).to_le_bytes());
                    buf.clear();
                    // Writing a field element into a Vec cannot fail.
                    let _ = term.1.serialize_compressed(&mut buf);
                    hasher.update(&buf);
                }
            }
        }
        hasher.finalize().into()
    }
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r1cs::builder::R1CSBuilder;
    use ark_bn254::Fr;

    fn square_system(name: &str) -> ConstraintSystem<Fr> {
        let mut builder = R1CSBuilder::<Fr>::new();
        let x = builder.private_input("x").unwrap();
        let y = builder.public_input("y").unwrap();
        let x2 = builder.mul(x, x);
        builder.constrain_eq(y, x2);
        builder.finalize(name.to_string()).unwrap()
    }

    #[test]
    fn matrices_use_layout_columns() {
        let cs = square_system("square");
        let m = cs.to_matrices();
        // z = [1, y, x, x2]
        assert_eq!(m.num_instance, 2);
        assert_eq!(m.num_witness, 2);
        assert_eq!(m.num_constraints(), 2);
        assert_eq!(m.a[0], vec![(Fr::from(1u64), 2)]);
        assert_eq!(m.b[0], vec![(Fr::from(1u64), 2)]);
        assert_eq!(m.c[0], vec![(Fr::from(1u64), 3)]);
        assert_eq!(m.a[1], vec![(Fr::from(1u64), 1), (-Fr::from(1u64), 3)]);
        assert_eq!(m.b[1], vec![(Fr::from(1u64), 0)]);
        assert!(m.c[1].is_empty());
    }

    #[test]
    fn digest_is_deterministic_and_shape_sensitive() {
        let first = square_system("square");
        let second = square_system("square");
        assert_eq!(first.digest(), second.digest());
        assert_eq!(first.digest_hex().len(), 64);

        let renamed = square_system("other");
        assert_ne!(first.digest(), renamed.digest());
    }

    #[test]
    fn validate_reports_out_of_layout_reference() {
        let mut cs = square_system("square");
        assert_eq!(cs.validate(), Ok(()));
        cs.constraints[1].c = Variable::Internal(9).into();
        assert_eq!(cs.validate(), Err((1, Variable::Internal(9))));
    }
}
