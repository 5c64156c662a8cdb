//! R1CS to QAP reduction.
//!
//! Each instance column `j` gets an extra row forcing `a[m + j] = z[j]`, so
//! the instance polynomials are linearly independent and the proof cannot be
//! replayed against different public inputs.

use ark_ff::PrimeField;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use rayon::prelude::*;

use crate::r1cs::key::{R1CSMatrices, Row};
use crate::utils::errors::SetupError;

pub type Domain<F> = Radix2EvaluationDomain<F>;

/// Smallest radix-2 domain covering every constraint and instance row.
pub fn domain_for<F: PrimeField>(matrices: &R1CSMatrices<F>) -> Result<Domain<F>, SetupError> {
    let rows = matrices.num_constraints() + matrices.num_instance;
    Domain::new(rows).ok_or(SetupError::DomainTooLarge(rows))
}

/// QAP polynomials evaluated at `tau`, one entry per variable column.
pub struct QapEvaluations<F: PrimeField> {
    pub a: Vec<F>,
    pub b: Vec<F>,
    pub c: Vec<F>,
    /// `Z(tau)` for the vanishing polynomial of the domain.
    pub zt: F,
}

#[tracing::instrument(skip_all, name = "qap::evaluate_at")]
pub fn evaluate_at<F: PrimeField>(
    matrices: &R1CSMatrices<F>,
    domain: &Domain<F>,
    tau: F,
) -> QapEvaluations<F> {
    let zt = domain.evaluate_vanishing_polynomial(tau);
    let lagrange = domain.evaluate_all_lagrange_coefficients(tau);
    let num_constraints = matrices.num_constraints();
    let num_variables = matrices.num_variables();

    let mut a = vec![F::zero(); num_variables];
    let mut b = vec![F::zero(); num_variables];
    let mut c = vec![F::zero(); num_variables];

    for (j, value) in a.iter_mut().enumerate().take(matrices.num_instance) {
        *value = lagrange[num_constraints + j];
    }
    for (i, u_i) in lagrange.iter().enumerate().take(num_constraints) {
        for &(coeff, col) in &matrices.a[i] {
            a[col] += *u_i * coeff;
        }
        for &(coeff, col) in &matrices.b[i] {
            b[col] += *u_i * coeff;
        }
        for &(coeff, col) in &matrices.c[i] {
            c[col] += *u_i * coeff;
        }
    }

    QapEvaluations { a, b, c, zt }
}

fn inner_product<F: PrimeField>(row: &Row<F>, z: &[F]) -> F {
    row.iter().map(|&(coeff, col)| coeff * z[col]).sum()
}

/// Coefficients of `h(X) = (A(X) B(X) - C(X)) / Z(X)` for the assignment `z`.
///
/// The quotient is taken pointwise over a coset of the domain, where `Z`
/// is a nonzero constant.
#[tracing::instrument(skip_all, name = "qap::witness_map")]
pub fn witness_map<F: PrimeField>(
    matrices: &R1CSMatrices<F>,
    domain: &Domain<F>,
    z: &[F],
) -> Result<Vec<F>, SetupError> {
    let domain_size = domain.size();
    let num_constraints = matrices.num_constraints();
    let coset = domain
        .get_coset(F::GENERATOR)
        .ok_or(SetupError::DomainTooLarge(domain_size))?;

    let evaluate_rows = |rows: &[Row<F>]| -> Vec<F> {
        let mut evals = vec![F::zero(); domain_size];
        evals[..num_constraints]
            .par_iter_mut()
            .zip(rows)
            .for_each(|(eval, row)| *eval = inner_product(row, z));
        evals
    };

    let mut a = evaluate_rows(&matrices.a);
    a[num_constraints..num_constraints + matrices.num_instance]
        .copy_from_slice(&z[..matrices.num_instance]);
    let mut b = evaluate_rows(&matrices.b);
    let mut c = evaluate_rows(&matrices.c);

    for evals in [&mut a, &mut b, &mut c] {
        domain.ifft_in_place(evals);
        coset.fft_in_place(evals);
    }

    let vanishing_inverse = domain
        .evaluate_vanishing_polynomial(F::GENERATOR)
        .inverse()
        .ok_or(SetupError::DomainTooLarge(domain_size))?;
    a.par_iter_mut()
        .zip(b.par_iter())
        .zip(c.par_iter())
        .for_each(|((ab, b), c)| *ab = (*ab * b - c) * vanishing_inverse);

    coset.ifft_in_place(&mut a);
    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::PowerChainCircuit;
    use crate::r1cs::{compile, compute_witness, Assignment};
    use ark_bn254::Fr;
    use ark_ff::{UniformRand, Zero};
    use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial};
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn quotient_divides_at_random_point() {
        let cs = compile(&PowerChainCircuit::new(3)).unwrap();
        let inputs = Assignment::new()
            .with("x", Fr::from(2u64))
            .with("y", Fr::from(256u64));
        let witness = compute_witness(&cs, &inputs).unwrap();
        let matrices = cs.to_matrices();
        let domain = domain_for(&matrices).unwrap();
        assert_eq!(domain.size(), 16);

        let h = witness_map(&matrices, &domain, witness.assignment()).unwrap();
        assert!(h[domain.size() - 1].is_zero());

        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let tau = Fr::rand(&mut rng);
        let qap = evaluate_at(&matrices, &domain, tau);
        let z = witness.assignment();
        let dot = |col: &[Fr]| -> Fr { col.iter().zip(z).map(|(u, w)| *u * w).sum() };
        let h_tau = DensePolynomial::from_coefficients_vec(h).evaluate(&tau);
        assert_eq!(dot(&qap.a) * dot(&qap.b) - dot(&qap.c), h_tau * qap.zt);
    }

    #[test]
    fn domain_covers_instance_rows() {
        let cs = compile::<Fr, _>(&PowerChainCircuit::new(2)).unwrap();
        let matrices = cs.to_matrices();
        // 5 constraints + 2 instance rows
        assert_eq!(domain_for(&matrices).unwrap().size(), 8);
    }
}
