use thiserror::Error;

use crate::r1cs::ops::Variable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("constraint {constraint} references undeclared variable {variable:?}")]
    UndeclaredVariable {
        constraint: usize,
        variable: Variable,
    },
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),
    #[error("no input named `{0}` has been declared")]
    UnknownVariable(String),
    #[error("circuit `{0}` emitted no constraints")]
    EmptyCircuit(String),
    #[error("size exponent {0} is too large for this platform")]
    SizeTooLarge(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("constraint {constraint} references {variable:?}, which is outside the {num_variables}-variable layout")]
    DanglingVariable {
        constraint: usize,
        variable: Variable,
        num_variables: usize,
    },
    #[error("constraint system has no constraints")]
    EmptyConstraintSystem,
    #[error("evaluation domain of size {0} exceeds the two-adicity of the scalar field")]
    DomainTooLarge(usize),
    #[error("failed to gather entropy for the setup: {0}")]
    Entropy(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    #[error("constraint {index} is not satisfied by the assignment")]
    UnsatisfiedConstraint { index: usize },
    #[error("no value was assigned to input `{0}`")]
    MissingAssignment(String),
    #[error("`{0}` is not an input of this circuit")]
    UnknownInput(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvingError {
    #[error("accelerated backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("witness was computed for a different constraint system than the proving key")]
    KeyMismatch,
    #[error("witness has {got} variables, proving key expects {expected}")]
    WitnessLength { expected: usize, got: usize },
    #[error("Length Error: bases length: {bases}, scalars length: {scalars}")]
    KeyLength { bases: usize, scalars: usize },
    #[error("malformed proving key: {0}")]
    MalformedKey(String),
    #[error("failed to gather entropy for the prover: {0}")]
    Entropy(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    #[error("expected {expected} public inputs but got {got}")]
    PublicInputMismatch { expected: usize, got: usize },
    #[error("malformed verifying key: {0}")]
    MalformedKey(String),
}
