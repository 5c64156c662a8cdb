pub mod builder;
pub mod key;
pub mod ops;
pub mod witness;

pub use builder::{compile, Constraint, R1CSBuilder};
pub use key::{ConstraintSystem, R1CSMatrices};
pub use witness::{compute_witness, Assignment, Witness};
