#![allow(type_alias_bounds)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_long_first_doc_paragraph)]

pub mod circuits;
pub mod field;
pub mod groth16;
pub mod msm;
pub mod pipeline;
pub mod r1cs;
pub mod utils;
