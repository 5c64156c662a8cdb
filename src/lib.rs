//! Benchmark harness for the Groth16 pipeline in `snarkbench-core`.
//!
//! [`run_benchmark`] drives one circuit size through compile, setup, witness
//! generation and, per backend, prove and verify, timing each stage.

pub mod config;
pub mod harness;
pub mod host;
pub mod report;

pub use config::{BackendSelection, BenchConfig, CircuitKind};
pub use harness::{run_benchmark, run_sweep};
pub use report::{BenchReport, Stage, StageRecord, StageStatus};
