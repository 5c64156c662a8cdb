use std::time::Duration;

use clap::ValueEnum;
use snarkbench_core::circuits::DEFAULT_EXPONENT;
use snarkbench_core::field::DEFAULT_FACTOR;
use snarkbench_core::groth16::Backend;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendSelection {
    Reference,
    Accelerated,
    Both,
}

impl BackendSelection {
    pub fn backends(&self) -> Vec<Backend> {
        match self {
            BackendSelection::Reference => vec![Backend::Reference],
            BackendSelection::Accelerated => vec![Backend::Accelerated],
            BackendSelection::Both => vec![Backend::Reference, Backend::Accelerated],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CircuitKind {
    /// `x^(2^exponent) == y` by sequential multiplication.
    PowerChain,
    /// `x^3 + x + 5 == y`; ignores the exponent.
    Cubic,
}

impl CircuitKind {
    pub fn name(&self) -> &'static str {
        match self {
            CircuitKind::PowerChain => "power-chain",
            CircuitKind::Cubic => "cubic",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    pub circuit: CircuitKind,
    /// Circuit size as `2^exponent` multiplications.
    pub exponent: usize,
    pub backends: BackendSelection,
    /// Per-phase timing and memory reports on the last prove of each backend.
    pub profile: bool,
    /// Private input, as a decimal integer reduced mod p.
    pub x: String,
    /// Public output. Computed from `x` when absent.
    pub y: Option<String>,
    /// Proofs per backend. The first one runs on a cold cache.
    pub prove_runs: usize,
    /// Prove the backends at the same time instead of one after the other.
    pub concurrent: bool,
    /// Wall-clock limit per stage, checked after the stage finishes.
    pub budget: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            circuit: CircuitKind::PowerChain,
            exponent: DEFAULT_EXPONENT,
            backends: BackendSelection::Both,
            profile: false,
            x: DEFAULT_FACTOR.to_string(),
            y: None,
            prove_runs: 2,
            concurrent: false,
            budget: None,
        }
    }
}

impl BenchConfig {
    pub fn with_exponent(mut self, exponent: usize) -> Self {
        self.exponent = exponent;
        self
    }

    pub fn with_backends(mut self, backends: BackendSelection) -> Self {
        self.backends = backends;
        self
    }

    /// Name used for trace and result files.
    pub fn bench_name(&self) -> String {
        match self.circuit {
            CircuitKind::PowerChain => format!("{}_{}", self.circuit.name(), self.exponent),
            CircuitKind::Cubic => self.circuit.name().to_string(),
        }
    }
}
