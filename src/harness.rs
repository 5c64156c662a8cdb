use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use eyre::{bail, eyre, Result, WrapErr};
use snarkbench_core::circuits::{CubicCircuit, PowerChainCircuit};
use snarkbench_core::field::{from_decimal, reference_pow, to_decimal, Fr};
use snarkbench_core::groth16::{Backend, ProveOptions};
use snarkbench_core::pipeline::{self, PreparedVerificationKey, ProvingKey, Witness};
use snarkbench_core::r1cs;
use snarkbench_core::utils::errors::ProvingError;

use crate::config::{BenchConfig, CircuitKind};
use crate::report::{BenchReport, Stage, StageRecord, StageStatus};

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

fn budget_status(config: &BenchConfig, elapsed: Duration) -> StageStatus {
    match config.budget {
        Some(budget) if elapsed > budget => StageStatus::OverBudget,
        _ => StageStatus::Passed,
    }
}

fn shared_record(config: &BenchConfig, stage: Stage, elapsed: Duration) -> StageRecord {
    tracing::info!(%stage, seconds = elapsed.as_secs_f64(), "stage complete");
    StageRecord {
        stage,
        backend: None,
        run: 0,
        elapsed,
        status: budget_status(config, elapsed),
    }
}

fn compile_circuit(config: &BenchConfig) -> Result<pipeline::ConstraintSystem> {
    let cs = match config.circuit {
        CircuitKind::PowerChain => r1cs::compile(&PowerChainCircuit::new(config.exponent))?,
        CircuitKind::Cubic => r1cs::compile(&CubicCircuit)?,
    };
    Ok(cs)
}

/// Public output an honest prover would claim for `x`.
fn expected_output(config: &BenchConfig, x: Fr) -> Result<Fr> {
    Ok(match config.circuit {
        CircuitKind::PowerChain => {
            let size = PowerChainCircuit::new(config.exponent).size()?;
            reference_pow(x, size)
        }
        CircuitKind::Cubic => x * x * x + x + Fr::from(5u64),
    })
}

fn parse_field(name: &str, value: &str) -> Result<Fr> {
    from_decimal(value).ok_or_else(|| eyre!("{name} = `{value}` is not a decimal integer"))
}

/// Proves and verifies `config.prove_runs` times on one backend. Failures are
/// recorded, never returned.
fn run_backend(
    config: &BenchConfig,
    backend: Backend,
    pk: &ProvingKey,
    pvk: &PreparedVerificationKey,
    witness: &Witness,
) -> (Vec<StageRecord>, Option<usize>) {
    let span = tracing::info_span!("backend", %backend);
    let _guard = span.enter();

    let mut records = Vec::with_capacity(2 * config.prove_runs);
    let mut proof_size = None;
    let record = |stage, run, elapsed, status| StageRecord {
        stage,
        backend: Some(backend),
        run,
        elapsed,
        status,
    };

    for run in 0..config.prove_runs {
        // The last run is the warm one; that is the run worth profiling.
        let profile = config.profile && run + 1 == config.prove_runs;
        let options = ProveOptions::new(backend).with_profile(profile);
        let (proved, elapsed) = timed(|| pipeline::prove_with(pk, witness, &options));
        let proof = match proved {
            Ok(proof) => proof,
            Err(err) => {
                tracing::warn!(%backend, run, error = %err, "prove failed");
                let unavailable = matches!(err, ProvingError::BackendUnavailable(_));
                records.push(record(
                    Stage::Prove,
                    run,
                    elapsed,
                    StageStatus::Failed(err.to_string()),
                ));
                if unavailable {
                    break;
                }
                continue;
            }
        };
        tracing::info!(%backend, run, seconds = elapsed.as_secs_f64(), "prove complete");
        records.push(record(
            Stage::Prove,
            run,
            elapsed,
            budget_status(config, elapsed),
        ));
        proof_size = Some(proof.to_bytes().len());

        let (verified, elapsed) =
            timed(|| pipeline::verify_prepared(pvk, &proof, witness.public_inputs()));
        let status = match verified {
            Ok(true) => budget_status(config, elapsed),
            Ok(false) => StageStatus::Failed("proof rejected".to_string()),
            Err(err) => StageStatus::Failed(err.to_string()),
        };
        tracing::info!(%backend, run, seconds = elapsed.as_secs_f64(), %status, "verify complete");
        records.push(record(Stage::Verify, run, elapsed, status));
    }
    (records, proof_size)
}

/// Runs one benchmark.
///
/// Compile, setup and witness generation are shared by all backends and
/// abort the run on failure. Prove and verify failures are recorded per
/// backend and do not stop the other backend.
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchReport> {
    let span = tracing::info_span!("run_benchmark", bench = %config.bench_name());
    let _guard = span.enter();

    if config.prove_runs == 0 {
        bail!("prove_runs must be at least 1");
    }
    let x = parse_field("x", &config.x)?;

    let mut report = BenchReport {
        bench_name: config.bench_name(),
        exponent: config.exponent,
        ..BenchReport::default()
    };

    let (cs, elapsed) = timed(|| compile_circuit(config));
    let cs = cs.wrap_err("compiling the circuit")?;
    report.num_constraints = cs.num_constraints();
    report.digest = cs.digest_hex();
    report.records.push(shared_record(config, Stage::Compile, elapsed));

    let (keys, elapsed) = timed(|| pipeline::setup_from_entropy(&cs));
    let (pk, vk) = keys.wrap_err("running the trusted setup")?;
    report.records.push(shared_record(config, Stage::Setup, elapsed));

    let y = match &config.y {
        Some(y) => parse_field("y", y)?,
        None => expected_output(config, x)?,
    };
    tracing::info!(x = %to_decimal(&x), y = %to_decimal(&y), "inputs");
    let (witness, elapsed) = timed(|| pipeline::compute_witness(&cs, x, y));
    let witness = witness.wrap_err("computing the witness")?;
    report.records.push(shared_record(config, Stage::Witness, elapsed));

    let pvk = pipeline::prepare_verification_key(&vk);
    let backends = config.backends.backends();
    let results = match backends.as_slice() {
        [first, second] if config.concurrent => {
            let (first, second) = rayon::join(
                || run_backend(config, *first, &pk, &pvk, &witness),
                || run_backend(config, *second, &pk, &pvk, &witness),
            );
            vec![first, second]
        }
        _ => backends
            .iter()
            .map(|backend| run_backend(config, *backend, &pk, &pvk, &witness))
            .collect(),
    };
    for (records, proof_size) in results {
        report.records.extend(records);
        report.proof_size = proof_size.or(report.proof_size);
    }

    Ok(report)
}

/// Runs the benchmark once per exponent in `exponents`.
pub fn run_sweep(config: &BenchConfig, exponents: RangeInclusive<usize>) -> Result<Vec<BenchReport>> {
    let mut reports = Vec::new();
    for exponent in exponents {
        let report = run_benchmark(&config.clone().with_exponent(exponent))?;
        tracing::info!(
            exponent,
            constraints = report.num_constraints,
            proof_bytes = ?report.proof_size,
            verify_seconds = ?report.best_verify_time().map(|d| d.as_secs_f64()),
            "sweep step"
        );
        reports.push(report);
    }
    Ok(reports)
}
