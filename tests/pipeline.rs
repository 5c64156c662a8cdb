use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use snarkbench::{run_sweep, BackendSelection, BenchConfig};
use snarkbench_core::field::{reference_pow, Fr};
use snarkbench_core::groth16::Backend;
use snarkbench_core::pipeline;
use snarkbench_core::utils::errors::{ProvingError, WitnessError};

#[test]
fn five_operations_with_the_default_factor() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let cs = pipeline::compile(5).unwrap();
    let (pk, vk) = pipeline::setup(&cs, &mut rng).unwrap();

    let x = Fr::from(42188824287u64);
    let y = reference_pow(x, 32);
    let witness = pipeline::compute_witness(&cs, x, y).unwrap();
    let proof = pipeline::prove(&pk, &witness, Backend::Reference).unwrap();
    assert!(pipeline::verify(&vk, &proof, &[y]).unwrap());
}

#[test]
fn unsatisfied_assignment_never_reaches_the_prover() {
    let cs = pipeline::compile(2).unwrap();
    let err = pipeline::compute_witness(&cs, Fr::from(3u64), Fr::from(80u64)).unwrap_err();
    assert_eq!(err, WitnessError::UnsatisfiedConstraint { index: 4 });
}

#[test]
fn one_key_pair_serves_many_proofs() {
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let cs = pipeline::compile(3).unwrap();
    let (pk, vk) = pipeline::setup(&cs, &mut rng).unwrap();
    let pvk = pipeline::prepare_verification_key(&vk);

    for x in [2u64, 3, 5] {
        let x = Fr::from(x);
        let y = reference_pow(x, 8);
        let witness = pipeline::compute_witness(&cs, x, y).unwrap();
        let proof = pipeline::prove(&pk, &witness, Backend::Reference).unwrap();
        assert!(pipeline::verify_prepared(&pvk, &proof, &[y]).unwrap());
    }
}

#[cfg(not(feature = "icicle"))]
#[test]
fn accelerated_backend_reports_unavailable() {
    let mut rng = ChaCha20Rng::seed_from_u64(13);
    let cs = pipeline::compile(1).unwrap();
    let (pk, _) = pipeline::setup(&cs, &mut rng).unwrap();
    let witness = pipeline::compute_witness(&cs, Fr::from(3u64), Fr::from(9u64)).unwrap();
    assert!(matches!(
        pipeline::prove(&pk, &witness, Backend::Accelerated),
        Err(ProvingError::BackendUnavailable(_))
    ));
}

#[test]
fn sweep_keeps_proof_size_constant() {
    let config = BenchConfig {
        prove_runs: 1,
        ..BenchConfig::default().with_backends(BackendSelection::Reference)
    };
    let reports = run_sweep(&config, 2..=6).unwrap();
    assert_eq!(reports.len(), 5);
    for (report, exponent) in reports.iter().zip(2..) {
        assert_eq!(report.num_constraints, (1 << exponent) + 1);
        assert_eq!(report.proof_size, Some(128));
        assert!(report.all_passed());
    }
}
