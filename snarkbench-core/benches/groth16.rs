use ark_bn254::{Bn254, Fr, G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_std::UniformRand;
use criterion::Criterion;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use snarkbench_core::circuits::PowerChainCircuit;
use snarkbench_core::field::{reference_pow, DEFAULT_FACTOR};
use snarkbench_core::groth16::{self, Backend, ProveOptions};
use snarkbench_core::msm::{icicle_init, use_icicle, VariableBaseMSM};
use snarkbench_core::r1cs::{compile, compute_witness, Assignment};

fn benchmark_msm(c: &mut Criterion, num_vars: usize) {
    let mut rng = ChaCha20Rng::seed_from_u64(num_vars as u64);
    let points: Vec<G1Projective> = std::iter::repeat_with(|| G1Projective::rand(&mut rng))
        .take(1 << num_vars)
        .collect();
    let bases: Vec<G1Affine> = G1Projective::normalize_batch(&points);
    let scalars: Vec<Fr> = std::iter::repeat_with(|| Fr::rand(&mut rng))
        .take(1 << num_vars)
        .collect();

    let mut modes = vec![("CPU", false)];
    if use_icicle() {
        modes.push(("Icicle", true));
    }
    for (mode, icicle) in modes {
        c.bench_function(&format!("msm 2^{num_vars} [mode:{mode}]"), |b| {
            b.iter(|| {
                let msm =
                    <G1Projective as VariableBaseMSM>::msm(&bases, None, &scalars, icicle).unwrap();
                criterion::black_box(msm);
            });
        });
    }
}

fn benchmark_prove(c: &mut Criterion, exponent: usize) {
    let mut rng = ChaCha20Rng::seed_from_u64(exponent as u64);
    let cs = compile(&PowerChainCircuit::new(exponent)).unwrap();
    let (pk, vk) = groth16::setup::<Bn254, _>(&cs, &mut rng).unwrap();
    let x = Fr::from(DEFAULT_FACTOR);
    let y = reference_pow(x, 1 << exponent);
    let inputs = Assignment::new().with("x", x).with("y", y);

    c.bench_function(&format!("witness 2^{exponent}"), |b| {
        b.iter(|| criterion::black_box(compute_witness(&cs, &inputs).unwrap()));
    });

    let witness = compute_witness(&cs, &inputs).unwrap();
    let mut backends = vec![Backend::Reference];
    if use_icicle() {
        backends.push(Backend::Accelerated);
    }
    for backend in backends {
        let options = ProveOptions::new(backend);
        c.bench_function(&format!("prove 2^{exponent} [backend:{backend}]"), |b| {
            b.iter(|| {
                criterion::black_box(groth16::prove(&pk, &witness, &options, &mut rng).unwrap())
            });
        });
    }

    let proof = groth16::prove(&pk, &witness, &ProveOptions::default(), &mut rng).unwrap();
    let pvk = groth16::prepare_verifying_key(&vk);
    c.bench_function(&format!("verify 2^{exponent}"), |b| {
        b.iter(|| criterion::black_box(groth16::verify_prepared(&pvk, &proof, &[y]).unwrap()));
    });
}

fn main() {
    icicle_init();
    let mut criterion = Criterion::default()
        .configure_from_args()
        .sample_size(10)
        .warm_up_time(std::time::Duration::from_secs(3));

    benchmark_msm(&mut criterion, 14);
    benchmark_msm(&mut criterion, 18);

    benchmark_prove(&mut criterion, 12);
    benchmark_prove(&mut criterion, 16);

    criterion.final_summary();
}
