use crate::msm::{GpuBaseType, VariableBaseMSM};
use crate::utils::errors::ProvingError;
use ark_bn254::G1Projective;
use ark_ec::{CurveGroup, ScalarMul};
use ark_ff::{BigInteger, Field, PrimeField};
use icicle_bn254::curve::CurveCfg as IcicleBn254;
use icicle_core::curve::{Affine, Curve, Projective};
use icicle_core::{
    msm::{msm, MSMConfig, MSM},
    traits::FieldImpl,
};
use icicle_runtime::stream::IcicleStreamHandle;
use icicle_runtime::{
    memory::{DeviceVec, HostSlice},
    stream::IcicleStream,
};

impl Icicle for G1Projective {
    type C = IcicleBn254;

    fn to_ark_projective(point: &Projective<Self::C>) -> Option<Self> {
        let base = |bytes: Vec<u8>| <Self as CurveGroup>::BaseField::from_random_bytes(&bytes);
        let proj_x = base(point.x.to_bytes_le())?;
        let proj_y = base(point.y.to_bytes_le())?;
        let proj_z = base(point.z.to_bytes_le())?;

        // ICICLE returns homogeneous coordinates, arkworks uses Jacobian ones.
        let proj_x = proj_x * proj_z;
        let proj_y = proj_y * proj_z * proj_z;
        Some(Self::new_unchecked(proj_x, proj_y, proj_z))
    }

    fn from_ark_affine(point: &Self::MulBase) -> Affine<Self::C> {
        let x_bytes: Vec<u8> = point
            .x
            .to_base_prime_field_elements()
            .flat_map(|x| x.into_bigint().to_bytes_le())
            .collect();
        let y_bytes: Vec<u8> = point
            .y
            .to_base_prime_field_elements()
            .flat_map(|x| x.into_bigint().to_bytes_le())
            .collect();
        let x = <Self::C as Curve>::BaseField::from_bytes_le(&x_bytes);
        let y = <Self::C as Curve>::BaseField::from_bytes_le(&y_bytes);
        Affine::<Self::C> { x, y }
    }
}

pub trait Icicle: ScalarMul {
    type C: Curve + MSM<Self::C>;

    // The arkworks conversions shipped with icicle pull in extra trait
    // bounds, so they are reimplemented here.
    fn to_ark_projective(point: &Projective<Self::C>) -> Option<Self>;

    fn from_ark_affine(point: &Self::MulBase) -> Affine<Self::C>;
}

fn device_error(stage: &str, err: impl std::fmt::Debug) -> ProvingError {
    ProvingError::BackendUnavailable(format!("icicle {stage} failed: {err:?}"))
}

#[tracing::instrument(skip_all, name = "icicle_msm")]
pub fn icicle_msm<V>(
    bases: &[GpuBaseType<V>],
    scalars: &[V::ScalarField],
    max_num_bits: usize,
) -> Result<V, ProvingError>
where
    V: VariableBaseMSM,
{
    if scalars.len() > bases.len() {
        return Err(ProvingError::KeyLength {
            bases: bases.len(),
            scalars: scalars.len(),
        });
    }

    let mut bases_slice = DeviceVec::<GpuBaseType<V>>::device_malloc(bases.len())
        .map_err(|e| device_error("malloc", e))?;
    let mut scalars_slice =
        DeviceVec::<<<V as Icicle>::C as Curve>::ScalarField>::device_malloc(scalars.len())
            .map_err(|e| device_error("malloc", e))?;
    // Both sides store BN254 scalars as four little-endian Montgomery limbs.
    let scalars_mont =
        unsafe { &*(scalars as *const _ as *const [<<V as Icicle>::C as Curve>::ScalarField]) };

    let mut stream = IcicleStream::create().map_err(|e| device_error("stream", e))?;

    let span = tracing::span!(tracing::Level::INFO, "copy_to_gpu");
    let _guard = span.enter();
    bases_slice
        .copy_from_host_async(HostSlice::from_slice(bases), &stream)
        .map_err(|e| device_error("copy", e))?;
    scalars_slice
        .copy_from_host_async(HostSlice::from_slice(scalars_mont), &stream)
        .map_err(|e| device_error("copy", e))?;
    drop(_guard);
    drop(span);

    let mut msm_result =
        DeviceVec::<Projective<V::C>>::device_malloc(1).map_err(|e| device_error("malloc", e))?;
    let mut cfg = MSMConfig::default();
    cfg.stream_handle = IcicleStreamHandle::from(&stream);
    cfg.is_async = false;
    cfg.are_scalars_montgomery_form = true;
    cfg.bitsize = max_num_bits as i32;

    let span = tracing::span!(tracing::Level::INFO, "gpu_msm");
    let _guard = span.enter();
    msm(
        &scalars_slice,
        &bases_slice[..scalars.len()],
        &cfg,
        &mut msm_result,
    )
    .map_err(|e| device_error("msm", e))?;
    drop(_guard);
    drop(span);

    let mut msm_host_result = [Projective::<V::C>::zero(); 1];
    msm_result
        .copy_to_host(HostSlice::from_mut_slice(&mut msm_host_result))
        .map_err(|e| device_error("copy", e))?;

    stream
        .synchronize()
        .map_err(|e| device_error("synchronize", e))?;
    stream.destroy().map_err(|e| device_error("stream", e))?;
    V::to_ark_projective(&msm_host_result[0])
        .ok_or_else(|| device_error("result conversion", "point not in the base field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Affine};
    use ark_ec::VariableBaseMSM as ark_VariableBaseMSM;
    use ark_std::UniformRand;
    use rand_core::SeedableRng;
    use rayon::prelude::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn icicle_msm_matches_cpu() {
        if !crate::msm::use_icicle() {
            return;
        }
        let n = 1 << 10;
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(n as u64);
        for _ in 0..4 {
            let scalars: Vec<Fr> = std::iter::repeat_with(|| Fr::rand(&mut rng))
                .take(n)
                .collect();
            let bases: Vec<G1Affine> = std::iter::repeat_with(|| G1Affine::rand(&mut rng))
                .take(n)
                .collect();

            let gpu_bases = bases
                .par_iter()
                .map(|base| <G1Projective as Icicle>::from_ark_affine(base))
                .collect::<Vec<_>>();
            let icicle_res = icicle_msm::<G1Projective>(&gpu_bases, &scalars, 256).unwrap();
            let arkworks_res: G1Projective = ark_VariableBaseMSM::msm(&bases, &scalars).unwrap();
            let no_gpu_res: G1Projective =
                VariableBaseMSM::msm_field_elements(&bases, None, &scalars, false).unwrap();

            assert_eq!(icicle_res, arkworks_res);
            assert_eq!(icicle_res, no_gpu_res);
        }
    }

    #[test]
    #[serial]
    fn scalars_longer_than_bases_are_rejected() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(3);
        let gpu_bases = vec![<G1Projective as Icicle>::from_ark_affine(&G1Affine::rand(&mut rng))];
        let scalars = vec![Fr::rand(&mut rng); 2];
        assert!(matches!(
            icicle_msm::<G1Projective>(&gpu_bases, &scalars, 256),
            Err(ProvingError::KeyLength { bases: 1, scalars: 2 })
        ));
    }
}
