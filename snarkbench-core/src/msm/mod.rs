use ark_ec::{CurveGroup, ScalarMul};
use ark_ff::{prelude::*, PrimeField};
use ark_std::cmp::Ordering;
use ark_std::vec::Vec;
#[cfg(feature = "icicle")]
use icicle_core::curve::Affine;
use num_integer::Integer;
use rayon::prelude::*;

pub(crate) mod icicle;
use crate::utils::errors::ProvingError;
use crate::utils::math::Math;
pub use icicle::*;

impl<G: CurveGroup + Icicle> VariableBaseMSM for G {}

#[cfg(feature = "icicle")]
pub type GpuBaseType<G: Icicle> = Affine<G::C>;
#[cfg(not(feature = "icicle"))]
pub type GpuBaseType<G: ScalarMul> = G::MulBase;

/// Copy of ark_ec::VariableBaseMSM that picks a bucketing strategy from the
/// bit width of the scalars and can hand wide MSMs to ICICLE.
pub trait VariableBaseMSM: ScalarMul + Icicle {
    /// `sum_i scalars[i] * bases[i]`.
    ///
    /// With `use_icicle`, MSMs over full-width scalars run on the GPU;
    /// narrower ones stay on the CPU paths, which are faster for them.
    fn msm_field_elements(
        bases: &[Self::MulBase],
        gpu_bases: Option<&[GpuBaseType<Self>]>,
        scalars: &[Self::ScalarField],
        use_icicle: bool,
    ) -> Result<Self, ProvingError> {
        if bases.len() != scalars.len() {
            return Err(ProvingError::KeyLength {
                bases: bases.len(),
                scalars: scalars.len(),
            });
        }
        let max_num_bits = scalars
            .par_iter()
            .map(|s| s.into_bigint().num_bits() as usize)
            .max()
            .unwrap_or(0);
        let result = match max_num_bits {
            0 => Self::zero(),
            1 => msm_binary(bases, scalars),
            2..=10 => {
                let scalars_u16 = &map_field_elements_to_u16(scalars);
                msm_small(bases, scalars_u16, max_num_bits)
            }
            11..=64 => {
                let scalars_u64 = &map_field_elements_to_u64(scalars);
                msm_medium(bases, scalars_u64, max_num_bits)
            }
            _ => {
                if use_icicle {
                    #[cfg(feature = "icicle")]
                    {
                        let mut backup = vec![];
                        let gpu_bases = gpu_bases.unwrap_or_else(|| {
                            backup = Self::get_gpu_bases(bases);
                            &backup
                        });
                        return icicle_msm::<Self>(gpu_bases, scalars, max_num_bits);
                    }
                    #[cfg(not(feature = "icicle"))]
                    {
                        let _ = gpu_bases;
                        require_icicle()?;
                    }
                }

                let scalars = scalars
                    .par_iter()
                    .map(|s| s.into_bigint())
                    .collect::<Vec<_>>();
                if Self::NEGATION_IS_CHEAP {
                    msm_bigint_wnaf(bases, &scalars, max_num_bits)
                } else {
                    msm_bigint(bases, &scalars, max_num_bits)
                }
            }
        };
        Ok(result)
    }

    #[tracing::instrument(skip_all, fields(len = bases.len()))]
    fn msm(
        bases: &[Self::MulBase],
        gpu_bases: Option<&[GpuBaseType<Self>]>,
        scalars: &[Self::ScalarField],
        use_icicle: bool,
    ) -> Result<Self, ProvingError> {
        if let Some(gpu_bases) = gpu_bases {
            if gpu_bases.len() != bases.len() {
                return Err(ProvingError::KeyLength {
                    bases: gpu_bases.len(),
                    scalars: bases.len(),
                });
            }
        }
        Self::msm_field_elements(bases, gpu_bases, scalars, use_icicle)
    }

    #[cfg(feature = "icicle")]
    #[tracing::instrument(skip_all)]
    fn get_gpu_bases(bases: &[Self::MulBase]) -> Vec<GpuBaseType<Self>> {
        bases
            .par_iter()
            .map(|base| <Self as Icicle>::from_ark_affine(base))
            .collect()
    }
}

/// Whether an ICICLE device is ready to take MSMs.
pub fn use_icicle() -> bool {
    #[cfg(feature = "icicle")]
    return icicle_init();
    #[cfg(not(feature = "icicle"))]
    false
}

/// Like [`use_icicle`], but reports why the accelerator cannot be used.
pub fn require_icicle() -> Result<(), ProvingError> {
    if use_icicle() {
        return Ok(());
    }
    let reason = if cfg!(feature = "icicle") {
        "no usable CUDA device was found by the ICICLE runtime"
    } else {
        "built without the `icicle` feature"
    };
    Err(ProvingError::BackendUnavailable(reason.to_string()))
}

fn map_field_elements_to_u16<F: PrimeField>(field_elements: &[F]) -> Vec<u16> {
    field_elements
        .par_iter()
        .map(|s| {
            let bigint = s.into_bigint();
            let limbs: &[u64] = bigint.as_ref();
            limbs[0] as u16
        })
        .collect::<Vec<_>>()
}

fn map_field_elements_to_u64<F: PrimeField>(field_elements: &[F]) -> Vec<u64> {
    field_elements
        .par_iter()
        .map(|s| {
            let bigint = s.into_bigint();
            let limbs: &[u64] = bigint.as_ref();
            limbs[0]
        })
        .collect::<Vec<_>>()
}

fn window_size(num_bases: usize) -> usize {
    if num_bases < 32 {
        3
    } else {
        ln_without_floats(num_bases) + 2
    }
}

/// Folds per-window sums from the highest window down, doubling `c` times
/// between windows.
fn combine_windows<V: ScalarMul>(window_sums: &[V], c: usize) -> V {
    let Some((lowest, rest)) = window_sums.split_first() else {
        return V::zero();
    };
    *lowest
        + rest.iter().rev().fold(V::zero(), |mut total, sum_i| {
            total += sum_i;
            for _ in 0..c {
                total.double_in_place();
            }
            total
        })
}

// Compute msm using windowed non-adjacent form
#[tracing::instrument(skip_all)]
fn msm_bigint_wnaf<V: VariableBaseMSM>(
    bases: &[V::MulBase],
    scalars: &[<V::ScalarField as PrimeField>::BigInt],
    max_num_bits: usize,
) -> V {
    let c = window_size(bases.len());

    let num_bits = max_num_bits;
    let digits_count = num_bits.div_ceil(c);
    let scalar_digits = scalars
        .into_par_iter()
        .flat_map_iter(|s| make_digits_bigint(s, c, num_bits))
        .collect::<Vec<_>>();
    let zero = V::zero();
    let window_sums: Vec<_> = (0..digits_count)
        .into_par_iter()
        .map(|i| {
            let mut buckets = vec![zero; 1 << c];
            for (digits, base) in scalar_digits.chunks(digits_count).zip(bases) {
                let scalar = digits[i];
                match 0.cmp(&scalar) {
                    Ordering::Less => buckets[(scalar - 1) as usize] += base,
                    Ordering::Greater => buckets[(-scalar - 1) as usize] -= base,
                    Ordering::Equal => (),
                }
            }

            let mut running_sum = V::zero();
            let mut res = V::zero();
            buckets.into_iter().rev().for_each(|b| {
                running_sum += &b;
                res += &running_sum;
            });
            res
        })
        .collect();

    combine_windows(&window_sums, c)
}

/// Pippenger over full-width scalars, one window at a time.
fn msm_bigint<V: VariableBaseMSM>(
    bases: &[V::MulBase],
    scalars: &[<V::ScalarField as PrimeField>::BigInt],
    max_num_bits: usize,
) -> V {
    let scalars_and_bases_iter = scalars.iter().zip(bases).filter(|(s, _)| !s.is_zero());
    let c = window_size(bases.len());
    let one = V::ScalarField::one().into_bigint();

    let zero = V::zero();
    let window_sums: Vec<_> = (0..max_num_bits)
        .step_by(c)
        .map(|w_start| {
            let mut res = zero;
            // No bucket for zero, so 2^c - 1 buckets.
            let mut buckets = vec![zero; (1 << c) - 1];
            scalars_and_bases_iter.clone().for_each(|(&scalar, base)| {
                if scalar == one {
                    // Unit scalars are only added in the first window.
                    if w_start == 0 {
                        res += base;
                    }
                } else {
                    let mut scalar = scalar;
                    scalar >>= w_start as u32;
                    let scalar = scalar.as_ref()[0] % (1 << c);
                    if scalar != 0 {
                        buckets[(scalar - 1) as usize] += base;
                    }
                }
            });

            // running_sum = sum_{j >= i} bucket[j], walking i downwards
            let mut running_sum = V::zero();
            buckets.into_iter().rev().for_each(|b| {
                running_sum += &b;
                res += &running_sum;
            });
            res
        })
        .collect();

    combine_windows(&window_sums, c)
}

// From: https://github.com/arkworks-rs/gemini/blob/main/src/kzg/msm/variable_base.rs#L20
fn make_digits_bigint(
    a: &impl BigInteger,
    w: usize,
    num_bits: usize,
) -> impl Iterator<Item = i64> + '_ {
    let scalar = a.as_ref();
    let radix: u64 = 1 << w;
    let window_mask: u64 = radix - 1;

    let mut carry = 0u64;
    let num_bits = if num_bits == 0 {
        a.num_bits() as usize
    } else {
        num_bits
    };
    let digits_count = num_bits.div_ceil(w);
    (0..digits_count).map(move |i| {
        let bit_offset = i * w;
        let u64_idx = bit_offset / 64;
        let bit_idx = bit_offset % 64;
        let bit_buf = if bit_idx < 64 - w || u64_idx == scalar.len() - 1 {
            // Window fits in one limb, or this is the last limb.
            scalar[u64_idx] >> bit_idx
        } else {
            (scalar[u64_idx] >> bit_idx) | (scalar[1 + u64_idx] << (64 - bit_idx))
        };
        let coef = carry + (bit_buf & window_mask); // coef = [0, 2^r)

        // Recenter coefficients from [0,2^w) to [-2^w/2, 2^w/2)
        carry = (coef + radix / 2) >> w;
        let mut digit = (coef as i64) - (carry << w) as i64;

        if i == digits_count - 1 {
            digit += (carry << w) as i64;
        }
        digit
    })
}

/// Pippenger over scalars that fit in a u64, windows in parallel.
#[tracing::instrument(skip_all)]
fn msm_medium<V, T>(bases: &[V::MulBase], scalars: &[T], max_num_bits: usize) -> V
where
    V: VariableBaseMSM,
    T: Into<u64> + Zero + Copy + Sync,
{
    let c = window_size(bases.len());
    let zero = V::zero();

    let scalars_and_bases_iter = scalars.iter().zip(bases).filter(|(s, _base)| !s.is_zero());
    let window_sums: Vec<_> = (0..max_num_bits)
        .into_par_iter()
        .step_by(c)
        .map(|w_start| {
            let mut res = zero;
            let mut buckets = vec![zero; (1 << c) - 1];
            scalars_and_bases_iter.clone().for_each(|(&scalar, base)| {
                let scalar: u64 = scalar.into();
                if scalar == 1 {
                    if w_start == 0 {
                        res += base;
                    }
                } else {
                    let scalar = (scalar >> w_start) % (1 << c);
                    if scalar != 0 {
                        buckets[(scalar - 1) as usize] += base;
                    }
                }
            });

            let mut running_sum = V::zero();
            buckets.into_iter().rev().for_each(|b| {
                running_sum += &b;
                res += &running_sum;
            });
            res
        })
        .collect();

    combine_windows(&window_sums, c)
}

#[tracing::instrument(skip_all)]
fn msm_binary<V: VariableBaseMSM>(bases: &[V::MulBase], scalars: &[V::ScalarField]) -> V {
    scalars
        .iter()
        .zip(bases)
        .filter(|(scalar, _base)| !scalar.is_zero())
        .map(|(_scalar, base)| base)
        .fold(V::zero(), |sum, base| sum + base)
}

#[tracing::instrument(skip_all)]
fn msm_small<V, T>(bases: &[V::MulBase], scalars: &[T], max_num_bits: usize) -> V
where
    V: VariableBaseMSM,
    T: Into<u64> + Integer + Copy,
{
    let num_buckets: usize = 1 << max_num_bits;
    let mut buckets: Vec<V> = vec![V::zero(); num_buckets];
    scalars
        .iter()
        .zip(bases)
        .filter(|(scalar, _base)| !scalar.is_zero())
        .for_each(|(scalar, base)| {
            let bucket_index: u64 = (*scalar).into();
            buckets[bucket_index as usize] += base;
        });

    let mut result = V::zero();
    let mut running_sum = V::zero();
    buckets.iter().skip(1).rev().for_each(|bucket| {
        running_sum += bucket;
        result += running_sum;
    });
    result
}

/// The result of this function is only approximately `ln(a)`
/// [`Explanation of usage`]
///
/// [`Explanation of usage`]: https://github.com/scipr-lab/zexe/issues/79#issue-556220473
fn ln_without_floats(a: usize) -> usize {
    // log2(a) * ln(2)
    a.log_2() * 69 / 100
}
