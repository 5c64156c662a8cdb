#[cfg(not(feature = "icicle"))]
use ark_bn254::G1Projective;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

#[cfg(feature = "icicle")]
pub(crate) mod adapter;
#[cfg(feature = "icicle")]
pub use adapter::*;

static ICICLE_INIT: Once = Once::new();
static ICICLE_READY: AtomicBool = AtomicBool::new(false);

#[cfg(not(feature = "icicle"))]
pub trait Icicle {}
#[cfg(not(feature = "icicle"))]
impl Icicle for G1Projective {}

/// Loads the ICICLE backend and makes the first CUDA device active. Returns
/// whether a device is ready.
///
/// Only the first call does any work; the backend location comes from
/// `ICICLE_BACKEND_INSTALL_DIR`.
#[tracing::instrument()]
pub fn icicle_init() -> bool {
    ICICLE_INIT.call_once(|| {
        #[allow(unused_mut)]
        let mut initialized = false;

        #[cfg(feature = "icicle")]
        match icicle_runtime::load_backend_from_env_or_default() {
            Ok(()) => match icicle_runtime::get_registered_devices() {
                Ok(devices) => {
                    tracing::info!(?devices, "initializing icicle");
                    let device = icicle_runtime::Device::new("CUDA", 0);
                    if icicle_runtime::set_device(&device).is_ok() {
                        tracing::info!(?device, "icicle using device");
                        initialized = true;
                    } else {
                        tracing::warn!("failed to set CUDA device");
                    }
                }
                Err(err) => tracing::warn!(?err, "icicle could not list devices"),
            },
            Err(err) => tracing::warn!(?err, "failed to load icicle backend"),
        }

        if !initialized {
            tracing::debug!("accelerated backend disabled");
        }
        ICICLE_READY.store(initialized, Ordering::Relaxed);
    });

    ICICLE_READY.load(Ordering::Relaxed)
}
