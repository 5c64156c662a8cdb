use std::time::Instant;

#[cfg(not(target_arch = "wasm32"))]
use memory_stats::memory_stats;

pub fn report_memory_usage(label: &str) {
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(usage) = memory_stats() {
        tracing::info!(
            "<{}> current memory usage: {:.3} GB",
            label,
            usage.physical_mem as f64 / 1_000_000_000.0
        );
        return;
    }
    tracing::info!("<{}> couldn't get the current memory usage", label);
}

/// Per-phase timing for a single profiled call.
///
/// Disabled profilers are inert, so callers construct one unconditionally
/// from their options and mark phases as they go.
pub struct PhaseProfiler {
    enabled: bool,
    label: &'static str,
    last: Instant,
}

impl PhaseProfiler {
    pub fn new(enabled: bool, label: &'static str) -> Self {
        if enabled {
            report_memory_usage(label);
        }
        Self {
            enabled,
            label,
            last: Instant::now(),
        }
    }

    pub fn phase(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        let elapsed = self.last.elapsed();
        tracing::info!(
            target: "snarkbench::profile",
            call = self.label,
            phase = name,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        );
        report_memory_usage(name);
        self.last = Instant::now();
    }
}
