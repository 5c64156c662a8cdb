use sysinfo::System;

/// Machine the benchmark ran on, logged next to the results.
#[derive(Clone, Debug)]
pub struct HostInfo {
    pub os: String,
    pub os_version: String,
    pub host_name: String,
    pub cpus: usize,
    pub total_memory_gb: f64,
}

impl HostInfo {
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or("UNKNOWN".to_string()),
            os_version: System::os_version().unwrap_or("UNKNOWN".to_string()),
            host_name: System::host_name().unwrap_or("UNKNOWN".to_string()),
            cpus: sys.cpus().len(),
            total_memory_gb: sys.total_memory() as f64 / 1_000_000_000.0,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            os = %self.os,
            version = %self.os_version,
            host = %self.host_name,
            cpus = self.cpus,
            ram_gb = %format!("{:.2}", self.total_memory_gb),
            "host"
        );
    }
}
