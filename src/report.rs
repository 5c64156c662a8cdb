use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use snarkbench_core::groth16::Backend;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Setup,
    Witness,
    Prove,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Compile => "compile",
            Stage::Setup => "setup",
            Stage::Witness => "witness",
            Stage::Prove => "prove",
            Stage::Verify => "verify",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageStatus {
    Passed,
    Failed(String),
    /// Finished, but took longer than the configured budget.
    OverBudget,
}

impl StageStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, StageStatus::Passed)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Passed => f.write_str("passed"),
            StageStatus::Failed(reason) => write!(f, "failed: {reason}"),
            StageStatus::OverBudget => f.write_str("over-budget"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    /// `None` for the stages shared by every backend.
    pub backend: Option<Backend>,
    /// Zero-based run index within the backend.
    pub run: usize,
    pub elapsed: Duration,
    pub status: StageStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BenchReport {
    pub bench_name: String,
    pub exponent: usize,
    pub num_constraints: usize,
    pub digest: String,
    /// Compressed size of the last proof produced, if any.
    pub proof_size: Option<usize>,
    pub records: Vec<StageRecord>,
}

impl BenchReport {
    pub fn records_for(&self, backend: Backend) -> impl Iterator<Item = &StageRecord> {
        self.records
            .iter()
            .filter(move |record| record.backend == Some(backend))
    }

    /// Whether every prove and verify run of `backend` passed.
    pub fn backend_passed(&self, backend: Backend) -> bool {
        let mut records = self.records_for(backend).peekable();
        records.peek().is_some() && records.all(|record| record.status.is_passed())
    }

    pub fn all_passed(&self) -> bool {
        self.records.iter().all(|record| record.status.is_passed())
    }

    /// Fastest passing verify, for comparing sizes in a sweep.
    pub fn best_verify_time(&self) -> Option<Duration> {
        self.records
            .iter()
            .filter(|record| record.stage == Stage::Verify && record.status.is_passed())
            .map(|record| record.elapsed)
            .min()
    }

    pub fn csv_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| {
                format!(
                    "{},{},{},{},{},{:.4},{}",
                    self.bench_name,
                    self.exponent,
                    record.stage,
                    record
                        .backend
                        .map_or_else(|| "-".to_string(), |backend| backend.to_string()),
                    record.run,
                    record.elapsed.as_secs_f64(),
                    record.status.to_string().replace(',', ";"),
                )
            })
            .collect()
    }

    /// Writes `<bench_name>.csv` under `dir` and appends the same lines to
    /// `dir/timings.csv`.
    pub fn write_csv(&self, dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let mut body = self.csv_lines().join("\n");
        body.push('\n');

        fs::write(dir.join(format!("{}.csv", self.bench_name)), &body)?;
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("timings.csv"))
            .and_then(|mut f| f.write_all(body.as_bytes()))
    }

    pub fn log_summary(&self) {
        tracing::info!(
            bench = %self.bench_name,
            constraints = self.num_constraints,
            digest = %self.digest,
            proof_bytes = ?self.proof_size,
            "benchmark summary"
        );
        for record in &self.records {
            let backend = record
                .backend
                .map_or_else(|| "-".to_string(), |backend| backend.to_string());
            tracing::info!(
                "  {:<8} {:<12} run {} {:>10.3}s  {}",
                record.stage.to_string(),
                backend,
                record.run,
                record.elapsed.as_secs_f64(),
                record.status
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stage: Stage, backend: Option<Backend>, status: StageStatus) -> StageRecord {
        StageRecord {
            stage,
            backend,
            run: 0,
            elapsed: Duration::from_millis(1500),
            status,
        }
    }

    fn report() -> BenchReport {
        BenchReport {
            bench_name: "power-chain_4".to_string(),
            exponent: 4,
            num_constraints: 17,
            digest: "00".to_string(),
            proof_size: Some(128),
            records: vec![
                record(Stage::Compile, None, StageStatus::Passed),
                record(Stage::Prove, Some(Backend::Reference), StageStatus::Passed),
                record(Stage::Verify, Some(Backend::Reference), StageStatus::Passed),
                record(
                    Stage::Prove,
                    Some(Backend::Accelerated),
                    StageStatus::Failed("no device, sorry".to_string()),
                ),
            ],
        }
    }

    #[test]
    fn backend_status_is_tracked_separately() {
        let report = report();
        assert!(report.backend_passed(Backend::Reference));
        assert!(!report.backend_passed(Backend::Accelerated));
        assert!(!report.all_passed());
        assert_eq!(report.best_verify_time(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn csv_lines_escape_commas() {
        let lines = report().csv_lines();
        assert_eq!(lines[0], "power-chain_4,4,compile,-,0,1.5000,passed");
        assert_eq!(
            lines[3],
            "power-chain_4,4,prove,accelerated,0,1.5000,failed: no device; sorry"
        );
    }

    #[test]
    fn write_csv_appends_to_timings() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        report.write_csv(dir.path()).unwrap();
        report.write_csv(dir.path()).unwrap();

        let individual = fs::read_to_string(dir.path().join("power-chain_4.csv")).unwrap();
        assert_eq!(individual.lines().count(), 4);
        let timings = fs::read_to_string(dir.path().join("timings.csv")).unwrap();
        assert_eq!(timings.lines().count(), 8);
    }
}
