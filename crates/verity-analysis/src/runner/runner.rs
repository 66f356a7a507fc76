//! TestRunner orchestrating discovery → parallel unit evaluation → report.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use verity_core::config::VerityConfig;
use verity_core::errors::RunnerError;

use super::discovery::{discover_units, FixtureUnit};
use super::report::RunReport;
use super::unit::run_unit;
use crate::checks::{builtin_catalog, RuleCatalog};
use crate::engine::RunCancellation;

pub struct TestRunner {
    config: Arc<VerityConfig>,
    catalog: Arc<RuleCatalog>,
    cancellation: RunCancellation,
}

impl TestRunner {
    pub fn new(config: VerityConfig, catalog: RuleCatalog) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            cancellation: RunCancellation::new(),
        }
    }

    /// Runner over the built-in checks.
    pub fn with_builtin_checks(config: VerityConfig) -> Self {
        Self::new(config, builtin_catalog())
    }

    pub fn config(&self) -> &VerityConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Handle for cancelling a run from another thread. Once cancelled, units
    /// that have not started end as `Cancelled` until the handle is reset.
    pub fn cancellation(&self) -> &RunCancellation {
        &self.cancellation
    }

    pub fn discover(&self) -> Result<Vec<FixtureUnit>, RunnerError> {
        discover_units(&self.config, &self.catalog, &self.cancellation)
    }

    /// Discover every unit under the configured roots and verify them.
    pub fn run(&self) -> Result<RunReport, RunnerError> {
        let units = self.discover()?;
        self.run_units(&units)
    }

    /// Verify `units` on the worker pool. Verdicts come back in input order.
    pub fn run_units(&self, units: &[FixtureUnit]) -> Result<RunReport, RunnerError> {
        let started = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.runner.effective_threads())
            .thread_name(|i| format!("verity-worker-{i}"))
            .build()
            .map_err(|e| RunnerError::WorkerPool {
                message: e.to_string(),
            })?;

        let verdicts = pool.install(|| {
            units
                .par_iter()
                .map(|unit| run_unit(unit, &self.config, &self.catalog, &self.cancellation))
                .collect::<Vec<_>>()
        });

        let report = RunReport::from_verdicts(verdicts, started.elapsed().as_millis() as u64);
        tracing::info!(
            units = report.totals.units,
            passed = report.totals.passed,
            failed = report.totals.failed,
            errors = report.totals.errors,
            duration_ms = report.duration_ms,
            "verification run complete"
        );
        Ok(report)
    }
}
