//! Checking many units against one environment.

use crate::error::DriverError;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tyre_core::NameTable;
use tyre_diagnostics::DiagnosticCollection;
use tyre_options::CheckerConfig;
use tyre_solver::{ConstraintSystem, Solution, SolveFailure, Solver};
use tyre_traits::{TraitTable, TypeContext};

/// One independently checked group of constraints, such as a function body.
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: String,
    pub system: ConstraintSystem,
}

/// The outcome of checking one unit.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub name: String,
    pub outcome: Result<Solution, SolveFailure>,
}

impl UnitReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.outcome.as_ref().ok()
    }

    /// Errors of a failed unit, or warnings of a solved one.
    pub fn diagnostics(&self, names: &NameTable) -> DiagnosticCollection {
        let mut diagnostics = DiagnosticCollection::new();
        match &self.outcome {
            Ok(solution) => diagnostics.extend_from_slice(solution.diagnostics().diagnostics()),
            Err(failure) => {
                for diagnostic in failure.diagnostics(names) {
                    diagnostics.add(diagnostic);
                }
            }
        }
        diagnostics.sort();
        diagnostics
    }
}

/// An environment and the units checked against it.
pub struct Workspace {
    table: Arc<TraitTable>,
    config: CheckerConfig,
    units: Vec<Unit>,
}

impl Workspace {
    pub fn new(table: TraitTable, config: CheckerConfig) -> Self {
        Self {
            table: Arc::new(table),
            config,
            units: Vec::new(),
        }
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn table(&self) -> &Arc<TraitTable> {
        &self.table
    }

    pub fn names(&self) -> &NameTable {
        self.table.names()
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CheckerConfig {
        &mut self.config
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Solve every unit. Reports come back in unit order whether or not the
    /// units were solved in parallel.
    pub fn check(&self) -> Result<Vec<UnitReport>, DriverError> {
        let start = Instant::now();
        let reports: Vec<UnitReport> = if !self.config.parallel {
            self.units.iter().map(|unit| self.check_unit(unit)).collect()
        } else if let Some(threads) = self.config.threads {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("tyre-worker-{}", i))
                .build()?;
            pool.install(|| self.units.par_iter().map(|unit| self.check_unit(unit)).collect())
        } else {
            self.units.par_iter().map(|unit| self.check_unit(unit)).collect()
        };
        let failed = reports.iter().filter(|r| !r.is_success()).count();
        info!(
            units = reports.len(),
            failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "checked workspace"
        );
        Ok(reports)
    }

    /// Solve a single unit on the current thread.
    pub fn check_unit(&self, unit: &Unit) -> UnitReport {
        let _span = tracing::debug_span!("unit", name = %unit.name).entered();
        let outcome = Solver::new(self.table.as_ref(), self.config.solver.clone()).solve(&unit.system);
        debug!(success = outcome.is_ok(), "unit done");
        UnitReport {
            name: unit.name.clone(),
            outcome,
        }
    }
}
