//! # Sweep over (pH, potential)
//!
//! One independent deck per grid point, written to `<root>/pH_<pH>/V_<V>/input_file.mkm`.
//!
//! Every point gets its own `EnvironmentOverride` over the shared, read-only base tables and
//! assembles a fresh model, so nothing parsed for one point can leak into another. Points run
//! on a `rayon` pool; the output paths are planned (and duplicates removed) before the first
//! write, which leaves every point owning exactly one file.
//!
//! A failing point does not stop the sweep. Its error is recorded in the [`SweepReport`]
//! together with the point, the remaining points carry on.
use super::deck_model::parse_table;
use super::deck_writer::InputDeckWriter;
use super::errors::DeckError;
use super::number_format::{Numeric, float_repr};
use super::value_source::{EnvironmentOverride, StaticTables, TableSource};
use crate::settings::RunSettings;
use indexmap::IndexMap;
use log::{error, info, warn};
use prettytable::{Cell, Row, Table, row};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_SWEEP_ROOT: &str = "multiple_run";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub ph: f64,
    pub potential: f64,
}

impl SweepPoint {
    pub fn new(ph: f64, potential: f64) -> Self {
        Self { ph, potential }
    }

    /// `pH_7.0`
    pub fn ph_dir_name(&self) -> String {
        format!("pH_{}", float_repr(self.ph))
    }

    /// `V_-0.5`
    pub fn potential_dir_name(&self) -> String {
        format!("V_{}", float_repr(self.potential))
    }

    /// Directory of this point under `root`.
    pub fn directory(&self, root: &Path) -> PathBuf {
        root.join(self.ph_dir_name()).join(self.potential_dir_name())
    }
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pH={}, V={}",
            float_repr(self.ph),
            float_repr(self.potential)
        )
    }
}

/// A grid point together with the deck path it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDeck {
    pub point: SweepPoint,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct SweepFailure {
    pub point: SweepPoint,
    pub error: DeckError,
}

impl fmt::Display for SweepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.point, self.error)
    }
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub written: Vec<PlannedDeck>,
    pub failed: Vec<SweepFailure>,
    /// points never started because the sweep was cancelled
    pub cancelled: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len() + self.cancelled.len()
    }

    pub fn print_summary(&self) {
        let mut table = Table::new();
        table.add_row(row!["pH", "V", "status", "deck / error"]);
        for deck in &self.written {
            table.add_row(point_row(&deck.point, "written", &deck.path.display().to_string()));
        }
        for failure in &self.failed {
            table.add_row(point_row(&failure.point, "failed", &failure.error.to_string()));
        }
        for point in &self.cancelled {
            table.add_row(point_row(point, "cancelled", ""));
        }
        table.printstd();
        println!(
            "{} written, {} failed, {} cancelled",
            self.written.len(),
            self.failed.len(),
            self.cancelled.len()
        );
    }
}

fn point_row(point: &SweepPoint, status: &str, detail: &str) -> Row {
    Row::new(vec![
        Cell::new(&float_repr(point.ph)),
        Cell::new(&float_repr(point.potential)),
        Cell::new(status),
        Cell::new(detail),
    ])
}

enum PointOutcome {
    Written,
    Failed(DeckError),
    Cancelled,
}

pub struct SweepOrchestrator {
    base: Arc<StaticTables>,
    settings: RunSettings,
    root: PathBuf,
    cancel: Arc<AtomicBool>,
    writer: InputDeckWriter,
}

impl SweepOrchestrator {
    pub fn new(base: StaticTables, settings: RunSettings, root: impl Into<PathBuf>) -> Self {
        Self {
            base: Arc::new(base),
            settings,
            root: root.into(),
            cancel: Arc::new(AtomicBool::new(false)),
            writer: InputDeckWriter::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Setting the flag stops the sweep before the next point starts.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Cartesian product, pH-major.
    pub fn grid(ph_values: &[f64], potentials: &[f64]) -> Vec<SweepPoint> {
        ph_values
            .iter()
            .flat_map(|&ph| potentials.iter().map(move |&v| SweepPoint::new(ph, v)))
            .collect()
    }

    /// Deck path of every distinct grid point, in grid order. Points that map to the same
    /// directory are generated once.
    pub fn plan(&self, ph_values: &[f64], potentials: &[f64]) -> Result<Vec<PlannedDeck>, DeckError> {
        if let Some(bad) = ph_values
            .iter()
            .chain(potentials.iter())
            .find(|x| !x.is_finite())
        {
            return Err(DeckError::Config(format!(
                "sweep values must be finite, got {}",
                bad
            )));
        }
        let mut planned: IndexMap<PathBuf, SweepPoint> = IndexMap::new();
        for point in Self::grid(ph_values, potentials) {
            let path = point
                .directory(&self.root)
                .join(&self.settings.deck_file_name);
            if planned.contains_key(&path) {
                warn!("duplicate sweep point {} skipped", point);
                continue;
            }
            planned.insert(path, point);
        }
        Ok(planned
            .into_iter()
            .map(|(path, point)| PlannedDeck { point, path })
            .collect())
    }

    fn generate(&self, deck: &PlannedDeck) -> Result<(), DeckError> {
        let source: TableSource = EnvironmentOverride::new(
            Arc::clone(&self.base),
            Numeric::Float(deck.point.ph),
            Numeric::Float(deck.point.potential),
        )
        .into();
        let model = parse_table(&source, &self.settings)?;
        self.writer.write_atomically(&model, &deck.path)
    }

    /// Generates every planned deck. Only a pool or planning problem is returned as `Err`,
    /// per-point failures end up in the report.
    pub fn run(&self, ph_values: &[f64], potentials: &[f64]) -> Result<SweepReport, DeckError> {
        let plan = self.plan(ph_values, potentials)?;
        let workers = self.settings.worker_count();
        info!(
            "sweep of {} points under {} with {} workers",
            plan.len(),
            self.root.display(),
            workers
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| DeckError::Pool(e.to_string()))?;

        let outcomes: Vec<PointOutcome> = pool.install(|| {
            plan.par_iter()
                .map(|deck| {
                    if self.cancel.load(Ordering::SeqCst) {
                        return PointOutcome::Cancelled;
                    }
                    match self.generate(deck) {
                        Ok(()) => PointOutcome::Written,
                        Err(e) => {
                            error!("sweep point {} failed: {}", deck.point, e);
                            PointOutcome::Failed(e)
                        }
                    }
                })
                .collect()
        });

        let mut report = SweepReport::default();
        for (deck, outcome) in plan.into_iter().zip(outcomes) {
            match outcome {
                PointOutcome::Written => report.written.push(deck),
                PointOutcome::Failed(error) => report.failed.push(SweepFailure {
                    point: deck.point,
                    error,
                }),
                PointOutcome::Cancelled => report.cancelled.push(deck.point),
            }
        }
        info!(
            "sweep finished: {} written, {} failed, {} cancelled",
            report.written.len(),
            report.failed.len(),
            report.cancelled.len()
        );
        Ok(report)
    }
}
