//! Grading session: runs the scene x configuration matrix
//!
//! Cells run strictly one after another, scenes outer and configurations
//! inner. Each cell is run, validated and scored; the first failure ends the
//! session and nothing from earlier cells is kept.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Configuration, Platform, Scene, SimulatorVersion};
use crate::error::{GradeError, Result};
use crate::runner::RunDriver;
use crate::score::score;
use crate::trace_time;
use crate::validate::{validate_with_threshold, ValidationSummary};

/// Progress callbacks for a running session
pub trait CellObserver {
    fn on_cell_start(&mut self, _scene: &Scene, _configuration: &Configuration) {}

    fn on_cell_done(
        &mut self,
        _scene: &Scene,
        _configuration: &Configuration,
        _cell: &CellResult,
    ) {
    }
}

/// Observer that ignores every event
pub struct SilentObserver;

impl CellObserver for SilentObserver {}

/// Measurements for one (scene, configuration) cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellResult {
    pub workers: u32,
    pub elapsed_secs: f64,
    pub reference_secs: f64,
    pub score: f64,
    pub validation: ValidationSummary,
}

/// All cells of one scene, in configuration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneResult {
    pub scene: String,
    pub cells: Vec<CellResult>,
}

impl SceneResult {
    pub fn times(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.elapsed_secs).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.score).collect()
    }
}

/// Final result of a completed session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub version: SimulatorVersion,
    pub platform: Platform,
    pub load_balance: bool,
    pub workers: Vec<u32>,
    pub rows: Vec<SceneResult>,
    pub total_score: f64,
    pub max_score: usize,
    pub generated_at: DateTime<Utc>,
}

/// Clear the session output directory, creating it if needed
pub fn prepare_logs_dir(path: &Path) -> Result<()> {
    if path.exists() {
        for entry in fs::read_dir(path).map_err(|e| GradeError::io("read", path, e))? {
            let entry = entry.map_err(|e| GradeError::io("read", path, e))?;
            let entry_path = entry.path();
            let removed = if entry_path.is_dir() {
                fs::remove_dir_all(&entry_path)
            } else {
                fs::remove_file(&entry_path)
            };
            removed.map_err(|e| GradeError::io("remove", &entry_path, e))?;
        }
    } else {
        fs::create_dir_all(path).map_err(|e| GradeError::io("create", path, e))?;
    }
    debug!(path = %path.display(), "logs directory ready");
    Ok(())
}

/// One grading session over a catalog and a configuration list
pub struct GradingSession {
    catalog: Catalog,
    platform: Platform,
    configurations: Vec<Configuration>,
    driver: RunDriver,
    interrupted: Option<Arc<AtomicBool>>,
}

impl GradingSession {
    /// The catalog must have been built with `configurations.len()` columns.
    pub fn new(
        catalog: Catalog,
        platform: Platform,
        configurations: Vec<Configuration>,
        driver: RunDriver,
    ) -> Result<Self> {
        if let Some((i, row)) = (0..catalog.scenes().len())
            .map(|i| (i, catalog.reference_row(i)))
            .find(|(_, row)| row.len() != configurations.len())
        {
            return Err(GradeError::InvalidCatalog(format!(
                "scene {} has {} reference times for {} configurations",
                catalog.scenes()[i].name,
                row.len(),
                configurations.len()
            )));
        }

        Ok(Self {
            catalog,
            platform,
            configurations,
            driver,
            interrupted: None,
        })
    }

    /// Stop between cells once `flag` becomes true
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    /// Highest attainable total score
    pub fn max_score(&self) -> usize {
        self.catalog.scenes().len() * self.configurations.len()
    }

    fn check_interrupted(&self) -> Result<()> {
        match &self.interrupted {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                warn!("grading interrupted");
                Err(GradeError::Interrupted)
            }
            _ => Ok(()),
        }
    }

    /// Run, validate and score one cell
    fn run_cell(&self, scene_index: usize, config_index: usize) -> Result<CellResult> {
        let scene = &self.catalog.scenes()[scene_index];
        let configuration = &self.configurations[config_index];
        let start = Instant::now();

        let artifact = self.driver.run(scene, configuration)?;

        let reference_file = scene.reference_file(self.driver.benchmark_dir());
        let validation =
            validate_with_threshold(&artifact.output_path, &reference_file, scene.tolerance())
                .map_err(|e| GradeError::validation(&scene.name, e))?;

        let reference_secs = self.catalog.reference_time(scene_index, config_index);
        let cell_score = score(artifact.elapsed_secs, reference_secs);

        trace_time!(start, "cell", scene = scene.name.as_str());

        Ok(CellResult {
            workers: configuration.workers,
            elapsed_secs: artifact.elapsed_secs,
            reference_secs,
            score: cell_score,
            validation,
        })
    }

    /// Run the full matrix. The logs directory is cleared first.
    pub fn run_all(&self, observer: &mut dyn CellObserver) -> Result<SessionReport> {
        prepare_logs_dir(self.driver.logs_dir())?;

        let mut rows = Vec::with_capacity(self.catalog.scenes().len());
        let mut total_score = 0.0;

        for (scene_index, scene) in self.catalog.scenes().iter().enumerate() {
            let mut cells = Vec::with_capacity(self.configurations.len());

            for (config_index, configuration) in self.configurations.iter().enumerate() {
                self.check_interrupted()?;
                observer.on_cell_start(scene, configuration);

                let cell = self.run_cell(scene_index, config_index)?;
                info!(
                    scene = %scene.name,
                    workers = configuration.workers,
                    elapsed_secs = cell.elapsed_secs,
                    score = cell.score,
                    "cell graded"
                );

                observer.on_cell_done(scene, configuration, &cell);
                total_score += cell.score;
                cells.push(cell);
            }

            rows.push(SceneResult {
                scene: scene.name.clone(),
                cells,
            });
        }

        Ok(SessionReport {
            version: self.catalog.version(),
            platform: self.platform,
            load_balance: self.configurations.iter().any(|c| c.load_balance),
            workers: self.configurations.iter().map(|c| c.workers).collect(),
            rows,
            total_score,
            max_score: self.max_score(),
            generated_at: Utc::now(),
        })
    }
}
