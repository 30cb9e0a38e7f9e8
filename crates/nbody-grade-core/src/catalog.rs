//! Benchmark catalog: scenes, worker-count configurations and reference timings
//!
//! A [`Catalog`] is an immutable value built once per grading session. The
//! reference table must have one row per scene and one column per
//! configuration; [`Catalog::new`] enforces that shape so the scorer never
//! indexes out of range.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};
use crate::{bail_catalog, bail_usage};

/// Per-field tolerance for scenes whose name contains "repeat"
pub const REPEAT_TOLERANCE: f64 = 1.0;

/// Per-field tolerance for every other scene
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Number of worker-count configurations per version/platform pair
pub const CONFIGS_PER_PLATFORM: usize = 2;

/// Simulator build under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorVersion {
    V1,
    V2,
}

impl SimulatorVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulatorVersion::V1 => "v1",
            SimulatorVersion::V2 => "v2",
        }
    }
}

impl FromStr for SimulatorVersion {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "v1" => Ok(SimulatorVersion::V1),
            "v2" => Ok(SimulatorVersion::V2),
            other => bail_usage!(format!(
                "unknown simulator version: {other} (expected: v1 or v2)"
            )),
        }
    }
}

impl fmt::Display for SimulatorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine class the grader runs on; selects the worker-count pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ghc,
    Psc,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ghc => "ghc",
            Platform::Psc => "psc",
        }
    }
}

impl FromStr for Platform {
    type Err = GradeError;

    /// Accepts both `ghc` and the dash-prefixed `-ghc` spelling.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('-') {
            "ghc" => Ok(Platform::Ghc),
            "psc" => Ok(Platform::Psc),
            _ => bail_usage!(format!(
                "unknown platform: {s} (expected: ghc or psc)"
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worker counts used for `version` on `platform`.
///
/// Both platforms resolve through this one exhaustive match.
pub fn worker_counts(version: SimulatorVersion, platform: Platform) -> [u32; CONFIGS_PER_PLATFORM] {
    match (platform, version) {
        (Platform::Ghc, SimulatorVersion::V1) => [4, 8],
        (Platform::Ghc, SimulatorVersion::V2) => [1, 4],
        (Platform::Psc, SimulatorVersion::V1) => [16, 128],
        (Platform::Psc, SimulatorVersion::V2) => [16, 121],
    }
}

/// A worker count paired with the load-balancing toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub workers: u32,
    pub load_balance: bool,
}

/// All configurations graded for a version/platform selection, in column order
pub fn configurations(
    version: SimulatorVersion,
    platform: Platform,
    load_balance: bool,
) -> Vec<Configuration> {
    worker_counts(version, platform)
        .into_iter()
        .map(|workers| Configuration {
            workers,
            load_balance,
        })
        .collect()
}

/// A named benchmark case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub particle_count: u64,
    pub space_size: f64,
    pub iterations: u32,
}

impl Scene {
    pub fn new(name: &str, particle_count: u64, space_size: f64, iterations: u32) -> Self {
        Self {
            name: name.to_string(),
            particle_count,
            space_size,
            iterations,
        }
    }

    /// Per-field tolerance applied when validating this scene's output.
    ///
    /// Long low-particle runs accumulate more floating-point divergence, so
    /// "repeat" scenes get the wider threshold.
    pub fn tolerance(&self) -> f64 {
        tolerance_for(&self.name)
    }

    /// Initial particle state fed to the simulator
    pub fn init_file(&self, benchmark_dir: &Path) -> PathBuf {
        benchmark_dir.join(format!("{}-init.txt", self.name))
    }

    /// Expected particle state after the run
    pub fn reference_file(&self, benchmark_dir: &Path) -> PathBuf {
        benchmark_dir.join(format!("{}-ref.txt", self.name))
    }

    /// Where the simulator writes its final particle state
    pub fn output_file(&self, logs_dir: &Path) -> PathBuf {
        logs_dir.join(format!("{}.txt", self.name))
    }

    /// Where the simulator's stdout is captured
    pub fn log_file(&self, logs_dir: &Path) -> PathBuf {
        logs_dir.join(format!("{}.log", self.name))
    }
}

/// Tolerance policy keyed by scene name
pub fn tolerance_for(scene_name: &str) -> f64 {
    if scene_name.contains("repeat") {
        REPEAT_TOLERANCE
    } else {
        DEFAULT_TOLERANCE
    }
}

/// Reference timings in seconds: `rows[scene][configuration]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTable {
    rows: Vec<Vec<f64>>,
}

impl ReferenceTable {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Built-in reference timings for a simulator version
    pub fn builtin(version: SimulatorVersion) -> Self {
        let rows: &[[f64; CONFIGS_PER_PLATFORM]] = match version {
            SimulatorVersion::V1 => &[
                [0.588422, 0.161911],
                [1.148824, 0.241397],
                [0.183667, 0.136549],
                [0.354411, 0.784285],
                [1.582532, 3.821544],
            ],
            SimulatorVersion::V2 => &[
                [0.819216, 0.176659],
                [3.568420, 0.754285],
                [0.297109, 0.084589],
                [0.335568, 0.100940],
                [1.532440, 0.417115],
            ],
        };
        Self::new(rows.iter().map(|row| row.to_vec()).collect())
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// The built-in benchmark scenes, in grading order
pub fn builtin_scenes() -> Vec<Scene> {
    vec![
        Scene::new("random-50000", 50000, 500.0, 5),
        Scene::new("corner-50000", 50000, 500.0, 5),
        Scene::new("repeat-10000", 10000, 100.0, 50),
        Scene::new("sparse-50000", 50000, 5.0, 50),
        Scene::new("sparse-200000", 200000, 20.0, 50),
    ]
}

/// Scenes plus their reference timings for one simulator version
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    version: SimulatorVersion,
    scenes: Vec<Scene>,
    reference: ReferenceTable,
}

impl Catalog {
    /// Build a catalog, checking that the reference table has exactly one
    /// positive timing per (scene, configuration) cell.
    pub fn new(
        version: SimulatorVersion,
        scenes: Vec<Scene>,
        reference: ReferenceTable,
        config_count: usize,
    ) -> Result<Self> {
        if reference.rows.len() != scenes.len() {
            bail_catalog!(
                "reference table has {} rows for {} scenes",
                reference.rows.len(),
                scenes.len()
            );
        }

        for (scene, row) in scenes.iter().zip(&reference.rows) {
            if scene.particle_count == 0 || scene.iterations == 0 {
                bail_catalog!("scene {} has an empty workload", scene.name);
            }
            if !(scene.space_size > 0.0) {
                bail_catalog!(
                    "scene {} has non-positive space size {}",
                    scene.name,
                    scene.space_size
                );
            }
            if row.len() != config_count {
                bail_catalog!(
                    "scene {} has {} reference times for {} configurations",
                    scene.name,
                    row.len(),
                    config_count
                );
            }
            if let Some(bad) = row.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
                bail_catalog!("scene {} has invalid reference time {}", scene.name, bad);
            }
        }

        Ok(Self {
            version,
            scenes,
            reference,
        })
    }

    /// The built-in catalog for `version`
    pub fn builtin(version: SimulatorVersion) -> Result<Self> {
        Self::new(
            version,
            builtin_scenes(),
            ReferenceTable::builtin(version),
            CONFIGS_PER_PLATFORM,
        )
    }

    pub fn version(&self) -> SimulatorVersion {
        self.version
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Reference timing for a cell. Indices are guaranteed in range for any
    /// scene of this catalog and any configuration counted at construction.
    pub fn reference_time(&self, scene_index: usize, config_index: usize) -> f64 {
        self.reference.rows[scene_index][config_index]
    }

    pub fn reference_row(&self, scene_index: usize) -> &[f64] {
        &self.reference.rows[scene_index]
    }

    /// Restrict the catalog to the named scenes, keeping catalog order.
    /// An empty list keeps every scene.
    pub fn select(self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        for name in names {
            if !self.scenes.iter().any(|s| &s.name == name) {
                return Err(GradeError::UnknownScene {
                    name: name.clone(),
                    known: self
                        .scenes
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }

        let (scenes, rows): (Vec<_>, Vec<_>) = self
            .scenes
            .into_iter()
            .zip(self.reference.rows)
            .filter(|(scene, _)| names.contains(&scene.name))
            .unzip();

        Ok(Self {
            version: self.version,
            scenes,
            reference: ReferenceTable::new(rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("v1".parse::<SimulatorVersion>().unwrap(), SimulatorVersion::V1);
        assert_eq!("v2".parse::<SimulatorVersion>().unwrap(), SimulatorVersion::V2);
        assert!(matches!(
            "v3".parse::<SimulatorVersion>(),
            Err(GradeError::Usage(_))
        ));
    }

    #[test]
    fn test_platform_accepts_dash_prefix() {
        assert_eq!("ghc".parse::<Platform>().unwrap(), Platform::Ghc);
        assert_eq!("-ghc".parse::<Platform>().unwrap(), Platform::Ghc);
        assert_eq!("-psc".parse::<Platform>().unwrap(), Platform::Psc);
        assert!("-xyz".parse::<Platform>().is_err());
    }

    #[test]
    fn test_worker_counts_symmetric_for_both_platforms() {
        assert_eq!(worker_counts(SimulatorVersion::V1, Platform::Ghc), [4, 8]);
        assert_eq!(worker_counts(SimulatorVersion::V2, Platform::Ghc), [1, 4]);
        assert_eq!(worker_counts(SimulatorVersion::V1, Platform::Psc), [16, 128]);
        assert_eq!(worker_counts(SimulatorVersion::V2, Platform::Psc), [16, 121]);
    }

    #[test]
    fn test_configurations_carry_load_balance_flag() {
        let configs = configurations(SimulatorVersion::V1, Platform::Ghc, true);
        assert_eq!(configs.len(), 2);
        assert!(configs.iter().all(|c| c.load_balance));
        assert_eq!(configs[1].workers, 8);
    }

    #[test]
    fn test_tolerance_policy() {
        assert_eq!(tolerance_for("repeat-10000"), 1.0);
        assert_eq!(tolerance_for("corner-50000"), 0.1);
        assert_eq!(Scene::new("my-repeat-case", 1, 1.0, 1).tolerance(), 1.0);
    }

    #[test]
    fn test_builtin_catalog_shape() {
        for version in [SimulatorVersion::V1, SimulatorVersion::V2] {
            let catalog = Catalog::builtin(version).unwrap();
            assert_eq!(catalog.scenes().len(), 5);
            for i in 0..catalog.scenes().len() {
                assert_eq!(catalog.reference_row(i).len(), CONFIGS_PER_PLATFORM);
            }
        }
        let v1 = Catalog::builtin(SimulatorVersion::V1).unwrap();
        assert_eq!(v1.reference_time(1, 0), 1.148824);
    }

    #[test]
    fn test_catalog_rejects_ragged_reference_table() {
        let err = Catalog::new(
            SimulatorVersion::V1,
            vec![Scene::new("a", 10, 1.0, 1)],
            ReferenceTable::new(vec![vec![1.0]]),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, GradeError::InvalidCatalog(_)));
    }

    #[test]
    fn test_catalog_rejects_row_count_mismatch() {
        let err = Catalog::new(
            SimulatorVersion::V1,
            vec![Scene::new("a", 10, 1.0, 1), Scene::new("b", 10, 1.0, 1)],
            ReferenceTable::new(vec![vec![1.0, 1.0]]),
            2,
        )
        .unwrap_err();
        assert!(err.to_string().contains("1 rows for 2 scenes"));
    }

    #[test]
    fn test_catalog_rejects_non_positive_reference() {
        let err = Catalog::new(
            SimulatorVersion::V2,
            vec![Scene::new("a", 10, 1.0, 1)],
            ReferenceTable::new(vec![vec![1.0, 0.0]]),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, GradeError::InvalidCatalog(_)));
    }

    #[test]
    fn test_select_keeps_catalog_order_and_rows() {
        let catalog = Catalog::builtin(SimulatorVersion::V1)
            .unwrap()
            .select(&["sparse-50000".to_string(), "corner-50000".to_string()])
            .unwrap();
        let names: Vec<_> = catalog.scenes().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["corner-50000", "sparse-50000"]);
        assert_eq!(catalog.reference_time(0, 0), 1.148824);
        assert_eq!(catalog.reference_time(1, 1), 0.784285);
    }

    #[test]
    fn test_select_unknown_scene() {
        let err = Catalog::builtin(SimulatorVersion::V1)
            .unwrap()
            .select(&["nope".to_string()])
            .unwrap_err();
        assert!(matches!(err, GradeError::UnknownScene { .. }));
    }

    #[test]
    fn test_scene_paths() {
        let scene = Scene::new("corner-50000", 50000, 500.0, 5);
        assert_eq!(
            scene.init_file(Path::new("src/benchmark-files")),
            PathBuf::from("src/benchmark-files/corner-50000-init.txt")
        );
        assert_eq!(
            scene.log_file(Path::new("logs")),
            PathBuf::from("logs/corner-50000.log")
        );
    }
}
