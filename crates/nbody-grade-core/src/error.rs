//! Error types and exit codes for nbody-grade
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (simulator crashed, timed out, log unreadable, ...)
//! - 2: Usage error (bad selection parameters, unknown scene)
//! - 3: Validation failure (particle output does not match the reference)
//!
//! Every error is fatal for a grading session. There is no retry path.

mod macros;

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes reported by the `nbody-grade` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Output did not validate against the reference (3)
    Validation = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Reasons a simulator output file is rejected.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("number of particles is {actual}, should be {expected}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("invalid format at line {line}, should contain {expected_fields} floats (found {actual_fields})")]
    Format {
        line: usize,
        expected_fields: usize,
        actual_fields: usize,
    },

    #[error("invalid format at line {line}: field {field} is not a float: {token:?}")]
    Unparseable {
        line: usize,
        field: usize,
        token: String,
    },

    #[error("incorrect result at line {line}: field {field} is {actual}, expected {expected} (threshold {threshold})")]
    ValueMismatch {
        line: usize,
        field: usize,
        actual: f64,
        expected: f64,
        threshold: f64,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ValidationError {
    /// Stable identifier used in JSON error envelopes
    pub fn error_type(&self) -> &'static str {
        match self {
            ValidationError::CountMismatch { .. } => "count_mismatch",
            ValidationError::Format { .. } | ValidationError::Unparseable { .. } => {
                "format_error"
            }
            ValidationError::ValueMismatch { .. } => "value_mismatch",
            ValidationError::Io { .. } => "io_error",
        }
    }
}

/// Errors that can occur during a grading session
#[derive(Error, Debug)]
pub enum GradeError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    Usage(String),

    #[error("unknown scene: {name} (known: {known})")]
    UnknownScene { name: String, known: String },

    // Validation errors (exit code 3)
    #[error("{scene}: {source}")]
    Validation {
        scene: String,
        #[source]
        source: ValidationError,
    },

    // Generic failures (exit code 1)
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid config {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("nbody exited with errors on {scene} with {workers} workers (exit code {exit_code})")]
    Process {
        scene: String,
        workers: u32,
        exit_code: i32,
    },

    #[error("nbody did not finish {scene} with {workers} workers within {secs}s")]
    Timeout {
        scene: String,
        workers: u32,
        secs: u64,
    },

    #[error("grading interrupted")]
    Interrupted,

    #[error("no 'total simulation time' marker in {log_path:?}")]
    TimingMarkerMissing { log_path: PathBuf },

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl GradeError {
    /// Create an IO error that remembers which path was involved
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GradeError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Attach the scene name to a validator failure
    pub fn validation(scene: impl Into<String>, source: ValidationError) -> Self {
        GradeError::Validation {
            scene: scene.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            GradeError::Usage(_) | GradeError::UnknownScene { .. } => ExitCode::Usage,

            GradeError::Validation { .. } => ExitCode::Validation,

            GradeError::InvalidCatalog(_)
            | GradeError::Config { .. }
            | GradeError::Io { .. }
            | GradeError::Spawn { .. }
            | GradeError::Process { .. }
            | GradeError::Timeout { .. }
            | GradeError::Interrupted
            | GradeError::TimingMarkerMissing { .. }
            | GradeError::Json(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            GradeError::Usage(_) => "usage_error",
            GradeError::UnknownScene { .. } => "unknown_scene",
            GradeError::Validation { source, .. } => source.error_type(),
            GradeError::InvalidCatalog(_) => "invalid_catalog",
            GradeError::Config { .. } => "config_error",
            GradeError::Io { .. } => "io_error",
            GradeError::Spawn { .. } => "spawn_error",
            GradeError::Process { .. } => "process_error",
            GradeError::Timeout { .. } => "timeout",
            GradeError::Interrupted => "interrupted",
            GradeError::TimingMarkerMissing { .. } => "parse_error",
            GradeError::Json(_) => "serialization_error",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error_obj = serde_json::json!({
            "code": self.exit_code() as i32,
            "type": self.error_type(),
            "message": self.to_string(),
        });

        match self {
            GradeError::Validation {
                scene,
                source: ValidationError::ValueMismatch { line, .. },
            }
            | GradeError::Validation {
                scene,
                source: ValidationError::Format { line, .. },
            }
            | GradeError::Validation {
                scene,
                source: ValidationError::Unparseable { line, .. },
            } => {
                error_obj["scene"] = serde_json::json!(scene);
                error_obj["line"] = serde_json::json!(line);
            }
            GradeError::Validation {
                scene,
                source: ValidationError::CountMismatch { expected, actual },
            } => {
                error_obj["scene"] = serde_json::json!(scene);
                error_obj["expected"] = serde_json::json!(expected);
                error_obj["actual"] = serde_json::json!(actual);
            }
            GradeError::Process {
                scene, exit_code, ..
            } => {
                error_obj["scene"] = serde_json::json!(scene);
                error_obj["exit_code"] = serde_json::json!(exit_code);
            }
            _ => {}
        }

        serde_json::json!({ "error": error_obj })
    }
}

/// Result type alias for grading operations
pub type Result<T> = std::result::Result<T, GradeError>;
