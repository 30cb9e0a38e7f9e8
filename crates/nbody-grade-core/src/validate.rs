//! Particle output validation
//!
//! Output and reference files are line-oriented: one particle per line, five
//! whitespace-separated floats (mass, position x/y, velocity x/y). Records are
//! compared strictly by position, so the simulator must emit particles in the
//! same order as the reference generator.

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::catalog::tolerance_for;
use crate::error::ValidationError;
use crate::trace_time;

/// Number of numeric fields in every particle record
pub const FIELDS_PER_RECORD: usize = 5;

/// One parsed line of a particle file
pub type Record = Vec<f64>;

/// Outcome of a successful comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    /// Number of particle records compared
    pub records: usize,
    /// Per-field threshold that was applied
    pub threshold: f64,
    /// Largest absolute per-field deviation observed
    pub max_abs_diff: f64,
}

/// Parse one line of a particle file into a record
pub fn parse_line(content: &str, line: usize) -> Result<Record, ValidationError> {
    content
        .split_whitespace()
        .enumerate()
        .map(|(field, token)| {
            token
                .parse::<f64>()
                .map_err(|_| ValidationError::Unparseable {
                    line,
                    field,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Parse particle records from text. Each line becomes one record.
pub fn parse_records(text: &str) -> Result<Vec<Record>, ValidationError> {
    text.lines()
        .enumerate()
        .map(|(line, content)| parse_line(content, line))
        .collect()
}

fn read_text(path: &Path) -> Result<String, ValidationError> {
    fs::read_to_string(path).map_err(|source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a particle file
pub fn read_records(path: &Path) -> Result<Vec<Record>, ValidationError> {
    parse_records(&read_text(path)?)
}

/// Validate `actual` against `reference` using the scene's tolerance policy
pub fn validate(
    actual: &Path,
    reference: &Path,
    scene_name: &str,
) -> Result<ValidationSummary, ValidationError> {
    validate_with_threshold(actual, reference, tolerance_for(scene_name))
}

/// Validate `actual` against `reference` with an explicit per-field threshold
pub fn validate_with_threshold(
    actual: &Path,
    reference: &Path,
    threshold: f64,
) -> Result<ValidationSummary, ValidationError> {
    let start = Instant::now();

    let actual_text = read_text(actual)?;
    let reference_text = read_text(reference)?;

    let summary = compare_text(&actual_text, &reference_text, threshold)?;

    trace_time!(start, "validate", records = summary.records);
    debug!(
        actual = %actual.display(),
        records = summary.records,
        threshold = summary.threshold,
        max_abs_diff = summary.max_abs_diff,
        "output matches reference"
    );

    Ok(summary)
}

fn check_count(actual: usize, reference: usize) -> Result<(), ValidationError> {
    if actual != reference {
        return Err(ValidationError::CountMismatch {
            expected: reference,
            actual,
        });
    }
    Ok(())
}

/// Field count, then every field against `threshold`, for one line.
/// Returns the largest deviation on the line.
fn compare_record(
    line: usize,
    got: &[f64],
    want: &[f64],
    threshold: f64,
) -> Result<f64, ValidationError> {
    if want.len() != FIELDS_PER_RECORD || got.len() != want.len() {
        return Err(ValidationError::Format {
            line,
            expected_fields: FIELDS_PER_RECORD,
            actual_fields: if want.len() != FIELDS_PER_RECORD {
                want.len()
            } else {
                got.len()
            },
        });
    }

    let mut max_abs_diff = 0.0_f64;
    for (field, (a, r)) in got.iter().zip(want).enumerate() {
        let diff = (a - r).abs();
        // NaN never compares below the threshold.
        if !(diff < threshold) {
            return Err(ValidationError::ValueMismatch {
                line,
                field,
                actual: *a,
                expected: *r,
                threshold,
            });
        }
        max_abs_diff = max_abs_diff.max(diff);
    }
    Ok(max_abs_diff)
}

/// Compare particle file contents line by line.
///
/// Line counts are compared before anything is parsed. Each line pair is
/// then parsed and checked in turn, so the first failing line wins whether it
/// holds a bad token, a wrong field count or an out-of-tolerance value.
pub fn compare_text(
    actual: &str,
    reference: &str,
    threshold: f64,
) -> Result<ValidationSummary, ValidationError> {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let reference_lines: Vec<&str> = reference.lines().collect();
    check_count(actual_lines.len(), reference_lines.len())?;

    let mut max_abs_diff = 0.0_f64;
    for (line, (got, want)) in actual_lines.iter().zip(&reference_lines).enumerate() {
        let want = parse_line(want, line)?;
        let got = parse_line(got, line)?;
        max_abs_diff = max_abs_diff.max(compare_record(line, &got, &want, threshold)?);
    }

    Ok(ValidationSummary {
        records: actual_lines.len(),
        threshold,
        max_abs_diff,
    })
}

/// Compare parsed records positionally.
///
/// Checks run in order: record count, then per line the field count, then
/// every field against `threshold`. The first failure wins.
pub fn compare_records(
    actual: &[Record],
    reference: &[Record],
    threshold: f64,
) -> Result<ValidationSummary, ValidationError> {
    check_count(actual.len(), reference.len())?;

    let mut max_abs_diff = 0.0_f64;
    for (line, (got, want)) in actual.iter().zip(reference).enumerate() {
        max_abs_diff = max_abs_diff.max(compare_record(line, got, want, threshold)?);
    }

    Ok(ValidationSummary {
        records: actual.len(),
        threshold,
        max_abs_diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(text: &str) -> Vec<Record> {
        parse_records(text).unwrap()
    }

    #[test]
    fn test_parse_records_splits_on_any_whitespace() {
        let parsed = records("1 2.5\t3 -4 5e-1\n0.1  0.2 0.3 0.4 0.5\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], vec![1.0, 2.5, 3.0, -4.0, 0.5]);
    }

    #[test]
    fn test_parse_records_reports_bad_token() {
        let err = parse_records("1 2 3 4 5\n1 2 x 4 5\n").unwrap_err();
        match err {
            ValidationError::Unparseable { line, field, token } => {
                assert_eq!(line, 1);
                assert_eq!(field, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identical_records_pass() {
        let r = records("1 2 3 4 5\n6 7 8 9 10\n");
        let summary = compare_records(&r, &r, 0.1).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.max_abs_diff, 0.0);
    }

    #[test]
    fn test_count_checked_before_format() {
        let actual = records("1 2 3\n");
        let reference = records("1 2 3 4 5\n1 2 3 4 5\n");
        assert!(matches!(
            compare_records(&actual, &reference, 0.1),
            Err(ValidationError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_reference_with_wrong_field_count_is_format_error() {
        let r = records("1 2 3 4\n");
        assert!(matches!(
            compare_records(&r, &r, 0.1),
            Err(ValidationError::Format {
                line: 0,
                actual_fields: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_actual_field_count_must_match_reference() {
        let actual = records("1 2 3 4 5\n1 2 3 4 5 6\n");
        let reference = records("1 2 3 4 5\n1 2 3 4 5\n");
        assert!(matches!(
            compare_records(&actual, &reference, 0.1),
            Err(ValidationError::Format {
                line: 1,
                actual_fields: 6,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_line_is_format_error() {
        let actual = records("1 2 3 4 5\n\n");
        let reference = records("1 2 3 4 5\n1 2 3 4 5\n");
        assert!(matches!(
            compare_records(&actual, &reference, 0.1),
            Err(ValidationError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn test_threshold_is_strict() {
        let actual = vec![vec![1.0, 0.0, 0.0, 0.0, 0.0]];
        let reference = vec![vec![0.0, 0.0, 0.0, 0.0, 0.0]];
        assert!(compare_records(&actual, &reference, 1.0).is_err());
        assert!(compare_records(&actual, &reference, 1.5).is_ok());
    }

    #[test]
    fn test_nan_fails_as_value_mismatch() {
        let actual = vec![vec![f64::NAN, 0.0, 0.0, 0.0, 0.0]];
        let reference = vec![vec![0.0; 5]];
        assert!(matches!(
            compare_records(&actual, &reference, 1.0),
            Err(ValidationError::ValueMismatch { line: 0, field: 0, .. })
        ));
    }

    #[test]
    fn test_read_records_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("particles.txt");
        fs::write(&path, "1 2 3 4 5\n").unwrap();
        assert_eq!(read_records(&path).unwrap(), vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
    }

    #[test]
    fn test_compare_text_checks_count_before_parsing() {
        let err = compare_text("1 2 x 4 5\n", "1 2 3 4 5\n1 2 3 4 5\n", 0.1).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_max_abs_diff_tracks_largest_deviation() {
        let actual = vec![vec![0.01, 0.0, 0.0, 0.0, 0.0], vec![0.0, -0.04, 0.0, 0.0, 0.0]];
        let reference = vec![vec![0.0; 5], vec![0.0; 5]];
        let summary = compare_records(&actual, &reference, 0.1).unwrap();
        assert!((summary.max_abs_diff - 0.04).abs() < 1e-12);
    }
}
