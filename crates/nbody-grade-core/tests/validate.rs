//! Validator behavior against particle files on disk

use std::fs;
use std::path::{Path, PathBuf};

use nbody_grade_core::error::ValidationError;
use nbody_grade_core::validate::validate;
use tempfile::{tempdir, TempDir};

const REFERENCE: &str = "\
1 10.5 20.25 0.5 -0.5
2 11.5 21.25 0.25 -0.25
1.5 12.5 22.25 0.125 -0.125
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Reference text with a delta added to one field
fn perturbed(line: usize, field: usize, delta: f64) -> String {
    REFERENCE
        .lines()
        .enumerate()
        .map(|(i, l)| {
            let mut fields: Vec<f64> = l.split_whitespace().map(|t| t.parse().unwrap()).collect();
            if i == line {
                fields[field] += delta;
            }
            fields
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .map(|l| l + "\n")
        .collect()
}

fn check(actual: &str, scene: &str) -> Result<(), ValidationError> {
    let dir = tempdir().unwrap();
    let reference = write(&dir, "ref.txt", REFERENCE);
    let actual = write(&dir, "out.txt", actual);
    validate(&actual, &reference, scene).map(|_| ())
}

#[test]
fn test_identical_files_pass() {
    let dir = tempdir().unwrap();
    let reference = write(&dir, "ref.txt", REFERENCE);
    let actual = write(&dir, "out.txt", REFERENCE);
    let summary = validate(&actual, &reference, "corner-50000").unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.threshold, 0.1);
}

#[test]
fn test_one_missing_record_is_count_mismatch() {
    let short: String = REFERENCE.lines().take(2).map(|l| format!("{l}\n")).collect();
    match check(&short, "random-50000") {
        Err(ValidationError::CountMismatch { expected, actual }) => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("expected count mismatch, got {other:?}"),
    }
}

#[test]
fn test_single_bad_field_reports_line_index() {
    match check(&perturbed(2, 3, 0.5), "sparse-50000") {
        Err(ValidationError::ValueMismatch { line, field, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(field, 3);
        }
        other => panic!("expected value mismatch, got {other:?}"),
    }
}

#[test]
fn test_repeat_scene_tolerance() {
    assert!(check(&perturbed(1, 0, 0.5), "repeat-10000").is_ok());
    assert!(matches!(
        check(&perturbed(1, 0, 1.5), "repeat-10000"),
        Err(ValidationError::ValueMismatch { line: 1, .. })
    ));
}

#[test]
fn test_default_scene_tolerance() {
    assert!(check(&perturbed(0, 4, 0.05), "corner-50000").is_ok());
    assert!(matches!(
        check(&perturbed(0, 4, 0.2), "corner-50000"),
        Err(ValidationError::ValueMismatch { line: 0, field: 4, .. })
    ));
}

#[test]
fn test_wrong_field_count_is_format_error() {
    let actual = REFERENCE.replacen("1 10.5 20.25 0.5 -0.5", "1 10.5 20.25 0.5", 1);
    assert!(matches!(
        check(&actual, "corner-50000"),
        Err(ValidationError::Format { line: 0, .. })
    ));
}

#[test]
fn test_non_numeric_field_is_format_error() {
    let actual = REFERENCE.replacen("20.25", "abc", 1);
    assert!(matches!(
        check(&actual, "corner-50000"),
        Err(ValidationError::Unparseable { line: 0, field: 2, .. })
    ));
}

#[test]
fn test_short_file_with_bad_token_is_count_mismatch() {
    match check("1 2 3 4 5\n1 2 x 4 5\n", "random-50000") {
        Err(ValidationError::CountMismatch { expected, actual }) => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("expected count mismatch, got {other:?}"),
    }
}

#[test]
fn test_earlier_value_mismatch_wins_over_later_bad_token() {
    let dir = tempdir().unwrap();
    let reference = write(&dir, "ref.txt", "1 2 3 4 5\n1 2 3 4 5\n");
    let actual = write(&dir, "out.txt", "9 2 3 4 5\n1 2 x 4 5\n");
    assert!(matches!(
        validate(&actual, &reference, "random-50000"),
        Err(ValidationError::ValueMismatch { line: 0, field: 0, .. })
    ));
}

#[test]
fn test_missing_output_is_io_error() {
    let dir = tempdir().unwrap();
    let reference = write(&dir, "ref.txt", REFERENCE);
    let err = validate(Path::new("/nonexistent/out.txt"), &reference, "corner-50000").unwrap_err();
    assert!(matches!(err, ValidationError::Io { .. }));
}
