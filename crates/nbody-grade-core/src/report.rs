//! Rendering of session results
//!
//! Human output is two fixed-width tables (elapsed times, scores) followed by
//! the total score line. JSON output is the serialized [`SessionReport`].

use std::fmt::Display;

use crate::session::SessionReport;

/// Width of every table cell
pub const CELL_WIDTH: usize = 15;

fn cell(value: impl Display) -> String {
    format!(" {:<width$} ", value.to_string(), width = CELL_WIDTH)
}

/// Shortest round-trip float text: `1.0`, `0.283333`, `1e-05`, `1.5e+16`.
/// Exponents always carry a sign and at least two digits.
pub fn number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Render one table: header row, dashed rule, then one row per entry
pub fn render_table<S: Display>(header: &[String], rows: &[(String, Vec<S>)]) -> String {
    let header_line = header
        .iter()
        .map(cell)
        .collect::<Vec<_>>()
        .join("|");

    let mut out = String::new();
    out.push_str(&header_line);
    out.push('\n');
    out.push_str(&"-".repeat(header_line.chars().count()));
    out.push('\n');

    for (name, values) in rows {
        let line = std::iter::once(cell(name))
            .chain(values.iter().map(cell))
            .collect::<Vec<_>>()
            .join("|");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Header shared by both tables
fn header(report: &SessionReport) -> Vec<String> {
    std::iter::once("Scene Name".to_string())
        .chain(report.workers.iter().map(|w| w.to_string()))
        .collect()
}

/// Elapsed-time table
pub fn render_times(report: &SessionReport) -> String {
    let rows: Vec<(String, Vec<String>)> = report
        .rows
        .iter()
        .map(|r| (r.scene.clone(), r.times().into_iter().map(number).collect()))
        .collect();
    render_table(&header(report), &rows)
}

/// Score table
pub fn render_scores(report: &SessionReport) -> String {
    let rows: Vec<(String, Vec<String>)> = report
        .rows
        .iter()
        .map(|r| (r.scene.clone(), r.scores().into_iter().map(number).collect()))
        .collect();
    render_table(&header(report), &rows)
}

/// Full human-readable summary
pub fn render_human(report: &SessionReport) -> String {
    let mut out = String::new();
    out.push_str("\n-- Performance Table ---\n");
    out.push_str(&render_times(report));
    out.push_str("\n-- Score Table ---\n");
    out.push_str(&render_scores(report));
    out.push_str(&format!(
        "total score: {}/{}\n",
        number(report.total_score),
        report.max_score
    ));
    out
}

/// Machine-readable summary
pub fn render_json(report: &SessionReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_are_fixed_width() {
        let table = render_table(
            &["Scene Name".to_string(), "4".to_string()],
            &[("corner-50000".to_string(), vec![number(1.5)])],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], " Scene Name      | 4               ");
        assert_eq!(lines[1], "-".repeat(35));
        assert_eq!(lines[2], " corner-50000    | 1.5             ");
    }

    #[test]
    fn test_number_keeps_decimal_point() {
        assert_eq!(number(1.0), "1.0");
        assert_eq!(number(0.283333), "0.283333");
    }

    #[test]
    fn test_number_exponent_form() {
        assert_eq!(number(1e-5), "1e-05");
        assert_eq!(number(2.5e-7), "2.5e-07");
        assert_eq!(number(1e16), "1e+16");
        assert_eq!(number(1.5e123), "1.5e+123");
        assert_eq!(number(0.0001), "0.0001");
        assert_eq!(number(f64::NAN), "nan");
        assert_eq!(number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_long_values_are_not_truncated() {
        let table = render_table(
            &["Scene Name".to_string()],
            &[("a-very-long-scene-name".to_string(), Vec::<f64>::new())],
        );
        assert!(table.contains(" a-very-long-scene-name "));
    }
}
