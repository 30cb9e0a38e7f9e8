//! Performance scoring
//!
//! Measured time is compared to the reference time as a ratio:
//! - ratio <= 1.2: full credit
//! - ratio >= 3.0: no credit
//! - in between: linear in the ratio

use std::fmt;

use serde::Serialize;

/// Ratio at or below which a run earns full credit
pub const FULL_CREDIT_RATIO: f64 = 1.2;

/// Ratio at or above which a run earns nothing
pub const ZERO_CREDIT_RATIO: f64 = 3.0;

/// Score a measured time against its reference. Always in `[0, 1]`; input
/// that cannot be compared (NaN) scores 0.
pub fn score(actual_time: f64, reference_time: f64) -> f64 {
    // Boundaries are tested on the times themselves so that exact multiples
    // of the reference land on exactly 1.0 and 0.0.
    if actual_time <= FULL_CREDIT_RATIO * reference_time {
        return 1.0;
    }
    if actual_time >= ZERO_CREDIT_RATIO * reference_time {
        return 0.0;
    }

    let ratio = actual_time / reference_time;
    let raw = (ZERO_CREDIT_RATIO - ratio) / (ZERO_CREDIT_RATIO - FULL_CREDIT_RATIO);
    if !(raw >= 0.0) {
        return 0.0;
    }
    raw.min(1.0)
}

/// Coarse bucket reported next to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Full,
    Partial,
    Zero,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            ScoreTier::Full
        } else if score > 0.0 {
            ScoreTier::Partial
        } else {
            ScoreTier::Zero
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreTier::Full => write!(f, "full credit"),
            ScoreTier::Partial => write!(f, "partial credit"),
            ScoreTier::Zero => write!(f, "no credit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        // ratio 2.1 sits halfway between 1.2 and 3.0
        assert!((score(2.1, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_boundaries_are_exact_for_awkward_references() {
        for r in [0.161911, 0.183667, 1.148824, 3.821544, 7.0 / 3.0] {
            assert_eq!(score(1.2 * r, r), 1.0);
            assert_eq!(score(3.0 * r, r), 0.0);
        }
    }

    #[test]
    fn test_infinite_time_scores_zero() {
        assert_eq!(score(f64::INFINITY, 1.0), 0.0);
    }

    #[test]
    fn test_nan_scores_zero() {
        assert_eq!(score(f64::NAN, 1.0), 0.0);
        assert_eq!(score(1.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ScoreTier::Partial).unwrap(),
            serde_json::json!("partial")
        );
    }

    #[test]
    fn test_tiers() {
        assert_eq!(ScoreTier::from_score(1.0), ScoreTier::Full);
        assert_eq!(ScoreTier::from_score(0.3), ScoreTier::Partial);
        assert_eq!(ScoreTier::from_score(0.0), ScoreTier::Zero);
    }
}
