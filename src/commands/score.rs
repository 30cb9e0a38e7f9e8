//! `nbody-grade score` - score one measured time

use nbody_grade_core::bail_usage;
use nbody_grade_core::error::Result;
use nbody_grade_core::score::{score, ScoreTier};
use serde_json::json;

use crate::commands::dispatch::CommandContext;

pub fn execute(ctx: &CommandContext, actual_secs: f64, reference_secs: f64) -> Result<()> {
    if !reference_secs.is_finite() || reference_secs <= 0.0 {
        bail_usage!(format!(
            "reference time must be a positive number of seconds, got {reference_secs}"
        ));
    }
    if actual_secs.is_nan() || actual_secs < 0.0 {
        bail_usage!(format!(
            "measured time must be a non-negative number of seconds, got {actual_secs}"
        ));
    }

    let value = score(actual_secs, reference_secs);
    let tier = ScoreTier::from_score(value);

    if ctx.is_json() {
        let output = json!({
            "actual_secs": actual_secs,
            "reference_secs": reference_secs,
            "ratio": actual_secs / reference_secs,
            "score": value,
            "tier": tier,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("score: {value:.3} ({tier})");
    }

    Ok(())
}
