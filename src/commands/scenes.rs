//! `nbody-grade scenes` - show the benchmark catalog for a selection

use nbody_grade_core::catalog::{worker_counts, Catalog, Platform, SimulatorVersion};
use nbody_grade_core::error::Result;
use nbody_grade_core::report::{number, render_table};
use serde_json::json;

use crate::commands::dispatch::CommandContext;

pub fn execute(ctx: &CommandContext, version: SimulatorVersion, platform: Platform) -> Result<()> {
    let catalog = Catalog::builtin(version)?;
    let workers = worker_counts(version, platform);

    if ctx.is_json() {
        let scenes: Vec<_> = catalog
            .scenes()
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                json!({
                    "name": scene.name,
                    "particle_count": scene.particle_count,
                    "space_size": scene.space_size,
                    "iterations": scene.iterations,
                    "tolerance": scene.tolerance(),
                    "reference_secs": catalog.reference_row(i),
                })
            })
            .collect();

        let output = json!({
            "version": version,
            "platform": platform,
            "workers": workers,
            "scenes": scenes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let header: Vec<String> = std::iter::once("Scene Name".to_string())
        .chain(workers.iter().map(|w| w.to_string()))
        .collect();
    let rows: Vec<(String, Vec<String>)> = catalog
        .scenes()
        .iter()
        .enumerate()
        .map(|(i, scene)| {
            let times = catalog
                .reference_row(i)
                .iter()
                .map(|t| number(*t))
                .collect();
            (scene.name.clone(), times)
        })
        .collect();

    println!("reference times for {version} on {platform} (seconds)");
    print!("{}", render_table(&header, &rows));
    Ok(())
}
