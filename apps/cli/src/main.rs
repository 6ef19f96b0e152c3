// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: extract the outer boundary of a DXF drawing's linework
//!
//! Reads LINE / POLYLINE / LWPOLYLINE vertices, computes the alpha-shape
//! boundary with the largest area and writes it as a closed LWPOLYLINE.
//!
//! Usage:
//!   alpha-boundary <input.dxf> [options]

mod config;

use alpha_boundary_processing::{export_boundary, spawn_load, BoundaryPipeline, BoundarySummary};
use anyhow::{bail, Context, Result};
use config::{CliConfig, USAGE};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(config) = CliConfig::from_args(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    tracing::info!(
        input = %config.input.display(),
        alpha = config.boundary.alpha,
        "Extracting boundary"
    );

    let mut task = spawn_load(config.input.clone(), config.reader.clone());
    while let Some(percent) = task.next_progress().await {
        tracing::debug!(percent, "Ingesting entities");
    }
    let ingested = task
        .finish()
        .await
        .with_context(|| format!("failed to read {}", config.input.display()))?;
    if !ingested.skipped.is_empty() {
        tracing::info!(
            skipped = ingested.skipped.len(),
            kinds = ?alpha_boundary_processing::skipped_kinds(&ingested.skipped),
            "Ignored entities without linework"
        );
    }

    let mut pipeline = BoundaryPipeline::with_cloud(ingested.points);
    let report = pipeline.compute(config.boundary.alpha)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        print_summary(&report.summary);
    }

    let Some(boundary) = report.boundary else {
        bail!(
            "no boundary found for alpha {} ({} points)",
            config.boundary.alpha,
            report.summary.point_count
        );
    };

    export_boundary(&boundary, &config.output)?;
    if !config.json {
        println!("Boundary written to {}", config.output.display());
    }
    Ok(())
}

fn print_summary(summary: &BoundarySummary) {
    println!("Points:     {}", summary.point_count);
    println!("Triangles:  {}", summary.triangle_count);
    println!("Loops:      {}", summary.loop_count);
    println!("Alpha:      {}", summary.alpha);
    if summary.has_boundary() {
        println!("Vertices:   {}", summary.vertex_count);
        println!("Area:       {:.3}", summary.area);
        println!("Perimeter:  {:.3}", summary.perimeter);
    }
    for diagnostic in &summary.diagnostics {
        println!("Note: {diagnostic}");
    }
}
