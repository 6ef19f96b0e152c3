// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared boundary extraction pipeline
//!
//! Entry points used by the CLI and by applications embedding the
//! extraction: load linework, compute the dominant alpha-shape boundary and
//! write it back as a closed DXF polyline.
//!
//! ```rust,ignore
//! use alpha_boundary_processing::{load_points, compute_boundary, export_boundary};
//!
//! let cloud = load_points("site.dxf", &Default::default())?;
//! if let Some(boundary) = compute_boundary(&cloud, 0.2)? {
//!     export_boundary(&boundary, "site_boundary.dxf")?;
//! }
//! ```

pub mod error;
pub mod pipeline;
pub mod worker;

use alpha_boundary_core::{ingest_with_progress, read_entities, NoProgress};
use rustc_hash::FxHashMap;
use std::path::Path;

pub use alpha_boundary_core::{
    BoundaryLoop, CadEntity, Ingested, Point2D, PointCloud, ReaderConfig, UnsupportedEntity,
};
pub use alpha_boundary_geometry::{BoundaryConfig, Diagnostic};
pub use error::{Error, Result};
pub use pipeline::{BoundaryPipeline, BoundaryReport, BoundarySummary};
pub use worker::{spawn_ingest, spawn_load, IngestTask};

/// Flatten entities into a point cloud, logging what was skipped.
pub fn ingest(entities: &[CadEntity]) -> PointCloud {
    let ingested = ingest_with_progress(entities, &mut NoProgress);
    log_skipped(&ingested.skipped);
    tracing::debug!(
        entities = entities.len(),
        points = ingested.points.len(),
        "Ingested entities"
    );
    ingested.points
}

/// Read a DXF drawing straight into a point cloud.
pub fn load_points(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<PointCloud> {
    let path = path.as_ref();
    let entities = read_entities(path, config)?;
    let cloud = ingest(&entities);
    tracing::info!(path = %path.display(), points = cloud.len(), "Loaded points");
    Ok(cloud)
}

/// Dominant boundary of `points` for `alpha`; `Ok(None)` when there is none.
pub fn compute_boundary(points: &PointCloud, alpha: f64) -> Result<Option<BoundaryLoop>> {
    let outcome = alpha_boundary_geometry::compute_boundary_detailed(points, alpha)?;
    for diagnostic in &outcome.diagnostics {
        tracing::warn!(%diagnostic, "Boundary diagnostic");
    }
    match &outcome.boundary {
        Some(boundary) => tracing::info!(
            alpha,
            loops = outcome.loop_count,
            vertices = boundary.len(),
            area = boundary.area(),
            "Selected boundary"
        ),
        None => tracing::info!(alpha, points = points.len(), "No boundary found"),
    }
    Ok(outcome.boundary)
}

/// Write `boundary` to `path` as a closed LWPOLYLINE.
pub fn export_boundary(boundary: &BoundaryLoop, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    alpha_boundary_core::export_boundary(boundary, path)?;
    tracing::info!(path = %path.display(), vertices = boundary.len(), "Exported boundary");
    Ok(())
}

pub(crate) fn log_skipped(skipped: &[UnsupportedEntity]) {
    if !skipped.is_empty() {
        tracing::debug!(
            skipped = skipped.len(),
            kinds = ?skipped_kinds(skipped),
            "Skipped entities without linework"
        );
    }
}

/// Skipped entity kinds with their counts, most frequent first.
pub fn skipped_kinds(skipped: &[UnsupportedEntity]) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for entity in skipped {
        *counts.entry(entity.kind.as_str()).or_default() += 1;
    }
    let mut kinds: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(kind, count)| (kind.to_string(), count))
        .collect();
    kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    kinds
}
