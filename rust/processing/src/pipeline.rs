// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary pipeline with a cached triangulation
//!
//! The Delaunay triangulation depends only on the point set, so a pipeline
//! keeps it between alpha changes and recomputes only the radius filter and
//! loop assembly.

use alpha_boundary_core::{
    ingest_with_progress, read_entities, BoundaryLoop, CadEntity, NoProgress, PointCloud,
    ReaderConfig, UnsupportedEntity,
};
use alpha_boundary_geometry::{
    boundary_from_triangulation, triangulate, validate_alpha, BoundaryOutcome, Triangulation,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::log_skipped;

/// Figures describing one boundary computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundarySummary {
    pub point_count: usize,
    pub triangle_count: usize,
    pub loop_count: usize,
    /// Vertices of the selected boundary, 0 when none was found
    pub vertex_count: usize,
    pub area: f64,
    pub perimeter: f64,
    pub alpha: f64,
    pub diagnostics: Vec<String>,
}

impl BoundarySummary {
    fn from_outcome(point_count: usize, alpha: f64, outcome: &BoundaryOutcome) -> Self {
        let (vertex_count, area, perimeter) = outcome
            .boundary
            .as_ref()
            .map_or((0, 0.0, 0.0), |b| (b.len(), b.area(), b.perimeter()));

        Self {
            point_count,
            triangle_count: outcome.triangle_count,
            loop_count: outcome.loop_count,
            vertex_count,
            area,
            perimeter,
            alpha,
            diagnostics: outcome.diagnostics.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn has_boundary(&self) -> bool {
        self.vertex_count > 0
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Selected boundary together with its summary
#[derive(Debug, Clone)]
pub struct BoundaryReport {
    pub boundary: Option<BoundaryLoop>,
    pub summary: BoundarySummary,
}

/// Holds one point cloud and reuses its triangulation across alpha values.
#[derive(Debug, Default)]
pub struct BoundaryPipeline {
    cloud: PointCloud,
    triangulation: Option<Triangulation>,
    skipped: Vec<UnsupportedEntity>,
}

impl BoundaryPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cloud(cloud: PointCloud) -> Self {
        Self {
            cloud,
            ..Self::default()
        }
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// Entities skipped by the most recent load
    pub fn skipped(&self) -> &[UnsupportedEntity] {
        &self.skipped
    }

    /// Whether a triangulation is cached for the current cloud
    pub fn is_triangulated(&self) -> bool {
        self.triangulation.is_some()
    }

    /// Replace the point cloud, dropping the cached triangulation.
    pub fn set_cloud(&mut self, cloud: PointCloud) {
        self.cloud = cloud;
        self.triangulation = None;
        self.skipped.clear();
    }

    /// Flatten `entities` into a new point cloud. Returns the number of points.
    pub fn load_entities(&mut self, entities: &[CadEntity]) -> usize {
        let ingested = ingest_with_progress(entities, &mut NoProgress);
        log_skipped(&ingested.skipped);
        self.set_cloud(ingested.points);
        self.skipped = ingested.skipped;
        self.cloud.len()
    }

    /// Read a DXF drawing and load its linework. Returns the number of points.
    pub fn load_file(&mut self, path: impl AsRef<Path>, config: &ReaderConfig) -> Result<usize> {
        let path = path.as_ref();
        let entities = read_entities(path, config)?;
        let points = self.load_entities(&entities);
        tracing::info!(
            path = %path.display(),
            entities = entities.len(),
            points,
            "Loaded drawing"
        );
        Ok(points)
    }

    /// Cached triangulation, computed on first use
    pub fn triangulation(&mut self) -> &Triangulation {
        let cloud = &self.cloud;
        self.triangulation.get_or_insert_with(|| triangulate_logged(cloud))
    }

    /// Compute the boundary for `alpha` over the cached triangulation.
    pub fn compute(&mut self, alpha: f64) -> Result<BoundaryReport> {
        validate_alpha(alpha)?;
        let cloud = &self.cloud;
        let triangulation = self
            .triangulation
            .get_or_insert_with(|| triangulate_logged(cloud));

        let outcome = boundary_from_triangulation(cloud, triangulation, alpha)?;
        let summary = BoundarySummary::from_outcome(cloud.len(), alpha, &outcome);

        for diagnostic in &outcome.diagnostics {
            tracing::warn!(%diagnostic, "Boundary diagnostic");
        }
        tracing::info!(
            alpha,
            triangles = summary.triangle_count,
            retained = outcome.retained_triangles,
            loops = summary.loop_count,
            area = summary.area,
            "Computed boundary"
        );

        Ok(BoundaryReport {
            boundary: outcome.boundary,
            summary,
        })
    }
}

fn triangulate_logged(cloud: &PointCloud) -> Triangulation {
    let triangulation = triangulate(cloud);
    tracing::debug!(
        points = cloud.len(),
        triangles = triangulation.len(),
        "Triangulated point cloud"
    );
    triangulation
}
