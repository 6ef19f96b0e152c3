// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alpha-Boundary Geometry
//!
//! Alpha-shape boundary extraction for 2D point clouds:
//! 1. Delaunay triangulation (incremental Bowyer-Watson)
//! 2. Circumradius filtering against `1 / alpha`
//! 3. Boundary edge chaining into closed loops
//! 4. Selection of the loop with the largest enclosed area
//!
//! # Usage
//!
//! ```rust,ignore
//! use alpha_boundary_geometry::compute_boundary;
//!
//! if let Some(boundary) = compute_boundary(&cloud, 0.2)? {
//!     println!("{} vertices, area {}", boundary.len(), boundary.area());
//! }
//! ```

pub mod alpha;
pub mod error;
pub mod selector;
pub mod triangulation;

pub use alpha::{alpha_filter, assemble_loops, count_edges, validate_alpha, BoundaryResult, Edge};
pub use alpha_boundary_core::{BoundaryLoop, Point2D, PointCloud};
pub use error::{Diagnostic, Error, Result};
pub use selector::{dominant_loop_index, select_loop};
pub use triangulation::{circumcircle, triangulate, Triangle, Triangulation, MIN_POINTS};

/// Parameters of a boundary computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConfig {
    /// Alpha value; `0` reproduces the convex hull
    pub alpha: f64,
}

impl BoundaryConfig {
    /// Validated configuration
    pub fn new(alpha: f64) -> Result<Self> {
        Ok(Self {
            alpha: validate_alpha(alpha)?,
        })
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self { alpha: 0.0 }
    }
}

/// Everything one boundary computation produced
#[derive(Debug, Clone, Default)]
pub struct BoundaryOutcome {
    /// Loop with the largest absolute area, if any
    pub boundary: Option<BoundaryLoop>,
    /// Number of loops the filter produced
    pub loop_count: usize,
    /// Triangles in the Delaunay triangulation
    pub triangle_count: usize,
    /// Triangles that passed the radius test
    pub retained_triangles: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute the boundary of `points` for `alpha`.
///
/// Returns `Ok(None)` when no boundary exists (too few points, degenerate
/// input, or alpha so large that every triangle is filtered out). Only an
/// invalid alpha is an error.
pub fn compute_boundary(points: &PointCloud, alpha: f64) -> Result<Option<BoundaryLoop>> {
    Ok(compute_boundary_detailed(points, alpha)?.boundary)
}

/// Like [`compute_boundary`], keeping counts and diagnostics.
pub fn compute_boundary_detailed(points: &PointCloud, alpha: f64) -> Result<BoundaryOutcome> {
    validate_alpha(alpha)?;
    let triangulation = triangulate(points);
    boundary_from_triangulation(points, &triangulation, alpha)
}

/// Run the alpha filter and loop selection over an existing triangulation.
///
/// The triangulation does not depend on alpha, so callers may keep it
/// around while alpha changes.
pub fn boundary_from_triangulation(
    points: &PointCloud,
    triangulation: &Triangulation,
    alpha: f64,
) -> Result<BoundaryOutcome> {
    let result = alpha_filter(points, triangulation, alpha)?;

    let mut diagnostics = triangulation.diagnostics().to_vec();
    diagnostics.extend(result.diagnostics);

    Ok(BoundaryOutcome {
        loop_count: result.loops.len(),
        boundary: select_loop(result.loops),
        triangle_count: triangulation.len(),
        retained_triangles: result.retained_triangles,
        diagnostics,
    })
}
