// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alpha filtering and boundary loop assembly
//!
//! A triangle survives when its circumradius is at most `1 / alpha`
//! (`alpha == 0` keeps everything, which yields the convex hull). Edges used
//! by exactly one surviving triangle form the boundary; they are chained
//! into closed loops by following each edge's end vertex to the next unused
//! boundary edge leaving it.

use alpha_boundary_core::{BoundaryLoop, PointCloud};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{Diagnostic, Error, Result};
use crate::triangulation::{Triangle, Triangulation};

/// Undirected edge with the number of retained triangles that use it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Smaller point index
    pub a: usize,
    /// Larger point index
    pub b: usize,
    pub count: u32,
    /// Direction with the first retained triangle that used it on the left
    directed: (usize, usize),
}

impl Edge {
    pub fn is_boundary(&self) -> bool {
        self.count == 1
    }
}

/// Loops produced by one filtering pass, in traversal order
#[derive(Debug, Clone, Default)]
pub struct BoundaryResult {
    pub loops: Vec<BoundaryLoop>,
    /// Number of triangles that passed the radius test
    pub retained_triangles: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BoundaryResult {
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Check that alpha is a finite, non-negative number
pub fn validate_alpha(alpha: f64) -> Result<f64> {
    if alpha.is_finite() && alpha >= 0.0 {
        Ok(alpha)
    } else {
        Err(Error::InvalidAlpha(alpha))
    }
}

/// Largest circumradius a retained triangle may have
pub fn radius_threshold(alpha: f64) -> f64 {
    if alpha == 0.0 {
        f64::INFINITY
    } else {
        1.0 / alpha
    }
}

/// Triangles of `triangulation` whose circumradius passes the alpha test
pub fn retained_triangles(triangulation: &Triangulation, alpha: f64) -> Result<Vec<&Triangle>> {
    let threshold = radius_threshold(validate_alpha(alpha)?);
    Ok(triangulation
        .triangles()
        .iter()
        .filter(|t| alpha == 0.0 || t.circumradius <= threshold)
        .collect())
}

/// Count edge usage across triangles, in first-seen order
pub fn count_edges(triangles: &[&Triangle]) -> Vec<Edge> {
    let mut index: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut edges: Vec<Edge> = Vec::with_capacity(triangles.len() * 2);

    for t in triangles {
        for (from, to) in t.edges() {
            let key = (from.min(to), from.max(to));
            match index.get(&key) {
                Some(&i) => edges[i].count += 1,
                None => {
                    index.insert(key, edges.len());
                    edges.push(Edge {
                        a: key.0,
                        b: key.1,
                        count: 1,
                        directed: (from, to),
                    });
                }
            }
        }
    }

    edges
}

/// Filter a triangulation by alpha and assemble the boundary loops.
pub fn alpha_filter(
    cloud: &PointCloud,
    triangulation: &Triangulation,
    alpha: f64,
) -> Result<BoundaryResult> {
    let retained = retained_triangles(triangulation, alpha)?;
    let mut result = BoundaryResult {
        retained_triangles: retained.len(),
        ..Default::default()
    };
    if retained.is_empty() {
        return Ok(result);
    }

    let boundary: Vec<(usize, usize)> = count_edges(&retained)
        .into_iter()
        .filter(Edge::is_boundary)
        .map(|e| e.directed)
        .collect();

    let (cycles, diagnostics) = assemble_loops(&boundary);
    result.diagnostics = diagnostics;
    result.loops = cycles
        .into_iter()
        .map(|cycle| BoundaryLoop::new(cycle.iter().map(|&i| cloud.points()[i]).collect()))
        .collect();

    Ok(result)
}

/// Chain directed boundary edges into closed vertex cycles.
///
/// At a vertex with several unused outgoing edges the lowest-index edge is
/// taken. Whenever the walk returns to a vertex already on the current path
/// the enclosed cycle is split off, so every emitted cycle is simple.
pub fn assemble_loops(boundary: &[(usize, usize)]) -> (Vec<Vec<usize>>, Vec<Diagnostic>) {
    let mut outgoing: FxHashMap<usize, SmallVec<[usize; 2]>> = FxHashMap::default();
    let mut incoming: FxHashMap<usize, u32> = FxHashMap::default();
    for (i, &(from, to)) in boundary.iter().enumerate() {
        outgoing.entry(from).or_default().push(i);
        *incoming.entry(to).or_default() += 1;
    }

    let mut diagnostics = Vec::new();
    let pinched = outgoing.values().filter(|edges| edges.len() > 1).count();
    if pinched > 0 {
        diagnostics.push(Diagnostic::DegenerateGeometry(format!(
            "boundary touches itself at {pinched} vertices"
        )));
    }

    let mut visited = vec![false; boundary.len()];
    let mut cycles = Vec::new();
    let mut dangling = 0usize;

    for seed in 0..boundary.len() {
        if visited[seed] {
            continue;
        }

        let mut path: Vec<usize> = Vec::new();
        let mut position: FxHashMap<usize, usize> = FxHashMap::default();
        let mut current = boundary[seed].0;

        loop {
            match position.get(&current) {
                Some(&k) => {
                    let cycle = path.split_off(k);
                    for v in &cycle[1..] {
                        position.remove(v);
                    }
                    path.push(current);
                    if cycle.len() >= 3 {
                        cycles.push(cycle);
                    }
                }
                None => {
                    position.insert(current, path.len());
                    path.push(current);
                }
            }

            let next = outgoing
                .get(&current)
                .and_then(|edges| edges.iter().copied().find(|&e| !visited[e]));
            match next {
                Some(e) => {
                    visited[e] = true;
                    current = boundary[e].1;
                }
                None => break,
            }
        }

        if path.len() > 1 {
            dangling += path.len() - 1;
        }
    }

    let unbalanced = incoming
        .iter()
        .filter(|&(v, &n)| outgoing.get(v).map_or(0, |e| e.len()) != n as usize)
        .count();
    if dangling > 0 || unbalanced > 0 {
        diagnostics.push(Diagnostic::DegenerateGeometry(format!(
            "{dangling} boundary edges do not close into a loop"
        )));
    }

    (cycles, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::triangulate;
    use alpha_boundary_core::Point2D;

    fn cloud(coords: &[(f64, f64)]) -> PointCloud {
        coords.iter().map(|&(x, y)| Point2D::new(x, y)).collect()
    }

    #[test]
    fn alpha_validation() {
        assert!(validate_alpha(0.0).is_ok());
        assert!(validate_alpha(2.5).is_ok());
        assert_eq!(validate_alpha(-1.0), Err(Error::InvalidAlpha(-1.0)));
        assert!(validate_alpha(f64::NAN).is_err());
        assert!(validate_alpha(f64::INFINITY).is_err());
    }

    #[test]
    fn zero_alpha_has_no_radius_limit() {
        assert!(radius_threshold(0.0).is_infinite());
        assert_eq!(radius_threshold(4.0), 0.25);
    }

    #[test]
    fn shared_edges_are_interior() {
        let pts = cloud(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)]);
        let tri = triangulate(&pts);
        let all: Vec<&Triangle> = tri.triangles().iter().collect();
        let edges = count_edges(&all);

        assert_eq!(edges.len(), 8);
        assert_eq!(edges.iter().filter(|e| e.is_boundary()).count(), 4);
        for e in edges.iter().filter(|e| !e.is_boundary()) {
            assert_eq!(e.count, 2);
            assert!(e.a == 4 || e.b == 4);
        }
    }

    #[test]
    fn radius_exactly_at_threshold_is_kept() {
        let pts = cloud(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)]);
        let tri = triangulate(&pts);
        // Every fan triangle has circumradius 0.5
        let kept = retained_triangles(&tri, 2.0).unwrap();
        assert_eq!(kept.len(), 4);
        let dropped = retained_triangles(&tri, 2.5).unwrap();
        assert!(dropped.is_empty());
    }

    #[test]
    fn single_square_yields_one_loop() {
        let pts = cloud(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)]);
        let tri = triangulate(&pts);
        let result = alpha_filter(&pts, &tri, 0.0).unwrap();

        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.retained_triangles, 4);
        let ring = &result.loops[0];
        assert_eq!(ring.len(), 4);
        assert!(ring.is_counter_clockwise());
        assert!((ring.area() - 1.0).abs() < 1e-12);
        assert!(!ring.vertices().contains(&Point2D::new(0.5, 0.5)));
    }

    #[test]
    fn tiny_radius_limit_leaves_nothing() {
        let pts = cloud(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)]);
        let tri = triangulate(&pts);
        let result = alpha_filter(&pts, &tri, 100.0).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.retained_triangles, 0);
    }

    #[test]
    fn assemble_simple_cycle() {
        let (cycles, diagnostics) = assemble_loops(&[(2, 3), (0, 1), (3, 0), (1, 2)]);
        assert!(diagnostics.is_empty());
        assert_eq!(cycles, vec![vec![2, 3, 0, 1]]);
    }

    #[test]
    fn assemble_splits_bow_tie_at_pinch_vertex() {
        // Two triangles sharing only vertex 0
        let edges = [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)];
        let (cycles, diagnostics) = assemble_loops(&edges);

        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().all(|c| c.len() == 3));
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::DegenerateGeometry(_)]
        ));
    }

    #[test]
    fn assemble_reports_open_chains() {
        let (cycles, diagnostics) = assemble_loops(&[(0, 1), (1, 2)]);
        assert!(cycles.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn assembly_is_deterministic() {
        let edges = [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0), (5, 6), (6, 7), (7, 5)];
        let first = assemble_loops(&edges);
        let second = assemble_loops(&edges);
        assert_eq!(first.0, second.0);
    }
}
