// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed boundary loops

use crate::point::Point2D;

/// Closed sequence of vertices forming a polygon.
///
/// The first vertex implicitly follows the last one; the closing duplicate is
/// never stored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryLoop {
    vertices: Vec<Point2D>,
}

impl BoundaryLoop {
    /// Build a loop, dropping an explicit closing vertex if present.
    pub fn new(mut vertices: Vec<Point2D>) -> Self {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Shoelace area, positive for counter-clockwise loops
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.vertices)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn perimeter(&self) -> f64 {
        let n = self.vertices.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.vertices[i].distance_to(&self.vertices[(i + 1) % n]))
            .sum()
    }

    /// Point-in-polygon test that also accepts points within `tolerance` of an edge.
    pub fn contains(&self, p: &Point2D, tolerance: f64) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];

            if distance_to_segment(p, a, b) <= tolerance {
                return true;
            }

            // Crossing number
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn into_vertices(self) -> Vec<Point2D> {
        self.vertices
    }
}

/// Shoelace signed area of an implicitly closed ring.
///
/// Coordinates are taken relative to the first vertex so that rings far from
/// the origin (survey coordinates) keep their precision.
pub fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let origin = points[0];
    let mut area = 0.0;
    for i in 1..n - 1 {
        let (xi, yi) = (points[i].x - origin.x, points[i].y - origin.y);
        let (xj, yj) = (points[i + 1].x - origin.x, points[i + 1].y - origin.y);
        area += xi * yj - xj * yi;
    }
    area / 2.0
}

fn distance_to_segment(p: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point2D::new(a.x + t * dx, a.y + t * dy))
}
