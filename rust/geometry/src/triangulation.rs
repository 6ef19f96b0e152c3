// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delaunay triangulation of a point cloud
//!
//! Incremental Bowyer-Watson over a super-triangle. Points are inserted in
//! Hilbert-curve order so that the visibility walk used for point location
//! stays short, and the cavity of each insertion is grown through triangle
//! adjacency instead of a scan over all triangles.
//!
//! The super-triangle vertices sit at `M * d` for fixed directions `d` and an
//! unbounded `M`. Predicates involving them are evaluated as polynomials in
//! `M` and decided by their leading non-zero coefficient, so no hull
//! triangle is lost to a super vertex however thin it is.
//!
//! Coincident points are collapsed onto their first occurrence before
//! insertion, so every output triangle has three distinct vertices. Indices
//! in the output always refer to the input [`PointCloud`].

use alpha_boundary_core::{Point2D, PointCloud};
use nalgebra::{Point2, Vector2};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Diagnostic;

/// Minimum number of distinct points for a triangulation
pub const MIN_POINTS: usize = 4;

/// Directions of the symbolic super-triangle vertices, counter-clockwise
const SUPER_DIRECTIONS: [(f64, f64); 3] = [(-1.0, -1.0), (1.0, -1.0), (0.0, 1.0)];

/// Collinearity tolerance in normalized coordinates
const COLLINEAR_EPSILON: f64 = 1e-12;

/// A Delaunay triangle: counter-clockwise point indices plus its circumcircle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub circumcenter: Point2D,
    pub circumradius: f64,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[Point2D]) -> Self {
        let (circumcenter, circumradius) = circumcircle(
            &points[vertices[0]],
            &points[vertices[1]],
            &points[vertices[2]],
        );
        Self {
            vertices,
            circumcenter,
            circumradius,
        }
    }

    /// Directed edges in counter-clockwise order
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Output of one triangulation run
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    triangles: Vec<Triangle>,
    point_count: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Triangulation {
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Size of the point cloud the indices refer to
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Why the triangulation is empty or partial, if anything went wrong
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn degenerate(point_count: usize, diagnostic: Diagnostic) -> Self {
        Self {
            triangles: Vec::new(),
            point_count,
            diagnostics: vec![diagnostic],
        }
    }
}

/// Circumcenter and circumradius of triangle `abc`.
///
/// Collinear triangles get an infinite radius.
pub fn circumcircle(a: &Point2D, b: &Point2D, c: &Point2D) -> (Point2D, f64) {
    let ab = Vector2::new(b.x - a.x, b.y - a.y);
    let ac = Vector2::new(c.x - a.x, c.y - a.y);
    let d = 2.0 * (ab.x * ac.y - ab.y * ac.x);
    if d == 0.0 {
        return (Point2D::new(f64::NAN, f64::NAN), f64::INFINITY);
    }

    let ab2 = ab.norm_squared();
    let ac2 = ac.norm_squared();
    let offset = Vector2::new((ac.y * ab2 - ab.y * ac2) / d, (ab.x * ac2 - ac.x * ab2) / d);

    (Point2D::new(a.x + offset.x, a.y + offset.y), offset.norm())
}

/// Twice the signed area of `abc`, positive when counter-clockwise
#[inline]
fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Positive when `d` lies strictly inside the circumcircle of counter-clockwise `abc`
#[inline]
fn incircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    ad.norm_squared() * (bd.x * cd.y - cd.x * bd.y)
        + bd.norm_squared() * (cd.x * ad.y - ad.x * cd.y)
        + cd.norm_squared() * (ad.x * bd.y - bd.x * ad.y)
}

/// Builder vertex `base + M * dir` for an unbounded `M`; `dir` is zero for input points
#[derive(Debug, Clone, Copy)]
struct Vertex {
    base: Vector2<f64>,
    dir: Vector2<f64>,
}

/// Difference of two vertices as `(constant, coefficient of M)`
type Linear = (Vector2<f64>, Vector2<f64>);

fn sub(a: &Vertex, b: &Vertex) -> Linear {
    (a.base - b.base, a.dir - b.dir)
}

/// Polynomial coefficients in `M`, lowest degree first
fn cross(a: &Linear, b: &Linear) -> [f64; 3] {
    [
        a.0.perp(&b.0),
        a.0.perp(&b.1) + a.1.perp(&b.0),
        a.1.perp(&b.1),
    ]
}

fn dot(a: &Linear, b: &Linear) -> [f64; 3] {
    [
        a.0.dot(&b.0),
        a.0.dot(&b.1) + a.1.dot(&b.0),
        a.1.dot(&b.1),
    ]
}

fn mul(a: [f64; 3], b: [f64; 3]) -> [f64; 5] {
    let mut out = [0.0; 5];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Sign-carrying value of a polynomial in `M` as `M` grows without bound
fn leading<const N: usize>(coeffs: [f64; N]) -> f64 {
    coeffs.iter().rev().copied().find(|&c| c != 0.0).unwrap_or(0.0)
}

fn orient_symbolic(a: &Vertex, b: &Vertex, c: &Vertex) -> f64 {
    leading(cross(&sub(b, a), &sub(c, a)))
}

fn incircle_symbolic(a: &Vertex, b: &Vertex, c: &Vertex, d: &Vertex) -> f64 {
    let (ad, bd, cd) = (sub(a, d), sub(b, d), sub(c, d));
    let terms = [
        mul(dot(&ad, &ad), cross(&bd, &cd)),
        mul(dot(&bd, &bd), cross(&cd, &ad)),
        mul(dot(&cd, &cd), cross(&ad, &bd)),
    ];
    let mut sum = [0.0; 5];
    for term in terms {
        for (s, t) in sum.iter_mut().zip(term) {
            *s += t;
        }
    }
    leading(sum)
}

/// Hilbert curve index of a 16-bit grid cell
fn xy_to_hilbert(x: u16, y: u16) -> u32 {
    let n = 1u32 << 16;
    let mut x = x as u32;
    let mut y = y as u32;
    let mut d = 0u32;

    let mut s = n / 2;
    while s > 0 {
        let rx = (x & s) != 0;
        let ry = (y & s) != 0;
        d = d.wrapping_add(s.wrapping_mul(s).wrapping_mul((3 * rx as u32) ^ ry as u32));

        if !ry {
            if rx {
                x = n - 1 - x;
                y = n - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        s /= 2;
    }

    d
}

/// Triangulate a point cloud.
///
/// Returns an empty triangulation carrying a [`Diagnostic`] when the cloud
/// has fewer than [`MIN_POINTS`] distinct points or all points are collinear.
pub fn triangulate(cloud: &PointCloud) -> Triangulation {
    let points = cloud.points();

    // First occurrence of each distinct finite point
    let mut seen: FxHashMap<(u64, u64), usize> = FxHashMap::default();
    let mut unique: Vec<usize> = Vec::with_capacity(points.len());
    let mut non_finite = 0usize;
    for (i, p) in points.iter().enumerate() {
        if !p.is_finite() {
            non_finite += 1;
            continue;
        }
        seen.entry(p.bit_key()).or_insert_with(|| {
            unique.push(i);
            i
        });
    }

    if unique.len() < MIN_POINTS {
        return Triangulation::degenerate(
            points.len(),
            Diagnostic::InsufficientPoints {
                count: unique.len(),
            },
        );
    }

    // Normalize to a unit box around the origin for the predicates
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &i in &unique {
        min_x = min_x.min(points[i].x);
        min_y = min_y.min(points[i].y);
        max_x = max_x.max(points[i].x);
        max_y = max_y.max(points[i].y);
    }
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    let extent = (max_x - min_x).max(max_y - min_y);

    let normalized: Vec<Point2<f64>> = unique
        .iter()
        .map(|&i| Point2::new((points[i].x - cx) / extent, (points[i].y - cy) / extent))
        .collect();

    if all_collinear(&normalized) {
        return Triangulation::degenerate(
            points.len(),
            Diagnostic::DegenerateGeometry(format!(
                "all {} distinct points are collinear",
                unique.len()
            )),
        );
    }

    let mut order: Vec<usize> = (0..normalized.len()).collect();
    let keys: Vec<u32> = normalized
        .iter()
        .map(|q| {
            let gx = ((q.x + 0.5) * 65535.0).round().clamp(0.0, 65535.0) as u16;
            let gy = ((q.y + 0.5) * 65535.0).round().clamp(0.0, 65535.0) as u16;
            xy_to_hilbert(gx, gy)
        })
        .collect();
    order.sort_by_key(|&k| (keys[k], k));

    let mut builder = BowyerWatson::new(normalized);
    for k in order {
        builder.insert(k);
    }

    let mut triangles = Vec::with_capacity(builder.faces.len() / 2);
    for face in builder.faces.iter().filter(|f| f.alive) {
        if face.v.iter().any(|&v| v >= builder.point_count) {
            continue;
        }
        let [a, b, c] = face.v;
        if orient(&builder.pts[a], &builder.pts[b], &builder.pts[c]) <= 0.0 {
            continue;
        }
        triangles.push(Triangle::new([unique[a], unique[b], unique[c]], points));
    }

    let mut diagnostics = Vec::new();
    if non_finite > 0 {
        diagnostics.push(Diagnostic::DegenerateGeometry(format!(
            "{non_finite} non-finite points ignored"
        )));
    }
    if triangles.is_empty() {
        diagnostics.push(Diagnostic::DegenerateGeometry(
            "no valid triangle could be formed".to_string(),
        ));
    }

    Triangulation {
        triangles,
        point_count: points.len(),
        diagnostics,
    }
}

fn all_collinear(pts: &[Point2<f64>]) -> bool {
    let origin = pts[0];
    let far = pts
        .iter()
        .max_by(|a, b| {
            (*a - origin)
                .norm_squared()
                .total_cmp(&(*b - origin).norm_squared())
        })
        .copied()
        .unwrap_or(origin);

    let span = (far - origin).norm();
    if span == 0.0 {
        return true;
    }
    pts.iter()
        .all(|p| orient(&origin, &far, p).abs() <= COLLINEAR_EPSILON * span)
}

/// Triangle slot in the incremental builder
#[derive(Debug, Clone, Copy)]
struct Face {
    /// Counter-clockwise vertex ids
    v: [usize; 3],
    /// `adj[i]` is the face across the edge opposite `v[i]`
    adj: [Option<usize>; 3],
    alive: bool,
}

impl Face {
    /// Edge opposite vertex slot `i`, in counter-clockwise order
    #[inline]
    fn edge(&self, i: usize) -> (usize, usize) {
        (self.v[(i + 1) % 3], self.v[(i + 2) % 3])
    }
}

struct BowyerWatson {
    /// Normalized input points; ids past the end are the super vertices
    pts: Vec<Point2<f64>>,
    point_count: usize,
    faces: Vec<Face>,
    /// Most recently created face, start of the next locate walk
    last: usize,
}

impl BowyerWatson {
    fn new(pts: Vec<Point2<f64>>) -> Self {
        let point_count = pts.len();
        let faces = vec![Face {
            v: [point_count, point_count + 1, point_count + 2],
            adj: [None; 3],
            alive: true,
        }];

        Self {
            pts,
            point_count,
            faces,
            last: 0,
        }
    }

    fn vertex(&self, id: usize) -> Vertex {
        match id.checked_sub(self.point_count) {
            None => Vertex {
                base: self.pts[id].coords,
                dir: Vector2::zeros(),
            },
            Some(k) => {
                let (x, y) = SUPER_DIRECTIONS[k];
                Vertex {
                    base: Vector2::zeros(),
                    dir: Vector2::new(x, y),
                }
            }
        }
    }

    /// Orientation of `abc` where any vertex may be a super vertex
    fn orient_ids(&self, a: usize, b: usize, c: usize) -> f64 {
        if a.max(b).max(c) < self.point_count {
            orient(&self.pts[a], &self.pts[b], &self.pts[c])
        } else {
            orient_symbolic(&self.vertex(a), &self.vertex(b), &self.vertex(c))
        }
    }

    /// Visibility walk to a face containing point `pid` (possibly on its border)
    fn locate(&self, pid: usize) -> usize {
        let mut current = self.last;

        'walk: for step in 0..self.faces.len() {
            let face = &self.faces[current];
            for j in 0..3 {
                // Rotate the starting edge so degenerate walks cannot cycle forever
                let i = (j + step) % 3;
                let (a, b) = face.edge(i);
                if self.orient_ids(a, b, pid) < 0.0 {
                    if let Some(next) = face.adj[i] {
                        current = next;
                        continue 'walk;
                    }
                }
            }
            return current;
        }

        self.faces
            .iter()
            .position(|f| {
                f.alive
                    && (0..3).all(|i| {
                        let (a, b) = f.edge(i);
                        self.orient_ids(a, b, pid) >= 0.0
                    })
            })
            .unwrap_or(self.last)
    }

    fn in_circumcircle(&self, face: usize, pid: usize) -> bool {
        let [a, b, c] = self.faces[face].v;
        let value = if a.max(b).max(c) < self.point_count {
            incircle(&self.pts[a], &self.pts[b], &self.pts[c], &self.pts[pid])
        } else {
            incircle_symbolic(
                &self.vertex(a),
                &self.vertex(b),
                &self.vertex(c),
                &self.vertex(pid),
            )
        };
        value > 0.0
    }

    fn insert(&mut self, pid: usize) {
        let start = self.locate(pid);

        // Grow the cavity of faces whose circumcircle strictly contains p
        let mut cavity = vec![start];
        let mut in_cavity: FxHashSet<usize> = FxHashSet::default();
        in_cavity.insert(start);
        let mut stack = vec![start];
        while let Some(f) = stack.pop() {
            for nb in self.faces[f].adj.into_iter().flatten() {
                if !in_cavity.contains(&nb) && self.in_circumcircle(nb, pid) {
                    in_cavity.insert(nb);
                    cavity.push(nb);
                    stack.push(nb);
                }
            }
        }

        // Every cavity border edge must see p strictly on its left
        let mut checked = 0;
        while checked < cavity.len() {
            let face = self.faces[cavity[checked]];
            checked += 1;
            for i in 0..3 {
                let (a, b) = face.edge(i);
                if self.orient_ids(a, b, pid) > 0.0 {
                    continue;
                }
                if let Some(nb) = face.adj[i] {
                    if in_cavity.insert(nb) {
                        cavity.push(nb);
                    }
                }
            }
        }

        let mut border: Vec<(usize, usize, Option<usize>)> = Vec::new();
        for &f in &cavity {
            let face = self.faces[f];
            for i in 0..3 {
                let outside = face.adj[i];
                if outside.map_or(true, |nb| !in_cavity.contains(&nb)) {
                    let (a, b) = face.edge(i);
                    border.push((a, b, outside));
                }
            }
        }
        for &f in &cavity {
            self.faces[f].alive = false;
        }

        // Fan the cavity border around p
        let base = self.faces.len();
        let mut by_start: FxHashMap<usize, usize> = FxHashMap::default();
        let mut by_end: FxHashMap<usize, usize> = FxHashMap::default();
        for (offset, &(a, b, outside)) in border.iter().enumerate() {
            let id = base + offset;
            self.faces.push(Face {
                v: [a, b, pid],
                adj: [None, None, outside],
                alive: true,
            });
            by_start.insert(a, id);
            by_end.insert(b, id);

            if let Some(o) = outside {
                let other = &mut self.faces[o];
                for i in 0..3 {
                    if other.edge(i) == (b, a) {
                        other.adj[i] = Some(id);
                    }
                }
            }
        }
        for id in base..self.faces.len() {
            let [a, b, _] = self.faces[id].v;
            // Opposite a: edge (b, p); opposite b: edge (p, a)
            self.faces[id].adj[0] = by_start.get(&b).copied();
            self.faces[id].adj[1] = by_end.get(&a).copied();
        }

        if self.faces.len() > base {
            self.last = base;
        }
    }
}
