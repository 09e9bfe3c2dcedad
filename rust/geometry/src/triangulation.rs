// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon utilities and triangulation
//!
//! Wrapper around earcutr for 2D polygon triangulation, plus the validity
//! checks (area, self-intersection) used before extruding a footprint.

use crate::{Error, Point2, Result};

/// Relative tolerance for area and orientation tests
const REL_EPSILON: f64 = 1e-12;

/// Signed area of a closed ring (positive for counter-clockwise)
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum();
    twice * 0.5
}

/// Largest bounding-box side, used to scale tolerances
fn extent(points: &[Point2<f64>]) -> f64 {
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).max(max_y - min_y)
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        // Cross product of edges
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false; // Sign changed - not convex
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Orientation of `c` relative to the directed line `a -> b`
///
/// Returns 1 for left, -1 for right, 0 for collinear within `tolerance`.
#[inline]
fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, tolerance: f64) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross > tolerance {
        1
    } else if cross < -tolerance {
        -1
    } else {
        0
    }
}

/// `c` lies within the axis-aligned box spanned by `a` and `b`
#[inline]
fn within_span(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

/// Closed segment intersection test (touching counts)
fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let o1 = orientation(p1, p2, q1, tolerance);
    let o2 = orientation(p1, p2, q2, tolerance);
    let o3 = orientation(q1, q2, p1, tolerance);
    let o4 = orientation(q1, q2, p2, tolerance);

    if o1 != o2 && o3 != o4 && o1 != 0 && o2 != 0 && o3 != 0 && o4 != 0 {
        return true;
    }

    (o1 == 0 && within_span(p1, p2, q1))
        || (o2 == 0 && within_span(p1, p2, q2))
        || (o3 == 0 && within_span(q1, q2, p1))
        || (o4 == 0 && within_span(q1, q2, p2))
}

/// Check that a closed ring does not touch or cross itself
///
/// Non-adjacent edges may not meet at all; adjacent edges may only share
/// their common vertex (no fold-back along the same line).
pub fn is_simple_polygon(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let scale = extent(points);
    let tolerance = REL_EPSILON * scale * scale;

    for i in 0..n {
        let a1 = &points[i];
        let a2 = &points[(i + 1) % n];

        // Fold-back: next edge turns 180 degrees onto this one
        let a3 = &points[(i + 2) % n];
        if orientation(a1, a2, a3, tolerance) == 0 && (a3 - a2).dot(&(a1 - a2)) > 0.0 {
            return false;
        }

        for j in (i + 2)..n {
            // First and last edge share vertex 0
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = &points[j];
            let b2 = &points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2, tolerance) {
                return false;
            }
        }
    }

    true
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
///
/// Every input vertex is used, including vertices lying straight on an edge,
/// so the result always holds `n - 2` triangles and none of them is degenerate.
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    let corners = corner_indices(points);
    if corners.len() == n {
        return triangulate_corners(points);
    }
    if corners.len() < 3 {
        return Err(Error::TriangulationError(
            "polygon has fewer than 3 corners".to_string(),
        ));
    }

    let corner_points: Vec<Point2<f64>> = corners.iter().map(|&i| points[i]).collect();
    let mut triangles: Vec<[usize; 3]> = triangulate_corners(&corner_points)?
        .chunks_exact(3)
        .map(|t| [corners[t[0]], corners[t[1]], corners[t[2]]])
        .collect();

    // Straight vertices split the triangle owning their boundary edge
    for (k, &start) in corners.iter().enumerate() {
        let end = corners[(k + 1) % corners.len()];
        let mut from = start;
        let mut v = (start + 1) % n;
        while v != end {
            split_boundary_edge(&mut triangles, from, end, v)?;
            from = v;
            v = (v + 1) % n;
        }
    }

    Ok(triangles.into_iter().flatten().collect())
}

/// Triangulate a ring whose vertices are all corners
fn triangulate_corners(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    // Flatten points for earcutr
    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    // Triangulate using earcutr
    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    if indices.len() != (n - 2) * 3 {
        return Err(Error::TriangulationError(format!(
            "expected {} triangles, earcut produced {}",
            n - 2,
            indices.len() / 3
        )));
    }

    Ok(indices)
}

/// Indices of the vertices where the ring actually turns
///
/// A vertex is straight when it is collinear with its neighbours and sits
/// between them; removal repeats until every remaining vertex turns.
fn corner_indices(points: &[Point2<f64>]) -> Vec<usize> {
    let scale = extent(points);
    let tolerance = REL_EPSILON * scale * scale;

    let mut corners: Vec<usize> = (0..points.len()).collect();
    let mut i = 0;
    while corners.len() >= 3 && i < corners.len() {
        let n = corners.len();
        let prev = &points[corners[(i + n - 1) % n]];
        let cur = &points[corners[i]];
        let next = &points[corners[(i + 1) % n]];
        if orientation(prev, cur, next, tolerance) == 0 && (prev - cur).dot(&(next - cur)) < 0.0 {
            corners.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    corners
}

/// Replace the triangle on boundary edge `a-b` by two triangles meeting at `v`
///
/// `v` lies on the edge, the apex does not, so both halves keep the winding
/// of the original triangle and a non-zero area.
fn split_boundary_edge(
    triangles: &mut Vec<[usize; 3]>,
    a: usize,
    b: usize,
    v: usize,
) -> Result<()> {
    for t in 0..triangles.len() {
        let tri = triangles[t];
        for k in 0..3 {
            let (p, q, apex) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
            if (p == a && q == b) || (p == b && q == a) {
                triangles[t] = [p, v, apex];
                triangles.push([v, q, apex]);
                return Ok(());
            }
        }
    }
    Err(Error::TriangulationError(format!(
        "boundary edge {}-{} not found in triangulation",
        a, b
    )))
}

/// Normalize a footprint ring for extrusion
///
/// Drops an explicit closing vertex and consecutive duplicates, then checks
/// for at least three vertices, finite coordinates, non-zero area and
/// simplicity. Vertices lying straight on an edge are kept. Returns the ring
/// in counter-clockwise order.
pub fn normalize_ring(points: &[Point2<f64>]) -> Result<Vec<Point2<f64>>> {
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(Error::degenerate("polygon has non-finite coordinates"));
    }

    let mut ring: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if ring.last() != Some(p) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(Error::degenerate(format!(
            "polygon needs at least 3 distinct vertices, found {}",
            ring.len()
        )));
    }

    let scale = extent(&ring);
    let area = signed_area(&ring);
    if area.abs() <= REL_EPSILON * scale * scale || scale == 0.0 {
        return Err(Error::degenerate("polygon has zero area"));
    }

    if !is_simple_polygon(&ring) {
        return Err(Error::degenerate("polygon is self-intersecting"));
    }

    if area < 0.0 {
        ring.reverse();
    }

    Ok(ring)
}
