// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - turning a 2D footprint into a closed prism
//!
//! The prism is used as a bounding solid for containment tests, so it shares
//! vertices between caps and walls: the footprint vertices at z=0 come first,
//! the same vertices at z=height follow. Every edge is shared by exactly two
//! faces and all faces wind outwards.

use crate::error::{Error, Result};
use crate::mesh::{Mesh, MeshBuilder};
use crate::triangulation::{normalize_ring, triangulate_polygon};
use nalgebra::{Point2, Point3};
use tilecontext_core::BoundingBox;

/// Extrude a simple polygon from z=0 up to `height`
///
/// Vertex `i` of the (normalized, counter-clockwise) footprint is mesh vertex
/// `i` at z=0 and mesh vertex `n + i` at z=height.
///
/// # Errors
/// `DegenerateGeometry` for fewer than three distinct points, zero area,
/// self-intersection, or a non-positive height. No partial mesh is produced.
pub fn extrude_polygon(points: &[Point2<f64>], height: f64) -> Result<Mesh> {
    if !height.is_finite() || height <= 0.0 {
        return Err(Error::degenerate(format!(
            "extrusion height must be positive, got {}",
            height
        )));
    }

    let ring = normalize_ring(points)?;
    let triangulation = triangulate_polygon(&ring)?;
    let n = ring.len();

    let mut builder = MeshBuilder::with_capacity(n * 2, triangulation.len() / 3 * 2 + n * 2);

    for p in &ring {
        builder.add_vertex(Point3::new(p.x, p.y, 0.0));
    }
    for p in &ring {
        builder.add_vertex(Point3::new(p.x, p.y, height));
    }

    create_caps(&ring, &triangulation, &mut builder);
    create_side_walls(n as u32, &mut builder);

    builder.build()
}

/// Extrude the rectangle of a bounding box
pub fn extrude_bounding_box(bbox: &BoundingBox, height: f64) -> Result<Mesh> {
    bbox.validate()?;
    let ring: Vec<Point2<f64>> = bbox
        .to_polygon()
        .iter()
        .map(|&(x, y)| Point2::new(x, y))
        .collect();
    extrude_polygon(&ring, height)
}

/// Bottom and top caps from the footprint triangulation
#[inline]
fn create_caps(ring: &[Point2<f64>], triangulation: &[usize], builder: &mut MeshBuilder) {
    let n = ring.len() as u32;

    for tri in triangulation.chunks_exact(3) {
        let (i0, mut i1, mut i2) = (tri[0], tri[1], tri[2]);

        // Make the triangle counter-clockwise seen from above
        let (a, b, c) = (&ring[i0], &ring[i1], &ring[i2]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        if cross < 0.0 {
            std::mem::swap(&mut i1, &mut i2);
        }

        let (i0, i1, i2) = (i0 as u32, i1 as u32, i2 as u32);

        // Bottom faces down: reversed winding
        builder.add_triangle(i0, i2, i1);
        // Top faces up
        builder.add_triangle(n + i0, n + i1, n + i2);
    }
}

/// Two triangles per footprint edge, wound outwards for a counter-clockwise ring
#[inline]
fn create_side_walls(n: u32, builder: &mut MeshBuilder) {
    for i in 0..n {
        let j = (i + 1) % n;

        let v0_bottom = i;
        let v1_bottom = j;
        let v1_top = n + j;
        let v0_top = n + i;

        builder.add_triangle(v0_bottom, v1_bottom, v1_top);
        builder.add_triangle(v0_bottom, v1_top, v0_top);
    }
}
