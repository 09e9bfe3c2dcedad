// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point containment against a closed bounding mesh
//!
//! Each content vertex is tested on its own:
//!
//! 1. outside the bounding box of the solid (padded by epsilon) means outside
//! 2. within epsilon of a bounding face means inside
//! 3. otherwise a ray is cast along three fixed directions and the crossing
//!    parities vote, two odd counts out of three meaning inside
//!
//! The directions are deliberately skewed so rays do not run along the edges
//! and diagonals of axis-aligned solids such as extruded rectangles.

use crate::error::{Error, Result};
use crate::mesh::{Mesh, Triangle};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

/// Fixed ray directions, normalized on use
const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [0.8017, 0.4563, 0.3861],
    [-0.3271, 0.8812, 0.3414],
    [0.2213, -0.4187, 0.8808],
];

/// Classifier tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Distance under which a vertex counts as lying on the bounding surface
    pub epsilon: f64,
    /// Test vertices on the rayon thread pool
    pub parallel: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            parallel: true,
        }
    }
}

/// Inside/outside label for every vertex of a content mesh
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    inside: Vec<bool>,
}

impl Classification {
    /// Wrap precomputed labels (`true` = inside)
    pub fn from_labels(inside: Vec<bool>) -> Self {
        Self { inside }
    }

    #[inline]
    pub fn labels(&self) -> &[bool] {
        &self.inside
    }

    #[inline]
    pub fn is_inside(&self, vertex: usize) -> bool {
        self.inside[vertex]
    }

    /// Number of vertices this classification was computed for
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.inside.len()
    }

    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&inside| inside).count()
    }

    pub fn outside_count(&self) -> usize {
        self.vertex_count() - self.inside_count()
    }

    /// Check that this classification belongs to `mesh`
    pub fn check(&self, mesh: &Mesh) -> Result<()> {
        if self.vertex_count() != mesh.vertex_count() {
            return Err(Error::ClassificationMismatch {
                expected: mesh.vertex_count(),
                actual: self.vertex_count(),
            });
        }
        Ok(())
    }
}

/// Prepared bounding solid
#[derive(Debug, Clone)]
pub struct ContainmentClassifier {
    triangles: Vec<Triangle>,
    min: Point3<f64>,
    max: Point3<f64>,
    directions: [Vector3<f64>; 3],
    config: ClassifierConfig,
}

impl ContainmentClassifier {
    /// Prepare `bounding` with the default configuration
    ///
    /// # Errors
    /// `DegenerateGeometry` if the mesh is empty or not closed.
    pub fn new(bounding: &Mesh) -> Result<Self> {
        Self::with_config(bounding, ClassifierConfig::default())
    }

    pub fn with_config(bounding: &Mesh, config: ClassifierConfig) -> Result<Self> {
        if !config.epsilon.is_finite() || config.epsilon < 0.0 {
            return Err(Error::degenerate(format!(
                "classifier epsilon must be a non-negative number, got {}",
                config.epsilon
            )));
        }
        if bounding.face_count() == 0 {
            return Err(Error::degenerate("bounding mesh has no faces"));
        }
        check_closed(bounding)?;

        let (min, max) = bounding.bounds();
        let pad = Vector3::repeat(config.epsilon);
        let directions = RAY_DIRECTIONS.map(|[x, y, z]| Vector3::new(x, y, z).normalize());

        Ok(Self {
            triangles: bounding.triangles().collect(),
            min: min - pad,
            max: max + pad,
            directions,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify every vertex of `content`
    pub fn classify(&self, content: &Mesh) -> Classification {
        let vertices = content.vertices();

        #[cfg(not(target_arch = "wasm32"))]
        let inside: Vec<bool> = if self.config.parallel {
            vertices.par_iter().map(|p| self.contains(p)).collect()
        } else {
            vertices.iter().map(|p| self.contains(p)).collect()
        };

        #[cfg(target_arch = "wasm32")]
        let inside: Vec<bool> = vertices.iter().map(|p| self.contains(p)).collect();

        Classification { inside }
    }

    /// Containment test for a single point (surface points count as inside)
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        if !self.in_bounds(point) {
            return false;
        }

        let eps_sq = self.config.epsilon * self.config.epsilon;
        if self
            .triangles
            .iter()
            .any(|t| distance_squared_to_triangle(point, t) <= eps_sq)
        {
            return true;
        }

        let votes = self
            .directions
            .iter()
            .filter(|dir| self.crossings(point, dir) % 2 == 1)
            .count();
        votes >= 2
    }

    #[inline]
    fn in_bounds(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    fn crossings(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> usize {
        self.triangles
            .iter()
            .filter(|t| ray_hits_triangle(origin, direction, t, self.config.epsilon))
            .count()
    }
}

/// Classify `content` against `bounding` with the default configuration
pub fn classify_vertices(bounding: &Mesh, content: &Mesh) -> Result<Classification> {
    Ok(ContainmentClassifier::new(bounding)?.classify(content))
}

/// Every undirected edge must be used by exactly two faces
///
/// Vertices at identical positions are welded first, so solids exported with
/// per-face vertices still count as closed.
fn check_closed(mesh: &Mesh) -> Result<()> {
    let mut welded: FxHashMap<[u64; 3], u32> = FxHashMap::default();
    let canonical: Vec<u32> = mesh
        .vertices()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            // + 0.0 folds -0.0 into 0.0
            let key = [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()];
            *welded.entry(key).or_insert(i as u32)
        })
        .collect();

    let mut edge_uses: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    for face in mesh.faces() {
        let a = canonical[face[0] as usize];
        let b = canonical[face[1] as usize];
        let c = canonical[face[2] as usize];
        for (u, v) in [(a, b), (b, c), (c, a)] {
            if u == v {
                return Err(Error::degenerate(format!(
                    "bounding face {:?} collapses after welding coincident vertices",
                    face
                )));
            }
            *edge_uses.entry((u.min(v), u.max(v))).or_insert(0) += 1;
        }
    }

    let open = edge_uses.values().filter(|&&uses| uses != 2).count();
    if open > 0 {
        return Err(Error::degenerate(format!(
            "bounding mesh is not closed: {} edges are not shared by exactly two faces",
            open
        )));
    }
    Ok(())
}

/// Möller–Trumbore ray/triangle test, hits at `t <= epsilon` are ignored
#[inline]
fn ray_hits_triangle(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    tri: &Triangle,
    epsilon: f64,
) -> bool {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Parallel to the triangle plane
    if a.abs() < 1e-15 {
        return false;
    }

    let f = 1.0 / a;
    let s = origin - tri.v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    f * edge2.dot(&q) > epsilon
}

/// Squared distance from `p` to the closest point of `tri`
///
/// Region test from Ericson, Real-Time Collision Detection, 5.1.5.
fn distance_squared_to_triangle(p: &Point3<f64>, tri: &Triangle) -> f64 {
    let (a, b, c) = (tri.v0, tri.v1, tri.v2);
    let ab = b - a;
    let ac = c - a;

    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return ap.norm_squared();
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return bp.norm_squared();
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (p - (a + ab * v)).norm_squared();
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return cp.norm_squared();
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (p - (a + ac * w)).norm_squared();
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (p - (b + (c - b) * w)).norm_squared();
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::MIN_POSITIVE {
        // Zero-area face: fall back to its corners
        return ap.norm_squared().min(bp.norm_squared()).min(cp.norm_squared());
    }
    let v = vb / denom;
    let w = vc / denom;
    (p - (a + ab * v + ac * w)).norm_squared()
}
