// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};

/// Triangle given by its three corner positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unit normal following the winding order (zero vector for degenerate triangles)
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1
            .cross(&edge2)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Triangle area
    #[inline]
    pub fn area(&self) -> f64 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).norm() * 0.5
    }
}

/// Immutable indexed triangle mesh
///
/// Vertices are `f64` so georeferenced coordinates (hundreds of kilometres
/// from the origin) keep sub-millimetre precision. Faces are 0-based index
/// triples; each references three distinct vertices of this mesh, and the
/// winding order gives the outward normal. Operations never modify a mesh in
/// place, they return a new one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a mesh, checking every face against the vertex count
    ///
    /// # Errors
    /// `IndexOutOfRange` when a face references a missing vertex,
    /// `DegenerateGeometry` when a face repeats a vertex.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let vertex_count = vertices.len();
        for face in &faces {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::IndexOutOfRange {
                    index: index as usize,
                    vertex_count,
                });
            }
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                return Err(Error::degenerate(format!(
                    "face {:?} repeats a vertex",
                    face
                )));
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Empty mesh (no vertices, no faces)
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get face (triangle) count
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Corner positions of face `index`
    #[inline]
    pub fn triangle(&self, index: usize) -> Triangle {
        let [a, b, c] = self.faces[index];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// Iterate over all faces as triangles
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).map(move |i| self.triangle(i))
    }

    /// Outward unit normal of face `index`, from its winding
    #[inline]
    pub fn face_normal(&self, index: usize) -> Vector3<f64> {
        self.triangle(index).normal()
    }

    /// Calculate bounds (min, max); both are the origin for an empty mesh
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for p in &self.vertices {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }

    /// Average of all vertex positions
    pub fn centroid(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Signed enclosed volume (positive for outward-wound closed meshes)
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)) / 6.0)
            .sum()
    }

    /// Take the vertex and face buffers
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
        (self.vertices, self.faces)
    }
}

/// Incremental mesh construction
///
/// Collects vertices and triangles, then validates once in [`MeshBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.faces.push([i0, i1, i2]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Validate and freeze into a [`Mesh`]
    pub fn build(self) -> Result<Mesh> {
        Mesh::new(self.vertices, self.faces)
    }
}
