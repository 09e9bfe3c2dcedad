// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TileContext Geometry
//!
//! Mesh assembly, point containment and vertex-based trimming for tiled
//! context models, built on nalgebra with earcutr triangulation.
//!
//! ```rust
//! use tilecontext_geometry::{assemble_meshes, extrude_polygon, vertex_intersection, Point2};
//!
//! let footprint = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(4.0, 0.0),
//!     Point2::new(4.0, 4.0),
//!     Point2::new(0.0, 4.0),
//! ];
//! let solid = extrude_polygon(&footprint, 10.0).unwrap();
//! let small = extrude_polygon(&[Point2::new(1.0, 1.0), Point2::new(2.0, 1.0), Point2::new(1.0, 2.0)], 1.0).unwrap();
//!
//! let merged = assemble_meshes(&[small.clone(), small]).unwrap();
//! let kept = vertex_intersection(&solid, &merged).unwrap();
//! assert_eq!(kept.face_count(), merged.face_count());
//! ```

pub mod assemble;
pub mod classify;
pub mod error;
pub mod extrusion;
pub mod io;
pub mod mesh;
pub mod triangulation;
pub mod trim;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use assemble::{assemble_meshes, assemble_tiles, vertex_offsets};
pub use classify::{classify_vertices, Classification, ClassifierConfig, ContainmentClassifier};
pub use error::{Error, Result};
pub use extrusion::{extrude_bounding_box, extrude_polygon};
pub use io::{mesh_from_obj, mesh_to_obj, parse_obj_mesh, write_obj_mesh, ImportedMesh};
pub use mesh::{Mesh, MeshBuilder, Triangle};
pub use triangulation::{normalize_ring, triangulate_polygon};
pub use trim::{
    clip_to_solid, count_straddling_faces, trim_mesh, vertex_difference, vertex_intersection,
    TrimMode, TrimStats,
};
