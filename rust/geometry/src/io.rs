// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion between OBJ data and meshes

use crate::error::Result;
use crate::mesh::Mesh;
use nalgebra::Point3;
use tilecontext_core::{parse_obj, write_obj, ObjData};

/// Mesh imported from OBJ data
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMesh {
    pub mesh: Mesh,
    /// Faces dropped because they reference the same vertex twice
    pub skipped_faces: usize,
}

/// Build a mesh from parsed OBJ data
///
/// Exported tiles occasionally contain collapsed faces such as `f 4 4 9`; they
/// carry no area and are skipped rather than rejected.
pub fn mesh_from_obj(data: ObjData) -> Result<ImportedMesh> {
    let ObjData { vertices, faces } = data;

    let face_count = faces.len();
    let faces: Vec<[u32; 3]> = faces
        .into_iter()
        .filter(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2])
        .collect();
    let skipped_faces = face_count - faces.len();

    let vertices = vertices
        .into_iter()
        .map(|[x, y, z]| Point3::new(x, y, z))
        .collect();

    Ok(ImportedMesh {
        mesh: Mesh::new(vertices, faces)?,
        skipped_faces,
    })
}

/// Plain OBJ data of a mesh
pub fn mesh_to_obj(mesh: &Mesh) -> ObjData {
    ObjData::new(
        mesh.vertices().iter().map(|p| [p.x, p.y, p.z]).collect(),
        mesh.faces().to_vec(),
    )
}

/// Parse OBJ text straight into a mesh
pub fn parse_obj_mesh(content: &str) -> Result<ImportedMesh> {
    mesh_from_obj(parse_obj(content)?)
}

/// Serialize a mesh as OBJ text (1-based face indices)
pub fn write_obj_mesh(mesh: &Mesh) -> String {
    write_obj(&mesh_to_obj(mesh))
}
