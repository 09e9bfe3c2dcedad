// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh assembly - merging independently indexed tile meshes
//!
//! Each tile mesh indexes its own vertex list from zero. Assembly concatenates
//! the vertex lists in input order and shifts every face of mesh `k` by the
//! number of vertices in meshes `0..k`.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use tilecontext_core::TileId;

/// Vertex offset of every mesh in the merged index space
///
/// Exclusive prefix sum of the vertex counts: entry `k` is the number of
/// vertices in meshes `0..k`. The returned vector has `meshes.len() + 1`
/// entries, the last one being the total vertex count.
pub fn vertex_offsets(meshes: &[Mesh]) -> Vec<usize> {
    std::iter::once(0)
        .chain(meshes.iter().scan(0usize, |total, mesh| {
            *total += mesh.vertex_count();
            Some(*total)
        }))
        .collect()
}

/// Merge meshes into a single mesh with globally unique vertex indices
///
/// The inputs are left untouched and the output only depends on their order.
///
/// # Errors
/// `IndexOutOfRange` when the merged vertex count does not fit `u32` indices.
pub fn assemble_meshes(meshes: &[Mesh]) -> Result<Mesh> {
    let offsets = vertex_offsets(meshes);
    let total_vertices = offsets.last().copied().unwrap_or(0);

    if total_vertices > u32::MAX as usize {
        return Err(Error::IndexOutOfRange {
            index: total_vertices - 1,
            vertex_count: u32::MAX as usize,
        });
    }

    let total_faces: usize = meshes.iter().map(Mesh::face_count).sum();

    let mut vertices = Vec::with_capacity(total_vertices);
    let mut faces = Vec::with_capacity(total_faces);

    for (mesh, &offset) in meshes.iter().zip(&offsets) {
        let offset = offset as u32;
        vertices.extend_from_slice(mesh.vertices());
        faces.extend(
            mesh.faces()
                .iter()
                .map(|&[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    Mesh::new(vertices, faces)
}

/// Merge tile meshes in ascending tile id order
///
/// Returns the ids in the order they were merged alongside the mesh.
pub fn assemble_tiles(mut tiles: Vec<(TileId, Mesh)>) -> Result<(Vec<TileId>, Mesh)> {
    tiles.sort_by(|a, b| a.0.cmp(&b.0));

    let (ids, meshes): (Vec<TileId>, Vec<Mesh>) = tiles.into_iter().unzip();
    let mesh = assemble_meshes(&meshes)?;
    Ok((ids, mesh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn triangle_at(x: f64) -> Mesh {
        Mesh::new(
            vec![
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_two_triangles() {
        let merged = assemble_meshes(&[triangle_at(0.0), triangle_at(5.0)]).unwrap();
        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(merged.faces(), &[[0, 1, 2], [3, 4, 5]]);
        assert_eq!(merged.vertices()[3], Point3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_offsets_are_prefix_sums() {
        let quad = Mesh::new(
            vec![Point3::origin(); 4],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let meshes = vec![triangle_at(0.0), Mesh::empty(), quad, triangle_at(1.0)];
        assert_eq!(vertex_offsets(&meshes), vec![0, 3, 3, 7, 10]);

        let merged = assemble_meshes(&meshes).unwrap();
        assert_eq!(
            merged.faces(),
            &[[0, 1, 2], [3, 4, 5], [3, 5, 6], [7, 8, 9]]
        );
    }

    #[test]
    fn test_inputs_untouched_and_deterministic() {
        let meshes = vec![triangle_at(0.0), triangle_at(2.0), triangle_at(4.0)];
        let snapshot = meshes.clone();

        let first = assemble_meshes(&meshes).unwrap();
        let second = assemble_meshes(&meshes).unwrap();

        assert_eq!(first, second);
        assert_eq!(meshes, snapshot);
    }

    #[test]
    fn test_empty_input() {
        let merged = assemble_meshes(&[]).unwrap();
        assert!(merged.is_empty());
        assert_eq!(vertex_offsets(&[]), vec![0]);
    }

    #[test]
    fn test_assemble_tiles_sorts_by_id() {
        let tiles = vec![
            (TileId::Number(7), triangle_at(7.0)),
            (TileId::Number(2), triangle_at(2.0)),
            (TileId::from("annex"), triangle_at(9.0)),
        ];
        let (ids, mesh) = assemble_tiles(tiles).unwrap();

        assert_eq!(
            ids,
            vec![TileId::Number(2), TileId::Number(7), TileId::from("annex")]
        );
        assert_eq!(mesh.vertices()[0].x, 2.0);
        assert_eq!(mesh.vertices()[3].x, 7.0);
        assert_eq!(mesh.vertices()[6].x, 9.0);
    }
}
