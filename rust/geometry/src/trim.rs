// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex-based trimming
//!
//! A coarse alternative to CSG: vertices are filtered by their containment
//! label and a face survives only when all three of its vertices are kept.
//! Faces straddling the boundary therefore disappear from both the inside and
//! the outside result.

use crate::classify::{Classification, ContainmentClassifier};
use crate::error::Result;
use crate::mesh::Mesh;

/// Side of the bounding solid to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrimMode {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "inside"))]
    KeepInside,
    #[cfg_attr(feature = "serde", serde(rename = "outside"))]
    KeepOutside,
}

impl TrimMode {
    /// Whether a vertex with the given label is kept
    #[inline]
    pub fn keeps(self, inside: bool) -> bool {
        match self {
            TrimMode::KeepInside => inside,
            TrimMode::KeepOutside => !inside,
        }
    }

    /// Parse `inside` / `outside` (case-insensitive)
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "inside" => Some(TrimMode::KeepInside),
            "outside" => Some(TrimMode::KeepOutside),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrimMode::KeepInside => "inside",
            TrimMode::KeepOutside => "outside",
        }
    }
}

/// Face counts per side of the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimStats {
    /// All three vertices inside
    pub inside_faces: usize,
    /// All three vertices outside
    pub outside_faces: usize,
    /// Vertices on both sides, dropped by either trim
    pub straddling_faces: usize,
}

impl TrimStats {
    /// Count faces of `content` by their vertex labels
    pub fn compute(content: &Mesh, classification: &Classification) -> Result<Self> {
        classification.check(content)?;

        let labels = classification.labels();
        let mut stats = TrimStats::default();
        for face in content.faces() {
            let inside = face.iter().filter(|&&i| labels[i as usize]).count();
            match inside {
                3 => stats.inside_faces += 1,
                0 => stats.outside_faces += 1,
                _ => stats.straddling_faces += 1,
            }
        }
        Ok(stats)
    }
}

/// Number of faces with vertices on both sides of the boundary
pub fn count_straddling_faces(content: &Mesh, classification: &Classification) -> Result<usize> {
    Ok(TrimStats::compute(content, classification)?.straddling_faces)
}

/// Keep the vertices on the requested side and the faces made only of them
///
/// Kept vertices retain their relative order and faces are reindexed into the
/// new vertex list. Nothing on the requested side yields an empty mesh.
///
/// # Errors
/// `ClassificationMismatch` when `classification` was computed for a mesh with
/// a different vertex count.
pub fn trim_mesh(content: &Mesh, classification: &Classification, mode: TrimMode) -> Result<Mesh> {
    classification.check(content)?;

    let mut remap: Vec<Option<u32>> = vec![None; content.vertex_count()];
    let mut vertices = Vec::new();

    for (old, (position, &inside)) in content
        .vertices()
        .iter()
        .zip(classification.labels())
        .enumerate()
    {
        if mode.keeps(inside) {
            remap[old] = Some(vertices.len() as u32);
            vertices.push(*position);
        }
    }

    let faces: Vec<[u32; 3]> = content
        .faces()
        .iter()
        .filter_map(|&[a, b, c]| {
            Some([
                remap[a as usize]?,
                remap[b as usize]?,
                remap[c as usize]?,
            ])
        })
        .collect();

    Mesh::new(vertices, faces)
}

/// Classify `content` against `bounding` and trim in one step
pub fn clip_to_solid(bounding: &Mesh, content: &Mesh, mode: TrimMode) -> Result<Mesh> {
    let classification = ContainmentClassifier::new(bounding)?.classify(content);
    trim_mesh(content, &classification, mode)
}

/// Part of `content` inside `bounding`
pub fn vertex_intersection(bounding: &Mesh, content: &Mesh) -> Result<Mesh> {
    clip_to_solid(bounding, content, TrimMode::KeepInside)
}

/// Part of `content` outside `bounding`
pub fn vertex_difference(bounding: &Mesh, content: &Mesh) -> Result<Mesh> {
    clip_to_solid(bounding, content, TrimMode::KeepOutside)
}
