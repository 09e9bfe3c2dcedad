// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where tile meshes come from.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tilecontext_core::TileId;
use tilecontext_geometry::{parse_obj_mesh, Mesh};

/// Loads the mesh of a single tile.
pub trait TileSource {
    /// # Errors
    /// `TileNotFound` when the source has no data for `id`.
    fn load_tile(&self, id: &TileId) -> Result<Mesh>;
}

/// Tiles stored as `<dir>/<prefix><id>.obj`.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    dir: PathBuf,
    prefix: String,
}

impl DirectoryTileSource {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the OBJ file holding tile `id`.
    ///
    /// # Errors
    /// `InvalidTileId` for names holding a path separator or `..`, which
    /// would resolve outside the tile directory.
    pub fn tile_path(&self, id: &TileId) -> Result<PathBuf> {
        if let TileId::Name(name) = id {
            if name.contains(&['/', '\\'][..]) || name.contains("..") {
                return Err(Error::InvalidTileId(id.clone()));
            }
        }
        Ok(self.dir.join(format!("{}{}.obj", self.prefix, id)))
    }
}

impl TileSource for DirectoryTileSource {
    fn load_tile(&self, id: &TileId) -> Result<Mesh> {
        let path = self.tile_path(id)?;
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::TileNotFound(id.clone()),
            _ => Error::io(&path, e),
        })?;

        let imported = parse_obj_mesh(&content)?;
        if imported.skipped_faces > 0 {
            tracing::warn!(
                tile = %id,
                skipped = imported.skipped_faces,
                "Skipped faces with repeated vertex indices"
            );
        }
        tracing::debug!(
            tile = %id,
            path = %path.display(),
            vertices = imported.mesh.vertex_count(),
            faces = imported.mesh.face_count(),
            "Loaded tile"
        );
        Ok(imported.mesh)
    }
}

/// Tiles held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSource {
    tiles: FxHashMap<TileId, Mesh>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<TileId>, mesh: Mesh) {
        self.tiles.insert(id.into(), mesh);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl FromIterator<(TileId, Mesh)> for MemoryTileSource {
    fn from_iter<I: IntoIterator<Item = (TileId, Mesh)>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

impl TileSource for MemoryTileSource {
    fn load_tile(&self, id: &TileId) -> Result<Mesh> {
        self.tiles
            .get(id)
            .cloned()
            .ok_or_else(|| Error::TileNotFound(id.clone()))
    }
}
