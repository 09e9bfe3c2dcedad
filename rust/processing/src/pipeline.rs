// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context model pipeline: select tiles, load and merge them, trim to a solid.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::source::TileSource;
use serde::Serialize;
use std::borrow::Cow;
use tilecontext_core::{BoundingBox, Error as CoreError, TileId, TileRegistry};
use tilecontext_geometry::{
    assemble_tiles, extrude_polygon, trim_mesh, ContainmentClassifier, Mesh, Point2, TrimMode,
    TrimStats,
};

/// Solid the merged tiles are trimmed against.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingSolid {
    /// Footprint polygon extruded from z=0 to `height`
    Extruded { polygon: Vec<Point2<f64>>, height: f64 },
    /// Arbitrary closed mesh
    Mesh(Mesh),
}

impl BoundingSolid {
    /// Rectangle of `bbox` extruded to `height`.
    pub fn from_bbox(bbox: &BoundingBox, height: f64) -> Self {
        BoundingSolid::Extruded {
            polygon: bbox
                .to_polygon()
                .iter()
                .map(|&(x, y)| Point2::new(x, y))
                .collect(),
            height,
        }
    }

    pub fn to_mesh(&self) -> Result<Cow<'_, Mesh>> {
        match self {
            BoundingSolid::Extruded { polygon, height } => {
                Ok(Cow::Owned(extrude_polygon(polygon, *height)?))
            }
            BoundingSolid::Mesh(mesh) => Ok(Cow::Borrowed(mesh)),
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextReport {
    pub query: BoundingBox,
    pub buffered: BoundingBox,
    pub tiles: Vec<TileId>,
    pub assembled_vertices: usize,
    pub assembled_faces: usize,
    pub inside_vertices: usize,
    pub straddling_faces: usize,
    pub kept_vertices: usize,
    pub kept_faces: usize,
    pub mode: TrimMode,
}

/// Trimmed context model and its report.
#[derive(Debug, Clone)]
pub struct ContextOutput {
    pub mesh: Mesh,
    pub report: ContextReport,
}

/// Builds context models from a tile registry.
#[derive(Debug, Clone)]
pub struct ContextPipeline {
    registry: TileRegistry,
    config: PipelineConfig,
}

impl ContextPipeline {
    pub fn new(registry: TileRegistry, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Tiles overlapping the query box buffered by the configured margin.
    ///
    /// # Errors
    /// `NoOverlappingTiles` when nothing overlaps and `require_tiles` is set.
    pub fn select(&self, query: &BoundingBox) -> Result<Vec<TileId>> {
        Ok(self.select_buffered(query)?.1)
    }

    fn select_buffered(&self, query: &BoundingBox) -> Result<(BoundingBox, Vec<TileId>)> {
        self.config.validate()?;
        let buffered = query.buffered(self.config.margin)?;
        let ids = self.registry.select(&buffered);

        tracing::info!(
            registry_tiles = self.registry.len(),
            selected = ids.len(),
            margin = self.config.margin,
            "Tile selection complete"
        );

        if ids.is_empty() && self.config.require_tiles {
            return Err(CoreError::NoOverlappingTiles.into());
        }
        Ok((buffered, ids))
    }

    /// Load the given tiles and merge them in ascending tile id order.
    pub fn assemble<S: TileSource + ?Sized>(&self, source: &S, ids: &[TileId]) -> Result<Mesh> {
        let mut tiles = Vec::with_capacity(ids.len());
        for id in ids {
            tiles.push((id.clone(), source.load_tile(id)?));
        }

        let (_, mesh) = assemble_tiles(tiles)?;
        tracing::info!(
            tiles = ids.len(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Assembly complete"
        );
        Ok(mesh)
    }

    /// Select, assemble, classify and trim.
    pub fn run<S: TileSource + ?Sized>(
        &self,
        query: &BoundingBox,
        solid: &BoundingSolid,
        source: &S,
    ) -> Result<ContextOutput> {
        let (buffered, mut ids) = self.select_buffered(query)?;
        ids.sort();

        let merged = self.assemble(source, &ids)?;

        let bounding = solid.to_mesh()?;
        let classifier = ContainmentClassifier::with_config(&bounding, self.config.classifier())?;
        let classification = classifier.classify(&merged);
        let stats = TrimStats::compute(&merged, &classification)?;

        tracing::info!(
            inside_vertices = classification.inside_count(),
            outside_vertices = classification.outside_count(),
            straddling_faces = stats.straddling_faces,
            "Classification complete"
        );

        let mesh = trim_mesh(&merged, &classification, self.config.keep)?;
        tracing::info!(
            mode = self.config.keep.as_str(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Trim complete"
        );

        let report = ContextReport {
            query: *query,
            buffered,
            tiles: ids,
            assembled_vertices: merged.vertex_count(),
            assembled_faces: merged.face_count(),
            inside_vertices: classification.inside_count(),
            straddling_faces: stats.straddling_faces,
            kept_vertices: mesh.vertex_count(),
            kept_faces: mesh.face_count(),
            mode: self.config.keep,
        };

        Ok(ContextOutput { mesh, report })
    }
}
