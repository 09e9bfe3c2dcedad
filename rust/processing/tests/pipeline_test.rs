// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry file + OBJ tile directory -> trimmed context model

use std::path::PathBuf;
use tilecontext_core::{load_tile_registry, BoundingBox, TileId};
use tilecontext_geometry::{extrude_polygon, parse_obj_mesh, write_obj_mesh, Point2, TrimMode};
use tilecontext_processing::{
    BoundingSolid, ContextPipeline, DirectoryTileSource, PipelineConfig,
};

const REGISTRY: &str = "\
tile_id,x1,y1,x2,y2
# west half
3,84000,446000,84100,446100
# east half
4,84100,446000,84200,446100
";

/// 10x10 block, 8 high, with its corner at (x, y)
fn block(x: f64, y: f64) -> String {
    let footprint = [
        Point2::new(x, y),
        Point2::new(x + 10.0, y),
        Point2::new(x + 10.0, y + 10.0),
        Point2::new(x, y + 10.0),
    ];
    write_obj_mesh(&extrude_polygon(&footprint, 8.0).unwrap())
}

fn tile_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tilecontext-pipeline-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tile_3.obj"), block(84040.0, 446040.0)).unwrap();
    std::fs::write(dir.join("tile_4.obj"), block(84150.0, 446040.0)).unwrap();
    dir
}

#[test]
fn test_directory_pipeline() {
    let dir = tile_dir();
    let registry = load_tile_registry(REGISTRY).unwrap();
    let source = DirectoryTileSource::new(&dir, "tile_");

    // West block only; the buffered box still reaches into tile 4
    let query = BoundingBox::new(84030.0, 446030.0, 84095.0, 446095.0).unwrap();
    let config = PipelineConfig {
        margin: 0.5,
        ..Default::default()
    };
    let pipeline = ContextPipeline::new(registry, config);

    let output = pipeline
        .run(&query, &BoundingSolid::from_bbox(&query, 50.0), &source)
        .unwrap();

    assert_eq!(output.report.tiles, vec![TileId::Number(3), TileId::Number(4)]);
    assert_eq!(output.report.assembled_vertices, 16);
    assert_eq!(output.report.kept_vertices, 8);
    assert_eq!(output.report.kept_faces, 12);
    assert_eq!(output.report.straddling_faces, 0);

    // Output survives the OBJ round trip the CLI performs
    let text = write_obj_mesh(&output.mesh);
    assert_eq!(parse_obj_mesh(&text).unwrap().mesh, output.mesh);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_outside_is_complement_without_straddlers() {
    let registry = load_tile_registry(REGISTRY).unwrap();
    let tiles = [(3u64, 84040.0), (4u64, 84150.0)]
        .into_iter()
        .map(|(id, x)| (TileId::Number(id), parse_obj_mesh(&block(x, 446040.0)).unwrap().mesh))
        .collect::<tilecontext_processing::MemoryTileSource>();

    let query = BoundingBox::new(84000.0, 446000.0, 84200.0, 446100.0).unwrap();
    // Solid around the west block only
    let solid = BoundingSolid::from_bbox(
        &BoundingBox::new(84035.0, 446035.0, 84055.0, 446055.0).unwrap(),
        20.0,
    );

    let run = |keep| {
        let config = PipelineConfig {
            keep,
            ..Default::default()
        };
        ContextPipeline::new(registry.clone(), config)
            .run(&query, &solid, &tiles)
            .unwrap()
    };

    let inside = run(TrimMode::KeepInside);
    let outside = run(TrimMode::KeepOutside);

    assert_eq!(inside.report.straddling_faces, 0);
    assert_eq!(
        inside.mesh.face_count() + outside.mesh.face_count(),
        inside.report.assembled_faces
    );
    assert_eq!(inside.mesh.face_count(), 12);
}
