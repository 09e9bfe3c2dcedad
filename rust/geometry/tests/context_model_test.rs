// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end geometry: tiles -> merged mesh -> trimmed context model

use approx::assert_relative_eq;
use tilecontext_core::{BoundingBox, TileId};
use tilecontext_geometry::{
    assemble_tiles, extrude_bounding_box, extrude_polygon, parse_obj_mesh, trim_mesh,
    write_obj_mesh, ContainmentClassifier, Point2, Point3, TrimMode, TrimStats,
};

/// One building per tile: a 4x4 block, 6 high, at the given origin
fn building_tile(x: f64, y: f64) -> String {
    let footprint = [
        Point2::new(x, y),
        Point2::new(x + 4.0, y),
        Point2::new(x + 4.0, y + 4.0),
        Point2::new(x, y + 4.0),
    ];
    write_obj_mesh(&extrude_polygon(&footprint, 6.0).unwrap())
}

#[test]
fn test_trim_context_to_query_box() {
    let tiles = vec![
        (TileId::Number(12), building_tile(20.0, 0.0)),
        (TileId::Number(11), building_tile(2.0, 2.0)),
        (TileId::Number(13), building_tile(8.0, 2.0)),
    ];
    let meshes = tiles
        .into_iter()
        .map(|(id, text)| (id, parse_obj_mesh(&text).unwrap().mesh))
        .collect();

    let (order, merged) = assemble_tiles(meshes).unwrap();
    assert_eq!(
        order,
        vec![TileId::Number(11), TileId::Number(12), TileId::Number(13)]
    );
    assert_eq!(merged.vertex_count(), 24);
    assert_eq!(merged.face_count(), 36);
    // Tile 12 occupies indices 8..16
    assert_eq!(merged.vertices()[8], Point3::new(20.0, 0.0, 0.0));

    // Covers building 11 entirely, building 13 partly, building 12 not at all
    let query = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
    let solid = extrude_bounding_box(&query, 100.0).unwrap();
    let classifier = ContainmentClassifier::new(&solid).unwrap();
    let classification = classifier.classify(&merged);

    let inside = trim_mesh(&merged, &classification, TrimMode::KeepInside).unwrap();
    let outside = trim_mesh(&merged, &classification, TrimMode::KeepOutside).unwrap();
    let stats = TrimStats::compute(&merged, &classification).unwrap();

    // Building 11 whole plus the x=8 wall of building 13
    assert_eq!(inside.face_count(), 14);
    assert_eq!(stats.straddling_faces, 8);
    assert_eq!(outside.face_count(), 14);
    assert_eq!(
        inside.face_count() + outside.face_count() + stats.straddling_faces,
        merged.face_count()
    );
    assert_eq!(
        inside.vertex_count() + outside.vertex_count(),
        merged.vertex_count()
    );

    let (min, max) = inside.bounds();
    assert_eq!(min, Point3::new(2.0, 2.0, 0.0));
    assert_relative_eq!(max.x, 8.0);
    assert_relative_eq!(max.z, 6.0);
}

#[test]
fn test_assembly_is_deterministic() {
    let build = || {
        let tiles = (0..5u64)
            .map(|i| {
                let text = building_tile(i as f64 * 5.0, 0.0);
                (TileId::Number(i), parse_obj_mesh(&text).unwrap().mesh)
            })
            .collect();
        assemble_tiles(tiles).unwrap().1
    };

    assert_eq!(write_obj_mesh(&build()), write_obj_mesh(&build()));
}
