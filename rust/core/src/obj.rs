// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ reader and writer using nom
//!
//! Only geometry is kept: `v` positions and `f` faces. Face references in the
//! file are 1-based (or negative, relative to the last declared vertex); the
//! parsed data is 0-based. Polygons with more than three references are fan
//! triangulated. Normals, texture coordinates, groups, smoothing and material
//! statements are skipped.

use nom::{
    bytes::complete::take_while1,
    character::complete::{space0, space1},
    combinator::{all_consuming, map, map_res},
    multi::{fold_many1, many0},
    number::complete::recognize_float,
    sequence::{preceded, tuple},
    IResult,
};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Geometry read from an OBJ document, with 0-based face indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    /// Vertex positions in file order
    pub vertices: Vec<[f64; 3]>,
    /// Triangles referencing `vertices`
    pub faces: Vec<[u32; 3]>,
}

impl ObjData {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

type FaceRefs = SmallVec<[i64; 4]>;

/// Statement keyword: `v`, `vn`, `f`, `usemtl`, ...
fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Float coordinate: 1, -2.5, 3.0e-4
fn coordinate(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, |s: &str| fast_float::parse::<f64, _>(s))(input)
}

/// Arguments of a `v` statement: x y z, followed by optional w or vertex colors
fn vertex_args(input: &str) -> IResult<&str, [f64; 3]> {
    map(
        tuple((
            preceded(space1, coordinate),
            preceded(space1, coordinate),
            preceded(space1, coordinate),
            many0(preceded(space1, coordinate)),
            space0,
        )),
        |(x, y, z, _, _)| [x, y, z],
    )(input)
}

/// Single face reference: `7`, `7/2`, `7//3`, `-1/-1/-1`; only the position index is kept
fn face_ref(input: &str) -> IResult<&str, i64> {
    map_res(
        take_while1(|c: char| !c.is_whitespace()),
        |token: &str| token.split('/').next().unwrap_or(token).parse::<i64>(),
    )(input)
}

/// Arguments of an `f` statement
fn face_args(input: &str) -> IResult<&str, FaceRefs> {
    map(
        tuple((
            fold_many1(
                preceded(space1, face_ref),
                FaceRefs::new,
                |mut refs, r| {
                    refs.push(r);
                    refs
                },
            ),
            space0,
        )),
        |(refs, _)| refs,
    )(input)
}

/// A face reference resolved to 0-based, bound-checked later against the total vertex count
struct PendingFace {
    line: usize,
    raw: FaceRefs,
    resolved: FaceRefs,
}

/// Parse OBJ text into vertices and triangles
///
/// # Errors
/// `Parse` for malformed `v`/`f` statements, `FaceIndex` for references to
/// vertex 0 or to vertices that are never declared.
pub fn parse_obj(content: &str) -> Result<ObjData> {
    let mut vertices: Vec<[f64; 3]> = Vec::new();
    let mut pending: Vec<PendingFace> = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        // Strip trailing comments
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };
        let line = line.trim_start();
        if line.is_empty() {
            continue;
        }

        let (rest, kw) = keyword(line)
            .map_err(|e| Error::parse(line_no, format!("Failed to read statement: {}", e)))?;

        match kw {
            "v" => {
                let (_, position) = all_consuming(vertex_args)(rest).map_err(|e| {
                    Error::parse(line_no, format!("Failed to parse vertex: {}", e))
                })?;
                vertices.push(position);
            }
            "f" => {
                let (_, raw) = all_consuming(face_args)(rest)
                    .map_err(|e| Error::parse(line_no, format!("Failed to parse face: {}", e)))?;
                if raw.len() < 3 {
                    return Err(Error::parse(
                        line_no,
                        format!("face needs at least 3 vertices, found {}", raw.len()),
                    ));
                }

                let declared = vertices.len() as i64;
                let mut resolved = FaceRefs::new();
                for &r in &raw {
                    let zero_based = match r {
                        0 => return Err(Error::FaceIndex { line: line_no, index: r }),
                        r if r > 0 => r - 1,
                        r => declared + r,
                    };
                    if zero_based < 0 {
                        return Err(Error::FaceIndex { line: line_no, index: r });
                    }
                    resolved.push(zero_based);
                }
                pending.push(PendingFace {
                    line: line_no,
                    raw,
                    resolved,
                });
            }
            _ => {}
        }
    }

    let vertex_count = vertices.len() as i64;
    let mut faces = Vec::with_capacity(pending.len());
    for face in pending {
        if let Some(pos) = face.resolved.iter().position(|&i| i >= vertex_count) {
            return Err(Error::FaceIndex {
                line: face.line,
                index: face.raw[pos],
            });
        }
        // Fan triangulation of polygons
        for k in 1..face.resolved.len() - 1 {
            faces.push([
                face.resolved[0] as u32,
                face.resolved[k] as u32,
                face.resolved[k + 1] as u32,
            ]);
        }
    }

    Ok(ObjData { vertices, faces })
}

/// Write vertices and triangles as OBJ text with 1-based face indices
pub fn write_obj(data: &ObjData) -> String {
    let mut out = String::with_capacity(data.vertices.len() * 32 + data.faces.len() * 16);
    for [x, y, z] in &data.vertices {
        out.push_str(&format!("v {} {} {}\n", x, y, z));
    }
    for [a, b, c] in &data.faces {
        out.push_str(&format!("f {} {} {}\n", a + 1, b + 1, c + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_args() {
        assert_eq!(vertex_args(" 1 -2.5 3e2"), Ok(("", [1.0, -2.5, 300.0])));
        // Homogeneous w and vertex colors are accepted and dropped
        assert_eq!(vertex_args(" 1 2 3 1.0"), Ok(("", [1.0, 2.0, 3.0])));
        assert_eq!(vertex_args(" 1 2 3 0.5 0.5 0.5 "), Ok(("", [1.0, 2.0, 3.0])));
        assert!(vertex_args(" 1 2").is_err());
    }

    #[test]
    fn test_face_ref_forms() {
        assert_eq!(face_ref("7"), Ok(("", 7)));
        assert_eq!(face_ref("7/2"), Ok(("", 7)));
        assert_eq!(face_ref("7//3"), Ok(("", 7)));
        assert_eq!(face_ref("-1/-1/-1"), Ok(("", -1)));
        assert!(face_ref("x/1").is_err());
    }

    #[test]
    fn test_parse_converts_to_zero_based() {
        let obj = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(obj.vertex_count(), 3);
        assert_eq!(obj.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_parse_skips_other_statements() {
        let content = "\
# exported tile
mtllib tile.mtl
o building_1
v 0 0 0
v 1 0 0
v 1 1 0
vn 0 0 1
vt 0 0
usemtl wall
s off
f 1//1 2//1 3//1 # trailing comment
";
        let obj = parse_obj(content).unwrap();
        assert_eq!(obj.vertex_count(), 3);
        assert_eq!(obj.face_count(), 1);
    }

    #[test]
    fn test_negative_references_are_relative() {
        let obj = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\nv 0 1 0\nf -4 -2 -1").unwrap();
        assert_eq!(obj.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_polygon_fan_triangulated() {
        let obj = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4").unwrap();
        assert_eq!(obj.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_out_of_range_reference() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 4").unwrap_err();
        assert_eq!(err, Error::FaceIndex { line: 4, index: 4 });

        let err = parse_obj("v 0 0 0\nf 0 1 1").unwrap_err();
        assert_eq!(err, Error::FaceIndex { line: 2, index: 0 });

        let err = parse_obj("v 0 0 0\nf -2 1 1").unwrap_err();
        assert_eq!(err, Error::FaceIndex { line: 2, index: -2 });
    }

    #[test]
    fn test_malformed_statements() {
        assert!(matches!(
            parse_obj("v 0 zero 0").unwrap_err(),
            Error::Parse { line: 1, .. }
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2").unwrap_err(),
            Error::Parse { line: 3, .. }
        ));
    }

    #[test]
    fn test_write_uses_one_based_indices() {
        let data = ObjData::new(
            vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0], [0.0, 2.0, 0.25]],
            vec![[0, 1, 2]],
        );
        let text = write_obj(&data);
        assert_eq!(text, "v 0 0 0\nv 1.5 0 0\nv 0 2 0.25\nf 1 2 3\n");
        assert_eq!(parse_obj(&text).unwrap(), data);
    }

    #[test]
    fn test_large_coordinates_round_trip_exactly() {
        let data = ObjData::new(
            vec![
                [85123.456789, 446789.012345, 12.3456],
                [85124.0, 446790.0, 0.0],
                [85125.5, 446789.5, 3.0],
            ],
            vec![[2, 0, 1]],
        );
        assert_eq!(parse_obj(&write_obj(&data)).unwrap(), data);
    }
}
