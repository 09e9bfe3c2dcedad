// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile table reader
//!
//! Reads the flattened tile index (`tile_id, x1, y1, x2, y2`) that is produced
//! from the provider's tile metadata. One record per line, comma separated.
//! An optional header line, blank lines and `#` comments are skipped.

use nom::{
    bytes::complete::take_while,
    character::complete::char,
    combinator::{all_consuming, map},
    multi::separated_list1,
    IResult,
};

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::tiles::{TileId, TileRecord, TileRegistry};

/// Column count of the tile table
const COLUMN_COUNT: usize = 5;

/// Split a line into trimmed comma separated fields
fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list1(
        char(','),
        map(take_while(|c: char| c != ','), str::trim),
    ))(input)
}

#[inline]
fn parse_coordinate(text: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(text)
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse the tile table into records, keeping table order
///
/// The first non-comment line is treated as a header when its coordinate
/// columns are not numeric. Bounds are ordered per row; a row with x1 > x2 or
/// y1 > y2 is rejected rather than silently swapped.
pub fn parse_tile_table(content: &str) -> Result<Vec<TileRecord>> {
    let mut records = Vec::new();
    let mut seen_first_row = false;

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (_, columns) = fields(line)
            .map_err(|e| Error::parse(line_no, format!("Failed to split row: {}", e)))?;

        if columns.len() != COLUMN_COUNT {
            return Err(Error::parse(
                line_no,
                format!("expected {} columns, found {}", COLUMN_COUNT, columns.len()),
            ));
        }

        let coords: Option<Vec<f64>> = columns[1..].iter().map(|c| parse_coordinate(c)).collect();

        let first_row = !seen_first_row;
        seen_first_row = true;

        let coords = match coords {
            Some(coords) => coords,
            // Header row such as `tile_id,x1,y1,x2,y2`
            None if first_row => continue,
            None => {
                return Err(Error::parse(
                    line_no,
                    format!("non-numeric tile bounds in '{}'", line),
                ))
            }
        };

        if columns[0].is_empty() {
            return Err(Error::parse(line_no, "empty tile id"));
        }

        let bounds = BoundingBox::new(coords[0], coords[1], coords[2], coords[3])
            .map_err(|e| Error::parse(line_no, e.to_string()))?;

        records.push(TileRecord {
            id: TileId::parse(columns[0]),
            bounds,
        });
    }

    Ok(records)
}

/// Parse the tile table and build a registry (rejects duplicate ids)
pub fn load_tile_registry(content: &str) -> Result<TileRegistry> {
    TileRegistry::new(parse_tile_table(content)?)
}

/// Write records back in table form, with header
pub fn write_tile_table(records: &[TileRecord]) -> String {
    let mut out = String::from("tile_id,x1,y1,x2,y2\n");
    for record in records {
        let b = &record.bounds;
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            record.id, b.xmin, b.ymin, b.xmax, b.ymax
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        assert_eq!(fields("a, 1 ,2"), Ok(("", vec!["a", "1", "2"])));
        assert_eq!(fields("a,,b"), Ok(("", vec!["a", "", "b"])));
    }

    #[test]
    fn test_parse_with_header_and_comments() {
        let content = "\
tile_id,x1,y1,x2,y2
# first tile
5,84000.0,446000.0,85000.0,447000.0

6, 85000, 446000, 86000, 447000
";
        let records = parse_tile_table(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, TileId::Number(5));
        assert_eq!(records[0].bounds.xmin, 84000.0);
        assert_eq!(records[1].id, TileId::Number(6));
        assert_eq!(records[1].bounds.ymax, 447000.0);
    }

    #[test]
    fn test_parse_without_header() {
        let records = parse_tile_table("a1,0,0,1,1\nb2,1,0,2,1e0").unwrap();
        assert_eq!(records[0].id, TileId::Name("a1".to_string()));
        assert_eq!(records[1].bounds.ymax, 1.0);
    }

    #[test]
    fn test_non_numeric_data_row_fails_with_line() {
        let err = parse_tile_table("tile_id,x1,y1,x2,y2\n1,0,0,1,1\n2,0,zero,1,1").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
    }

    #[test]
    fn test_wrong_column_count() {
        let err = parse_tile_table("1,0,0,1").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_inverted_row_rejected() {
        let err = parse_tile_table("1,10,0,0,10").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = load_tile_registry("1,0,0,1,1\n1,1,0,2,1").unwrap_err();
        assert_eq!(err, Error::DuplicateTileId("1".to_string()));
    }

    #[test]
    fn test_ids_keep_their_text() {
        let records = load_tile_registry("007,0,0,1,1\n7,1,0,2,1\n+7,2,0,3,1").unwrap();
        let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, ["007", "7", "+7"]);
        assert_eq!(records.get(&TileId::Number(7)).map(|r| r.bounds.xmin), Some(1.0));

        let text = write_tile_table(records.records());
        assert_eq!(text, "tile_id,x1,y1,x2,y2\n007,0,0,1,1\n7,1,0,2,1\n+7,2,0,3,1\n");
        assert_eq!(parse_tile_table(&text).unwrap(), records.records());
    }

    #[test]
    fn test_write_then_parse_keeps_records() {
        let records = parse_tile_table("3,0.5,0,1,1\nx,1,0,2.25,1").unwrap();
        let text = write_tile_table(&records);
        assert!(text.starts_with("tile_id,x1,y1,x2,y2\n"));
        assert_eq!(parse_tile_table(&text).unwrap(), records);
    }
}
