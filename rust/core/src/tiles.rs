// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile registry and tile selection
//!
//! A registry lists every tile of a dataset with its planar extent. Selection
//! is a linear scan with the strict overlap test from [`BoundingBox::intersects`];
//! registries hold a few thousand tiles, so no spatial index is needed.

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::fmt;

/// Tile identifier as published by the dataset provider
///
/// Ordering puts numeric ids first (ascending), then named ids (lexicographic).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TileId {
    Number(u64),
    Name(String),
}

impl TileId {
    /// Parse an id column value
    ///
    /// Only canonical unsigned integers become `Number`; text such as `007`
    /// or `+7` stays a `Name` so the id prints back exactly as written.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<u64>() {
            Ok(n) if n.to_string() == text => TileId::Number(n),
            _ => TileId::Name(text.to_string()),
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileId::Number(n) => write!(f, "{}", n),
            TileId::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TileId {
    fn from(n: u64) -> Self {
        TileId::Number(n)
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        TileId::Name(s.to_string())
    }
}

/// One row of the registry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileRecord {
    pub id: TileId,
    pub bounds: BoundingBox,
}

impl TileRecord {
    pub fn new(id: impl Into<TileId>, bounds: BoundingBox) -> Self {
        Self {
            id: id.into(),
            bounds,
        }
    }
}

/// Ordered, read-only collection of tile records with unique ids
#[derive(Debug, Clone, Default)]
pub struct TileRegistry {
    records: Vec<TileRecord>,
    /// Map from tile id to row position
    by_id: FxHashMap<TileId, usize>,
}

impl TileRegistry {
    /// Build a registry, rejecting duplicate ids
    pub fn new(records: Vec<TileRecord>) -> Result<Self> {
        let mut by_id = FxHashMap::default();
        by_id.reserve(records.len());

        for (row, record) in records.iter().enumerate() {
            if by_id.insert(record.id.clone(), row).is_some() {
                return Err(Error::DuplicateTileId(record.id.to_string()));
            }
        }

        Ok(Self { records, by_id })
    }

    /// Look up a record by id
    pub fn get(&self, id: &TileId) -> Option<&TileRecord> {
        self.by_id.get(id).map(|&row| &self.records[row])
    }

    /// Records in registry order
    pub fn iter(&self) -> impl Iterator<Item = &TileRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of all tiles overlapping `query`, in registry order
    pub fn select(&self, query: &BoundingBox) -> Vec<TileId> {
        select_tiles(query, self)
    }
}

/// Select the tiles whose extent strictly overlaps the query box
///
/// Tiles that only touch the query along an edge are not selected. The
/// result keeps registry order and uses each record's own id.
pub fn select_tiles(query: &BoundingBox, registry: &TileRegistry) -> Vec<TileId> {
    registry
        .iter()
        .filter(|record| query.intersects(&record.bounds))
        .map(|record| record.id.clone())
        .collect()
}

/// Like [`select_tiles`], but an empty selection is reported as `NoOverlappingTiles`
pub fn select_tiles_nonempty(query: &BoundingBox, registry: &TileRegistry) -> Result<Vec<TileId>> {
    let ids = select_tiles(query, registry);
    if ids.is_empty() {
        return Err(Error::NoOverlappingTiles);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> BoundingBox {
        BoundingBox::new(xmin, ymin, xmax, ymax).unwrap()
    }

    /// 3x3 grid of 10x10 tiles with ids 1..=9, row-major from the origin
    fn grid_registry() -> TileRegistry {
        let mut records = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                let id = (row * 3 + col + 1) as u64;
                let x = col as f64 * 10.0;
                let y = row as f64 * 10.0;
                records.push(TileRecord::new(id, bbox(x, y, x + 10.0, y + 10.0)));
            }
        }
        TileRegistry::new(records).unwrap()
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(TileId::parse(" 4242 "), TileId::Number(4242));
        assert_eq!(TileId::parse("0"), TileId::Number(0));
        assert_eq!(TileId::parse("007"), TileId::Name("007".to_string()));
        assert_eq!(TileId::parse("+7"), TileId::Name("+7".to_string()));
        assert_eq!(TileId::parse("37hn1"), TileId::Name("37hn1".to_string()));
        assert_eq!(TileId::parse("007").to_string(), "007");
    }

    #[test]
    fn test_edge_touching_tile_not_selected() {
        let registry =
            TileRegistry::new(vec![TileRecord::new(1u64, bbox(10.0, 0.0, 20.0, 10.0))]).unwrap();
        let query = bbox(0.0, 0.0, 10.0, 10.0);
        assert!(select_tiles(&query, &registry).is_empty());
        assert_eq!(
            select_tiles_nonempty(&query, &registry),
            Err(Error::NoOverlappingTiles)
        );
    }

    #[test]
    fn test_select_returns_registry_order() {
        let registry = grid_registry();
        let query = bbox(5.0, 5.0, 15.0, 15.0);
        let ids = registry.select(&query);
        assert_eq!(
            ids,
            vec![
                TileId::Number(1),
                TileId::Number(2),
                TileId::Number(4),
                TileId::Number(5)
            ]
        );
    }

    #[test]
    fn test_select_uses_explicit_ids_not_row_position() {
        let registry = TileRegistry::new(vec![
            TileRecord::new(42u64, bbox(100.0, 100.0, 110.0, 110.0)),
            TileRecord::new("37hn1_05", bbox(0.0, 0.0, 10.0, 10.0)),
        ])
        .unwrap();
        let ids = registry.select(&bbox(1.0, 1.0, 2.0, 2.0));
        assert_eq!(ids, vec![TileId::Name("37hn1_05".to_string())]);
    }

    #[test]
    fn test_interior_query_selects_single_tile() {
        let registry = grid_registry();
        let ids = registry.select(&bbox(12.0, 12.0, 18.0, 18.0));
        assert_eq!(ids, vec![TileId::Number(5)]);
    }

    #[test]
    fn test_growing_margin_never_drops_tiles() {
        let registry = grid_registry();
        let query = bbox(12.0, 12.0, 18.0, 18.0);
        let mut previous: Vec<TileId> = Vec::new();
        for step in 0..=20 {
            let margin = step as f64 * 0.25;
            let ids = registry.select(&query.buffered(margin).unwrap());
            for id in &previous {
                assert!(ids.contains(id), "margin {} dropped tile {}", margin, id);
            }
            previous = ids;
        }
        assert_eq!(previous.len(), 9);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = TileRegistry::new(vec![
            TileRecord::new(7u64, bbox(0.0, 0.0, 1.0, 1.0)),
            TileRecord::new(7u64, bbox(1.0, 0.0, 2.0, 1.0)),
        ]);
        assert_eq!(result.unwrap_err(), Error::DuplicateTileId("7".to_string()));
    }

    #[test]
    fn test_get_by_id() {
        let registry = grid_registry();
        let record = registry.get(&TileId::Number(9)).unwrap();
        assert_eq!(record.bounds, bbox(20.0, 20.0, 30.0, 30.0));
        assert!(registry.get(&TileId::Number(10)).is_none());
    }

    #[test]
    fn test_tile_id_parse_and_order() {
        assert_eq!(TileId::parse(" 12 "), TileId::Number(12));
        assert_eq!(TileId::parse("9-284-556"), TileId::Name("9-284-556".to_string()));

        let mut ids = vec![
            TileId::parse("b"),
            TileId::parse("10"),
            TileId::parse("a"),
            TileId::parse("2"),
        ];
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(rendered, vec!["2", "10", "a", "b"]);
    }
}
