// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # TileContext Core
//!
//! Planar query bounds, the tile registry and the interchange readers used by
//! the context-model pipeline.
//!
//! ## Overview
//!
//! - **Bounds**: ordered query rectangles and proportional buffering
//! - **Tiles**: tile ids, the tile registry and strict-overlap tile selection
//! - **Table**: reader/writer for the `tile_id, x1, y1, x2, y2` tile index
//! - **OBJ**: [nom](https://docs.rs/nom) based Wavefront OBJ reader/writer
//!   (1-based on disk, 0-based in memory)
//!
//! ## Quick Start
//!
//! ```rust
//! use tilecontext_core::{load_tile_registry, BoundingBox, TileId};
//!
//! let registry = load_tile_registry("tile_id,x1,y1,x2,y2\n1,0,0,10,10\n2,10,0,20,10\n").unwrap();
//! let query = BoundingBox::new(2.0, 2.0, 6.0, 6.0).unwrap();
//!
//! // A 50% margin still stays clear of tile 2
//! let ids = registry.select(&query.buffered(0.5).unwrap());
//! assert_eq!(ids, vec![TileId::Number(1)]);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for bounds and tile records

pub mod bounds;
pub mod error;
pub mod obj;
pub mod table;
pub mod tiles;

pub use bounds::BoundingBox;
pub use error::{Error, Result};
pub use obj::{parse_obj, write_obj, ObjData};
pub use table::{load_tile_registry, parse_tile_table, write_tile_table};
pub use tiles::{select_tiles, select_tiles_nonempty, TileId, TileRecord, TileRegistry};
