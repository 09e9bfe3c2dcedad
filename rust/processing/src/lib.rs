// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context model pipeline shared by the CLI and embedding hosts.
//!
//! Selects the tiles around a query box, loads them from a [`TileSource`],
//! merges them and trims the result against a bounding solid.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{BoundingSolid, ContextOutput, ContextPipeline, ContextReport};
pub use source::{DirectoryTileSource, MemoryTileSource, TileSource};
