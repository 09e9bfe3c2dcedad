// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;
use tilecontext_core::TileId;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a context model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Tile {0} not found")]
    TileNotFound(TileId),

    #[error("Tile id '{0}' cannot be used as a file name")]
    InvalidTileId(TileId),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] tilecontext_core::Error),

    #[error(transparent)]
    Geometry(#[from] tilecontext_geometry::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
