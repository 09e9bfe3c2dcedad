// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by bounds handling, tile selection and interchange parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Invalid margin {0}: margin must be a finite, non-negative fraction")]
    InvalidMargin(f64),

    #[error("No tiles overlap the query region")]
    NoOverlappingTiles,

    #[error("Duplicate tile id: {0}")]
    DuplicateTileId(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Face index {index} at line {line} does not reference a declared vertex")]
    FaceIndex { line: usize, index: i64 },
}

impl Error {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
