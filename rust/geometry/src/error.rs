// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Vertex index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange { index: usize, vertex_count: usize },

    #[error("Classification covers {actual} vertices, mesh has {expected}")]
    ClassificationMismatch { expected: usize, actual: usize },

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Core error: {0}")]
    Core(#[from] tilecontext_core::Error),
}

impl Error {
    /// Create a degenerate geometry error
    pub fn degenerate(message: impl Into<String>) -> Self {
        Error::DegenerateGeometry(message.into())
    }
}
