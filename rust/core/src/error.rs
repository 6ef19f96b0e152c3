// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for DXF reading and boundary export.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading drawings or writing boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure while reading a drawing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The group-code stream is malformed.
    #[error("DXF parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Export was requested for a loop that cannot form a polygon.
    #[error("boundary needs at least 3 vertices, got {count}")]
    InsufficientVertices { count: usize },

    /// Writing the polyline record failed.
    #[error("failed to export boundary to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
