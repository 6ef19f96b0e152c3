// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the processing pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] alpha_boundary_core::Error),

    #[error(transparent)]
    Geometry(#[from] alpha_boundary_geometry::Error),

    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The background ingestion task panicked or was dropped
    #[error("Ingestion worker failed: {0}")]
    WorkerFailed(String),
}
