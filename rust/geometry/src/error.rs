// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for boundary computations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors rejected before a boundary computation starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid alpha: {0} (must be a finite number >= 0)")]
    InvalidAlpha(f64),
}

/// Non-fatal findings reported alongside a (possibly empty) result.
///
/// A missing boundary is a legitimate outcome for sparse or pathological
/// input, so these never surface as `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("Insufficient points: {count} distinct, at least 4 required")]
    InsufficientPoints { count: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}
