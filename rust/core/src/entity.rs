// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed CAD drawing entities

use crate::point::Point2D;

/// Drawing primitive as delivered by a document reader.
///
/// Only the variants that carry linework are modelled; everything else is
/// kept as [`CadEntity::Other`] so ingestion can report it and move on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CadEntity {
    Line { start: Point2D, end: Point2D },
    Polyline { vertices: Vec<Point2D> },
    LwPolyline { vertices: Vec<Point2D> },
    Other { kind: String },
}

impl CadEntity {
    /// DXF type name of the entity
    pub fn kind(&self) -> &str {
        match self {
            CadEntity::Line { .. } => "LINE",
            CadEntity::Polyline { .. } => "POLYLINE",
            CadEntity::LwPolyline { .. } => "LWPOLYLINE",
            CadEntity::Other { kind } => kind,
        }
    }

    /// Number of points this entity contributes to a cloud
    pub fn point_count(&self) -> usize {
        match self {
            CadEntity::Line { .. } => 2,
            CadEntity::Polyline { vertices } | CadEntity::LwPolyline { vertices } => {
                vertices.len()
            }
            CadEntity::Other { .. } => 0,
        }
    }
}
