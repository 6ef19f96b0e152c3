// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flattening CAD entities into a point cloud
//!
//! Lines contribute both endpoints, polylines contribute every vertex in
//! entity order (arc bulges are treated as straight segments). Entities that
//! carry no linework are skipped and reported, never fatal.

use crate::entity::CadEntity;
use crate::point::{Point2D, PointCloud};

/// An entity that was skipped during ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnsupportedEntity {
    /// Position of the entity in the input sequence
    pub index: usize,
    /// DXF type name
    pub kind: String,
}

/// Result of one ingestion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    pub points: PointCloud,
    pub skipped: Vec<UnsupportedEntity>,
}

/// Receives advisory progress while entities are flattened.
///
/// Percentages are monotonically non-decreasing and end at 100 for a
/// non-empty batch.
pub trait ProgressObserver {
    fn on_progress(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressObserver for F {
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// Observer that ignores progress
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u8) {}
}

/// Flatten entities into a point cloud, discarding the skip report.
pub fn ingest(entities: &[CadEntity]) -> PointCloud {
    ingest_with_progress(entities, &mut NoProgress).points
}

/// Flatten entities into a point cloud, reporting progress and skipped entities.
pub fn ingest_with_progress<O>(entities: &[CadEntity], observer: &mut O) -> Ingested
where
    O: ProgressObserver + ?Sized,
{
    let total = entities.len();
    let capacity: usize = entities.iter().map(CadEntity::point_count).sum();
    let mut points: Vec<Point2D> = Vec::with_capacity(capacity);
    let mut skipped = Vec::new();
    let mut last_percent = None;

    for (idx, entity) in entities.iter().enumerate() {
        match entity {
            CadEntity::Line { start, end } => {
                points.push(*start);
                points.push(*end);
            }
            CadEntity::Polyline { vertices } | CadEntity::LwPolyline { vertices } => {
                points.extend_from_slice(vertices);
            }
            CadEntity::Other { kind } => skipped.push(UnsupportedEntity {
                index: idx,
                kind: kind.clone(),
            }),
        }

        let percent = (((idx + 1) * 100) / total) as u8;
        if last_percent != Some(percent) {
            observer.on_progress(percent);
            last_percent = Some(percent);
        }
    }

    Ingested {
        points: PointCloud::new(points),
        skipped,
    }
}
