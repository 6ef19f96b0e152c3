// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Alpha-Boundary Core
//!
//! Data model and file plumbing for boundary extraction from CAD linework.
//!
//! ## Overview
//!
//! - **DXF Reading**: group-code tokenisation with [nom](https://docs.rs/nom)
//!   and typed decoding of `LINE`, `LWPOLYLINE` and `POLYLINE` entities
//! - **Ingestion**: flattening entities into an ordered [`PointCloud`] with
//!   advisory progress reporting
//! - **Export**: writing a closed [`BoundaryLoop`] as a DXF `LWPOLYLINE`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alpha_boundary_core::{read_entities, ingest, export_boundary, ReaderConfig};
//!
//! let entities = read_entities("site.dxf", &ReaderConfig::default())?;
//! let cloud = ingest(&entities);
//! println!("{} points", cloud.len());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for points, entities and loops

pub mod dxf;
pub mod entity;
pub mod error;
pub mod export;
pub mod ingest;
pub mod point;
pub mod polygon;

pub use dxf::{parse_entities, read_entities, tokenize, GroupPair, ReaderConfig};
pub use entity::CadEntity;
pub use error::{Error, Result};
pub use export::{export_boundary, read_lwpolyline_vertices, render_lwpolyline};
pub use ingest::{ingest, ingest_with_progress, Ingested, NoProgress, ProgressObserver, UnsupportedEntity};
pub use point::{Bounds, Point2D, PointCloud};
pub use polygon::{signed_area, BoundaryLoop};
