// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LWPOLYLINE export
//!
//! Writes a closed boundary as a minimal DXF containing a single closed
//! `LWPOLYLINE` on layer `0`. The record is written to a sibling temporary
//! file and renamed over the destination, so a failed export never leaves a
//! truncated drawing behind.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::dxf::{parse_entities, ReaderConfig};
use crate::entity::CadEntity;
use crate::error::{Error, Result};
use crate::point::Point2D;
use crate::polygon::BoundaryLoop;

/// Render the polyline record for `vertices` (no trailing duplicate of the first vertex).
pub fn render_lwpolyline(vertices: &[Point2D]) -> Result<String> {
    if vertices.len() < 3 {
        return Err(Error::InsufficientVertices {
            count: vertices.len(),
        });
    }

    let mut out = String::with_capacity(64 + vertices.len() * 48);
    out.push_str("0\nSECTION\n2\nENTITIES\n");
    out.push_str("0\nLWPOLYLINE\n8\n0\n");
    // Writing to a String cannot fail
    let _ = write!(out, "90\n{}\n70\n1\n", vertices.len());
    for v in vertices {
        let _ = write!(out, "10\n{}\n20\n{}\n", v.x, v.y);
    }
    out.push_str("0\nENDSEC\n0\nEOF\n");
    Ok(out)
}

/// Export a boundary loop to `path`.
///
/// Loops with fewer than 3 vertices are rejected before any file is touched.
pub fn export_boundary(boundary: &BoundaryLoop, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let record = render_lwpolyline(boundary.vertices())?;

    let tmp = temp_path(path);
    let written = write_synced(&tmp, record.as_bytes()).and_then(|()| fs::rename(&tmp, path));

    written.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        Error::Export {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// `<dir>/<name>.tmp` next to the destination
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Re-read the vertices of the first LWPOLYLINE in DXF text
pub fn read_lwpolyline_vertices(content: &str) -> Result<Vec<Point2D>> {
    let entities = parse_entities(content, &ReaderConfig::default())?;
    Ok(entities
        .into_iter()
        .find_map(|e| match e {
            CadEntity::LwPolyline { vertices } => Some(vertices),
            _ => None,
        })
        .unwrap_or_default())
}
