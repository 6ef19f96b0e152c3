// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use alpha_boundary_core::{
    export_boundary, ingest, parse_entities, read_entities, read_lwpolyline_vertices,
    BoundaryLoop, CadEntity, Error, Point2D, ReaderConfig,
};
use approx::assert_relative_eq;
use std::fs;
use std::path::PathBuf;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("alpha-boundary-core-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir.join(name)
}

fn square_loop() -> BoundaryLoop {
    BoundaryLoop::new(vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(2.0, 0.0),
        Point2D::new(2.0, 2.0),
        Point2D::new(0.0, 2.0),
    ])
}

#[test]
fn exported_square_has_expected_record() {
    let path = scratch_path("square.dxf");
    export_boundary(&square_loop(), &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("0\nSECTION\n2\nENTITIES\n0\nLWPOLYLINE\n8\n0\n"));
    assert!(written.contains("90\n4\n70\n1\n"));
    assert!(written.ends_with("0\nENDSEC\n0\nEOF\n"));
    assert_eq!(written.matches("\n10\n").count(), 4);
    assert_eq!(written.matches("\n20\n").count(), 4);

    let vertices = read_lwpolyline_vertices(&written).unwrap();
    assert_eq!(vertices, square_loop().vertices());

    // No temporary file is left next to the output
    assert!(!path.with_file_name("square.dxf.tmp").exists());
    fs::remove_file(&path).ok();
}

#[test]
fn export_round_trips_awkward_coordinates() {
    let ring = BoundaryLoop::new(vec![
        Point2D::new(-1234.5678901234, 0.1),
        Point2D::new(1.0 / 3.0, -2.0 / 7.0),
        Point2D::new(9.87654321e7, 1e-12),
        Point2D::new(0.0, 42.0),
    ]);
    let path = scratch_path("awkward.dxf");
    export_boundary(&ring, &path).unwrap();

    let vertices = read_lwpolyline_vertices(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(vertices.len(), ring.len());
    for (read, original) in vertices.iter().zip(ring.vertices()) {
        assert_relative_eq!(read.x, original.x);
        assert_relative_eq!(read.y, original.y);
    }
    fs::remove_file(&path).ok();
}

#[test]
fn exported_file_is_readable_as_drawing() {
    let path = scratch_path("reread.dxf");
    export_boundary(&square_loop(), &path).unwrap();

    let entities = read_entities(&path, &ReaderConfig::default()).unwrap();
    assert_eq!(entities.len(), 1);
    assert!(matches!(entities[0], CadEntity::LwPolyline { .. }));
    assert_eq!(ingest(&entities).len(), 4);
    fs::remove_file(&path).ok();
}

#[test]
fn short_loop_is_rejected_before_io() {
    let path = scratch_path("never-written.dxf");
    let ring = BoundaryLoop::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)]);

    let err = export_boundary(&ring, &path).unwrap_err();
    assert!(matches!(err, Error::InsufficientVertices { count: 2 }));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_reports_export_error() {
    let path = scratch_path("missing-dir").join("nested").join("out.dxf");
    let err = export_boundary(&square_loop(), &path).unwrap_err();

    match err {
        Error::Export { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!path.exists());
}

#[test]
fn failed_export_keeps_previous_file() {
    let path = scratch_path("keep.dxf");
    fs::write(&path, "previous").unwrap();

    let ring = BoundaryLoop::new(vec![Point2D::new(0.0, 0.0)]);
    assert!(export_boundary(&ring, &path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    fs::remove_file(&path).ok();
}

#[test]
fn mixed_drawing_ingests_linework_only() {
    let dxf = concat!(
        "0\nSECTION\n2\nENTITIES\n",
        "0\nLINE\n8\nWALLS\n10\n0\n20\n0\n11\n10\n21\n0\n",
        "0\nTEXT\n8\nNOTES\n10\n5\n20\n5\n1\nLabel\n",
        "0\nLWPOLYLINE\n8\nWALLS\n90\n3\n70\n0\n10\n10\n20\n0\n10\n10\n20\n10\n10\n0\n20\n10\n",
        "0\nENDSEC\n0\nEOF\n",
    );
    let entities = parse_entities(dxf, &ReaderConfig::default()).unwrap();
    assert_eq!(entities.len(), 3);

    let cloud = ingest(&entities);
    assert_eq!(cloud.len(), 5);
    assert_eq!(cloud.points()[4], Point2D::new(0.0, 10.0));
}
