// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use alpha_boundary_processing::{
    compute_boundary, export_boundary, load_points, spawn_load, BoundaryPipeline,
    BoundarySummary, ReaderConfig,
};
use approx::assert_relative_eq;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "alpha-boundary-processing-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir.join(name)
}

/// Site drawing: a 4x4 plot outline, one interior line and a text label
fn site_drawing() -> String {
    let mut dxf = String::from("0\nSECTION\n2\nENTITIES\n");
    dxf.push_str("0\nLWPOLYLINE\n8\nPLOT\n90\n4\n70\n1\n");
    for (x, y) in [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)] {
        let _ = write!(dxf, "10\n{x}\n20\n{y}\n");
    }
    dxf.push_str("0\nLINE\n8\nPATH\n10\n1\n20\n2\n11\n3\n21\n2\n");
    dxf.push_str("0\nTEXT\n8\nNOTES\n10\n2\n20\n3\n1\nPlot 7\n");
    dxf.push_str("0\nENDSEC\n0\nEOF\n");
    dxf
}

#[test]
fn load_compute_export_round_trip() {
    let input = scratch_path("site.dxf");
    let output = scratch_path("site_boundary.dxf");
    fs::write(&input, site_drawing()).unwrap();

    let cloud = load_points(&input, &ReaderConfig::default()).unwrap();
    assert_eq!(cloud.len(), 6);

    let boundary = compute_boundary(&cloud, 0.0).unwrap().expect("boundary");
    assert_relative_eq!(boundary.area(), 16.0, epsilon = 1e-12);

    export_boundary(&boundary, &output).unwrap();
    let reread = load_points(&output, &ReaderConfig::default()).unwrap();
    assert_eq!(reread.points(), boundary.vertices());

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn pipeline_reports_skipped_entities_and_summary() {
    let input = scratch_path("summary.dxf");
    fs::write(&input, site_drawing()).unwrap();

    let mut pipeline = BoundaryPipeline::new();
    assert_eq!(pipeline.load_file(&input, &ReaderConfig::default()).unwrap(), 6);
    assert_eq!(pipeline.skipped().len(), 1);
    assert_eq!(pipeline.skipped()[0].kind, "TEXT");

    let report = pipeline.compute(0.0).unwrap();
    assert_eq!(report.summary.vertex_count, 4);
    assert_relative_eq!(report.summary.perimeter, 16.0, epsilon = 1e-12);

    let json = report.summary.to_json().unwrap();
    let parsed: BoundarySummary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report.summary);

    fs::remove_file(&input).ok();
}

#[test]
fn oversized_alpha_yields_empty_summary() {
    let input = scratch_path("tight.dxf");
    fs::write(&input, site_drawing()).unwrap();

    let mut pipeline = BoundaryPipeline::new();
    pipeline.load_file(&input, &ReaderConfig::default()).unwrap();
    let report = pipeline.compute(50.0).unwrap();

    assert!(report.boundary.is_none());
    assert_eq!(report.summary.loop_count, 0);
    assert_eq!(report.summary.area, 0.0);

    fs::remove_file(&input).ok();
}

#[tokio::test]
async fn background_load_streams_progress() {
    let input = scratch_path("background.dxf");
    fs::write(&input, site_drawing()).unwrap();

    let mut task = spawn_load(input.clone(), ReaderConfig::default());
    let mut progress = Vec::new();
    while let Some(percent) = task.next_progress().await {
        progress.push(percent);
    }
    let ingested = task.finish().await.unwrap();

    assert_eq!(progress, vec![33, 66, 100]);
    assert_eq!(ingested.points.len(), 6);
    assert_eq!(ingested.skipped.len(), 1);

    fs::remove_file(&input).ok();
}
