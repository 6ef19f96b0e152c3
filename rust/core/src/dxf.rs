// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASCII DXF reader using nom
//!
//! A DXF file is a flat stream of `(group code, value)` pairs, each taking
//! two lines. Only the `ENTITIES` section is decoded, and only the entity
//! types that carry linework are turned into typed [`CadEntity`] values.
//! Everything else becomes [`CadEntity::Other`].

use nom::{
    branch::alt,
    character::complete::{char, digit1, line_ending, not_line_ending, space0},
    combinator::{eof, map_res, opt, recognize},
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};
use std::path::Path;

use crate::entity::CadEntity;
use crate::error::{Error, Result};
use crate::point::Point2D;

/// Polyline flag: 3D polygon mesh
const POLYLINE_MESH: i64 = 16;
/// Polyline flag: polyface mesh
const POLYLINE_POLYFACE: i64 = 64;
/// Vertex flag: polyface mesh vertex
const VERTEX_POLYFACE: i64 = 64;
/// Vertex flag: polyface face record (carries indices, not a location)
const VERTEX_FACE_RECORD: i64 = 128;

/// One `(group code, value)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupPair<'a> {
    pub code: i32,
    pub value: &'a str,
    /// 1-based line of the group code
    pub line: usize,
}

/// Options for decoding drawing entities
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Read entities flagged as paper space (group code 67 = 1)
    pub include_paper_space: bool,
    /// Report mesh/polyface `POLYLINE`s as unsupported instead of reading their vertices
    pub skip_mesh_polylines: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            include_paper_space: false,
            skip_mesh_polylines: true,
        }
    }
}

/// Parse group code: 0, 10, -1
fn group_code(input: &str) -> IResult<&str, i32> {
    map_res(
        delimited(space0, recognize(pair(opt(char('-')), digit1)), space0),
        |s: &str| s.parse::<i32>(),
    )(input)
}

/// Parse a code line followed by its value line
fn group_pair(input: &str) -> IResult<&str, (i32, &str)> {
    tuple((
        terminated(group_code, line_ending),
        terminated(not_line_ending, alt((line_ending, eof))),
    ))(input)
}

/// Split DXF text into group pairs
pub fn tokenize(content: &str) -> Result<Vec<GroupPair<'_>>> {
    let mut rest = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut pairs = Vec::with_capacity(content.len() / 16);

    while !rest.trim().is_empty() {
        let line = pairs.len() * 2 + 1;
        match group_pair(rest) {
            Ok((next, (code, value))) => {
                pairs.push(GroupPair {
                    code,
                    value: value.trim(),
                    line,
                });
                rest = next;
            }
            Err(_) => return Err(Error::parse(line, "expected an integer group code")),
        }
    }

    Ok(pairs)
}

/// Read and decode the entities of a DXF file
pub fn read_entities(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Vec<CadEntity>> {
    let content = std::fs::read_to_string(path)?;
    parse_entities(&content, config)
}

/// Decode the entities of DXF text
pub fn parse_entities(content: &str, config: &ReaderConfig) -> Result<Vec<CadEntity>> {
    let pairs = tokenize(content)?;
    let Some(section) = entities_section(&pairs) else {
        return Ok(Vec::new());
    };

    let records = split_records(section);
    let mut entities = Vec::with_capacity(records.len());
    let mut i = 0;

    while i < records.len() {
        let record = &records[i];
        i += 1;

        if !config.include_paper_space && record.int(67)?.unwrap_or(0) == 1 {
            // POLYLINE owns the VERTEX/SEQEND records that follow it
            if record.kind == "POLYLINE" {
                i = skip_vertices(&records, i);
            }
            continue;
        }

        let entity = match record.kind {
            "LINE" => CadEntity::Line {
                start: Point2D::new(record.float_or_zero(10)?, record.float_or_zero(20)?),
                end: Point2D::new(record.float_or_zero(11)?, record.float_or_zero(21)?),
            },
            "LWPOLYLINE" => CadEntity::LwPolyline {
                vertices: record.lw_vertices()?,
            },
            "POLYLINE" => {
                let flags = record.int(70)?.unwrap_or(0);
                let end = skip_vertices(&records, i);
                let vertex_records = &records[i..end];
                i = end;

                if config.skip_mesh_polylines && flags & (POLYLINE_MESH | POLYLINE_POLYFACE) != 0 {
                    let kind = if flags & POLYLINE_POLYFACE != 0 {
                        "POLYFACE"
                    } else {
                        "POLYMESH"
                    };
                    CadEntity::Other { kind: kind.into() }
                } else {
                    let mut vertices = Vec::with_capacity(vertex_records.len());
                    for vertex in vertex_records.iter().filter(|r| r.kind == "VERTEX") {
                        let vflags = vertex.int(70)?.unwrap_or(0);
                        if vflags & VERTEX_FACE_RECORD != 0 && vflags & VERTEX_POLYFACE == 0 {
                            continue;
                        }
                        vertices.push(Point2D::new(
                            vertex.float_or_zero(10)?,
                            vertex.float_or_zero(20)?,
                        ));
                    }
                    CadEntity::Polyline { vertices }
                }
            }
            other => CadEntity::Other { kind: other.to_string() },
        };
        entities.push(entity);
    }

    Ok(entities)
}

/// Slice of pairs between `0/SECTION 2/ENTITIES` and the matching `0/ENDSEC`
fn entities_section<'p, 'a>(pairs: &'p [GroupPair<'a>]) -> Option<&'p [GroupPair<'a>]> {
    let start = pairs.windows(2).position(|w| {
        w[0].code == 0 && w[0].value == "SECTION" && w[1].code == 2 && w[1].value == "ENTITIES"
    })? + 2;

    let len = pairs[start..]
        .iter()
        .position(|p| p.code == 0 && p.value == "ENDSEC")
        .unwrap_or(pairs.len() - start);

    Some(&pairs[start..start + len])
}

/// One entity record: the `0/<TYPE>` pair and the pairs up to the next code 0
struct Record<'p, 'a> {
    kind: &'a str,
    fields: &'p [GroupPair<'a>],
}

fn split_records<'p, 'a>(section: &'p [GroupPair<'a>]) -> Vec<Record<'p, 'a>> {
    let mut records = Vec::new();
    let mut start = 0;

    while start < section.len() {
        let end = section[start + 1..]
            .iter()
            .position(|p| p.code == 0)
            .map(|offset| start + 1 + offset)
            .unwrap_or(section.len());

        if section[start].code == 0 {
            records.push(Record {
                kind: section[start].value,
                fields: &section[start + 1..end],
            });
        }
        start = end;
    }

    records
}

/// Index of the first record after a POLYLINE's VERTEX run (SEQEND consumed)
fn skip_vertices(records: &[Record<'_, '_>], mut i: usize) -> usize {
    while i < records.len() && records[i].kind == "VERTEX" {
        i += 1;
    }
    if i < records.len() && records[i].kind == "SEQEND" {
        i += 1;
    }
    i
}

impl<'p, 'a> Record<'p, 'a> {
    fn field(&self, code: i32) -> Option<&'p GroupPair<'a>> {
        self.fields.iter().find(|p| p.code == code)
    }

    fn float_or_zero(&self, code: i32) -> Result<f64> {
        self.field(code).map(parse_float).transpose().map(|v| v.unwrap_or(0.0))
    }

    fn int(&self, code: i32) -> Result<Option<i64>> {
        self.field(code)
            .map(|p| {
                p.value
                    .parse::<i64>()
                    .map_err(|_| Error::parse(p.line + 1, format!("invalid integer '{}'", p.value)))
            })
            .transpose()
    }

    /// LWPOLYLINE vertices: every 10 opens a vertex, the next 20 completes it
    fn lw_vertices(&self) -> Result<Vec<Point2D>> {
        let mut vertices: Vec<Point2D> = Vec::new();
        for p in self.fields {
            match p.code {
                10 => vertices.push(Point2D::new(parse_float(p)?, 0.0)),
                20 => {
                    if let Some(last) = vertices.last_mut() {
                        last.y = parse_float(p)?;
                    }
                }
                _ => {}
            }
        }
        Ok(vertices)
    }
}

fn parse_float(p: &GroupPair<'_>) -> Result<f64> {
    fast_float::parse::<f64, _>(p.value)
        .map_err(|_| Error::parse(p.line + 1, format!("invalid number '{}'", p.value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(entities: &str) -> String {
        format!(
            "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1015\n0\nENDSEC\n0\nSECTION\n2\nENTITIES\n{}0\nENDSEC\n0\nEOF\n",
            entities
        )
    }

    #[test]
    fn tokenize_handles_crlf_and_padding() {
        let pairs = tokenize("  0\r\nSECTION\r\n  2\r\nENTITIES  \r\n").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].code, 0);
        assert_eq!(pairs[0].value, "SECTION");
        assert_eq!(pairs[1].value, "ENTITIES");
        assert_eq!(pairs[1].line, 3);
    }

    #[test]
    fn tokenize_rejects_non_numeric_code() {
        let err = tokenize("0\nSECTION\nabc\nENTITIES\n").unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reads_line_entity() {
        let dxf = wrap("0\nLINE\n8\n0\n10\n1.5\n20\n2.5\n30\n0.0\n11\n-3\n21\n4e1\n31\n0.0\n");
        let entities = parse_entities(&dxf, &ReaderConfig::default()).unwrap();
        assert_eq!(
            entities,
            vec![CadEntity::Line {
                start: Point2D::new(1.5, 2.5),
                end: Point2D::new(-3.0, 40.0),
            }]
        );
    }

    #[test]
    fn reads_lwpolyline_and_ignores_bulge() {
        let dxf = wrap(
            "0\nLWPOLYLINE\n8\n0\n90\n3\n70\n1\n10\n0\n20\n0\n42\n0.5\n10\n2\n20\n0\n10\n2\n20\n2\n",
        );
        let entities = parse_entities(&dxf, &ReaderConfig::default()).unwrap();
        assert_eq!(
            entities,
            vec![CadEntity::LwPolyline {
                vertices: vec![
                    Point2D::new(0.0, 0.0),
                    Point2D::new(2.0, 0.0),
                    Point2D::new(2.0, 2.0),
                ],
            }]
        );
    }

    #[test]
    fn reads_polyline_vertices_until_seqend() {
        let dxf = wrap(concat!(
            "0\nPOLYLINE\n8\n0\n66\n1\n70\n0\n",
            "0\nVERTEX\n8\n0\n10\n1\n20\n1\n",
            "0\nVERTEX\n8\n0\n10\n5\n20\n1\n",
            "0\nSEQEND\n8\n0\n",
            "0\nCIRCLE\n8\n0\n10\n0\n20\n0\n40\n1\n",
        ));
        let entities = parse_entities(&dxf, &ReaderConfig::default()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(
            entities[0],
            CadEntity::Polyline {
                vertices: vec![Point2D::new(1.0, 1.0), Point2D::new(5.0, 1.0)],
            }
        );
        assert_eq!(entities[1].kind(), "CIRCLE");
    }

    #[test]
    fn polyface_polyline_is_reported_as_unsupported() {
        let dxf = wrap(concat!(
            "0\nPOLYLINE\n8\n0\n70\n64\n",
            "0\nVERTEX\n10\n1\n20\n1\n70\n192\n",
            "0\nVERTEX\n70\n128\n71\n1\n",
            "0\nSEQEND\n",
        ));
        let entities = parse_entities(&dxf, &ReaderConfig::default()).unwrap();
        assert_eq!(entities, vec![CadEntity::Other { kind: "POLYFACE".into() }]);
    }

    #[test]
    fn paper_space_entities_are_excluded_by_default() {
        let dxf = wrap("0\nLINE\n67\n1\n10\n0\n20\n0\n11\n1\n21\n1\n0\nLINE\n10\n2\n20\n2\n11\n3\n21\n3\n");
        let model_only = parse_entities(&dxf, &ReaderConfig::default()).unwrap();
        assert_eq!(model_only.len(), 1);

        let config = ReaderConfig {
            include_paper_space: true,
            ..Default::default()
        };
        assert_eq!(parse_entities(&dxf, &config).unwrap().len(), 2);
    }

    #[test]
    fn bad_coordinate_reports_value_line() {
        let dxf = "0\nSECTION\n2\nENTITIES\n0\nLINE\n10\nnope\n0\nENDSEC\n";
        match parse_entities(dxf, &ReaderConfig::default()).unwrap_err() {
            Error::Parse { line, message } => {
                assert_eq!(line, 8);
                assert!(message.contains("nope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_entities_section_yields_nothing() {
        let entities = parse_entities("0\nEOF\n", &ReaderConfig::default()).unwrap();
        assert!(entities.is_empty());
    }
}
