// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line options.

use alpha_boundary_processing::{BoundaryConfig, ReaderConfig};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Alpha used when `--alpha` is not given.
pub const DEFAULT_ALPHA: f64 = 0.2;

pub const USAGE: &str = "\
Usage:
  alpha-boundary <input.dxf> [options]

Options:
  --alpha <A>        Alpha value, 0 gives the convex hull (default: 0.2)
  --output <PATH>    Boundary file to write (default: <input>_boundary.dxf)
  --json             Print the summary as JSON
  --paper-space      Include entities drawn in paper space
  --keep-meshes      Read vertices of polygon mesh and polyface polylines
  -h, --help         Show this message

Logging is controlled with RUST_LOG (default: info).";

/// Parsed command line
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub boundary: BoundaryConfig,
    pub reader: ReaderConfig,
    pub json: bool,
}

impl CliConfig {
    /// Parse arguments (without the program name). `Ok(None)` means help was requested.
    pub fn from_args<I>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let Some(first) = args.first() else {
            bail!("missing input file\n\n{USAGE}");
        };
        if first == "--help" || first == "-h" {
            return Ok(None);
        }

        let input = PathBuf::from(first);
        let mut alpha = DEFAULT_ALPHA;
        let mut output = None;
        let mut reader = ReaderConfig::default();
        let mut json = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--alpha" => {
                    i += 1;
                    let value = args.get(i).context("--alpha needs a value")?;
                    alpha = value
                        .parse()
                        .with_context(|| format!("invalid alpha value '{value}'"))?;
                }
                "--output" => {
                    i += 1;
                    output = Some(PathBuf::from(args.get(i).context("--output needs a path")?));
                }
                "--json" => json = true,
                "--paper-space" => reader.include_paper_space = true,
                "--keep-meshes" => reader.skip_mesh_polylines = false,
                "--help" | "-h" => return Ok(None),
                other => bail!("unknown option: {other}\n\n{USAGE}"),
            }
            i += 1;
        }

        let boundary = BoundaryConfig::new(alpha).with_context(|| format!("alpha {alpha}"))?;
        let output = output.unwrap_or_else(|| default_output(&input));

        Ok(Some(Self {
            input,
            output,
            boundary,
            reader,
            json,
        }))
    }
}

/// `<dir>/<stem>_boundary.dxf` next to the input
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drawing".to_string());
    input.with_file_name(format!("{stem}_boundary.dxf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<CliConfig>> {
        CliConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_apply() {
        let config = parse(&["plans/site.dxf"]).unwrap().unwrap();
        assert_eq!(config.boundary.alpha, DEFAULT_ALPHA);
        assert_eq!(config.output, PathBuf::from("plans/site_boundary.dxf"));
        assert!(!config.json);
        assert!(!config.reader.include_paper_space);
    }

    #[test]
    fn options_are_read() {
        let config = parse(&["a.dxf", "--alpha", "1.5", "--output", "out.dxf", "--json"])
            .unwrap()
            .unwrap();
        assert_eq!(config.boundary.alpha, 1.5);
        assert_eq!(config.output, PathBuf::from("out.dxf"));
        assert!(config.json);
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--help"]).unwrap().is_none());
        assert!(parse(&["a.dxf", "-h"]).unwrap().is_none());
    }

    #[test]
    fn bad_arguments_are_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.dxf", "--alpha"]).is_err());
        assert!(parse(&["a.dxf", "--alpha", "wide"]).is_err());
        assert!(parse(&["a.dxf", "--alpha", "-1"]).is_err());
        assert!(parse(&["a.dxf", "--verbose"]).is_err());
    }
}
