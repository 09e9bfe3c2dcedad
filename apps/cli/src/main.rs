// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: build a trimmed context model from a tiled OBJ dataset
//!
//! Usage:
//!   tilecontext --registry <tiles.csv> --tiles <dir> --bbox xmin,ymin,xmax,ymax [options]

use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;
use tilecontext_core::{load_tile_registry, BoundingBox};
use tilecontext_geometry::{write_obj_mesh, Point2, TrimMode};
use tilecontext_processing::{BoundingSolid, ContextPipeline, DirectoryTileSource, PipelineConfig};
use tracing_subscriber::EnvFilter;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
struct Args {
    registry: PathBuf,
    tiles: PathBuf,
    bbox: BoundingBox,
    margin: Option<f64>,
    height: f64,
    polygon: Option<Vec<Point2<f64>>>,
    keep: Option<TrimMode>,
    output: PathBuf,
    report: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let parsed = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = run(parsed) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("cannot read config '{}'", path.display()))?;
            PipelineConfig::from_json(&content)?
        }
        None => PipelineConfig::from_env(),
    };
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    if let Some(keep) = args.keep {
        config.keep = keep;
    }
    config.validate()?;

    let table = fs::read_to_string(&args.registry)
        .with_context(|| format!("cannot read tile registry '{}'", args.registry.display()))?;
    let registry = load_tile_registry(&table)
        .with_context(|| format!("invalid tile registry '{}'", args.registry.display()))?;

    tracing::info!(
        tiles = registry.len(),
        registry = %args.registry.display(),
        margin = config.margin,
        keep = config.keep.as_str(),
        "Loaded tile registry"
    );

    let solid = match args.polygon {
        Some(polygon) => BoundingSolid::Extruded {
            polygon,
            height: args.height,
        },
        None => BoundingSolid::from_bbox(&args.bbox, args.height),
    };

    let source = DirectoryTileSource::new(&args.tiles, config.tile_prefix.clone());
    let pipeline = ContextPipeline::new(registry, config);
    let output = pipeline.run(&args.bbox, &solid, &source)?;

    fs::write(&args.output, write_obj_mesh(&output.mesh))
        .with_context(|| format!("cannot write '{}'", args.output.display()))?;
    tracing::info!(
        output = %args.output.display(),
        vertices = output.mesh.vertex_count(),
        faces = output.mesh.face_count(),
        "Wrote context model"
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&output.report)?;
        fs::write(path, json).with_context(|| format!("cannot write '{}'", path.display()))?;
        tracing::info!(report = %path.display(), "Wrote report");
    }

    Ok(())
}

/// Parse arguments (program name excluded); `None` means help was requested
fn parse_args(args: &[String]) -> Result<Option<Args>> {
    let mut registry = None;
    let mut tiles = None;
    let mut bbox = None;
    let mut margin = None;
    let mut height: f64 = 100.0;
    let mut polygon = None;
    let mut keep = None;
    let mut output = PathBuf::from("context.obj");
    let mut report = None;
    let mut config = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "-h" || flag == "--help" {
            return Ok(None);
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| anyhow!("missing value for {}", flag))?;
        match flag {
            "--registry" => registry = Some(PathBuf::from(value)),
            "--tiles" => tiles = Some(PathBuf::from(value)),
            "--bbox" => bbox = Some(parse_bbox(value)?),
            "--margin" => {
                margin = Some(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("invalid margin '{}'", value))?,
                )
            }
            "--height" => {
                height = value
                    .parse()
                    .with_context(|| format!("invalid height '{}'", value))?
            }
            "--polygon" => polygon = Some(parse_polygon(value)?),
            "--keep" => {
                keep = Some(
                    TrimMode::parse(value)
                        .ok_or_else(|| anyhow!("--keep must be 'inside' or 'outside', got '{}'", value))?,
                )
            }
            "--output" => output = PathBuf::from(value),
            "--report" => report = Some(PathBuf::from(value)),
            "--config" => config = Some(PathBuf::from(value)),
            other => bail!("unknown option: {}", other),
        }
        i += 2;
    }

    Ok(Some(Args {
        registry: registry.ok_or_else(|| anyhow!("--registry is required"))?,
        tiles: tiles.ok_or_else(|| anyhow!("--tiles is required"))?,
        bbox: bbox.ok_or_else(|| anyhow!("--bbox is required"))?,
        margin,
        height,
        polygon,
        keep,
        output,
        report,
        config,
    }))
}

/// `xmin,ymin,xmax,ymax`
fn parse_bbox(text: &str) -> Result<BoundingBox> {
    let values = parse_numbers(text, ',')?;
    let [xmin, ymin, xmax, ymax] = values[..] else {
        bail!("--bbox needs four values, got {}", values.len());
    };
    Ok(BoundingBox::new(xmin, ymin, xmax, ymax)?)
}

/// `x,y;x,y;...`
fn parse_polygon(text: &str) -> Result<Vec<Point2<f64>>> {
    text.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match parse_numbers(pair, ',')?[..] {
            [x, y] => Ok(Point2::new(x, y)),
            _ => bail!("polygon vertex '{}' is not an x,y pair", pair),
        })
        .collect()
}

fn parse_numbers(text: &str, separator: char) -> Result<Vec<f64>> {
    text.split(separator)
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid number '{}'", v.trim()))
        })
        .collect()
}

fn print_usage() {
    println!(
        r#"TileContext - context models from tiled 3D city datasets
=========================================================

Selects the tiles around a query box, merges their OBJ meshes and keeps the
part inside (or outside) a bounding solid.

USAGE:
  tilecontext --registry <tiles.csv> --tiles <dir> --bbox <xmin,ymin,xmax,ymax> [OPTIONS]

REQUIRED:
  --registry <path>         Tile table with columns tile_id,x1,y1,x2,y2
  --tiles <dir>             Directory holding <prefix><tile_id>.obj files
  --bbox <xmin,ymin,xmax,ymax>
                            Query box in dataset coordinates

OPTIONS:
  --margin <fraction>       Query box buffer per half-extent (default: 0.1)
  --height <h>              Bounding solid height (default: 100)
  --polygon <x,y;x,y;...>   Bounding solid footprint (default: the query box)
  --keep <inside|outside>   Side of the solid to keep (default: inside)
  --output <path>           Output OBJ file (default: context.obj)
  --report <path>           Write a JSON run report
  --config <path>           JSON pipeline config (default: TILECONTEXT_* env vars)
  -h, --help                Show this help message

ENVIRONMENT:
  TILECONTEXT_MARGIN, TILECONTEXT_KEEP, TILECONTEXT_REQUIRE_TILES,
  TILECONTEXT_EPSILON, TILECONTEXT_PARALLEL, TILECONTEXT_TILE_PREFIX
  RUST_LOG                  Log filter (default: info)
"#
    );
}
