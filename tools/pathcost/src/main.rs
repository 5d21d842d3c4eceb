//! Landform classification and map-matching edge costs from JSON inputs.
//!
//! `classify` turns a DEM into a landform grid; `cost` scores every
//! (fix, segment) pair of a trace against a road network; `defaults` prints
//! the default cost-model configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};

use gpspath_core::{
    classify_landforms, AttributeSchema, CostModelParameters, Dem, GpsFix, Landform, LandformGrid,
    PathCostModel, RoadSegment,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pathcost", about = "Terrain-aware edge costs for GPS map matching")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify every DEM cell into one of ten landforms.
    Classify {
        /// DEM JSON file.
        #[arg(short, long)]
        dem: String,

        /// Cost-model configuration JSON; defaults when omitted.
        #[arg(short, long)]
        params: Option<String>,

        /// Output landform grid JSON.
        #[arg(short, long, default_value = "landforms.json")]
        output: String,
    },
    /// Edge cost of every road segment for every GPS fix.
    Cost {
        #[arg(short, long)]
        dem: String,

        /// Road segments JSON array.
        #[arg(short, long)]
        segments: String,

        /// Attribute schema JSON (declared ranges of raw road attributes).
        #[arg(long)]
        schema: String,

        /// GPS fixes JSON array, time-ordered.
        #[arg(short, long)]
        fixes: String,

        #[arg(short, long)]
        params: Option<String>,

        /// Output JSON; stdout when omitted.
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the default configuration.
    Defaults,
}

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CostRecord {
    fix: usize,
    segment: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    landform: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ── IO helpers ────────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

fn load_params(path: Option<&str>) -> Result<CostModelParameters> {
    match path {
        Some(p) => CostModelParameters::from_path(p).with_context(|| format!("loading configuration {p}")),
        None => Ok(CostModelParameters::default()),
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(Path::new(path), json).with_context(|| format!("writing {path}")),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn classify(dem: &Dem, params: &CostModelParameters) -> Result<LandformGrid> {
    let grid = classify_landforms(dem, &params.terrain).context("classifying landforms")?;
    let hist = grid.histogram();
    let total = grid.cells.len().max(1) as f64;
    eprintln!("\n{:<16} {:>8} {:>7}", "Landform", "Cells", "Share");
    eprintln!("{}", "-".repeat(33));
    for lf in Landform::ALL {
        let n = hist.count(lf);
        eprintln!("{:<16} {:>8} {:>6.1}%", lf.name(), n, n as f64 / total * 100.0);
    }
    eprintln!("{:<16} {:>8} {:>6.1}%", "undefined", hist.undefined, hist.undefined as f64 / total * 100.0);
    if hist.undefined > 0 {
        warn!("{} nodata cells left unclassified", hist.undefined);
    }
    Ok(grid)
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_classify(dem_path: &str, params_path: Option<&str>, output: &str) -> Result<()> {
    let params = load_params(params_path)?;
    let dem: Dem = read_json(dem_path)?;
    info!("classifying {dem_path} ({}×{})", dem.width, dem.height);
    let grid = classify(&dem, &params)?;
    write_json(&grid, Some(output))?;
    info!("wrote {output}");
    Ok(())
}

fn run_cost(
    dem_path: &str,
    segments_path: &str,
    schema_path: &str,
    fixes_path: &str,
    params_path: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let params = load_params(params_path)?;
    let dem: Dem = read_json(dem_path)?;
    let segments: Vec<RoadSegment> = read_json(segments_path)?;
    let schema: AttributeSchema = read_json(schema_path)?;
    let fixes: Vec<GpsFix> = read_json(fixes_path)?;

    let grid = classify(&dem, &params)?;
    let model = PathCostModel::new(&params, &schema, &dem, &grid).context("building cost model")?;
    info!("scoring {} segments against {} fixes", segments.len(), fixes.len());

    let mut records = Vec::with_capacity(segments.len() * fixes.len());
    let mut failures = 0usize;
    for (i, fix) in fixes.iter().enumerate() {
        for (segment, result) in segments.iter().zip(model.breakdowns(&segments, fix)) {
            let record = match result {
                Ok(c) => CostRecord {
                    fix: i,
                    segment: segment.id,
                    cost: Some(c.total()),
                    landform: c.class.map(Landform::name),
                    elevation: c.elevation,
                    error: None,
                },
                Err(e) => {
                    failures += 1;
                    CostRecord {
                        fix: i,
                        segment: segment.id,
                        cost: None,
                        landform: None,
                        elevation: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            records.push(record);
        }
    }
    if failures > 0 {
        warn!("{failures} edge costs failed; see the error fields");
    }
    write_json(&records, output)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Classify { dem, params, output } => run_classify(&dem, params.as_deref(), &output),
        Command::Cost { dem, segments, schema, fixes, params, output } => run_cost(
            &dem,
            &segments,
            &schema,
            &fixes,
            params.as_deref(),
            output.as_deref(),
        ),
        Command::Defaults => write_json(&CostModelParameters::default(), None),
    }
}
