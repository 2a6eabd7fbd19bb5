//! Command-line parsing for the AOI credit estimator.
//!
//! Argument parsing and dispatch stay separate from the geometry and pricing
//! code; `app` turns these structs into an `EstimateConfig` and a request.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::error::{AppError, EXIT_USAGE};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "aoi-credits", version, about = "Aerial imagery credit estimator for an area of interest")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the credits for a set of resources over an AOI.
    ///
    /// The pricing service is asked first; if it rejects the area, the cost is
    /// estimated locally from the catalog and the AOI's area.
    Estimate(EstimateArgs),
    /// Print the area of an AOI in square metres.
    Area(AreaArgs),
    /// Print the cost table.
    Catalog(CatalogArgs),
    /// Print the remaining credits for the configured API key.
    Credits,
}

/// Where the AOI comes from: an uploaded GeoJSON file or a drawn rectangle.
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = false)]
pub struct AoiArgs {
    /// GeoJSON file (FeatureCollection, Feature or geometry). Only the first feature is used.
    #[arg(long, value_name = "GEOJSON")]
    pub aoi: Option<PathBuf>,

    /// Rectangle as `min_lon,min_lat,max_lon,max_lat` (degrees).
    #[arg(long, value_name = "BBOX", allow_hyphen_values = true)]
    pub bbox: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub aoi: AoiArgs,

    /// Catalog keys to price, e.g. `raster:Vert` (repeat or comma-separate).
    #[arg(short = 'r', long = "resource", value_delimiter = ',', required = true)]
    pub resources: Vec<String>,

    /// Price all captures instead of the latest capture only.
    #[arg(long)]
    pub all_captures: bool,

    /// Start of the capture date range (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub since: NaiveDate,

    /// End of the capture date range (YYYY-MM-DD).
    #[arg(long, default_value = "2024-12-31")]
    pub until: NaiveDate,

    /// Skip the pricing service and estimate locally.
    #[arg(long)]
    pub offline: bool,

    /// Catalog JSON replacing the built-in cost table.
    #[arg(long, value_name = "JSON")]
    pub catalog: Option<PathBuf>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct AreaArgs {
    #[command(flatten)]
    pub aoi: AoiArgs,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct CatalogArgs {
    /// Catalog JSON replacing the built-in cost table.
    #[arg(long, value_name = "JSON")]
    pub catalog: Option<PathBuf>,

    /// Print the catalog as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse `min_lon,min_lat,max_lon,max_lat`.
pub fn parse_bbox(raw: &str) -> Result<(f64, f64, f64, f64), AppError> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Invalid bbox '{raw}': {e}")))?;
    match values.as_slice() {
        [min_lon, min_lat, max_lon, max_lat] => Ok((*min_lon, *min_lat, *max_lon, *max_lat)),
        _ => Err(AppError::new(
            EXIT_USAGE,
            format!("Invalid bbox '{raw}': expected 4 comma-separated numbers."),
        )),
    }
}
