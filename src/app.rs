//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the catalog and the AOI
//! - asks the pricing service, falling back to the local estimate
//! - prints reports

use std::path::Path;

use clap::Parser;

use crate::catalog::ResourceCatalog;
use crate::cli::{AoiArgs, AreaArgs, CatalogArgs, Command, EstimateArgs};
use crate::domain::{AreaOfInterest, CaptureMode, EstimateConfig, EstimationRequest};
use crate::error::{AppError, EXIT_RUNTIME, EXIT_USAGE};
use crate::pricing::{API_KEY_VAR, NearmapClient, PricingService};

pub mod pipeline;

/// Entry point for the `aoi-credits` binary.
pub fn run() -> Result<(), AppError> {
    crate::logging::init();

    // `aoi-credits --bbox ... -r ...` behaves like `aoi-credits estimate ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Area(args) => handle_area(args),
        Command::Catalog(args) => handle_catalog(args),
        Command::Credits => handle_credits(),
    }
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(&args)?;
    let catalog = load_catalog(config.catalog_path.as_deref())?;
    let area = load_aoi(&args.aoi)?;
    let request = EstimationRequest::new(args.resources.iter().cloned(), config.capture_mode, area)?;

    let client = match (&config.api_key, config.offline) {
        (Some(key), false) => Some(NearmapClient::new(key.clone()).with_endpoints_from_env()),
        _ => None,
    };
    let service = client.as_ref().map(|c| c as &dyn PricingService);

    let outcome = pipeline::run_estimate(&request, &config, &catalog, service)?;

    if config.json {
        println!("{}", to_json(&outcome)?);
    } else {
        print!("{}", crate::report::format_outcome(&outcome, &request));
    }
    Ok(())
}

fn handle_area(args: AreaArgs) -> Result<(), AppError> {
    let aoi = load_aoi(&args.aoi)?;
    let area = crate::geometry::estimate_aoi_area(&aoi);
    if args.json {
        println!("{}", to_json(&area)?);
    } else {
        print!("{}", crate::report::format_area(&area, aoi.bbox()));
    }
    Ok(())
}

fn handle_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    if args.json {
        println!("{}", to_json(catalog.entries())?);
    } else {
        print!("{}", crate::report::format_cost_table(&catalog));
    }
    Ok(())
}

fn handle_credits() -> Result<(), AppError> {
    let client = NearmapClient::from_env()?;
    let quota = client.remaining_credits()?;
    println!("{}", to_json(&quota)?);
    Ok(())
}

/// Build the run configuration. The API key is read from the environment
/// (after `.env`) and is only required when the pricing service will be used.
pub fn estimate_config_from_args(args: &EstimateArgs) -> Result<EstimateConfig, AppError> {
    if args.since > args.until {
        return Err(AppError::new(
            EXIT_USAGE,
            format!("Start date {} is after end date {}.", args.since, args.until),
        ));
    }

    let api_key = if args.offline {
        None
    } else {
        dotenvy::dotenv().ok();
        let key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty());
        if key.is_none() {
            return Err(AppError::new(
                EXIT_USAGE,
                format!("Missing {API_KEY_VAR} in environment (.env). Use --offline to estimate locally."),
            ));
        }
        key
    };

    Ok(EstimateConfig {
        api_key,
        since: args.since,
        until: args.until,
        capture_mode: CaptureMode::from_latest_only(!args.all_captures),
        offline: args.offline,
        catalog_path: args.catalog.clone(),
        json: args.json,
    })
}

fn load_catalog(path: Option<&Path>) -> Result<ResourceCatalog, AppError> {
    let catalog = match path {
        Some(path) => ResourceCatalog::from_path(path)?,
        None => ResourceCatalog::builtin()?,
    };
    tracing::debug!(entries = catalog.len(), "catalog loaded");
    Ok(catalog)
}

fn load_aoi(args: &AoiArgs) -> Result<AreaOfInterest, AppError> {
    if let Some(path) = &args.aoi {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to read AOI '{}': {e}", path.display())))?;
        return AreaOfInterest::from_geojson_str(&text);
    }
    if let Some(raw) = &args.bbox {
        let (min_lon, min_lat, max_lon, max_lat) = crate::cli::parse_bbox(raw)?;
        return AreaOfInterest::from_bbox(min_lon, min_lat, max_lon, max_lat);
    }
    Err(AppError::new(
        EXIT_USAGE,
        "Either upload a geojson (--aoi) or give an extent (--bbox).",
    ))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to serialize output: {e}")))
}

/// Rewrite argv so `aoi-credits` defaults to `aoi-credits estimate`.
///
/// Rules:
/// - `aoi-credits --bbox ... -r ...` -> `aoi-credits estimate --bbox ... -r ...`
/// - `aoi-credits --help/--version/-h` -> unchanged
/// - anything starting with a subcommand name -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "area" | "catalog" | "credits");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "estimate".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_default_to_estimate() {
        assert_eq!(
            rewrite_args(argv(&["aoi-credits", "--bbox", "0,0,1,1", "-r", "raster:Vert"])),
            argv(&["aoi-credits", "estimate", "--bbox", "0,0,1,1", "-r", "raster:Vert"])
        );
        assert_eq!(rewrite_args(argv(&["aoi-credits", "--help"])), argv(&["aoi-credits", "--help"]));
        assert_eq!(rewrite_args(argv(&["aoi-credits", "catalog"])), argv(&["aoi-credits", "catalog"]));
    }

    #[test]
    fn offline_config_needs_no_key() {
        let cli = crate::cli::Cli::parse_from([
            "aoi-credits",
            "estimate",
            "--bbox",
            "0,0,0.001,0.001",
            "-r",
            "raster:Vert",
            "--offline",
        ]);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        let config = estimate_config_from_args(&args).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.capture_mode, CaptureMode::Single);
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let cli = crate::cli::Cli::parse_from([
            "aoi-credits",
            "estimate",
            "--bbox",
            "0,0,0.001,0.001",
            "-r",
            "raster:Vert",
            "--offline",
            "--since",
            "2024-06-01",
            "--until",
            "2024-01-01",
        ]);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        let err = estimate_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }
}
