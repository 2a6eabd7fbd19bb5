//! Formatted terminal output.
//!
//! Formatting lives here so the estimator and evaluator stay free of
//! presentation concerns.

use crate::app::pipeline::Outcome;
use crate::catalog::ResourceCatalog;
use crate::domain::{AreaResult, EstimationRequest};

/// Outcome of an `estimate` run.
pub fn format_outcome(outcome: &Outcome, request: &EstimationRequest) -> String {
    let mut out = String::new();
    out.push_str("=== AOI credit estimate ===\n");
    out.push_str(&format!(
        "Capture dates: {}\n",
        match request.capture_mode {
            crate::domain::CaptureMode::Single => "latest capture only",
            crate::domain::CaptureMode::All => "all captures",
        }
    ));
    out.push_str(&format!("Resources: {}\n", request.selected_resource_keys.len()));

    match outcome {
        Outcome::Quoted { credits, surveys } => {
            out.push_str("Source: pricing service\n");
            out.push_str(&format!("Surveys: {surveys}\n"));
            out.push_str(&format!("\nTotal cost: {} credits\n", format_credits(*credits)));
        }
        Outcome::Fallback {
            area,
            breakdown,
            rejection,
        } => {
            out.push_str(match rejection {
                Some(_) => "Source: local estimate (pricing service rejected the area)\n",
                None => "Source: local estimate (offline)\n",
            });
            out.push_str(&format!("Area: {}\n", format_area_value(area)));

            let width = breakdown.lines.iter().map(|l| l.key.len()).max().unwrap_or(0).max(8);
            out.push_str(&format!("\n{:<width$}  {:>8}  {:>10}\n", "resource", "unit", "credits"));
            for line in &breakdown.lines {
                let credits = if line.capped {
                    "capped".to_string()
                } else {
                    line.credits.to_string()
                };
                out.push_str(&format!(
                    "{:<width$}  {:>8}  {:>10}\n",
                    line.key,
                    format_credits(line.unit_cost),
                    credits
                ));
            }
            out.push_str(&format!(
                "\nTotal cost: {} credits\n",
                breakdown.result.total_credits_cost
            ));
            if area.degraded {
                out.push_str("Warning: the area could not be computed; treat this total as unknown.\n");
            }
        }
    }
    out
}

/// Area report for the `area` subcommand.
pub fn format_area(area: &AreaResult, bbox: Option<(f64, f64, f64, f64)>) -> String {
    let mut out = format!("Area: {}\n", format_area_value(area));
    if let Some((min_lon, min_lat, max_lon, max_lat)) = bbox {
        out.push_str(&format!(
            "BBox: [{min_lon:.6}, {min_lat:.6}, {max_lon:.6}, {max_lat:.6}]\n"
        ));
    }
    out
}

/// Credits per resource per 1,000 m², grouped by namespace in catalog order.
pub fn format_cost_table(catalog: &ResourceCatalog) -> String {
    let product_w = catalog
        .entries()
        .iter()
        .map(|e| e.product().len())
        .max()
        .unwrap_or(0)
        .max(8);
    let label_w = catalog
        .entries()
        .iter()
        .map(|e| e.matched_content_type.len())
        .max()
        .unwrap_or(0)
        .max(12);

    let mut out = String::from(
        "Credits per request or per 1,000 m², whichever is less, for a single capture or all captures.\n\n",
    );
    out.push_str(&format!(
        "{:<product_w$}  {:<label_w$}  {:>8}  {:>8}\n",
        "product", "content type", "single", "all"
    ));
    for namespace in catalog.namespaces() {
        out.push_str(&format!("\n[{namespace}]\n"));
        for entry in catalog.entries_in(namespace) {
            out.push_str(&format!(
                "{:<product_w$}  {:<label_w$}  {:>8}  {:>8}\n",
                entry.product(),
                entry.matched_content_type,
                format_credits(entry.credits_per_single_survey),
                format_credits(entry.credits_per_all_survey_data),
            ));
        }
    }
    out
}

fn format_area_value(area: &AreaResult) -> String {
    if area.degraded {
        format!(
            "unknown ({})",
            area.reason.as_deref().unwrap_or("area could not be computed")
        )
    } else {
        format!("{:.1} m² ({:.4} km²)", area.value, area.value / 1_000_000.0)
    }
}

fn format_credits(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
