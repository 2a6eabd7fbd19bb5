//! Shared domain types.
//!
//! These are kept small and serializable so they can be passed between the
//! estimator, the evaluator, the pricing client and the report layer.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which captures the estimate is priced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Only the most recent capture.
    Single,
    /// Every historical capture in the date range.
    All,
}

impl CaptureMode {
    /// Map the "latest capture only" toggle to a capture mode.
    pub fn from_latest_only(latest_only: bool) -> Self {
        if latest_only {
            CaptureMode::Single
        } else {
            CaptureMode::All
        }
    }

    /// Value of the `dates` field in a coverage transaction request.
    pub fn api_value(self) -> &'static str {
        match self {
            CaptureMode::Single => "single",
            CaptureMode::All => "all",
        }
    }
}

/// Product namespaces known to the catalog.
///
/// Only `AiPacks` is subject to the AI-pack cap. `TrueOrthoAiPacks` and
/// `AiImpactAssessment` are priced like any other resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
    Raster,
    AiPacks,
    TrueOrthoAiPacks,
    AiImpactAssessment,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Raster,
        Namespace::AiPacks,
        Namespace::TrueOrthoAiPacks,
        Namespace::AiImpactAssessment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Raster => "raster",
            Namespace::AiPacks => "aiPacks",
            Namespace::TrueOrthoAiPacks => "trueOrthoAiPacks",
            Namespace::AiImpactAssessment => "aiImpactAssessment",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Namespace::ALL.into_iter().find(|ns| ns.as_str() == raw)
    }

    /// Namespace of a `"<namespace>:<product>"` key, taken from the text
    /// before the first `:`.
    pub fn from_key(key: &str) -> Option<Self> {
        let prefix = key.split(':').next()?;
        Namespace::parse(prefix)
    }

    pub fn is_capped(self) -> bool {
        self == Namespace::AiPacks
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The polygon a cost estimate is computed for.
///
/// The geometry is kept as raw GeoJSON so it can be forwarded untouched to the
/// pricing service; the area estimator parses it on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub geometry: Value,
}

/// Outcome of the area estimator.
///
/// `degraded` is set when the estimator could not compute an area and fell
/// back to zero; `reason` then carries the underlying failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaResult {
    pub value: f64,
    pub degraded: bool,
    pub reason: Option<String>,
}

impl AreaResult {
    pub fn computed(value: f64) -> Self {
        Self {
            value,
            degraded: false,
            reason: None,
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            value: 0.0,
            degraded: true,
            reason: Some(reason.into()),
        }
    }
}

/// One estimation, built per submit.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationRequest {
    /// Selected catalog keys, duplicates removed, in first-seen order.
    pub selected_resource_keys: Vec<String>,
    pub capture_mode: CaptureMode,
    pub area: AreaOfInterest,
}

/// Final fallback total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimationResult {
    pub total_credits_cost: u64,
}

/// Contribution of one selected resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub key: String,
    pub unit_cost: f64,
    pub credits: u64,
    /// Selected but skipped because the AI-pack cap was already reached.
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    pub result: EstimationResult,
}

/// Settings for one `estimate` run, built from CLI arguments and environment.
#[derive(Debug, Clone)]
pub struct EstimateConfig {
    pub api_key: Option<String>,
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub capture_mode: CaptureMode,
    /// Skip the pricing service and estimate locally.
    pub offline: bool,
    pub catalog_path: Option<PathBuf>,
    pub json: bool,
}
