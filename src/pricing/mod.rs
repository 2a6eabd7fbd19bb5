//! Primary pricing service.
//!
//! The remote service quotes a transaction for an AOI. Only an explicit area
//! rejection (`PricingError::InvalidArea`) allows the caller to fall back to
//! the local estimate; every other failure is surfaced as-is.

pub mod nearmap;

pub use nearmap::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{CaptureMode, EstimationRequest};
use crate::error::PricingError;

/// Marker the coverage API puts in the body when it refuses an AOI.
pub const INVALID_AREA_MARKER: &str = "INVALID_AREA";

/// Body of a coverage transaction preview request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub preview: String,
    pub ai_on3d_coverage: String,
    /// Comma-separated catalog keys.
    pub resources: String,
    /// `single` or `all`.
    pub dates: String,
    pub since: String,
    pub until: String,
    pub overlap: String,
    pub aoi: Value,
}

impl TransactionQuery {
    pub fn new(request: &EstimationRequest, since: NaiveDate, until: NaiveDate) -> Self {
        Self::from_parts(
            &request.selected_resource_keys,
            request.capture_mode,
            since,
            until,
            request.area.geometry.clone(),
        )
    }

    pub fn from_parts(
        keys: &[String],
        capture_mode: CaptureMode,
        since: NaiveDate,
        until: NaiveDate,
        aoi: Value,
    ) -> Self {
        Self {
            preview: "true".into(),
            ai_on3d_coverage: "false".into(),
            resources: keys.join(", "),
            dates: capture_mode.api_value().into(),
            since: since.format("%Y-%m-%d").to_string(),
            until: until.format("%Y-%m-%d").to_string(),
            overlap: "all".into(),
            aoi,
        }
    }
}

/// A successful quote.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuote {
    pub cost_of_transaction: f64,
    #[serde(default)]
    pub surveys: Vec<Value>,
}

/// Anything that can quote a transaction.
pub trait PricingService {
    fn quote(&self, query: &TransactionQuery) -> Result<TransactionQuote, PricingError>;
}

/// Classify a non-success response.
pub fn classify_failure(status: u16, body: &str) -> PricingError {
    if body.contains(INVALID_AREA_MARKER) {
        PricingError::InvalidArea(body.to_string())
    } else {
        PricingError::Status {
            status,
            body: body.to_string(),
        }
    }
}

/// Decode a success response body.
pub fn parse_quote(body: &str) -> Result<TransactionQuote, PricingError> {
    if body.trim().is_empty() {
        return Err(PricingError::EmptyResponse);
    }
    serde_json::from_str(body).map_err(|e| PricingError::Decode(format!("{e}: {}", preview(body))))
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::domain::AreaOfInterest;

    #[test]
    fn query_matches_coverage_api_layout() {
        let aoi = AreaOfInterest::from_bbox(144.95, -37.82, 144.96, -37.81).unwrap();
        let request = EstimationRequest::new(["raster:Vert", "aiPacks:solar"], CaptureMode::All, aoi).unwrap();
        let since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let until = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let body = serde_json::to_value(TransactionQuery::new(&request, since, until)).unwrap();

        assert_eq!(body["preview"], "true");
        assert_eq!(body["aiOn3dCoverage"], "false");
        assert_eq!(body["resources"], "raster:Vert, aiPacks:solar");
        assert_eq!(body["dates"], "all");
        assert_eq!(body["since"], "2024-01-01");
        assert_eq!(body["until"], "2024-12-31");
        assert_eq!(body["overlap"], "all");
        assert_eq!(body["aoi"]["type"], "Polygon");
    }

    #[test]
    fn only_invalid_area_marker_is_a_rejection() {
        assert_matches!(
            classify_failure(400, r#"{"error":"INVALID_AREA","message":"out of bounds"}"#),
            PricingError::InvalidArea(_)
        );
        assert_matches!(
            classify_failure(401, r#"{"error":"UNAUTHORIZED"}"#),
            PricingError::Status { status: 401, .. }
        );
    }

    #[test]
    fn quote_parsing() {
        let quote = parse_quote(&json!({"costOfTransaction": 123.0, "surveys": [{"id": "a"}]}).to_string()).unwrap();
        assert_eq!(quote.cost_of_transaction, 123.0);
        assert_eq!(quote.surveys.len(), 1);

        assert_matches!(parse_quote("  "), Err(PricingError::EmptyResponse));
        assert_matches!(parse_quote("<html>"), Err(PricingError::Decode(_)));
        assert_matches!(parse_quote(r#"{"surveys": []}"#), Err(PricingError::Decode(_)));
    }
}
