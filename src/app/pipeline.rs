//! Shared estimation workflow.
//!
//! primary quote -> (area rejected?) -> area estimate -> cost model
//!
//! The CLI only decides where inputs come from and how the outcome is printed.

use serde::Serialize;

use crate::catalog::ResourceCatalog;
use crate::cost::estimate_cost_breakdown;
use crate::domain::{AreaResult, CostBreakdown, EstimateConfig, EstimationRequest};
use crate::error::{AppError, CostError, PricingError};
use crate::geometry::estimate_aoi_area;
use crate::pricing::{PricingService, TransactionQuery};

/// Result of one estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Outcome {
    /// Priced by the remote service.
    Quoted { credits: f64, surveys: usize },
    /// Priced locally.
    Fallback {
        area: AreaResult,
        breakdown: CostBreakdown,
        /// Why the remote service was not used; `None` when running offline.
        rejection: Option<String>,
    },
}

impl Outcome {
    /// Total credits as displayed to the user.
    pub fn total_credits(&self) -> f64 {
        match self {
            Outcome::Quoted { credits, .. } => *credits,
            Outcome::Fallback { breakdown, .. } => breakdown.result.total_credits_cost as f64,
        }
    }

    /// A fallback total resting on an area that could not be computed.
    pub fn is_suspicious(&self) -> bool {
        matches!(self, Outcome::Fallback { area, .. } if area.degraded)
    }
}

/// Run one estimation.
///
/// With a pricing service, its quote wins; an area rejection switches to the
/// local estimate and any other pricing failure is returned. Without a
/// service the local estimate is used directly.
pub fn run_estimate(
    request: &EstimationRequest,
    config: &EstimateConfig,
    catalog: &ResourceCatalog,
    service: Option<&dyn PricingService>,
) -> Result<Outcome, AppError> {
    if let Some(key) = catalog.unknown_keys(&request.selected_resource_keys).first() {
        return Err(CostError::UnknownResourceKey(key.to_string()).into());
    }

    let Some(service) = service else {
        return Ok(fallback_estimate(request, catalog, None)?);
    };

    let query = TransactionQuery::new(request, config.since, config.until);
    match service.quote(&query) {
        Ok(quote) => Ok(Outcome::Quoted {
            credits: quote.cost_of_transaction,
            surveys: quote.surveys.len(),
        }),
        Err(PricingError::InvalidArea(body)) => {
            tracing::info!("pricing service rejected the area, estimating locally");
            Ok(fallback_estimate(request, catalog, Some(body))?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Area estimator once, then cost model once.
pub fn fallback_estimate(
    request: &EstimationRequest,
    catalog: &ResourceCatalog,
    rejection: Option<String>,
) -> Result<Outcome, CostError> {
    let area = estimate_aoi_area(&request.area);
    let breakdown = estimate_cost_breakdown(
        catalog,
        &request.selected_resource_keys,
        request.capture_mode,
        area.value,
    )?;
    Ok(Outcome::Fallback {
        area,
        breakdown,
        rejection,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::domain::{AreaOfInterest, CaptureMode};
    use crate::error::{EXIT_CONTRACT, EXIT_RUNTIME};
    use crate::pricing::TransactionQuote;

    enum Reply {
        Quote(f64),
        Rejected,
        Down,
    }

    struct StubService {
        reply: Reply,
        calls: Cell<usize>,
    }

    impl StubService {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: Cell::new(0),
            }
        }
    }

    impl PricingService for StubService {
        fn quote(&self, query: &TransactionQuery) -> Result<TransactionQuote, PricingError> {
            self.calls.set(self.calls.get() + 1);
            assert!(!query.resources.is_empty());
            match self.reply {
                Reply::Quote(cost) => Ok(TransactionQuote {
                    cost_of_transaction: cost,
                    surveys: vec![json!({"id": "s1"}), json!({"id": "s2"})],
                }),
                Reply::Rejected => Err(PricingError::InvalidArea(r#"{"error":"INVALID_AREA"}"#.into())),
                Reply::Down => Err(PricingError::Status {
                    status: 503,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    fn config() -> EstimateConfig {
        EstimateConfig {
            api_key: Some("test-key".into()),
            since: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            until: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            capture_mode: CaptureMode::Single,
            offline: false,
            catalog_path: None,
            json: false,
        }
    }

    fn request(keys: &[&str]) -> EstimationRequest {
        // 0.0014° square at the equator, ~24,130 m².
        let aoi = AreaOfInterest::from_bbox(0.0, 0.0, 0.0014, 0.0014).unwrap();
        EstimationRequest::new(keys.iter().copied(), CaptureMode::Single, aoi).unwrap()
    }

    #[test]
    fn primary_quote_is_used_when_available() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let service = StubService::new(Reply::Quote(321.5));
        let outcome = run_estimate(&request(&["raster:Vert"]), &config(), &catalog, Some(&service)).unwrap();
        assert_eq!(outcome, Outcome::Quoted { credits: 321.5, surveys: 2 });
        assert_eq!(service.calls.get(), 1);
    }

    #[test]
    fn area_rejection_falls_back_to_local_estimate() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let service = StubService::new(Reply::Rejected);
        let outcome = run_estimate(&request(&["raster:Vert"]), &config(), &catalog, Some(&service)).unwrap();

        let Outcome::Fallback { area, breakdown, rejection } = outcome else {
            panic!("expected fallback");
        };
        assert!(!area.degraded);
        assert!(rejection.unwrap().contains("INVALID_AREA"));
        // 10 credits per 1,000 m² over ~24,130 m².
        assert_eq!(breakdown.result.total_credits_cost, (10.0 * area.value / 1000.0).round_ties_even() as u64);
        assert!((239..=243).contains(&breakdown.result.total_credits_cost));
    }

    #[test]
    fn other_pricing_failures_do_not_fall_back() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let service = StubService::new(Reply::Down);
        let err = run_estimate(&request(&["raster:Vert"]), &config(), &catalog, Some(&service)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_RUNTIME);
        assert!(err.message().contains("503"));
    }

    #[test]
    fn unknown_keys_fail_before_any_call() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let service = StubService::new(Reply::Quote(1.0));
        let err = run_estimate(&request(&["raster:Nope"]), &config(), &catalog, Some(&service)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONTRACT);
        assert_eq!(service.calls.get(), 0);
    }

    #[test]
    fn offline_run_skips_the_service() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let outcome = run_estimate(&request(&["aiImpactAssessment:postcat"]), &config(), &catalog, None).unwrap();
        assert_matches::assert_matches!(outcome, Outcome::Fallback { rejection: None, .. });
        assert!(outcome.total_credits() > 0.0);
        assert!(!outcome.is_suspicious());
    }

    #[test]
    fn degraded_area_is_flagged() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let aoi = AreaOfInterest::new(json!({"type": "Polygon"}));
        let req = EstimationRequest::new(["raster:Vert"], CaptureMode::Single, aoi).unwrap();
        let outcome = fallback_estimate(&req, &catalog, None).unwrap();
        assert_eq!(outcome.total_credits(), 0.0);
        assert!(outcome.is_suspicious());
    }
}
