//! Cost model evaluator.
//!
//! Each selected resource contributes `round(unit_cost * area_sqm / 1000)`
//! credits, rounded per resource with ties to even. At most
//! [`AI_PACK_CAP`] resources in the `aiPacks` namespace contribute; later
//! `aiPacks` selections in caller order are skipped. Other namespaces,
//! including `trueOrthoAiPacks` and `aiImpactAssessment`, are never capped.
//!
//! Because the cap follows iteration order, the total is only invariant under
//! reordering when at most seven `aiPacks` keys are selected.

use crate::catalog::ResourceCatalog;
use crate::domain::{CaptureMode, CostBreakdown, CostLine, EstimationResult, Namespace};
use crate::error::CostError;

/// Maximum number of `aiPacks` resources that are charged.
pub const AI_PACK_CAP: usize = 7;

/// Square metres per pricing unit.
pub const SQM_PER_UNIT: f64 = 1000.0;

/// Total credits for the selection.
pub fn estimate_cost<S: AsRef<str>>(
    catalog: &ResourceCatalog,
    selected_resource_keys: &[S],
    capture_mode: CaptureMode,
    area_sqm: f64,
) -> Result<u64, CostError> {
    estimate_cost_breakdown(catalog, selected_resource_keys, capture_mode, area_sqm)
        .map(|b| b.result.total_credits_cost)
}

/// Total credits plus one line per selected resource.
///
/// Fails on the first key missing from the catalog.
pub fn estimate_cost_breakdown<S: AsRef<str>>(
    catalog: &ResourceCatalog,
    selected_resource_keys: &[S],
    capture_mode: CaptureMode,
    area_sqm: f64,
) -> Result<CostBreakdown, CostError> {
    if !area_sqm.is_finite() || area_sqm < 0.0 {
        return Err(CostError::InvalidArea(area_sqm));
    }

    let mut total: u64 = 0;
    let mut ai_pack_counter = 0usize;
    let mut lines = Vec::with_capacity(selected_resource_keys.len());

    for key in selected_resource_keys {
        let key = key.as_ref();
        let entry = catalog
            .get(key)
            .ok_or_else(|| CostError::UnknownResourceKey(key.to_string()))?;
        let unit_cost = entry.unit_cost(capture_mode);
        let capped_namespace = Namespace::from_key(key).is_some_and(Namespace::is_capped);

        let charged = if capped_namespace {
            if ai_pack_counter < AI_PACK_CAP {
                ai_pack_counter += 1;
                true
            } else {
                tracing::debug!(key, "AI-pack cap reached, not charged");
                false
            }
        } else {
            true
        };

        let credits = if charged {
            resource_credits(unit_cost, area_sqm).ok_or_else(|| CostError::Overflow(key.to_string()))?
        } else {
            0
        };
        total = total
            .checked_add(credits)
            .ok_or_else(|| CostError::Overflow(key.to_string()))?;
        lines.push(CostLine {
            key: key.to_string(),
            unit_cost,
            credits,
            capped: !charged,
        });
    }

    Ok(CostBreakdown {
        lines,
        result: EstimationResult {
            total_credits_cost: total,
        },
    })
}

/// Credits for one resource over `area_sqm`, rounded half to even.
///
/// `None` when the result does not fit in a `u64`.
pub fn resource_credits(unit_cost: f64, area_sqm: f64) -> Option<u64> {
    let raw = (unit_cost * area_sqm / SQM_PER_UNIT).round_ties_even();
    if raw.is_nan() || raw <= 0.0 {
        Some(0)
    } else if raw >= u64::MAX as f64 {
        None
    } else {
        Some(raw as u64)
    }
}
