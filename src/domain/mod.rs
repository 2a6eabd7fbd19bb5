//! Domain types used throughout the estimator.
//!
//! This module defines:
//!
//! - pricing inputs (`CaptureMode`, `Namespace`)
//! - the AOI and its area (`AreaOfInterest`, `AreaResult`)
//! - the per-submit request and its results (`EstimationRequest`, `CostBreakdown`)

pub mod request;
pub mod types;

pub use types::*;
