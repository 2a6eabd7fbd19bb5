//! `aoi-credits` library crate.
//!
//! The binary (`aoi-credits`) is a thin wrapper around this library so that:
//!
//! - the area estimator and cost model are testable without spawning processes
//! - other front-ends can reuse the same estimation workflow
//!
//! The two core pieces are pure and synchronous: [`geometry::estimate_area`]
//! and [`cost::estimate_cost`]. Both can be called concurrently; the
//! [`catalog::ResourceCatalog`] they read is immutable once loaded.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod cost;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod pricing;
pub mod report;
