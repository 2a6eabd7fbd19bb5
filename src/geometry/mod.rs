//! Geographic geometry: GeoJSON parsing, local equal-area projection, area.
//!
//! The estimator is a pure function of the polygon's coordinates; nothing
//! here performs I/O or keeps state between calls.

pub mod area;
pub mod geojson;
pub mod projection;

pub use area::*;
pub use geojson::*;
pub use projection::*;
