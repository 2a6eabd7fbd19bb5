//! Area of an AOI in square metres.
//!
//! The polygon is reprojected into an Albers Equal-Area projection centred on
//! its own centroid (standard parallels at centroid latitude ∓ 2°) and
//! measured with the planar shoelace formula. Interior rings are subtracted.

use geo::{Area, Centroid, MapCoords, MultiPolygon};
use serde_json::Value;

use crate::domain::{AreaOfInterest, AreaResult};
use crate::error::GeometryError;
use crate::geometry::{LocalEqualArea, parse_geometry};

/// Estimate the area of a GeoJSON geometry.
///
/// Never fails: any parse or projection problem is logged and reported as a
/// zero area with `degraded = true`. A zero total cost built on a degraded
/// area means "unknown", not "free".
pub fn estimate_area(geometry: &Value) -> AreaResult {
    match try_estimate_area(geometry) {
        Ok(value) => AreaResult::computed(value),
        Err(err) => {
            tracing::warn!(error = %err, "area estimate failed, using 0");
            AreaResult::degraded(err.to_string())
        }
    }
}

/// Area of the AOI's geometry; see [`estimate_area`].
pub fn estimate_aoi_area(aoi: &AreaOfInterest) -> AreaResult {
    estimate_area(&aoi.geometry)
}

/// Fallible core of [`estimate_area`].
pub fn try_estimate_area(geometry: &Value) -> Result<f64, GeometryError> {
    let shape = parse_geometry(geometry)?;
    projected_area(&shape)
}

/// Area of an already-parsed lon/lat shape.
pub fn projected_area(shape: &MultiPolygon<f64>) -> Result<f64, GeometryError> {
    let centroid = shape.centroid().ok_or(GeometryError::DegenerateCentroid)?;
    let (lon, lat) = (centroid.x(), centroid.y());
    if !(lon.is_finite() && lat.is_finite()) {
        return Err(GeometryError::DegenerateCentroid);
    }

    let projection = LocalEqualArea::centred_on(lat, lon)?;
    let projected = shape.try_map_coords(|coord| projection.forward(coord))?;

    let area = projected.unsigned_area();
    if !area.is_finite() {
        return Err(GeometryError::Projection(format!("non-finite area {area}")));
    }
    tracing::debug!(lon, lat, area_sqm = area, "projected area");
    Ok(area)
}
