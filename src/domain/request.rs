//! Construction of AOIs and estimation requests from user input.

use geo::BoundingRect;
use serde_json::{Value, json};

use crate::domain::{AreaOfInterest, CaptureMode, EstimationRequest};
use crate::error::{AppError, EXIT_USAGE};
use crate::geometry::parse_geometry;

impl AreaOfInterest {
    pub fn new(geometry: Value) -> Self {
        Self { geometry }
    }

    /// Build an AOI from uploaded GeoJSON text.
    ///
    /// Accepts a `FeatureCollection`, a single `Feature`, or a bare geometry.
    /// Only the first feature of a collection is used; any further features
    /// are dropped with a warning.
    pub fn from_geojson_str(text: &str) -> Result<Self, AppError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Upload a valid GeoJSON: {e}")))?;
        Self::from_geojson_value(root)
    }

    pub fn from_geojson_value(root: Value) -> Result<Self, AppError> {
        let kind = root.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
        match kind.as_str() {
            "FeatureCollection" => {
                let features = root
                    .get("features")
                    .and_then(Value::as_array)
                    .ok_or_else(|| AppError::new(EXIT_USAGE, "FeatureCollection has no `features` array."))?;
                let first = features
                    .first()
                    .ok_or_else(|| AppError::new(EXIT_USAGE, "FeatureCollection is empty."))?;
                if features.len() > 1 {
                    tracing::warn!(
                        discarded = features.len() - 1,
                        "only the first feature is used as the area of interest"
                    );
                }
                Self::from_feature(first)
            }
            "Feature" => Self::from_feature(&root),
            "" => Err(AppError::new(EXIT_USAGE, "GeoJSON object has no `type`.")),
            _ => Ok(Self::new(root)),
        }
    }

    fn from_feature(feature: &Value) -> Result<Self, AppError> {
        match feature.get("geometry") {
            Some(geometry) if !geometry.is_null() => Ok(Self::new(geometry.clone())),
            _ => Err(AppError::new(EXIT_USAGE, "Feature has no geometry.")),
        }
    }

    /// A drawn rectangle, as a closed polygon ring in lon/lat order.
    pub fn from_bbox(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, AppError> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) || min_lon >= max_lon || min_lat >= max_lat {
            return Err(AppError::new(
                EXIT_USAGE,
                format!("Invalid bbox {min_lon},{min_lat},{max_lon},{max_lat} (expected min < max)."),
            ));
        }
        Ok(Self::new(json!({
            "type": "Polygon",
            "coordinates": [[
                [min_lon, min_lat],
                [max_lon, min_lat],
                [max_lon, max_lat],
                [min_lon, max_lat],
                [min_lon, min_lat],
            ]],
        })))
    }

    /// `(min_lon, min_lat, max_lon, max_lat)` of the geometry, if it parses.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let shape = parse_geometry(&self.geometry).ok()?;
        let rect = shape.bounding_rect()?;
        Some((rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

impl EstimationRequest {
    /// Build a request, rejecting an empty selection.
    ///
    /// Repeated keys are dropped; the first occurrence keeps its position so
    /// the AI-pack cap sees the caller's order.
    pub fn new<I, S>(keys: I, capture_mode: CaptureMode, area: AreaOfInterest) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for key in keys {
            let key: String = key.into();
            let key = key.trim().to_string();
            if key.is_empty() || selected.contains(&key) {
                continue;
            }
            selected.push(key);
        }
        if selected.is_empty() {
            return Err(AppError::new(EXIT_USAGE, "Please select at least one resource type."));
        }
        Ok(Self {
            selected_resource_keys: selected,
            capture_mode,
            area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_keeps_first_feature_only() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[1,1],[2,1],[2,2],[1,1]]]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[5,5],[6,5],[6,6],[5,5]]]}}
            ]
        }"#;
        let aoi = AreaOfInterest::from_geojson_str(text).unwrap();
        assert_eq!(aoi.geometry["coordinates"][0][0][0], 1);
    }

    #[test]
    fn bare_geometry_is_accepted() {
        let aoi = AreaOfInterest::from_geojson_str(r#"{"type":"Polygon","coordinates":[]}"#).unwrap();
        assert_eq!(aoi.geometry["type"], "Polygon");
    }

    #[test]
    fn invalid_upload_is_rejected() {
        let err = AreaOfInterest::from_geojson_str("not json").unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let err = AreaOfInterest::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#).unwrap_err();
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn bbox_roundtrips_through_polygon() {
        let aoi = AreaOfInterest::from_bbox(144.95, -37.82, 144.97, -37.80).unwrap();
        let (min_lon, min_lat, max_lon, max_lat) = aoi.bbox().unwrap();
        assert!((min_lon - 144.95).abs() < 1e-12);
        assert!((min_lat + 37.82).abs() < 1e-12);
        assert!((max_lon - 144.97).abs() < 1e-12);
        assert!((max_lat + 37.80).abs() < 1e-12);
    }

    #[test]
    fn inverted_bbox_is_rejected() {
        assert!(AreaOfInterest::from_bbox(1.0, 1.0, 0.0, 2.0).is_err());
    }

    #[test]
    fn request_dedupes_in_first_seen_order() {
        let aoi = AreaOfInterest::from_bbox(0.0, 0.0, 0.001, 0.001).unwrap();
        let req = EstimationRequest::new(
            ["aiPacks:pool", "raster:Vert", "aiPacks:pool", " "],
            CaptureMode::Single,
            aoi,
        )
        .unwrap();
        assert_eq!(req.selected_resource_keys, vec!["aiPacks:pool", "raster:Vert"]);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let aoi = AreaOfInterest::from_bbox(0.0, 0.0, 0.001, 0.001).unwrap();
        let err = EstimationRequest::new(Vec::<String>::new(), CaptureMode::All, aoi).unwrap_err();
        assert!(err.message().contains("at least one"));
    }
}
