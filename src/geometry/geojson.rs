//! GeoJSON-like geometry parsing into `geo` types.
//!
//! Positions are `[lon, lat, ...]`; extra ordinates (altitude) are ignored.
//! Axis order is kept as x = longitude, y = latitude from here on.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;

use crate::error::GeometryError;

type Position = Vec<f64>;
type Ring = Vec<Position>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

/// Parse a `Polygon` or `MultiPolygon` geometry object.
///
/// A polygon is returned as a single-member multipolygon so callers handle one
/// shape type.
pub fn parse_geometry(value: &Value) -> Result<MultiPolygon<f64>, GeometryError> {
    let object = value
        .as_object()
        .ok_or_else(|| GeometryError::Parse("geometry is not a JSON object".into()))?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::Parse("geometry has no `type`".into()))?;
    if kind != "Polygon" && kind != "MultiPolygon" {
        return Err(GeometryError::UnsupportedGeometry(kind.to_string()));
    }
    if !object.contains_key("coordinates") {
        return Err(GeometryError::MissingCoordinates);
    }

    let raw: RawGeometry =
        serde_json::from_value(value.clone()).map_err(|e| GeometryError::Parse(e.to_string()))?;

    let polygons = match raw {
        RawGeometry::Polygon { coordinates } => vec![to_polygon(coordinates)?],
        RawGeometry::MultiPolygon { coordinates } => coordinates
            .into_iter()
            .map(to_polygon)
            .collect::<Result<Vec<_>, _>>()?,
    };
    if polygons.is_empty() {
        return Err(GeometryError::EmptyRing);
    }
    Ok(MultiPolygon::new(polygons))
}

fn to_polygon(rings: Vec<Ring>) -> Result<Polygon<f64>, GeometryError> {
    let mut rings = rings.into_iter();
    let exterior = rings.next().ok_or(GeometryError::EmptyRing)?;
    if exterior.is_empty() {
        return Err(GeometryError::EmptyRing);
    }
    let exterior = to_line_string(exterior)?;
    let interiors = rings.map(to_line_string).collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn to_line_string(ring: Ring) -> Result<LineString<f64>, GeometryError> {
    ring.into_iter()
        .map(|pos| match pos.as_slice() {
            [lon, lat, ..] => {
                let (lon, lat) = (*lon, *lat);
                if !(lon.is_finite() && lat.is_finite()) || lat.abs() > 90.0 || lon.abs() > 360.0 {
                    return Err(GeometryError::InvalidCoordinate { lon, lat });
                }
                Ok(Coord { x: lon, y: lat })
            }
            _ => Err(GeometryError::Parse(format!(
                "position needs at least 2 ordinates, got {}",
                pos.len()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}
