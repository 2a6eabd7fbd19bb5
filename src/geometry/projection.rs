//! Local Albers Equal-Area projection on WGS84, built with `proj4rs`.

use geo::Coord;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::GeometryError;

const GEOGRAPHIC: &str = "+proj=latlong +datum=WGS84 +no_defs";

/// Half-width of the band between the standard parallels, in degrees.
pub const PARALLEL_OFFSET_DEG: f64 = 2.0;

// Below this |lat_1 + lat_2| (radians) the cone constant is too small for a
// metre-accurate conic; PROJ rejects the exactly symmetric case outright.
const SYMMETRIC_PARALLELS_EPS: f64 = 1e-6;

/// Albers Equal-Area projection centred on a point, output in metres.
#[derive(Debug)]
pub struct LocalEqualArea {
    geographic: Proj,
    projected: Proj,
}

impl LocalEqualArea {
    /// Projection with origin `(lat, lon)` and standard parallels
    /// [`PARALLEL_OFFSET_DEG`] either side of `lat`, all in degrees.
    pub fn centred_on(lat: f64, lon: f64) -> Result<Self, GeometryError> {
        if !(lat.is_finite() && lon.is_finite()) {
            return Err(GeometryError::Projection(format!("non-finite origin ({lon}, {lat})")));
        }
        let lat_1 = lat - PARALLEL_OFFSET_DEG;
        let lat_2 = lat + PARALLEL_OFFSET_DEG;
        if lat_1 < -90.0 || lat_2 > 90.0 {
            return Err(GeometryError::Projection(format!(
                "standard parallels {lat_1}, {lat_2} are outside [-90, 90]"
            )));
        }
        if (lat_1 + lat_2).to_radians().abs() < SYMMETRIC_PARALLELS_EPS {
            return Err(GeometryError::Projection(format!(
                "standard parallels {lat_1}, {lat_2} are symmetric about the equator"
            )));
        }

        let definition = format!(
            "+proj=aea +lat_0={lat} +lon_0={lon} +lat_1={lat_1} +lat_2={lat_2} +datum=WGS84 +units=m +no_defs"
        );
        tracing::trace!(%definition, "building local projection");
        Ok(Self {
            geographic: parse(GEOGRAPHIC)?,
            projected: parse(&definition)?,
        })
    }

    /// Project a geographic coordinate (x = lon, y = lat, degrees) to metres,
    /// keeping x east and y north.
    pub fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>, GeometryError> {
        let (lon, lat) = (coord.x, coord.y);
        if !(lon.is_finite() && lat.is_finite()) || lat.abs() > 90.0 {
            return Err(GeometryError::InvalidCoordinate { lon, lat });
        }
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.geographic, &self.projected, &mut point)
            .map_err(|e| GeometryError::Projection(e.to_string()))?;

        let (x, y, _) = point;
        if !(x.is_finite() && y.is_finite()) {
            return Err(GeometryError::Projection(format!("non-finite result for ({lon}, {lat})")));
        }
        Ok(Coord { x, y })
    }
}

fn parse(definition: &str) -> Result<Proj, GeometryError> {
    Proj::from_proj_string(definition)
        .map_err(|e| GeometryError::Projection(format!("`{definition}`: {e}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn origin_projects_to_zero() {
        let proj = LocalEqualArea::centred_on(-37.81, 144.96).unwrap();
        let p = proj.forward(Coord { x: 144.96, y: -37.81 }).unwrap();
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6, "{p:?}");
    }

    #[test]
    fn axes_are_east_and_north() {
        let proj = LocalEqualArea::centred_on(-37.81, 144.96).unwrap();
        let east = proj.forward(Coord { x: 144.97, y: -37.81 }).unwrap();
        let north = proj.forward(Coord { x: 144.96, y: -37.80 }).unwrap();
        // 0.01° of longitude at ~38°S is ~880 m; 0.01° of latitude is ~1110 m.
        assert!((east.x - 880.0).abs() < 10.0, "{east:?}");
        assert!(east.y.abs() < 10.0, "{east:?}");
        assert!((north.y - 1110.0).abs() < 10.0, "{north:?}");
        assert!(north.x.abs() < 1e-6, "{north:?}");
    }

    #[test]
    fn symmetric_parallels_are_rejected() {
        assert_matches!(LocalEqualArea::centred_on(0.0, 10.0), Err(GeometryError::Projection(_)));
    }

    #[test]
    fn parallels_beyond_the_pole_are_rejected() {
        assert_matches!(LocalEqualArea::centred_on(89.5, 0.0), Err(GeometryError::Projection(_)));
        assert_matches!(LocalEqualArea::centred_on(-88.1, 0.0), Err(GeometryError::Projection(_)));
    }

    #[test]
    fn out_of_range_vertex_is_rejected() {
        let proj = LocalEqualArea::centred_on(45.0, 7.0).unwrap();
        assert_matches!(
            proj.forward(Coord { x: 7.0, y: 91.0 }),
            Err(GeometryError::InvalidCoordinate { .. })
        );
    }
}
