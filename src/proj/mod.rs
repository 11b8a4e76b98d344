//! Coordinate reprojection between EPSG:4326 (degrees) and EPSG:3857
//! (spherical Web Mercator, meters).
//!
//! The hazard data is stored in EPSG:3857, so query points are projected
//! forward once and all distance math happens in planar meters. The
//! forward/inverse pair round-trips well below a meter for any valid input,
//! which the meter-scale radius semantics depend on.

use geo::{Coord, LineString, Polygon};

use crate::error::QueryError;
use crate::models::{GeographicPoint, PlanarPoint};

/// Spherical earth radius used by EPSG:3857, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// `tan(π/4 + φ/2)` is infinite at φ = ±90°. The exact poles are pinned this
/// far inside so every valid latitude projects to a finite y; the round-trip
/// error this introduces is micrometers.
const POLE_EPSILON_DEG: f64 = 1e-10;

/// Project a geographic point to planar Web Mercator meters. Total over
/// valid geographic points: every `lat` in [-90, 90] projects finitely.
pub fn to_planar(point: GeographicPoint) -> PlanarPoint {
    let lat = point
        .lat
        .clamp(-90.0 + POLE_EPSILON_DEG, 90.0 - POLE_EPSILON_DEG);

    let lon_rad = point.lon.to_radians();
    let lat_rad = lat.to_radians();

    PlanarPoint {
        x: EARTH_RADIUS_M * lon_rad,
        y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat_rad / 2.0).tan().ln(),
    }
}

/// Inverse projection back to degrees.
pub fn to_geographic(point: PlanarPoint) -> GeographicPoint {
    let lon = (point.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (point.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    GeographicPoint { lat, lon }
}

fn project_coord(lon: f64, lat: f64) -> Result<Coord<f64>, QueryError> {
    let planar = to_planar(GeographicPoint::new(lat, lon)?);
    Ok(Coord {
        x: planar.x,
        y: planar.y,
    })
}

/// Project a sequence of `[lon, lat]` degree pairs to a planar line string.
pub fn project_line_string(coordinates: &[[f64; 2]]) -> Result<LineString<f64>, QueryError> {
    let coords = coordinates
        .iter()
        .map(|&[lon, lat]| project_coord(lon, lat))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

/// Project an outer ring of `[lon, lat]` degree pairs to a planar polygon,
/// closing the ring if the source left it open.
pub fn project_polygon(coordinates: &[[f64; 2]]) -> Result<Polygon<f64>, QueryError> {
    let mut ring = coordinates
        .iter()
        .map(|&[lon, lat]| project_coord(lon, lat))
        .collect::<Result<Vec<_>, _>>()?;

    if ring.first() != ring.last() {
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
    }

    Ok(Polygon::new(LineString::new(ring), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // EPSG:3857 is accurate to far better than this; the radius semantics
    // only need sub-meter.
    const EPSILON_M: f64 = 1e-6;

    fn assert_round_trips(lat: f64, lon: f64) {
        let original = GeographicPoint::new(lat, lon).unwrap();
        let planar = to_planar(original);
        let back = to_geographic(planar);

        // Degree deltas converted to an upper bound in meters at the equator.
        let meters_per_degree = EARTH_RADIUS_M.to_radians();
        assert!((back.lat - original.lat).abs() * meters_per_degree < EPSILON_M);
        assert!((back.lon - original.lon).abs() * meters_per_degree < EPSILON_M);
    }

    #[test]
    fn test_round_trip_sub_meter() {
        assert_round_trips(49.0134, 12.1016);
        assert_round_trips(0.0, 0.0);
        assert_round_trips(-33.8688, 151.2093);
        assert_round_trips(82.5, -179.99);
        assert_round_trips(-82.5, 179.99);
        assert_round_trips(89.0, 12.0);
        assert_round_trips(-89.999, 0.0);
    }

    #[test]
    fn test_known_projection_values() {
        // Origin maps to origin.
        let origin = to_planar(GeographicPoint::new(0.0, 0.0).unwrap());
        assert!(origin.x.abs() < 1e-9);
        assert!(origin.y.abs() < 1e-9);

        // lon 180 maps to half the Mercator circumference.
        let east = to_planar(GeographicPoint::new(0.0, 180.0).unwrap());
        assert!((east.x - EARTH_RADIUS_M * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_poles_project_finite() {
        for lat in [90.0, -90.0, 89.999, -89.999] {
            let planar = to_planar(GeographicPoint::new(lat, 0.0).unwrap());
            assert!(planar.y.is_finite(), "lat {} projected to {:?}", lat, planar);
        }

        // The exact pole round-trips within the pinning epsilon.
        let back = to_geographic(to_planar(GeographicPoint::new(90.0, 0.0).unwrap()));
        assert!((back.lat - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_ring_closed() {
        let ring = [[12.10, 49.01], [12.11, 49.01], [12.11, 49.02], [12.10, 49.02]];
        let poly = project_polygon(&ring).unwrap();
        let exterior = poly.exterior();
        assert_eq!(exterior.0.len(), 5);
        assert_eq!(exterior.0.first(), exterior.0.last());
    }

    #[test]
    fn test_line_string_rejects_bad_vertex() {
        let line = [[12.10, 49.01], [200.0, 49.01]];
        assert!(project_line_string(&line).is_err());
    }
}
