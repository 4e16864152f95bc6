//! Geographic locations and local Cartesian frames.
//!
//! Fault corners and observation points are given as longitude, latitude and
//! depth. Geometry is done in a local tangent frame measured in kilometres
//! east and north of an origin, obtained from the great-circle distance and
//! initial bearing on a spherical Earth. The inverse uses the destination-point
//! formula, so a frame round-trips its own points to rounding error.

use crate::types::Point3;
use serde::{Deserialize, Serialize};

/// Mean Earth radius (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic location; depth in km, positive downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Longitude (degrees).
    pub lon: f64,
    /// Latitude (degrees).
    pub lat: f64,
    /// Depth below the free surface (km).
    pub depth: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64, depth: f64) -> Self {
        Self { lon, lat, depth }
    }

    /// A location on the free surface.
    pub fn surface(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, 0.0)
    }

    /// Same horizontal position at another depth.
    pub fn with_depth(self, depth: f64) -> Self {
        Self { depth, ..self }
    }
}

/// Local east/north/depth frame anchored at a geographic origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFrame {
    origin_lon: f64,
    origin_lat: f64,
    sin_lat: f64,
    cos_lat: f64,
}

impl GeoFrame {
    /// Frame with origin at the given longitude/latitude (degrees).
    pub fn new(origin_lon: f64, origin_lat: f64) -> Self {
        let (sin_lat, cos_lat) = origin_lat.to_radians().sin_cos();
        Self {
            origin_lon,
            origin_lat,
            sin_lat,
            cos_lat,
        }
    }

    /// Frame anchored at the horizontal position of `location`.
    pub fn at(location: &Location) -> Self {
        Self::new(location.lon, location.lat)
    }

    /// Origin longitude and latitude (degrees).
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_lon, self.origin_lat)
    }

    /// Project to local `(east km, north km, depth km)`.
    pub fn to_local(&self, location: &Location) -> Point3 {
        let lat2 = location.lat.to_radians();
        let dlat = lat2 - self.origin_lat.to_radians();
        let dlon = (location.lon - self.origin_lon).to_radians();
        let (sin_lat2, cos_lat2) = lat2.sin_cos();

        let a = (dlat / 2.0).sin().powi(2) + self.cos_lat * cos_lat2 * (dlon / 2.0).sin().powi(2);
        let distance = 2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

        let bearing = (dlon.sin() * cos_lat2)
            .atan2(self.cos_lat * sin_lat2 - self.sin_lat * cos_lat2 * dlon.cos());
        let (sin_b, cos_b) = bearing.sin_cos();

        Point3::new(distance * sin_b, distance * cos_b, location.depth)
    }

    /// Inverse of [`GeoFrame::to_local`].
    pub fn to_geographic(&self, point: &Point3) -> Location {
        let distance = point.x.hypot(point.y);
        if distance == 0.0 {
            return Location::new(self.origin_lon, self.origin_lat, point.z);
        }
        let bearing = point.x.atan2(point.y);
        let delta = distance / EARTH_RADIUS_KM;
        let (sin_d, cos_d) = delta.sin_cos();
        let (sin_b, cos_b) = bearing.sin_cos();

        let sin_lat2 = (self.sin_lat * cos_d + self.cos_lat * sin_d * cos_b).clamp(-1.0, 1.0);
        let lat2 = sin_lat2.asin();
        let dlon = (sin_b * sin_d * self.cos_lat).atan2(cos_d - self.sin_lat * sin_lat2);

        Location::new(
            self.origin_lon + dlon.to_degrees(),
            lat2.to_degrees(),
            point.z,
        )
    }
}
