// Geographic primitives - points and bounding boxes in WGS84 degrees

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

pub fn latitude_in_range(latitude: f64) -> bool {
    latitude.is_finite() && (-90.0..=90.0).contains(&latitude)
}

pub fn longitude_in_range(longitude: f64) -> bool {
    longitude.is_finite() && (-180.0..=180.0).contains(&longitude)
}

/// Rectangular filter, edges inclusive. Boxes never wrap the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self, String> {
        if !latitude_in_range(min_lat) || !latitude_in_range(max_lat) {
            return Err("latitudes must be within [-90, 90]".to_string());
        }
        if !longitude_in_range(min_lon) || !longitude_in_range(max_lon) {
            return Err("longitudes must be within [-180, 180]".to_string());
        }
        if min_lat > max_lat {
            return Err(format!("minLat {} is greater than maxLat {}", min_lat, max_lat));
        }
        if min_lon > max_lon {
            return Err(format!("minLon {} is greater than maxLon {}", min_lon, max_lon));
        }
        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lon
            && point.longitude <= self.max_lon
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    /// Parses `minLat,minLon,maxLat,maxLon`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(format!(
                "bbox must have 4 comma-separated values (minLat,minLon,maxLat,maxLon), got {}",
                parts.len()
            ));
        }
        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| format!("bbox value '{}' is not a number", part.trim()))?;
        }
        BoundingBox::new(values[0], values[1], values[2], values[3])
    }
}
