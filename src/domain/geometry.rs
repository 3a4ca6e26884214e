// Polygon geometry helpers
use super::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web-mercator ground resolution at zoom 0 on the equator, in meters per pixel
const EQUATOR_METERS_PER_PIXEL: f64 = 156543.03;
const VIEWPORT_WIDTH_PX: f64 = 1024.0;
const VIEWPORT_HEIGHT_PX: f64 = 768.0;

/// A GeoJSON position: `[longitude, latitude]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat(pub f64, pub f64);

impl LngLat {
    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

/// Arithmetic mean of every vertex in the ring.
///
/// The duplicated closing vertex is counted like any other, which pulls the
/// result slightly toward the first vertex.
pub fn centroid(ring: &[LngLat]) -> Result<LngLat, DomainError> {
    if ring.is_empty() {
        return Err(DomainError::InvalidRing { vertices: 0 });
    }

    let (lng_sum, lat_sum) = ring
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p.lng(), lat + p.lat()));
    let count = ring.len() as f64;

    Ok(LngLat(lng_sum / count, lat_sum / count))
}

/// Approximate area covered by a 1024x768 viewport at `zoom_level`, in square
/// kilometers, rounded to two decimals
pub fn approximate_area_sq_km(zoom_level: f64, latitude_deg: f64) -> f64 {
    let meters_per_pixel =
        EQUATOR_METERS_PER_PIXEL * (latitude_deg * PI / 180.0).cos() / 2f64.powf(zoom_level);
    let width_m = meters_per_pixel * VIEWPORT_WIDTH_PX;
    let height_m = meters_per_pixel * VIEWPORT_HEIGHT_PX;
    let area = width_m * height_m / 1_000_000.0;

    (area * 100.0).round() / 100.0
}
