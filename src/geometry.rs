//! Route geometry and planar distance.
//!
//! Geometry is GeoJSON shaped, so coordinates are (lng, lat) pairs here even
//! though the rest of the crate passes (lat, lng) tuples.
//!
//! Distances are plain Euclidean over degrees. This is fine at city scale and
//! wrong near the poles or across the antimeridian; clustering, balancing and
//! the fallback order all depend on it, so it must stay planar.

use serde::{Deserialize, Serialize};

/// A GeoJSON geometry as produced by the provider or the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    /// Builds a LineString through (lat, lng) locations in order.
    pub fn line_through(locations: &[(f64, f64)]) -> Self {
        Geometry::LineString {
            coordinates: locations.iter().map(|&(lat, lng)| [lng, lat]).collect(),
        }
    }

    /// Coordinates as (lng, lat) pairs.
    pub fn coordinates(&self) -> &[[f64; 2]] {
        match self {
            Geometry::LineString { coordinates } => coordinates,
        }
    }

    /// Joins consecutive line chunks that share their boundary coordinate.
    ///
    /// The first coordinate of every chunk after the first is dropped.
    pub fn merge_chunks(chunks: Vec<Geometry>) -> Option<Geometry> {
        let mut merged: Vec<[f64; 2]> = Vec::new();
        let mut any = false;
        for (index, chunk) in chunks.into_iter().enumerate() {
            let Geometry::LineString { coordinates } = chunk;
            let skip = usize::from(index > 0);
            merged.extend(coordinates.into_iter().skip(skip));
            any = true;
        }

        any.then_some(Geometry::LineString { coordinates: merged })
    }
}

/// Euclidean distance between two (lat, lng) locations, in degrees.
pub fn planar_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let d_lat = from.0 - to.0;
    let d_lng = from.1 - to.1;
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}

/// Mean position of a non-empty set of locations.
pub fn centroid(locations: impl IntoIterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let mut count = 0usize;
    let (mut sum_lat, mut sum_lng) = (0.0, 0.0);
    for (lat, lng) in locations {
        sum_lat += lat;
        sum_lng += lng;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some((sum_lat / count as f64, sum_lng / count as f64))
}
