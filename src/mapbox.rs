//! Mapbox HTTP adapter for optimized trips and directions.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::RoutingError;
use crate::geometry::Geometry;
use crate::model::TransportMode;
use crate::routing::RouteBudget;
use crate::traits::{Directions, Trip, TripProvider, TripWaypoint};

#[derive(Debug, Clone)]
pub struct MapboxConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    /// Trip start constraint (`any` or `first`).
    pub source: String,
    /// Trip end constraint (`any` or `last`).
    pub destination: String,
    pub max_trip_coordinates: usize,
    pub max_directions_coordinates: usize,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_string(),
            access_token: None,
            timeout_secs: 10,
            source: "any".to_string(),
            destination: "any".to_string(),
            max_trip_coordinates: 12,
            max_directions_coordinates: 25,
        }
    }
}

impl MapboxConfig {
    /// Defaults overridden by `MAPBOX_ACCESS_TOKEN` and `MAPBOX_BASE_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(token) = std::env::var("MAPBOX_ACCESS_TOKEN") {
            if !token.is_empty() {
                config.access_token = Some(token);
            }
        }
        if let Ok(base_url) = std::env::var("MAPBOX_BASE_URL") {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct MapboxClient {
    config: MapboxConfig,
    client: reqwest::blocking::Client,
}

impl MapboxClient {
    pub fn new(config: MapboxConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &MapboxConfig {
        &self.config
    }

    fn token(&self) -> Result<&str, RoutingError> {
        self.config
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(RoutingError::MissingCredential)
    }

    /// One GET, given whatever is left of `budget` at send time.
    fn get<T>(&self, url: String, budget: &RouteBudget) -> Result<T, RoutingError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let timeout = budget.request_timeout(Duration::from_secs(self.config.timeout_secs))?;
        let response = self.client.get(url).timeout(timeout).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RoutingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>()?)
    }

    fn directions_chunk(
        &self,
        locations: &[(f64, f64)],
        profile: &str,
        token: &str,
        budget: &RouteBudget,
    ) -> Result<Option<RouteBody>, RoutingError> {
        let url = format!(
            "{}/directions/v5/mapbox/{}/{}?geometries=geojson&steps=false&access_token={}",
            self.config.base_url,
            profile,
            coordinate_path(locations),
            token
        );
        let body: DirectionsResponse = self.get(url, budget)?;
        Ok(body.routes.into_iter().next())
    }
}

impl TripProvider for MapboxClient {
    fn max_trip_coordinates(&self) -> usize {
        self.config.max_trip_coordinates
    }

    fn optimized_trip(
        &self,
        locations: &[(f64, f64)],
        mode: TransportMode,
        budget: &RouteBudget,
    ) -> Result<Trip, RoutingError> {
        let token = self.token()?;
        let profile = mode.as_str();
        debug!(profile, coordinates = locations.len(), "requesting optimized trip");

        let url = format!(
            "{}/optimized-trips/v1/mapbox/{}/{}?roundtrip=false&source={}&destination={}&geometries=geojson&access_token={}",
            self.config.base_url,
            profile,
            coordinate_path(locations),
            self.config.source,
            self.config.destination,
            token
        );
        let body: TripResponse = self.get(url, budget)?;

        let geometry = body
            .trips
            .into_iter()
            .next()
            .map(|trip| trip.geometry)
            .ok_or(RoutingError::NoTrip)?;

        let waypoints = body
            .waypoints
            .into_iter()
            .map(|waypoint| TripWaypoint {
                waypoint_index: waypoint.waypoint_index,
                trips_index: waypoint.trips_index,
            })
            .collect();

        Ok(Trip { geometry, waypoints })
    }

    /// Requests directions in overlapping chunks and joins the lines.
    ///
    /// Chunks run one after another; each one is sent only if the budget
    /// still has time left and gets no more than that.
    fn directions(
        &self,
        locations: &[(f64, f64)],
        mode: TransportMode,
        budget: &RouteBudget,
    ) -> Result<Directions, RoutingError> {
        let token = self.token()?;
        let profile = mode.as_str();
        debug!(profile, coordinates = locations.len(), "requesting directions");

        let mut geometries = Vec::new();
        let mut distance = 0.0;
        let mut duration = 0.0;
        for chunk in chunk_bounds(locations.len(), self.config.max_directions_coordinates) {
            let chunk = &locations[chunk.0..chunk.1];
            if chunk.len() < 2 {
                continue;
            }
            if let Some(route) = self.directions_chunk(chunk, profile, token, budget)? {
                distance += route.distance;
                duration += route.duration;
                geometries.push(route.geometry);
            }
        }

        let geometry = Geometry::merge_chunks(geometries).ok_or(RoutingError::NoTrip)?;
        Ok(Directions {
            geometry,
            distance,
            duration,
        })
    }
}

/// `lng,lat;lng,lat;...` with six decimals.
fn coordinate_path(locations: &[(f64, f64)]) -> String {
    locations
        .iter()
        .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
        .collect::<Vec<_>>()
        .join(";")
}

/// Half-open ranges of at most `size` items where each range starts on the
/// previous range's last item.
fn chunk_bounds(len: usize, size: usize) -> Vec<(usize, usize)> {
    let size = size.max(2);
    let mut bounds = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + size).min(len);
        bounds.push((start, end));
        if end == len {
            break;
        }
        start += size - 1;
    }
    bounds
}

#[derive(Debug, Deserialize)]
struct TripResponse {
    #[serde(default)]
    trips: Vec<TripBody>,
    #[serde(default)]
    waypoints: Vec<WaypointBody>,
}

#[derive(Debug, Deserialize)]
struct TripBody {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct WaypointBody {
    waypoint_index: usize,
    trips_index: usize,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteBody>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    geometry: Geometry,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}
