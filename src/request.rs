//! Wire-level itinerary and reroute requests and their validation.

use serde::Deserialize;
use tracing::warn;

use crate::error::{PlanError, RouteError, ValidationError};
use crate::mapbox::{MapboxClient, MapboxConfig};
use crate::model::{Itinerary, Point, TransportMode};
use crate::planner::{generate_with_cancel, CancelToken, PlanOptions};
use crate::routing::{route_for_order, RouteBudget, Unavailable};
use crate::traits::Directions;

/// Request as received from the caller, before any checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryRequest {
    #[serde(default)]
    pub points: Vec<Point>,
    pub days: i64,
    pub transport_mode: String,
    #[serde(default)]
    pub routing_credential: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub points: Vec<Point>,
    pub days: u32,
    pub transport_mode: TransportMode,
    pub routing_credential: Option<String>,
}

impl ItineraryRequest {
    pub fn validate(self) -> Result<ValidatedRequest, ValidationError> {
        let days = u32::try_from(self.days)
            .ok()
            .filter(|days| *days >= 1)
            .ok_or(ValidationError::InvalidDays(self.days))?;
        let transport_mode = self.transport_mode.parse::<TransportMode>()?;
        if self.points.is_empty() {
            return Err(ValidationError::NoLocatedPoints);
        }

        Ok(ValidatedRequest {
            points: self.points,
            days,
            transport_mode,
            routing_credential: self.routing_credential,
        })
    }
}

/// Validates `request` and plans it against Mapbox.
///
/// The request's credential wins over the one in `config`. A client that
/// cannot be built leaves every day on the fallback route.
pub fn plan_request(
    request: ItineraryRequest,
    config: MapboxConfig,
    options: &PlanOptions,
    cancel: &CancelToken,
) -> Result<Itinerary<String>, PlanError> {
    let request = request.validate()?;

    let mut config = config;
    if let Some(token) = request.routing_credential {
        config.access_token = Some(token);
    }

    match MapboxClient::new(config) {
        Ok(client) => generate_with_cancel(
            &request.points,
            request.days,
            request.transport_mode,
            &client,
            options,
            cancel,
        ),
        Err(err) => {
            warn!(error = %err, "could not build routing client");
            generate_with_cancel(
                &request.points,
                request.days,
                request.transport_mode,
                &Unavailable,
                options,
                cancel,
            )
        }
    }
}

/// One coordinate of a reroute request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Road geometry for a day whose stops are already in their final order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
    pub transport_mode: String,
    #[serde(default)]
    pub routing_credential: Option<String>,
}

/// Validates `request` and routes its coordinates in the given order.
///
/// The coordinate count is checked before the mode; neither check sends
/// anything.
pub fn route_request(
    request: RouteRequest,
    config: MapboxConfig,
    budget: &RouteBudget,
) -> Result<Directions, RouteError> {
    let locations: Vec<(f64, f64)> = request.coordinates.iter().map(|c| (c.lat, c.lng)).collect();
    if locations.len() < 2 {
        return Err(ValidationError::TooFewCoordinates(locations.len()).into());
    }
    let mode = request.transport_mode.parse::<TransportMode>()?;

    let mut config = config;
    if let Some(token) = request.routing_credential {
        config.access_token = Some(token);
    }

    match MapboxClient::new(config) {
        Ok(client) => route_for_order(&locations, mode, &client, budget),
        Err(err) => {
            warn!(error = %err, "could not build routing client");
            route_for_order(&locations, mode, &Unavailable, budget)
        }
    }
}
