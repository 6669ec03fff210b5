//! Per-day route building.
//!
//! The provider is asked for an optimized trip first. Any provider failure
//! falls back to a nearest-neighbor order with a straight-line geometry, so a
//! day always gets a route.
//!
//! `route_for_order` is the other entry point: it recomputes road geometry
//! for a day whose order was set by hand, and reports provider failures.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{RouteError, RoutingError, ValidationError};
use crate::geometry::{planar_distance, Geometry};
use crate::model::{DayRoute, TransportMode};
use crate::planner::CancelToken;
use crate::traits::{Directions, Stop, Trip, TripProvider, TripWaypoint};

/// Most coordinates `route_for_order` sends; later ones are dropped.
pub const MAX_ROUTE_COORDINATES: usize = 25;

/// Time and cancellation limits shared by all routes of one itinerary.
#[derive(Debug, Clone, Default)]
pub struct RouteBudget {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl RouteBudget {
    /// Budget ending `timeout` from now.
    pub fn new(timeout: Duration, cancel: CancelToken) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancel,
        }
    }

    /// No deadline and a token nobody else holds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Time left for the next provider call.
    pub fn remaining(&self) -> Result<Duration, RoutingError> {
        if self.cancel.is_cancelled() {
            return Err(RoutingError::Cancelled);
        }
        match self.deadline {
            None => Ok(Duration::MAX),
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    Err(RoutingError::DeadlineExceeded)
                } else {
                    Ok(left)
                }
            }
        }
    }

    /// Timeout for one request: what is left, capped at `limit`.
    pub fn request_timeout(&self, limit: Duration) -> Result<Duration, RoutingError> {
        Ok(self.remaining()?.min(limit))
    }
}

/// Provider for when no routing service is configured.
///
/// Every call fails, so every multi-stop day gets the fallback route.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl TripProvider for Unavailable {
    fn max_trip_coordinates(&self) -> usize {
        usize::MAX
    }

    fn optimized_trip(
        &self,
        _locations: &[(f64, f64)],
        _mode: TransportMode,
        _budget: &RouteBudget,
    ) -> Result<Trip, RoutingError> {
        Err(RoutingError::MissingCredential)
    }

    fn directions(
        &self,
        _locations: &[(f64, f64)],
        _mode: TransportMode,
        _budget: &RouteBudget,
    ) -> Result<Directions, RoutingError> {
        Err(RoutingError::MissingCredential)
    }
}

/// Orders one day's stops and produces its geometry. Never fails.
pub fn build_route<S, P>(
    stops: &[&S],
    day_number: u32,
    mode: TransportMode,
    provider: &P,
    budget: &RouteBudget,
) -> DayRoute<S::Id>
where
    S: Stop,
    P: TripProvider + ?Sized,
{
    if stops.len() < 2 {
        return DayRoute {
            day_number,
            point_ids: stops.iter().map(|stop| stop.id().clone()).collect(),
            geometry: None,
            is_fallback: false,
        };
    }

    let locations: Vec<(f64, f64)> = stops.iter().map(|stop| stop.location()).collect();

    let (order, geometry, is_fallback) = match provider_route(&locations, mode, provider, budget) {
        Ok((order, geometry)) => (order, geometry, false),
        Err(err) => {
            match err {
                RoutingError::Cancelled => debug!(day = day_number, "routing cancelled, using fallback route"),
                _ => warn!(day = day_number, error = %err, "routing provider failed, using fallback route"),
            }
            let order = nearest_neighbor_order(&locations);
            let ordered: Vec<(f64, f64)> = order.iter().map(|&index| locations[index]).collect();
            (order, Geometry::line_through(&ordered), true)
        }
    };

    DayRoute {
        day_number,
        point_ids: order.iter().map(|&index| stops[index].id().clone()).collect(),
        geometry: Some(geometry),
        is_fallback,
    }
}

fn provider_route<P>(
    locations: &[(f64, f64)],
    mode: TransportMode,
    provider: &P,
    budget: &RouteBudget,
) -> Result<(Vec<usize>, Geometry), RoutingError>
where
    P: TripProvider + ?Sized,
{
    if locations.len() > provider.max_trip_coordinates() {
        debug!(
            stops = locations.len(),
            limit = provider.max_trip_coordinates(),
            "too many stops for trip optimization, ordering locally"
        );
        let order = nearest_neighbor_order(locations);
        let ordered: Vec<(f64, f64)> = order.iter().map(|&index| locations[index]).collect();
        budget.remaining()?;
        let directions = provider.directions(&ordered, mode, budget)?;
        return Ok((order, directions.geometry));
    }

    budget.remaining()?;
    let trip = provider.optimized_trip(locations, mode, budget)?;
    let order = trip_order(&trip.waypoints, locations.len())?;
    Ok((order, trip.geometry))
}

/// Road geometry, distance and duration through `locations` in the given
/// order.
///
/// Unlike `build_route` this never reorders and never falls back: fewer than
/// two locations is a validation error and provider failures are returned.
/// Only the first `MAX_ROUTE_COORDINATES` locations are routed.
pub fn route_for_order<P>(
    locations: &[(f64, f64)],
    mode: TransportMode,
    provider: &P,
    budget: &RouteBudget,
) -> Result<Directions, RouteError>
where
    P: TripProvider + ?Sized,
{
    if locations.len() < 2 {
        return Err(ValidationError::TooFewCoordinates(locations.len()).into());
    }

    let routed = &locations[..locations.len().min(MAX_ROUTE_COORDINATES)];
    if routed.len() < locations.len() {
        debug!(
            requested = locations.len(),
            routed = routed.len(),
            "dropping coordinates past the route limit"
        );
    }

    budget.remaining()?;
    Ok(provider.directions(routed, mode, budget)?)
}

/// Visiting order from provider waypoints.
///
/// Waypoints are stably sorted by `trips_index`; each then names the input
/// stop at `waypoint_index`. The result must be a permutation of `0..count`.
pub fn trip_order(waypoints: &[TripWaypoint], count: usize) -> Result<Vec<usize>, RoutingError> {
    if waypoints.len() != count {
        return Err(RoutingError::WaypointMismatch);
    }

    let mut sorted = waypoints.to_vec();
    sorted.sort_by_key(|waypoint| waypoint.trips_index);

    let mut seen = vec![false; count];
    let mut order = Vec::with_capacity(count);
    for waypoint in sorted {
        let index = waypoint.waypoint_index;
        if index >= count || seen[index] {
            return Err(RoutingError::WaypointMismatch);
        }
        seen[index] = true;
        order.push(index);
    }

    Ok(order)
}

/// Greedy nearest-neighbor order starting from the first location.
///
/// Ties go to the earliest remaining location, so the order is fully
/// determined by the input order.
pub fn nearest_neighbor_order(locations: &[(f64, f64)]) -> Vec<usize> {
    if locations.len() <= 2 {
        return (0..locations.len()).collect();
    }

    let mut order = Vec::with_capacity(locations.len());
    let mut remaining: Vec<usize> = (1..locations.len()).collect();
    let mut current = 0;
    order.push(current);

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (position, &candidate) in remaining.iter().enumerate() {
            let distance = planar_distance(locations[current], locations[candidate]);
            if distance < best_distance {
                best_distance = distance;
                best = position;
            }
        }
        current = remaining.remove(best);
        order.push(current);
    }

    order
}
