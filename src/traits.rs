//! Core domain traits for the itinerary planner.
//!
//! These are intentionally minimal. Apps that keep their own records can
//! implement `Stop` for them instead of converting into `model::Point`.

use std::hash::Hash;

use serde::Serialize;

use crate::error::RoutingError;
use crate::geometry::Geometry;
use crate::model::TransportMode;
use crate::routing::RouteBudget;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A stop is a single place to be visited on some day.
pub trait Stop {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Location coordinates (lat, lng).
    fn location(&self) -> (f64, f64);
}

/// An optimized trip as returned by a routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub geometry: Geometry,
    pub waypoints: Vec<TripWaypoint>,
}

/// Maps an input coordinate to its place in the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripWaypoint {
    pub waypoint_index: usize,
    pub trips_index: usize,
}

/// Road geometry through fixed-order locations, with totals for the path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directions {
    pub geometry: Geometry,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

/// External routing service.
///
/// Locations are (lat, lng) in visiting order. Every request an
/// implementation sends must fit in what is left of `budget`, checked
/// again before each request.
pub trait TripProvider: Sync {
    /// Largest coordinate count accepted by `optimized_trip`.
    fn max_trip_coordinates(&self) -> usize;

    fn optimized_trip(
        &self,
        locations: &[(f64, f64)],
        mode: TransportMode,
        budget: &RouteBudget,
    ) -> Result<Trip, RoutingError>;

    /// Road geometry through `locations` in the given order.
    fn directions(
        &self,
        locations: &[(f64, f64)],
        mode: TransportMode,
        budget: &RouteBudget,
    ) -> Result<Directions, RoutingError>;
}
