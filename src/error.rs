//! Error taxonomy.
//!
//! Only `PlanError` leaves the planner. Routing failures are recovered
//! inside the route builder and never reach the caller. `RouteError` is
//! what `route_for_order` returns, where they do.

use thiserror::Error;

/// Rejected request parameters. No clustering work has happened yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("day count must be a positive integer, got {0}")]
    InvalidDays(i64),
    #[error("unsupported transport mode: {0:?}")]
    UnsupportedTransportMode(String),
    #[error("no points with a valid location to plan")]
    NoLocatedPoints,
    #[error("a route needs at least 2 coordinates, got {0}")]
    TooFewCoordinates(usize),
}

/// A failed call to the routing provider.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing credential missing")]
    MissingCredential,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no optimized trip found")]
    NoTrip,
    #[error("waypoints do not match the requested stops")]
    WaypointMismatch,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("planning cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("itinerary generation cancelled")]
    Cancelled,
}

/// Failure to route a fixed-order day.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}
