//! itinerary-planner core
//!
//! Splits a set of geo-located stops into day groups and orders each day
//! into a visiting route.

pub mod traits;
pub mod error;
pub mod model;
pub mod geometry;
pub mod location;
pub mod clustering;
pub mod routing;
pub mod mapbox;
pub mod planner;
pub mod request;
