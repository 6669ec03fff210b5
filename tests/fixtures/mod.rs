//! Test fixtures for itinerary-planner.
//!
//! Provides:
//! - Real Barcelona landmark locations
//! - A scripted `TripProvider` for provider-path tests
//! - A one-shot local HTTP stub for the Mapbox adapter

#![allow(dead_code)]

pub mod barcelona_landmarks;
pub mod providers;
pub mod http_stub;

pub use barcelona_landmarks::*;
pub use providers::*;
