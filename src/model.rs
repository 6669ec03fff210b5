//! Planner data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geometry::Geometry;
use crate::traits::Stop;

/// A geo-located point of interest.
///
/// `metadata` is opaque to the planner and travels with the point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Point {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl Stop for Point {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Cycling,
    Driving,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
            TransportMode::Driving => "driving",
        }
    }

    /// Provider profile for a free-form mode name.
    ///
    /// Known modes pass through; anything else routes as driving.
    pub fn profile_for(mode: &str) -> TransportMode {
        mode.parse().unwrap_or(TransportMode::Driving)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(TransportMode::Walking),
            "cycling" => Ok(TransportMode::Cycling),
            "driving" => Ok(TransportMode::Driving),
            other => Err(ValidationError::UnsupportedTransportMode(other.to_string())),
        }
    }
}

/// The visiting plan for one day. `point_ids` is in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRoute<Id> {
    pub day_number: u32,
    pub point_ids: Vec<Id>,
    pub geometry: Option<Geometry>,
    pub is_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary<Id> {
    /// Requested day count; `routes` may be shorter.
    pub days: u32,
    pub transport_mode: TransportMode,
    pub routes: Vec<DayRoute<Id>>,
}

impl<Id> Itinerary<Id> {
    pub fn fallback_count(&self) -> usize {
        self.routes.iter().filter(|route| route.is_fallback).count()
    }
}
