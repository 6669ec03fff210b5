//! Scripted routing providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use itinerary_planner::error::RoutingError;
use itinerary_planner::geometry::Geometry;
use itinerary_planner::model::TransportMode;
use itinerary_planner::routing::RouteBudget;
use itinerary_planner::traits::{Directions, Trip, TripProvider, TripWaypoint};

/// How the scripted provider answers trip requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Visit the stops in reverse input order.
    Reverse,
    /// Answer with an empty trip list.
    NoTrips,
    /// Fail as if the network were down.
    Down,
}

/// Provider answering from a script, optionally after a delay.
///
/// A delay longer than what is left of the budget behaves like a client
/// timeout: the call blocks until the deadline and then fails.
pub struct ScriptedProvider {
    pub script: Script,
    pub delay: Duration,
    pub max_trip_coordinates: usize,
    pub modes: std::sync::Mutex<Vec<TransportMode>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            max_trip_coordinates: 12,
            modes: std::sync::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn wait(&self, budget: &RouteBudget) -> Result<(), RoutingError> {
        if self.delay.is_zero() {
            return Ok(());
        }
        let timeout = budget.remaining()?;
        std::thread::sleep(self.delay.min(timeout));
        if self.delay > timeout {
            return Err(RoutingError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// Waypoints in input order whose `trips_index` places input `order[pos]`
/// at position `pos`.
pub fn waypoints_for(order: &[usize]) -> Vec<TripWaypoint> {
    let mut waypoints: Vec<TripWaypoint> = (0..order.len())
        .map(|index| TripWaypoint {
            waypoint_index: index,
            trips_index: 0,
        })
        .collect();
    for (position, &index) in order.iter().enumerate() {
        waypoints[index].trips_index = position;
    }
    waypoints
}

impl TripProvider for ScriptedProvider {
    fn max_trip_coordinates(&self) -> usize {
        self.max_trip_coordinates
    }

    fn optimized_trip(
        &self,
        locations: &[(f64, f64)],
        mode: TransportMode,
        budget: &RouteBudget,
    ) -> Result<Trip, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().unwrap().push(mode);
        self.wait(budget)?;

        match self.script {
            Script::Reverse => {
                let order: Vec<usize> = (0..locations.len()).rev().collect();
                let ordered: Vec<(f64, f64)> = order.iter().map(|&i| locations[i]).collect();
                Ok(Trip {
                    geometry: Geometry::line_through(&ordered),
                    waypoints: waypoints_for(&order),
                })
            }
            Script::NoTrips => Err(RoutingError::NoTrip),
            Script::Down => Err(RoutingError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }

    fn directions(
        &self,
        locations: &[(f64, f64)],
        mode: TransportMode,
        budget: &RouteBudget,
    ) -> Result<Directions, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().unwrap().push(mode);
        self.wait(budget)?;

        match self.script {
            Script::Reverse => Ok(Directions {
                geometry: Geometry::line_through(locations),
                distance: 100.0 * (locations.len() - 1) as f64,
                duration: 60.0 * (locations.len() - 1) as f64,
            }),
            Script::NoTrips => Err(RoutingError::NoTrip),
            Script::Down => Err(RoutingError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }
}
