//! Itinerary generation: validate, cluster once, route every day.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::clustering::{cluster, Cluster, ClusterOptions};
use crate::error::{PlanError, ValidationError};
use crate::model::{DayRoute, Itinerary, TransportMode};
use crate::routing::{build_route, RouteBudget};
use crate::traits::{Stop, TripProvider};

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub cluster: ClusterOptions,
    /// Overall budget for all provider calls of one itinerary.
    pub deadline: Duration,
    /// Fixed seed for centroid selection. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            cluster: ClusterOptions::default(),
            deadline: Duration::from_secs(30),
            seed: None,
        }
    }
}

/// Shared flag for abandoning an in-flight generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn generate<S, P>(
    stops: &[S],
    days: u32,
    mode: TransportMode,
    provider: &P,
    options: &PlanOptions,
) -> Result<Itinerary<S::Id>, PlanError>
where
    S: Stop + Sync,
    S::Id: Send,
    P: TripProvider + ?Sized,
{
    generate_with_cancel(stops, days, mode, provider, options, &CancelToken::new())
}

/// Plans `days` days over `stops`.
///
/// Routes are numbered from 1 in cluster order and may be fewer than `days`
/// when there are fewer stops than days. Provider failures never surface
/// here; a cancelled token discards everything and returns `Cancelled`.
pub fn generate_with_cancel<S, P>(
    stops: &[S],
    days: u32,
    mode: TransportMode,
    provider: &P,
    options: &PlanOptions,
    cancel: &CancelToken,
) -> Result<Itinerary<S::Id>, PlanError>
where
    S: Stop + Sync,
    S::Id: Send,
    P: TripProvider + ?Sized,
{
    if days == 0 {
        return Err(ValidationError::InvalidDays(0).into());
    }
    if stops.is_empty() {
        return Err(ValidationError::NoLocatedPoints.into());
    }

    let mut rng = match options.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };
    let clusters = cluster(stops, days as usize, &options.cluster, &mut rng);

    if cancel.is_cancelled() {
        return Err(PlanError::Cancelled);
    }

    let budget = RouteBudget::new(options.deadline, cancel.clone());
    let routes = route_days(&clusters, mode, provider, &budget);

    if cancel.is_cancelled() {
        return Err(PlanError::Cancelled);
    }

    let itinerary = Itinerary {
        days,
        transport_mode: mode,
        routes,
    };
    info!(
        days,
        routes = itinerary.routes.len(),
        fallbacks = itinerary.fallback_count(),
        mode = %mode,
        "generated itinerary"
    );

    Ok(itinerary)
}

/// Routes every cluster concurrently, one worker per day.
fn route_days<S, P>(
    clusters: &[Cluster<'_, S>],
    mode: TransportMode,
    provider: &P,
    budget: &RouteBudget,
) -> Vec<DayRoute<S::Id>>
where
    S: Stop + Sync,
    S::Id: Send,
    P: TripProvider + ?Sized,
{
    if clusters.is_empty() {
        return Vec::new();
    }

    let run = || {
        clusters
            .par_iter()
            .enumerate()
            .map(|(index, day)| build_route(day.members(), index as u32 + 1, mode, provider, budget))
            .collect::<Vec<_>>()
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(clusters.len())
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(err) => {
            warn!(error = %err, "could not build routing pool, using the global pool");
            run()
        }
    }
}
