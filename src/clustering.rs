//! Day grouping: planar k-means followed by a greedy balancing pass.
//!
//! Stops are held in one slice and clusters are lists of indices into it,
//! so a stop can only ever belong to one group.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::geometry::{centroid, planar_distance};
use crate::traits::Stop;

#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Hard cap on k-means iterations.
    pub max_iterations: usize,
    /// k-means stops once no centroid moves further than this.
    pub convergence_epsilon: f64,
    /// Balanced clusters hold at least `floor(n / k * ratio)` stops.
    pub balance_floor_ratio: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_epsilon: 1e-6,
            balance_floor_ratio: 0.7,
        }
    }
}

/// One day's group of stops. Never empty.
#[derive(Debug, Clone)]
pub struct Cluster<'a, S> {
    members: Vec<&'a S>,
}

impl<'a, S: Stop> Cluster<'a, S> {
    pub fn members(&self) -> &[&'a S] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> Vec<S::Id> {
        self.members.iter().map(|stop| stop.id().clone()).collect()
    }

    pub fn locations(&self) -> Vec<(f64, f64)> {
        self.members.iter().map(|stop| stop.location()).collect()
    }
}

/// Partitions `stops` into at most `k` non-empty groups.
///
/// With `stops.len() <= k` every stop gets its own group. Otherwise k-means
/// runs from `k` randomly drawn seeds and, when there are at least two stops
/// per group, the result is rebalanced. Group order depends on `rng`.
pub fn cluster<'a, S, R>(
    stops: &'a [S],
    k: usize,
    options: &ClusterOptions,
    rng: &mut R,
) -> Vec<Cluster<'a, S>>
where
    S: Stop,
    R: Rng + ?Sized,
{
    if stops.is_empty() || k == 0 {
        return Vec::new();
    }

    if stops.len() <= k {
        return stops
            .iter()
            .map(|stop| Cluster { members: vec![stop] })
            .collect();
    }

    let locations: Vec<(f64, f64)> = stops.iter().map(Stop::location).collect();
    let seeds = seed_centroids(&locations, k, rng);
    let (assignments, centroids) = kmeans(&locations, seeds, options);

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (index, &group) in assignments.iter().enumerate() {
        groups[group].push(index);
    }

    if locations.len() >= 2 * k {
        balance(&locations, &mut groups, &centroids, options.balance_floor_ratio);
    }

    groups
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|group| Cluster {
            members: group.into_iter().map(|index| &stops[index]).collect(),
        })
        .collect()
}

/// Picks `k` distinct input positions as starting centroids.
///
/// Gives up after `2 * n` draws; any centroids still missing sit on the
/// first stop.
fn seed_centroids<R: Rng + ?Sized>(
    locations: &[(f64, f64)],
    k: usize,
    rng: &mut R,
) -> Vec<(f64, f64)> {
    let mut picked = HashSet::with_capacity(k);
    let mut centroids = Vec::with_capacity(k);
    let mut attempts = 0;

    while centroids.len() < k && attempts < locations.len() * 2 {
        let index = rng.gen_range(0..locations.len());
        if picked.insert(index) {
            centroids.push(locations[index]);
        }
        attempts += 1;
    }

    while centroids.len() < k {
        centroids.push(locations[0]);
    }

    centroids
}

/// Lloyd iterations. Returns each location's group and the final centroids.
///
/// A centroid that loses all of its stops keeps its last position.
fn kmeans(
    locations: &[(f64, f64)],
    mut centroids: Vec<(f64, f64)>,
    options: &ClusterOptions,
) -> (Vec<usize>, Vec<(f64, f64)>) {
    let mut assignments = vec![0; locations.len()];

    for iteration in 0..options.max_iterations {
        for (location, assignment) in locations.iter().zip(assignments.iter_mut()) {
            *assignment = nearest(*location, &centroids);
        }

        let mut converged = true;
        for (group, centre) in centroids.iter_mut().enumerate() {
            let members = locations
                .iter()
                .zip(&assignments)
                .filter(|(_, assigned)| **assigned == group)
                .map(|(location, _)| *location);

            if let Some(next) = centroid(members) {
                if planar_distance(*centre, next) > options.convergence_epsilon {
                    converged = false;
                }
                *centre = next;
            }
        }

        if converged {
            debug!(k = centroids.len(), iterations = iteration + 1, "k-means converged");
            break;
        }
    }

    (assignments, centroids)
}

/// Index of the closest centroid; ties go to the lower index.
fn nearest(location: (f64, f64), centroids: &[(f64, f64)]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centre) in centroids.iter().enumerate() {
        let distance = planar_distance(location, *centre);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

/// Greedily moves stops from the largest group into the smallest.
///
/// Each move takes the stop of the largest group closest to the smallest
/// group's centroid. Only the receiving group's cohesion is considered, so a
/// donor group can end up spread out; that trade-off is accepted.
/// An empty group uses its last k-means centroid as its target.
fn balance(
    locations: &[(f64, f64)],
    groups: &mut [Vec<usize>],
    centroids: &[(f64, f64)],
    floor_ratio: f64,
) {
    let total = locations.len();
    let ideal = total as f64 / groups.len() as f64;
    let min_size = ((ideal * floor_ratio).floor() as usize).max(1);

    for _ in 0..total {
        let Some(smallest) = (0..groups.len()).min_by_key(|&group| groups[group].len()) else {
            return;
        };
        // max_by_key keeps the last maximum, rev() makes it the first.
        let Some(largest) = (0..groups.len()).rev().max_by_key(|&group| groups[group].len()) else {
            return;
        };

        if groups[smallest].len() >= min_size
            || groups[largest].len() <= min_size + 1
            || smallest == largest
        {
            return;
        }

        let target = centroid(groups[smallest].iter().map(|&index| locations[index]))
            .unwrap_or(centroids[smallest]);

        let Some(position) = closest_member(&groups[largest], locations, target) else {
            return;
        };
        let moved = groups[largest].remove(position);
        groups[smallest].push(moved);
        debug!(from = largest, to = smallest, stop = moved, "rebalanced stop");
    }
}

fn closest_member(group: &[usize], locations: &[(f64, f64)], target: (f64, f64)) -> Option<usize> {
    group
        .iter()
        .enumerate()
        .map(|(position, &index)| (position, planar_distance(locations[index], target)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(position, _)| position)
}
