//! Street network: intersections joined by weighted, two-way lanes.
//!
//! The network is generated once from a list of street segments. Each segment gets
//! one weight drawn uniformly from an inclusive integer range and is stored as a
//! pair of mirrored [`Lane`]s, so the adjacency is a symmetric weighted graph.
//! Nothing mutates a [`RoadNetwork`] after construction.

pub mod topology;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use topology::ReferenceLayout;

/// Identifier of an intersection (graph node).
pub type IntersectionId = u32;

/// Default inclusive range for randomly drawn lane weights.
pub const DEFAULT_LANE_WEIGHTS: RangeInclusive<u32> = 1..=10;

/// One directed half of a street segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub target: IntersectionId,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Resource)]
pub struct RoadNetwork {
    adjacency: BTreeMap<IntersectionId, Vec<Lane>>,
}

impl RoadNetwork {
    /// Build the network from undirected `segments`, drawing one weight per segment
    /// from `weights`.
    ///
    /// Segments are not de-duplicated: listing the same street twice yields two
    /// parallel lane pairs.
    pub fn generate<R: Rng + ?Sized>(
        segments: &[(IntersectionId, IntersectionId)],
        weights: RangeInclusive<u32>,
        rng: &mut R,
    ) -> Self {
        let mut network = Self::default();
        for &(a, b) in segments {
            let weight = f64::from(rng.gen_range(weights.clone()));
            network.insert_street(a, b, weight);
        }
        network
    }

    /// Reference 40-intersection grid with weights in [`DEFAULT_LANE_WEIGHTS`].
    pub fn reference<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::generate(&topology::reference_segments(), DEFAULT_LANE_WEIGHTS, rng)
    }

    /// Reference grid from a seeded RNG, or from entropy when `seed` is `None`.
    pub fn reference_seeded(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::reference(&mut rng)
    }

    /// Build from explicit `(a, b, weight)` streets. Used for hand-made test graphs.
    pub fn from_lanes(streets: &[(IntersectionId, IntersectionId, f64)]) -> Self {
        let mut network = Self::default();
        for &(a, b, weight) in streets {
            network.insert_street(a, b, weight);
        }
        network
    }

    fn insert_street(&mut self, a: IntersectionId, b: IntersectionId, weight: f64) {
        debug_assert!(weight > 0.0, "lane weights must be positive");
        self.adjacency
            .entry(a)
            .or_default()
            .push(Lane { target: b, weight });
        self.adjacency
            .entry(b)
            .or_default()
            .push(Lane { target: a, weight });
    }

    /// Outgoing lanes of `node`; empty for unknown intersections.
    pub fn lanes(&self, node: IntersectionId) -> &[Lane] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every intersection with at least one lane, in ascending id order.
    pub fn intersections(&self) -> impl Iterator<Item = IntersectionId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn contains(&self, node: IntersectionId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Weight of the lightest lane from `from` to `to`, if they are adjacent.
    pub fn lane_weight(&self, from: IntersectionId, to: IntersectionId) -> Option<f64> {
        self.lanes(from)
            .iter()
            .filter(|lane| lane.target == to)
            .map(|lane| lane.weight)
            .min_by(f64::total_cmp)
    }

    pub fn intersection_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed lanes (twice the number of streets).
    pub fn lane_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// All directed lanes as `(from, lane)` pairs.
    pub fn iter_lanes(&self) -> impl Iterator<Item = (IntersectionId, &Lane)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(&from, lanes)| lanes.iter().map(move |lane| (from, lane)))
    }
}
