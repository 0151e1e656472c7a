use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::merge::DistanceAccounting;
use crate::pricing::PricingConfig;
use crate::proximity::ProximityKind;

/// Cabs in the reference fleet.
const DEFAULT_FLEET_SIZE: usize = 5;

/// Distance maps kept by the shortest-path cache (0 disables caching).
const DEFAULT_DISTANCE_CACHE_CAPACITY: usize = 64;

/// Everything the dispatcher needs besides the road network.
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub fleet_size: usize,
    /// Lane weights are drawn from `min_lane_weight..=max_lane_weight`.
    pub min_lane_weight: u32,
    pub max_lane_weight: u32,
    /// Seed for network generation (for reproducibility). `None` draws from entropy.
    pub seed: Option<u64>,
    pub proximity: ProximityKind,
    pub distance_accounting: DistanceAccounting,
    pub distance_cache_capacity: usize,
    pub pricing: PricingConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fleet_size: DEFAULT_FLEET_SIZE,
            min_lane_weight: 1,
            max_lane_weight: 10,
            seed: None,
            proximity: ProximityKind::default(),
            distance_accounting: DistanceAccounting::default(),
            distance_cache_capacity: DEFAULT_DISTANCE_CACHE_CAPACITY,
            pricing: PricingConfig::default(),
        }
    }
}

impl DispatchConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fleet_size(mut self, fleet_size: usize) -> Self {
        self.fleet_size = fleet_size;
        self
    }

    pub fn with_proximity(mut self, proximity: ProximityKind) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn with_distance_accounting(mut self, accounting: DistanceAccounting) -> Self {
        self.distance_accounting = accounting;
        self
    }

    /// Inclusive lane weight range; an inverted range collapses to its minimum.
    pub fn lane_weights(&self) -> RangeInclusive<u32> {
        let min = self.min_lane_weight.max(1);
        min..=self.max_lane_weight.max(min)
    }
}
