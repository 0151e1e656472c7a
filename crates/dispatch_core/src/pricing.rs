//! Fare calculation: a flat fraction of the route distance.

use serde::{Deserialize, Serialize};

/// Distance units per currency unit.
pub const DEFAULT_FARE_DIVISOR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub fare_divisor: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fare_divisor: DEFAULT_FARE_DIVISOR,
        }
    }
}

impl PricingConfig {
    /// Formula: `fare = total_distance / fare_divisor`. The whole cab pays one fare.
    pub fn fare(&self, total_distance: f64) -> f64 {
        total_distance / self.fare_divisor
    }
}
