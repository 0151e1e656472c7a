//! "Close enough to share" checks used by ride-share matching.
//!
//! The matching rule asks whether a booked cab is near a new passenger's pickup.
//! What "near" means is injected through [`ProximityOracle`], selectable via
//! [`ProximityKind`]:
//!
//! - **`ScreenProximity`**: straight-line distance on the reference map layout.
//! - **`TravelDistanceProximity`**: shortest-path distance over the road network.
//! - **`FnProximity`**: any closure, for hosts that track live cab positions themselves.

use serde::{Deserialize, Serialize};

use crate::network::{IntersectionId, ReferenceLayout, RoadNetwork};
use crate::shortest_path::shortest_distances;

/// Screen-space radius used by the reference layout.
pub const DEFAULT_SCREEN_THRESHOLD: f64 = 250.0;

pub trait ProximityOracle: Send + Sync {
    /// Whether a cab at `cab_position` may pick up a passenger waiting at `pickup`.
    fn is_within_reach(
        &self,
        network: &RoadNetwork,
        cab_position: IntersectionId,
        pickup: IntersectionId,
    ) -> bool;
}

/// Within `threshold` layout units. Intersections without a layout position are
/// never within reach.
#[derive(Debug, Clone)]
pub struct ScreenProximity {
    layout: ReferenceLayout,
    threshold: f64,
}

impl ScreenProximity {
    pub fn new(layout: ReferenceLayout, threshold: f64) -> Self {
        Self { layout, threshold }
    }
}

impl Default for ScreenProximity {
    fn default() -> Self {
        Self::new(ReferenceLayout::new(), DEFAULT_SCREEN_THRESHOLD)
    }
}

impl ProximityOracle for ScreenProximity {
    fn is_within_reach(
        &self,
        _network: &RoadNetwork,
        cab_position: IntersectionId,
        pickup: IntersectionId,
    ) -> bool {
        self.layout
            .distance(cab_position, pickup)
            .is_some_and(|distance| distance <= self.threshold)
    }
}

/// Within `threshold` units of travel along the road network.
#[derive(Debug, Clone, Copy)]
pub struct TravelDistanceProximity {
    pub threshold: f64,
}

impl ProximityOracle for TravelDistanceProximity {
    fn is_within_reach(
        &self,
        network: &RoadNetwork,
        cab_position: IntersectionId,
        pickup: IntersectionId,
    ) -> bool {
        shortest_distances(network, cab_position)
            .get(pickup)
            .is_some_and(|distance| distance <= self.threshold)
    }
}

/// Adapts a closure over `(cab_position, pickup)`.
pub struct FnProximity<F>(pub F);

impl<F> ProximityOracle for FnProximity<F>
where
    F: Fn(IntersectionId, IntersectionId) -> bool + Send + Sync,
{
    fn is_within_reach(
        &self,
        _network: &RoadNetwork,
        cab_position: IntersectionId,
        pickup: IntersectionId,
    ) -> bool {
        (self.0)(cab_position, pickup)
    }
}

/// Which proximity rule to use. Stored in [`crate::config::DispatchConfig`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ProximityKind {
    /// Straight-line distance on the reference layout.
    Screen { threshold: f64 },
    /// Shortest-path distance on the road network.
    TravelDistance { threshold: f64 },
    /// Every booked sharing cab qualifies.
    Anywhere,
}

impl Default for ProximityKind {
    fn default() -> Self {
        ProximityKind::Screen {
            threshold: DEFAULT_SCREEN_THRESHOLD,
        }
    }
}

pub fn build_proximity_oracle(kind: &ProximityKind) -> Box<dyn ProximityOracle> {
    match kind {
        ProximityKind::Screen { threshold } => {
            Box::new(ScreenProximity::new(ReferenceLayout::new(), *threshold))
        }
        ProximityKind::TravelDistance { threshold } => Box::new(TravelDistanceProximity {
            threshold: *threshold,
        }),
        ProximityKind::Anywhere => Box::new(FnProximity(|_, _| true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::line_network;

    #[test]
    fn screen_proximity_uses_layout_radius() {
        let network = RoadNetwork::reference_seeded(Some(1));
        let oracle = ScreenProximity::default();
        // 1 and 2 are two column gaps (~182 units) apart on the top street.
        assert!(oracle.is_within_reach(&network, 1, 2));
        // 1 and 40 sit at opposite corners of the map.
        assert!(!oracle.is_within_reach(&network, 1, 40));
    }

    #[test]
    fn screen_proximity_rejects_unplaced_intersections() {
        let network = line_network();
        let oracle = ScreenProximity::default();
        assert!(!oracle.is_within_reach(&network, 1, 100));
    }

    #[test]
    fn travel_distance_proximity_follows_lanes() {
        let network = line_network();
        let oracle = TravelDistanceProximity { threshold: 3.0 };
        assert!(oracle.is_within_reach(&network, 1, 3));
        assert!(!oracle.is_within_reach(&network, 1, 4));
        assert!(!oracle.is_within_reach(&network, 1, 42));
    }

    #[test]
    fn closures_and_kinds_build_oracles() {
        let network = line_network();
        let only_same = FnProximity(|a, b| a == b);
        assert!(only_same.is_within_reach(&network, 2, 2));
        assert!(!only_same.is_within_reach(&network, 2, 3));

        let anywhere = build_proximity_oracle(&ProximityKind::Anywhere);
        assert!(anywhere.is_within_reach(&network, 1, 5));
        let travel = build_proximity_oracle(&ProximityKind::TravelDistance { threshold: 1.0 });
        assert!(!travel.is_within_reach(&network, 1, 5));
    }
}
