//! Route merging: the final route and distance for a cab's passenger manifest.
//!
//! One passenger is a single shortest path. For two passengers (the first already
//! aboard, the second just matched) the cab drives from the first pickup to the
//! second, then drops off whichever destination is cheaper to reach from the
//! second pickup, then the other. Only those two drop-off orders are considered,
//! and the trailing leg always gets a fresh shortest-path search.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::fleet::{Cab, Passenger};
use crate::network::{IntersectionId, RoadNetwork};
use crate::path::reconstruct;
use crate::shortest_path::{DistanceMap, ShortestPathFinder};

/// How a leg's distance is accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceAccounting {
    /// Sum, over every node of the leg, of its distance from the root of the search
    /// the leg was read from. Overstates multi-hop legs; kept for fare compatibility.
    #[default]
    CumulativeNodeSum,
    /// Sum of lane weights along the leg.
    EdgeWeightSum,
}

impl DistanceAccounting {
    /// Distance of `nodes`, a path read off `distances`.
    pub fn leg_distance(self, nodes: &[IntersectionId], distances: &DistanceMap) -> f64 {
        let at = |node| distances.get(node).unwrap_or(0.0);
        match self {
            DistanceAccounting::CumulativeNodeSum => nodes.iter().map(|&node| at(node)).sum(),
            DistanceAccounting::EdgeWeightSum => nodes
                .windows(2)
                .map(|pair| (at(pair[1]) - at(pair[0])).abs())
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: IntersectionId,
    pub to: IntersectionId,
    pub nodes: Vec<IntersectionId>,
    pub distance: f64,
}

/// Path a cab actually drives, with the legs it was assembled from.
///
/// For a shared ride the first leg is the approach from the earlier pickup to the
/// joining one. It counts toward `total_distance` and stays in `legs`, but the cab is
/// already past it, so `nodes` starts at the joining pickup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub nodes: Vec<IntersectionId>,
    pub total_distance: f64,
    pub legs: Vec<RouteLeg>,
}

impl Route {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a leg. A leg starting where the route ends does not repeat that node.
    fn push_leg(&mut self, leg: RouteLeg) {
        let skip = usize::from(self.nodes.last() == leg.nodes.first() && !self.nodes.is_empty());
        self.nodes.extend_from_slice(&leg.nodes[skip..]);
        self.total_distance += leg.distance;
        self.legs.push(leg);
    }

    /// Count a leg the cab has already driven: distance only, no nodes.
    fn push_approach(&mut self, leg: RouteLeg) {
        self.total_distance += leg.distance;
        self.legs.push(leg);
    }

    /// Lane-weight length of `nodes`, whatever accounting produced `total_distance`.
    pub fn driven_length(&self, network: &RoadNetwork) -> f64 {
        self.nodes
            .windows(2)
            .map(|pair| network.lane_weight(pair[0], pair[1]).unwrap_or(0.0))
            .sum()
    }

    /// Intersection reached after covering `fraction` (clamped to `0..=1`) of the
    /// driven length.
    pub fn position_at_fraction(
        &self,
        network: &RoadNetwork,
        fraction: f64,
    ) -> Option<IntersectionId> {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.position_after(network, fraction * self.driven_length(network))
    }

    /// Intersection reached after driving `travelled` units of lane weight from the
    /// start. Stops at the last node.
    pub fn position_after(&self, network: &RoadNetwork, travelled: f64) -> Option<IntersectionId> {
        let mut remaining = travelled;
        let mut position = *self.nodes.first()?;
        for pair in self.nodes.windows(2) {
            let weight = network.lane_weight(pair[0], pair[1]).unwrap_or(0.0);
            if remaining < weight {
                break;
            }
            remaining -= weight;
            position = pair[1];
        }
        Some(position)
    }
}

pub struct RouteMerger<'a> {
    network: &'a RoadNetwork,
    finder: &'a dyn ShortestPathFinder,
    accounting: DistanceAccounting,
}

impl<'a> RouteMerger<'a> {
    pub fn new(
        network: &'a RoadNetwork,
        finder: &'a dyn ShortestPathFinder,
        accounting: DistanceAccounting,
    ) -> Self {
        Self {
            network,
            finder,
            accounting,
        }
    }

    /// Route for `cab`'s current passengers.
    ///
    /// `distances` must be rooted at the newest passenger's pickup. Cabs with no
    /// passengers get an empty route.
    pub fn merge(&self, cab: &Cab, distances: &DistanceMap) -> Result<Route, DispatchError> {
        match cab.passengers() {
            [only] => self.solo(only, distances),
            [first, second] => self.shared(first, second, distances),
            _ => Ok(Route::empty()),
        }
    }

    fn solo(&self, passenger: &Passenger, distances: &DistanceMap) -> Result<Route, DispatchError> {
        let mut route = Route::empty();
        route.push_leg(self.leg(passenger.source, passenger.destination, distances)?);
        Ok(route)
    }

    fn shared(
        &self,
        aboard: &Passenger,
        joining: &Passenger,
        distances: &DistanceMap,
    ) -> Result<Route, DispatchError> {
        let detour = self.leg_towards_root(aboard.source, distances)?;
        let to_aboard_drop = self.leg(joining.source, aboard.destination, distances)?;
        let to_joining_drop = self.leg(joining.source, joining.destination, distances)?;

        let (next, last_from, last_to) = if to_aboard_drop.distance < to_joining_drop.distance {
            (to_aboard_drop, aboard.destination, joining.destination)
        } else {
            (to_joining_drop, joining.destination, aboard.destination)
        };

        let trailing = self.finder.shortest_distances(self.network, last_from);
        let last = self.leg(last_from, last_to, &trailing)?;

        let mut route = Route::empty();
        route.push_approach(detour);
        route.push_leg(next);
        route.push_leg(last);
        Ok(route)
    }

    fn leg(
        &self,
        from: IntersectionId,
        to: IntersectionId,
        distances: &DistanceMap,
    ) -> Result<RouteLeg, DispatchError> {
        let nodes = reconstruct(self.network, from, to, distances)?;
        let distance = self.accounting.leg_distance(&nodes, distances);
        Ok(RouteLeg {
            from,
            to,
            nodes,
            distance,
        })
    }

    /// Leg from `from` to the root of `distances`, read backward off the same map.
    fn leg_towards_root(
        &self,
        from: IntersectionId,
        distances: &DistanceMap,
    ) -> Result<RouteLeg, DispatchError> {
        let root = distances.source();
        let mut leg = self.leg(root, from, distances).map_err(|_| {
            DispatchError::UnreachableDestination {
                from,
                to: root,
            }
        })?;
        leg.nodes.reverse();
        leg.from = from;
        leg.to = root;
        Ok(leg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::FleetPool;
    use crate::proximity::FnProximity;
    use crate::shortest_path::{shortest_distances, Dijkstra};
    use crate::test_helpers::{diamond_network, line_network};

    fn booked_cab(network: &RoadNetwork, riders: &[Passenger]) -> Cab {
        let mut pool = FleetPool::new(1);
        let anywhere = FnProximity(|_, _| true);
        for rider in riders {
            pool.book(*rider, network, &anywhere).expect("cab");
        }
        pool.cab(0).expect("cab").clone()
    }

    fn rider(source: IntersectionId, destination: IntersectionId) -> Passenger {
        Passenger {
            source,
            destination,
            share_ride: true,
        }
    }

    #[test]
    fn solo_route_sums_node_distances_by_default() {
        let network = line_network();
        let cab = booked_cab(&network, &[rider(1, 5)]);
        let distances = shortest_distances(&network, 1);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::default());

        let route = merger.merge(&cab, &distances).expect("route");
        assert_eq!(route.nodes, vec![1, 2, 3, 4, 5]);
        // 0 + 1 + 3 + 4 + 5
        assert_eq!(route.total_distance, 13.0);
    }

    #[test]
    fn solo_route_with_edge_weights_is_path_length() {
        let network = line_network();
        let cab = booked_cab(&network, &[rider(1, 5)]);
        let distances = shortest_distances(&network, 1);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::EdgeWeightSum);

        let route = merger.merge(&cab, &distances).expect("route");
        assert_eq!(route.nodes, vec![1, 2, 3, 4, 5]);
        assert_eq!(route.total_distance, 5.0);
    }

    #[test]
    fn empty_cab_merges_to_empty_route() {
        let network = line_network();
        let cab = booked_cab(&network, &[]);
        let distances = shortest_distances(&network, 1);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::default());
        assert_eq!(merger.merge(&cab, &distances), Ok(Route::empty()));
    }

    #[test]
    fn tie_drops_joining_passenger_first() {
        // Diamond: from 1, intersections 2 and 3 are both one unit away.
        let network = diamond_network();
        let cab = booked_cab(&network, &[rider(4, 2), rider(1, 3)]);
        let distances = shortest_distances(&network, 1);

        for accounting in [
            DistanceAccounting::CumulativeNodeSum,
            DistanceAccounting::EdgeWeightSum,
        ] {
            let merger = RouteMerger::new(&network, &Dijkstra, accounting);
            let route = merger.merge(&cab, &distances).expect("route");
            assert_eq!(route.legs.len(), 3);
            assert_eq!((route.legs[0].from, route.legs[0].to), (4, 1));
            assert_eq!((route.legs[1].from, route.legs[1].to), (1, 3));
            assert_eq!((route.legs[2].from, route.legs[2].to), (3, 2));
            assert_eq!(route.nodes.first(), Some(&1));
            assert_eq!(route.nodes.last(), Some(&2));
        }
    }

    #[test]
    fn cheaper_first_drop_off_goes_first() {
        let network = line_network();
        // Aboard: 1 -> 3. Joining at 2 heading to 5. Dropping at 3 is cheaper.
        let cab = booked_cab(&network, &[rider(1, 3), rider(2, 5)]);
        let distances = shortest_distances(&network, 2);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::EdgeWeightSum);

        let route = merger.merge(&cab, &distances).expect("route");
        assert_eq!(route.legs[1].to, 3);
        assert_eq!(route.legs[2].to, 5);
        assert_eq!(route.nodes, vec![2, 3, 4, 5]);
        // 1 (detour) + 2 (to 3) + 2 (3 to 5)
        assert_eq!(route.total_distance, 5.0);
    }

    #[test]
    fn shared_cumulative_total_sums_each_leg_against_its_own_search() {
        let network = line_network();
        // Aboard: 1 -> 5. Joining at 2 heading to 4.
        let cab = booked_cab(&network, &[rider(1, 5), rider(2, 4)]);
        let distances = shortest_distances(&network, 2);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::CumulativeNodeSum);

        let route = merger.merge(&cab, &distances).expect("route");
        assert_eq!(route.nodes, vec![2, 3, 4, 5]);
        // detour [1,2]: 1 + 0; to 4 [2,3,4]: 0 + 2 + 3; then [4,5] from 4: 0 + 1.
        assert_eq!(route.total_distance, 7.0);
        let legs: f64 = route.legs.iter().map(|leg| leg.distance).sum();
        assert_eq!(legs, route.total_distance);
    }

    #[test]
    fn shared_route_is_driven_from_the_joining_pickup() {
        let network = line_network();
        let cab = booked_cab(&network, &[rider(1, 5), rider(2, 4)]);
        let distances = shortest_distances(&network, 2);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::EdgeWeightSum);

        let route = merger.merge(&cab, &distances).expect("route");
        assert_eq!(route.legs[0].nodes, vec![1, 2]);
        assert_eq!(route.nodes.first(), Some(&2));
        assert_eq!(route.position_after(&network, 0.0), Some(2));
        // The approach is billed but not driven again.
        assert_eq!(route.total_distance, 5.0);
        assert_eq!(route.driven_length(&network), 4.0);
    }

    #[test]
    fn fraction_spreads_position_over_driven_length() {
        let network = line_network();
        let route = Route {
            nodes: vec![1, 2, 3, 4, 5],
            total_distance: 13.0,
            legs: Vec::new(),
        };
        assert_eq!(route.driven_length(&network), 5.0);
        assert_eq!(route.position_at_fraction(&network, 0.0), Some(1));
        assert_eq!(route.position_at_fraction(&network, 0.5), Some(2));
        assert_eq!(route.position_at_fraction(&network, 0.8), Some(4));
        assert_eq!(route.position_at_fraction(&network, 1.0), Some(5));
        assert_eq!(route.position_at_fraction(&network, 7.0), Some(5));
        assert_eq!(route.position_at_fraction(&network, f64::NAN), Some(1));
    }

    #[test]
    fn unreachable_drop_off_fails_merge() {
        let network = RoadNetwork::from_lanes(&[(1, 2, 1.0), (8, 9, 1.0)]);
        let cab = booked_cab(&network, &[rider(1, 9)]);
        let distances = shortest_distances(&network, 1);
        let merger = RouteMerger::new(&network, &Dijkstra, DistanceAccounting::default());
        assert_eq!(
            merger.merge(&cab, &distances),
            Err(DispatchError::UnreachableDestination { from: 1, to: 9 })
        );
    }

    #[test]
    fn position_after_walks_lane_weights() {
        let network = line_network();
        let route = Route {
            nodes: vec![1, 2, 3, 4, 5],
            total_distance: 5.0,
            legs: Vec::new(),
        };
        assert_eq!(route.position_after(&network, 0.0), Some(1));
        assert_eq!(route.position_after(&network, 2.5), Some(2));
        assert_eq!(route.position_after(&network, 3.0), Some(3));
        assert_eq!(route.position_after(&network, 50.0), Some(5));
        assert_eq!(Route::empty().position_after(&network, 1.0), None);
    }
}
