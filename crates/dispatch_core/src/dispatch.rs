//! Dispatch facade: the single entry point a presentation layer calls.
//!
//! A request is validated against the network, a cab is booked from the pool, and
//! the cab's route is merged from a shortest-path search rooted at the new pickup.
//! If routing fails after a cab was booked, the booking is reverted so the pool is
//! left untouched.

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, InvalidRequest};
use crate::fleet::{CabId, FleetPool, Passenger};
use crate::merge::{Route, RouteMerger};
use crate::network::{topology, IntersectionId, RoadNetwork};
use crate::pricing::PricingConfig;
use crate::proximity::{build_proximity_oracle, ProximityOracle};
use crate::shortest_path::{build_shortest_path_finder, ShortestPathFinder};

/// Reference network generated with the configured seed and lane weights.
pub fn initialize_network(config: &DispatchConfig) -> RoadNetwork {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    RoadNetwork::generate(
        &topology::reference_segments(),
        config.lane_weights(),
        &mut rng,
    )
}

/// A complete ride request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRequest {
    pub source: IntersectionId,
    pub destination: IntersectionId,
    pub share_ride: bool,
}

impl RideRequest {
    pub fn new(source: IntersectionId, destination: IntersectionId, share_ride: bool) -> Self {
        Self {
            source,
            destination,
            share_ride,
        }
    }

    fn passenger(&self) -> Passenger {
        Passenger {
            source: self.source,
            destination: self.destination,
            share_ride: self.share_ride,
        }
    }
}

/// A request whose endpoints may still be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RideRequestDraft {
    pub source: Option<IntersectionId>,
    pub destination: Option<IntersectionId>,
    pub share_ride: bool,
}

impl RideRequestDraft {
    pub fn finish(self) -> Result<RideRequest, InvalidRequest> {
        match (self.source, self.destination) {
            (Some(source), Some(destination)) => {
                Ok(RideRequest::new(source, destination, self.share_ride))
            }
            (None, _) => Err(InvalidRequest::DestinationBeforeSource),
            (Some(_), None) => Err(InvalidRequest::MissingDestination),
        }
    }
}

impl TryFrom<RideRequestDraft> for RideRequest {
    type Error = DispatchError;

    fn try_from(draft: RideRequestDraft) -> Result<Self, Self::Error> {
        Ok(draft.finish()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RideOutcome {
    Booked {
        cab_id: CabId,
        route: Vec<IntersectionId>,
        total_distance: f64,
        passenger_count: usize,
    },
    /// Every cab is busy; try again once one is released.
    NoCabAvailable,
}

/// Summary of a finished ride, produced when the cab is released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideReceipt {
    pub cab_id: CabId,
    pub passengers: Vec<Passenger>,
    pub route: Route,
    pub total_distance: f64,
    pub fare: f64,
}

impl RideReceipt {
    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }
}

#[derive(Resource)]
pub struct Dispatcher {
    network: RoadNetwork,
    pool: FleetPool,
    finder: Box<dyn ShortestPathFinder>,
    proximity: Box<dyn ProximityOracle>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Dispatcher over `network` with the finder and proximity rule from `config`.
    pub fn new(network: RoadNetwork, config: DispatchConfig) -> Self {
        let finder = build_shortest_path_finder(config.distance_cache_capacity);
        let proximity = build_proximity_oracle(&config.proximity);
        Self::with_parts(network, config, finder, proximity)
    }

    /// Dispatcher with explicitly supplied collaborators.
    pub fn with_parts(
        network: RoadNetwork,
        config: DispatchConfig,
        finder: Box<dyn ShortestPathFinder>,
        proximity: Box<dyn ProximityOracle>,
    ) -> Self {
        Self {
            pool: FleetPool::new(config.fleet_size),
            network,
            finder,
            proximity,
            config,
        }
    }

    /// Generate the reference network from `config` and dispatch over it.
    pub fn from_config(config: DispatchConfig) -> Self {
        let network = initialize_network(&config);
        Self::new(network, config)
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn pool(&self) -> &FleetPool {
        &self.pool
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn pricing(&self) -> PricingConfig {
        self.config.pricing
    }

    pub fn finder(&self) -> &dyn ShortestPathFinder {
        self.finder.as_ref()
    }

    /// Book a cab for `request` and route it.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::InvalidRequest`] for identical or unknown endpoints; the pool
    ///   is not consulted.
    /// - [`DispatchError::UnreachableDestination`] if any leg cannot be routed; the
    ///   booking is reverted.
    pub fn request_ride(&mut self, request: RideRequest) -> Result<RideOutcome, DispatchError> {
        if let Err(reason) = self.validate(&request) {
            warn!("rejected ride request {request:?}: {reason}");
            return Err(reason.into());
        }

        let Some(cab_id) =
            self.pool
                .book(request.passenger(), &self.network, self.proximity.as_ref())
        else {
            info!(
                "no cab available for {} -> {}",
                request.source, request.destination
            );
            return Ok(RideOutcome::NoCabAvailable);
        };

        let distances = self.finder.shortest_distances(&self.network, request.source);
        let merged = match self.pool.cab(cab_id) {
            Some(cab) => RouteMerger::new(
                &self.network,
                self.finder.as_ref(),
                self.config.distance_accounting,
            )
            .merge(cab, &distances),
            None => Err(DispatchError::UnknownCab(cab_id)),
        };

        let route = match merged {
            Ok(route) => route,
            Err(err) => {
                warn!("routing failed for cab {cab_id}: {err}");
                self.pool.revert_booking(cab_id)?;
                return Err(err);
            }
        };

        let cab = self
            .pool
            .cab_mut(cab_id)
            .ok_or(DispatchError::UnknownCab(cab_id))?;
        let outcome = RideOutcome::Booked {
            cab_id,
            route: route.nodes.clone(),
            total_distance: route.total_distance,
            passenger_count: cab.passengers().len(),
        };
        if let Some(&start) = route.nodes.first() {
            cab.set_position(start);
        }
        cab.set_route(route);
        info!("dispatched cab {cab_id}: {outcome:?}");
        Ok(outcome)
    }

    /// The cab finished driving its route: release it and price the ride.
    pub fn complete_ride(&mut self, cab_id: CabId) -> Result<RideReceipt, DispatchError> {
        let cab = self.pool.release(cab_id)?;
        let route = cab.route().cloned().unwrap_or_default();
        let total_distance = route.total_distance;
        let receipt = RideReceipt {
            cab_id,
            passengers: cab.passengers().to_vec(),
            fare: self.config.pricing.fare(total_distance),
            total_distance,
            route,
        };
        info!(
            "cab {cab_id} completed: fare {:.2} for {} passenger(s)",
            receipt.fare,
            receipt.passenger_count()
        );
        Ok(receipt)
    }

    /// Record where a booked cab currently is, for later proximity checks.
    pub fn update_cab_position(
        &mut self,
        cab_id: CabId,
        position: IntersectionId,
    ) -> Result<(), DispatchError> {
        if !self.pool.is_booked(cab_id) {
            return Err(DispatchError::CabNotBooked(cab_id));
        }
        self.pool
            .cab_mut(cab_id)
            .ok_or(DispatchError::UnknownCab(cab_id))?
            .set_position(position);
        Ok(())
    }

    fn validate(&self, request: &RideRequest) -> Result<(), InvalidRequest> {
        for node in [request.source, request.destination] {
            if !self.network.contains(node) {
                return Err(InvalidRequest::UnknownIntersection(node));
            }
        }
        if request.source == request.destination {
            return Err(InvalidRequest::SameEndpoints(request.source));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::DistanceAccounting;
    use crate::proximity::ProximityKind;
    use crate::test_helpers::line_network;

    fn line_dispatcher(fleet_size: usize) -> Dispatcher {
        let config = DispatchConfig::default()
            .with_fleet_size(fleet_size)
            .with_proximity(ProximityKind::Anywhere);
        Dispatcher::new(line_network(), config)
    }

    #[test]
    fn invalid_requests_leave_pool_untouched() {
        let mut dispatcher = line_dispatcher(1);
        assert_eq!(
            dispatcher.request_ride(RideRequest::new(3, 3, false)),
            Err(DispatchError::InvalidRequest(InvalidRequest::SameEndpoints(3)))
        );
        assert_eq!(
            dispatcher.request_ride(RideRequest::new(1, 77, false)),
            Err(DispatchError::InvalidRequest(
                InvalidRequest::UnknownIntersection(77)
            ))
        );
        assert_eq!(dispatcher.pool().available_count(), 1);
    }

    #[test]
    fn drafts_require_source_before_destination() {
        let early = RideRequestDraft {
            source: None,
            destination: Some(4),
            share_ride: false,
        };
        assert_eq!(
            RideRequest::try_from(early),
            Err(DispatchError::InvalidRequest(
                InvalidRequest::DestinationBeforeSource
            ))
        );
        let half = RideRequestDraft {
            source: Some(1),
            ..Default::default()
        };
        assert_eq!(half.finish(), Err(InvalidRequest::MissingDestination));
    }

    #[test]
    fn unreachable_destination_reverts_booking() {
        let network = RoadNetwork::from_lanes(&[(1, 2, 1.0), (8, 9, 1.0)]);
        let mut dispatcher = Dispatcher::new(network, DispatchConfig::default().with_fleet_size(1));
        assert_eq!(
            dispatcher.request_ride(RideRequest::new(1, 9, false)),
            Err(DispatchError::UnreachableDestination { from: 1, to: 9 })
        );
        assert_eq!(dispatcher.pool().available_count(), 1);
        assert!(dispatcher.pool().booked().is_empty());
    }

    #[test]
    fn completion_prices_and_frees_the_cab() {
        let mut dispatcher = line_dispatcher(1);
        let outcome = dispatcher
            .request_ride(RideRequest::new(1, 5, false))
            .expect("booked");
        assert!(matches!(outcome, RideOutcome::Booked { cab_id: 0, .. }));
        assert_eq!(
            dispatcher.request_ride(RideRequest::new(2, 3, false)),
            Ok(RideOutcome::NoCabAvailable)
        );

        let receipt = dispatcher.complete_ride(0).expect("receipt");
        assert_eq!(receipt.total_distance, 13.0);
        assert_eq!(receipt.fare, 1.3);
        assert_eq!(receipt.passenger_count(), 1);
        assert_eq!(dispatcher.pool().available_count(), 1);
        assert_eq!(
            dispatcher.complete_ride(0),
            Err(DispatchError::CabNotBooked(0))
        );
    }

    #[test]
    fn edge_weight_accounting_reports_path_length() {
        let config = DispatchConfig::default()
            .with_distance_accounting(DistanceAccounting::EdgeWeightSum);
        let mut dispatcher = Dispatcher::new(line_network(), config);
        let outcome = dispatcher
            .request_ride(RideRequest::new(5, 1, false))
            .expect("booked");
        match outcome {
            RideOutcome::Booked {
                route,
                total_distance,
                ..
            } => {
                assert_eq!(route, vec![5, 4, 3, 2, 1]);
                assert_eq!(total_distance, 5.0);
            }
            RideOutcome::NoCabAvailable => panic!("expected a booking"),
        }
    }

    #[test]
    fn position_updates_only_apply_to_booked_cabs() {
        let mut dispatcher = line_dispatcher(2);
        dispatcher
            .request_ride(RideRequest::new(1, 5, true))
            .expect("booked");
        dispatcher.update_cab_position(0, 3).expect("booked cab");
        assert_eq!(dispatcher.pool().cab(0).and_then(|c| c.position()), Some(3));
        assert_eq!(
            dispatcher.update_cab_position(1, 3),
            Err(DispatchError::CabNotBooked(1))
        );
    }

    #[test]
    fn joining_sharer_moves_cab_to_the_new_pickup() {
        let mut dispatcher = line_dispatcher(2);
        dispatcher
            .request_ride(RideRequest::new(1, 5, true))
            .expect("booked");
        dispatcher.update_cab_position(0, 3).expect("booked cab");

        let outcome = dispatcher
            .request_ride(RideRequest::new(2, 4, true))
            .expect("booked");
        match outcome {
            RideOutcome::Booked {
                cab_id,
                route,
                passenger_count,
                ..
            } => {
                assert_eq!((cab_id, passenger_count), (0, 2));
                assert_eq!(route.first(), Some(&2));
            }
            RideOutcome::NoCabAvailable => panic!("expected the sharer to join cab 0"),
        }
        assert_eq!(dispatcher.pool().cab(0).and_then(|c| c.position()), Some(2));
    }

    #[test]
    fn seeded_initialization_is_reproducible() {
        let config = DispatchConfig::default().with_seed(11);
        let a = initialize_network(&config);
        let b = initialize_network(&config);
        assert_eq!(a.intersection_count(), 40);
        assert_eq!(
            a.iter_lanes().map(|(f, l)| (f, *l)).collect::<Vec<_>>(),
            b.iter_lanes().map(|(f, l)| (f, *l)).collect::<Vec<_>>()
        );
    }
}
