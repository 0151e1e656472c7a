//! Scenario setup: a dispatcher plus a timeline of scripted ride requests.
//!
//! Requests become `RideRequested` events at their timestamps. Completions are
//! scheduled by the systems once a cab has a route, `ms_per_distance_unit` per unit of
//! route distance after dispatch.

use std::collections::HashMap;

use bevy_ecs::prelude::{Resource, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::config::DispatchConfig;
use crate::dispatch::{initialize_network, Dispatcher, RideRequest};
use crate::fleet::CabId;
use crate::network::{IntersectionId, RoadNetwork};
use crate::telemetry::RideTelemetry;

/// Half a second of driving per distance unit.
const DEFAULT_MS_PER_DISTANCE_UNIT: u64 = 500;

/// Default window over which random requests are spread: 10 minutes.
const DEFAULT_REQUEST_WINDOW_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedRequest {
    pub at_ms: u64,
    pub source: IntersectionId,
    pub destination: IntersectionId,
    #[serde(default)]
    pub share_ride: bool,
}

impl ScriptedRequest {
    pub fn request(&self) -> RideRequest {
        RideRequest::new(self.source, self.destination, self.share_ride)
    }
}

/// Parameters for building a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub config: DispatchConfig,
    pub requests: Vec<ScriptedRequest>,
    pub ms_per_distance_unit: u64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            config: DispatchConfig::default(),
            requests: Vec::new(),
            ms_per_distance_unit: DEFAULT_MS_PER_DISTANCE_UNIT,
        }
    }
}

impl ScenarioParams {
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_request(mut self, request: ScriptedRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// `count` requests between random distinct reference intersections, spread
    /// uniformly over the default window; each shares with `share_probability`,
    /// clamped to `0..=1`. A NaN probability means nobody shares.
    pub fn random(count: usize, share_probability: f64, seed: u64) -> Self {
        let share_probability = if share_probability.is_nan() {
            0.0
        } else {
            share_probability.clamp(0.0, 1.0)
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut requests: Vec<ScriptedRequest> = (0..count)
            .map(|_| {
                let source = rng.gen_range(1..=40);
                let mut destination = rng.gen_range(1..=40);
                while destination == source {
                    destination = rng.gen_range(1..=40);
                }
                ScriptedRequest {
                    at_ms: rng.gen_range(0..DEFAULT_REQUEST_WINDOW_MS),
                    source,
                    destination,
                    share_ride: rng.gen_bool(share_probability),
                }
            })
            .collect();
        requests.sort_by_key(|request| request.at_ms);

        Self {
            config: DispatchConfig::default().with_seed(seed),
            requests,
            ..Default::default()
        }
    }
}

/// Scripted requests by index; events refer to them through [`EventSubject::Request`].
#[derive(Debug, Clone, Default, Resource)]
pub struct PendingRequests(pub Vec<ScriptedRequest>);

/// Driving pace used to schedule completions and advance cab positions.
#[derive(Debug, Clone, Copy, Resource)]
pub struct TravelPace {
    pub ms_per_distance_unit: u64,
}

impl TravelPace {
    pub fn duration_ms(&self, distance: f64) -> u64 {
        (distance.max(0.0) * self.ms_per_distance_unit as f64).round() as u64
    }
}

/// Timing of a cab currently in service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRide {
    pub booked_at: u64,
    pub dispatched_at: u64,
    /// The only completion time that still counts; earlier events were superseded
    /// by a re-route.
    pub due_at: u64,
}

impl ActiveRide {
    /// Share of the ride elapsed at `now`, in `0..=1`.
    pub fn progress(&self, now: u64) -> f64 {
        let total = self.due_at.saturating_sub(self.dispatched_at);
        if total == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.dispatched_at).min(total);
        elapsed as f64 / total as f64
    }
}

#[derive(Debug, Clone, Default, Resource)]
pub struct ActiveRides(pub HashMap<CabId, ActiveRide>);

/// Insert every resource the simulation needs and schedule the scripted requests.
pub fn build_scenario(world: &mut World, params: ScenarioParams) {
    let network = initialize_network(&params.config);
    build_scenario_on(world, params, network);
}

/// Like [`build_scenario`], over a caller-supplied network instead of the
/// generated reference grid.
pub fn build_scenario_on(world: &mut World, params: ScenarioParams, network: RoadNetwork) {
    let mut clock = SimulationClock::default();
    for (index, request) in params.requests.iter().enumerate() {
        clock.schedule_at(
            request.at_ms,
            EventKind::RideRequested,
            Some(EventSubject::Request(index)),
        );
    }

    world.insert_resource(Dispatcher::new(network, params.config));
    world.insert_resource(clock);
    world.insert_resource(PendingRequests(params.requests));
    world.insert_resource(TravelPace {
        ms_per_distance_unit: params.ms_per_distance_unit,
    });
    world.insert_resource(ActiveRides::default());
    world.insert_resource(RideTelemetry::default());
}
