use bevy_ecs::prelude::{Res, ResMut};
use log::{debug, warn};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::dispatch::Dispatcher;
use crate::scenario::ActiveRides;
use crate::telemetry::{CompletedRideRecord, RideTelemetry};

pub fn ride_completed_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut dispatcher: ResMut<Dispatcher>,
    mut active: ResMut<ActiveRides>,
    mut telemetry: ResMut<RideTelemetry>,
) {
    if event.0.kind != EventKind::RideCompleted {
        return;
    }
    let Some(EventSubject::Cab(cab_id)) = event.0.subject else {
        return;
    };

    let now = clock.now();
    let Some(ride) = active.0.get(&cab_id).copied() else {
        return;
    };
    if ride.due_at != now {
        debug!("cab {cab_id}: completion at {now}ms superseded by re-route");
        return;
    }
    active.0.remove(&cab_id);

    let receipt = match dispatcher.complete_ride(cab_id) {
        Ok(receipt) => receipt,
        Err(err) => {
            warn!("cab {cab_id} could not be released: {err}");
            return;
        }
    };

    let pickup = receipt
        .passengers
        .first()
        .map(|passenger| passenger.source)
        .or_else(|| receipt.route.nodes.first().copied())
        .unwrap_or_default();
    let dropoff = receipt.route.nodes.last().copied().unwrap_or(pickup);

    telemetry.completed_rides.push(CompletedRideRecord {
        cab_id,
        passenger_count: receipt.passenger_count(),
        pickup,
        dropoff,
        route_len: receipt.route.nodes.len(),
        total_distance: receipt.total_distance,
        fare: receipt.fare,
        booked_at: ride.booked_at,
        dispatched_at: ride.dispatched_at,
        completed_at: now,
    });
}
