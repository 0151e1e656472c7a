use bevy_ecs::prelude::{Res, ResMut};
use log::warn;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::dispatch::{Dispatcher, RideOutcome};
use crate::scenario::{ActiveRide, ActiveRides, PendingRequests, TravelPace};
use crate::telemetry::RideTelemetry;

pub fn ride_requested_system(
    event: Res<CurrentEvent>,
    pending: Res<PendingRequests>,
    pace: Res<TravelPace>,
    mut clock: ResMut<SimulationClock>,
    mut dispatcher: ResMut<Dispatcher>,
    mut active: ResMut<ActiveRides>,
    mut telemetry: ResMut<RideTelemetry>,
) {
    if event.0.kind != EventKind::RideRequested {
        return;
    }
    let Some(EventSubject::Request(index)) = event.0.subject else {
        return;
    };
    let Some(scripted) = pending.0.get(index) else {
        return;
    };

    let now = clock.now();
    refresh_cab_positions(&mut dispatcher, &active, now);

    match dispatcher.request_ride(scripted.request()) {
        Ok(RideOutcome::Booked {
            cab_id,
            total_distance,
            passenger_count,
            ..
        }) => {
            telemetry.bookings += 1;
            if passenger_count > 1 {
                telemetry.shared_bookings += 1;
            }
            let booked_at = active
                .0
                .get(&cab_id)
                .map(|ride| ride.booked_at)
                .unwrap_or(now);
            let due_at = now + pace.duration_ms(total_distance);
            active.0.insert(
                cab_id,
                ActiveRide {
                    booked_at,
                    dispatched_at: now,
                    due_at,
                },
            );
            clock.schedule_at(
                due_at,
                EventKind::RideCompleted,
                Some(EventSubject::Cab(cab_id)),
            );
        }
        Ok(RideOutcome::NoCabAvailable) => {
            telemetry.no_cab_available += 1;
        }
        Err(err) => {
            warn!("request {index} at {now}ms refused: {err}");
            telemetry.rejected_requests += 1;
        }
    }
}

/// Move every cab in service to the intersection it has reached along its route.
/// The driven length is spread evenly between dispatch and the scheduled completion.
fn refresh_cab_positions(dispatcher: &mut Dispatcher, active: &ActiveRides, now: u64) {
    let updates: Vec<_> = active
        .0
        .iter()
        .filter_map(|(&cab_id, ride)| {
            let route = dispatcher.pool().cab(cab_id)?.route()?;
            let position = route.position_at_fraction(dispatcher.network(), ride.progress(now))?;
            Some((cab_id, position))
        })
        .collect();

    for (cab_id, position) in updates {
        if let Err(err) = dispatcher.update_cab_position(cab_id, position) {
            warn!("could not move cab {cab_id}: {err}");
        }
    }
}
