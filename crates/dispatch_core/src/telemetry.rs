//! Telemetry / KPIs: records completed rides and refused requests for analysis.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::fleet::CabId;
use crate::network::IntersectionId;

/// One completed ride, recorded when the cab is released.
/// Timestamps are simulation milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRideRecord {
    pub cab_id: CabId,
    pub passenger_count: usize,
    pub pickup: IntersectionId,
    pub dropoff: IntersectionId,
    pub route_len: usize,
    pub total_distance: f64,
    pub fare: f64,
    /// When the cab's first passenger was booked.
    pub booked_at: u64,
    /// When the cab was last re-routed (equal to `booked_at` for solo rides).
    pub dispatched_at: u64,
    pub completed_at: u64,
}

impl CompletedRideRecord {
    /// Time from first booking to drop-off of the last passenger.
    pub fn ride_duration(&self) -> u64 {
        self.completed_at.saturating_sub(self.booked_at)
    }
}

/// Collects simulation telemetry. Insert as a resource to record outcomes.
#[derive(Debug, Default, Resource, Serialize)]
pub struct RideTelemetry {
    pub completed_rides: Vec<CompletedRideRecord>,
    pub bookings: usize,
    pub shared_bookings: usize,
    pub no_cab_available: usize,
    pub rejected_requests: usize,
}

impl RideTelemetry {
    pub fn total_fares(&self) -> f64 {
        self.completed_rides.iter().map(|ride| ride.fare).sum()
    }

    pub fn passengers_delivered(&self) -> usize {
        self.completed_rides
            .iter()
            .map(|ride| ride.passenger_count)
            .sum()
    }

    pub fn summary(&self) -> TelemetrySummary {
        TelemetrySummary {
            completed_rides: self.completed_rides.len(),
            passengers_delivered: self.passengers_delivered(),
            bookings: self.bookings,
            shared_bookings: self.shared_bookings,
            no_cab_available: self.no_cab_available,
            rejected_requests: self.rejected_requests,
            total_fares: self.total_fares(),
        }
    }
}

/// Aggregated counts for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySummary {
    pub completed_rides: usize,
    pub passengers_delivered: usize,
    pub bookings: usize,
    pub shared_bookings: usize,
    pub no_cab_available: usize,
    pub rejected_requests: usize,
    pub total_fares: f64,
}
