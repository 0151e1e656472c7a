//! Fleet pool: a fixed set of two-seat cabs split between an idle queue and a
//! booked list.
//!
//! Cabs live in a `Vec` indexed by [`CabId`]; the two collections hold ids. Every
//! cab id is in exactly one of them at any time.

use std::collections::VecDeque;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::merge::Route;
use crate::network::{IntersectionId, RoadNetwork};
use crate::proximity::ProximityOracle;

/// Seats per cab.
pub const CAB_CAPACITY: usize = 2;

pub type CabId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub source: IntersectionId,
    pub destination: IntersectionId,
    pub share_ride: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cab {
    id: CabId,
    passengers: Vec<Passenger>,
    full: bool,
    route: Option<Route>,
    position: Option<IntersectionId>,
}

impl Cab {
    fn new(id: CabId) -> Self {
        Self {
            id,
            passengers: Vec::with_capacity(CAB_CAPACITY),
            full: false,
            route: None,
            position: None,
        }
    }

    pub fn id(&self) -> CabId {
        self.id
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Last known intersection of the cab; `None` until first dispatched.
    pub fn position(&self) -> Option<IntersectionId> {
        self.position
    }

    /// Replace the current route wholesale.
    pub fn set_route(&mut self, route: Route) {
        self.route = Some(route);
    }

    pub fn set_position(&mut self, position: IntersectionId) {
        self.position = Some(position);
    }

    fn add_passenger(&mut self, passenger: Passenger) -> bool {
        if self.full {
            return false;
        }
        self.passengers.push(passenger);
        self.full = self.passengers.len() == CAB_CAPACITY;
        true
    }

    /// Open to a second, sharing passenger.
    fn accepts_sharer(&self) -> bool {
        !self.full && matches!(self.passengers.as_slice(), [only] if only.share_ride)
    }

    fn clear(&mut self) {
        self.passengers.clear();
        self.full = false;
        self.route = None;
    }
}

#[derive(Debug, Clone)]
pub struct FleetPool {
    cabs: Vec<Cab>,
    available: VecDeque<CabId>,
    booked: Vec<CabId>,
}

impl FleetPool {
    /// `size` empty cabs, all available, ids `0..size`.
    pub fn new(size: usize) -> Self {
        Self {
            cabs: (0..size).map(Cab::new).collect(),
            available: (0..size).collect(),
            booked: Vec::with_capacity(size),
        }
    }

    /// Assign `passenger` to a cab.
    ///
    /// A non-sharing passenger gets the longest-idle cab. A sharing passenger first
    /// joins the earliest-booked cab that has a free seat, a sole passenger who also
    /// shares, and a position `oracle` accepts as within reach of the pickup; failing
    /// that they get a fresh cab like anyone else.
    ///
    /// Returns `None` when a fresh cab is needed and none is idle.
    pub fn book(
        &mut self,
        passenger: Passenger,
        network: &RoadNetwork,
        oracle: &dyn ProximityOracle,
    ) -> Option<CabId> {
        if passenger.share_ride {
            if let Some(cab_id) = self.find_shared_cab(passenger.source, network, oracle) {
                self.cabs[cab_id].add_passenger(passenger);
                info!("cab {cab_id} picks up a sharing passenger at {}", passenger.source);
                return Some(cab_id);
            }
        }
        self.allocate(passenger)
    }

    fn find_shared_cab(
        &self,
        pickup: IntersectionId,
        network: &RoadNetwork,
        oracle: &dyn ProximityOracle,
    ) -> Option<CabId> {
        self.booked.iter().copied().find(|&cab_id| {
            let cab = &self.cabs[cab_id];
            cab.accepts_sharer()
                && cab
                    .position
                    .is_some_and(|position| oracle.is_within_reach(network, position, pickup))
        })
    }

    fn allocate(&mut self, passenger: Passenger) -> Option<CabId> {
        let Some(cab_id) = self.available.pop_front() else {
            debug!("no idle cab for pickup at {}", passenger.source);
            return None;
        };
        let cab = &mut self.cabs[cab_id];
        cab.add_passenger(passenger);
        cab.position = Some(passenger.source);
        self.booked.push(cab_id);
        info!("cab {cab_id} booked for pickup at {}", passenger.source);
        Some(cab_id)
    }

    /// Drop everyone off and return the cab to the back of the idle queue.
    ///
    /// Returns the cab as it was before clearing, so callers can read its final
    /// route and passengers.
    pub fn release(&mut self, cab_id: CabId) -> Result<Cab, DispatchError> {
        let slot = self.booked_slot(cab_id)?;
        self.booked.remove(slot);
        let cab = &mut self.cabs[cab_id];
        let snapshot = cab.clone();
        cab.clear();
        self.available.push_back(cab_id);
        info!("cab {cab_id} released");
        Ok(snapshot)
    }

    /// Undo the most recent [`FleetPool::book`] on `cab_id`.
    ///
    /// Removes the newest passenger. A cab left empty goes back to the *front* of the
    /// idle queue, where it was taken from.
    pub fn revert_booking(&mut self, cab_id: CabId) -> Result<Passenger, DispatchError> {
        let slot = self.booked_slot(cab_id)?;
        let cab = &mut self.cabs[cab_id];
        let passenger = cab
            .passengers
            .pop()
            .ok_or(DispatchError::CabNotBooked(cab_id))?;
        cab.full = false;
        if cab.passengers.is_empty() {
            cab.clear();
            self.booked.remove(slot);
            self.available.push_front(cab_id);
        }
        debug!("reverted booking on cab {cab_id}");
        Ok(passenger)
    }

    fn booked_slot(&self, cab_id: CabId) -> Result<usize, DispatchError> {
        if cab_id >= self.cabs.len() {
            return Err(DispatchError::UnknownCab(cab_id));
        }
        self.booked
            .iter()
            .position(|&id| id == cab_id)
            .ok_or(DispatchError::CabNotBooked(cab_id))
    }

    pub fn cab(&self, cab_id: CabId) -> Option<&Cab> {
        self.cabs.get(cab_id)
    }

    pub fn cab_mut(&mut self, cab_id: CabId) -> Option<&mut Cab> {
        self.cabs.get_mut(cab_id)
    }

    pub fn is_booked(&self, cab_id: CabId) -> bool {
        self.booked.contains(&cab_id)
    }

    pub fn size(&self) -> usize {
        self.cabs.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Booked cab ids in booking order.
    pub fn booked(&self) -> &[CabId] {
        &self.booked
    }

    /// Idle cab ids, longest idle first.
    pub fn available(&self) -> impl Iterator<Item = CabId> + '_ {
        self.available.iter().copied()
    }
}
