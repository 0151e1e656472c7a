use thiserror::Error;

use crate::fleet::CabId;
use crate::network::IntersectionId;

/// Why a ride request was refused before any cab was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    #[error("pickup and drop-off are both intersection {0}")]
    SameEndpoints(IntersectionId),
    #[error("destination chosen before a source")]
    DestinationBeforeSource,
    #[error("no destination chosen")]
    MissingDestination,
    #[error("intersection {0} is not on the road network")]
    UnknownIntersection(IntersectionId),
}

/// Errors surfaced by the dispatch engine.
///
/// Running out of cabs is not an error; see [`crate::dispatch::RideOutcome::NoCabAvailable`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("invalid ride request: {0}")]
    InvalidRequest(#[from] InvalidRequest),
    #[error("no path from intersection {from} to intersection {to}")]
    UnreachableDestination {
        from: IntersectionId,
        to: IntersectionId,
    },
    #[error("distance map is rooted at {actual}, expected {expected}")]
    MismatchedDistanceMap {
        expected: IntersectionId,
        actual: IntersectionId,
    },
    #[error("cab {0} is not currently booked")]
    CabNotBooked(CabId),
    #[error("no cab with id {0}")]
    UnknownCab(CabId),
}
