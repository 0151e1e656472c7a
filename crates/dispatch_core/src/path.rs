//! Rebuild an explicit node sequence from a [`DistanceMap`].

use crate::error::DispatchError;
use crate::network::{IntersectionId, RoadNetwork};
use crate::shortest_path::DistanceMap;

/// Shortest path from `source` to `destination`, read off `distances`.
///
/// Walks backward from `destination`, at each step moving to any neighbour `p` with
/// `distance[p] == distance[current] - weight(current, p)`. Comparison is exact;
/// with integral lane weights the accumulated distances are exact too.
///
/// # Errors
///
/// - [`DispatchError::MismatchedDistanceMap`] if `distances` is not rooted at `source`.
/// - [`DispatchError::UnreachableDestination`] if `destination` is not in the map, or no
///   predecessor satisfies the equality, or the walk runs longer than the map has nodes.
pub fn reconstruct(
    network: &RoadNetwork,
    source: IntersectionId,
    destination: IntersectionId,
    distances: &DistanceMap,
) -> Result<Vec<IntersectionId>, DispatchError> {
    if distances.source() != source {
        return Err(DispatchError::MismatchedDistanceMap {
            expected: source,
            actual: distances.source(),
        });
    }
    let unreachable = || DispatchError::UnreachableDestination {
        from: source,
        to: destination,
    };

    let mut current = destination;
    let mut current_distance = distances.get(destination).ok_or_else(unreachable)?;
    let mut reversed = vec![destination];

    while current != source {
        if reversed.len() > distances.len() {
            return Err(unreachable());
        }
        let predecessor = network
            .lanes(current)
            .iter()
            .find(|lane| distances.get(lane.target) == Some(current_distance - lane.weight))
            .ok_or_else(unreachable)?;
        current = predecessor.target;
        current_distance -= predecessor.weight;
        reversed.push(current);
    }

    reversed.reverse();
    Ok(reversed)
}
