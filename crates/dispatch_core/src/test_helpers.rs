//! Small road networks shared by unit and integration tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::network::{IntersectionId, RoadNetwork};

/// 1 -1- 2 -2- 3 -1- 4 -1- 5
pub fn line_network() -> RoadNetwork {
    RoadNetwork::from_lanes(&[(1, 2, 1.0), (2, 3, 2.0), (3, 4, 1.0), (4, 5, 1.0)])
}

/// Two equal-cost ways from 1 to 4, through 2 or through 3.
pub fn diamond_network() -> RoadNetwork {
    RoadNetwork::from_lanes(&[(1, 2, 1.0), (1, 3, 1.0), (2, 4, 1.0), (3, 4, 1.0)])
}

/// Street list of a random network with intersections `1..=nodes`, whole-number
/// weights in `1..=10`, and `extra_streets` random streets on top of a spanning chain.
pub fn random_streets(
    nodes: IntersectionId,
    extra_streets: usize,
    seed: u64,
) -> Vec<(IntersectionId, IntersectionId, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut streets: Vec<_> = (2..=nodes)
        .map(|node| {
            let parent = rng.gen_range(1..node);
            (parent, node, f64::from(rng.gen_range(1..=10u32)))
        })
        .collect();
    for _ in 0..extra_streets {
        let a = rng.gen_range(1..=nodes);
        let b = rng.gen_range(1..=nodes);
        if a != b {
            streets.push((a, b, f64::from(rng.gen_range(1..=10u32))));
        }
    }
    streets
}

pub fn random_network(nodes: IntersectionId, extra_streets: usize, seed: u64) -> RoadNetwork {
    RoadNetwork::from_lanes(&random_streets(nodes, extra_streets, seed))
}
