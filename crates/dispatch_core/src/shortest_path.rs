//! Single-source shortest paths over a [`RoadNetwork`].
//!
//! Two implementations of [`ShortestPathFinder`]:
//!
//! - **`Dijkstra`**: priority-queue search with lazy deletion. Stale queue entries are
//!   skipped when popped rather than decreased in place.
//! - **`CachedShortestPaths`**: LRU cache of distance maps keyed by source, wrapping any
//!   other finder. Valid because the network never changes after generation.

use std::cmp::Ordering;
use std::collections::hash_map;
use std::collections::{BinaryHeap, HashMap};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use log::debug;
use lru::LruCache;

use crate::network::{IntersectionId, RoadNetwork};

/// Shortest distance from one source to every intersection reachable from it.
/// Unreachable intersections are absent rather than infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMap {
    source: IntersectionId,
    distances: HashMap<IntersectionId, f64>,
}

impl DistanceMap {
    pub fn source(&self) -> IntersectionId {
        self.source
    }

    pub fn get(&self, node: IntersectionId) -> Option<f64> {
        self.distances.get(&node).copied()
    }

    pub fn contains(&self, node: IntersectionId) -> bool {
        self.distances.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, IntersectionId, f64> {
        self.distances.iter()
    }
}

/// Pluggable shortest-path backend. `Send + Sync` so it can live inside an ECS resource.
pub trait ShortestPathFinder: Send + Sync {
    fn shortest_distances(&self, network: &RoadNetwork, source: IntersectionId) -> DistanceMap;
}

/// Queue entry ordered so that `BinaryHeap` pops the smallest distance first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    distance: f64,
    node: IntersectionId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Dijkstra;

impl ShortestPathFinder for Dijkstra {
    fn shortest_distances(&self, network: &RoadNetwork, source: IntersectionId) -> DistanceMap {
        shortest_distances(network, source)
    }
}

/// Dijkstra from `source`. Every reachable node is finalized exactly once; the
/// queue may hold several entries for the same node.
pub fn shortest_distances(network: &RoadNetwork, source: IntersectionId) -> DistanceMap {
    let mut finalized: HashMap<IntersectionId, f64> = HashMap::new();
    let mut queue = BinaryHeap::new();
    queue.push(Frontier {
        distance: 0.0,
        node: source,
    });

    let mut popped = 0usize;
    while let Some(Frontier { distance, node }) = queue.pop() {
        popped += 1;
        if finalized.contains_key(&node) {
            continue;
        }
        finalized.insert(node, distance);

        for lane in network.lanes(node) {
            if !finalized.contains_key(&lane.target) {
                queue.push(Frontier {
                    distance: distance + lane.weight,
                    node: lane.target,
                });
            }
        }
    }

    debug!(
        "shortest paths from {source}: {} reached, {popped} queue pops",
        finalized.len()
    );

    DistanceMap {
        source,
        distances: finalized,
    }
}

/// LRU-cached wrapper around any [`ShortestPathFinder`].
///
/// The cache key is the source intersection alone, so one instance must only ever
/// be used with a single network.
pub struct CachedShortestPaths {
    inner: Box<dyn ShortestPathFinder>,
    cache: Mutex<LruCache<IntersectionId, DistanceMap>>,
}

impl CachedShortestPaths {
    pub fn new(inner: Box<dyn ShortestPathFinder>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_sources(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl ShortestPathFinder for CachedShortestPaths {
    fn shortest_distances(&self, network: &RoadNetwork, source: IntersectionId) -> DistanceMap {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&source) {
                return cached.clone();
            }
        }

        let distances = self.inner.shortest_distances(network, source);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(source, distances.clone());
        }

        distances
    }
}

/// Dijkstra, cached when `cache_capacity` is non-zero.
pub fn build_shortest_path_finder(cache_capacity: usize) -> Box<dyn ShortestPathFinder> {
    match NonZeroUsize::new(cache_capacity) {
        Some(capacity) => Box::new(CachedShortestPaths::new(Box::new(Dijkstra), capacity)),
        None => Box::new(Dijkstra),
    }
}
