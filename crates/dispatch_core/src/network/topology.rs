//! The reference street grid: 40 intersections on 8 horizontal and 10 vertical streets.

use std::collections::{HashMap, HashSet};

use crate::network::IntersectionId;

/// Window the reference layout is drawn into.
pub const LAYOUT_WIDTH: f64 = 1000.0;
pub const LAYOUT_HEIGHT: f64 = 700.0;

/// Intersections along each horizontal street, top to bottom.
pub const HORIZONTAL_STREETS: [&[IntersectionId]; 8] = [
    &[1, 2, 3, 4, 5],
    &[6, 7, 8],
    &[9, 10, 11, 12],
    &[13, 14, 15, 16, 17, 18],
    &[19, 20, 21],
    &[26, 27, 28, 29, 30],
    &[22, 23, 24, 25],
    &[31, 32, 33, 34, 35, 36, 37, 38, 39, 40],
];

/// Intersections along each vertical street, left to right.
pub const VERTICAL_STREETS: [&[IntersectionId]; 10] = [
    &[1, 19, 31],
    &[20, 32],
    &[2, 21, 22, 33],
    &[3, 6, 9, 13, 23, 34],
    &[14, 24, 35],
    &[4, 7, 10, 15, 26, 25, 36],
    &[16, 27, 37],
    &[11, 17, 28, 38],
    &[29, 39],
    &[5, 8, 12, 18, 30, 40],
];

/// Street connections as listed per intersection. Most segments appear once from
/// each end; [`reference_segments`] collapses them.
const CONNECTIONS: &[(IntersectionId, IntersectionId)] = &[
    (1, 2), (1, 19),
    (2, 3), (2, 21),
    (3, 4), (3, 6),
    (4, 5), (4, 7),
    (5, 4), (5, 8),
    (6, 3), (6, 7), (6, 9),
    (7, 4), (7, 6), (7, 8), (7, 10),
    (8, 5), (8, 7), (8, 12),
    (9, 6), (9, 10), (9, 13),
    (10, 7), (10, 9), (10, 11), (10, 15),
    (11, 10), (11, 12), (11, 17),
    (12, 11), (12, 8), (12, 18),
    (13, 9), (13, 14), (13, 23),
    (14, 13), (14, 15), (14, 24),
    (15, 10), (15, 14), (15, 16), (15, 26),
    (16, 15), (16, 17), (16, 27),
    (17, 11), (17, 16), (17, 18), (17, 28),
    (18, 12), (18, 17), (18, 30),
    (19, 1), (19, 20), (19, 31),
    (20, 19), (20, 21), (20, 32),
    (21, 2), (21, 20), (21, 22),
    (22, 21), (22, 23), (22, 33),
    (23, 13), (23, 22), (23, 24), (23, 34),
    (24, 14), (24, 23), (24, 25), (24, 35),
    (25, 24), (25, 26), (25, 36),
    (26, 15), (26, 25), (26, 27),
    (27, 16), (27, 26), (27, 28), (27, 37),
    (28, 17), (28, 27), (28, 29), (28, 38),
    (29, 28), (29, 30), (29, 39),
    (30, 18), (30, 29), (30, 40),
    (31, 19), (31, 32),
    (32, 20), (32, 31), (32, 33),
    (33, 22), (33, 32), (33, 34),
    (34, 23), (34, 33), (34, 35),
    (35, 24), (35, 34), (35, 36),
    (36, 25), (36, 35), (36, 37),
    (37, 27), (37, 36), (37, 38),
    (38, 28), (38, 37), (38, 39),
    (39, 29), (39, 38), (39, 40),
    (40, 30), (40, 39),
];

/// Unique undirected street segments of the reference grid, in first-seen order.
pub fn reference_segments() -> Vec<(IntersectionId, IntersectionId)> {
    let mut seen = HashSet::with_capacity(CONNECTIONS.len());
    CONNECTIONS
        .iter()
        .copied()
        .filter(|&(a, b)| seen.insert((a.min(b), a.max(b))))
        .collect()
}

/// Screen positions of the reference intersections.
///
/// Vertical streets are spaced evenly across the width and horizontal streets
/// evenly down the height; an intersection sits where its two streets cross.
#[derive(Debug, Clone)]
pub struct ReferenceLayout {
    positions: HashMap<IntersectionId, (f64, f64)>,
}

impl ReferenceLayout {
    pub fn new() -> Self {
        let mut xs = HashMap::new();
        let column_gap = LAYOUT_WIDTH / (VERTICAL_STREETS.len() + 1) as f64;
        for (i, street) in VERTICAL_STREETS.iter().enumerate() {
            for &node in street.iter() {
                xs.insert(node, (i + 1) as f64 * column_gap);
            }
        }

        let mut positions = HashMap::with_capacity(xs.len());
        let row_gap = LAYOUT_HEIGHT / (HORIZONTAL_STREETS.len() + 1) as f64;
        for (i, street) in HORIZONTAL_STREETS.iter().enumerate() {
            let y = (i + 1) as f64 * row_gap;
            for &node in street.iter() {
                if let Some(&x) = xs.get(&node) {
                    positions.insert(node, (x, y));
                }
            }
        }

        Self { positions }
    }

    pub fn position(&self, node: IntersectionId) -> Option<(f64, f64)> {
        self.positions.get(&node).copied()
    }

    /// Straight-line screen distance between two intersections.
    pub fn distance(&self, a: IntersectionId, b: IntersectionId) -> Option<f64> {
        let (ax, ay) = self.position(a)?;
        let (bx, by) = self.position(b)?;
        Some(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_unique_and_cover_all_intersections() {
        let segments = reference_segments();
        let mut normalized: Vec<_> = segments
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        normalized.sort_unstable();
        normalized.dedup();
        assert_eq!(normalized.len(), segments.len());

        let nodes: HashSet<_> = segments.iter().flat_map(|&(a, b)| [a, b]).collect();
        assert_eq!(nodes.len(), 40);
        assert!((1..=40).all(|n| nodes.contains(&n)));
    }

    #[test]
    fn every_intersection_has_a_screen_position() {
        let layout = ReferenceLayout::new();
        assert_eq!(layout.len(), 40);
        let (x, y) = layout.position(1).expect("intersection 1");
        assert!((x - LAYOUT_WIDTH / 11.0).abs() < 1e-9);
        assert!((y - LAYOUT_HEIGHT / 9.0).abs() < 1e-9);
    }

    #[test]
    fn neighbours_on_a_street_are_one_gap_apart() {
        let layout = ReferenceLayout::new();
        let gap = layout.distance(1, 2).expect("both placed");
        assert!((gap - 2.0 * LAYOUT_WIDTH / 11.0).abs() < 1e-9);
        assert_eq!(layout.distance(1, 99), None);
    }
}
