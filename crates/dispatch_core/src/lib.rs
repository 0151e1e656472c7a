//! Cab dispatch over a weighted street grid: shortest paths, a bounded fleet
//! with two-seat ride sharing, route merging, and a discrete-event simulation
//! that drives it all.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fleet;
pub mod merge;
pub mod network;
pub mod path;
pub mod pricing;
pub mod proximity;
pub mod runner;
pub mod scenario;
pub mod selection;
pub mod shortest_path;
pub mod systems;
pub mod telemetry;
pub mod telemetry_export;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
