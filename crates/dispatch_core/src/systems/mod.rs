pub mod ride_completed;
pub mod ride_requested;
