//! The registered maneuver types.

pub mod altitude_change;
pub mod cruise;
pub mod holding;
pub mod optimal_cruise;
pub mod speed_change;
pub mod taxi;
pub mod transition;
