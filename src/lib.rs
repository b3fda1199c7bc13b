//! Flight mission simulator.
//!
//! Simulates an aircraft mission as a sequence of flight segments (taxi,
//! climb, cruise, holding, descent, transitions), each advancing the
//! aircraft state until a declared target is satisfied. The workspace
//! splits the core into focused crates; this facade re-exports them so
//! front-ends and tests share one entry point.

pub use flight_config as config;
pub use flight_export as export;
pub use flight_mission as mission;
pub use flight_polar as polar;
pub use flight_propulsion as propulsion;
pub use flight_segments as segments;
pub use flight_vars as vars;

pub use flight_core::{
    Atmosphere, EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory, atmosphere,
    constants, units,
};

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
