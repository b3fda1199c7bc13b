//! Core units, standard atmosphere, and shared primitives for the flight
//! mission simulator workspace.

pub mod atmosphere;
pub mod point;
pub mod units;

pub use atmosphere::Atmosphere;
pub use point::{
    EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory, UnknownEngineSetting,
};
pub use units::{Dimension, Unit};

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Sea-level ISA temperature (K).
    pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15;
    /// Sea-level ISA pressure (Pa).
    pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;
    /// Sea-level ISA density (kg/m³).
    pub const SEA_LEVEL_DENSITY: f64 = 1.225;
    /// Specific gas constant of dry air (J/(kg·K)).
    pub const AIR_GAS_CONSTANT: f64 = 287.052_87;
    /// Ratio of specific heats of air.
    pub const AIR_HEAT_RATIO: f64 = 1.4;
    /// Tropopause altitude (m).
    pub const TROPOPAUSE_ALTITUDE: f64 = 11_000.0;
    /// Temperature lapse rate in the troposphere (K/m).
    pub const TROPOSPHERE_LAPSE_RATE: f64 = 0.0065;
    /// Metres per foot.
    pub const FOOT: f64 = 0.3048;
    /// Metres per nautical mile.
    pub const NAUTICAL_MILE: f64 = 1_852.0;
    /// Metres per second per knot.
    pub const KNOT: f64 = 1_852.0 / 3_600.0;
    /// Seconds per minute.
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}
