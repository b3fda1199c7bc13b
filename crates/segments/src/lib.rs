//! Flight segment simulation engine.
//!
//! A segment advances the aircraft state from a start point until its
//! declared target is satisfied, producing a time-monotonic sequence of
//! flight points. Maneuver types form a closed set; dispatch goes through
//! [`FlightSegment`].

pub mod registered;
mod step;
pub mod target;

pub use registered::altitude_change::AltitudeChangeSegment;
pub use registered::cruise::{ClimbProfile, CruiseSegment};
pub use registered::holding::HoldingSegment;
pub use registered::optimal_cruise::OptimalCruiseSegment;
pub use registered::speed_change::SpeedChangeSegment;
pub use registered::taxi::TaxiSegment;
pub use registered::transition::TransitionSegment;
pub use target::{OptimalKind, RawTargetValue, Target, TargetEntry, TargetError, TargetMode};

use thiserror::Error;

use flight_core::point::UnknownEngineSetting;
use flight_core::{FlightPoint, Parameter, Trajectory};
use flight_polar::{Polar, PolarError};
use flight_propulsion::Propulsion;

/// Aircraft-level collaborators shared by all segments of a computation.
pub struct AircraftModel<'a> {
    pub polar: &'a Polar,
    pub propulsion: &'a dyn Propulsion,
    /// Wing reference area (m²).
    pub reference_area: f64,
}

/// Failures of segment configuration or simulation.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Physical infeasibility discovered while stepping.
    #[error("target cannot be reached: {0}")]
    TargetUnreachable(String),
    /// The declared target leaves zero or more than one degree of freedom
    /// for the segment's driver. Detected before any simulation step.
    #[error("ambiguous target: {0}")]
    AmbiguousTarget(String),
    #[error(transparent)]
    InvalidPolar(#[from] PolarError),
    #[error(transparent)]
    UnknownEngineSetting(#[from] UnknownEngineSetting),
    /// A nested root search failed to converge within bounds.
    #[error("numeric search failed: {0}")]
    NumericDivergence(String),
    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Closed set of maneuver types.
#[derive(Debug, Clone)]
pub enum FlightSegment {
    SpeedChange(SpeedChangeSegment),
    AltitudeChange(AltitudeChangeSegment),
    Cruise(CruiseSegment),
    OptimalCruise(OptimalCruiseSegment),
    Holding(HoldingSegment),
    Taxi(TaxiSegment),
    Transition(TransitionSegment),
}

impl FlightSegment {
    /// Declaration-file name of the maneuver type.
    pub fn kind(&self) -> &'static str {
        match self {
            FlightSegment::SpeedChange(_) => "speed_change",
            FlightSegment::AltitudeChange(_) => "altitude_change",
            FlightSegment::Cruise(_) => "cruise",
            FlightSegment::OptimalCruise(_) => "optimal_cruise",
            FlightSegment::Holding(_) => "holding",
            FlightSegment::Taxi(_) => "taxi",
            FlightSegment::Transition(_) => "transition",
        }
    }

    /// Validate the target's degrees of freedom. Called eagerly at build
    /// time and again before stepping.
    pub fn validate(&self) -> Result<(), SegmentError> {
        match self {
            FlightSegment::SpeedChange(s) => s.validate(),
            FlightSegment::AltitudeChange(s) => s.validate(),
            FlightSegment::Cruise(s) => s.validate(),
            FlightSegment::OptimalCruise(s) => s.validate(),
            FlightSegment::Holding(s) => s.validate(),
            FlightSegment::Taxi(s) => s.validate(),
            FlightSegment::Transition(s) => s.validate(),
        }
    }

    /// Simulate from `start` (inclusive) to the resolved target (inclusive).
    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        self.validate()?;
        match self {
            FlightSegment::SpeedChange(s) => s.compute(start, model),
            FlightSegment::AltitudeChange(s) => s.compute(start, model),
            FlightSegment::Cruise(s) => s.compute(start, model),
            FlightSegment::OptimalCruise(s) => s.compute(start, model),
            FlightSegment::Holding(s) => s.compute(start, model),
            FlightSegment::Taxi(s) => s.compute(start, model),
            FlightSegment::Transition(s) => s.compute(start, model),
        }
    }

    /// Whether this segment consumes a route's distributable distance.
    pub fn absorbs_route_distance(&self) -> bool {
        matches!(
            self,
            FlightSegment::Cruise(_) | FlightSegment::OptimalCruise(_)
        )
    }

    /// Overwrite the relative ground-distance target, used by routes to
    /// apportion their overall range onto the cruise part.
    pub fn set_distance_target(&mut self, distance: f64) {
        let target = match self {
            FlightSegment::Cruise(s) => &mut s.target,
            FlightSegment::OptimalCruise(s) => &mut s.target,
            _ => return,
        };
        match target.entry_mut(Parameter::GroundDistance) {
            Some(entry) => entry.value = distance,
            None => {
                *target = target
                    .clone()
                    .with(Parameter::GroundDistance, TargetMode::Relative, distance);
            }
        }
    }
}
