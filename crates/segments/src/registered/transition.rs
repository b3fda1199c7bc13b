//! Single-step transition: sets the end point algebraically from the
//! declared target, bypassing integration.

use flight_core::{FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::target::{Target, TargetMode};
use crate::{AircraftModel, SegmentError};

/// Applies absolute/relative target fields in one algebraic step.
///
/// Stands in for parts of the flight that are not worth simulating (e.g. a
/// whole descent summarized by its endpoint, or a diversion allowance).
#[derive(Debug, Clone)]
pub struct TransitionSegment {
    pub target: Target,
    /// End mass as a fraction of start mass, in place of a mass target.
    pub mass_ratio: Option<f64>,
    /// Appends a synthetic point removing a fuel reserve sized against the
    /// mass remaining *after* the reserve is removed.
    pub reserve_mass_ratio: Option<f64>,
}

impl TransitionSegment {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            mass_ratio: None,
            reserve_mass_ratio: None,
        }
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.mass_ratio.is_some()
            && self
                .target
                .entry(Parameter::Mass)
                .is_some_and(|e| e.mode != TargetMode::Constant)
        {
            return Err(SegmentError::AmbiguousTarget(
                "transition cannot declare both a mass target and a mass ratio".to_string(),
            ));
        }
        let speed_targets = [
            Parameter::Mach,
            Parameter::TrueAirspeed,
            Parameter::EquivalentAirspeed,
        ]
        .into_iter()
        .filter(|p| {
            self.target
                .entry(*p)
                .is_some_and(|e| e.mode != TargetMode::Constant)
        })
        .count();
        if speed_targets > 1 {
            return Err(SegmentError::AmbiguousTarget(
                "transition accepts a single target speed representation".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        _model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let mut end = start.clone();
        let mut speed_driver = None;
        for entry in self.target.entries() {
            if entry.mode == TargetMode::Constant {
                continue;
            }
            end.set(entry.parameter, entry.effective_value(start));
            if let Some(kind) = entry.parameter.speed_kind() {
                speed_driver = Some(kind);
            }
        }
        if let Some(ratio) = self.mass_ratio {
            end.mass = start.mass * ratio;
        }
        end.complete_speeds(speed_driver.unwrap_or(SpeedKind::TrueAirspeed));

        // No stepping happened; aerodynamic bookkeeping is meaningless here.
        end.cl = 0.0;
        end.cd = 0.0;
        end.drag = 0.0;
        end.thrust = 0.0;
        end.slope_angle = 0.0;
        end.acceleration = 0.0;

        let mut trajectory = Trajectory::new();
        trajectory.push(start.clone());
        trajectory.push(end.clone());

        if let Some(ratio) = self.reserve_mass_ratio {
            // reserve = ratio × (mass_before − reserve): the ratio applies
            // to the mass remaining once the reserve is set aside.
            let reserve = ratio * end.mass / (1.0 + ratio);
            let mut after = end.clone();
            after.mass = end.mass - reserve;
            trajectory.push(after);
        }
        Ok(trajectory)
    }
}
