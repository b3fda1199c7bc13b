//! Holding at constant altitude and speed for a target duration.

use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::step::{self, MAX_STEPS};
use crate::target::Target;
use crate::{AircraftModel, SegmentError};

/// Holds altitude and speed with thrust regulated to balance drag, until
/// the target time has elapsed.
#[derive(Debug, Clone)]
pub struct HoldingSegment {
    pub target: Target,
    pub engine_setting: EngineSetting,
    /// Integration time step (s).
    pub time_step: f64,
}

impl HoldingSegment {
    pub fn new(target: Target, engine_setting: EngineSetting) -> Self {
        Self {
            target,
            engine_setting,
            time_step: 60.0,
        }
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.target.entry(Parameter::Time).is_none() {
            return Err(SegmentError::AmbiguousTarget(
                "holding needs a time target".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let goal_time = self
            .target
            .entry(Parameter::Time)
            .expect("validated")
            .effective_value(start);

        let mut current = start.clone();
        current.complete_speeds(SpeedKind::TrueAirspeed);
        step::complete_aero(&mut current, model);
        let required = current.drag;
        let mut fuel_flow =
            step::regulated_thrust(&mut current, model, self.engine_setting, required)?;
        current.slope_angle = 0.0;
        current.acceleration = 0.0;

        let mut trajectory = Trajectory::new();
        trajectory.push(current.clone());

        for _ in 0..MAX_STEPS {
            let remaining = goal_time - current.time;
            if remaining <= crate::target::tolerance(Parameter::Time) {
                return Ok(trajectory);
            }
            let dt = remaining.min(self.time_step);

            let mut next = current.clone();
            next.time = current.time + dt;
            next.ground_distance = current.ground_distance + current.true_airspeed * dt;
            next.mass = current.mass - fuel_flow * dt;
            step::check_fuel(&next, "the holding time target")?;

            step::complete_aero(&mut next, model);
            let required = next.drag;
            fuel_flow =
                step::regulated_thrust(&mut next, model, self.engine_setting, required)?;

            trajectory.push(next.clone());
            current = next;
        }
        Err(SegmentError::TargetUnreachable(
            "step budget exhausted before the holding time target".to_string(),
        ))
    }
}
