//! Cruise-climb: cruise holding the lift-to-drag ratio at its maximum by
//! re-solving the optimal altitude for the current mass at every step.

use tracing::debug;

use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::step::{self, HeldSpeed, MAX_STEPS};
use crate::target::Target;
use crate::{AircraftModel, SegmentError};

/// Cruise over a ground-distance target with the altitude continuously
/// adjusted to the optimum for the current mass, Mach held.
#[derive(Debug, Clone)]
pub struct OptimalCruiseSegment {
    pub target: Target,
    pub engine_setting: EngineSetting,
    /// Time per distance step (s).
    pub time_step: f64,
}

impl OptimalCruiseSegment {
    pub fn new(target: Target, engine_setting: EngineSetting) -> Self {
        Self {
            target,
            engine_setting,
            time_step: 60.0,
        }
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.target.entry(Parameter::GroundDistance).is_none() {
            return Err(SegmentError::AmbiguousTarget(
                "optimal_cruise needs a ground_distance target".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let goal_distance = self
            .target
            .entry(Parameter::GroundDistance)
            .expect("validated")
            .effective_value(start);

        let mut current = start.clone();
        current.complete_speeds(SpeedKind::TrueAirspeed);
        if current.true_airspeed < 1.0 {
            return Err(SegmentError::TargetUnreachable(
                "optimal cruise requires a positive airspeed".to_string(),
            ));
        }
        let held = HeldSpeed::capture(&current, SpeedKind::Mach);

        current.altitude = step::optimal_altitude(current.mass, held, model)?;
        held.impose(&mut current);
        step::complete_aero(&mut current, model);
        let required = current.drag;
        let mut fuel_flow =
            step::regulated_thrust(&mut current, model, self.engine_setting, required)?;
        debug!(altitude = current.altitude, "optimal cruise entry");

        let mut trajectory = Trajectory::new();
        trajectory.push(current.clone());

        for _ in 0..MAX_STEPS {
            let remaining = goal_distance - current.ground_distance;
            if remaining <= crate::target::tolerance(Parameter::GroundDistance) {
                return Ok(trajectory);
            }
            let dx = remaining.min(current.true_airspeed * self.time_step);
            let dt = dx / current.true_airspeed;

            let mut next = current.clone();
            next.ground_distance = current.ground_distance + dx;
            next.time = current.time + dt;
            next.mass = current.mass - fuel_flow * dt;
            step::check_fuel(&next, "the cruise distance target")?;

            // Drift up as fuel burns off, staying on the optimum.
            next.altitude = step::optimal_altitude(next.mass, held, model)?;
            held.impose(&mut next);
            step::complete_aero(&mut next, model);
            let required = next.drag;
            fuel_flow =
                step::regulated_thrust(&mut next, model, self.engine_setting, required)?;
            next.slope_angle = ((next.altitude - current.altitude) / dx).atan();

            trajectory.push(next.clone());
            current = next;
        }
        Err(SegmentError::TargetUnreachable(
            "step budget exhausted before the cruise distance target".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RawTargetValue;
    use approx::assert_relative_eq;
    use flight_core::constants::G0;
    use flight_core::Atmosphere;
    use flight_polar::Polar;
    use flight_propulsion::TurbofanModel;

    #[test]
    fn holds_the_optimal_lift_drag_ratio_while_climbing_slowly() {
        let polar = Polar::quadratic(0.02, 0.045, 1.5, 150).unwrap();
        let engine = TurbofanModel::new(240_000.0, 0.06);
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let mut start = FlightPoint {
            altitude: 11_000.0,
            mass: 60_000.0,
            mach: 0.78,
            ..Default::default()
        };
        start.complete_speeds(SpeedKind::Mach);

        let target =
            Target::parse(&[("ground_distance", RawTargetValue::Number(800_000.0))]).unwrap();
        let segment = OptimalCruiseSegment::new(target, EngineSetting::Cruise);
        let trajectory = segment.compute(&start, &model).unwrap();

        let end = trajectory.last().unwrap();
        assert_relative_eq!(end.ground_distance, 800_000.0, epsilon = 1.0);
        // Altitude drifts up as mass burns off.
        assert!(end.altitude > trajectory.first().unwrap().altitude);
        // Every point sits at the optimum CL for its mass.
        for point in trajectory.points() {
            let atm = Atmosphere::at(point.altitude);
            let q = 0.5 * atm.density * point.true_airspeed * point.true_airspeed;
            let cl = point.mass * G0 / (q * model.reference_area);
            assert_relative_eq!(cl, polar.optimal_cl(), epsilon = 0.01);
        }
    }
}
