//! Ground taxi at fixed thrust rate for a target duration.

use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::step::{self, MAX_STEPS};
use crate::target::Target;
use crate::{AircraftModel, SegmentError};

/// Taxi phase: constant altitude, imposed (low) true airspeed, and fixed
/// thrust rate, terminating on elapsed time.
#[derive(Debug, Clone)]
pub struct TaxiSegment {
    pub target: Target,
    pub engine_setting: EngineSetting,
    pub thrust_rate: f64,
    /// The imposed speed during taxi; used for distance computation and
    /// fed to the propulsion model.
    pub true_airspeed: f64,
    /// Integration time step (s).
    pub time_step: f64,
}

impl TaxiSegment {
    pub fn new(target: Target, thrust_rate: f64) -> Self {
        Self {
            target,
            engine_setting: EngineSetting::Idle,
            thrust_rate,
            true_airspeed: 0.0,
            time_step: 60.0,
        }
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.target.entry(Parameter::Time).is_none() {
            return Err(SegmentError::AmbiguousTarget(
                "taxi needs a time target".to_string(),
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

        // The segment imposes its own speed; whatever the previous part
        // left there is overwritten before stepping.
        let mut current = start.clone();
        current.true_airspeed = self.true_airspeed;
        current.complete_speeds(SpeedKind::TrueAirspeed);
        current.cl = 0.0;
        current.cd = 0.0;
        current.drag = 0.0;
        current.slope_angle = 0.0;
        current.acceleration = 0.0;
        let mut fuel_flow =
            step::manual_thrust(&mut current, model, self.engine_setting, self.thrust_rate);

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
            step::check_fuel(&next, "the taxi time target")?;
            fuel_flow =
                step::manual_thrust(&mut next, model, self.engine_setting, self.thrust_rate);

            trajectory.push(next.clone());
            current = next;
        }
        Err(SegmentError::TargetUnreachable(
            "step budget exhausted before the taxi time target".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RawTargetValue;
    use approx::assert_relative_eq;
    use flight_polar::Polar;
    use flight_propulsion::TurbofanModel;

    #[test]
    fn taxi_burns_fuel_at_fixed_setting() {
        let polar = Polar::quadratic(0.02, 0.045, 1.5, 150).unwrap();
        let engine = TurbofanModel::new(240_000.0, 0.06);
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let start = FlightPoint {
            mass: 70_000.0,
            ..Default::default()
        };

        let target = Target::parse(&[("time", RawTargetValue::Number(300.0))]).unwrap();
        let mut segment = TaxiSegment::new(target, 0.3);
        segment.true_airspeed = 15.0;
        let trajectory = segment.compute(&start, &model).unwrap();

        let end = trajectory.last().unwrap();
        assert_relative_eq!(end.time, 300.0, epsilon = 1e-9);
        assert_relative_eq!(end.ground_distance, 15.0 * 300.0, epsilon = 1e-6);
        assert!(end.mass < 70_000.0);
        assert_eq!(end.engine_setting, Some(EngineSetting::Idle));

        // Fuel burn matches the idle rating directly.
        let (_, fuel_flow) = flight_propulsion::Propulsion::thrust_and_fuel_flow(
            &engine,
            &start,
            EngineSetting::Idle,
            0.3,
        );
        assert_relative_eq!(70_000.0 - end.mass, fuel_flow * 300.0, epsilon = 1e-6);
    }
}
