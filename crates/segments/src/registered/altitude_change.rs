//! Climb/descent at constant thrust rate with one speed representation held.

use tracing::debug;

use flight_core::constants::G0;
use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::step::{self, HeldSpeed, MAX_STEPS};
use crate::target::{OptimalKind, Target, TargetMode};
use crate::{AircraftModel, SegmentError};

/// What terminates an altitude change.
enum Terminator {
    /// A fixed altitude value.
    Altitude(f64),
    /// The altitude maximizing lift-to-drag at current mass, re-solved as
    /// mass drops; optionally rounded down to a flight level.
    Optimal(OptimalKind),
    /// A non-held speed representation crossing its declared value
    /// (e.g. reaching the crossover Mach during a constant-EAS climb).
    SpeedCrossing(Parameter, f64),
}

/// Climbs or descends to a target altitude, a speed crossing, or the
/// optimal altitude, holding thrust rate and one speed representation.
#[derive(Debug, Clone)]
pub struct AltitudeChangeSegment {
    pub target: Target,
    pub engine_setting: EngineSetting,
    pub thrust_rate: f64,
    /// Integration time step (s).
    pub time_step: f64,
}

impl AltitudeChangeSegment {
    pub fn new(target: Target, engine_setting: EngineSetting, thrust_rate: f64) -> Self {
        Self {
            target,
            engine_setting,
            thrust_rate,
            time_step: 2.0,
        }
    }

    /// The speed representation held during the maneuver: the one declared
    /// `constant` in the target, defaulting to true airspeed.
    fn held_kind(&self) -> SpeedKind {
        self.target
            .frozen()
            .find_map(Parameter::speed_kind)
            .unwrap_or(SpeedKind::TrueAirspeed)
    }

    fn speed_crossing(&self) -> Option<(Parameter, f64)> {
        let held = self.held_kind();
        [
            Parameter::Mach,
            Parameter::TrueAirspeed,
            Parameter::EquivalentAirspeed,
        ]
        .into_iter()
        .filter(|p| p.speed_kind() != Some(held))
        .find_map(|p| {
            self.target
                .entry(p)
                .filter(|e| e.mode != TargetMode::Constant)
                .map(|e| (p, e.value))
        })
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        let has_altitude = self
            .target
            .entry(Parameter::Altitude)
            .is_some_and(|e| e.mode != TargetMode::Constant)
            || self.target.optimal_altitude().is_some();
        let has_crossing = self.speed_crossing().is_some();
        match (has_altitude, has_crossing) {
            (false, false) => Err(SegmentError::AmbiguousTarget(
                "altitude_change needs a target altitude or a speed crossing".to_string(),
            )),
            (true, true) => Err(SegmentError::AmbiguousTarget(
                "altitude_change cannot constrain both altitude and a free speed".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn terminator(&self, start: &FlightPoint) -> Terminator {
        if let Some(kind) = self.target.optimal_altitude() {
            return Terminator::Optimal(kind);
        }
        if let Some(entry) = self
            .target
            .entry(Parameter::Altitude)
            .filter(|e| e.mode != TargetMode::Constant)
        {
            return Terminator::Altitude(entry.effective_value(start));
        }
        let (parameter, _) = self.speed_crossing().expect("validated");
        let goal = self
            .target
            .entry(parameter)
            .expect("crossing entry present")
            .effective_value(start);
        Terminator::SpeedCrossing(parameter, goal)
    }

    /// Goal altitude for the current state, for the terminator kinds whose
    /// goal is an altitude.
    fn goal_altitude(
        &self,
        terminator: &Terminator,
        mass: f64,
        held: HeldSpeed,
        model: &AircraftModel<'_>,
    ) -> Result<Option<f64>, SegmentError> {
        match terminator {
            Terminator::Altitude(goal) => Ok(Some(*goal)),
            Terminator::Optimal(kind) => {
                let optimal = step::optimal_altitude(mass, held, model)?;
                Ok(Some(match kind {
                    OptimalKind::Altitude => optimal,
                    OptimalKind::FlightLevel => step::round_down_to_flight_level(optimal),
                }))
            }
            Terminator::SpeedCrossing(..) => Ok(None),
        }
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let held = HeldSpeed::capture(start, self.held_kind());
        let terminator = self.terminator(start);

        let mut current = start.clone();
        held.impose(&mut current);
        step::complete_aero(&mut current, model);
        let mut fuel_flow =
            step::manual_thrust(&mut current, model, self.engine_setting, self.thrust_rate);

        let initial_goal = self.goal_altitude(&terminator, current.mass, held, model)?;
        let climbing = match &terminator {
            Terminator::SpeedCrossing(parameter, goal) => {
                // Probe how the crossing parameter moves with altitude
                // under the held speed, then pick the direction that
                // approaches the goal.
                let value_at = |altitude: f64| {
                    let mut probe = current.clone();
                    probe.altitude = altitude;
                    held.impose(&mut probe);
                    probe.get(*parameter)
                };
                let here = value_at(current.altitude);
                let above = value_at(current.altitude + 100.0);
                (*goal > here) == (above > here)
            }
            _ => initial_goal.expect("altitude goal present") > current.altitude,
        };
        debug!(
            kind = ?self.held_kind(),
            climbing,
            goal = ?initial_goal,
            "altitude change"
        );

        let mut trajectory = Trajectory::new();
        trajectory.push(current.clone());
        if let Some(goal) = initial_goal {
            if (goal - current.altitude).abs() <= crate::target::tolerance(Parameter::Altitude) {
                return Ok(trajectory);
            }
        }

        for _ in 0..MAX_STEPS {
            let sin_gamma =
                ((current.thrust - current.drag) / (current.mass * G0)).clamp(-1.0, 1.0);
            let gamma = sin_gamma.asin();
            let vertical_speed = current.true_airspeed * sin_gamma;
            if climbing && vertical_speed < 1.0e-3 {
                return Err(SegmentError::TargetUnreachable(
                    "climb rate fell to zero before the target".to_string(),
                ));
            }
            if !climbing && vertical_speed > -1.0e-3 {
                return Err(SegmentError::TargetUnreachable(
                    "descent rate fell to zero before the target".to_string(),
                ));
            }

            let dt = self.time_step;
            let mut next = current.clone();
            next.altitude = current.altitude + vertical_speed * dt;
            held.impose(&mut next);
            next.time = current.time + dt;
            next.ground_distance =
                current.ground_distance + current.true_airspeed * gamma.cos() * dt;
            next.mass = current.mass - fuel_flow * dt;
            step::check_fuel(&next, "the target altitude")?;

            step::complete_aero(&mut next, model);
            fuel_flow = step::manual_thrust(&mut next, model, self.engine_setting, self.thrust_rate);
            next.slope_angle = gamma;
            next.acceleration = (next.true_airspeed - current.true_airspeed) / dt;

            match &terminator {
                Terminator::SpeedCrossing(parameter, goal) => {
                    if step::crossed(&current, &next, *parameter, *goal) {
                        let mut landed = step::interpolate_to(&current, &next, *parameter, *goal);
                        // Altitude interpolates with the rest; the crossing
                        // parameter is exact by construction.
                        landed.complete_speeds(parameter.speed_kind().expect("speed parameter"));
                        trajectory.push(landed);
                        return Ok(trajectory);
                    }
                }
                _ => {
                    let goal = self
                        .goal_altitude(&terminator, next.mass, held, model)?
                        .expect("altitude goal present");
                    if step::crossed(&current, &next, Parameter::Altitude, goal) {
                        let mut landed =
                            step::interpolate_to(&current, &next, Parameter::Altitude, goal);
                        held.impose(&mut landed);
                        step::complete_aero(&mut landed, model);
                        trajectory.push(landed);
                        return Ok(trajectory);
                    }
                }
            }

            trajectory.push(next.clone());
            current = next;
        }
        Err(SegmentError::TargetUnreachable(
            "step budget exhausted before the target altitude".to_string(),
        ))
    }
}
