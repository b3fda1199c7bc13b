//! Conversion of the declarative tree into runtime mission structures.
//!
//! Every declaration is resolved here, with the naming context of its use
//! site, so configuration errors surface before any simulation step and
//! the runtime structures hold only concrete SI values.

use flight_core::units::Dimension;
use flight_core::{EngineSetting, FlightPoint, Parameter};
use flight_mission::{
    Mission, MissionError, MissionPart, MissionResult, NamedSegment, Phase, Route, RoutePart,
};
use flight_polar::Polar;
use flight_propulsion::TurbofanModel;
use flight_segments::target::RawTargetValue;
use flight_segments::{
    AircraftModel, AltitudeChangeSegment, ClimbProfile, CruiseSegment, FlightSegment,
    HoldingSegment, OptimalCruiseSegment, SpeedChangeSegment, Target, TargetError, TaxiSegment,
    TransitionSegment,
};
use flight_vars::{NamingContext, Resolved, VariableProvider, resolver};

use crate::model::{
    CommonSegmentConfig, MissionFile, MissionPartConfig, PolarConfig, RoutePartConfig,
    SegmentConfig, ValueDecl,
};
use crate::ConfigError;

/// Everything needed to run one mission: the composed mission, its start
/// point, and the aircraft collaborators.
#[derive(Debug)]
pub struct MissionSetup {
    pub mission: Mission,
    pub start: FlightPoint,
    pub polar: Polar,
    pub engine: TurbofanModel,
    pub reference_area: f64,
}

impl MissionSetup {
    pub fn model(&self) -> AircraftModel<'_> {
        AircraftModel {
            polar: &self.polar,
            propulsion: &self.engine,
            reference_area: self.reference_area,
        }
    }

    /// Simulate the mission from its declared start state.
    pub fn run(&self) -> Result<MissionResult, MissionError> {
        self.mission.compute(&self.start, &self.model())
    }
}

/// Build the named mission and its collaborators from a loaded definition,
/// resolving every declaration through `provider`.
pub fn build_mission_setup(
    file: &MissionFile,
    mission_id: &str,
    provider: &dyn VariableProvider,
) -> Result<MissionSetup, ConfigError> {
    let builder = Builder { file, provider };
    let mission = builder.build_mission(mission_id)?;
    let (polar, engine, reference_area) = builder.build_aircraft()?;
    let start = builder.build_start(mission_id)?;
    Ok(MissionSetup {
        mission,
        start,
        polar,
        engine,
        reference_area,
    })
}

struct Builder<'a> {
    file: &'a MissionFile,
    provider: &'a dyn VariableProvider,
}

impl Builder<'_> {
    fn build_mission(&self, mission_id: &str) -> Result<Mission, ConfigError> {
        let config = self
            .file
            .missions
            .get(mission_id)
            .ok_or_else(|| ConfigError::UnknownMission(mission_id.to_string()))?;
        let context = NamingContext::new(mission_id);
        let mut mission = Mission::new(mission_id);
        for part in &config.parts {
            let part = match part {
                MissionPartConfig::PhaseRef { phase } => {
                    MissionPart::Phase(self.build_phase(phase, &context)?)
                }
                MissionPartConfig::RouteRef { route } => {
                    MissionPart::Route(self.build_route(route, &context)?)
                }
                MissionPartConfig::Segment(segment) => {
                    MissionPart::Segment(self.build_segment(segment, &context)?)
                }
            };
            mission.parts.push(part);
        }
        Ok(mission)
    }

    fn build_phase(
        &self,
        phase_id: &str,
        parent: &NamingContext,
    ) -> Result<Phase, ConfigError> {
        let config = self
            .file
            .phases
            .get(phase_id)
            .ok_or_else(|| ConfigError::UnknownPhase(phase_id.to_string()))?;
        let context = parent.clone().with_phase(phase_id);
        let mut phase = Phase::new(phase_id);
        for segment in &config.parts {
            phase.segments.push(self.build_segment(segment, &context)?);
        }
        Ok(phase)
    }

    fn build_route(
        &self,
        route_id: &str,
        parent: &NamingContext,
    ) -> Result<Route, ConfigError> {
        let config = self
            .file
            .routes
            .get(route_id)
            .ok_or_else(|| ConfigError::UnknownRoute(route_id.to_string()))?;
        let context = parent.clone().with_route(route_id);
        let range = self.resolve_number(&config.range, "range", Dimension::Length, &context)?;
        let mut route = Route::new(route_id, range);
        for part in &config.parts {
            let part = match part {
                RoutePartConfig::PhaseRef { phase } => {
                    RoutePart::Phase(self.build_phase(phase, &context)?)
                }
                RoutePartConfig::Segment(segment) => {
                    RoutePart::Segment(self.build_segment(segment, &context)?)
                }
            };
            route.parts.push(part);
        }
        Ok(route)
    }

    fn build_segment(
        &self,
        config: &SegmentConfig,
        context: &NamingContext,
    ) -> Result<NamedSegment, ConfigError> {
        let common = config.common();
        let target = self.build_target(common, context)?;

        let segment = match config {
            SegmentConfig::SpeedChange(_) => {
                let mut segment = SpeedChangeSegment::new(
                    target,
                    self.engine_setting(common, EngineSetting::Takeoff)?,
                    self.thrust_rate(common, context)?,
                );
                if let Some(step) = common.time_step {
                    segment.time_step = step;
                }
                FlightSegment::SpeedChange(segment)
            }
            SegmentConfig::AltitudeChange(_) => {
                let mut segment = AltitudeChangeSegment::new(
                    target,
                    self.engine_setting(common, EngineSetting::Climb)?,
                    self.thrust_rate(common, context)?,
                );
                if let Some(step) = common.time_step {
                    segment.time_step = step;
                }
                FlightSegment::AltitudeChange(segment)
            }
            SegmentConfig::Cruise(cruise) => {
                let mut segment =
                    CruiseSegment::new(target, self.engine_setting(common, EngineSetting::Cruise)?);
                if let Some(step) = common.time_step {
                    segment.time_step = step;
                }
                let mut climb = ClimbProfile::default();
                if let Some(setting) = &cruise.climb_engine_setting {
                    climb.engine_setting = EngineSetting::parse(setting)?;
                }
                if let Some(rate) = &cruise.climb_thrust_rate {
                    climb.thrust_rate = self.resolve_number(
                        rate,
                        "climb_thrust_rate",
                        Dimension::Dimensionless,
                        context,
                    )?;
                }
                segment.climb = climb;
                FlightSegment::Cruise(segment)
            }
            SegmentConfig::OptimalCruise(_) => {
                let mut segment = OptimalCruiseSegment::new(
                    target,
                    self.engine_setting(common, EngineSetting::Cruise)?,
                );
                if let Some(step) = common.time_step {
                    segment.time_step = step;
                }
                FlightSegment::OptimalCruise(segment)
            }
            SegmentConfig::Holding(_) => {
                let mut segment = HoldingSegment::new(
                    target,
                    self.engine_setting(common, EngineSetting::Cruise)?,
                );
                if let Some(step) = common.time_step {
                    segment.time_step = step;
                }
                FlightSegment::Holding(segment)
            }
            SegmentConfig::Taxi(taxi) => {
                let mut segment = TaxiSegment::new(target, self.thrust_rate(common, context)?);
                segment.engine_setting = self.engine_setting(common, EngineSetting::Idle)?;
                if let Some(speed) = &taxi.true_airspeed {
                    segment.true_airspeed = self.resolve_number(
                        speed,
                        "true_airspeed",
                        Dimension::Speed,
                        context,
                    )?;
                }
                if let Some(step) = common.time_step {
                    segment.time_step = step;
                }
                FlightSegment::Taxi(segment)
            }
            SegmentConfig::Transition(transition) => {
                let mut segment = TransitionSegment::new(target);
                if let Some(ratio) = &transition.mass_ratio {
                    segment.mass_ratio = Some(self.resolve_number(
                        ratio,
                        "mass_ratio",
                        Dimension::Dimensionless,
                        context,
                    )?);
                }
                if let Some(ratio) = &transition.reserve_mass_ratio {
                    segment.reserve_mass_ratio = Some(self.resolve_number(
                        ratio,
                        "reserve_mass_ratio",
                        Dimension::Dimensionless,
                        context,
                    )?);
                }
                FlightSegment::Transition(segment)
            }
        };

        // Degrees-of-freedom problems surface here, at build time.
        segment.validate()?;
        Ok(NamedSegment::new(config.name(), segment))
    }

    fn build_target(
        &self,
        common: &CommonSegmentConfig,
        context: &NamingContext,
    ) -> Result<Target, ConfigError> {
        let mut raw = Vec::with_capacity(common.target.len());
        for (key, decl) in &common.target {
            let stripped = key.strip_prefix("delta_").unwrap_or(key);
            let parameter = Parameter::from_key(stripped)
                .ok_or_else(|| TargetError::UnknownParameter(key.clone()))?;
            let spec = decl.to_spec()?;
            let value = match resolver::resolve(
                &spec,
                stripped,
                parameter.dimension(),
                context,
                self.provider,
            )? {
                Resolved::Value(value) => RawTargetValue::Number(value),
                Resolved::Text(text) => RawTargetValue::Text(text),
                Resolved::Constant => RawTargetValue::Constant,
            };
            raw.push((key.clone(), value));
        }
        Ok(Target::parse(&raw)?)
    }

    fn engine_setting(
        &self,
        common: &CommonSegmentConfig,
        default: EngineSetting,
    ) -> Result<EngineSetting, ConfigError> {
        match &common.engine_setting {
            Some(name) => Ok(EngineSetting::parse(name)?),
            None => Ok(default),
        }
    }

    fn thrust_rate(
        &self,
        common: &CommonSegmentConfig,
        context: &NamingContext,
    ) -> Result<f64, ConfigError> {
        match &common.thrust_rate {
            Some(decl) => {
                self.resolve_number(decl, "thrust_rate", Dimension::Dimensionless, context)
            }
            None => Ok(1.0),
        }
    }

    fn resolve_number(
        &self,
        decl: &ValueDecl,
        parameter: &str,
        dimension: Dimension,
        context: &NamingContext,
    ) -> Result<f64, ConfigError> {
        let spec = decl.to_spec()?;
        Ok(resolver::resolve_value(
            &spec,
            parameter,
            dimension,
            context,
            self.provider,
        )?)
    }

    fn build_aircraft(&self) -> Result<(Polar, TurbofanModel, f64), ConfigError> {
        let aircraft = self.file.aircraft.as_ref().ok_or(ConfigError::MissingAircraft)?;
        let polar = match &aircraft.polar {
            PolarConfig::Vectors { cl, cd } => Polar::new(cl.clone(), cd.clone())?,
            PolarConfig::External { from } => {
                let cl = self.provider.vector(&format!("{from}:CL"));
                let cd = self.provider.vector(&format!("{from}:CD"));
                match (cl, cd) {
                    (Some(cl), Some(cd)) => Polar::new(cl, cd)?,
                    _ => return Err(ConfigError::MissingPolarVectors(from.clone())),
                }
            }
        };
        let engine = TurbofanModel::new(
            aircraft.propulsion.sea_level_thrust,
            aircraft.propulsion.tsfc_per_hour,
        );
        Ok((polar, engine, aircraft.reference_area))
    }

    fn build_start(&self, mission_id: &str) -> Result<FlightPoint, ConfigError> {
        let context = NamingContext::new(mission_id);
        let mut point = FlightPoint::default();
        let mut driver = None;
        for (key, decl) in &self.file.start {
            let parameter = Parameter::from_key(key)
                .ok_or_else(|| ConfigError::UnknownStartParameter(key.clone()))?;
            let value =
                self.resolve_number(decl, key, parameter.dimension(), &context)?;
            point.set(parameter, value);
            if let Some(kind) = parameter.speed_kind() {
                driver = Some(kind);
            }
        }
        if let Some(kind) = driver {
            point.complete_speeds(kind);
        }
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission_file_from_yaml;
    use approx::assert_relative_eq;
    use flight_core::constants::NAUTICAL_MILE;
    use flight_vars::VariableSet;

    const DEFINITION: &str = r#"
aircraft:
  reference_area: 120.0
  polar:
    cl: [0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.2]
    cd: [0.02, 0.0218, 0.0272, 0.0362, 0.0488, 0.065, 0.0848]
  propulsion:
    sea_level_thrust: 240000.0
    tsfc_per_hour: 0.06
start:
  altitude: 0.0
  mass: { value: 70.0, unit: t }
  true_airspeed: 0.0
phases:
  departure:
    parts:
      - segment: taxi
        target:
          time: { value: 5.0, unit: min }
        thrust_rate: ~
        true_airspeed: 15.0
missions:
  operational:
    parts:
      - phase: departure
      - segment: transition
        name: takeoff
        target:
          delta_time: 90.0
          delta_mass: 120.0
          altitude: { value: 1500.0 }
          mach: 0.4
"#;

    #[test]
    fn builds_and_runs_a_mission_from_yaml() {
        let file = mission_file_from_yaml(DEFINITION).unwrap();
        let mut provider = VariableSet::new();
        provider.insert("data:mission:operational:departure:thrust_rate", 0.3);

        let setup = build_mission_setup(&file, "operational", &provider).unwrap();
        assert_relative_eq!(setup.start.mass, 70_000.0);
        assert_eq!(setup.mission.parts.len(), 2);

        let result = setup.run().unwrap();
        let end = result.trajectory.last().unwrap();
        assert_relative_eq!(end.time, 300.0 + 90.0, epsilon = 1e-9);
        assert_relative_eq!(end.altitude, 1_500.0);
        assert!(result.block_fuel() > 0.0);
    }

    #[test]
    fn unresolved_contextual_variable_is_a_configuration_error() {
        let file = mission_file_from_yaml(DEFINITION).unwrap();
        let err = build_mission_setup(&file, "operational", &VariableSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Resolve(_)));
    }

    #[test]
    fn unit_declarations_convert_to_si() {
        let yaml = r#"
aircraft:
  reference_area: 120.0
  polar:
    cl: [0.0, 0.5, 1.0]
    cd: [0.02, 0.031, 0.065]
  propulsion:
    sea_level_thrust: 240000.0
    tsfc_per_hour: 0.06
routes:
  main:
    range: { value: 2000.0, unit: NM }
    parts:
      - segment: cruise
        target:
          ground_distance: 0.0
missions:
  ferry:
    parts:
      - route: main
"#;
        let file = mission_file_from_yaml(yaml).unwrap();
        let setup = build_mission_setup(&file, "ferry", &VariableSet::new()).unwrap();
        match &setup.mission.parts[0] {
            flight_mission::MissionPart::Route(route) => {
                assert_relative_eq!(route.range, 2_000.0 * NAUTICAL_MILE);
            }
            other => panic!("expected a route part, got {other:?}"),
        }
    }

    #[test]
    fn polar_from_provider_vectors() {
        let yaml = r#"
aircraft:
  reference_area: 120.0
  polar:
    from: "data:aerodynamics:cruise"
  propulsion:
    sea_level_thrust: 240000.0
    tsfc_per_hour: 0.06
missions:
  empty:
    parts: []
"#;
        let file = mission_file_from_yaml(yaml).unwrap();
        let mut provider = VariableSet::new();
        provider.insert_vector("data:aerodynamics:cruise:CL", vec![0.0, 0.5, 1.0]);
        provider.insert_vector("data:aerodynamics:cruise:CD", vec![0.02, 0.031, 0.065]);
        let setup = build_mission_setup(&file, "empty", &provider).unwrap();
        assert!(setup.polar.optimal_cl() > 0.0);

        let missing = build_mission_setup(&file, "empty", &VariableSet::new());
        assert!(matches!(missing, Err(ConfigError::MissingPolarVectors(_))));
    }

    #[test]
    fn ambiguous_targets_fail_at_build_time() {
        let yaml = r#"
aircraft:
  reference_area: 120.0
  polar:
    cl: [0.0, 0.5, 1.0]
    cd: [0.02, 0.031, 0.065]
  propulsion:
    sea_level_thrust: 240000.0
    tsfc_per_hour: 0.06
missions:
  bad:
    parts:
      - segment: speed_change
        target:
          time: 60.0
"#;
        let file = mission_file_from_yaml(yaml).unwrap();
        let err = build_mission_setup(&file, "bad", &VariableSet::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Segment(flight_segments::SegmentError::AmbiguousTarget(_))
        ));
    }
}
