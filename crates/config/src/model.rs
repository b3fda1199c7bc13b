//! Serde model of the declarative mission tree.

use std::collections::BTreeMap;

use serde::Deserialize;

use flight_vars::ValueSpec;

use crate::ConfigError;

/// A declared value as written in the mission file: a bare number, a string
/// form (`data:...`, `-data:...`, `~suffix`, `constant`, sentinel or
/// enumeration text), or a mapping with `value`/`unit`/`default`.
///
/// A bare `~` is YAML null, which declares a contextual variable named
/// after the parameter itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValueDecl {
    Number(f64),
    Text(String),
    Detailed {
        value: ScalarDecl,
        #[serde(default)]
        unit: Option<String>,
        #[serde(default)]
        default: Option<f64>,
    },
    Contextual,
}

/// Scalar inside the detailed mapping form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalarDecl {
    Number(f64),
    Text(String),
}

impl ValueDecl {
    /// Convert the raw declaration into the typed variant model.
    pub fn to_spec(&self) -> Result<ValueSpec, ConfigError> {
        match self {
            ValueDecl::Number(value) => Ok(ValueSpec::literal(*value)),
            ValueDecl::Text(text) => Ok(ValueSpec::from_text(text)),
            ValueDecl::Detailed {
                value,
                unit,
                default,
            } => {
                let mut spec = match value {
                    ScalarDecl::Number(number) => ValueSpec::literal(*number),
                    ScalarDecl::Text(text) => ValueSpec::from_text(text),
                };
                if let Some(unit) = unit {
                    spec = spec.with_unit_named(unit)?;
                }
                if let Some(default) = default {
                    spec = spec.with_default(*default);
                }
                Ok(spec)
            }
            ValueDecl::Contextual => Ok(ValueSpec::Contextual { suffix: None }),
        }
    }
}

/// Top-level mission definition document.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionFile {
    #[serde(default)]
    pub aircraft: Option<AircraftConfig>,
    /// Start state: parameter name to declared value.
    #[serde(default)]
    pub start: BTreeMap<String, ValueDecl>,
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseConfig>,
    #[serde(default)]
    pub routes: BTreeMap<String, RouteConfig>,
    #[serde(default)]
    pub missions: BTreeMap<String, MissionConfig>,
}

/// Aircraft-level collaborators declared alongside the mission.
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftConfig {
    /// Wing reference area (m²).
    pub reference_area: f64,
    pub polar: PolarConfig,
    pub propulsion: PropulsionConfig,
}

/// Polar declaration: explicit vectors, or a shared external prefix whose
/// `:CL`/`:CD` suffixed names the variable provider supplies.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PolarConfig {
    Vectors { cl: Vec<f64>, cd: Vec<f64> },
    External { from: String },
}

/// Turbofan model parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PropulsionConfig {
    /// Total sea-level static thrust (N).
    pub sea_level_thrust: f64,
    /// Thrust-specific fuel consumption (kg/(N·h)).
    pub tsfc_per_hour: f64,
}

/// A named group of segments.
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseConfig {
    pub parts: Vec<SegmentConfig>,
}

/// A route: overall range plus ordered parts.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub range: ValueDecl,
    pub parts: Vec<RoutePartConfig>,
}

/// Route part: a reference to a shared phase template, or an inline segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoutePartConfig {
    PhaseRef { phase: String },
    Segment(SegmentConfig),
}

/// Mission: ordered parts referencing phases and routes by name.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionConfig {
    pub parts: Vec<MissionPartConfig>,
}

/// Mission part: phase reference, route reference, or inline segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MissionPartConfig {
    PhaseRef { phase: String },
    RouteRef { route: String },
    Segment(SegmentConfig),
}

/// Fields shared by every maneuver type.
#[derive(Debug, Clone, Deserialize)]
pub struct CommonSegmentConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target: BTreeMap<String, ValueDecl>,
    #[serde(default)]
    pub engine_setting: Option<String>,
    #[serde(default)]
    pub thrust_rate: Option<ValueDecl>,
    /// Integration step override (s).
    #[serde(default)]
    pub time_step: Option<f64>,
}

/// Cruise-specific fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CruiseConfig {
    #[serde(flatten)]
    pub common: CommonSegmentConfig,
    #[serde(default)]
    pub climb_engine_setting: Option<String>,
    #[serde(default)]
    pub climb_thrust_rate: Option<ValueDecl>,
}

/// Taxi-specific fields.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxiConfig {
    #[serde(flatten)]
    pub common: CommonSegmentConfig,
    #[serde(default)]
    pub true_airspeed: Option<ValueDecl>,
}

/// Transition-specific fields.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionConfig {
    #[serde(flatten)]
    pub common: CommonSegmentConfig,
    #[serde(default)]
    pub mass_ratio: Option<ValueDecl>,
    #[serde(default)]
    pub reserve_mass_ratio: Option<ValueDecl>,
}

/// Segment declaration, dispatched on the `segment` type tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "segment", rename_all = "snake_case")]
pub enum SegmentConfig {
    SpeedChange(CommonSegmentConfig),
    AltitudeChange(CommonSegmentConfig),
    Cruise(CruiseConfig),
    OptimalCruise(CommonSegmentConfig),
    Holding(CommonSegmentConfig),
    Taxi(TaxiConfig),
    Transition(TransitionConfig),
}

impl SegmentConfig {
    pub fn common(&self) -> &CommonSegmentConfig {
        match self {
            SegmentConfig::SpeedChange(common)
            | SegmentConfig::AltitudeChange(common)
            | SegmentConfig::OptimalCruise(common)
            | SegmentConfig::Holding(common) => common,
            SegmentConfig::Cruise(cruise) => &cruise.common,
            SegmentConfig::Taxi(taxi) => &taxi.common,
            SegmentConfig::Transition(transition) => &transition.common,
        }
    }

    /// Reported name: the declared one, or the maneuver type.
    pub fn name(&self) -> String {
        if let Some(name) = &self.common().name {
            return name.clone();
        }
        match self {
            SegmentConfig::SpeedChange(_) => "speed_change",
            SegmentConfig::AltitudeChange(_) => "altitude_change",
            SegmentConfig::Cruise(_) => "cruise",
            SegmentConfig::OptimalCruise(_) => "optimal_cruise",
            SegmentConfig::Holding(_) => "holding",
            SegmentConfig::Taxi(_) => "taxi",
            SegmentConfig::Transition(_) => "transition",
        }
        .to_string()
    }
}
