//! Declarative mission-definition tree and its conversion into runtime
//! mission structures.
//!
//! The simulation crates never read files; this crate owns the serialized
//! form (a YAML or TOML document) and resolves every declaration through
//! the typed contracts of `flight_vars` before any simulation starts.

mod builder;
mod model;

pub use builder::{MissionSetup, build_mission_setup};
pub use model::{
    AircraftConfig, CommonSegmentConfig, CruiseConfig, MissionConfig, MissionFile,
    MissionPartConfig, PhaseConfig, PolarConfig, PropulsionConfig, RouteConfig, RoutePartConfig,
    SegmentConfig, TaxiConfig, TransitionConfig, ValueDecl,
};

use std::fs::File;
use std::path::Path;

use thiserror::Error;

use flight_core::point::UnknownEngineSetting;
use flight_core::units::UnknownUnit;
use flight_polar::PolarError;
use flight_segments::{SegmentError, TargetError};
use flight_vars::ResolveError;

/// Errors raised while loading or building a mission definition. All are
/// configuration errors: they surface before any simulation step.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read mission file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown mission '{0}'")]
    UnknownMission(String),
    #[error("unknown phase '{0}'")]
    UnknownPhase(String),
    #[error("unknown route '{0}'")]
    UnknownRoute(String),
    #[error("mission file declares no aircraft section")]
    MissingAircraft,
    #[error("polar vectors '{0}:CL'/'{0}:CD' not supplied by the variable provider")]
    MissingPolarVectors(String),
    #[error("unknown start parameter '{0}'")]
    UnknownStartParameter(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[error(transparent)]
    Polar(#[from] PolarError),
    #[error(transparent)]
    EngineSetting(#[from] UnknownEngineSetting),
    #[error(transparent)]
    Unit(#[from] UnknownUnit),
}

/// Load a mission definition from a YAML file, or TOML when the extension
/// says so.
pub fn load_mission_file<P: AsRef<Path>>(path: P) -> Result<MissionFile, ConfigError> {
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Parse a mission definition from YAML text.
pub fn mission_file_from_yaml(text: &str) -> Result<MissionFile, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}
