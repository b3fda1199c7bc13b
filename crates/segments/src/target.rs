//! Target specification: the stopping conditions of a segment.

use thiserror::Error;

use flight_core::{FlightPoint, Parameter};

/// How a declared target value relates to the start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Reach this value.
    Absolute,
    /// Reach start value plus this delta (for mass: start minus the delta,
    /// which is the amount consumed).
    Relative,
    /// Freeze at the start value, enforced at every step.
    Constant,
}

/// Sentinel altitude goals resolved by a root search during simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimalKind {
    /// The altitude maximizing lift-to-drag at current mass.
    Altitude,
    /// Same, rounded down to the nearest flight level (1000 ft multiple).
    FlightLevel,
}

/// One declared target constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEntry {
    pub parameter: Parameter,
    pub mode: TargetMode,
    pub value: f64,
}

impl TargetEntry {
    /// The value `parameter` must reach, given the segment's start point.
    pub fn effective_value(&self, start: &FlightPoint) -> f64 {
        match self.mode {
            TargetMode::Absolute => self.value,
            TargetMode::Relative => {
                if self.parameter == Parameter::Mass {
                    // Loss convention: a relative mass target is the mass
                    // consumed, so a negative delta ends heavier.
                    start.get(self.parameter) - self.value
                } else {
                    start.get(self.parameter) + self.value
                }
            }
            TargetMode::Constant => start.get(self.parameter),
        }
    }
}

/// Errors raised while parsing a target declaration.
#[derive(Debug, Clone, Error)]
pub enum TargetError {
    #[error("unknown target parameter '{0}'")]
    UnknownParameter(String),
    #[error("target parameter '{parameter}' cannot take text value '{text}'")]
    InvalidText { parameter: String, text: String },
    #[error("target declares '{0}' twice")]
    DuplicateParameter(String),
}

/// Parsed target: a set of (parameter, mode, value) constraints plus an
/// optional sentinel altitude goal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    entries: Vec<TargetEntry>,
    optimal_altitude: Option<OptimalKind>,
}

/// Raw value accepted by [`Target::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawTargetValue {
    Number(f64),
    Text(String),
    Constant,
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `(key, value)` declarations into a target.
    ///
    /// A `delta_` key prefix selects the relative mode. `ground_distance`
    /// and `time` are always relative, prefix or not. The literal
    /// `constant` freezes the parameter at its start value. The altitude
    /// sentinels `optimal_altitude` and `optimal_flight_level` defer the
    /// goal to a root search at simulation time.
    pub fn parse<K: AsRef<str>>(raw: &[(K, RawTargetValue)]) -> Result<Self, TargetError> {
        let mut target = Target::new();
        for (key, value) in raw {
            let key = key.as_ref();
            let (stripped, prefixed_relative) = match key.strip_prefix("delta_") {
                Some(rest) => (rest, true),
                None => (key, false),
            };
            let parameter = Parameter::from_key(stripped)
                .ok_or_else(|| TargetError::UnknownParameter(key.to_string()))?;
            if target.entry(parameter).is_some()
                || (parameter == Parameter::Altitude && target.optimal_altitude.is_some())
            {
                return Err(TargetError::DuplicateParameter(stripped.to_string()));
            }
            let always_relative =
                matches!(parameter, Parameter::GroundDistance | Parameter::Time);
            match value {
                RawTargetValue::Number(number) => {
                    let mode = if prefixed_relative || always_relative {
                        TargetMode::Relative
                    } else {
                        TargetMode::Absolute
                    };
                    target.entries.push(TargetEntry {
                        parameter,
                        mode,
                        value: *number,
                    });
                }
                RawTargetValue::Constant => {
                    target.entries.push(TargetEntry {
                        parameter,
                        mode: TargetMode::Constant,
                        value: 0.0,
                    });
                }
                RawTargetValue::Text(text) => match (parameter, text.as_str()) {
                    (Parameter::Altitude, "optimal_altitude") => {
                        target.optimal_altitude = Some(OptimalKind::Altitude);
                    }
                    (Parameter::Altitude, "optimal_flight_level") => {
                        target.optimal_altitude = Some(OptimalKind::FlightLevel);
                    }
                    _ => {
                        return Err(TargetError::InvalidText {
                            parameter: key.to_string(),
                            text: text.clone(),
                        });
                    }
                },
            }
        }
        Ok(target)
    }

    /// Add a constraint programmatically.
    pub fn with(mut self, parameter: Parameter, mode: TargetMode, value: f64) -> Self {
        self.entries.push(TargetEntry {
            parameter,
            mode,
            value,
        });
        self
    }

    /// Add a freeze-at-start constraint.
    pub fn with_constant(self, parameter: Parameter) -> Self {
        self.with(parameter, TargetMode::Constant, 0.0)
    }

    /// Request a sentinel altitude goal.
    pub fn with_optimal_altitude(mut self, kind: OptimalKind) -> Self {
        self.optimal_altitude = Some(kind);
        self
    }

    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    pub fn entry(&self, parameter: Parameter) -> Option<&TargetEntry> {
        self.entries.iter().find(|e| e.parameter == parameter)
    }

    pub fn entry_mut(&mut self, parameter: Parameter) -> Option<&mut TargetEntry> {
        self.entries.iter_mut().find(|e| e.parameter == parameter)
    }

    pub fn optimal_altitude(&self) -> Option<OptimalKind> {
        self.optimal_altitude
    }

    /// Parameters declared with the constant (freeze) mode.
    pub fn frozen(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.entries
            .iter()
            .filter(|e| e.mode == TargetMode::Constant)
            .map(|e| e.parameter)
    }

    /// Signed gap from `current` to the effective target value of
    /// `parameter`, or `None` if the parameter is not constrained.
    pub fn remaining(
        &self,
        current: &FlightPoint,
        start: &FlightPoint,
        parameter: Parameter,
    ) -> Option<f64> {
        self.entry(parameter)
            .map(|entry| entry.effective_value(start) - current.get(parameter))
    }

    /// Whether every declared, non-frozen constraint is satisfied within
    /// its parameter's tolerance. Constraints are AND-combined.
    pub fn is_reached(&self, current: &FlightPoint, start: &FlightPoint) -> bool {
        self.entries
            .iter()
            .filter(|entry| entry.mode != TargetMode::Constant)
            .all(|entry| {
                let gap = entry.effective_value(start) - current.get(entry.parameter);
                gap.abs() <= tolerance(entry.parameter)
            })
    }
}

/// Numeric tolerance for deciding a parameter has reached its target.
pub fn tolerance(parameter: Parameter) -> f64 {
    match parameter {
        Parameter::Altitude => 0.1,
        Parameter::TrueAirspeed | Parameter::EquivalentAirspeed => 0.01,
        Parameter::Mach => 1.0e-4,
        Parameter::Mass => 0.1,
        Parameter::Time => 0.01,
        Parameter::GroundDistance => 0.5,
        Parameter::ThrustRate => 1.0e-3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_point() -> FlightPoint {
        FlightPoint {
            time: 100.0,
            ground_distance: 50_000.0,
            altitude: 8_000.0,
            mass: 60_000.0,
            ..Default::default()
        }
    }

    #[test]
    fn ground_distance_and_time_are_always_relative() {
        let target = Target::parse(&[
            ("ground_distance", RawTargetValue::Number(3_704_000.0)),
            ("time", RawTargetValue::Number(60.0)),
        ])
        .unwrap();
        let start = start_point();
        let distance = target.entry(Parameter::GroundDistance).unwrap();
        assert_eq!(distance.mode, TargetMode::Relative);
        assert_eq!(distance.effective_value(&start), 50_000.0 + 3_704_000.0);
        let time = target.entry(Parameter::Time).unwrap();
        assert_eq!(time.effective_value(&start), 160.0);
    }

    #[test]
    fn delta_prefix_selects_relative_mode() {
        let target = Target::parse(&[
            ("delta_altitude", RawTargetValue::Number(500.0)),
            ("mach", RawTargetValue::Number(0.78)),
        ])
        .unwrap();
        let start = start_point();
        assert_eq!(
            target.entry(Parameter::Altitude).unwrap().effective_value(&start),
            8_500.0
        );
        assert_eq!(
            target.entry(Parameter::Mach).unwrap().mode,
            TargetMode::Absolute
        );
    }

    #[test]
    fn relative_mass_uses_the_loss_convention() {
        let target =
            Target::parse(&[("delta_mass", RawTargetValue::Number(-80.0))]).unwrap();
        let start = start_point();
        assert_eq!(
            target.entry(Parameter::Mass).unwrap().effective_value(&start),
            60_080.0
        );
    }

    #[test]
    fn constant_freezes_at_start() {
        let target = Target::parse(&[
            ("equivalent_airspeed", RawTargetValue::Constant),
            ("altitude", RawTargetValue::Number(10_668.0)),
        ])
        .unwrap();
        let start = start_point();
        let frozen: Vec<Parameter> = target.frozen().collect();
        assert_eq!(frozen, vec![Parameter::EquivalentAirspeed]);
        // Frozen parameters do not participate in reachability.
        let mut current = start.clone();
        current.altitude = 10_668.0;
        current.equivalent_airspeed = 999.0;
        assert!(target.is_reached(&current, &start));
    }

    #[test]
    fn altitude_sentinels_parse_into_optimal_goals() {
        let target = Target::parse(&[(
            "altitude",
            RawTargetValue::Text("optimal_flight_level".to_string()),
        )])
        .unwrap();
        assert_eq!(target.optimal_altitude(), Some(OptimalKind::FlightLevel));
        assert!(target.entry(Parameter::Altitude).is_none());
    }

    #[test]
    fn unknown_keys_and_bad_text_are_rejected() {
        assert!(matches!(
            Target::parse(&[("bank_angle", RawTargetValue::Number(1.0))]),
            Err(TargetError::UnknownParameter(_))
        ));
        assert!(matches!(
            Target::parse(&[("mach", RawTargetValue::Text("fast".to_string()))]),
            Err(TargetError::InvalidText { .. })
        ));
        assert!(matches!(
            Target::parse(&[
                ("altitude", RawTargetValue::Number(1.0)),
                ("delta_altitude", RawTargetValue::Number(2.0)),
            ]),
            Err(TargetError::DuplicateParameter(_))
        ));
    }
}
