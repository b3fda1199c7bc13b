//! Resolution of declarations into concrete SI values.

use std::collections::HashMap;

use thiserror::Error;

use flight_core::units::{Dimension, Unit, UnknownUnit};

use crate::{NamingContext, ValueSpec};

/// Host environment collaborator supplying external variable values,
/// already converted to SI.
pub trait VariableProvider {
    fn value(&self, name: &str) -> Option<f64>;

    /// Vector-valued variables (e.g. polar CL/CD tables). Providers without
    /// vector support report none.
    fn vector(&self, _name: &str) -> Option<Vec<f64>> {
        None
    }
}

/// In-memory provider used by the configuration layer, the CLI, and tests.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    values: HashMap<String, f64>,
    vectors: HashMap<String, Vec<f64>>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn insert_vector(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.vectors.insert(name.into(), values);
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.vectors.is_empty()
    }
}

impl VariableProvider for VariableSet {
    fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    fn vector(&self, name: &str) -> Option<Vec<f64>> {
        self.vectors.get(name).cloned()
    }
}

/// Outcome of resolving a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Concrete SI value.
    Value(f64),
    /// Dimensionless text passed through unconverted.
    Text(String),
    /// Freeze-at-start marker.
    Constant,
}

impl Resolved {
    /// The numeric value, if this resolution produced one.
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Resolved::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Configuration errors raised at resolution time, before any simulation.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("variable '{name}': declared unit '{unit}' is not a {expected:?} unit")]
    DimensionMismatch {
        name: String,
        unit: Unit,
        expected: Dimension,
    },
    #[error("variable '{0}' has no input value and no declared default")]
    Unresolved(String),
    #[error("parameter '{parameter}' expects a number, got text '{text}'")]
    ExpectedNumber { parameter: String, text: String },
    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnit),
}

/// Resolve a declaration for a parameter of the given canonical dimension.
///
/// Pure and side-effect-free: two calls with identical inputs return
/// identical results. Dimensional inconsistencies surface here, never
/// during simulation.
pub fn resolve(
    spec: &ValueSpec,
    parameter: &str,
    dimension: Dimension,
    context: &NamingContext,
    provider: &dyn VariableProvider,
) -> Result<Resolved, ResolveError> {
    match spec {
        ValueSpec::Literal { value, unit } => {
            let value = match unit {
                Some(unit) => {
                    check_dimension(parameter, *unit, dimension)?;
                    unit.to_si(*value)
                }
                None => *value,
            };
            Ok(Resolved::Value(value))
        }
        ValueSpec::Text(text) => Ok(Resolved::Text(text.clone())),
        ValueSpec::Constant => Ok(Resolved::Constant),
        ValueSpec::External {
            name,
            negated,
            unit,
            default,
        } => {
            if let Some(unit) = unit {
                check_dimension(name, *unit, dimension)?;
            }
            let sign = if *negated { -1.0 } else { 1.0 };
            match provider.value(name) {
                Some(value) => Ok(Resolved::Value(sign * value)),
                // The declared default is unsigned; the sign is applied at
                // the point of use, after substitution.
                None => match default {
                    Some(default) => {
                        let si = unit.map_or(*default, |u| u.to_si(*default));
                        Ok(Resolved::Value(sign * si))
                    }
                    None => Err(ResolveError::Unresolved(name.clone())),
                },
            }
        }
        ValueSpec::Contextual { suffix } => {
            let name = context.qualify(suffix.as_deref().unwrap_or(parameter));
            provider
                .value(&name)
                .map(Resolved::Value)
                .ok_or(ResolveError::Unresolved(name))
        }
    }
}

/// Resolve a declaration that must produce a number.
pub fn resolve_value(
    spec: &ValueSpec,
    parameter: &str,
    dimension: Dimension,
    context: &NamingContext,
    provider: &dyn VariableProvider,
) -> Result<f64, ResolveError> {
    match resolve(spec, parameter, dimension, context, provider)? {
        Resolved::Value(v) => Ok(v),
        Resolved::Text(text) => Err(ResolveError::ExpectedNumber {
            parameter: parameter.to_string(),
            text,
        }),
        Resolved::Constant => Err(ResolveError::ExpectedNumber {
            parameter: parameter.to_string(),
            text: "constant".to_string(),
        }),
    }
}

fn check_dimension(name: &str, unit: Unit, expected: Dimension) -> Result<(), ResolveError> {
    if unit.dimension() == expected {
        Ok(())
    } else {
        Err(ResolveError::DimensionMismatch {
            name: name.to_string(),
            unit,
            expected,
        })
    }
}
