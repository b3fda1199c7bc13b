//! Parameter declarations and their resolution into concrete SI values.
//!
//! Every numeric field of a mission definition may be declared as a hard
//! value, a named external variable, or a contextual variable whose full
//! name depends on where in the mission tree the declaration is used.
//! Resolution is pure: the same declaration in the same context always
//! yields the same result.

pub mod naming;
pub mod resolver;

pub use naming::NamingContext;
pub use resolver::{Resolved, ResolveError, VariableProvider, VariableSet, resolve};

use flight_core::units::{Unit, UnknownUnit};

/// A declared value, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSpec {
    /// Hard-coded number, optionally with a declared unit.
    Literal { value: f64, unit: Option<Unit> },
    /// Dimensionless text (engine setting names, altitude sentinels).
    Text(String),
    /// Named external variable supplied by the host environment.
    ///
    /// `negated` records a leading `-` on the declared name. The stored
    /// `default` stays unsigned; the sign is applied after substitution,
    /// never baked into the default itself.
    External {
        name: String,
        negated: bool,
        unit: Option<Unit>,
        default: Option<f64>,
    },
    /// Contextual variable: the qualified name is derived from the enclosing
    /// mission/route/phase identity plus either the parameter's own name
    /// (bare `~`) or the explicit suffix (`~name`).
    Contextual { suffix: Option<String> },
    /// Freeze-at-start marker, only meaningful inside targets.
    Constant,
}

impl ValueSpec {
    /// Build a plain literal with no declared unit (already SI).
    pub fn literal(value: f64) -> Self {
        ValueSpec::Literal { value, unit: None }
    }

    /// Build a literal carrying a declared unit.
    pub fn literal_in(value: f64, unit: Unit) -> Self {
        ValueSpec::Literal {
            value,
            unit: Some(unit),
        }
    }

    /// Parse the string form of a declaration.
    ///
    /// `constant` is the freeze marker, `~`/`~name` are contextual, names
    /// containing `:` reference external variables (with an optional leading
    /// `-` for negation), anything else passes through as text.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed == "constant" {
            return ValueSpec::Constant;
        }
        if let Some(suffix) = trimmed.strip_prefix('~') {
            let suffix = suffix.trim();
            return ValueSpec::Contextual {
                suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
            };
        }
        if let Some(name) = trimmed.strip_prefix('-') {
            if name.contains(':') {
                return ValueSpec::External {
                    name: name.to_string(),
                    negated: true,
                    unit: None,
                    default: None,
                };
            }
        }
        if trimmed.contains(':') {
            return ValueSpec::External {
                name: trimmed.to_string(),
                negated: false,
                unit: None,
                default: None,
            };
        }
        ValueSpec::Text(trimmed.to_string())
    }

    /// Attach a declared unit to an external or literal declaration.
    pub fn with_unit(mut self, parsed: Unit) -> Self {
        match &mut self {
            ValueSpec::Literal { unit, .. } | ValueSpec::External { unit, .. } => {
                *unit = Some(parsed);
            }
            _ => {}
        }
        self
    }

    /// Attach an unsigned default to an external declaration.
    pub fn with_default(mut self, value: f64) -> Self {
        if let ValueSpec::External { default, .. } = &mut self {
            *default = Some(value);
        }
        self
    }

    /// Attach a unit given by its declaration-file spelling.
    pub fn with_unit_named(self, name: &str) -> Result<Self, UnknownUnit> {
        Ok(self.with_unit(Unit::parse(name)?))
    }

    /// The external-variable registration this declaration asks the host
    /// for, if any: qualified name, declared unit, and the *unsigned*
    /// default. Used to publish solver inputs.
    pub fn external_request(
        &self,
        parameter: &str,
        context: &NamingContext,
    ) -> Option<VariableRequest> {
        match self {
            ValueSpec::External {
                name,
                unit,
                default,
                ..
            } => Some(VariableRequest {
                name: name.clone(),
                unit: *unit,
                default: *default,
            }),
            ValueSpec::Contextual { suffix } => Some(VariableRequest {
                name: context.qualify(suffix.as_deref().unwrap_or(parameter)),
                unit: None,
                default: None,
            }),
            _ => None,
        }
    }
}

/// External-variable registration view: what the host environment is asked
/// to supply for a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRequest {
    pub name: String,
    pub unit: Option<Unit>,
    pub default: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_forms_parse_into_the_right_variant() {
        assert_eq!(ValueSpec::from_text("constant"), ValueSpec::Constant);
        assert_eq!(
            ValueSpec::from_text("~"),
            ValueSpec::Contextual { suffix: None }
        );
        assert_eq!(
            ValueSpec::from_text("~thrust_rate"),
            ValueSpec::Contextual {
                suffix: Some("thrust_rate".to_string())
            }
        );
        assert_eq!(
            ValueSpec::from_text("data:payload:mass"),
            ValueSpec::External {
                name: "data:payload:mass".to_string(),
                negated: false,
                unit: None,
                default: None,
            }
        );
        assert_eq!(
            ValueSpec::from_text("-data:payload:mass"),
            ValueSpec::External {
                name: "data:payload:mass".to_string(),
                negated: true,
                unit: None,
                default: None,
            }
        );
        assert_eq!(
            ValueSpec::from_text("climb"),
            ValueSpec::Text("climb".to_string())
        );
    }

    #[test]
    fn external_request_keeps_defaults_unsigned() {
        let spec = ValueSpec::from_text("-data:descent:rate").with_default(125.0);
        let ctx = NamingContext::new("sizing");
        let request = spec.external_request("thrust_rate", &ctx).unwrap();
        assert_eq!(request.name, "data:descent:rate");
        assert_eq!(request.default, Some(125.0));
    }

    #[test]
    fn contextual_request_uses_parameter_name_when_bare() {
        let ctx = NamingContext::new("op").with_phase("climb");
        let spec = ValueSpec::from_text("~");
        let request = spec.external_request("thrust_rate", &ctx).unwrap();
        assert_eq!(request.name, "data:mission:op:climb:thrust_rate");
    }
}
