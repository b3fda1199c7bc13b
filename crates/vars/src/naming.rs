//! Qualified naming of contextual variables.

use std::fmt;

/// Identity chain of the construct a declaration is used under.
///
/// Phases and routes are pure templates with no back-pointer to a mission;
/// the context is built top-down at use time, so the same declaration
/// resolves to distinct names under distinct parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    mission: String,
    route: Option<String>,
    phase: Option<String>,
}

impl NamingContext {
    pub fn new(mission: impl Into<String>) -> Self {
        Self {
            mission: mission.into(),
            route: None,
            phase: None,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    /// Fully qualified external name for `suffix` under this context:
    /// `data:mission:<mission>[:<route>][:<phase>]:<suffix>`.
    pub fn qualify(&self, suffix: &str) -> String {
        let mut name = format!("data:mission:{}", self.mission);
        if let Some(route) = &self.route {
            name.push(':');
            name.push_str(route);
        }
        if let Some(phase) = &self.phase {
            name.push(':');
            name.push_str(phase);
        }
        name.push(':');
        name.push_str(suffix);
        name
    }
}

impl fmt::Display for NamingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualify("*"))
    }
}
