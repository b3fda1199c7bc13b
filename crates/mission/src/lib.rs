//! Mission composition: ordered sequences of segments grouped into phases,
//! routes with an overall range, and the top-level mission.
//!
//! Each part consumes the trailing flight point of its predecessor and the
//! parent concatenates the produced point sequences, keeping time and
//! ground distance continuous across boundaries.

use thiserror::Error;
use tracing::{debug, info};

use flight_core::{FlightPoint, Trajectory};
use flight_segments::{AircraftModel, FlightSegment, SegmentError};

/// Range-closure tolerance for routes (m).
const RANGE_TOLERANCE: f64 = 500.0;
/// Fixed-point passes allowed for route range closure.
const RANGE_PASSES: usize = 4;

/// A segment with the name it carries in reported trajectories.
#[derive(Debug, Clone)]
pub struct NamedSegment {
    pub name: String,
    pub segment: FlightSegment,
}

impl NamedSegment {
    pub fn new(name: impl Into<String>, segment: FlightSegment) -> Self {
        Self {
            name: name.into(),
            segment,
        }
    }
}

/// Ordered group of segments flown back to back.
///
/// Phases are pure templates: they carry no reference to the mission or
/// route using them, so the same phase can be reused under several parents.
#[derive(Debug, Clone)]
pub struct Phase {
    pub id: String,
    pub segments: Vec<NamedSegment>,
}

/// One part of a route: a phase or a bare segment.
#[derive(Debug, Clone)]
pub enum RoutePart {
    Phase(Phase),
    Segment(NamedSegment),
}

/// Ordered parts with an overall range target distributed onto the single
/// distance-absorbing (cruise-family) part.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    /// Overall ground distance to cover (m).
    pub range: f64,
    pub parts: Vec<RoutePart>,
}

/// One part of a mission: a route, a phase, or a bare segment.
#[derive(Debug, Clone)]
pub enum MissionPart {
    Route(Route),
    Phase(Phase),
    Segment(NamedSegment),
}

/// Top-level container binding the mission identifier.
#[derive(Debug, Clone)]
pub struct Mission {
    pub id: String,
    pub parts: Vec<MissionPart>,
}

/// Failures of mission composition. A failing segment aborts the whole
/// computation; no partial trajectory is returned.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("part '{part}' failed: {source}")]
    Part {
        part: String,
        #[source]
        source: SegmentError,
    },
    #[error("route '{route}' must contain exactly one distance-absorbing part, found {count}")]
    CruiseParts { route: String, count: usize },
    #[error("route '{route}': non-cruise parts already exceed the declared range")]
    RangeExceeded { route: String },
    #[error("route '{route}': range closure did not converge (residual {residual:.0} m)")]
    RangeNotConverged { route: String, residual: f64 },
}

/// Outcome of a mission computation.
#[derive(Debug)]
pub struct MissionResult {
    pub mission_id: String,
    pub trajectory: Trajectory,
}

impl MissionResult {
    /// Fuel consumed between the first and last point (kg).
    pub fn block_fuel(&self) -> f64 {
        match (self.trajectory.first(), self.trajectory.last()) {
            (Some(first), Some(last)) => first.mass - last.mass,
            _ => 0.0,
        }
    }

    /// Elapsed time between the first and last point (s).
    pub fn block_time(&self) -> f64 {
        match (self.trajectory.first(), self.trajectory.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Ground distance covered (m).
    pub fn total_distance(&self) -> f64 {
        match (self.trajectory.first(), self.trajectory.last()) {
            (Some(first), Some(last)) => last.ground_distance - first.ground_distance,
            _ => 0.0,
        }
    }
}

impl Phase {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            segments: Vec::new(),
        }
    }

    pub fn with_segment(mut self, segment: NamedSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, MissionError> {
        let mut trajectory = Trajectory::new();
        let mut current = start.clone();
        for named in &self.segments {
            debug!(phase = %self.id, segment = %named.name, "computing segment");
            let mut produced =
                named
                    .segment
                    .compute(&current, model)
                    .map_err(|source| MissionError::Part {
                        part: format!("{}:{}", self.id, named.name),
                        source,
                    })?;
            produced.label_segment(&named.name);
            if let Some(last) = produced.last() {
                current = last.clone();
            }
            if trajectory.is_empty() {
                trajectory = produced;
            } else {
                trajectory.append(produced);
            }
        }
        trajectory.label_phase(&self.id);
        Ok(trajectory)
    }
}

impl Route {
    pub fn new(id: impl Into<String>, range: f64) -> Self {
        Self {
            id: id.into(),
            range,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: RoutePart) -> Self {
        self.parts.push(part);
        self
    }

    fn absorbing_count(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                RoutePart::Segment(named) => {
                    usize::from(named.segment.absorbs_route_distance())
                }
                RoutePart::Phase(phase) => phase
                    .segments
                    .iter()
                    .filter(|named| named.segment.absorbs_route_distance())
                    .count(),
            })
            .sum()
    }

    /// Run all parts once with the distance-absorbing part targeting
    /// `cruise_distance`.
    fn run_once(
        &self,
        start: &FlightPoint,
        cruise_distance: f64,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, MissionError> {
        let mut trajectory = Trajectory::new();
        let mut current = start.clone();
        for part in &self.parts {
            let produced = match part {
                RoutePart::Phase(phase) => {
                    let mut phase = phase.clone();
                    for named in &mut phase.segments {
                        if named.segment.absorbs_route_distance() {
                            named.segment.set_distance_target(cruise_distance);
                        }
                    }
                    phase.compute(&current, model)?
                }
                RoutePart::Segment(named) => {
                    let mut segment = named.segment.clone();
                    if segment.absorbs_route_distance() {
                        segment.set_distance_target(cruise_distance);
                    }
                    let mut produced =
                        segment
                            .compute(&current, model)
                            .map_err(|source| MissionError::Part {
                                part: format!("{}:{}", self.id, named.name),
                                source,
                            })?;
                    produced.label_segment(&named.name);
                    produced.label_phase(&self.id);
                    produced
                }
            };
            if let Some(last) = produced.last() {
                current = last.clone();
            }
            if trajectory.is_empty() {
                trajectory = produced;
            } else {
                trajectory.append(produced);
            }
        }
        Ok(trajectory)
    }

    /// Compute the route, closing the overall range onto the cruise part.
    ///
    /// The cruise distance target is `range` minus what the other parts
    /// fly; since their distances shift as the cruise start mass moves, a
    /// bounded fixed-point loop refines the split until the total closes
    /// within tolerance.
    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, MissionError> {
        let count = self.absorbing_count();
        if count != 1 {
            return Err(MissionError::CruiseParts {
                route: self.id.clone(),
                count,
            });
        }

        let mut cruise_distance = self.range;
        let mut residual = f64::INFINITY;
        for pass in 0..RANGE_PASSES {
            let trajectory = self.run_once(start, cruise_distance, model)?;
            let flown = trajectory.last().expect("non-empty").ground_distance
                - start.ground_distance;
            residual = self.range - flown;
            debug!(route = %self.id, pass, cruise_distance, residual, "range closure pass");
            if residual.abs() <= RANGE_TOLERANCE {
                return Ok(trajectory);
            }
            cruise_distance += residual;
            if cruise_distance <= 0.0 {
                return Err(MissionError::RangeExceeded {
                    route: self.id.clone(),
                });
            }
        }
        Err(MissionError::RangeNotConverged {
            route: self.id.clone(),
            residual,
        })
    }
}

impl Mission {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: MissionPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Run every part in order and concatenate the produced trajectories.
    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<MissionResult, MissionError> {
        info!(mission = %self.id, parts = self.parts.len(), "computing mission");
        let mut trajectory = Trajectory::new();
        let mut current = start.clone();
        for part in &self.parts {
            let produced = match part {
                MissionPart::Route(route) => route.compute(&current, model)?,
                MissionPart::Phase(phase) => phase.compute(&current, model)?,
                MissionPart::Segment(named) => {
                    let mut produced = named
                        .segment
                        .compute(&current, model)
                        .map_err(|source| MissionError::Part {
                            part: named.name.clone(),
                            source,
                        })?;
                    produced.label_segment(&named.name);
                    produced
                }
            };
            if let Some(last) = produced.last() {
                current = last.clone();
            }
            if trajectory.is_empty() {
                trajectory = produced;
            } else {
                trajectory.append(produced);
            }
        }
        info!(
            mission = %self.id,
            points = trajectory.len(),
            "mission computed"
        );
        Ok(MissionResult {
            mission_id: self.id.clone(),
            trajectory,
        })
    }
}
