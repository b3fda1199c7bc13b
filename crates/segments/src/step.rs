//! Shared stepping machinery: aerodynamic state completion, thrust
//! application, exact target landing, and the optimal-altitude search.

use tracing::{debug, trace};

use flight_core::atmosphere::{self, Atmosphere};
use flight_core::constants::{FOOT, G0};
use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind};

use crate::{AircraftModel, SegmentError};

/// Hard bound on steps per segment run; exceeding it means the target is
/// not being approached.
pub(crate) const MAX_STEPS: usize = 50_000;

/// Speeds below this are treated as static for aerodynamic purposes.
const MIN_AERO_SPEED: f64 = 1.0;

/// A speed representation held fixed during a segment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeldSpeed {
    pub kind: SpeedKind,
    pub value: f64,
}

impl HeldSpeed {
    pub fn capture(point: &FlightPoint, kind: SpeedKind) -> Self {
        let value = match kind {
            SpeedKind::Mach => point.mach,
            SpeedKind::TrueAirspeed => point.true_airspeed,
            SpeedKind::EquivalentAirspeed => point.equivalent_airspeed,
        };
        Self { kind, value }
    }

    /// Re-impose the held value on a point and rederive the other
    /// representations at the point's altitude.
    pub fn impose(&self, point: &mut FlightPoint) {
        match self.kind {
            SpeedKind::Mach => point.mach = self.value,
            SpeedKind::TrueAirspeed => point.true_airspeed = self.value,
            SpeedKind::EquivalentAirspeed => point.equivalent_airspeed = self.value,
        }
        point.complete_speeds(self.kind);
    }

    /// True airspeed implied by the held value at an arbitrary altitude.
    pub fn tas_at(&self, altitude: f64) -> f64 {
        let atm = Atmosphere::at(altitude);
        match self.kind {
            SpeedKind::Mach => atmosphere::tas_from_mach(self.value, &atm),
            SpeedKind::TrueAirspeed => self.value,
            SpeedKind::EquivalentAirspeed => atmosphere::tas_from_eas(self.value, &atm),
        }
    }
}

/// Fill in CL, CD and drag from the lift-equals-weight balance at the
/// point's current altitude and speed.
pub(crate) fn complete_aero(point: &mut FlightPoint, model: &AircraftModel<'_>) {
    if point.true_airspeed < MIN_AERO_SPEED {
        point.cl = 0.0;
        point.cd = 0.0;
        point.drag = 0.0;
        return;
    }
    let atm = Atmosphere::at(point.altitude);
    let dynamic_pressure = 0.5 * atm.density * point.true_airspeed * point.true_airspeed;
    point.cl = point.mass * G0 / (dynamic_pressure * model.reference_area);
    point.cd = model.polar.drag_coefficient(point.cl);
    point.drag = dynamic_pressure * model.reference_area * point.cd;
}

/// Apply a manual thrust rate; returns the fuel flow (kg/s).
pub(crate) fn manual_thrust(
    point: &mut FlightPoint,
    model: &AircraftModel<'_>,
    setting: EngineSetting,
    thrust_rate: f64,
) -> f64 {
    let (thrust, fuel_flow) = model
        .propulsion
        .thrust_and_fuel_flow(point, setting, thrust_rate);
    point.thrust = thrust;
    point.thrust_rate = thrust_rate;
    point.engine_setting = Some(setting);
    fuel_flow
}

/// Regulate thrust to match a required value by bisecting the thrust rate
/// against the propulsion collaborator; returns the fuel flow (kg/s).
///
/// Assumes thrust is monotone non-decreasing in the rate, which any sane
/// model satisfies.
pub(crate) fn regulated_thrust(
    point: &mut FlightPoint,
    model: &AircraftModel<'_>,
    setting: EngineSetting,
    required: f64,
) -> Result<f64, SegmentError> {
    if required <= 0.0 {
        return Ok(manual_thrust(point, model, setting, 0.0));
    }
    let (max_thrust, _) = model.propulsion.thrust_and_fuel_flow(point, setting, 1.0);
    if max_thrust < required {
        return Err(SegmentError::TargetUnreachable(format!(
            "required thrust {required:.0} N exceeds available {max_thrust:.0} N \
             at altitude {:.0} m",
            point.altitude
        )));
    }
    let (mut low, mut high) = (0.0_f64, 1.0_f64);
    for _ in 0..48 {
        let mid = 0.5 * (low + high);
        let (thrust, _) = model.propulsion.thrust_and_fuel_flow(point, setting, mid);
        if thrust < required {
            low = mid;
        } else {
            high = mid;
        }
        if (high - low) * max_thrust < 0.05 {
            break;
        }
    }
    let rate = 0.5 * (low + high);
    Ok(manual_thrust(point, model, setting, rate))
}

/// Linear interpolation between two computed points so the trajectory lands
/// exactly on the goal value of the terminating parameter.
pub(crate) fn interpolate_to(
    previous: &FlightPoint,
    next: &FlightPoint,
    parameter: Parameter,
    goal: f64,
) -> FlightPoint {
    let span = next.get(parameter) - previous.get(parameter);
    let frac = if span.abs() < f64::EPSILON {
        1.0
    } else {
        ((goal - previous.get(parameter)) / span).clamp(0.0, 1.0)
    };
    let lerp = |a: f64, b: f64| a + frac * (b - a);
    let mut landed = next.clone();
    landed.time = lerp(previous.time, next.time);
    landed.altitude = lerp(previous.altitude, next.altitude);
    landed.ground_distance = lerp(previous.ground_distance, next.ground_distance);
    landed.mass = lerp(previous.mass, next.mass);
    landed.true_airspeed = lerp(previous.true_airspeed, next.true_airspeed);
    landed.equivalent_airspeed = lerp(previous.equivalent_airspeed, next.equivalent_airspeed);
    landed.mach = lerp(previous.mach, next.mach);
    landed.cl = lerp(previous.cl, next.cl);
    landed.cd = lerp(previous.cd, next.cd);
    landed.drag = lerp(previous.drag, next.drag);
    landed.thrust = lerp(previous.thrust, next.thrust);
    landed.thrust_rate = lerp(previous.thrust_rate, next.thrust_rate);
    landed.slope_angle = lerp(previous.slope_angle, next.slope_angle);
    landed.acceleration = lerp(previous.acceleration, next.acceleration);
    landed.set(parameter, goal);
    landed
}

/// Whether `goal` lies between the values of `parameter` at two points
/// (inclusive of the newer point's side).
pub(crate) fn crossed(
    previous: &FlightPoint,
    next: &FlightPoint,
    parameter: Parameter,
    goal: f64,
) -> bool {
    let before = previous.get(parameter) - goal;
    let after = next.get(parameter) - goal;
    before.signum() != after.signum() || after.abs() <= crate::target::tolerance(parameter)
}

/// Altitude bounds for the optimal-altitude search.
const SEARCH_FLOOR: f64 = 0.0;
const SEARCH_CEILING: f64 = 20_000.0;

/// The altitude maximizing lift-to-drag ratio at the given mass, with the
/// speed constrained by `held`. Golden-section search over the ISA band.
///
/// Undefined when equivalent airspeed is held: dynamic pressure is then
/// altitude-invariant and the ratio has no interior maximum.
pub(crate) fn optimal_altitude(
    mass: f64,
    held: HeldSpeed,
    model: &AircraftModel<'_>,
) -> Result<f64, SegmentError> {
    if matches!(held.kind, SpeedKind::EquivalentAirspeed) {
        return Err(SegmentError::NumericDivergence(
            "optimal altitude is undefined at constant equivalent airspeed".to_string(),
        ));
    }
    let ratio_at = |altitude: f64| {
        let atm = Atmosphere::at(altitude);
        let tas = held.tas_at(altitude);
        let dynamic_pressure = 0.5 * atm.density * tas * tas;
        if dynamic_pressure <= 0.0 {
            return 0.0;
        }
        let cl = mass * G0 / (dynamic_pressure * model.reference_area);
        model.polar.lift_drag_ratio(cl)
    };

    const INV_PHI: f64 = 0.618_033_988_749_894_8;
    let (mut low, mut high) = (SEARCH_FLOOR, SEARCH_CEILING);
    let mut x1 = high - INV_PHI * (high - low);
    let mut x2 = low + INV_PHI * (high - low);
    let (mut f1, mut f2) = (ratio_at(x1), ratio_at(x2));
    for _ in 0..64 {
        if f1 < f2 {
            low = x1;
            x1 = x2;
            f1 = f2;
            x2 = low + INV_PHI * (high - low);
            f2 = ratio_at(x2);
        } else {
            high = x2;
            x2 = x1;
            f2 = f1;
            x1 = high - INV_PHI * (high - low);
            f1 = ratio_at(x1);
        }
        if high - low < 0.05 {
            break;
        }
    }
    let altitude = 0.5 * (low + high);
    trace!(mass, altitude, "optimal altitude solved");
    Ok(altitude)
}

/// Round an altitude down to the nearest flight level (1000 ft multiple).
pub(crate) fn round_down_to_flight_level(altitude: f64) -> f64 {
    let step = 1_000.0 * FOOT;
    (altitude / step).floor() * step
}

/// Shared fuel guard: a point whose mass is no longer positive means the
/// distance or time target exceeds the fuel available.
pub(crate) fn check_fuel(point: &FlightPoint, context: &str) -> Result<(), SegmentError> {
    if point.mass <= 0.0 {
        debug!(context, "fuel exhausted");
        return Err(SegmentError::TargetUnreachable(format!(
            "fuel exhausted before {context}"
        )));
    }
    Ok(())
}
