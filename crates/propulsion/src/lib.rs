//! Propulsion strategy objects.
//!
//! The simulation engine only ever sees [`Propulsion::thrust_and_fuel_flow`];
//! what an engine setting means is up to each model.

use flight_core::atmosphere::Atmosphere;
use flight_core::{EngineSetting, FlightPoint};

/// Propulsion collaborator: maximum available thrust scaled by a thrust
/// rate, plus the corresponding fuel flow.
pub trait Propulsion {
    /// Thrust (N) and fuel flow (kg/s) at the given flight point, engine
    /// setting, and thrust rate in [0, 1].
    fn thrust_and_fuel_flow(
        &self,
        point: &FlightPoint,
        setting: EngineSetting,
        thrust_rate: f64,
    ) -> (f64, f64);
}

/// Parametric turbofan model: sea-level static thrust with a density-ratio
/// lapse, per-setting rating factors, and thrust-specific fuel consumption.
#[derive(Debug, Clone)]
pub struct TurbofanModel {
    /// Total sea-level static thrust, all engines (N).
    pub sea_level_thrust: f64,
    /// Thrust-specific fuel consumption (kg/(N·s)).
    pub tsfc: f64,
    /// Exponent of the density-ratio thrust lapse.
    pub lapse_exponent: f64,
}

impl TurbofanModel {
    /// Build a model from sea-level thrust (N) and TSFC in kg/(N·h), the
    /// unit engine decks usually quote.
    pub fn new(sea_level_thrust: f64, tsfc_per_hour: f64) -> Self {
        Self {
            sea_level_thrust,
            tsfc: tsfc_per_hour / 3_600.0,
            lapse_exponent: 0.7,
        }
    }

    fn rating(setting: EngineSetting) -> f64 {
        match setting {
            EngineSetting::Takeoff => 1.0,
            EngineSetting::Climb => 0.93,
            EngineSetting::Cruise => 0.85,
            EngineSetting::Idle => 0.08,
        }
    }

    /// Maximum available thrust at the point's altitude for a setting.
    pub fn max_thrust(&self, point: &FlightPoint, setting: EngineSetting) -> f64 {
        let sigma = Atmosphere::at(point.altitude).sigma();
        self.sea_level_thrust * Self::rating(setting) * sigma.powf(self.lapse_exponent)
    }
}

impl Propulsion for TurbofanModel {
    fn thrust_and_fuel_flow(
        &self,
        point: &FlightPoint,
        setting: EngineSetting,
        thrust_rate: f64,
    ) -> (f64, f64) {
        let thrust = self.max_thrust(point, setting) * thrust_rate.clamp(0.0, 1.0);
        (thrust, self.tsfc * thrust)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point_at(altitude: f64) -> FlightPoint {
        FlightPoint {
            altitude,
            ..Default::default()
        }
    }

    #[test]
    fn thrust_scales_with_rate_and_altitude() {
        let model = TurbofanModel::new(240_000.0, 0.06);
        let (sl_thrust, _) =
            model.thrust_and_fuel_flow(&point_at(0.0), EngineSetting::Takeoff, 1.0);
        assert_relative_eq!(sl_thrust, 240_000.0, epsilon = 1.0);

        let (half, _) = model.thrust_and_fuel_flow(&point_at(0.0), EngineSetting::Takeoff, 0.5);
        assert_relative_eq!(half, sl_thrust * 0.5);

        let (at_altitude, _) =
            model.thrust_and_fuel_flow(&point_at(10_000.0), EngineSetting::Takeoff, 1.0);
        assert!(at_altitude < sl_thrust * 0.5);
    }

    #[test]
    fn fuel_flow_tracks_thrust() {
        let model = TurbofanModel::new(240_000.0, 0.06);
        let (thrust, fuel_flow) =
            model.thrust_and_fuel_flow(&point_at(10_668.0), EngineSetting::Cruise, 0.8);
        assert_relative_eq!(fuel_flow, thrust * 0.06 / 3_600.0);
    }

    #[test]
    fn idle_rating_is_a_small_fraction() {
        let model = TurbofanModel::new(240_000.0, 0.06);
        let (idle, _) = model.thrust_and_fuel_flow(&point_at(0.0), EngineSetting::Idle, 1.0);
        let (takeoff, _) = model.thrust_and_fuel_flow(&point_at(0.0), EngineSetting::Takeoff, 1.0);
        assert!(idle < takeoff * 0.1);
    }
}
