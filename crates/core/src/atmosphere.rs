//! International Standard Atmosphere, valid from sea level to 20 km.

use crate::constants::{
    AIR_GAS_CONSTANT, AIR_HEAT_RATIO, G0, SEA_LEVEL_DENSITY, SEA_LEVEL_PRESSURE,
    SEA_LEVEL_TEMPERATURE, TROPOPAUSE_ALTITUDE, TROPOSPHERE_LAPSE_RATE,
};

/// Ambient conditions at a given geopotential altitude.
#[derive(Debug, Clone, Copy)]
pub struct Atmosphere {
    pub altitude: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub density: f64,
    pub speed_of_sound: f64,
}

impl Atmosphere {
    /// Evaluate ISA conditions at `altitude` metres.
    ///
    /// Troposphere relations below 11 km, isothermal layer above. Altitudes
    /// are clamped to the [-1 km, 20 km] band the relations are written for.
    pub fn at(altitude: f64) -> Self {
        let altitude = altitude.clamp(-1_000.0, 20_000.0);
        let (temperature, pressure) = if altitude <= TROPOPAUSE_ALTITUDE {
            let t = SEA_LEVEL_TEMPERATURE - TROPOSPHERE_LAPSE_RATE * altitude;
            let p = SEA_LEVEL_PRESSURE
                * (t / SEA_LEVEL_TEMPERATURE)
                    .powf(G0 / (AIR_GAS_CONSTANT * TROPOSPHERE_LAPSE_RATE));
            (t, p)
        } else {
            let t_tropopause = SEA_LEVEL_TEMPERATURE - TROPOSPHERE_LAPSE_RATE * TROPOPAUSE_ALTITUDE;
            let p_tropopause = SEA_LEVEL_PRESSURE
                * (t_tropopause / SEA_LEVEL_TEMPERATURE)
                    .powf(G0 / (AIR_GAS_CONSTANT * TROPOSPHERE_LAPSE_RATE));
            let p = p_tropopause
                * f64::exp(-G0 * (altitude - TROPOPAUSE_ALTITUDE) / (AIR_GAS_CONSTANT * t_tropopause));
            (t_tropopause, p)
        };
        let density = pressure / (AIR_GAS_CONSTANT * temperature);
        let speed_of_sound = (AIR_HEAT_RATIO * AIR_GAS_CONSTANT * temperature).sqrt();
        Self {
            altitude,
            temperature,
            pressure,
            density,
            speed_of_sound,
        }
    }

    /// Density ratio relative to sea level.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.density / SEA_LEVEL_DENSITY
    }
}

/// True airspeed corresponding to a Mach number at the given conditions.
#[inline]
pub fn tas_from_mach(mach: f64, atmosphere: &Atmosphere) -> f64 {
    mach * atmosphere.speed_of_sound
}

/// Mach number corresponding to a true airspeed at the given conditions.
#[inline]
pub fn mach_from_tas(tas: f64, atmosphere: &Atmosphere) -> f64 {
    tas / atmosphere.speed_of_sound
}

/// Equivalent airspeed corresponding to a true airspeed at the given conditions.
#[inline]
pub fn eas_from_tas(tas: f64, atmosphere: &Atmosphere) -> f64 {
    tas * atmosphere.sigma().sqrt()
}

/// True airspeed corresponding to an equivalent airspeed at the given conditions.
#[inline]
pub fn tas_from_eas(eas: f64, atmosphere: &Atmosphere) -> f64 {
    eas / atmosphere.sigma().sqrt()
}
