//! Unit declarations and conversion helpers.

use std::fmt;

use thiserror::Error;

use crate::constants::{FOOT, KNOT, NAUTICAL_MILE, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Physical dimension of a declared quantity, used to reject declarations
/// whose unit cannot convert into a parameter's canonical SI unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Length,
    Speed,
    Mass,
    Duration,
    Angle,
    Dimensionless,
}

/// Units accepted in declarations. Internal computation is always SI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Metre,
    Foot,
    Kilometre,
    NauticalMile,
    MetrePerSecond,
    Knot,
    KilometrePerHour,
    Kilogram,
    Tonne,
    Pound,
    Second,
    Minute,
    Hour,
    Radian,
    Degree,
    Dimensionless,
}

/// Raised when a declared unit name is not recognized.
#[derive(Debug, Clone, Error)]
#[error("unknown unit '{0}'")]
pub struct UnknownUnit(pub String);

impl Unit {
    /// The dimension this unit measures.
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Metre | Unit::Foot | Unit::Kilometre | Unit::NauticalMile => Dimension::Length,
            Unit::MetrePerSecond | Unit::Knot | Unit::KilometrePerHour => Dimension::Speed,
            Unit::Kilogram | Unit::Tonne | Unit::Pound => Dimension::Mass,
            Unit::Second | Unit::Minute | Unit::Hour => Dimension::Duration,
            Unit::Radian | Unit::Degree => Dimension::Angle,
            Unit::Dimensionless => Dimension::Dimensionless,
        }
    }

    /// Convert a value expressed in this unit to the SI base unit of its dimension.
    pub fn to_si(self, value: f64) -> f64 {
        match self {
            Unit::Metre | Unit::MetrePerSecond | Unit::Kilogram | Unit::Second | Unit::Radian => {
                value
            }
            Unit::Foot => value * FOOT,
            Unit::Kilometre => value * 1_000.0,
            Unit::NauticalMile => value * NAUTICAL_MILE,
            Unit::Knot => value * KNOT,
            Unit::KilometrePerHour => value / 3.6,
            Unit::Tonne => value * 1_000.0,
            Unit::Pound => value * 0.453_592_37,
            Unit::Minute => value * SECONDS_PER_MINUTE,
            Unit::Hour => value * SECONDS_PER_HOUR,
            Unit::Degree => value.to_radians(),
            Unit::Dimensionless => value,
        }
    }

    /// Parse a unit from its declaration-file spelling.
    pub fn parse(name: &str) -> Result<Self, UnknownUnit> {
        match name.trim() {
            "m" => Ok(Unit::Metre),
            "ft" => Ok(Unit::Foot),
            "km" => Ok(Unit::Kilometre),
            "NM" | "nmi" => Ok(Unit::NauticalMile),
            "m/s" => Ok(Unit::MetrePerSecond),
            "kt" | "kn" => Ok(Unit::Knot),
            "km/h" => Ok(Unit::KilometrePerHour),
            "kg" => Ok(Unit::Kilogram),
            "t" => Ok(Unit::Tonne),
            "lb" | "lbm" => Ok(Unit::Pound),
            "s" => Ok(Unit::Second),
            "min" => Ok(Unit::Minute),
            "h" => Ok(Unit::Hour),
            "rad" => Ok(Unit::Radian),
            "deg" => Ok(Unit::Degree),
            "-" | "" => Ok(Unit::Dimensionless),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Unit::Metre => "m",
            Unit::Foot => "ft",
            Unit::Kilometre => "km",
            Unit::NauticalMile => "NM",
            Unit::MetrePerSecond => "m/s",
            Unit::Knot => "kt",
            Unit::KilometrePerHour => "km/h",
            Unit::Kilogram => "kg",
            Unit::Tonne => "t",
            Unit::Pound => "lb",
            Unit::Second => "s",
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::Radian => "rad",
            Unit::Degree => "deg",
            Unit::Dimensionless => "-",
        };
        write!(f, "{name}")
    }
}

/// Convert feet to metres.
#[inline]
pub fn ft_to_m(v: f64) -> f64 {
    v * FOOT
}

/// Convert metres to feet.
#[inline]
pub fn m_to_ft(v: f64) -> f64 {
    v / FOOT
}

/// Convert nautical miles to metres.
#[inline]
pub fn nm_to_m(v: f64) -> f64 {
    v * NAUTICAL_MILE
}

/// Convert metres to nautical miles.
#[inline]
pub fn m_to_nm(v: f64) -> f64 {
    v / NAUTICAL_MILE
}

/// Convert knots to metres per second.
#[inline]
pub fn kt_to_ms(v: f64) -> f64 {
    v * KNOT
}

/// Convert metres per second to knots.
#[inline]
pub fn ms_to_kt(v: f64) -> f64 {
    v / KNOT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_round_trips_to_si() {
        assert_relative_eq!(Unit::Foot.to_si(1_000.0), 304.8);
        assert_relative_eq!(Unit::NauticalMile.to_si(1.0), 1_852.0);
        assert_relative_eq!(Unit::Knot.to_si(1.0), 0.514_444, epsilon = 1e-6);
        assert_relative_eq!(Unit::Tonne.to_si(70.0), 70_000.0);
        assert_relative_eq!(Unit::Minute.to_si(2.0), 120.0);
    }

    #[test]
    fn unit_parsing_and_dimensions() {
        assert_eq!(Unit::parse("ft").unwrap(), Unit::Foot);
        assert_eq!(Unit::parse("NM").unwrap(), Unit::NauticalMile);
        assert_eq!(Unit::parse("kt").unwrap().dimension(), Dimension::Speed);
        assert_eq!(Unit::parse("t").unwrap().dimension(), Dimension::Mass);
        assert!(Unit::parse("furlong").is_err());
    }

    #[test]
    fn helper_conversions_match_units() {
        assert_relative_eq!(ft_to_m(35_000.0), Unit::Foot.to_si(35_000.0));
        assert_relative_eq!(m_to_nm(nm_to_m(2_000.0)), 2_000.0);
        assert_relative_eq!(ms_to_kt(kt_to_ms(250.0)), 250.0);
    }
}
