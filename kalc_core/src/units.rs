//! # Unit Types
//!
//! Type-safe wrappers for the physical quantities the calculators take in
//! both metric and US customary form. They are plain `f64` newtypes, so JSON
//! stays clean (just numbers) and conversions are explicit `From` impls.
//!
//! Evaluators convert to metric on entry and back on exit; formulas are
//! always written against the metric types.
//!
//! ## Example
//!
//! ```rust
//! use kalc_core::units::{Kilograms, Pounds, Inches, Centimeters};
//!
//! let weight: Kilograms = Pounds(220.462).into();
//! assert!((weight.0 - 100.0).abs() < 1e-3);
//!
//! let height: Centimeters = Inches(70.0).into();
//! assert!((height.0 - 177.8).abs() < 1e-9);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Exact international yard-and-pound definitions
pub const METERS_PER_INCH: f64 = 0.0254;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const METERS_PER_YARD: f64 = 0.9144;
pub const METERS_PER_MILE: f64 = 1609.344;
pub const KILOGRAMS_PER_POUND: f64 = 0.453_592_37;
pub const LITERS_PER_US_GALLON: f64 = 3.785_411_784;

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Inches> for Centimeters {
    fn from(inches: Inches) -> Self {
        Centimeters(inches.0 * 2.54)
    }
}

impl From<Centimeters> for Inches {
    fn from(cm: Centimeters) -> Self {
        Inches(cm.0 / 2.54)
    }
}

impl From<Feet> for Meters {
    fn from(ft: Feet) -> Self {
        Meters(ft.0 * METERS_PER_FOOT)
    }
}

impl From<Meters> for Feet {
    fn from(m: Meters) -> Self {
        Feet(m.0 / METERS_PER_FOOT)
    }
}

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Mass in avoirdupois pounds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pounds(pub f64);

impl From<Pounds> for Kilograms {
    fn from(lb: Pounds) -> Self {
        Kilograms(lb.0 * KILOGRAMS_PER_POUND)
    }
}

impl From<Kilograms> for Pounds {
    fn from(kg: Kilograms) -> Self {
        Pounds(kg.0 / KILOGRAMS_PER_POUND)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMeters(pub f64);

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFeet(pub f64);

impl From<SqFeet> for SqMeters {
    fn from(sqft: SqFeet) -> Self {
        SqMeters(sqft.0 * METERS_PER_FOOT * METERS_PER_FOOT)
    }
}

impl From<SqMeters> for SqFeet {
    fn from(sqm: SqMeters) -> Self {
        SqFeet(sqm.0 / (METERS_PER_FOOT * METERS_PER_FOOT))
    }
}

impl Mul<Meters> for Meters {
    type Output = SqMeters;
    fn mul(self, rhs: Meters) -> SqMeters {
        SqMeters(self.0 * rhs.0)
    }
}

// ============================================================================
// Volume Units
// ============================================================================

/// Volume in liters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Liters(pub f64);

/// Volume in US liquid gallons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsGallons(pub f64);

impl From<UsGallons> for Liters {
    fn from(gal: UsGallons) -> Self {
        Liters(gal.0 * LITERS_PER_US_GALLON)
    }
}

impl From<Liters> for UsGallons {
    fn from(l: Liters) -> Self {
        UsGallons(l.0 / LITERS_PER_US_GALLON)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Inches);
impl_arithmetic!(Feet);
impl_arithmetic!(Kilograms);
impl_arithmetic!(Pounds);
impl_arithmetic!(SqMeters);
impl_arithmetic!(SqFeet);
impl_arithmetic!(Liters);
impl_arithmetic!(UsGallons);

// ============================================================================
// Unit Systems
// ============================================================================

/// Which family of units a form is filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl FromStr for UnitSystem {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(CalcError::invalid_input("unitSystem", other, "Unknown unit system")),
        }
    }
}

/// Length units offered by the length converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Mm,
    Cm,
    M,
    Km,
    In,
    Ft,
    Yd,
    Mi,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 8] = [
        LengthUnit::Mm,
        LengthUnit::Cm,
        LengthUnit::M,
        LengthUnit::Km,
        LengthUnit::In,
        LengthUnit::Ft,
        LengthUnit::Yd,
        LengthUnit::Mi,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::M => "m",
            LengthUnit::Km => "km",
            LengthUnit::In => "in",
            LengthUnit::Ft => "ft",
            LengthUnit::Yd => "yd",
            LengthUnit::Mi => "mi",
        }
    }

    /// Size of one of this unit in meters
    pub fn meters(&self) -> f64 {
        match self {
            LengthUnit::Mm => 0.001,
            LengthUnit::Cm => 0.01,
            LengthUnit::M => 1.0,
            LengthUnit::Km => 1000.0,
            LengthUnit::In => METERS_PER_INCH,
            LengthUnit::Ft => METERS_PER_FOOT,
            LengthUnit::Yd => METERS_PER_YARD,
            LengthUnit::Mi => METERS_PER_MILE,
        }
    }

    pub fn to_meters(&self, value: f64) -> Meters {
        Meters(value * self.meters())
    }

    pub fn from_meters(&self, length: Meters) -> f64 {
        length.0 / self.meters()
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthUnit::ALL
            .into_iter()
            .find(|u| u.symbol() == s)
            .ok_or_else(|| CalcError::invalid_input("unit", s, "Unknown length unit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounds_to_kilograms() {
        let kg: Kilograms = Pounds(1.0).into();
        assert_eq!(kg.0, KILOGRAMS_PER_POUND);
        let lb: Pounds = Kilograms(KILOGRAMS_PER_POUND * 10.0).into();
        assert!((lb.0 - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_inches_to_centimeters() {
        let cm: Centimeters = Inches(10.0).into();
        assert!((cm.0 - 25.4).abs() < 1e-12);
        let m: Meters = cm.into();
        assert!((m.0 - 0.254).abs() < 1e-12);
    }

    #[test]
    fn test_area_and_volume() {
        let area = Meters(3.0) * Meters(2.5);
        assert_eq!(area, SqMeters(7.5));
        let sqm: SqMeters = SqFeet(100.0).into();
        assert!((sqm.0 - 9.290_304).abs() < 1e-9);
        let l: Liters = UsGallons(1.0).into();
        assert_eq!(l.0, LITERS_PER_US_GALLON);
    }

    #[test]
    fn test_arithmetic() {
        let a = Meters(10.0);
        let b = Meters(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_length_units() {
        assert_eq!(LengthUnit::Mi.to_meters(1.0), Meters(1609.344));
        assert!((LengthUnit::Ft.from_meters(Meters(1.0)) - 3.280_839_895).abs() < 1e-9);
        for unit in LengthUnit::ALL {
            assert_eq!(unit.symbol().parse::<LengthUnit>().unwrap(), unit);
        }
        assert!("furlong".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn test_serialization() {
        let kg = Kilograms(72.5);
        let json = serde_json::to_string(&kg).unwrap();
        assert_eq!(json, "72.5");
        let roundtrip: Kilograms = serde_json::from_str(&json).unwrap();
        assert_eq!(kg, roundtrip);
        assert_eq!(serde_json::to_string(&LengthUnit::Km).unwrap(), "\"km\"");
    }
}
