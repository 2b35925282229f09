//! Length values and unit conversion
//!
//! All geometry inside the fabrication core is expressed in inches, the unit the
//! host CAD application stores lengths in. Millimetres only appear at the
//! boundary: settings exchange, user input and writer output.

use crate::error::UnitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Millimetres per inch (exact).
pub const MM_PER_INCH: f64 = 25.4;

/// Unit used when exchanging lengths with a user or another program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayUnit {
    /// Millimetres
    #[serde(rename = "mm")]
    Millimeters,
    /// Inches
    #[serde(rename = "in")]
    Inches,
}

impl Default for DisplayUnit {
    fn default() -> Self {
        Self::Millimeters
    }
}

impl DisplayUnit {
    /// Short unit label ("mm" or "in")
    pub fn label(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Inches => "in",
        }
    }

    /// How many of this unit make up one canonical inch
    pub fn per_inch(self) -> f64 {
        match self {
            Self::Millimeters => MM_PER_INCH,
            Self::Inches => 1.0,
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DisplayUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "metric" => Ok(Self::Millimeters),
            "in" | "inch" | "inches" | "imperial" => Ok(Self::Inches),
            _ => Err(UnitError::UnknownUnit(s.to_string())),
        }
    }
}

/// A length stored in canonical inches.
///
/// Serialized as the bare inch value so saved layouts stay unit-unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Length(f64);

impl Length {
    pub const ZERO: Length = Length(0.0);

    /// Length from a value in inches
    pub const fn from_inches(inches: f64) -> Self {
        Self(inches)
    }

    /// Length from a value in millimetres
    pub fn from_mm(mm: f64) -> Self {
        Self(mm / MM_PER_INCH)
    }

    /// Length from a value expressed in `unit`
    pub fn new(value: f64, unit: DisplayUnit) -> Self {
        Self(value / unit.per_inch())
    }

    /// Value in canonical inches
    pub fn inches(self) -> f64 {
        self.0
    }

    /// Value in millimetres
    pub fn to_mm(self) -> f64 {
        self.0 * MM_PER_INCH
    }

    /// Value expressed in `unit`
    pub fn to(self, unit: DisplayUnit) -> f64 {
        self.0 * unit.per_inch()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    /// True when both lengths agree within `tolerance`
    pub fn approx_eq(self, other: Self, tolerance: Length) -> bool {
        (self.0 - other.0).abs() <= tolerance.0
    }
}

/// Shorthand constructors mirroring the host application's `1200.mm` style.
pub trait LengthExt {
    fn mm(self) -> Length;
    fn inch(self) -> Length;
}

impl LengthExt for f64 {
    fn mm(self) -> Length {
        Length::from_mm(self)
    }

    fn inch(self) -> Length {
        Length::from_inches(self)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}mm", self.to_mm())
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length {
        Length(-self.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Mul<Length> for f64 {
    type Output = Length;
    fn mul(self, rhs: Length) -> Length {
        Length(self * rhs.0)
    }
}

impl Div<f64> for Length {
    type Output = Length;
    fn div(self, rhs: f64) -> Length {
        Length(self.0 / rhs)
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Length) {
        self.0 -= rhs.0;
    }
}

impl Sum for Length {
    fn sum<I: Iterator<Item = Length>>(iter: I) -> Length {
        iter.fold(Length::ZERO, Add::add)
    }
}

/// Format a length for display
///
/// * `length` - Value to format
/// * `unit` - Target unit
pub fn format_length(length: Length, unit: DisplayUnit) -> String {
    format!("{:.3}", length.to(unit))
}

/// Parse user input into a length
///
/// Inches accept decimal and fractional input ("1 1/2", "5/8").
///
/// * `input` - String to parse
/// * `unit` - Assumed unit of the input
pub fn parse_length(input: &str, unit: DisplayUnit) -> Result<Length, UnitError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitError::Empty);
    }

    let value = match unit {
        DisplayUnit::Millimeters => parse_number(input)?,
        DisplayUnit::Inches if input.contains('/') => {
            let mut total = 0.0;
            for part in input.split_whitespace() {
                if part.contains('/') {
                    let frac: Vec<&str> = part.split('/').collect();
                    if frac.len() != 2 {
                        return Err(UnitError::InvalidFraction(part.to_string()));
                    }
                    let num = parse_number(frac[0])?;
                    let den = parse_number(frac[1])?;
                    if den == 0.0 {
                        return Err(UnitError::DivisionByZero);
                    }
                    total += num / den;
                } else {
                    total += parse_number(part)?;
                }
            }
            total
        }
        DisplayUnit::Inches => parse_number(input)?,
    };

    Ok(Length::new(value, unit))
}

fn parse_number(input: &str) -> Result<f64, UnitError> {
    input
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| UnitError::InvalidNumber(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_conversion() {
        let len = Length::from_mm(25.4);
        assert!((len.inches() - 1.0).abs() < 1e-12);
        assert!((len.to_mm() - 25.4).abs() < 1e-12);
        assert_eq!(format_length(len, DisplayUnit::Millimeters), "25.400");
        assert_eq!(format_length(len, DisplayUnit::Inches), "1.000");
    }

    #[test]
    fn test_extension_constructors() {
        assert_eq!(1200.0.mm(), Length::from_mm(1200.0));
        assert_eq!(2.0.inch(), Length::from_inches(2.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = 100.0.mm();
        let b = 20.0.mm();
        assert!(((a - 2.0 * b).to_mm() - 60.0).abs() < 1e-9);
        assert!(((a + b).to_mm() - 120.0).abs() < 1e-9);
        assert!(((a / 4.0).to_mm() - 25.0).abs() < 1e-9);
        let total: Length = vec![a, b, b].into_iter().sum();
        assert!((total.to_mm() - 140.0).abs() < 1e-9);
        assert!(a > b);
    }

    #[test]
    fn test_parse_fraction() {
        let len = parse_length("1 1/2", DisplayUnit::Inches).unwrap();
        assert!((len.inches() - 1.5).abs() < 1e-12);

        let len = parse_length("-1/2", DisplayUnit::Inches).unwrap();
        assert!((len.to_mm() + 12.7).abs() < 1e-9);

        let len = parse_length("  18  ", DisplayUnit::Millimeters).unwrap();
        assert!((len.to_mm() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            parse_length("", DisplayUnit::Millimeters),
            Err(UnitError::Empty)
        );
        assert!(parse_length("abc", DisplayUnit::Millimeters).is_err());
        assert_eq!(
            parse_length("1/0", DisplayUnit::Inches),
            Err(UnitError::DivisionByZero)
        );
        assert!(parse_length("1/2/3", DisplayUnit::Inches).is_err());
        assert!(parse_length("inf", DisplayUnit::Millimeters).is_err());
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("MM".parse::<DisplayUnit>().unwrap(), DisplayUnit::Millimeters);
        assert_eq!("inch".parse::<DisplayUnit>().unwrap(), DisplayUnit::Inches);
        assert!("furlong".parse::<DisplayUnit>().is_err());
    }

    #[test]
    fn test_serde_is_canonical_inches() {
        let json = serde_json::to_string(&Length::from_inches(2.5)).unwrap();
        assert_eq!(json, "2.5");
        let back: Length = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Length::from_inches(2.5));
    }
}
