use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// The number of micro-units in one whole unit of a currency.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

/// Two amounts are considered equal when they differ by strictly less than this (0.01 units).
pub const MATCH_TOLERANCE: MicroUnits = MicroUnits(10_000);

const FRACTION_DIGITS: usize = 6;

//--------------------------------------     MicroUnits       ---------------------------------------------------------
/// A currency amount, stored as an integer number of millionths of the major unit.
///
/// Upstream systems hand us amounts as JSON numbers or as decimal strings. They are converted exactly once, at the
/// boundary, so that tolerance comparisons further down are exact integer comparisons: `1500.01 - 1500.00` is
/// always `10_000` micro-units, never `0.009999999999990905`.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MicroUnits(i64);

op!(binary MicroUnits, Add, add);
op!(binary MicroUnits, Sub, sub);
op!(inplace MicroUnits, SubAssign, sub_assign);
op!(unary MicroUnits, Neg, neg);

impl Sum for MicroUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a currency amount: {0}")]
pub struct AmountConversionError(String);

impl From<i64> for MicroUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for MicroUnits {
    type Error = AmountConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(AmountConversionError(format!("{value} is not a finite number")));
        }
        let micros = (value * MICROS_PER_UNIT as f64).round();
        if micros.abs() >= i64::MAX as f64 {
            return Err(AmountConversionError(format!("{value} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(micros as i64))
    }
}

impl FromStr for MicroUnits {
    type Err = AmountConversionError;

    /// Parses a decimal amount. Both `.` and `,` are accepted as the decimal separator, and whitespace (including
    /// non-breaking spaces used as thousands separators) is ignored. At most six fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AmountConversionError(format!("'{s}' is not a decimal amount"));
        let cleaned =
            s.chars().filter(|c| !c.is_whitespace() && *c != '_').map(|c| if c == ',' { '.' } else { c }).collect::<String>();
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned.as_str())),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(err());
        }
        if fraction.len() > FRACTION_DIGITS {
            return Err(AmountConversionError(format!("'{s}' has more than {FRACTION_DIGITS} decimal places")));
        }
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| err())? };
        let fraction = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = FRACTION_DIGITS);
            padded.parse::<i64>().map_err(|_| err())?
        };
        let value = whole.checked_mul(MICROS_PER_UNIT).and_then(|w| w.checked_add(fraction)).ok_or_else(err)?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Display for MicroUnits {
    /// Two decimal places when that is exact, all six otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_unit = MICROS_PER_UNIT.unsigned_abs();
        let whole = abs / per_unit;
        let fraction = abs % per_unit;
        if fraction % 10_000 == 0 {
            write!(f, "{sign}{whole}.{:02}", fraction / 10_000)
        } else {
            write!(f, "{sign}{whole}.{fraction:06}")
        }
    }
}

impl MicroUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * MICROS_PER_UNIT)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// The absolute difference between two amounts.
    pub fn abs_diff(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0).saturating_abs())
    }

    /// True when the two amounts differ by strictly less than `tolerance`.
    pub fn is_within(self, other: Self, tolerance: Self) -> bool {
        self.abs_diff(other) < tolerance
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn float_conversion_is_exact_at_the_cent_boundary() {
        let gate = MicroUnits::try_from(1500.0).unwrap();
        let local = MicroUnits::try_from(1500.01).unwrap();
        assert_eq!(local.abs_diff(gate), MATCH_TOLERANCE);
        assert!(!local.is_within(gate, MATCH_TOLERANCE));
        let local = MicroUnits::try_from(1500.0099).unwrap();
        assert_eq!(local.value(), 1_500_009_900);
        assert!(local.is_within(gate, MATCH_TOLERANCE));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(MicroUnits::try_from(f64::NAN).is_err());
        assert!(MicroUnits::try_from(f64::INFINITY).is_err());
        assert!(MicroUnits::try_from(1e300).is_err());
    }

    #[test]
    fn parse_decimal_strings() {
        assert_eq!("1500".parse::<MicroUnits>().unwrap(), MicroUnits::from_units(1500));
        assert_eq!("1500,5".parse::<MicroUnits>().unwrap().value(), 1_500_500_000);
        assert_eq!("1 500.25".parse::<MicroUnits>().unwrap().value(), 1_500_250_000);
        assert_eq!("1\u{a0}234,56".parse::<MicroUnits>().unwrap().value(), 1_234_560_000);
        assert_eq!("-0.5".parse::<MicroUnits>().unwrap().value(), -500_000);
        assert_eq!(".75".parse::<MicroUnits>().unwrap().value(), 750_000);
        assert!("".parse::<MicroUnits>().is_err());
        assert!("12a".parse::<MicroUnits>().is_err());
        assert!("1.2.3".parse::<MicroUnits>().is_err());
        assert!("0.1234567".parse::<MicroUnits>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(MicroUnits::from(1_500_000_000).to_string(), "1500.00");
        assert_eq!(MicroUnits::from(1_500_009_900).to_string(), "1500.009900");
        assert_eq!(MicroUnits::from(-250_000).to_string(), "-0.25");
    }

    #[test]
    fn arithmetic() {
        let a = MicroUnits::from_units(10);
        let b = MicroUnits::from(2_500_000);
        assert_eq!(a - b, MicroUnits::from(7_500_000));
        assert_eq!(b - a, -(a - b));
        assert_eq!(vec![a, b, b].into_iter().sum::<MicroUnits>(), MicroUnits::from_units(15));
        assert_eq!((b - a).abs(), a - b);
    }
}
