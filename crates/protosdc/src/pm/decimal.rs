// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exact decimal numbers for measured values, ranges and resolutions.
//!
//! A value is `mantissa * 10^(-scale)`. Equality is numeric, so `1.0`
//! and `1.00` compare equal even though they keep their own digits.

use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Largest accepted `|scale|` for parsed and decoded values.
pub const MAX_SCALE: i32 = 1000;

/// Exact decimal (`mantissa * 10^-scale`).
#[derive(Clone, Copy, Debug)]
pub struct Decimal {
    mantissa: i128,
    scale: i32,
}

impl Decimal {
    /// Zero with scale 0.
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Build from raw parts.
    #[inline]
    pub const fn new(mantissa: i128, scale: i32) -> Self {
        Self { mantissa, scale }
    }

    /// Build from raw parts coming from outside, rejecting a scale beyond
    /// [`MAX_SCALE`].
    pub fn checked(mantissa: i128, scale: i64) -> Result<Self> {
        match i32::try_from(scale) {
            Ok(scale) if (-MAX_SCALE..=MAX_SCALE).contains(&scale) => Ok(Self { mantissa, scale }),
            _ => Err(Error::ValueOutOfRange(format!("decimal scale {}", scale))),
        }
    }

    /// Integer value.
    #[inline]
    pub const fn from_i64(v: i64) -> Self {
        Self {
            mantissa: v as i128,
            scale: 0,
        }
    }

    /// Signed digits.
    #[inline]
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Number of digits after the decimal point (negative for trailing zeros).
    #[inline]
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Lossy conversion for diagnostics and sample statistics.
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 * 10f64.powi(-self.scale)
    }

    /// Same value with trailing zeros removed.
    pub fn normalized(&self) -> Self {
        if self.mantissa == 0 {
            return Self::ZERO;
        }
        let mut m = self.mantissa;
        let mut s = self.scale;
        while m % 10 == 0 {
            m /= 10;
            s = s.saturating_sub(1);
        }
        Self {
            mantissa: m,
            scale: s,
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.mantissa == b.mantissa && a.scale == b.scale
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalized();
        n.mantissa.hash(state);
        n.scale.hash(state);
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

impl FromStr for Decimal {
    type Err = Error;

    /// Parse `[-+]digits[.digits][(e|E)[-+]digits]`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidData(format!("not a decimal: {:?}", s));
        let s = s.trim();
        let (body, exp) = match s.find(['e', 'E']) {
            Some(pos) => {
                let exp: i32 = s[pos + 1..].parse().map_err(|_| bad())?;
                (&s[..pos], exp)
            }
            None => (s, 0),
        };
        let (negative, digits) = match body.as_bytes().first() {
            Some(b'-') => (true, &body[1..]),
            Some(b'+') => (false, &body[1..]),
            _ => (false, body),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        let mut mantissa: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let d = c.to_digit(10).ok_or_else(bad)?;
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(d)))
                .ok_or_else(|| Error::ValueOutOfRange(s.to_string()))?;
        }
        if negative {
            mantissa = -mantissa;
        }
        let scale = i64::try_from(frac_part.len())
            .map_err(|_| Error::ValueOutOfRange(s.to_string()))?
            - i64::from(exp);
        Self::checked(mantissa, scale)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        if !(-MAX_SCALE..=MAX_SCALE).contains(&self.scale) {
            if self.mantissa == 0 {
                return f.write_str("0");
            }
            return write!(f, "{}{}E{}", sign, digits, -i64::from(self.scale));
        }
        if self.scale <= 0 {
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            if self.mantissa == 0 {
                return f.write_str("0");
            }
            return write!(f, "{}{}{}", sign, digits, zeros);
        }
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (i, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, i, frac)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(d("0.01").mantissa(), 1);
        assert_eq!(d("0.01").scale(), 2);
        assert_eq!(d("-123.456").mantissa(), -123456);
        assert_eq!(d("-123.456").to_string(), "-123.456");
        assert_eq!(d("0.001").to_string(), "0.001");
        assert_eq!(d("1E+3").scale(), -3);
        assert_eq!(d("1E+3").to_string(), "1000");
        assert_eq!(d("42").to_string(), "42");
    }

    #[test]
    fn test_numeric_equality_ignores_trailing_zeros() {
        assert_eq!(d("1.0"), d("1.00"));
        assert_eq!(d("100"), d("1E2"));
        assert_eq!(d("0"), d("-0.000"));
        assert_ne!(d("0.1"), d("0.01"));
    }

    #[test]
    fn test_extreme_scales() {
        for s in ["1E-2147483648", "1E+2147483647", "1E+5000", "0.5E-1000"] {
            assert!(
                matches!(s.parse::<Decimal>(), Err(Error::ValueOutOfRange(_))),
                "{}",
                s
            );
        }
        assert_eq!(d("1E-1000").scale(), MAX_SCALE);
        assert!(Decimal::checked(1, i64::from(MAX_SCALE) + 1).is_err());

        let huge = Decimal::new(100, i32::MIN);
        assert_eq!(huge.normalized().mantissa(), 1);
        assert_eq!(Decimal::new(5, i32::MAX).to_string(), "5E-2147483647");
        assert_ne!(Decimal::new(5, i32::MAX), Decimal::new(5, i32::MIN));
        assert_eq!(Decimal::new(0, i32::MAX).to_string(), "0");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("abc".parse::<Decimal>().is_err());
    }
}
