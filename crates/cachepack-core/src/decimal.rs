//! # Exact Decimals
//!
//! `Decimal` is a validated decimal literal. The text is kept verbatim, so a
//! value written as `"19.90"` is packed as `"19.90"` and never touches
//! floating point. Equality is numeric: `1.10 == 1.1` and `-0 == 0`.
//!
//! Accepted grammar: `[+-]digits[.digits][(e|E)[+-]digits]`, where either
//! side of the point may be empty but not both. Infinities and NaN are not
//! decimal numbers here and are rejected.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::ParseError;

/// An exact decimal number carried by its textual form.
#[derive(Debug, Clone)]
pub struct Decimal {
    text: String,
    negative: bool,
    /// Significant digits with leading and trailing zeros stripped; `"0"` for zero.
    digits: String,
    exponent: i64,
}

impl Decimal {
    /// Parse a decimal literal.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidDecimal` if `s` is not a finite decimal
    /// number.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidDecimal(s.to_string());

        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(invalid()),
        };

        let (mantissa, exp_part) = match unsigned.find(&['e', 'E'][..]) {
            Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
            None => (unsigned, None),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut exponent: i64 = match exp_part {
            Some(e) => {
                let unsigned_exp = e.strip_prefix(&['+', '-'][..]).unwrap_or(e);
                if unsigned_exp.is_empty() || !unsigned_exp.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                e.parse().map_err(|_| invalid())?
            }
            None => 0,
        };
        let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid())?;
        exponent = exponent.checked_sub(frac_len).ok_or_else(invalid)?;

        let all_digits = format!("{int_part}{frac_part}");
        let significant = all_digits.trim_start_matches('0');
        let trimmed = significant.trim_end_matches('0');

        let (negative, digits, exponent) = if trimmed.is_empty() {
            (false, "0".to_string(), 0)
        } else {
            let trailing = i64::try_from(significant.len() - trimmed.len()).map_err(|_| invalid())?;
            let exponent = exponent.checked_add(trailing).ok_or_else(invalid)?;
            (negative, trimmed.to_string(), exponent)
        };

        Ok(Self {
            text: s.to_string(),
            negative,
            digits,
            exponent,
        })
    }

    /// The decimal text exactly as constructed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns true for any spelling of zero.
    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        // Integer text is always a valid literal.
        let text = n.to_string();
        let digits = n.unsigned_abs().to_string();
        let significant = digits.trim_end_matches('0');
        let (digits, exponent) = if significant.is_empty() {
            ("0".to_string(), 0)
        } else {
            (significant.to_string(), (digits.len() - significant.len()) as i64)
        };
        Self {
            text,
            negative: n < 0,
            digits,
            exponent,
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative
            && self.exponent == other.exponent
            && self.digits == other.digits
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.negative.hash(state);
        self.digits.hash(state);
        self.exponent.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap_or_else(|e| panic!("{s:?} should parse: {e}"))
    }

    #[test]
    fn text_is_preserved() {
        assert_eq!(dec("19.90").as_str(), "19.90");
        assert_eq!(dec("0.1000000000000000000000000001").to_string(), "0.1000000000000000000000000001");
        assert_eq!(dec("1E+2").as_str(), "1E+2");
    }

    #[test]
    fn equality_is_numeric() {
        assert_eq!(dec("1.10"), dec("1.1"));
        assert_eq!(dec("100"), dec("1e2"));
        assert_eq!(dec("0.5"), dec(".5"));
        assert_eq!(dec("-0"), dec("0.000"));
        assert_ne!(dec("1.1"), dec("-1.1"));
        assert_ne!(dec("0.1"), dec("0.01"));
    }

    #[test]
    fn equal_values_hash_equal() {
        let mut set = std::collections::HashSet::new();
        set.insert(dec("2.50"));
        assert!(set.contains(&dec("2.5")));
    }

    #[test]
    fn sign_and_zero() {
        assert!(dec("-3.2").is_negative());
        assert!(!dec("+3.2").is_negative());
        assert!(dec("-0.00").is_zero());
        assert!(!dec("-0.00").is_negative());
    }

    #[test]
    fn rejects_non_decimals() {
        for bad in ["", "-", ".", "1.2.3", "abc", "1e", "1e+", "NaN", "Infinity", " 1", "1_000", "0x10"] {
            assert!(Decimal::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn from_integer() {
        assert_eq!(Decimal::from(1200), dec("1.2e3"));
        assert_eq!(Decimal::from(-7).as_str(), "-7");
        assert!(Decimal::from(0).is_zero());
    }
}
