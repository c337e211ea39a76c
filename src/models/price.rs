//! Fixed-point currency amount with two decimal places, stored as NUMERIC(10,2).

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub const MAX_DIGITS: usize = 10;
pub const DECIMAL_PLACES: usize = 2;

/// Amount in hundredths. Rendered as `"1200.00"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceError {
    NotANumber,
    TooManyDigits,
    TooManyDecimalPlaces,
    TooManyWholeDigits,
}

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Price(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([+-])?(\d*)(?:\.(\d*))?(?:[eE]([+-]?\d{1,4}))?$").expect("decimal pattern compiles")
    })
}

impl FromStr for Price {
    type Err = PriceError;

    /// Parse a decimal literal (optional sign, fraction and exponent) with the
    /// NUMERIC(10,2) limits applied.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = decimal_re().captures(s.trim()).ok_or(PriceError::NotANumber)?;
        let negative = caps.get(1).map(|m| m.as_str() == "-").unwrap_or(false);
        let int_part = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let frac_part = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(PriceError::NotANumber);
        }
        let exp: i64 = match caps.get(4) {
            Some(m) => m.as_str().parse().map_err(|_| PriceError::NotANumber)?,
            None => 0,
        };

        let all_digits = format!("{}{}", int_part, frac_part);
        let significant = all_digits.trim_start_matches('0');
        let significant = if significant.is_empty() { "0" } else { significant };
        let exponent = exp - frac_part.len() as i64;

        let (digits, decimals) = if exponent >= 0 {
            (significant.len() as i64 + exponent, 0)
        } else if -exponent > significant.len() as i64 {
            (-exponent, -exponent)
        } else {
            (significant.len() as i64, -exponent)
        };
        let whole_digits = digits - decimals;

        if digits > MAX_DIGITS as i64 {
            return Err(PriceError::TooManyDigits);
        }
        if decimals > DECIMAL_PLACES as i64 {
            return Err(PriceError::TooManyDecimalPlaces);
        }
        if whole_digits > (MAX_DIGITS - DECIMAL_PLACES) as i64 {
            return Err(PriceError::TooManyWholeDigits);
        }

        let mantissa: i64 = significant.parse().map_err(|_| PriceError::NotANumber)?;
        let shift = exponent + DECIMAL_PLACES as i64;
        let cents = mantissa
            .checked_mul(10i64.pow(shift as u32))
            .ok_or(PriceError::TooManyDigits)?;
        Ok(Price(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
