//! Exact conversion between human-readable decimal amounts and integer base units.
//!
//! Conversion works digit-wise on the textual form, so amounts of any magnitude
//! convert without floating-point drift. Fractional digits beyond the currency's
//! precision are truncated, never rounded.

use crate::constants::{APT_DECIMALS, DEFAULT_DECIMALS, USDC_DECIMALS};
use crate::core::errors::AmountError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Convert a decimal amount (string or number) to a base-unit integer string.
///
/// `to_base_units(&1.5, 8)` is `"150000000"`. Empty or zero input yields `"0"`.
pub fn to_base_units<T: fmt::Display + ?Sized>(amount: &T, decimals: u32) -> Result<String, AmountError> {
    let text = amount.to_string();
    let text = text.trim();
    if text.is_empty() {
        return Ok("0".to_string());
    }

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(text.to_string()));
    }

    let decimals = decimals as usize;
    let kept = fraction.len().min(decimals);
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(&fraction[..kept]);
    digits.extend(std::iter::repeat_n('0', decimals - kept));

    let result = canonical(&digits);
    if negative && result != "0" {
        return Err(AmountError::Negative(text.to_string()));
    }
    Ok(result)
}

/// Convert a base-unit integer (string or number) back to a decimal string.
///
/// Trailing fractional zeros are stripped and the decimal point is omitted when
/// nothing remains after it: `from_base_units("150000000", 8)` is `"1.5"`.
pub fn from_base_units<T: fmt::Display + ?Sized>(amount: &T, decimals: u32) -> Result<String, AmountError> {
    let text = amount.to_string();
    let text = text.trim();
    if text.is_empty() {
        return Ok("0".to_string());
    }
    if !is_digits(text) {
        return Err(AmountError::Invalid(text.to_string()));
    }
    Ok(format_digits(text, decimals))
}

/// Decimal precision for a settlement currency. Unknown codes use 6.
pub fn decimals_for_currency(code: &str) -> u32 {
    match code {
        "USDC" => USDC_DECIMALS,
        "APT" => APT_DECIMALS,
        _ => DEFAULT_DECIMALS,
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn canonical(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// `digits` must be ASCII digits only.
fn format_digits(digits: &str, decimals: u32) -> String {
    let digits = canonical(digits);
    if digits == "0" || decimals == 0 {
        return digits;
    }

    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// An on-chain amount in the currency's smallest denomination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseUnits(u128);

impl BaseUnits {
    pub const ZERO: BaseUnits = BaseUnits(0);

    pub fn new(value: u128) -> Self {
        BaseUnits(value)
    }

    /// Convert a human-readable amount with the given precision.
    pub fn from_decimal<T: fmt::Display + ?Sized>(amount: &T, decimals: u32) -> Result<Self, AmountError> {
        to_base_units(amount, decimals)?.parse()
    }

    pub fn to_decimal(self, decimals: u32) -> String {
        format_digits(&self.0.to_string(), decimals)
    }

    /// Approximate decimal value for ledger bookkeeping.
    pub fn to_f64(self, decimals: u32) -> f64 {
        self.0 as f64 / 10f64.powi(decimals as i32)
    }

    pub fn value(self) -> u128 {
        self.0
    }

    pub fn as_u64(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    pub fn checked_add(self, other: BaseUnits) -> Result<BaseUnits, AmountError> {
        self.0
            .checked_add(other.0)
            .map(BaseUnits)
            .ok_or_else(|| AmountError::Overflow(format!("{} + {}", self.0, other.0)))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for BaseUnits {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(BaseUnits::ZERO);
        }
        if !is_digits(s) {
            return Err(AmountError::Invalid(s.to_string()));
        }
        s.parse::<u128>()
            .map(BaseUnits)
            .map_err(|_| AmountError::Overflow(s.to_string()))
    }
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BaseUnits {
    fn from(value: u64) -> Self {
        BaseUnits(u128::from(value))
    }
}

// Serialized as a decimal string, matching relay wire formats.
impl Serialize for BaseUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BaseUnits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
