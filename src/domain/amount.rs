//! Exact minor-unit amount arithmetic.
//!
//! The ledger stores amounts as 18-decimal fixed-point integers ("wei" minor
//! units). Aggregation and equality checks must never touch floating point;
//! everything here is `U256` integer math, and rounding happens only in
//! [`Wei::display_major`] at the presentation boundary.

use crate::foundation::constants::{DISPLAY_DECIMALS, MINOR_UNIT_DECIMALS, MINOR_UNITS_PER_MAJOR};
use crate::foundation::SyncError;
use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative minor-unit amount.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Wei(U256);

impl Wei {
    pub const ZERO: Wei = Wei(U256::ZERO);

    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }

    /// Parse a minor-unit amount from a plain decimal integer string.
    ///
    /// Anything other than a non-empty run of ASCII digits (no sign, no
    /// prefix, no separators) is rejected.
    pub fn from_minor_str(input: &str) -> Result<Wei, SyncError> {
        parse_digits(input).map(Wei)
    }

    /// Parse a major-unit decimal string ("0.5", "3", "12.000000000000000001")
    /// into minor units.
    ///
    /// At most 18 fractional digits are representable; more precise inputs
    /// are rejected rather than silently truncated.
    pub fn from_major_str(input: &str) -> Result<Wei, SyncError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SyncError::InvalidAmount("empty amount".to_string()));
        }
        let (whole, frac) = match input.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (input, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(SyncError::InvalidAmount(input.to_string()));
        }
        if frac.len() > MINOR_UNIT_DECIMALS as usize {
            return Err(SyncError::InvalidAmount(format!("{input}: more than {MINOR_UNIT_DECIMALS} fractional digits")));
        }

        let whole_part = if whole.is_empty() { U256::ZERO } else { parse_digits(whole)? };
        let frac_part = if frac.is_empty() {
            U256::ZERO
        } else {
            let parsed = parse_digits(frac)?;
            let shift = pow10(MINOR_UNIT_DECIMALS - frac.len() as u32);
            parsed.checked_mul(shift).ok_or_else(|| SyncError::InvalidAmount(input.to_string()))?
        };

        whole_part
            .checked_mul(U256::from(MINOR_UNITS_PER_MAJOR))
            .and_then(|scaled| scaled.checked_add(frac_part))
            .map(Wei)
            .ok_or_else(|| SyncError::InvalidAmount(format!("{input}: overflow")))
    }

    /// Exact major-unit rendering with no rounding ("7", "0.5",
    /// "3.000000000000000001"). Trailing fractional zeros are trimmed.
    pub fn to_major_string(&self) -> String {
        let scale = U256::from(MINOR_UNITS_PER_MAJOR);
        let whole = self.0 / scale;
        let rem = self.0 % scale;
        if rem == U256::ZERO {
            return whole.to_string();
        }
        let mut frac = rem.to_string();
        while frac.len() < MINOR_UNIT_DECIMALS as usize {
            frac.insert(0, '0');
        }
        let frac = frac.trim_end_matches('0');
        format!("{whole}.{frac}")
    }

    /// Presentation-boundary rendering: rounded half-up to exactly
    /// [`DISPLAY_DECIMALS`] decimal places ("0.5000", "7.0000").
    pub fn display_major(&self) -> String {
        let quantum = pow10(MINOR_UNIT_DECIMALS - DISPLAY_DECIMALS);
        let half = quantum / U256::from(2u8);
        // Saturate instead of wrapping if the half-up adjustment would
        // overflow; such an amount is far beyond any real ledger value.
        let adjusted = self.0.checked_add(half).unwrap_or(self.0);
        let units = adjusted / quantum;
        let display_scale = pow10(DISPLAY_DECIMALS);
        let whole = units / display_scale;
        let mut frac = (units % display_scale).to_string();
        while frac.len() < DISPLAY_DECIMALS as usize {
            frac.insert(0, '0');
        }
        format!("{whole}.{frac}")
    }

    pub fn checked_add(&self, other: Wei) -> Option<Wei> {
        self.0.checked_add(other.0).map(Wei)
    }

    /// Integer percentage of `goal` this amount represents, capped at 100.
    pub fn percent_of(&self, goal: Wei) -> u8 {
        if goal.is_zero() {
            return 0;
        }
        let pct = self.0.saturating_mul(U256::from(100u8)) / goal.0;
        if pct >= U256::from(100u8) {
            100
        } else {
            // Guaranteed < 100 here.
            pct.to::<u64>() as u8
        }
    }

    pub fn to_minor_string(&self) -> String {
        self.0.to_string()
    }
}

fn parse_digits(input: &str) -> Result<U256, SyncError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SyncError::InvalidAmount(input.to_string()));
    }
    let mut acc = U256::ZERO;
    let ten = U256::from(10u8);
    for byte in input.bytes() {
        acc = acc
            .checked_mul(ten)
            .and_then(|v| v.checked_add(U256::from(byte - b'0')))
            .ok_or_else(|| SyncError::InvalidAmount(format!("{input}: overflow")))?;
    }
    Ok(acc)
}

fn pow10(exp: u32) -> U256 {
    let mut value = U256::from(1u8);
    let ten = U256::from(10u8);
    for _ in 0..exp {
        value = value.saturating_mul(ten);
    }
    value
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wei {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Wei::from_minor_str(s)
    }
}

impl Serialize for Wei {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_minor_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Wei::from_minor_str(&raw).map_err(serde::de::Error::custom)
    }
}
