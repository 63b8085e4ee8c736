// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable token amounts and base units.
//!
//! Wire amounts are always non-negative integers in base units (e.g. `unmx`).
//! Display amounts are derived from them and never stored as the source of
//! truth.

use crate::error::WalletError;

/// Largest supported number of decimal places.
pub const MAX_DECIMAL_PLACES: u8 = 18;

/// Converts amounts for a token with a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitConverter {
    decimals: u8,
}

impl UnitConverter {
    /// Create a converter. `decimals` above [`MAX_DECIMAL_PLACES`] is clamped.
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals.min(MAX_DECIMAL_PLACES),
        }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Parse a human amount (e.g. `"1.5"`) into base units (e.g. `"1500000"`).
    ///
    /// Fractional digits beyond the configured precision are truncated.
    /// [`from_base_units`](Self::from_base_units) gives back the canonical
    /// spelling: `"1.50"`, `"01"` and `".5"` return as `"1.5"`, `"1"` and
    /// `"0.5"`. Canonical inputs return unchanged.
    pub fn to_base_units(&self, amount: &str) -> Result<String, WalletError> {
        self.parse(amount).map(|units| units.to_string())
    }

    /// Same as [`to_base_units`](Self::to_base_units) but returns the integer.
    pub fn parse(&self, amount: &str) -> Result<u128, WalletError> {
        let trimmed = amount.trim();
        if trimmed.is_empty() {
            return Err(WalletError::invalid_amount("amount is empty"));
        }
        if trimmed.starts_with('-') {
            return Err(WalletError::invalid_amount(format!(
                "amount must not be negative: {trimmed}"
            )));
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(WalletError::invalid_amount(format!(
                "not a number: {trimmed}"
            )));
        }
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(WalletError::invalid_amount(format!(
                "not a number: {trimmed}"
            )));
        }

        let whole_units = if whole.is_empty() {
            0u128
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| WalletError::invalid_amount(format!("amount overflow: {trimmed}")))?
        };

        let precision = self.decimals as usize;
        let kept = &fraction[..fraction.len().min(precision)];
        let padded = format!("{kept:0<precision$}");
        let fraction_units = if padded.is_empty() {
            0u128
        } else {
            padded
                .parse::<u128>()
                .map_err(|_| WalletError::invalid_amount(format!("not a number: {trimmed}")))?
        };

        whole_units
            .checked_mul(self.multiplier())
            .and_then(|w| w.checked_add(fraction_units))
            .ok_or_else(|| WalletError::invalid_amount(format!("amount overflow: {trimmed}")))
    }

    /// Format base units (e.g. `"1500000"`) as a human amount (e.g. `"1.5"`).
    pub fn from_base_units(&self, amount: &str) -> Result<String, WalletError> {
        let trimmed = amount.trim();
        if trimmed.starts_with('-') {
            return Err(WalletError::invalid_amount(format!(
                "amount must not be negative: {trimmed}"
            )));
        }
        if trimmed.is_empty() || !all_digits(trimmed) {
            return Err(WalletError::invalid_amount(format!(
                "not an integer amount: {trimmed}"
            )));
        }
        let units = trimmed
            .parse::<u128>()
            .map_err(|_| WalletError::invalid_amount(format!("amount overflow: {trimmed}")))?;
        Ok(self.format(units))
    }

    /// Format an integer amount of base units.
    pub fn format(&self, units: u128) -> String {
        if units == 0 {
            return "0".to_string();
        }

        let divisor = self.multiplier();
        let whole = units / divisor;
        let remainder = units % divisor;

        if remainder == 0 {
            return whole.to_string();
        }

        let decimal_str = format!("{:0>width$}", remainder, width = self.decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{whole}.{trimmed}")
    }

    fn multiplier(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nmx() -> UnitConverter {
        UnitConverter::new(6)
    }

    #[test]
    fn to_base_units_decimal() {
        assert_eq!(nmx().to_base_units("1.5").unwrap(), "1500000");
        assert_eq!(nmx().to_base_units("100").unwrap(), "100000000");
        assert_eq!(nmx().to_base_units("0.000001").unwrap(), "1");
        assert_eq!(nmx().to_base_units(".5").unwrap(), "500000");
    }

    #[test]
    fn to_base_units_truncates_excess_precision() {
        assert_eq!(nmx().to_base_units("1.23456789").unwrap(), "1234567");
        assert_eq!(nmx().to_base_units("0.0000009").unwrap(), "0");
    }

    #[test]
    fn from_base_units_formats() {
        assert_eq!(nmx().from_base_units("1500000").unwrap(), "1.5");
        assert_eq!(nmx().from_base_units("100000000").unwrap(), "100");
        assert_eq!(nmx().from_base_units("1").unwrap(), "0.000001");
        assert_eq!(nmx().from_base_units("0").unwrap(), "0");
    }

    #[test]
    fn round_trip_for_representable_amounts() {
        let converter = nmx();
        for x in ["0", "1", "1.5", "0.000001", "42.123456", "1000000", "7.01"] {
            let base = converter.to_base_units(x).unwrap();
            assert_eq!(converter.from_base_units(&base).unwrap(), x, "round trip of {x}");
        }
    }

    #[test]
    fn round_trip_returns_canonical_spelling() {
        let converter = nmx();
        for (x, canonical) in [
            ("1.50", "1.5"),
            ("01", "1"),
            (".5", "0.5"),
            ("2.000000", "2"),
            (" 3 ", "3"),
            ("0.0", "0"),
        ] {
            let base = converter.to_base_units(x).unwrap();
            assert_eq!(converter.from_base_units(&base).unwrap(), canonical, "round trip of {x:?}");
        }
    }

    #[test]
    fn rejects_negative_and_non_numeric() {
        let converter = nmx();
        for bad in ["-1", "abc", "", ".", "1.2.3", "1e6", " - 5", "0x10"] {
            assert!(
                matches!(converter.to_base_units(bad), Err(WalletError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
        for bad in ["-1", "1.5", "abc", ""] {
            assert!(
                matches!(converter.from_base_units(bad), Err(WalletError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        let converter = UnitConverter::new(18);
        let huge = "9".repeat(40);
        assert!(matches!(
            converter.to_base_units(&huge),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn zero_decimals() {
        let converter = UnitConverter::new(0);
        assert_eq!(converter.to_base_units("12.9").unwrap(), "12");
        assert_eq!(converter.from_base_units("12").unwrap(), "12");
    }
}
