//! Decimal amount parsing and display.
//!
//! User input arrives as decimal strings denominated in whole coins. It is
//! converted to integer smallest units before any arithmetic; no floating
//! point is involved anywhere in the conversion.

use crate::constants::{COIN, DECIMALS};
use crate::error::AmountError;

/// Parse a coin-denominated decimal string (`"12.5"`, `".5"`, `"3."`) into
/// smallest units.
///
/// Surrounding whitespace is ignored. Signs, exponents and grouping
/// separators are rejected. Zero is accepted; callers that need a positive
/// amount check for it.
///
/// # Examples
///
/// ```
/// use alder_core::amount::parse_amount;
/// assert_eq!(parse_amount("1").unwrap(), 1_000_000_000_000_000_000);
/// assert_eq!(parse_amount("0.000000000000000001").unwrap(), 1);
/// ```
pub fn parse_amount(input: &str) -> Result<u128, AmountError> {
    let s = input.trim();
    if s.is_empty() || s == "." {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match s.split_once('.') {
        Some((w, f)) => {
            if f.contains('.') {
                return Err(AmountError::MultipleDecimalPoints);
            }
            (w, f)
        }
        None => (s, ""),
    };

    if let Some(c) = whole.chars().chain(fraction.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }
    if fraction.len() > DECIMALS {
        return Err(AmountError::TooManyDecimals {
            got: fraction.len(),
            max: DECIMALS,
        });
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(COIN)
            .ok_or(AmountError::Overflow)?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<width$}", width = DECIMALS);
        padded.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };

    whole_units
        .checked_add(fraction_units)
        .ok_or(AmountError::Overflow)
}

/// Parse a plain non-negative integer such as a gas amount.
pub fn parse_integer(input: &str) -> Result<u128, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }
    s.parse::<u128>()
        .map_err(|e| AmountError::InvalidInteger(e.to_string()))
}

/// Render smallest units as an exact coin-denominated decimal with trailing
/// zeros trimmed.
///
/// # Examples
///
/// ```
/// use alder_core::amount::format_amount;
/// assert_eq!(format_amount(1_500_000_000_000_000_000), "1.5");
/// assert_eq!(format_amount(0), "0");
/// ```
pub fn format_amount(units: u128) -> String {
    let whole = units / COIN;
    let fraction = units % COIN;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0>width$}", width = DECIMALS);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_whole_coins() {
        assert_eq!(parse_amount("100").unwrap(), 100 * COIN);
    }

    #[test]
    fn parse_fraction_only() {
        assert_eq!(parse_amount(".5").unwrap(), COIN / 2);
    }

    #[test]
    fn parse_trailing_point() {
        assert_eq!(parse_amount("3.").unwrap(), 3 * COIN);
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(parse_amount("  2.25 \n").unwrap(), 2 * COIN + COIN / 4);
    }

    #[test]
    fn parse_zero_is_allowed() {
        assert_eq!(parse_amount("0.0").unwrap(), 0);
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(parse_amount("   "), Err(AmountError::Empty));
        assert_eq!(parse_amount("."), Err(AmountError::Empty));
    }

    #[test]
    fn parse_rejects_sign_and_exponent() {
        assert_eq!(parse_amount("-1"), Err(AmountError::InvalidCharacter('-')));
        assert_eq!(parse_amount("1e5"), Err(AmountError::InvalidCharacter('e')));
    }

    #[test]
    fn parse_rejects_two_points() {
        assert_eq!(parse_amount("1.2.3"), Err(AmountError::MultipleDecimalPoints));
    }

    #[test]
    fn parse_rejects_nineteen_decimals() {
        assert_eq!(
            parse_amount("0.0000000000000000001"),
            Err(AmountError::TooManyDecimals { got: 19, max: 18 })
        );
    }

    #[test]
    fn parse_rejects_overflow() {
        let huge = "9".repeat(40);
        assert_eq!(parse_amount(&huge), Err(AmountError::Overflow));
    }

    #[test]
    fn parse_integer_gas_amount() {
        assert_eq!(parse_integer("20000").unwrap(), 20_000);
        assert!(parse_integer("20000.5").is_err());
        assert!(parse_integer("").is_err());
    }

    #[test]
    fn format_smallest_unit() {
        assert_eq!(format_amount(1), "0.000000000000000001");
    }

    #[test]
    fn format_trims_zeros() {
        assert_eq!(format_amount(12 * COIN + COIN / 10), "12.1");
    }

    proptest! {
        #[test]
        fn parse_never_panics(s in "\\PC{0,40}") {
            let _ = parse_amount(&s);
        }

        #[test]
        fn whole_coins_scale_exactly(n in 0u64..=u64::MAX) {
            prop_assert_eq!(parse_amount(&n.to_string()).unwrap(), n as u128 * COIN);
        }
    }
}
