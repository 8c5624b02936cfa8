//! Optional gas overrides entered by the user.
//!
//! Gas amount is a plain integer; gas price is entered in whole coins like
//! any other amount. Blank fields mean "let the node decide".

use alder_core::amount::{parse_amount, parse_integer};
use alder_core::constants::{MINIMAL_GAS_AMOUNT, MINIMAL_GAS_PRICE};

use crate::error::BuildError;

/// Parsed and validated gas overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasSettings {
    /// Gas units, at least [`MINIMAL_GAS_AMOUNT`].
    pub gas_amount: Option<u64>,
    /// Price per gas unit in smallest units, at least [`MINIMAL_GAS_PRICE`].
    pub gas_price: Option<u128>,
}

impl GasSettings {
    /// Parse the two form fields.
    pub fn parse(gas_amount: Option<&str>, gas_price: Option<&str>) -> Result<Self, BuildError> {
        let gas_amount = match non_blank(gas_amount) {
            None => None,
            Some(s) => {
                let value = parse_integer(s).map_err(|e| BuildError::InvalidGasAmount(e.to_string()))?;
                let value = u64::try_from(value)
                    .map_err(|_| BuildError::InvalidGasAmount(format!("{value} is too large")))?;
                if value < MINIMAL_GAS_AMOUNT {
                    return Err(BuildError::InvalidGasAmount(format!(
                        "{value} is below the minimum of {MINIMAL_GAS_AMOUNT}"
                    )));
                }
                Some(value)
            }
        };

        let gas_price = match non_blank(gas_price) {
            None => None,
            Some(s) => {
                let value = parse_amount(s).map_err(|e| BuildError::InvalidGasPrice(e.to_string()))?;
                if value < MINIMAL_GAS_PRICE {
                    return Err(BuildError::InvalidGasPrice(format!(
                        "{value} is below the minimum of {MINIMAL_GAS_PRICE}"
                    )));
                }
                Some(value)
            }
        };

        Ok(Self { gas_amount, gas_price })
    }

    /// Fee implied by the overrides, when both are set.
    pub fn expected_fee(&self) -> Option<u128> {
        let amount = self.gas_amount? as u128;
        amount.checked_mul(self.gas_price?)
    }
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_defaults() {
        let g = GasSettings::parse(Some("  "), None).unwrap();
        assert_eq!(g, GasSettings::default());
        assert_eq!(g.expected_fee(), None);
    }

    #[test]
    fn valid_overrides() {
        let g = GasSettings::parse(Some("20000"), Some("0.0000001")).unwrap();
        assert_eq!(g.gas_amount, Some(20_000));
        assert_eq!(g.gas_price, Some(MINIMAL_GAS_PRICE));
        assert_eq!(g.expected_fee(), Some(20_000 * MINIMAL_GAS_PRICE));
    }

    #[test]
    fn gas_amount_below_minimum() {
        let err = GasSettings::parse(Some("19999"), None).unwrap_err();
        assert!(matches!(err, BuildError::InvalidGasAmount(_)));
    }

    #[test]
    fn gas_amount_not_integer() {
        let err = GasSettings::parse(Some("2e4"), None).unwrap_err();
        assert!(matches!(err, BuildError::InvalidGasAmount(_)));
    }

    #[test]
    fn gas_amount_too_large_for_u64() {
        let err = GasSettings::parse(Some("18446744073709551616"), None).unwrap_err();
        assert!(matches!(err, BuildError::InvalidGasAmount(_)));
    }

    #[test]
    fn gas_price_below_minimum() {
        let err = GasSettings::parse(None, Some("0.00000001")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidGasPrice(_)));
    }

    #[test]
    fn expected_fee_needs_both() {
        let g = GasSettings::parse(Some("30000"), None).unwrap();
        assert_eq!(g.expected_fee(), None);
    }
}
