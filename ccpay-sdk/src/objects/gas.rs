use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A single-denom token amount, as sent in a bank transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    /// Base-unit amount as a decimal integer string.
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// Price per unit of gas, parsed from strings like `0.025peaka`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GasPrice {
    pub amount: Decimal,
    pub denom: String,
}

impl FromStr for GasPrice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidGasPrice(s.to_string());
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let (amount, denom) = s.split_at(split);
        let has_digit = amount.bytes().any(|b| b.is_ascii_digit());
        if !has_digit || !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if !denom
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
        {
            return Err(invalid());
        }
        let amount = Decimal::from_str(amount).map_err(|_| invalid())?;
        Ok(Self {
            amount,
            denom: denom.to_string(),
        })
    }
}

impl std::fmt::Display for GasPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
