//! Coin amounts and gas-price policy.
//!
//! Gas prices use the Cosmos decimal-coin syntax, e.g. `0.0025uband` or
//! `0.01uband,1stake`. Amounts are kept as 18-decimal fixed point so fee
//! computation never touches floating point.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of fractional digits kept for decimal amounts.
const DEC_PRECISION: u32 = 18;
const DEC_ONE: u128 = 10u128.pow(DEC_PRECISION);

/// Error parsing a gas-price string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoinParseError {
    #[error("invalid decimal coin expression: {0}")]
    InvalidCoin(String),

    #[error("invalid denomination: {0}")]
    InvalidDenom(String),

    #[error("too many decimal places in {0} (max 18)")]
    Precision(String),

    #[error("duplicate denomination: {0}")]
    DuplicateDenom(String),
}

/// Integer coin amount, as charged in a fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Decimal coin amount used for gas prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecCoin {
    pub denom: String,
    /// Amount scaled by 10^18.
    atto_amount: u128,
}

impl DecCoin {
    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.atto_amount == 0
    }

    /// Fee owed for `gas` units at this price, rounded up.
    pub fn fee_for(&self, gas: u64) -> Coin {
        let scaled = self.atto_amount.saturating_mul(gas as u128);
        Coin {
            denom: self.denom.clone(),
            amount: scaled.div_ceil(DEC_ONE),
        }
    }
}

impl FromStr for DecCoin {
    type Err = CoinParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| CoinParseError::InvalidCoin(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        validate_denom(denom)?;

        Ok(Self {
            denom: denom.to_string(),
            atto_amount: parse_decimal(amount)?,
        })
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.atto_amount / DEC_ONE;
        let frac = self.atto_amount % DEC_ONE;
        write!(f, "{}.{:018}{}", whole, frac, self.denom)
    }
}

fn validate_denom(denom: &str) -> Result<(), CoinParseError> {
    let mut chars = denom.chars();
    let valid_head = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let valid_tail = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '/');
    if !valid_head || !valid_tail || !(3..=128).contains(&denom.len()) {
        return Err(CoinParseError::InvalidDenom(denom.to_string()));
    }
    Ok(())
}

fn parse_decimal(amount: &str) -> Result<u128, CoinParseError> {
    let invalid = || CoinParseError::InvalidCoin(amount.to_string());
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) || (amount.contains('.') && frac.is_empty()) {
        return Err(invalid());
    }
    if frac.len() > DEC_PRECISION as usize {
        return Err(CoinParseError::Precision(amount.to_string()));
    }

    let whole: u128 = whole.parse().map_err(|_| invalid())?;
    let frac_scaled: u128 = if frac.is_empty() {
        0
    } else {
        let digits: u128 = frac.parse().map_err(|_| invalid())?;
        digits * 10u128.pow(DEC_PRECISION - frac.len() as u32)
    };

    whole
        .checked_mul(DEC_ONE)
        .and_then(|w| w.checked_add(frac_scaled))
        .ok_or_else(invalid)
}

/// Gas-price policy: zero or more decimal coins, zero amounts dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasPrices(Vec<DecCoin>);

impl GasPrices {
    /// Parse a comma-separated list of decimal coins. Empty input means no gas price.
    pub fn parse(s: &str) -> Result<Self, CoinParseError> {
        let mut coins: Vec<DecCoin> = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let coin: DecCoin = part.parse()?;
            if coins.iter().any(|c| c.denom == coin.denom) {
                return Err(CoinParseError::DuplicateDenom(coin.denom));
            }
            coins.push(coin);
        }
        coins.retain(|c| !c.is_zero());
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        Ok(Self(coins))
    }

    /// Whether any non-zero gas price is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fee amounts for a transaction with the given gas limit.
    pub fn fee_for(&self, gas_limit: u64) -> Vec<Coin> {
        self.0.iter().map(|price| price.fee_for(gas_limit)).collect()
    }

    pub fn coins(&self) -> &[DecCoin] {
        &self.0
    }
}

impl fmt::Display for GasPrices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", coin)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gas_prices() {
        let prices = GasPrices::parse("0.0025uband").unwrap();
        assert_eq!(prices.coins().len(), 1);
        assert_eq!(prices.coins()[0].denom, "uband");
        assert_eq!(prices.to_string(), "0.002500000000000000uband");
    }

    #[test]
    fn test_empty_and_zero_prices() {
        assert!(GasPrices::parse("").unwrap().is_empty());
        assert!(GasPrices::parse("  ").unwrap().is_empty());
        assert!(GasPrices::parse("0uband").unwrap().is_empty());
        assert!(GasPrices::parse("0.000uband").unwrap().is_empty());
    }

    #[test]
    fn test_fee_rounds_up() {
        let prices = GasPrices::parse("0.0025uband").unwrap();
        // 0.0025 * 200_001 = 500.0025 -> 501
        assert_eq!(
            prices.fee_for(200_001),
            vec![Coin { denom: "uband".into(), amount: 501 }]
        );
        assert_eq!(prices.fee_for(200_000)[0].amount, 500);
    }

    #[test]
    fn test_multiple_denoms_sorted() {
        let prices = GasPrices::parse("1stake,0.5uband").unwrap();
        let denoms: Vec<_> = prices.coins().iter().map(|c| c.denom.as_str()).collect();
        assert_eq!(denoms, vec!["stake", "uband"]);
    }

    #[test]
    fn test_malformed_gas_prices() {
        assert!(matches!(
            GasPrices::parse("uband"),
            Err(CoinParseError::InvalidCoin(_))
        ));
        assert!(matches!(
            GasPrices::parse("1.uband"),
            Err(CoinParseError::InvalidCoin(_))
        ));
        assert!(matches!(
            GasPrices::parse("0.1UBAND"),
            Err(CoinParseError::InvalidDenom(_))
        ));
        assert!(matches!(
            GasPrices::parse("0.1ub"),
            Err(CoinParseError::InvalidDenom(_))
        ));
        assert!(matches!(
            GasPrices::parse("0.1uband,0.2uband"),
            Err(CoinParseError::DuplicateDenom(_))
        ));
        assert!(matches!(
            GasPrices::parse("0.0000000000000000001uband"),
            Err(CoinParseError::Precision(_))
        ));
    }
}
