//! Price request calldata.

use crate::obi::codec::{ObiDecode, ObiEncode};
use crate::obi::ObiResult;

/// Fixed-point multiplier applied to prices on-chain (1e9).
pub const PRICE_MULTIPLIER: u64 = 1_000_000_000;

/// Input of the price oracle script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceInput {
    /// Symbols to price, in request order.
    pub symbols: Vec<String>,
    /// Multiplier converting prices to integers.
    pub multiplier: u64,
}

impl PriceInput {
    /// Build an input for `symbols` with the standard multiplier.
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            multiplier: PRICE_MULTIPLIER,
        }
    }
}

impl ObiEncode for PriceInput {
    fn encode_into(&self, buf: &mut Vec<u8>) -> ObiResult<()> {
        self.symbols.encode_into(buf)?;
        self.multiplier.encode_into(buf)
    }
}

impl ObiDecode for PriceInput {
    fn decode_from(input: &mut &[u8]) -> ObiResult<Self> {
        Ok(Self {
            symbols: Vec::<String>::decode_from(input)?,
            multiplier: u64::decode_from(input)?,
        })
    }
}
