//! Client-side gas estimation for oracle request transactions.
//!
//! # Model
//! ```text
//! size = BASE_TRANSACTION_SIZE + Σ len(encode(msg))
//! gas  = BASE_FIXED_GAS + TX_COST_PER_BYTE × size
//!      + PAYING_FEE_COST              (only when a gas price is set)
//! ```

use crate::blockchain::coins::GasPrices;
use crate::blockchain::msg::Msg;

/// Envelope overhead: signature verification, account lookups.
pub const BASE_FIXED_GAS: u64 = 37_764;
/// Bytes of a transaction excluding its messages.
pub const BASE_TRANSACTION_SIZE: u64 = 200;
/// Matches the chain's `TxSizeCostPerByte` parameter.
pub const TX_COST_PER_BYTE: u64 = 5;
/// Extra instructions spent deducting fees.
pub const PAYING_FEE_COST: u64 = 16_500;

/// Estimated transaction size in bytes.
///
/// # Panics
/// On any message that is not a [`Msg::RequestData`]; reaching here with
/// another kind means the caller was wired wrong.
pub fn estimate_tx_size(msgs: &[Msg]) -> u64 {
    msgs.iter().fold(BASE_TRANSACTION_SIZE, |size, msg| match msg {
        Msg::RequestData(_) => size + msg.encoded_len() as u64,
        other => panic!(
            "gas estimation supports only oracle request messages, got {}",
            other.type_url()
        ),
    })
}

/// Estimated gas limit for a transaction carrying `msgs`.
pub fn estimate_gas(gas_prices: &GasPrices, msgs: &[Msg]) -> u64 {
    let mut gas = BASE_FIXED_GAS;
    gas += TX_COST_PER_BYTE * estimate_tx_size(msgs);

    if !gas_prices.is_empty() {
        gas += PAYING_FEE_COST;
    }

    gas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::msg::{MsgRequestData, MsgSend};

    /// Serialises to exactly 50 bytes.
    fn fifty_byte_request() -> Msg {
        Msg::RequestData(MsgRequestData {
            oracle_script_id: 37,
            calldata: vec![0u8; 28],
            ask_count: 4,
            min_count: 3,
            client_id: "c1".into(),
            sender: "band1xyz".into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_fifty_byte_message_without_gas_price() {
        let msg = fifty_byte_request();
        assert_eq!(msg.encoded_len(), 50);

        let gas = estimate_gas(&GasPrices::default(), &[msg]);
        assert_eq!(gas, BASE_FIXED_GAS + TX_COST_PER_BYTE * (BASE_TRANSACTION_SIZE + 50));
        assert_eq!(gas, 37_764 + 5 * 250);
    }

    #[test]
    fn test_gas_price_adds_paying_fee_cost() {
        let msgs = [fifty_byte_request()];
        let free = estimate_gas(&GasPrices::default(), &msgs);
        let paid = estimate_gas(&GasPrices::parse("0.0025uband").unwrap(), &msgs);
        assert_eq!(paid - free, PAYING_FEE_COST);
        assert!(paid > free);
    }

    #[test]
    fn test_zero_gas_price_has_no_surcharge() {
        let msgs = [fifty_byte_request()];
        let zero = GasPrices::parse("0uband").unwrap();
        assert_eq!(
            estimate_gas(&zero, &msgs),
            estimate_gas(&GasPrices::default(), &msgs)
        );
    }

    #[test]
    fn test_gas_is_monotonic_in_messages() {
        let prices = GasPrices::default();
        let mut msgs = Vec::new();
        let mut previous = estimate_gas(&prices, &msgs);
        for _ in 0..5 {
            msgs.push(fifty_byte_request());
            let next = estimate_gas(&prices, &msgs);
            assert!(next >= previous);
            previous = next;
        }
    }

    #[test]
    fn test_empty_message_set_is_envelope_only() {
        assert_eq!(estimate_tx_size(&[]), BASE_TRANSACTION_SIZE);
    }

    #[test]
    #[should_panic(expected = "supports only oracle request messages")]
    fn test_non_request_message_panics() {
        let send = Msg::Send(MsgSend {
            from_address: "band1a".into(),
            to_address: "band1b".into(),
            amount: Vec::new(),
        });
        estimate_gas(&GasPrices::default(), &[fifty_byte_request(), send]);
    }
}
