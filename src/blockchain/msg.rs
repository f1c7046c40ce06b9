//! Chain messages this daemon can put in a transaction.

use prost::Message;

use crate::blockchain::proto::{Any, Coin};

pub const MSG_REQUEST_DATA_TYPE_URL: &str = "/oracle.v1.MsgRequestData";
pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";

/// `oracle.v1.MsgRequestData`: ask validators to run an oracle script.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgRequestData {
    #[prost(uint64, tag = "1")]
    pub oracle_script_id: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub calldata: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub ask_count: u64,
    #[prost(uint64, tag = "4")]
    pub min_count: u64,
    #[prost(string, tag = "5")]
    pub client_id: String,
    #[prost(message, repeated, tag = "6")]
    pub fee_limit: Vec<Coin>,
    #[prost(uint64, tag = "7")]
    pub prepare_gas: u64,
    #[prost(uint64, tag = "8")]
    pub execute_gas: u64,
    #[prost(string, tag = "9")]
    pub sender: String,
}

/// `cosmos.bank.v1beta1.MsgSend`.
///
/// The daemon never builds one. It is the non-request kind that the gas
/// estimator must refuse, and it keeps that refusal testable.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgSend {
    #[prost(string, tag = "1")]
    pub from_address: String,
    #[prost(string, tag = "2")]
    pub to_address: String,
    #[prost(message, repeated, tag = "3")]
    pub amount: Vec<Coin>,
}

/// A transaction message.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    RequestData(MsgRequestData),
    /// Encodable, but rejected by gas estimation.
    Send(MsgSend),
}

impl Msg {
    pub fn type_url(&self) -> &'static str {
        match self {
            Msg::RequestData(_) => MSG_REQUEST_DATA_TYPE_URL,
            Msg::Send(_) => MSG_SEND_TYPE_URL,
        }
    }

    /// Canonical protobuf bytes of the message itself (no `Any` wrapper).
    pub fn encode_to_vec(&self) -> Vec<u8> {
        match self {
            Msg::RequestData(m) => m.encode_to_vec(),
            Msg::Send(m) => m.encode_to_vec(),
        }
    }

    /// Length of [`Msg::encode_to_vec`] without allocating.
    pub fn encoded_len(&self) -> usize {
        match self {
            Msg::RequestData(m) => m.encoded_len(),
            Msg::Send(m) => m.encoded_len(),
        }
    }

    /// Wrap the message for inclusion in a `TxBody`.
    pub fn to_any(&self) -> Any {
        Any {
            type_url: self.type_url().to_string(),
            value: self.encode_to_vec(),
        }
    }
}

impl From<MsgRequestData> for Msg {
    fn from(msg: MsgRequestData) -> Self {
        Msg::RequestData(msg)
    }
}
