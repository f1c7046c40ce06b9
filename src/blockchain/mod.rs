//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! msg.rs (MsgRequestData)
//!     → gas.rs (size-based gas limit)
//!     → transaction.rs (account lookup, envelope, sign, broadcast)
//!         → wallet.rs (keyring, secp256k1 signing)
//!         → client.rs (Tendermint JSON-RPC)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Every node call has a deadline

pub mod address;
pub mod client;
pub mod coins;
pub mod gas;
pub mod msg;
pub mod proto;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{HttpNodeClient, NodeClient};
pub use coins::GasPrices;
pub use msg::{Msg, MsgRequestData};
pub use transaction::{Submitter, TxSubmitter};
pub use types::{AccountInfo, ChainError, ChainResult, KeyInfo, NodeStatus};
pub use wallet::{EnvKeyring, Keyring, Wallet};
