//! Price request scheduling.
//!
//! # Data Flow
//! ```text
//! DaemonContext (symbols, counts, gas prices, keys)
//!     → PriceInput → OBI calldata
//!     → MsgRequestData (+ random client id)
//!     → estimate_gas → Submitter::sign_and_broadcast
//!     → success: sleep request_interval
//!     → failure: record error, sleep rpc_poll_interval, retry
//! ```

pub mod client_id;
pub mod context;
pub mod request_loop;

pub use context::{ContextError, DaemonContext};
pub use request_loop::RequestLoop;

use thiserror::Error;

use crate::blockchain::types::ChainError;
use crate::obi::ObiError;

/// Reasons the request loop stops on its own.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Calldata could not be encoded; the configuration produced an impossible payload.
    #[error("calldata encoding failed: {0}")]
    Encoding(#[from] ObiError),

    #[error("no signing key available")]
    NoKeys,

    /// A failure retrying cannot fix (e.g. the key cannot sign).
    #[error("unrecoverable submission error: {0}")]
    Fatal(#[source] ChainError),
}
