//! Oracle price-request daemon.
//!
//! Builds `MsgRequestData` transactions asking a BandChain-style chain for
//! price data, signs and broadcasts them on a fixed cadence, and exposes its
//! own counters on a Prometheus endpoint.
//!
//! ```text
//!   config + cli ──▶ lifecycle::startup ──▶ requester::RequestLoop
//!                                               │
//!                      obi (calldata) ◀─────────┤
//!                      blockchain::gas ◀────────┤
//!                      blockchain::transaction ◀┘──▶ node (JSON-RPC)
//!
//!   observability::exporter ──reads──▶ DaemonCounters ◀──writes── RequestLoop
//! ```

// Core subsystems
pub mod blockchain;
pub mod obi;
pub mod requester;

// Cross-cutting concerns
pub mod cli;
pub mod config;
pub mod filecache;
pub mod lifecycle;
pub mod observability;

pub use config::schema::DaemonConfig;
pub use lifecycle::Shutdown;
pub use requester::{DaemonContext, RequestLoop};
