//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Load keys → Check node → Open cache → Bind metrics → Run
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → loop and exporter exit at their next await
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then keys and node, then listeners
//! - No in-flight transaction is resumed after restart

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run_daemon, run_tasks, StartupError};
