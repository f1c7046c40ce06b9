//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! request loop
//!     → logging.rs (structured log events)
//!     → metrics.rs (MetricsSink → atomic DaemonCounters)
//!
//! Consumers:
//!     → stdout (tracing fmt layer)
//!     → exporter.rs (GET /metrics, Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments)
//! - Metrics disabled means a no-op sink, not a missing one

pub mod exporter;
pub mod logging;
pub mod metrics;

pub use self::exporter::MetricsExporter;
pub use self::metrics::{DaemonCounters, MetricsSink, NoopMetrics};
