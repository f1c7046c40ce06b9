//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! <home>/config.toml
//!     → loader.rs (parse & deserialize, defaults if absent)
//!     → cli.rs (command-line overrides)
//!     → validation.rs (semantic checks)
//!     → DaemonConfig (validated, immutable)
//!     → passed by reference into startup, then into DaemonContext
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, load_config, save_config, set_value, ConfigError};
pub use schema::{DaemonConfig, KeyConfig};
pub use validation::ValidationError;
