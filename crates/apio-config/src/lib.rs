//! Typed configuration for Apio applications.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are rejected)
//! - Layered loading (defaults → file → env)
//!
//! [`ApioConfig`] holds the pagination defaults handed to
//! [`Pagination::from_params`](apio_routes::Pagination::from_params) and the
//! telemetry section converted into an
//! [`apio_telemetry::TelemetryConfig`].
//!
//! # Example
//!
//! ```no_run
//! use apio_config::ConfigLoader;
//!
//! # fn main() -> Result<(), apio_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("apio.toml")?
//!     .with_env_prefix("APIO")
//!     .load()?;
//!
//! let telemetry = config.telemetry.to_telemetry_config();
//! # let _ = telemetry;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [pagination]
//! items_per_page = 30
//! max_items_per_page = 100
//!
//! [telemetry]
//! service_name = "documents"
//! environment = "production"
//!
//! [telemetry.metrics]
//! enabled = true
//! duration_buckets = [0.001, 0.01, 0.1, 1.0]
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `APIO__PAGINATION__ITEMS_PER_PAGE=50`
//! - `APIO__TELEMETRY__SERVICE_NAME=documents`
//! - `APIO__TELEMETRY__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/apio-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use apio_routes::PaginationDefaults;
pub use config::{ApioConfig, ApioConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, MetricsConfig, TelemetryConfigSection};
