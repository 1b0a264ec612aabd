//! Instant PromQL queries against Prometheus or Google Cloud Managed Prometheus,
//! printed as a table.
//!
//! ```no_run
//! use gcp_prom_query::{print_instant, QueryConfig};
//!
//! # async fn run() -> Result<(), gcp_prom_query::PromError> {
//! let config = QueryConfig::builder()
//!     .gcp_project("my-project")
//!     .token("ya29.example")
//!     .timeout_secs(5)
//!     .build()?;
//! print_instant(&config, "up").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod instant;
pub mod model;
pub mod render;

pub use client::PromClient;
pub use config::{QueryConfig, QueryConfigBuilder};
pub use error::{ErrorType, PromError};
pub use instant::{instant_rows, instant_table, print_instant};
pub use render::MetricEntry;
