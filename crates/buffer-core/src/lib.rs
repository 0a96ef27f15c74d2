//! Buffer Core - Foundation for hybrid buffer storage backends
//!
//! Provides the error taxonomy, backend configuration and tracing setup
//! shared by every storage backend implementation.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{FileSystemConfig, DEFAULT_PREFIX};
pub use error::{Error, Result};
pub use telemetry::init_tracing;
