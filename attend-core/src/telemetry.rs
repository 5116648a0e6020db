//! Tracing Initialization
//!
//! `TigerStyle`: Optional, explicit, never panics on misconfiguration.
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can install a formatted one here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use attend_core::telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .filter("attend_core=debug")
//!     .with_target(true)
//!     .build();
//! init_tracing(config).expect("tracing init");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG` - Filter directives; overrides the configured filter when set

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::constants::TELEMETRY_FILTER_DEFAULT;

/// Tracing initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber could not be installed
    #[error("tracing initialization failed: {reason}")]
    InitFailed {
        /// The reason for the failure
        reason: String,
    },

    /// Filter directive could not be parsed
    #[error("invalid filter directive {directive:?}: {reason}")]
    InvalidFilter {
        /// The directive as given
        directive: String,
        /// Parser message
        reason: String,
    },
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Configuration for the formatted tracing subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,

    /// Include the event target (module path) in output
    pub with_target: bool,

    /// Include thread ids in output
    pub with_thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: TELEMETRY_FILTER_DEFAULT.to_string(),
            with_target: false,
            with_thread_ids: false,
        }
    }
}

impl TelemetryConfig {
    /// Create a new builder for `TelemetryConfig`
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `InvalidFilter` if the directive is empty or does not parse.
    pub fn validate(&self) -> Result<()> {
        self.env_filter().map(|_| ())
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        if self.filter.trim().is_empty() {
            return Err(TelemetryError::InvalidFilter {
                directive: self.filter.clone(),
                reason: "filter cannot be empty".to_string(),
            });
        }
        EnvFilter::try_new(&self.filter).map_err(|e| TelemetryError::InvalidFilter {
            directive: self.filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Builder for `TelemetryConfig`
#[derive(Default)]
pub struct TelemetryConfigBuilder {
    filter: Option<String>,
    with_target: Option<bool>,
    with_thread_ids: Option<bool>,
}

impl TelemetryConfigBuilder {
    /// Set the fallback filter directive
    #[must_use]
    pub fn filter(mut self, directive: impl Into<String>) -> Self {
        self.filter = Some(directive.into());
        self
    }

    /// Show event targets
    #[must_use]
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = Some(enabled);
        self
    }

    /// Show thread ids
    #[must_use]
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = Some(enabled);
        self
    }

    /// Build the `TelemetryConfig`
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let default = TelemetryConfig::default();
        TelemetryConfig {
            filter: self.filter.unwrap_or(default.filter),
            with_target: self.with_target.unwrap_or(default.with_target),
            with_thread_ids: self.with_thread_ids.unwrap_or(default.with_thread_ids),
        }
    }
}

/// Install a global formatted subscriber.
///
/// `RUST_LOG` wins over `config.filter` when it is set and parses.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` for a bad configured directive and
/// `TelemetryError::InitFailed` if a global subscriber is already installed.
pub fn init_tracing(config: TelemetryConfig) -> Result<()> {
    // Precondition
    let fallback = config.env_filter()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(fallback);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids)
        .try_init()
        .map_err(|e| TelemetryError::InitFailed {
            reason: format!("failed to set global subscriber: {e}"),
        })?;

    tracing::debug!(filter = %config.filter, "tracing initialized");
    Ok(())
}
