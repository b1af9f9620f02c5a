//! # Structured Logging
//!
//! Process-wide `tracing` subscriber setup shared by the admin binaries.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

// Flag to track if logging has been initialized
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, thiserror::Error)]
#[error("Failed to set global subscriber: {0}")]
pub struct LoggingError(String);

/// Initializes the structured logging system.
///
/// `RUST_LOG` wins over the configured level. Records emitted through the
/// `log` facade are forwarded into the same subscriber. Calling this twice
/// is a no-op.
pub fn init_logging(service_name: &str, config: &LoggingConfig) -> Result<(), LoggingError> {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn", config.level)));

    let registry = Registry::default().with(filter);

    let result = if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true);
        registry.with(json_layer).try_init()
    } else {
        let text_layer = fmt::layer().with_target(true).with_thread_ids(true);
        registry.with(text_layer).try_init()
    };
    result.map_err(|e| LoggingError(e.to_string()))?;

    LOGGING_INITIALIZED.store(true, Ordering::SeqCst);

    tracing::info!(
        service = %service_name,
        level = %config.level,
        json = config.json_format,
        "Logging initialized"
    );

    Ok(())
}
