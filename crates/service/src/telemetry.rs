//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{LogFormat, ServiceConfig};

/// Installs the global tracing subscriber described by `config`.
///
/// Fails if a global subscriber is already set.
pub fn try_init_tracing(config: &ServiceConfig) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(&config.log_level));

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

/// Installs the global tracing subscriber, ignoring a second call.
pub fn init_tracing(config: &ServiceConfig) {
    if try_init_tracing(config).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

// An unparseable directive falls back to `info`.
fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected_but_harmless() {
        let config = ServiceConfig::default();
        init_tracing(&config);
        assert!(try_init_tracing(&config).is_err());
        init_tracing(&config);
    }

    #[test]
    fn invalid_directive_falls_back_to_info() {
        let filter = env_filter("claims=loudly");
        assert_eq!(filter.to_string(), "info");
    }
}
