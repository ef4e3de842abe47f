//! Tracing initialization

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;

/// Initialize the global tracing subscriber
///
/// Logs are emitted as JSON with the level taken from
/// `config.service.log_level`, overridable through `RUST_LOG`.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing() {
        let config = Config::default();
        // This should not panic
        let _ = init_tracing(&config);
    }
}
