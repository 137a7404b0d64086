//! Initialisation du système de logging.
//!
//! Le niveau minimal vient de la configuration (`host.logger.min_level`),
//! sauf si `RUST_LOG` est défini. La sortie console peut être désactivée
//! via `host.logger.enable_console`.

use anyhow::{Result, anyhow};
use pmoconfig::Config;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Contrôle du niveau de log après initialisation.
#[derive(Clone)]
pub struct LogControl {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl LogControl {
    /// Change le niveau minimal des logs.
    pub fn set_min_level(&self, level: &str) -> Result<()> {
        let level =
            string_to_level(level).ok_or_else(|| anyhow!("Invalid log level: {}", level))?;
        self.reload_handle
            .reload(EnvFilter::new(level_to_string(level)))
            .map_err(|e| anyhow!("Failed to reload log level filter: {}", e))?;
        tracing::info!("Log level changed to: {}", level_to_string(level));
        Ok(())
    }
}

/// Installe le subscriber global à partir de la configuration.
///
/// # Errors
///
/// Échoue si un subscriber global est déjà installé.
pub fn init_logging(config: &Config) -> Result<LogControl> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .get_log_min_level()
            .ok()
            .and_then(|l| string_to_level(&l))
            .unwrap_or(Level::INFO);
        EnvFilter::new(level_to_string(level))
    });

    let (filter, reload_handle) = reload::Layer::new(filter);
    let subscriber = Registry::default().with(filter);

    let enable_console = config.get_log_enable_console().unwrap_or(true);
    let result = if enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .try_init()
    } else {
        subscriber.try_init()
    };
    result.map_err(|e| anyhow!("Cannot install log subscriber: {}", e))?;

    Ok(LogControl { reload_handle })
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_string(level: Level) -> &'static str {
    match level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_level() {
        assert_eq!(string_to_level("debug"), Some(Level::DEBUG));
        assert_eq!(string_to_level(" WARN "), Some(Level::WARN));
        assert_eq!(string_to_level("verbose"), None);
    }

    #[test]
    fn test_level_round_trip_through_filter_syntax() {
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            assert_eq!(string_to_level(level_to_string(level)), Some(level));
        }
    }
}
