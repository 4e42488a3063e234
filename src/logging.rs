//! Tracing subscriber setup.
//!
//! Logs go to stderr so that stdout only ever carries API JSON.

use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::LogLevel;

impl From<&LogLevel> for LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Installs the global fmt subscriber at the requested level.
pub fn setup_logging(level: &LogLevel) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))?;

    debug!("Logging initialized with level: {:?}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LevelFilter::from(&LogLevel::Off), LevelFilter::OFF);
        assert_eq!(LevelFilter::from(&LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(&LogLevel::Trace), LevelFilter::TRACE);
    }
}
