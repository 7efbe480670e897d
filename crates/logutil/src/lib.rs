//! Logging setup shared by the cli and the test harness.
use std::io;

use tracing::subscriber;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// Output format for the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stderr,
    /// Goes through the test writer so libtest can capture it.
    TestWriter,
}

fn env_filter(default_level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Configure the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once is a no-op after the first successful call.
pub fn configure_global_logger(default_level: tracing::Level, format: LogFormat, target: LogTarget) {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(default_level))
        .with_file(true)
        .with_line_number(true);

    // Each combination produces a distinct subscriber type, so install inside
    // each arm.
    let result = match (format, target) {
        (LogFormat::Json, LogTarget::Stderr) => {
            subscriber::set_global_default(builder.json().with_writer(io::stderr).finish())
        }
        (LogFormat::Json, LogTarget::TestWriter) => {
            subscriber::set_global_default(builder.json().with_test_writer().finish())
        }
        (LogFormat::Pretty, LogTarget::Stderr) => {
            subscriber::set_global_default(builder.pretty().with_writer(io::stderr).finish())
        }
        (LogFormat::Pretty, LogTarget::TestWriter) => {
            subscriber::set_global_default(builder.pretty().with_test_writer().finish())
        }
        (LogFormat::Compact, LogTarget::Stderr) => {
            subscriber::set_global_default(builder.compact().with_writer(io::stderr).finish())
        }
        (LogFormat::Compact, LogTarget::TestWriter) => {
            subscriber::set_global_default(builder.compact().with_test_writer().finish())
        }
    };

    if result.is_err() {
        tracing::debug!("global logger already configured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_name() {
        assert_eq!(Some(LogFormat::Json), LogFormat::from_name("JSON"));
        assert_eq!(Some(LogFormat::Pretty), LogFormat::from_name("pretty"));
        assert_eq!(None, LogFormat::from_name("xml"));
    }

    #[test]
    fn configure_twice_is_noop() {
        configure_global_logger(tracing::Level::ERROR, LogFormat::Compact, LogTarget::TestWriter);
        configure_global_logger(tracing::Level::ERROR, LogFormat::Json, LogTarget::TestWriter);
    }
}
