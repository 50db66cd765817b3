use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

const KEPT_LOG_FILES: usize = 5;

/// Which front end is writing logs. Each one rotates its own files under the log directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Cli,
    /// The interactive prompt owns the terminal, so its logs only go to files.
    Session,
}

impl LogSource {
    fn file_prefix(self) -> &'static str {
        match self {
            LogSource::Cli => "cli",
            LogSource::Session => "session",
        }
    }

    fn mirrors_to_console(self) -> bool {
        matches!(self, LogSource::Cli)
    }
}

/// Filter directive for this crate. An explicit level wins over `RUST_LOG`, which defaults to
/// `debug`.
fn crate_filter(level: Option<LevelFilter>) -> String {
    let level = level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()));
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// `verbose` raises the level to trace and, for the one-shot CLI, mirrors logs to stdout.
pub fn enable_logging(source: LogSource, log_dir: &Path, verbose: bool) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(source.file_prefix())
        .build(log_dir)?;

    let to_console = verbose && source.mirrors_to_console();
    let stdout = std::io::stdout.with_filter(move |_| to_console);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(crate_filter(
            verbose.then_some(LevelFilter::TRACE),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::{LogSource, crate_filter};

    #[test]
    fn test_session_logs_stay_off_the_console() {
        assert!(LogSource::Cli.mirrors_to_console());
        assert!(!LogSource::Session.mirrors_to_console());
        assert_ne!(LogSource::Cli.file_prefix(), LogSource::Session.file_prefix());
    }

    #[test]
    fn test_explicit_level_targets_crate() {
        assert_eq!(crate_filter(Some(LevelFilter::TRACE)), "hourfit=trace");
    }
}
