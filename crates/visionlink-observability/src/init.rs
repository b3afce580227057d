// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature, each run also
//! writes a JSON log into its own timestamped folder, and old run folders are pruned.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::LogFormat;
#[cfg(feature = "file-logging")]
use crate::config::LoggingOptions;

const RUN_FOLDER_PREFIX: &str = "run_";
const RUN_FOLDER_FORMAT: &str = "%Y%m%d_%H%M%S";

fn env_filter(debug_flags: &CrateDebugFlags) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string();
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Console layer in the requested format, writing to `writer`
fn console_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_target(false).with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

/// Install a console-only subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, format: LogFormat) -> Result<()> {
    Registry::default()
        .with(env_filter(debug_flags)?)
        .with(console_layer(format, std::io::stdout))
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Logging initialization result
///
/// Keeps the background file writer alive; logs are flushed when it is dropped.
#[cfg(feature = "file-logging")]
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: PathBuf,
}

#[cfg(feature = "file-logging")]
impl LoggingGuard {
    /// Get the run folder logs are written to
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize logging with console output and a per-run JSON log file
///
/// The console follows `options.format`; the file is always JSON. Creates a timestamped
/// folder structure:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       └── visionlink.log
/// ```
#[cfg(feature = "file-logging")]
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    options: &LoggingOptions,
) -> Result<LoggingGuard> {
    let timestamp = Utc::now().format(RUN_FOLDER_FORMAT);
    let run_folder = options
        .log_dir
        .join(format!("{}{}", RUN_FOLDER_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    // Never prune the folder we are about to write into
    cleanup_old_logs(
        &options.log_dir,
        options.retention_days,
        options.retention_runs.max(1),
    )?;

    let file_appender = tracing_appender::rolling::never(&run_folder, "visionlink.log");
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let console =
        console_layer(options.format, std::io::stdout).with_filter(env_filter(debug_flags)?);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(env_filter(debug_flags)?);

    Registry::default()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: run_folder,
    })
}

fn parse_run_folder(dir_name: &str) -> Option<DateTime<Utc>> {
    let timestamp = dir_name.strip_prefix(RUN_FOLDER_PREFIX)?;
    let naive = NaiveDateTime::parse_from_str(timestamp, RUN_FOLDER_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Clean up old run folders based on retention policy
///
/// Removes run folders older than `retention_days`, then the oldest remaining folders
/// beyond `retention_runs`. Folders whose names do not parse as run folders are left alone.
///
/// # Returns
/// Number of run folders removed
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let parsed = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_run_folder);
        if let Some(started_at) = parsed {
            runs.push((path, started_at));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (index, (path, started_at)) in runs.iter().enumerate() {
        if *started_at >= cutoff_date && index < retention_runs {
            continue;
        }
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(
                "Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_console(format: LogFormat) -> String {
        let logs = CapturedLogs::default();
        let subscriber = Registry::default().with(console_layer(format, logs.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(alliance = "RED", "[VISION-RECOGNITION] Recognized sample");
        });
        logs.contents()
    }

    #[test]
    fn test_json_console_writes_json_lines() {
        let output = capture_console(LogFormat::Json);

        let line: serde_json::Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["message"], "[VISION-RECOGNITION] Recognized sample");
        assert_eq!(line["fields"]["alliance"], "RED");
    }

    #[test]
    fn test_text_console_is_not_json() {
        let output = capture_console(LogFormat::Text);

        assert!(output.contains("[VISION-RECOGNITION] Recognized sample"));
        assert!(serde_json::from_str::<serde_json::Value>(output.trim()).is_err());
        assert!(!output.contains("visionlink_observability::init"));
    }

    fn make_run(base: &Path, started_at: DateTime<Utc>) -> PathBuf {
        let path = base.join(format!(
            "{}{}",
            RUN_FOLDER_PREFIX,
            started_at.format(RUN_FOLDER_FORMAT)
        ));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_parse_run_folder() {
        let parsed = parse_run_folder("run_20250101_120000").unwrap();
        assert_eq!(parsed.format(RUN_FOLDER_FORMAT).to_string(), "20250101_120000");
        assert!(parse_run_folder("snapshots").is_none());
        assert!(parse_run_folder("run_garbage").is_none());
    }

    #[test]
    fn test_cleanup_removes_expired_runs() {
        let dir = tempdir().unwrap();
        let now = Utc::now();
        let fresh = make_run(dir.path(), now - chrono::Duration::hours(1));
        let expired = make_run(dir.path(), now - chrono::Duration::days(40));

        let removed = cleanup_old_logs(dir.path(), 30, 10).unwrap();

        assert_eq!(removed, 1);
        assert!(fresh.exists());
        assert!(!expired.exists());
    }

    #[test]
    fn test_cleanup_keeps_most_recent_runs() {
        let dir = tempdir().unwrap();
        let now = Utc::now();
        let runs: Vec<PathBuf> = (1..=4)
            .map(|hours| make_run(dir.path(), now - chrono::Duration::hours(hours)))
            .collect();
        std::fs::create_dir_all(dir.path().join("keep_me")).unwrap();

        let removed = cleanup_old_logs(dir.path(), 30, 2).unwrap();

        assert_eq!(removed, 2);
        assert!(runs[0].exists());
        assert!(runs[1].exists());
        assert!(!runs[2].exists());
        assert!(!runs[3].exists());
        assert!(dir.path().join("keep_me").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert_eq!(cleanup_old_logs(&missing, 30, 10).unwrap(), 0);
    }
}
