use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Env var overriding the log filter (takes precedence over `RUST_LOG`).
pub const LOG_FILTER_ENV: &str = "SPRIG_LOG";
/// Env var overriding the log directory.
pub const LOG_DIR_ENV: &str = "SPRIG_LOG_DIR";

const LOG_FILE_PREFIX: &str = "sprig.log";
const MAX_PANEL_LINES: usize = 500;
const LOG_RETENTION_DAYS: u64 = 7;

/// Log severity as shown in the diagnostics panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

/// One captured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Shared ring buffer of recent log entries.
pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

pub fn new_log_buffer(capacity: usize) -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::with_capacity(capacity)))
}

/// Copy the newest `n` entries, oldest first.
pub fn recent(buffer: &LogBuffer, n: usize) -> Vec<LogEntry> {
    match buffer.lock() {
        Ok(buf) => buf.iter().skip(buf.len().saturating_sub(n)).cloned().collect(),
        Err(_) => Vec::new(),
    }
}

fn push_capped(buffer: &LogBuffer, entry: LogEntry, cap: usize) {
    if let Ok(mut buf) = buffer.lock() {
        while buf.len() >= cap {
            buf.pop_front();
        }
        buf.push_back(entry);
    }
}

/// Resolve the log directory.
///
/// Precedence: `SPRIG_LOG_DIR` > `<data dir>/sprig/logs` > `./logs`.
pub fn log_dir() -> PathBuf {
    resolve_log_dir(std::env::var_os(LOG_DIR_ENV).map(PathBuf::from), dirs::data_dir())
}

fn resolve_log_dir(explicit: Option<PathBuf>, data_dir: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| data_dir.map(|d| d.join("sprig").join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Delete rotated `sprig.log*` files last modified more than `max_age` ago.
/// Other files in the directory are left alone.
fn prune_old_logs(dir: &Path, max_age: Duration) {
    if let Some(cutoff) = SystemTime::now().checked_sub(max_age) {
        prune_logs_before(dir, cutoff);
    }
}

fn prune_logs_before(dir: &Path, cutoff: SystemTime) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry
            .file_name()
            .to_string_lossy()
            .starts_with(LOG_FILE_PREFIX)
        {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .is_ok_and(|modified| modified < cutoff);
        if stale {
            let _ = fs::remove_file(entry.path());
        }
    }
}

/// Tracing layer that mirrors events into a [`LogBuffer`].
struct PanelLayer {
    buffer: LogBuffer,
    cap: usize,
}

impl<S: tracing::Subscriber> Layer<S> for PanelLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let entry = LogEntry {
            level: event.metadata().level().into(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        };
        push_capped(&self.buffer, entry, self.cap);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        let mut parts: Vec<String> = self.message.into_iter().collect();
        parts.extend(self.fields);
        parts.join(" ")
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }
}

/// Install the global subscriber and return the diagnostics buffer.
///
/// Filter: `SPRIG_LOG`, else `RUST_LOG`, else `info`. Events go to a daily
/// rolling `sprig.log` in [`log_dir`] (7 days kept) and to the returned
/// ring buffer. Stdout stays free for the terminal UI.
pub fn init() -> LogBuffer {
    let buffer = new_log_buffer(MAX_PANEL_LINES);

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let dir = log_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("warning: failed to create log directory {}: {e}", dir.display());
    }
    prune_old_logs(&dir, Duration::from_secs(LOG_RETENTION_DAYS * 86_400));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&dir, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true);

    let panel_layer = PanelLayer {
        buffer: buffer.clone(),
        cap: MAX_PANEL_LINES,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(panel_layer)
        .init();

    buffer
}
