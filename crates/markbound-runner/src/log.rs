//! Ordered per-run log, kept alongside the outcome and mirrored to `tracing`.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Severity of a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// One timestamped line of a run log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    /// RFC 3339 timestamp with millisecond precision.
    pub timestamp: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Collects log entries in the order they happen. Entries are returned with
/// the run outcome so a caller can show the user what the run did, and each
/// entry is also emitted through `tracing` as it is pushed.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into(), None);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message.into(), None);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into(), None);
    }

    /// Like [`RunLog::info`] but with a free-form context tag, e.g. the mark
    /// or data source the message is about.
    pub fn info_with(&mut self, message: impl Into<String>, context: impl Into<String>) {
        self.push(LogLevel::Info, message.into(), Some(context.into()));
    }

    pub fn warn_with(&mut self, message: impl Into<String>, context: impl Into<String>) {
        self.push(LogLevel::Warn, message.into(), Some(context.into()));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    fn push(&mut self, level: LogLevel, message: String, context: Option<String>) {
        match (level, &context) {
            (LogLevel::Info, None) => tracing::info!("{message}"),
            (LogLevel::Info, Some(ctx)) => tracing::info!(context = %ctx, "{message}"),
            (LogLevel::Warn, None) => tracing::warn!("{message}"),
            (LogLevel::Warn, Some(ctx)) => tracing::warn!(context = %ctx, "{message}"),
            (LogLevel::Error, None) => tracing::error!("{message}"),
            (LogLevel::Error, Some(ctx)) => tracing::error!(context = %ctx, "{message}"),
        }
        self.entries.push(LogEntry {
            level,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message,
            context,
        });
    }
}
