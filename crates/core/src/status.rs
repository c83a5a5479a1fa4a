use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::sync::{Arc, Mutex};

/// Severity of a status line; each level has a fixed display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Ok,
    Warning,
    Error,
}

impl StatusLevel {
    /// CSS color name the host page paints the status text with.
    pub fn color(self) -> &'static str {
        match self {
            Self::Ok      => "black",
            Self::Warning => "orange",
            Self::Error   => "red",
        }
    }
}

/// One human-readable status update.
///
/// Serializes as `{"text", "color", "at"}`, the shape a host page reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub text:  String,
    #[serde(rename = "color", serialize_with = "serialize_color")]
    pub level: StatusLevel,
    pub at:    DateTime<Local>,
}

fn serialize_color<S: Serializer>(level: &StatusLevel, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(level.color())
}

impl Status {
    pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self { text: text.into(), level, at: Local::now() }
    }

    pub fn ok(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Ok, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, text)
    }
}

/// Write-only sink for status updates, owned by whoever hosts the output.
pub trait StatusSurface: Send + Sync {
    fn report(&self, status: Status);
}

/// Forwards every status to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSurface for LogStatus {
    fn report(&self, status: Status) {
        match status.level {
            StatusLevel::Ok      => tracing::info!("{}", status.text),
            StatusLevel::Warning => tracing::warn!("{}", status.text),
            StatusLevel::Error   => tracing::error!("{}", status.text),
        }
    }
}

/// Keeps every reported status in memory.
#[derive(Debug, Default, Clone)]
pub struct SharedStatus {
    history: Arc<Mutex<Vec<Status>>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent status, if any.
    pub fn latest(&self) -> Option<Status> {
        self.history.lock().ok()?.last().cloned()
    }

    pub fn history(&self) -> Vec<Status> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl StatusSurface for SharedStatus {
    fn report(&self, status: Status) {
        if let Ok(mut history) = self.history.lock() {
            history.push(status);
        }
    }
}
