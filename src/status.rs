// Connection status side channel for the presentation layer

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Error,
    Success,
}

/// Tagged status line, e.g. `{"kind":"error","message":"Retrying..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            StatusKind::Info => "info",
            StatusKind::Error => "error",
            StatusKind::Success => "success",
        };
        write!(f, "[{kind}] {}", self.message)
    }
}

/// Receives status reports from the channel client.
pub trait StatusSink: Send {
    fn report(&mut self, status: Status);
}

impl<F> StatusSink for F
where
    F: FnMut(Status) + Send,
{
    fn report(&mut self, status: Status) {
        self(status)
    }
}

/// Sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn report(&mut self, status: Status) {
        match status.kind {
            StatusKind::Error => tracing::warn!(status = %status.message, "channel status"),
            StatusKind::Info | StatusKind::Success => {
                tracing::info!(status = %status.message, "channel status")
            }
        }
    }
}
