// Severity levels shared by raw VM errors and derived issues

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity as seen on the wire. Raw VM errors may carry any of these;
/// derived issues only ever carry an actionable one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Warning,
    Error,
    Info,
    Information,
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Info => "info",
            Severity::Information => "information",
            Severity::Other(s) => s,
        }
    }

    /// `info` / `information` entries name things like the storage backend; they are not problems.
    pub fn is_informational(&self) -> bool {
        matches!(self, Severity::Info | Severity::Information)
    }

    pub fn is_actionable(&self) -> bool {
        !self.is_informational() && !matches!(self, Severity::Other(_))
    }
}

/// Producers emit lowercase names; any other spelling is kept verbatim as `Other`.
impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            "info" => Severity::Info,
            "information" => Severity::Information,
            _ => Severity::Other(s.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Severity::from(s.as_str()))
    }
}
