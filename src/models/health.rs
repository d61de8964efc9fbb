// Upstream health-check results and upgrade status

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    #[serde(default)]
    pub check_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub details: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl HealthCheckResult {
    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }

    /// Error text wins over the informational message.
    pub fn summary(&self) -> &str {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.message.as_deref())
            .unwrap_or_default()
    }
}

/// Unparseable timestamps are dropped rather than rejecting the whole result.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }))
}

/// Aggregate form sent by the collector: counters plus the individual results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthCheckSummary {
    pub total_checks: u32,
    pub passed_checks: u32,
    pub failed_checks: u32,
    pub warning_checks: u32,
    pub last_run: Option<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub results: Vec<HealthCheckResult>,
}

/// Health checks arrive either as a bare list or wrapped in a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthChecks {
    List(Vec<HealthCheckResult>),
    Summary(HealthCheckSummary),
}

impl HealthChecks {
    pub fn results(&self) -> &[HealthCheckResult] {
        match self {
            HealthChecks::List(results) => results,
            HealthChecks::Summary(summary) => &summary.results,
        }
    }
}

impl Default for HealthChecks {
    fn default() -> Self {
        HealthChecks::List(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpgradeInfo {
    pub version: String,
    pub previous_version: String,
    pub upgrade_time: Option<String>,
    pub state: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub node_statuses: BTreeMap<String, String>,
}

impl UpgradeInfo {
    pub fn is_in_progress(&self) -> bool {
        matches!(self.state.as_str(), "Upgrading" | "Running")
    }
}
