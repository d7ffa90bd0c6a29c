//! Operational data loaded from a local JSON file.
//!
//! Stands in for the production record store when running the assistant
//! from the command line.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use safety_assist_tools::{OperationalData, RecordQuery, ToolError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrganizationRecords {
    overview: Option<Value>,
    incidents: Vec<Value>,
    corrective_actions: Vec<Value>,
    compliance_requirements: Vec<Value>,
    health_surveillance: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct DataFile {
    #[serde(default)]
    organizations: HashMap<String, OrganizationRecords>,
}

pub struct JsonOperationalData {
    organizations: HashMap<String, OrganizationRecords>,
    now: Option<DateTime<Utc>>,
}

impl JsonOperationalData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse data file {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: DataFile = serde_json::from_str(content)?;
        Ok(Self {
            organizations: file.organizations,
            now: None,
        })
    }

    /// Pin the clock used for day-window filters.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn records(&self, organization_id: &str) -> Result<&OrganizationRecords, ToolError> {
        self.organizations
            .get(organization_id)
            .ok_or_else(|| ToolError::Execution("organization not found".to_string()))
    }
}

fn field_matches(record: &Value, key: &str, wanted: Option<&String>) -> bool {
    match wanted {
        Some(wanted) => record.get(key).and_then(Value::as_str) == Some(wanted.as_str()),
        None => true,
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn filter(records: &[Value], query: &RecordQuery, keep: impl Fn(&Value) -> bool) -> Vec<Value> {
    records
        .iter()
        .filter(|r| field_matches(r, "status", query.status.as_ref()))
        .filter(|r| field_matches(r, "severity", query.severity.as_ref()))
        .filter(|r| keep(r))
        .take(query.limit)
        .cloned()
        .collect()
}

#[async_trait]
impl OperationalData for JsonOperationalData {
    async fn recent_incidents(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError> {
        let records = self.records(organization_id)?;
        let since = query.days.map(|d| self.now() - Duration::days(i64::from(d)));
        let mut incidents: Vec<(Option<DateTime<Utc>>, Value)> = filter(
            &records.incidents,
            &RecordQuery {
                limit: usize::MAX,
                ..query.clone()
            },
            |r| match since {
                Some(since) => r
                    .get("occurredAt")
                    .and_then(parse_date)
                    .is_some_and(|at| at >= since),
                None => true,
            },
        )
        .into_iter()
        .map(|r| (r.get("occurredAt").and_then(parse_date), r))
        .collect();
        // Newest first.
        incidents.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(incidents
            .into_iter()
            .take(query.limit)
            .map(|(_, r)| r)
            .collect())
    }

    async fn corrective_actions(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError> {
        let records = self.records(organization_id)?;
        Ok(filter(&records.corrective_actions, query, |_| true))
    }

    async fn compliance_requirements(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError> {
        let records = self.records(organization_id)?;
        Ok(filter(&records.compliance_requirements, query, |_| true))
    }

    async fn health_surveillance_due(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError> {
        let records = self.records(organization_id)?;
        let until = query.days.map(|d| self.now() + Duration::days(i64::from(d)));
        Ok(filter(&records.health_surveillance, query, |r| match until {
            // Overdue exams stay in the list.
            Some(until) => r
                .get("dueDate")
                .and_then(parse_date)
                .is_some_and(|due| due <= until),
            None => true,
        }))
    }

    async fn organization_overview(&self, organization_id: &str) -> Result<Value, ToolError> {
        self.records(organization_id)?
            .overview
            .clone()
            .ok_or_else(|| ToolError::Execution("organization overview unavailable".to_string()))
    }
}
