//! Built-in safety tools backed by an [`OperationalData`] port.
//!
//! Every tool queries the port scoped to the calling organization and is
//! registered wrapped in [`SanitizedTool`], so raw records never reach the
//! model.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::ContextDescriptor;
use crate::error::ToolError;
use crate::persona::ToolCategory;
use crate::sanitizer::shapes;
use crate::schema::{ParamKind, ParameterSchema};
use crate::tools::base::Tool;
use crate::tools::sanitized::SanitizedTool;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: i64 = 50;

/// Filters shared by the list-style queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub days: Option<u32>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: usize,
}

/// Read access to an organization's operational records.
///
/// Implementations return raw storage records; sanitization happens in the
/// tool layer.
#[async_trait]
pub trait OperationalData: Send + Sync {
    async fn recent_incidents(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError>;

    async fn corrective_actions(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError>;

    async fn compliance_requirements(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError>;

    async fn health_surveillance_due(
        &self,
        organization_id: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Value>, ToolError>;

    async fn organization_overview(&self, organization_id: &str) -> Result<Value, ToolError>;
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ListInput {
    days: Option<u32>,
    status: Option<String>,
    severity: Option<String>,
    limit: Option<usize>,
}

impl ListInput {
    fn parse(args: Value) -> Result<RecordQuery, ToolError> {
        let input: ListInput = if args.is_null() {
            ListInput::default()
        } else {
            serde_json::from_value(args)?
        };
        Ok(RecordQuery {
            days: input.days,
            status: input.status,
            severity: input.severity,
            limit: input.limit.unwrap_or(DEFAULT_LIMIT),
        })
    }
}

fn limit_param(schema: ParameterSchema) -> ParameterSchema {
    schema.optional(
        "limit",
        "Maximum number of records to return",
        ParamKind::integer(Some(1), Some(MAX_LIMIT)),
    )
}

fn list_result(key: &str, mut records: Vec<Value>, limit: usize) -> Value {
    records.truncate(limit);
    json!({ "count": records.len(), key: records })
}

pub struct RecentIncidentsTool {
    data: Arc<dyn OperationalData>,
}

#[async_trait]
impl Tool for RecentIncidentsTool {
    fn name(&self) -> &str {
        "get_recent_incidents"
    }

    fn description(&self) -> &str {
        "List incidents reported in the organization over a recent period, newest first"
    }

    fn schema(&self) -> ParameterSchema {
        limit_param(
            ParameterSchema::new()
                .optional(
                    "days",
                    "Look-back window in days",
                    ParamKind::integer(Some(1), Some(365)),
                )
                .optional(
                    "severity",
                    "Only incidents of this severity",
                    ParamKind::one_of(&["low", "medium", "high", "critical"]),
                ),
        )
    }

    async fn execute(&self, args: Value, ctx: ContextDescriptor) -> Result<Value, ToolError> {
        let mut query = ListInput::parse(args)?;
        query.days.get_or_insert(30);
        let records = self
            .data
            .recent_incidents(ctx.organization_id(), &query)
            .await?;
        Ok(list_result("incidents", records, query.limit))
    }
}

pub struct CorrectiveActionsTool {
    data: Arc<dyn OperationalData>,
}

#[async_trait]
impl Tool for CorrectiveActionsTool {
    fn name(&self) -> &str {
        "get_corrective_actions"
    }

    fn description(&self) -> &str {
        "List corrective and preventive actions (CAPA), optionally filtered by status"
    }

    fn schema(&self) -> ParameterSchema {
        limit_param(ParameterSchema::new().optional(
            "status",
            "Only actions in this status",
            ParamKind::one_of(&["open", "in_progress", "pending_verification", "closed", "overdue"]),
        ))
    }

    async fn execute(&self, args: Value, ctx: ContextDescriptor) -> Result<Value, ToolError> {
        let query = ListInput::parse(args)?;
        let records = self
            .data
            .corrective_actions(ctx.organization_id(), &query)
            .await?;
        Ok(list_result("correctiveActions", records, query.limit))
    }
}

pub struct ComplianceRequirementsTool {
    data: Arc<dyn OperationalData>,
}

#[async_trait]
impl Tool for ComplianceRequirementsTool {
    fn name(&self) -> &str {
        "get_compliance_requirements"
    }

    fn description(&self) -> &str {
        "List regulatory requirements tracked for the organization and their review status"
    }

    fn schema(&self) -> ParameterSchema {
        limit_param(ParameterSchema::new().optional(
            "status",
            "Only requirements in this status",
            ParamKind::one_of(&["open", "under_review", "closed", "overdue"]),
        ))
    }

    async fn execute(&self, args: Value, ctx: ContextDescriptor) -> Result<Value, ToolError> {
        let query = ListInput::parse(args)?;
        let records = self
            .data
            .compliance_requirements(ctx.organization_id(), &query)
            .await?;
        Ok(list_result("requirements", records, query.limit))
    }
}

pub struct HealthSurveillanceTool {
    data: Arc<dyn OperationalData>,
}

#[async_trait]
impl Tool for HealthSurveillanceTool {
    fn name(&self) -> &str {
        "get_health_surveillance_due"
    }

    fn description(&self) -> &str {
        "List occupational health examinations due within the given number of days"
    }

    fn schema(&self) -> ParameterSchema {
        limit_param(
            ParameterSchema::new()
                .optional(
                    "days",
                    "Due-date horizon in days",
                    ParamKind::integer(Some(1), Some(365)),
                )
                .optional(
                    "status",
                    "Only examinations in this status",
                    ParamKind::one_of(&["scheduled", "overdue", "completed"]),
                ),
        )
    }

    async fn execute(&self, args: Value, ctx: ContextDescriptor) -> Result<Value, ToolError> {
        let mut query = ListInput::parse(args)?;
        query.days.get_or_insert(30);
        let records = self
            .data
            .health_surveillance_due(ctx.organization_id(), &query)
            .await?;
        Ok(list_result("records", records, query.limit))
    }
}

pub struct OrganizationOverviewTool {
    data: Arc<dyn OperationalData>,
}

#[async_trait]
impl Tool for OrganizationOverviewTool {
    fn name(&self) -> &str {
        "get_organization_overview"
    }

    fn description(&self) -> &str {
        "Summarize the organization: sites, headcount and open safety work"
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
    }

    async fn execute(&self, _args: Value, ctx: ContextDescriptor) -> Result<Value, ToolError> {
        self.data.organization_overview(ctx.organization_id()).await
    }
}

/// The built-in catalogue, sanitizer-wrapped and tagged with categories,
/// ready for [`crate::ToolRegistry::register_many`].
pub fn builtin_tools(data: Arc<dyn OperationalData>) -> Vec<(Arc<dyn Tool>, ToolCategory)> {
    vec![
        (
            Arc::new(SanitizedTool::new(
                Arc::new(RecentIncidentsTool { data: data.clone() }),
                &shapes::INCIDENT_LIST,
            )),
            ToolCategory::Incident,
        ),
        (
            Arc::new(SanitizedTool::new(
                Arc::new(CorrectiveActionsTool { data: data.clone() }),
                &shapes::CORRECTIVE_ACTION_LIST,
            )),
            ToolCategory::Capa,
        ),
        (
            Arc::new(SanitizedTool::new(
                Arc::new(ComplianceRequirementsTool { data: data.clone() }),
                &shapes::COMPLIANCE_LIST,
            )),
            ToolCategory::Compliance,
        ),
        (
            Arc::new(SanitizedTool::new(
                Arc::new(HealthSurveillanceTool { data: data.clone() }),
                &shapes::HEALTH_LIST,
            )),
            ToolCategory::Health,
        ),
        (
            Arc::new(SanitizedTool::new(
                Arc::new(OrganizationOverviewTool { data }),
                &shapes::ORGANIZATION_OVERVIEW,
            )),
            ToolCategory::Organization,
        ),
    ]
}
