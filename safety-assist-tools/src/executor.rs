//! Security and fault boundary between the session client and tool code.

use futures_util::future::join_all;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::context::ContextDescriptor;
use crate::envelope::{ExecutionEnvelope, FunctionCallRequest};
use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::tools::Tool;
use crate::traits::AuditLogger;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// A call still running after this long resolves as a failed envelope.
    pub tool_timeout: Duration,
    /// Upper bound on the serialized size of one call's arguments.
    pub max_argument_bytes: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            tool_timeout: Duration::from_secs(15),
            max_argument_bytes: 64 * 1024,
        }
    }
}

/// Result of one call within a batch, kept next to the request that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub call: FunctionCallRequest,
    pub envelope: ExecutionEnvelope,
}

/// Envelopes of one resolution round, in the model's request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    outcomes: Vec<CallOutcome>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallOutcome> {
        self.outcomes.iter()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.envelope.is_success())
            .count()
    }

    /// Envelopes keyed by tool name. When the model called the same tool more
    /// than once in a round, the last request wins here; use [`Self::iter`]
    /// to see every call.
    pub fn by_name(&self) -> HashMap<&str, &ExecutionEnvelope> {
        self.outcomes
            .iter()
            .map(|o| (o.call.name.as_str(), &o.envelope))
            .collect()
    }

    pub fn into_vec(self) -> Vec<CallOutcome> {
        self.outcomes
    }
}

/// Resolves, validates and runs tool calls. Holds no conversation state and
/// is shared across sessions.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    audit: Option<Arc<dyn AuditLogger>>,
    config: ExecutorConfig,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, config: ExecutorConfig) -> Self {
        Self {
            registry,
            audit: None,
            config,
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run one call. Never fails: every outcome is an envelope.
    pub async fn execute_one(
        &self,
        call: &FunctionCallRequest,
        ctx: &ContextDescriptor,
    ) -> ExecutionEnvelope {
        let started = Instant::now();
        let result = self.run(call, ctx).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => debug!(tool = %call.name, elapsed_ms = elapsed.as_millis() as u64, "tool call succeeded"),
            Err(e) => warn!(tool = %call.name, error = %e, "tool call failed"),
        }
        self.log_audit_isolated(call, ctx, &result, elapsed);

        result.into()
    }

    /// Run every call of a round concurrently and wait for all of them.
    /// One failure neither cancels nor delays its siblings.
    pub async fn execute_many(
        &self,
        calls: &[FunctionCallRequest],
        ctx: &ContextDescriptor,
    ) -> BatchOutcome {
        if let Err(e) = ctx.validate() {
            warn!(calls = calls.len(), "rejecting batch: {}", e);
            return BatchOutcome {
                outcomes: calls
                    .iter()
                    .map(|call| CallOutcome {
                        call: call.clone(),
                        envelope: ExecutionEnvelope::failure(e.envelope_message()),
                    })
                    .collect(),
            };
        }

        info!(calls = calls.len(), persona = %ctx.persona(), "executing tool round");
        let envelopes = join_all(calls.iter().map(|call| self.execute_one(call, ctx))).await;

        BatchOutcome {
            outcomes: calls
                .iter()
                .cloned()
                .zip(envelopes)
                .map(|(call, envelope)| CallOutcome { call, envelope })
                .collect(),
        }
    }

    async fn run(
        &self,
        call: &FunctionCallRequest,
        ctx: &ContextDescriptor,
    ) -> Result<serde_json::Value, ToolError> {
        // 1. Identity check happens before anything touches the registry
        ctx.validate()?;

        // 2. Lookup
        let (tool, category) = self
            .registry
            .resolve(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        // 3. Persona scope
        if !ctx.persona().allows(category) {
            return Err(ToolError::NotPermitted(call.name.clone()));
        }

        // 4. Arguments
        self.validate_arguments(tool.as_ref(), &call.args)?;

        // 5. Execute
        self.execute_with_protection(tool, ctx.clone(), call.args.clone())
            .await
    }

    fn validate_arguments(
        &self,
        tool: &dyn Tool,
        args: &serde_json::Value,
    ) -> Result<(), ToolError> {
        let size = serde_json::to_string(args).map(|s| s.len()).unwrap_or(usize::MAX);
        if size > self.config.max_argument_bytes {
            return Err(ToolError::InvalidArguments("arguments too large".into()));
        }
        tool.schema().validate(args)
    }

    async fn execute_with_protection(
        &self,
        tool: Arc<dyn Tool>,
        ctx: ContextDescriptor,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let limit = self.config.tool_timeout;

        // Spawn to isolate panics from the caller
        let mut handle = tokio::spawn(async move { tool.execute(args, ctx).await });

        match timeout(limit, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    error!("Tool execution panicked");
                } else {
                    error!("Tool execution cancelled");
                }
                Err(ToolError::Internal)
            }
            Err(_) => {
                handle.abort();
                warn!("Tool execution timed out after {}ms", limit.as_millis());
                Err(ToolError::Timeout)
            }
        }
    }

    fn log_audit_isolated(
        &self,
        call: &FunctionCallRequest,
        ctx: &ContextDescriptor,
        result: &Result<serde_json::Value, ToolError>,
        elapsed: Duration,
    ) {
        let Some(audit) = self.audit.clone() else {
            return;
        };

        let entry = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "tool": call.name,
            "organization": ctx.organization_id(),
            "user": ctx.user_id(),
            "persona": ctx.persona().as_str(),
            "outcome": match result {
                Ok(_) => json!({"success": true}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            },
            "duration_ms": elapsed.as_millis() as u64,
        });

        // Fire and forget.
        tokio::spawn(async move {
            audit.log(entry).await;
        });
    }
}
