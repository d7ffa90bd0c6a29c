use async_trait::async_trait;
use std::sync::Arc;

use crate::context::ContextDescriptor;
use crate::error::ToolError;
use crate::sanitizer::{self, ResultShape};
use crate::schema::ParameterSchema;
use crate::tools::base::Tool;

/// Wraps a tool so its result is sanitized for the caller's locale before
/// it leaves the tool boundary.
pub struct SanitizedTool {
    inner: Arc<dyn Tool>,
    shape: &'static ResultShape,
}

impl SanitizedTool {
    pub fn new(inner: Arc<dyn Tool>, shape: &'static ResultShape) -> Self {
        Self { inner, shape }
    }
}

#[async_trait]
impl Tool for SanitizedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn schema(&self) -> ParameterSchema {
        self.inner.schema()
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ContextDescriptor,
    ) -> Result<serde_json::Value, ToolError> {
        let locale = ctx.locale();
        let raw = self.inner.execute(args, ctx).await?;
        Ok(sanitizer::sanitize(&raw, self.shape, locale))
    }
}
