use crate::context::ContextDescriptor;
use crate::error::ToolError;
use crate::schema::ParameterSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Function declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A named capability the model may request.
///
/// Implementations are stateless with respect to conversations: everything
/// request-specific arrives through `ctx`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> ParameterSchema;

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ContextDescriptor,
    ) -> Result<serde_json::Value, ToolError>;

    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema().to_json(),
        }
    }
}
