use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid context")]
    InvalidContext,

    #[error("tool not found")]
    NotFound(String),

    #[error("tool not permitted for persona")]
    NotPermitted(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Execution(String),

    #[error("tool timed out")]
    Timeout,

    #[error("internal tool error")]
    Internal,
}

impl ToolError {
    /// Message placed in a failed envelope. Never carries more than the
    /// display text, so tool internals stay out of model context.
    pub fn envelope_message(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}
