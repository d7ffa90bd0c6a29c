use async_trait::async_trait;
use serde_json::Value;

/// Sink for per-call audit records emitted by the executor.
///
/// Records never contain tool arguments or result data.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    async fn log(&self, entry: Value);
}
