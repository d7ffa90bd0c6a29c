pub mod infra;

pub use infra::audit_log::{AuditLogError, FileAuditLog};
pub use infra::session_store::{FileSessionStore, SessionMeta, SessionStoreError};
