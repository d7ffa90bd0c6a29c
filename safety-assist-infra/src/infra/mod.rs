pub mod audit_log;
pub mod session_store;
