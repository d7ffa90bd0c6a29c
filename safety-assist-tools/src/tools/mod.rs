pub mod base;
pub mod catalog;
pub mod sanitized;

pub use base::{FunctionDeclaration, Tool};
pub use catalog::{builtin_tools, OperationalData, RecordQuery};
pub use sanitized::SanitizedTool;
