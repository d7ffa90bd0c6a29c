pub mod context;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod locale;
pub mod persona;
pub mod registry;
pub mod sanitizer;
pub mod schema;
pub mod tools;
pub mod traits;

pub use context::ContextDescriptor;
pub use envelope::{ExecutionEnvelope, FunctionCallRequest};
pub use error::ToolError;
pub use executor::{BatchOutcome, CallOutcome, ExecutorConfig, ToolExecutor};
pub use locale::Locale;
pub use persona::{Persona, ToolCategory};
pub use registry::ToolRegistry;
pub use schema::{ParamKind, Parameter, ParameterSchema};
pub use tools::{builtin_tools, FunctionDeclaration, OperationalData, RecordQuery, SanitizedTool, Tool};
pub use traits::AuditLogger;
