//! Typed parameter schemas for tool definitions.
//!
//! Tools describe their parameters with [`ParameterSchema`] instead of free-form
//! JSON. The executor validates arguments against it before any tool runs, and
//! the same structure renders the JSON schema object sent to the model.

use serde_json::{json, Map, Value};

use crate::error::ToolError;

/// Kind of a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    String { allowed: Option<Vec<String>> },
    Integer { min: Option<i64>, max: Option<i64> },
    Number,
    Boolean,
    Array { items: Box<ParamKind> },
}

impl ParamKind {
    pub fn string() -> Self {
        ParamKind::String { allowed: None }
    }

    pub fn one_of(values: &[&str]) -> Self {
        ParamKind::String {
            allowed: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        ParamKind::Integer { min, max }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamKind::String { .. } => "string",
            ParamKind::Integer { .. } => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array { .. } => "array",
        }
    }

    fn to_json(&self, description: Option<&str>) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.type_name()));
        if let Some(description) = description {
            out.insert("description".into(), json!(description));
        }
        match self {
            ParamKind::String {
                allowed: Some(values),
            } => {
                out.insert("enum".into(), json!(values));
            }
            ParamKind::Integer { min, max } => {
                if let Some(min) = min {
                    out.insert("minimum".into(), json!(min));
                }
                if let Some(max) = max {
                    out.insert("maximum".into(), json!(max));
                }
            }
            ParamKind::Array { items } => {
                out.insert("items".into(), items.to_json(None));
            }
            _ => {}
        }
        Value::Object(out)
    }

    fn check(&self, path: &str, value: &Value) -> Result<(), String> {
        match self {
            ParamKind::String { allowed } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("{} must be a string", path))?;
                if let Some(allowed) = allowed {
                    if !allowed.iter().any(|a| a == s) {
                        return Err(format!(
                            "{} must be one of [{}]",
                            path,
                            allowed.join(", ")
                        ));
                    }
                }
                Ok(())
            }
            ParamKind::Integer { min, max } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| format!("{} must be an integer", path))?;
                if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                    return Err(format!("{} is out of range", path));
                }
                Ok(())
            }
            ParamKind::Number => value
                .as_f64()
                .map(|_| ())
                .ok_or_else(|| format!("{} must be a number", path)),
            ParamKind::Boolean => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| format!("{} must be a boolean", path)),
            ParamKind::Array { items } => {
                let values = value
                    .as_array()
                    .ok_or_else(|| format!("{} must be an array", path))?;
                for (i, item) in values.iter().enumerate() {
                    items.check(&format!("{}[{}]", path, i), item)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub kind: ParamKind,
    pub required: bool,
}

/// Ordered set of named parameters for one tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSchema {
    params: Vec<Parameter>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str, description: &str, kind: ParamKind) -> Self {
        self.param(name, description, kind, true)
    }

    pub fn optional(self, name: &str, description: &str, kind: ParamKind) -> Self {
        self.param(name, description, kind, false)
    }

    fn param(mut self, name: &str, description: &str, kind: ParamKind, required: bool) -> Self {
        self.params.retain(|p| p.name != name);
        self.params.push(Parameter {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required,
        });
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Render as a JSON schema object for function declarations.
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.clone(), p.kind.to_json(Some(&p.description))))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Check call arguments. `null` is treated as an empty object.
    pub fn validate(&self, args: &Value) -> Result<(), ToolError> {
        let empty = Map::new();
        let object = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ToolError::InvalidArguments(
                    "arguments must be an object".into(),
                ))
            }
        };

        for key in object.keys() {
            if !self.params.iter().any(|p| &p.name == key) {
                return Err(ToolError::InvalidArguments(format!(
                    "unknown parameter {}",
                    key
                )));
            }
        }

        for param in &self.params {
            match object.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::InvalidArguments(format!(
                        "missing required parameter {}",
                        param.name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) => param
                    .kind
                    .check(&param.name, value)
                    .map_err(ToolError::InvalidArguments)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn incident_schema() -> ParameterSchema {
        ParameterSchema::new()
            .optional("days", "Look-back window", ParamKind::integer(Some(1), Some(365)))
            .optional(
                "severity",
                "Minimum severity",
                ParamKind::one_of(&["low", "medium", "high", "critical"]),
            )
            .required("limit", "Maximum rows", ParamKind::integer(Some(1), Some(50)))
    }

    #[test]
    fn test_renders_json_schema() {
        let schema = incident_schema().to_json();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["days"]["type"], "integer");
        assert_eq!(schema["properties"]["days"]["maximum"], 365);
        assert_eq!(schema["properties"]["severity"]["enum"][3], "critical");
        assert_eq!(schema["required"], json!(["limit"]));
    }

    #[test]
    fn test_empty_schema_omits_required() {
        let schema = ParameterSchema::new().to_json();
        assert!(schema.get("required").is_none());
        assert!(ParameterSchema::new().validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_accepts_valid_arguments() {
        let schema = incident_schema();
        assert!(schema.validate(&json!({"limit": 5})).is_ok());
        assert!(schema
            .validate(&json!({"limit": 5, "days": 30, "severity": "high"}))
            .is_ok());
    }

    #[test]
    fn test_rejects_missing_required() {
        let err = incident_schema().validate(&json!({"days": 3})).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("missing required parameter limit".into())
        );
    }

    #[test]
    fn test_rejects_wrong_type_and_range() {
        let schema = incident_schema();
        assert!(schema.validate(&json!({"limit": "five"})).is_err());
        assert!(schema.validate(&json!({"limit": 500})).is_err());
        assert!(schema.validate(&json!({"limit": 5, "severity": "extreme"})).is_err());
    }

    #[test]
    fn test_rejects_unknown_and_non_object() {
        let schema = incident_schema();
        assert!(schema.validate(&json!({"limit": 5, "org": "x"})).is_err());
        assert!(schema.validate(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_array_items_checked() {
        let schema = ParameterSchema::new().required(
            "sites",
            "Site codes",
            ParamKind::Array {
                items: Box::new(ParamKind::string()),
            },
        );
        assert!(schema.validate(&json!({"sites": ["A", "B"]})).is_ok());
        let err = schema.validate(&json!({"sites": ["A", 3]})).unwrap_err();
        assert!(err.to_string().contains("sites[1]"));
    }
}
