//! Last-mile transform applied to tool output before it enters model context.
//!
//! Sanitization is pure, synchronous and total:
//! - object keys not listed in the record's [`ResultShape`] are dropped,
//! - flat fields keep scalars and scalar lists only; nested objects are
//!   dropped unless the shape declares them,
//! - enumeration codes are replaced by the locale's display label,
//! - codes missing from a label table pass through unchanged.
//!
//! Applying it to its own output yields the same value.

pub mod labels;
pub mod shapes;

use serde_json::{Map, Value};
use tracing::debug;

use crate::locale::Locale;
pub use labels::{codes, label_for, EnumDomain};
pub use shapes::{FieldKind, FieldRule, ResultShape};

/// Sanitize a record, or each record of an array, with `shape`.
/// Primitives are returned unchanged.
pub fn sanitize(value: &Value, shape: &ResultShape, locale: Locale) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize(item, shape, locale))
                .collect(),
        ),
        Value::Object(record) => Value::Object(sanitize_record(record, shape, locale)),
        other => other.clone(),
    }
}

fn sanitize_record(record: &Map<String, Value>, shape: &ResultShape, locale: Locale) -> Map<String, Value> {
    let mut out = Map::new();
    for rule in shape.fields {
        // Fall back to the output key so already-sanitized records map to themselves.
        let Some(value) = record.get(rule.source).or_else(|| record.get(rule.output)) else {
            continue;
        };
        if !matches!(rule.kind, FieldKind::Nested(_)) && !is_scalar_like(value) {
            debug!(field = rule.source, "dropping structured value of a flat field");
            continue;
        }
        let value = match rule.kind {
            FieldKind::Plain => value.clone(),
            FieldKind::Label(domain) => translate(value, domain, locale),
            FieldKind::Nested(inner) => sanitize(value, inner, locale),
        };
        out.insert(rule.output.to_string(), value);
    }
    out
}

fn is_scalar_like(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(items) => items
            .iter()
            .all(|item| !matches!(item, Value::Object(_) | Value::Array(_))),
        _ => true,
    }
}

/// Translate a code to its display label. Non-strings and unknown codes are
/// returned unchanged.
pub fn translate(value: &Value, domain: EnumDomain, locale: Locale) -> Value {
    let Some(code) = value.as_str() else {
        return value.clone();
    };
    match label_for(domain, locale, code) {
        Some(label) => Value::String(label.to_string()),
        None => {
            debug!(?domain, %locale, code, "no display label for code");
            value.clone()
        }
    }
}

/// Naming pattern of internal storage identifiers (`id`, `_id`,
/// `organizationId`, `owner_id`, ...).
pub fn looks_like_internal_identifier(key: &str) -> bool {
    key == "id"
        || key == "_id"
        || key.ends_with("Id")
        || key.ends_with("_id")
        || key.ends_with("ID")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::shapes::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_identifiers_and_translates_status() {
        let raw = json!({
            "internalId": "doc_8f3",
            "reference": "INC-2025-0001",
            "status": "in_progress"
        });
        let out = sanitize(&raw, &INCIDENT, Locale::Fr);
        assert!(out.get("internalId").is_none());
        assert_eq!(out["reference"], "INC-2025-0001");
        assert_eq!(out["status"], "En cours");
    }

    #[test]
    fn test_renames_and_nested_lists() {
        let raw = json!({
            "count": 1,
            "organizationId": "org_9",
            "incidents": [{
                "id": "x1",
                "reference": "INC-1",
                "siteName": "Plant A",
                "severity": "critical",
                "reporterId": "u_7",
                "reporterName": "Ana"
            }]
        });
        let out = sanitize(&raw, &INCIDENT_LIST, Locale::Es);
        assert_eq!(
            out,
            json!({
                "count": 1,
                "incidents": [{
                    "reference": "INC-1",
                    "site": "Plant A",
                    "severity": "Crítica",
                    "reportedBy": "Ana"
                }]
            })
        );
    }

    #[test]
    fn test_unmapped_code_passes_through() {
        let raw = json!({"reference": "CA-1", "status": "archived", "priority": 3});
        let out = sanitize(&raw, &CORRECTIVE_ACTION, Locale::En);
        assert_eq!(out["status"], "archived");
        assert_eq!(out["priority"], 3);
    }

    #[test]
    fn test_health_exam_status_is_labelled() {
        let raw = json!({"reference": "HS-1", "status": "scheduled"});
        let out = sanitize(&raw, &HEALTH_RECORD, Locale::Fr);
        assert_eq!(out, json!({"reference": "HS-1", "status": "Planifié"}));
    }

    #[test]
    fn test_plain_field_drops_nested_objects() {
        let raw = json!({
            "reference": "INC-1",
            "location": {"siteId": "s_91", "name": "Dock"},
            "progress": [{"stepId": "st_1"}],
            "title": "Fall"
        });
        let out = sanitize(&raw, &INCIDENT, Locale::En);
        assert_eq!(out, json!({"reference": "INC-1", "title": "Fall"}));

        let labelled = json!({"reference": "INC-2", "status": {"ownerId": "u_1"}});
        assert_eq!(sanitize(&labelled, &INCIDENT, Locale::Fr), json!({"reference": "INC-2"}));

        let tags = json!({"reference": "CA-3", "progress": [10, 40]});
        let out = sanitize(&tags, &CORRECTIVE_ACTION, Locale::En);
        assert_eq!(out["progress"], json!([10, 40]));
    }

    #[test]
    fn test_primitives_unchanged() {
        assert_eq!(sanitize(&json!(42), &INCIDENT, Locale::Fr), json!(42));
        assert_eq!(sanitize(&Value::Null, &INCIDENT, Locale::Fr), Value::Null);
    }

    #[test]
    fn test_no_shape_emits_internal_identifier_keys() {
        for shape in ALL_SHAPES {
            for rule in shape.fields {
                assert!(
                    !looks_like_internal_identifier(rule.output),
                    "shape {} emits {}",
                    shape.name,
                    rule.output
                );
            }
        }
    }

    #[test]
    fn test_sanitize_twice_equals_once() {
        let raw = json!([{
            "id": "a",
            "reference": "CA-2",
            "status": "overdue",
            "priority": "urgent",
            "ownerName": "Lee",
            "ownerId": "u_2"
        }]);
        let once = sanitize(&raw, &CORRECTIVE_ACTION, Locale::Fr);
        let twice = sanitize(&once, &CORRECTIVE_ACTION, Locale::Fr);
        assert_eq!(once, twice);
        assert_eq!(once[0]["owner"], "Lee");
    }
}
