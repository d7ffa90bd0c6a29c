//! Explicit output shapes for records that reach model context.
//!
//! A shape lists every key that may survive sanitization. Keys that are not
//! listed are dropped, so storage identifiers never need to be recognised by
//! name.

use super::labels::EnumDomain;

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Copied unchanged.
    Plain,
    /// String code translated to a display label.
    Label(EnumDomain),
    /// Object or array of objects sanitized with another shape.
    Nested(&'static ResultShape),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Key in the raw record.
    pub source: &'static str,
    /// Key in the sanitized output.
    pub output: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub struct ResultShape {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

const fn keep(key: &'static str) -> FieldRule {
    FieldRule {
        source: key,
        output: key,
        kind: FieldKind::Plain,
    }
}

const fn rename(source: &'static str, output: &'static str) -> FieldRule {
    FieldRule {
        source,
        output,
        kind: FieldKind::Plain,
    }
}

const fn label(key: &'static str, domain: EnumDomain) -> FieldRule {
    FieldRule {
        source: key,
        output: key,
        kind: FieldKind::Label(domain),
    }
}

const fn nested(key: &'static str, shape: &'static ResultShape) -> FieldRule {
    FieldRule {
        source: key,
        output: key,
        kind: FieldKind::Nested(shape),
    }
}

pub static INCIDENT: ResultShape = ResultShape {
    name: "incident",
    fields: &[
        keep("reference"),
        keep("title"),
        keep("description"),
        label("status", EnumDomain::Status),
        label("severity", EnumDomain::Severity),
        label("category", EnumDomain::Category),
        keep("occurredAt"),
        keep("location"),
        rename("siteName", "site"),
        rename("reporterName", "reportedBy"),
    ],
};

pub static CORRECTIVE_ACTION: ResultShape = ResultShape {
    name: "corrective_action",
    fields: &[
        keep("reference"),
        keep("title"),
        label("status", EnumDomain::Status),
        label("priority", EnumDomain::Priority),
        keep("dueDate"),
        rename("ownerName", "owner"),
        rename("incidentReference", "relatedIncident"),
        keep("progress"),
    ],
};

pub static COMPLIANCE_REQUIREMENT: ResultShape = ResultShape {
    name: "compliance_requirement",
    fields: &[
        keep("reference"),
        keep("title"),
        keep("regulation"),
        label("status", EnumDomain::Status),
        label("priority", EnumDomain::Priority),
        keep("nextReviewDate"),
    ],
};

pub static HEALTH_RECORD: ResultShape = ResultShape {
    name: "health_record",
    fields: &[
        keep("reference"),
        rename("employeeName", "employee"),
        keep("examType"),
        label("status", EnumDomain::Status),
        keep("dueDate"),
    ],
};

pub static ORGANIZATION_OVERVIEW: ResultShape = ResultShape {
    name: "organization_overview",
    fields: &[
        keep("name"),
        keep("industry"),
        keep("siteCount"),
        keep("employeeCount"),
        keep("openIncidents"),
        keep("openCorrectiveActions"),
        keep("overdueCorrectiveActions"),
    ],
};

pub static INCIDENT_LIST: ResultShape = ResultShape {
    name: "incident_list",
    fields: &[keep("count"), nested("incidents", &INCIDENT)],
};

pub static CORRECTIVE_ACTION_LIST: ResultShape = ResultShape {
    name: "corrective_action_list",
    fields: &[keep("count"), nested("correctiveActions", &CORRECTIVE_ACTION)],
};

pub static COMPLIANCE_LIST: ResultShape = ResultShape {
    name: "compliance_list",
    fields: &[keep("count"), nested("requirements", &COMPLIANCE_REQUIREMENT)],
};

pub static HEALTH_LIST: ResultShape = ResultShape {
    name: "health_list",
    fields: &[keep("count"), nested("records", &HEALTH_RECORD)],
};

/// Every shape a built-in tool can emit.
pub static ALL_SHAPES: [&ResultShape; 9] = [
    &INCIDENT,
    &CORRECTIVE_ACTION,
    &COMPLIANCE_REQUIREMENT,
    &HEALTH_RECORD,
    &ORGANIZATION_OVERVIEW,
    &INCIDENT_LIST,
    &CORRECTIVE_ACTION_LIST,
    &COMPLIANCE_LIST,
    &HEALTH_LIST,
];
