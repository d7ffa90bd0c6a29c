//! Locale label tables for internal enumeration codes.
//!
//! Every code present in the English table must appear in every other
//! locale's table for the same domain.

use crate::locale::Locale;

/// Enumerated domain a field's code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumDomain {
    Status,
    Severity,
    Category,
    Priority,
}

impl EnumDomain {
    pub const ALL: [EnumDomain; 4] = [
        EnumDomain::Status,
        EnumDomain::Severity,
        EnumDomain::Category,
        EnumDomain::Priority,
    ];
}

type LabelTable = &'static [(&'static str, &'static str)];

const STATUS_EN: LabelTable = &[
    ("open", "Open"),
    ("in_progress", "In progress"),
    ("under_review", "Under review"),
    ("pending_verification", "Pending verification"),
    ("closed", "Closed"),
    ("overdue", "Overdue"),
    ("cancelled", "Cancelled"),
    ("scheduled", "Scheduled"),
    ("completed", "Completed"),
];

const STATUS_FR: LabelTable = &[
    ("open", "Ouvert"),
    ("in_progress", "En cours"),
    ("under_review", "En revue"),
    ("pending_verification", "En attente de vérification"),
    ("closed", "Clôturé"),
    ("overdue", "En retard"),
    ("cancelled", "Annulé"),
    ("scheduled", "Planifié"),
    ("completed", "Terminé"),
];

const STATUS_ES: LabelTable = &[
    ("open", "Abierto"),
    ("in_progress", "En curso"),
    ("under_review", "En revisión"),
    ("pending_verification", "Pendiente de verificación"),
    ("closed", "Cerrado"),
    ("overdue", "Vencido"),
    ("cancelled", "Cancelado"),
    ("scheduled", "Programado"),
    ("completed", "Completado"),
];

const SEVERITY_EN: LabelTable = &[
    ("low", "Low"),
    ("medium", "Medium"),
    ("high", "High"),
    ("critical", "Critical"),
];

const SEVERITY_FR: LabelTable = &[
    ("low", "Faible"),
    ("medium", "Moyenne"),
    ("high", "Élevée"),
    ("critical", "Critique"),
];

const SEVERITY_ES: LabelTable = &[
    ("low", "Baja"),
    ("medium", "Media"),
    ("high", "Alta"),
    ("critical", "Crítica"),
];

const CATEGORY_EN: LabelTable = &[
    ("injury", "Injury"),
    ("near_miss", "Near miss"),
    ("property_damage", "Property damage"),
    ("environmental", "Environmental"),
    ("occupational_illness", "Occupational illness"),
    ("security", "Security"),
];

const CATEGORY_FR: LabelTable = &[
    ("injury", "Blessure"),
    ("near_miss", "Presque-accident"),
    ("property_damage", "Dommage matériel"),
    ("environmental", "Environnemental"),
    ("occupational_illness", "Maladie professionnelle"),
    ("security", "Sûreté"),
];

const CATEGORY_ES: LabelTable = &[
    ("injury", "Lesión"),
    ("near_miss", "Casi accidente"),
    ("property_damage", "Daño material"),
    ("environmental", "Ambiental"),
    ("occupational_illness", "Enfermedad profesional"),
    ("security", "Seguridad"),
];

const PRIORITY_EN: LabelTable = &[
    ("low", "Low"),
    ("medium", "Medium"),
    ("high", "High"),
    ("urgent", "Urgent"),
];

const PRIORITY_FR: LabelTable = &[
    ("low", "Basse"),
    ("medium", "Moyenne"),
    ("high", "Haute"),
    ("urgent", "Urgente"),
];

const PRIORITY_ES: LabelTable = &[
    ("low", "Baja"),
    ("medium", "Media"),
    ("high", "Alta"),
    ("urgent", "Urgente"),
];

fn table(domain: EnumDomain, locale: Locale) -> LabelTable {
    match (domain, locale) {
        (EnumDomain::Status, Locale::En) => STATUS_EN,
        (EnumDomain::Status, Locale::Fr) => STATUS_FR,
        (EnumDomain::Status, Locale::Es) => STATUS_ES,
        (EnumDomain::Severity, Locale::En) => SEVERITY_EN,
        (EnumDomain::Severity, Locale::Fr) => SEVERITY_FR,
        (EnumDomain::Severity, Locale::Es) => SEVERITY_ES,
        (EnumDomain::Category, Locale::En) => CATEGORY_EN,
        (EnumDomain::Category, Locale::Fr) => CATEGORY_FR,
        (EnumDomain::Category, Locale::Es) => CATEGORY_ES,
        (EnumDomain::Priority, Locale::En) => PRIORITY_EN,
        (EnumDomain::Priority, Locale::Fr) => PRIORITY_FR,
        (EnumDomain::Priority, Locale::Es) => PRIORITY_ES,
    }
}

/// Display label for `code`, or `None` when the table has no entry.
pub fn label_for(domain: EnumDomain, locale: Locale, code: &str) -> Option<&'static str> {
    table(domain, locale)
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// Known codes of a domain, in table order.
pub fn codes(domain: EnumDomain) -> Vec<&'static str> {
    table(domain, Locale::En).iter().map(|(c, _)| *c).collect()
}
