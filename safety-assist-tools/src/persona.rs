//! Assistant personas and the static persona → tool category table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tool category a definition is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Incident,
    Capa,
    Compliance,
    Health,
    Organization,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 5] = [
        ToolCategory::Incident,
        ToolCategory::Capa,
        ToolCategory::Compliance,
        ToolCategory::Health,
        ToolCategory::Organization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Incident => "incident",
            ToolCategory::Capa => "capa",
            ToolCategory::Compliance => "compliance",
            ToolCategory::Health => "health",
            ToolCategory::Organization => "organization",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named assistant configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "general_ai")]
    General,
    #[serde(rename = "incident_ai")]
    Incident,
    #[serde(rename = "capa_ai")]
    Capa,
    #[serde(rename = "compliance_ai")]
    Compliance,
    #[serde(rename = "health_ai")]
    Health,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::General,
        Persona::Incident,
        Persona::Capa,
        Persona::Compliance,
        Persona::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::General => "general_ai",
            Persona::Incident => "incident_ai",
            Persona::Capa => "capa_ai",
            Persona::Compliance => "compliance_ai",
            Persona::Health => "health_ai",
        }
    }

    /// Categories whose tools this persona may see and call.
    ///
    /// The general persona gets every category. Specialized personas get a
    /// curated subset that always includes the cross-cutting organization tools.
    pub fn categories(&self) -> &'static [ToolCategory] {
        use ToolCategory::*;
        match self {
            Persona::General => &ToolCategory::ALL,
            Persona::Incident => &[Incident, Capa, Organization],
            Persona::Capa => &[Incident, Capa, Compliance, Organization],
            Persona::Compliance => &[Compliance, Capa, Organization],
            Persona::Health => &[Health, Organization],
        }
    }

    pub fn allows(&self, category: ToolCategory) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("unknown persona: {}", s))
    }
}
