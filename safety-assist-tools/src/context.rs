use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::locale::Locale;
use crate::persona::Persona;

/// Identity and security envelope for one request.
///
/// Built once per call and passed explicitly to every tool and sanitizer.
/// Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDescriptor {
    organization_id: String,
    user_id: String,
    persona: Persona,
    #[serde(default)]
    locale: Locale,
}

impl ContextDescriptor {
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        persona: Persona,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            persona,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Both identifiers must be present and non-blank.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.organization_id.trim().is_empty() || self.user_id.trim().is_empty() {
            return Err(ToolError::InvalidContext);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_context() {
        let ctx = ContextDescriptor::new("org_1", "u1", Persona::General);
        assert!(ctx.validate().is_ok());
        assert_eq!(ctx.locale(), Locale::En);
    }

    #[test]
    fn test_missing_identifiers_rejected() {
        let missing_org = ContextDescriptor::new("", "u1", Persona::Capa);
        assert_eq!(missing_org.validate(), Err(ToolError::InvalidContext));

        let blank_user = ContextDescriptor::new("org_1", "   ", Persona::Capa);
        assert_eq!(blank_user.validate(), Err(ToolError::InvalidContext));
    }
}
