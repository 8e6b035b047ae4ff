//! # Tenant Identity
//!
//! A tenant is one (country, industry) configuration scope. Both halves are
//! newtypes validated at construction: a blank code is the
//! "identity missing" condition and can never reach a resolver.
//!
//! Codes are trimmed but otherwise kept as given. Country codes are
//! conventionally ISO 3166 alpha-2 (`CO`, `MX`, `US`) and industry codes are
//! lowercase slugs (`healthcare`, `financial`), but the engine does not
//! enforce either convention because the upstream tables are the authority.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn check_charset(kind: &'static str, value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            reason: "only ASCII letters, digits, '_' and '-' are allowed",
        })
    }
}

/// Country half of a tenant scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCountryCode);
        }
        check_charset("country code", trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Industry half of a tenant scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndustryCode(String);

impl IndustryCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIndustryCode);
        }
        check_charset("industry code", trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IndustryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IndustryCode> for String {
    fn from(code: IndustryCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for IndustryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated (country, industry) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantKey {
    pub country: CountryCode,
    pub industry: IndustryCode,
}

impl TenantKey {
    pub fn new(country: CountryCode, industry: IndustryCode) -> Self {
        Self { country, industry }
    }

    /// Validate both halves from raw strings. The country is checked first.
    pub fn parse(country: &str, industry: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            country: CountryCode::new(country)?,
            industry: IndustryCode::new(industry)?,
        })
    }

    /// Cache key for a facet scoped to both halves: `"{kind}_{country}_{industry}"`.
    pub fn scoped_key(&self, kind: &str) -> String {
        format!("{kind}_{}_{}", self.country, self.industry)
    }
}

impl std::fmt::Display for TenantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.country, self.industry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_country_is_rejected() {
        assert_eq!(CountryCode::new("  "), Err(ValidationError::EmptyCountryCode));
        assert_eq!(CountryCode::new(""), Err(ValidationError::EmptyCountryCode));
    }

    #[test]
    fn blank_industry_is_rejected() {
        assert_eq!(IndustryCode::new(""), Err(ValidationError::EmptyIndustryCode));
    }

    #[test]
    fn codes_are_trimmed() {
        assert_eq!(CountryCode::new(" CO ").unwrap().as_str(), "CO");
        assert_eq!(IndustryCode::new("healthcare\n").unwrap().as_str(), "healthcare");
    }

    #[test]
    fn separators_in_codes_are_rejected() {
        assert!(matches!(
            CountryCode::new("CO/MX"),
            Err(ValidationError::InvalidIdentifier { .. })
        ));
        assert!(IndustryCode::new("health care").is_err());
    }

    #[test]
    fn tenant_parse_checks_country_first() {
        assert_eq!(TenantKey::parse("", ""), Err(ValidationError::EmptyCountryCode));
        assert_eq!(
            TenantKey::parse("CO", " "),
            Err(ValidationError::EmptyIndustryCode)
        );
    }

    #[test]
    fn scoped_key_format() {
        let t = TenantKey::parse("CO", "healthcare").unwrap();
        assert_eq!(t.scoped_key("regulators"), "regulators_CO_healthcare");
        assert_eq!(t.scoped_key("config"), "config_CO_healthcare");
        assert_eq!(t.to_string(), "CO/healthcare");
    }

    #[test]
    fn serde_rejects_blank_codes() {
        let ok: CountryCode = serde_json::from_str("\"MX\"").unwrap();
        assert_eq!(ok.as_str(), "MX");
        assert!(serde_json::from_str::<CountryCode>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"MX\"");
    }
}
