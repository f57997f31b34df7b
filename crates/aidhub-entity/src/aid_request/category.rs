//! Aid category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of support a request asks for.
///
/// Older clients sent `monetary` and `in_kind`; both are still accepted
/// on input and normalized to the canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AidCategory {
    /// A money amount.
    #[serde(alias = "monetary")]
    Financial,
    /// In-kind items (quantity per named item).
    #[serde(alias = "in_kind")]
    Essentials,
}

impl AidCategory {
    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Essentials => "essentials",
        }
    }
}

impl fmt::Display for AidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AidCategory {
    type Err = aidhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "financial" | "monetary" => Ok(Self::Financial),
            "essentials" | "in_kind" => Ok(Self::Essentials),
            _ => Err(aidhub_core::AppError::validation(format!(
                "Invalid aid category: '{s}'. Expected one of: financial, essentials"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_synonyms_parse() {
        assert_eq!(
            "monetary".parse::<AidCategory>().unwrap(),
            AidCategory::Financial
        );
        assert_eq!(
            "in_kind".parse::<AidCategory>().unwrap(),
            AidCategory::Essentials
        );
        assert!("housing".parse::<AidCategory>().is_err());
    }

    #[test]
    fn test_legacy_synonyms_deserialize() {
        let parsed: AidCategory = serde_json::from_str("\"monetary\"").unwrap();
        assert_eq!(parsed, AidCategory::Financial);
        // Canonical name is what goes back out.
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"financial\"");
    }
}
