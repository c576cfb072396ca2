//! Configuration scope levels.
//!
//! The host platform resolves configuration hierarchically: a website owns
//! one or more stores, and each level can carry its own connector settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The level a configuration value is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    /// Website level: owns stores, settings inherited by them.
    #[default]
    Website,
    /// Store level: overrides website settings when set explicitly.
    Store,
}

impl ScopeType {
    /// Get the canonical parameter string for this scope type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Store => "store",
        }
    }
}

impl std::fmt::Display for ScopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scope type string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported scope type: {0}")]
pub struct ScopeTypeParseError(pub String);

impl std::str::FromStr for ScopeType {
    type Err = ScopeTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" | "websites" => Ok(Self::Website),
            "store" | "stores" => Ok(Self::Store),
            other => Err(ScopeTypeParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_type_parse() {
        assert_eq!("website".parse::<ScopeType>(), Ok(ScopeType::Website));
        assert_eq!("store".parse::<ScopeType>(), Ok(ScopeType::Store));
        assert!("customer".parse::<ScopeType>().is_err());
    }

    #[test]
    fn test_scope_type_display() {
        assert_eq!(ScopeType::Website.to_string(), "website");
        assert_eq!(ScopeType::Store.to_string(), "store");
    }
}
