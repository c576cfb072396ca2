//! Core types for the Storelink connector.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod rule;
pub mod scope;

pub use id::*;
pub use rule::PriceRuleType;
pub use scope::{ScopeType, ScopeTypeParseError};
