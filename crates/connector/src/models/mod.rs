//! External DTOs: the shapes the marketing service sends and receives.

pub mod discount;
pub mod price_rule;
pub mod scope;

pub use discount::Discount;
pub use price_rule::{PriceRule, PriceRuleResponse};
pub use scope::ConfigScope;
