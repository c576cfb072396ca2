//! Connector services: the logic between the HTTP surface and the platform.

pub mod discounts;
pub mod scope;

pub use discounts::DiscountService;
pub use scope::ScopeResolver;
