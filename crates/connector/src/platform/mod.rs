//! Capability seam between the connector and the host commerce platform.
//!
//! Every persistence and lookup concern the connector has is expressed as a
//! trait here. Two adapters ship with the crate:
//!
//! - [`memory::MemoryPlatform`] - seedable in-memory state for tests and
//!   database-less local runs
//! - [`postgres::PostgresPlatform`] - sqlx-backed storage for deployment

pub mod memory;
pub mod postgres;
pub mod types;

use async_trait::async_trait;
use storelink_core::{CategoryId, CustomerGroupId, ProductId, RuleId, ScopeType, StoreId, WebsiteId};
use thiserror::Error;

pub use types::{
    Condition, Coupon, CouponKind, CouponType, FreeShippingMode, SalesRule, SimpleAction, Store,
    Website,
};

/// Errors surfaced by platform adapters.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The requested entity does not exist.
    #[error("{0} was not found")]
    NotFound(String),

    /// A uniqueness constraint rejected the write (e.g. duplicate coupon code).
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for PlatformError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::AlreadyExists(db.message().to_string())
            }
            _ => Self::Storage(err.to_string()),
        }
    }
}

/// Persistence of cart price rules.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Persist a rule, assigning an id when it has none yet.
    async fn save_rule(&self, rule: SalesRule) -> Result<SalesRule, PlatformError>;

    /// Load a rule by id.
    async fn rule(&self, id: RuleId) -> Result<SalesRule, PlatformError>;

    /// Delete a rule by id. Missing rules are a [`PlatformError::NotFound`].
    async fn delete_rule(&self, id: RuleId) -> Result<(), PlatformError>;
}

/// Persistence of coupons. Code uniqueness is enforced by the adapter.
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Persist a coupon, assigning an id when it has none yet.
    async fn save_coupon(&self, coupon: Coupon) -> Result<Coupon, PlatformError>;

    /// The rule's primary (shared) coupon, if one exists.
    async fn primary_coupon(&self, rule_id: RuleId) -> Result<Option<Coupon>, PlatformError>;
}

/// Read-only catalog lookups used while building condition trees.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Whether a category exists.
    async fn category_exists(&self, id: CategoryId) -> Result<bool, PlatformError>;

    /// SKUs of the products that exist among `ids`, in no particular order.
    async fn skus_for_products(&self, ids: &[ProductId]) -> Result<Vec<String>, PlatformError>;
}

/// The host's website/store directory.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn websites(&self) -> Result<Vec<Website>, PlatformError>;

    async fn stores(&self) -> Result<Vec<Store>, PlatformError>;

    async fn website(&self, id: WebsiteId) -> Result<Website, PlatformError>;

    async fn store(&self, id: StoreId) -> Result<Store, PlatformError>;

    /// All customer group ids known to the platform.
    async fn customer_group_ids(&self) -> Result<Vec<CustomerGroupId>, PlatformError>;
}

/// Per-scope connector settings as stored by the host.
#[async_trait]
pub trait ConfigReader: Send + Sync {
    /// The API key configured at this scope. Empty string when unset.
    async fn api_key(&self, scope_type: ScopeType, scope_id: i32) -> Result<String, PlatformError>;

    /// Whether the connector is enabled at this scope.
    async fn is_active(&self, scope_type: ScopeType, scope_id: i32) -> Result<bool, PlatformError>;
}
