//! Application state shared across handlers.

use std::sync::Arc;

use crate::platform::{Catalog, ConfigReader, CouponStore, RuleStore, StoreDirectory};
use crate::services::{DiscountService, ScopeResolver};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    discounts: DiscountService,
    scopes: ScopeResolver,
}

impl AppState {
    /// Wire the services against one platform adapter.
    pub fn new<P>(platform: Arc<P>) -> Self
    where
        P: RuleStore + CouponStore + Catalog + StoreDirectory + ConfigReader + 'static,
    {
        let discounts = DiscountService::new(
            platform.clone(),
            platform.clone(),
            platform.clone(),
            platform.clone(),
        );
        let scopes = ScopeResolver::new(platform.clone(), platform);
        Self {
            inner: Arc::new(AppStateInner { discounts, scopes }),
        }
    }

    #[must_use]
    pub fn discounts(&self) -> &DiscountService {
        &self.inner.discounts
    }

    #[must_use]
    pub fn scopes(&self) -> &ScopeResolver {
        &self.inner.scopes
    }
}
