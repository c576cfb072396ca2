//! In-memory platform adapter.
//!
//! Backs tests and database-less local runs. The adapter enforces the same
//! constraints the real storage does: unique coupon codes and at most one
//! primary coupon per rule.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use storelink_core::{
    CategoryId, CouponId, CustomerGroupId, ProductId, RuleId, ScopeType, StoreId, WebsiteId,
};

use super::{
    Catalog, ConfigReader, Coupon, CouponStore, PlatformError, RuleStore, SalesRule, Store,
    StoreDirectory, Website,
};

#[derive(Debug, Clone, Default)]
struct ScopeSettings {
    api_key: String,
    is_active: bool,
}

#[derive(Debug, Default)]
struct State {
    websites: BTreeMap<WebsiteId, Website>,
    stores: BTreeMap<StoreId, Store>,
    settings: HashMap<(ScopeType, i32), ScopeSettings>,
    customer_groups: Vec<CustomerGroupId>,
    categories: HashSet<CategoryId>,
    products: BTreeMap<ProductId, String>,
    rules: BTreeMap<RuleId, SalesRule>,
    coupons: BTreeMap<CouponId, Coupon>,
    next_rule_id: i32,
    next_coupon_id: i32,
}

/// Seedable in-memory platform.
#[derive(Debug)]
pub struct MemoryPlatform {
    inner: RwLock<State>,
}

impl MemoryPlatform {
    /// Start building a seeded platform.
    #[must_use]
    pub fn builder() -> MemoryPlatformBuilder {
        MemoryPlatformBuilder::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, PlatformError> {
        self.inner
            .read()
            .map_err(|_| PlatformError::Storage("state lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, PlatformError> {
        self.inner
            .write()
            .map_err(|_| PlatformError::Storage("state lock poisoned".to_string()))
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder seeding directory, catalog, and scope settings.
#[derive(Debug, Default)]
pub struct MemoryPlatformBuilder {
    state: State,
}

impl MemoryPlatformBuilder {
    #[must_use]
    pub fn website(mut self, id: i32, code: &str, name: &str, base_url: &str) -> Self {
        let id = WebsiteId::new(id);
        self.state.websites.insert(
            id,
            Website {
                id,
                code: code.to_string(),
                name: name.to_string(),
                base_url: base_url.to_string(),
            },
        );
        self
    }

    #[must_use]
    pub fn store(mut self, id: i32, website_id: i32, code: &str, name: &str, base_url: &str) -> Self {
        let id = StoreId::new(id);
        self.state.stores.insert(
            id,
            Store {
                id,
                website_id: WebsiteId::new(website_id),
                code: code.to_string(),
                name: name.to_string(),
                base_url: base_url.to_string(),
            },
        );
        self
    }

    #[must_use]
    pub fn scope_settings(
        mut self,
        scope_type: ScopeType,
        scope_id: i32,
        api_key: &str,
        is_active: bool,
    ) -> Self {
        self.state.settings.insert(
            (scope_type, scope_id),
            ScopeSettings {
                api_key: api_key.to_string(),
                is_active,
            },
        );
        self
    }

    #[must_use]
    pub fn customer_group(mut self, id: i32) -> Self {
        self.state.customer_groups.push(CustomerGroupId::new(id));
        self
    }

    #[must_use]
    pub fn category(mut self, id: i32) -> Self {
        self.state.categories.insert(CategoryId::new(id));
        self
    }

    #[must_use]
    pub fn product(mut self, id: i32, sku: &str) -> Self {
        self.state.products.insert(ProductId::new(id), sku.to_string());
        self
    }

    #[must_use]
    pub fn build(mut self) -> MemoryPlatform {
        self.state.next_rule_id = 1;
        self.state.next_coupon_id = 1;
        MemoryPlatform {
            inner: RwLock::new(self.state),
        }
    }
}

#[async_trait]
impl RuleStore for MemoryPlatform {
    async fn save_rule(&self, mut rule: SalesRule) -> Result<SalesRule, PlatformError> {
        let mut state = self.write()?;
        let id = match rule.id {
            Some(id) => {
                if !state.rules.contains_key(&id) {
                    return Err(PlatformError::NotFound(format!("rule {id}")));
                }
                id
            }
            None => {
                let id = RuleId::new(state.next_rule_id);
                state.next_rule_id += 1;
                rule.id = Some(id);
                id
            }
        };
        state.rules.insert(id, rule.clone());
        Ok(rule)
    }

    async fn rule(&self, id: RuleId) -> Result<SalesRule, PlatformError> {
        self.read()?
            .rules
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("rule {id}")))
    }

    async fn delete_rule(&self, id: RuleId) -> Result<(), PlatformError> {
        let mut state = self.write()?;
        if state.rules.remove(&id).is_none() {
            return Err(PlatformError::NotFound(format!("rule {id}")));
        }
        state.coupons.retain(|_, c| c.rule_id != id);
        Ok(())
    }
}

#[async_trait]
impl CouponStore for MemoryPlatform {
    async fn save_coupon(&self, mut coupon: Coupon) -> Result<Coupon, PlatformError> {
        let mut state = self.write()?;
        if !state.rules.contains_key(&coupon.rule_id) {
            return Err(PlatformError::NotFound(format!("rule {}", coupon.rule_id)));
        }
        // Unique code constraint.
        if state
            .coupons
            .values()
            .any(|c| c.code == coupon.code && c.id != coupon.id)
        {
            return Err(PlatformError::AlreadyExists(format!(
                "coupon code {}",
                coupon.code
            )));
        }
        // Single primary coupon per rule.
        if coupon.is_primary
            && state
                .coupons
                .values()
                .any(|c| c.rule_id == coupon.rule_id && c.is_primary && c.id != coupon.id)
        {
            return Err(PlatformError::AlreadyExists(format!(
                "primary coupon for rule {}",
                coupon.rule_id
            )));
        }
        let id = match coupon.id {
            Some(id) => id,
            None => {
                let id = CouponId::new(state.next_coupon_id);
                state.next_coupon_id += 1;
                coupon.id = Some(id);
                id
            }
        };
        state.coupons.insert(id, coupon.clone());
        Ok(coupon)
    }

    async fn primary_coupon(&self, rule_id: RuleId) -> Result<Option<Coupon>, PlatformError> {
        Ok(self
            .read()?
            .coupons
            .values()
            .find(|c| c.rule_id == rule_id && c.is_primary)
            .cloned())
    }
}

#[async_trait]
impl Catalog for MemoryPlatform {
    async fn category_exists(&self, id: CategoryId) -> Result<bool, PlatformError> {
        Ok(self.read()?.categories.contains(&id))
    }

    async fn skus_for_products(&self, ids: &[ProductId]) -> Result<Vec<String>, PlatformError> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl StoreDirectory for MemoryPlatform {
    async fn websites(&self) -> Result<Vec<Website>, PlatformError> {
        Ok(self.read()?.websites.values().cloned().collect())
    }

    async fn stores(&self) -> Result<Vec<Store>, PlatformError> {
        Ok(self.read()?.stores.values().cloned().collect())
    }

    async fn website(&self, id: WebsiteId) -> Result<Website, PlatformError> {
        self.read()?
            .websites
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("website {id}")))
    }

    async fn store(&self, id: StoreId) -> Result<Store, PlatformError> {
        self.read()?
            .stores
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("store {id}")))
    }

    async fn customer_group_ids(&self) -> Result<Vec<CustomerGroupId>, PlatformError> {
        Ok(self.read()?.customer_groups.clone())
    }
}

#[async_trait]
impl ConfigReader for MemoryPlatform {
    async fn api_key(&self, scope_type: ScopeType, scope_id: i32) -> Result<String, PlatformError> {
        Ok(self
            .read()?
            .settings
            .get(&(scope_type, scope_id))
            .map(|s| s.api_key.clone())
            .unwrap_or_default())
    }

    async fn is_active(&self, scope_type: ScopeType, scope_id: i32) -> Result<bool, PlatformError> {
        Ok(self
            .read()?
            .settings
            .get(&(scope_type, scope_id))
            .is_some_and(|s| s.is_active))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::platform::CouponKind;

    fn coupon(rule_id: RuleId, code: &str, is_primary: bool) -> Coupon {
        Coupon {
            id: None,
            rule_id,
            code: code.to_string(),
            kind: CouponKind::Manual,
            is_primary,
            usage_limit: 0,
            usage_per_customer: 0,
            times_used: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_rule_assigns_ids() {
        let platform = MemoryPlatform::default();
        let a = platform
            .save_rule(SalesRule::default())
            .await
            .expect("save");
        let b = platform
            .save_rule(SalesRule::default())
            .await
            .expect("save");
        assert_eq!(a.id, Some(RuleId::new(1)));
        assert_eq!(b.id, Some(RuleId::new(2)));
    }

    #[tokio::test]
    async fn test_save_rule_unknown_id_is_not_found() {
        let platform = MemoryPlatform::default();
        let mut rule = SalesRule::default();
        rule.id = Some(RuleId::new(99));
        let err = platform.save_rule(rule).await.expect_err("missing rule");
        assert!(matches!(err, PlatformError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_coupon_code_rejected() {
        let platform = MemoryPlatform::default();
        let rule = platform
            .save_rule(SalesRule::default())
            .await
            .expect("save");
        let rule_id = rule.id.expect("id assigned");
        platform
            .save_coupon(coupon(rule_id, "SAVE10", false))
            .await
            .expect("first save");
        let err = platform
            .save_coupon(coupon(rule_id, "SAVE10", false))
            .await
            .expect_err("duplicate code");
        assert!(matches!(err, PlatformError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_single_primary_per_rule() {
        let platform = MemoryPlatform::default();
        let rule = platform
            .save_rule(SalesRule::default())
            .await
            .expect("save");
        let rule_id = rule.id.expect("id assigned");
        let first = platform
            .save_coupon(coupon(rule_id, "FIRST", true))
            .await
            .expect("first primary");
        let err = platform
            .save_coupon(coupon(rule_id, "SECOND", true))
            .await
            .expect_err("second primary");
        assert!(matches!(err, PlatformError::AlreadyExists(_)));

        // Updating the existing primary in place is fine.
        let mut updated = first;
        updated.code = "SECOND".to_string();
        platform.save_coupon(updated).await.expect("update primary");
        let primary = platform
            .primary_coupon(rule_id)
            .await
            .expect("lookup")
            .expect("primary exists");
        assert_eq!(primary.code, "SECOND");
    }

    #[tokio::test]
    async fn test_delete_rule_removes_coupons() {
        let platform = MemoryPlatform::default();
        let rule = platform
            .save_rule(SalesRule::default())
            .await
            .expect("save");
        let rule_id = rule.id.expect("id assigned");
        platform
            .save_coupon(coupon(rule_id, "GONE", true))
            .await
            .expect("save coupon");
        platform.delete_rule(rule_id).await.expect("delete");
        assert!(platform
            .primary_coupon(rule_id)
            .await
            .expect("lookup")
            .is_none());
    }

    #[tokio::test]
    async fn test_config_reader_defaults() {
        let platform = MemoryPlatform::builder()
            .scope_settings(ScopeType::Website, 1, "key-1", true)
            .build();
        assert_eq!(
            platform
                .api_key(ScopeType::Website, 1)
                .await
                .expect("lookup"),
            "key-1"
        );
        assert_eq!(
            platform
                .api_key(ScopeType::Store, 1)
                .await
                .expect("lookup"),
            ""
        );
        assert!(!platform
            .is_active(ScopeType::Store, 1)
            .await
            .expect("lookup"));
    }
}
