//! Price-rule and coupon administration.
//!
//! Translates the marketing service's flat price-rule description into the
//! host platform's rule/condition/coupon graph, and issues coupon codes.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use storelink_core::{PriceRuleType, RuleId, WebsiteId};
use tracing::instrument;

use crate::error::ApiError;
use crate::models::price_rule::{is_empty_sentinel, parse_utc};
use crate::models::{Discount, PriceRule, PriceRuleResponse};
use crate::platform::{
    Catalog, Condition, Coupon, CouponKind, CouponStore, CouponType, FreeShippingMode,
    PlatformError, RuleStore, SalesRule, SimpleAction, StoreDirectory,
};

/// Length of generated coupon codes.
const GENERATED_CODE_LENGTH: usize = 12;

/// Attempts before giving up on a collision-free generated code.
const MAX_CODE_ATTEMPTS: usize = 5;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Maps external price rules onto host sales rules and manages coupons.
pub struct DiscountService {
    rules: Arc<dyn RuleStore>,
    coupons: Arc<dyn CouponStore>,
    catalog: Arc<dyn Catalog>,
    directory: Arc<dyn StoreDirectory>,
}

impl DiscountService {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        coupons: Arc<dyn CouponStore>,
        catalog: Arc<dyn Catalog>,
        directory: Arc<dyn StoreDirectory>,
    ) -> Self {
        Self {
            rules,
            coupons,
            catalog,
            directory,
        }
    }

    /// Create a new price rule from the external description.
    ///
    /// # Errors
    ///
    /// `Validation` when the DTO is rejected, `Internal` when persistence
    /// fails.
    #[instrument(skip(self, rule))]
    pub async fn create_price_rule(&self, rule: &PriceRule) -> Result<PriceRuleResponse, ApiError> {
        let errors = rule.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let mut host = SalesRule::default();
        Self::apply_fields(&mut host, rule, false);
        host.description = rule.description.clone();
        host.is_active = true;
        host.website_ids = vec![WebsiteId::new(rule.website_id)];
        host.customer_group_ids = self
            .directory
            .customer_group_ids()
            .await
            .map_err(|e| ApiError::from_platform(e, "list customer groups"))?;
        self.build_conditions(&mut host, rule, false).await?;

        let saved = self
            .rules
            .save_rule(host)
            .await
            .map_err(|e| ApiError::from_platform(e, "create price rule"))?;
        Ok(PriceRuleResponse {
            id: saved
                .id
                .ok_or_else(|| ApiError::Internal("rule saved without an id".to_string()))?,
        })
    }

    /// Update an existing price rule in place.
    ///
    /// # Errors
    ///
    /// `Validation` when the DTO is rejected, `NotFound` when the rule does
    /// not exist.
    #[instrument(skip(self, rule), fields(rule_id = %id))]
    pub async fn update_price_rule(
        &self,
        id: RuleId,
        rule: &PriceRule,
    ) -> Result<PriceRuleResponse, ApiError> {
        let errors = rule.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let mut existing = self
            .rules
            .rule(id)
            .await
            .map_err(|e| ApiError::from_platform(e, "load price rule"))?;
        Self::apply_fields(&mut existing, rule, true);
        self.build_conditions(&mut existing, rule, true).await?;

        let saved = self
            .rules
            .save_rule(existing)
            .await
            .map_err(|e| ApiError::from_platform(e, "update price rule"))?;
        Ok(PriceRuleResponse {
            id: saved
                .id
                .ok_or_else(|| ApiError::Internal("rule saved without an id".to_string()))?,
        })
    }

    /// Delete a price rule. Deleting a rule that is already gone succeeds.
    ///
    /// # Errors
    ///
    /// `Internal` when the platform fails for any reason other than the rule
    /// being absent.
    #[instrument(skip(self))]
    pub async fn delete_price_rule(&self, id: RuleId) -> Result<(), ApiError> {
        match self.rules.delete_rule(id).await {
            Ok(()) | Err(PlatformError::NotFound(_)) => Ok(()),
            Err(e) => {
                tracing::error!(rule_id = %id, error = %e, "Failed to delete price rule");
                Err(ApiError::from_platform(e, "delete price rule"))
            }
        }
    }

    /// Issue a coupon for a rule.
    ///
    /// Rules with auto-generation get exactly one fresh unique code; rules
    /// with a shared code get their single primary coupon created or updated.
    ///
    /// # Errors
    ///
    /// `Validation` for unusable requests, `NotFound` when the rule is
    /// absent, `Conflict` on a duplicate explicit code.
    #[instrument(skip(self, discount), fields(rule_id = discount.rule_id))]
    pub async fn create_discount(&self, discount: &Discount) -> Result<Discount, ApiError> {
        let errors = discount.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let rule = self
            .rules
            .rule(RuleId::new(discount.rule_id))
            .await
            .map_err(|e| ApiError::from_platform(e, "load price rule"))?;
        if rule.coupon_type == CouponType::NoCoupon {
            return Err(ApiError::Validation(vec![format!(
                "cannot add a coupon to a rule with coupon type {}",
                rule.coupon_type.as_str()
            )]));
        }
        let rule_id = rule
            .id
            .ok_or_else(|| ApiError::Internal("loaded rule has no id".to_string()))?;

        if rule.use_auto_generation {
            return self.generate_unique_coupon(&rule, rule_id, &discount.code).await;
        }

        if discount.code.trim().is_empty() {
            return Err(ApiError::Validation(vec![
                "coupon code cannot be empty".to_string(),
            ]));
        }

        let existing = self
            .coupons
            .primary_coupon(rule_id)
            .await
            .map_err(|e| ApiError::from_platform(e, "look up primary coupon"))?;

        if let Some(mut primary) = existing {
            // Only one coupon can be primary. Update the code if needed and
            // return the same coupon.
            if primary.code != discount.code {
                primary.code = discount.code.clone();
                primary.usage_per_customer = rule.uses_per_customer;
                primary.usage_limit = rule.uses_per_coupon;
                primary = self
                    .coupons
                    .save_coupon(primary)
                    .await
                    .map_err(|e| Self::coupon_save_error(e, &discount.code))?;
            }
            return Ok(Discount {
                rule_id: rule_id.as_i32(),
                code: primary.code,
            });
        }

        let created = self
            .coupons
            .save_coupon(Coupon {
                id: None,
                rule_id,
                code: discount.code.clone(),
                kind: CouponKind::Manual,
                is_primary: true,
                usage_limit: rule.uses_per_coupon,
                usage_per_customer: rule.uses_per_customer,
                times_used: 0,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| Self::coupon_save_error(e, &discount.code))?;
        Ok(Discount {
            rule_id: rule_id.as_i32(),
            code: created.code,
        })
    }

    /// Issue one freshly generated code, retrying on the rare collision.
    async fn generate_unique_coupon(
        &self,
        rule: &SalesRule,
        rule_id: RuleId,
        prefix: &str,
    ) -> Result<Discount, ApiError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(prefix);
            let result = self
                .coupons
                .save_coupon(Coupon {
                    id: None,
                    rule_id,
                    code,
                    kind: CouponKind::Generated,
                    is_primary: false,
                    usage_limit: rule.uses_per_coupon,
                    usage_per_customer: rule.uses_per_customer,
                    times_used: 0,
                    created_at: Utc::now(),
                })
                .await;
            match result {
                Ok(saved) => {
                    return Ok(Discount {
                        rule_id: rule_id.as_i32(),
                        code: saved.code,
                    });
                }
                Err(PlatformError::AlreadyExists(_)) => {
                    tracing::warn!(rule_id = %rule_id, "Generated coupon code collided, retrying");
                }
                Err(e) => return Err(ApiError::from_platform(e, "save generated coupon")),
            }
        }
        tracing::warn!(rule_id = %rule_id, "No discount code was generated");
        Err(ApiError::Internal(
            "could not generate discount codes".to_string(),
        ))
    }

    fn coupon_save_error(err: PlatformError, code: &str) -> ApiError {
        match err {
            PlatformError::AlreadyExists(_) => {
                tracing::error!(code, "Duplicate coupon code");
                ApiError::Conflict(format!("duplicate coupon code {code}"))
            }
            other => ApiError::from_platform(other, "save coupon"),
        }
    }

    /// Copy the flat DTO fields onto the host rule.
    fn apply_fields(host: &mut SalesRule, rule: &PriceRule, update_mode: bool) {
        host.name = rule.name.clone();
        host.uses_per_coupon = rule.total_limit;
        host.uses_per_customer = rule.per_customer_limit;
        // A unique coupon code is generated per redemption when set.
        host.use_auto_generation = rule.is_unique;
        host.sort_order = rule.priority;
        host.stop_rules_processing = rule.discard_subsequent_rules;
        host.apply_to_shipping = rule.apply_to_shipping;
        host.discount_qty = rule.max_quantity;
        host.discount_amount = rule.value;
        host.simple_free_shipping = FreeShippingMode::None;
        host.coupon_type = CouponType::Specific;

        Self::apply_date(&rule.start_date, &mut host.from_date, update_mode);
        Self::apply_date(&rule.expiration_date, &mut host.to_date, update_mode);

        match rule.rule_type {
            Some(PriceRuleType::FixedPerItem) => host.simple_action = SimpleAction::ByFixed,
            Some(PriceRuleType::FixedCartTotal) => host.simple_action = SimpleAction::CartFixed,
            Some(PriceRuleType::Percentage) => host.simple_action = SimpleAction::ByPercent,
            Some(PriceRuleType::FreeShipping) => {
                // The host has no dedicated free-shipping action; it reuses
                // the percentage action with the shipping flags below.
                host.simple_action = SimpleAction::ByPercent;
                host.apply_to_shipping = true;
                host.simple_free_shipping = if rule.free_shipping_to_matching_items_only {
                    FreeShippingMode::MatchingItemsOnly
                } else {
                    FreeShippingMode::CartWithMatchingItems
                };
                host.discount_amount = Decimal::ZERO;
            }
            Some(PriceRuleType::BuyXGetY) => {
                host.apply_to_shipping = false;
                host.simple_action = SimpleAction::BuyXGetY;
                // discount_amount (rule value) = Y, discount_step = X
                host.discount_step = rule.buy_x_quantity;
            }
            // validate() has already rejected a missing type.
            None => {}
        }
    }

    /// Dates are only set when non-empty and not the empty-datetime marker;
    /// an explicitly empty date clears the stored value in update mode.
    fn apply_date(
        raw: &str,
        target: &mut Option<chrono::DateTime<Utc>>,
        update_mode: bool,
    ) {
        if raw.trim().is_empty() {
            if update_mode {
                *target = None;
            }
            return;
        }
        if let Some(dt) = parse_utc(raw)
            && !is_empty_sentinel(&dt)
        {
            *target = Some(dt);
        }
    }

    /// Build the cart-side and target-side condition trees.
    async fn build_conditions(
        &self,
        host: &mut SalesRule,
        rule: &PriceRule,
        update_mode: bool,
    ) -> Result<(), ApiError> {
        let mut rule_conditions = Vec::new();
        if rule.min_purchase_amount > Decimal::ZERO {
            rule_conditions.push(Condition::MinSubtotal {
                amount: rule.min_purchase_amount,
            });
        }
        if rule.min_quantity > Decimal::ZERO {
            rule_conditions.push(Condition::MinQuantity {
                quantity: rule.min_quantity,
            });
        }

        // Categories and products are mutually exclusive per side; validate()
        // has already enforced that.
        if !rule.rule_categories.is_empty()
            && let Some(condition) = self.category_condition(&rule.rule_categories).await?
        {
            rule_conditions.push(condition);
        }
        if !rule.rule_products.is_empty()
            && let Some(condition) = self.product_condition(&rule.rule_products).await?
        {
            rule_conditions.push(condition);
        }

        let mut action_conditions = Vec::new();
        if !rule.action_categories.is_empty()
            && let Some(condition) = self.category_condition(&rule.action_categories).await?
        {
            action_conditions.push(condition);
        }
        if !rule.action_products.is_empty()
            && let Some(condition) = self.product_condition(&rule.action_products).await?
        {
            action_conditions.push(condition);
        }

        host.condition = if rule_conditions.is_empty() {
            if update_mode {
                Some(Condition::empty())
            } else {
                None
            }
        } else {
            Some(Condition::all(rule_conditions))
        };
        host.action_condition = if action_conditions.is_empty() {
            if update_mode {
                Some(Condition::empty())
            } else {
                None
            }
        } else {
            Some(Condition::all(action_conditions))
        };
        Ok(())
    }

    /// Membership condition over the categories that actually exist.
    /// Unknown ids are logged and skipped.
    async fn category_condition(
        &self,
        category_ids: &[storelink_core::CategoryId],
    ) -> Result<Option<Condition>, ApiError> {
        let mut valid = Vec::new();
        for &category_id in category_ids {
            let exists = self
                .catalog
                .category_exists(category_id)
                .await
                .map_err(|e| ApiError::from_platform(e, "look up category"))?;
            if exists {
                valid.push(category_id);
            } else {
                tracing::warn!(%category_id, "Product category was not found");
            }
        }
        if valid.is_empty() {
            return Ok(None);
        }
        Ok(Some(Condition::CategoryFound { categories: valid }))
    }

    /// Membership condition over the SKUs resolved from product ids.
    /// Partial resolution is logged, not fatal.
    async fn product_condition(
        &self,
        product_ids: &[storelink_core::ProductId],
    ) -> Result<Option<Condition>, ApiError> {
        let skus = self
            .catalog
            .skus_for_products(product_ids)
            .await
            .map_err(|e| ApiError::from_platform(e, "look up products"))?;
        if skus.len() != product_ids.len() {
            tracing::warn!(
                requested = product_ids.len(),
                found = skus.len(),
                "Some products were not found for the price rule"
            );
        }
        if skus.is_empty() {
            return Ok(None);
        }
        Ok(Some(Condition::SkuFound { skus }))
    }
}

/// One alphanumeric coupon code of [`GENERATED_CODE_LENGTH`], after the
/// optional caller-supplied prefix.
fn generate_code(prefix: &str) -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(prefix.len() + GENERATED_CODE_LENGTH);
    code.push_str(prefix);
    for _ in 0..GENERATED_CODE_LENGTH {
        let index = rng.random_range(0..CODE_ALPHABET.len());
        code.push(char::from(CODE_ALPHABET[index]));
    }
    code
}
