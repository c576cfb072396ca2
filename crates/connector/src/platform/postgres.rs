//! Postgres platform adapter.
//!
//! Runtime-checked sqlx queries over a connection pool. Unique-constraint
//! violations (duplicate coupon code, second primary coupon) surface as
//! [`PlatformError::AlreadyExists`].

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use storelink_core::{
    CategoryId, CouponId, CustomerGroupId, ProductId, RuleId, ScopeType, StoreId, WebsiteId,
};

use super::{
    Catalog, Condition, ConfigReader, Coupon, CouponStore, PlatformError, RuleStore, SalesRule,
    Store, StoreDirectory, Website,
};

/// sqlx-backed platform adapter.
#[derive(Debug, Clone)]
pub struct PostgresPlatform {
    pool: PgPool,
}

impl PostgresPlatform {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, PlatformError> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| PlatformError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }
}

fn parse_enum<T: std::str::FromStr<Err = String>>(value: String) -> Result<T, PlatformError> {
    value.parse().map_err(PlatformError::Storage)
}

fn condition_from_json(value: Option<serde_json::Value>) -> Result<Option<Condition>, PlatformError> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| PlatformError::Storage(e.to_string()))
}

fn condition_to_json(value: Option<&Condition>) -> Result<Option<serde_json::Value>, PlatformError> {
    value
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| PlatformError::Storage(e.to_string()))
}

fn rule_from_row(row: &PgRow) -> Result<SalesRule, PlatformError> {
    Ok(SalesRule {
        id: Some(row.try_get::<RuleId, _>("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        website_ids: row
            .try_get::<Vec<i32>, _>("website_ids")?
            .into_iter()
            .map(WebsiteId::new)
            .collect(),
        customer_group_ids: row
            .try_get::<Vec<i32>, _>("customer_group_ids")?
            .into_iter()
            .map(CustomerGroupId::new)
            .collect(),
        coupon_type: parse_enum(row.try_get("coupon_type")?)?,
        use_auto_generation: row.try_get("use_auto_generation")?,
        uses_per_coupon: row.try_get("uses_per_coupon")?,
        uses_per_customer: row.try_get("uses_per_customer")?,
        sort_order: row.try_get("sort_order")?,
        stop_rules_processing: row.try_get("stop_rules_processing")?,
        apply_to_shipping: row.try_get("apply_to_shipping")?,
        discount_amount: row.try_get("discount_amount")?,
        discount_qty: row.try_get("discount_qty")?,
        discount_step: row.try_get("discount_step")?,
        simple_action: parse_enum(row.try_get("simple_action")?)?,
        simple_free_shipping: parse_enum(row.try_get("simple_free_shipping")?)?,
        from_date: row.try_get("from_date")?,
        to_date: row.try_get("to_date")?,
        condition: condition_from_json(row.try_get("condition")?)?,
        action_condition: condition_from_json(row.try_get("action_condition")?)?,
    })
}

fn coupon_from_row(row: &PgRow) -> Result<Coupon, PlatformError> {
    Ok(Coupon {
        id: Some(row.try_get::<CouponId, _>("id")?),
        rule_id: row.try_get("rule_id")?,
        code: row.try_get("code")?,
        kind: parse_enum(row.try_get("kind")?)?,
        is_primary: row.try_get("is_primary")?,
        usage_limit: row.try_get("usage_limit")?,
        usage_per_customer: row.try_get("usage_per_customer")?,
        times_used: row.try_get("times_used")?,
        created_at: row.try_get("created_at")?,
    })
}

fn website_from_row(row: &PgRow) -> Result<Website, PlatformError> {
    Ok(Website {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        base_url: row.try_get("base_url")?,
    })
}

fn store_from_row(row: &PgRow) -> Result<Store, PlatformError> {
    Ok(Store {
        id: row.try_get("id")?,
        website_id: row.try_get("website_id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        base_url: row.try_get("base_url")?,
    })
}

#[async_trait]
impl RuleStore for PostgresPlatform {
    async fn save_rule(&self, rule: SalesRule) -> Result<SalesRule, PlatformError> {
        let website_ids: Vec<i32> = rule.website_ids.iter().map(|id| id.as_i32()).collect();
        let group_ids: Vec<i32> = rule
            .customer_group_ids
            .iter()
            .map(|id| id.as_i32())
            .collect();
        let condition = condition_to_json(rule.condition.as_ref())?;
        let action_condition = condition_to_json(rule.action_condition.as_ref())?;

        let row = if let Some(id) = rule.id {
            sqlx::query(
                r"
                UPDATE sales_rules SET
                    name = $2, description = $3, is_active = $4, website_ids = $5,
                    customer_group_ids = $6, coupon_type = $7, use_auto_generation = $8,
                    uses_per_coupon = $9, uses_per_customer = $10, sort_order = $11,
                    stop_rules_processing = $12, apply_to_shipping = $13,
                    discount_amount = $14, discount_qty = $15, discount_step = $16,
                    simple_action = $17, simple_free_shipping = $18,
                    from_date = $19, to_date = $20,
                    condition = $21, action_condition = $22,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id
                ",
            )
            .bind(id)
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.is_active)
            .bind(&website_ids)
            .bind(&group_ids)
            .bind(rule.coupon_type.as_str())
            .bind(rule.use_auto_generation)
            .bind(rule.uses_per_coupon)
            .bind(rule.uses_per_customer)
            .bind(rule.sort_order)
            .bind(rule.stop_rules_processing)
            .bind(rule.apply_to_shipping)
            .bind(rule.discount_amount)
            .bind(rule.discount_qty)
            .bind(rule.discount_step)
            .bind(rule.simple_action.as_str())
            .bind(rule.simple_free_shipping.as_str())
            .bind(rule.from_date)
            .bind(rule.to_date)
            .bind(condition)
            .bind(action_condition)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("rule {id}")))?
        } else {
            sqlx::query(
                r"
                INSERT INTO sales_rules (
                    name, description, is_active, website_ids, customer_group_ids,
                    coupon_type, use_auto_generation, uses_per_coupon, uses_per_customer,
                    sort_order, stop_rules_processing, apply_to_shipping,
                    discount_amount, discount_qty, discount_step,
                    simple_action, simple_free_shipping, from_date, to_date,
                    condition, action_condition
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
                )
                RETURNING id
                ",
            )
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.is_active)
            .bind(&website_ids)
            .bind(&group_ids)
            .bind(rule.coupon_type.as_str())
            .bind(rule.use_auto_generation)
            .bind(rule.uses_per_coupon)
            .bind(rule.uses_per_customer)
            .bind(rule.sort_order)
            .bind(rule.stop_rules_processing)
            .bind(rule.apply_to_shipping)
            .bind(rule.discount_amount)
            .bind(rule.discount_qty)
            .bind(rule.discount_step)
            .bind(rule.simple_action.as_str())
            .bind(rule.simple_free_shipping.as_str())
            .bind(rule.from_date)
            .bind(rule.to_date)
            .bind(condition)
            .bind(action_condition)
            .fetch_one(&self.pool)
            .await?
        };

        let mut saved = rule;
        saved.id = Some(row.try_get("id")?);
        Ok(saved)
    }

    async fn rule(&self, id: RuleId) -> Result<SalesRule, PlatformError> {
        let row = sqlx::query("SELECT * FROM sales_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("rule {id}")))?;
        rule_from_row(&row)
    }

    async fn delete_rule(&self, id: RuleId) -> Result<(), PlatformError> {
        sqlx::query("DELETE FROM sales_rules WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| PlatformError::NotFound(format!("rule {id}")))
    }
}

#[async_trait]
impl CouponStore for PostgresPlatform {
    async fn save_coupon(&self, coupon: Coupon) -> Result<Coupon, PlatformError> {
        let row = if let Some(id) = coupon.id {
            sqlx::query(
                r"
                UPDATE coupons SET
                    rule_id = $2, code = $3, kind = $4, is_primary = $5,
                    usage_limit = $6, usage_per_customer = $7, times_used = $8
                WHERE id = $1
                RETURNING id
                ",
            )
            .bind(id)
            .bind(coupon.rule_id)
            .bind(&coupon.code)
            .bind(coupon.kind.as_str())
            .bind(coupon.is_primary)
            .bind(coupon.usage_limit)
            .bind(coupon.usage_per_customer)
            .bind(coupon.times_used)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("coupon {id}")))?
        } else {
            sqlx::query(
                r"
                INSERT INTO coupons (
                    rule_id, code, kind, is_primary,
                    usage_limit, usage_per_customer, times_used, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                ",
            )
            .bind(coupon.rule_id)
            .bind(&coupon.code)
            .bind(coupon.kind.as_str())
            .bind(coupon.is_primary)
            .bind(coupon.usage_limit)
            .bind(coupon.usage_per_customer)
            .bind(coupon.times_used)
            .bind(coupon.created_at)
            .fetch_one(&self.pool)
            .await?
        };

        let mut saved = coupon;
        saved.id = Some(row.try_get("id")?);
        Ok(saved)
    }

    async fn primary_coupon(&self, rule_id: RuleId) -> Result<Option<Coupon>, PlatformError> {
        sqlx::query("SELECT * FROM coupons WHERE rule_id = $1 AND is_primary")
            .bind(rule_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| coupon_from_row(&row))
            .transpose()
    }
}

#[async_trait]
impl Catalog for PostgresPlatform {
    async fn category_exists(&self, id: CategoryId) -> Result<bool, PlatformError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn skus_for_products(&self, ids: &[ProductId]) -> Result<Vec<String>, PlatformError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let skus: Vec<String> =
            sqlx::query_scalar("SELECT sku FROM products WHERE id = ANY($1) ORDER BY id")
                .bind(&raw)
                .fetch_all(&self.pool)
                .await?;
        Ok(skus)
    }
}

#[async_trait]
impl StoreDirectory for PostgresPlatform {
    async fn websites(&self) -> Result<Vec<Website>, PlatformError> {
        sqlx::query("SELECT * FROM websites ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(website_from_row)
            .collect()
    }

    async fn stores(&self) -> Result<Vec<Store>, PlatformError> {
        sqlx::query("SELECT * FROM stores ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(store_from_row)
            .collect()
    }

    async fn website(&self, id: WebsiteId) -> Result<Website, PlatformError> {
        let row = sqlx::query("SELECT * FROM websites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("website {id}")))?;
        website_from_row(&row)
    }

    async fn store(&self, id: StoreId) -> Result<Store, PlatformError> {
        let row = sqlx::query("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("store {id}")))?;
        store_from_row(&row)
    }

    async fn customer_group_ids(&self) -> Result<Vec<CustomerGroupId>, PlatformError> {
        let ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM customer_groups ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(CustomerGroupId::new).collect())
    }
}

#[async_trait]
impl ConfigReader for PostgresPlatform {
    async fn api_key(&self, scope_type: ScopeType, scope_id: i32) -> Result<String, PlatformError> {
        let key: Option<String> = sqlx::query_scalar(
            "SELECT api_key FROM scope_settings WHERE scope_type = $1 AND scope_id = $2",
        )
        .bind(scope_type.as_str())
        .bind(scope_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key.unwrap_or_default())
    }

    async fn is_active(&self, scope_type: ScopeType, scope_id: i32) -> Result<bool, PlatformError> {
        let active: Option<bool> = sqlx::query_scalar(
            "SELECT is_active FROM scope_settings WHERE scope_type = $1 AND scope_id = $2",
        )
        .bind(scope_type.as_str())
        .bind(scope_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active.unwrap_or(false))
    }
}
