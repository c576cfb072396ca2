//! Host platform entities the connector maps onto.
//!
//! These mirror the commerce platform's sales-rule vocabulary: a rule with a
//! simple action, optional condition trees, and coupons attached to it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storelink_core::{CategoryId, CouponId, CustomerGroupId, RuleId, StoreId, WebsiteId};

/// How coupons attach to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    /// Rule applies without any coupon.
    #[default]
    NoCoupon,
    /// Rule is redeemed through a specific (or generated) coupon code.
    Specific,
    /// Rule auto-applies a coupon.
    Auto,
}

impl CouponType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCoupon => "none",
            Self::Specific => "specific",
            Self::Auto => "auto",
        }
    }
}

impl std::str::FromStr for CouponType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::NoCoupon),
            "specific" => Ok(Self::Specific),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown coupon type: {other}")),
        }
    }
}

/// The host platform's discount action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleAction {
    /// Percentage of product price discount.
    #[default]
    ByPercent,
    /// Fixed amount discount per item.
    ByFixed,
    /// Fixed amount discount for the whole cart.
    CartFixed,
    /// Buy X get Y free (amount carries Y, step carries X).
    BuyXGetY,
}

impl SimpleAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ByPercent => "by_percent",
            Self::ByFixed => "by_fixed",
            Self::CartFixed => "cart_fixed",
            Self::BuyXGetY => "buy_x_get_y",
        }
    }
}

impl std::str::FromStr for SimpleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_percent" => Ok(Self::ByPercent),
            "by_fixed" => Ok(Self::ByFixed),
            "cart_fixed" => Ok(Self::CartFixed),
            "buy_x_get_y" => Ok(Self::BuyXGetY),
            other => Err(format!("unknown simple action: {other}")),
        }
    }
}

/// Free-shipping behaviour of a rule.
///
/// The host stores this as a numeric column next to the action; it is kept
/// as a separate enum here rather than a distinct action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeShippingMode {
    /// No free shipping.
    #[default]
    None,
    /// Free shipping for matching items only.
    MatchingItemsOnly,
    /// Free shipping for the whole cart when it contains matching items.
    CartWithMatchingItems,
}

impl FreeShippingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MatchingItemsOnly => "matching_items",
            Self::CartWithMatchingItems => "cart_with_matching_items",
        }
    }
}

impl std::str::FromStr for FreeShippingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "matching_items" => Ok(Self::MatchingItemsOnly),
            "cart_with_matching_items" => Ok(Self::CartWithMatchingItems),
            other => Err(format!("unknown free shipping mode: {other}")),
        }
    }
}

/// A node in a rule's condition tree.
///
/// Closed set of condition kinds; combinators aggregate with ALL semantics.
/// Serialized as tagged JSON when persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// ALL-aggregator over child conditions.
    All { children: Vec<Condition> },
    /// Cart subtotal must be at least `amount`.
    MinSubtotal { amount: Decimal },
    /// Total item quantity must be at least `quantity`.
    MinQuantity { quantity: Decimal },
    /// An item from one of these categories must be in the cart.
    CategoryFound { categories: Vec<CategoryId> },
    /// An item with one of these SKUs must be in the cart.
    SkuFound { skus: Vec<String> },
}

impl Condition {
    /// Wrap children in an ALL combinator.
    #[must_use]
    pub const fn all(children: Vec<Self>) -> Self {
        Self::All { children }
    }

    /// An empty combinator, used to clear previously stored conditions.
    #[must_use]
    pub const fn empty() -> Self {
        Self::All {
            children: Vec::new(),
        }
    }
}

/// A cart price rule as the host platform persists it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesRule {
    /// Assigned on save; `None` for a rule not yet persisted.
    pub id: Option<RuleId>,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub website_ids: Vec<WebsiteId>,
    pub customer_group_ids: Vec<CustomerGroupId>,
    pub coupon_type: CouponType,
    pub use_auto_generation: bool,
    pub uses_per_coupon: i32,
    pub uses_per_customer: i32,
    pub sort_order: i32,
    pub stop_rules_processing: bool,
    pub apply_to_shipping: bool,
    pub discount_amount: Decimal,
    pub discount_qty: Decimal,
    pub discount_step: i32,
    pub simple_action: SimpleAction,
    pub simple_free_shipping: FreeShippingMode,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub condition: Option<Condition>,
    pub action_condition: Option<Condition>,
}

/// A coupon attached to a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Assigned on save; `None` for a coupon not yet persisted.
    pub id: Option<CouponId>,
    pub rule_id: RuleId,
    pub code: String,
    pub kind: CouponKind,
    /// The single shared, editable coupon representing the rule.
    pub is_primary: bool,
    pub usage_limit: i32,
    pub usage_per_customer: i32,
    pub times_used: i32,
    pub created_at: DateTime<Utc>,
}

/// How a coupon code came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Code supplied by the caller.
    Manual,
    /// Code issued by the generator.
    Generated,
}

impl CouponKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Generated => "generated",
        }
    }
}

impl std::str::FromStr for CouponKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "generated" => Ok(Self::Generated),
            other => Err(format!("unknown coupon kind: {other}")),
        }
    }
}

/// A website in the store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Website {
    pub id: WebsiteId,
    pub code: String,
    pub name: String,
    pub base_url: String,
}

/// A store in the store directory, owned by a website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: StoreId,
    pub website_id: WebsiteId,
    pub code: String,
    pub name: String,
    pub base_url: String,
}
