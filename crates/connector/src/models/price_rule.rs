//! Price-rule DTO as the marketing service describes it.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storelink_core::{CategoryId, PriceRuleType, ProductId, RuleId};

/// Maximum percentage a percentage-type rule can carry.
const MAX_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// A flat price-rule description from the marketing service.
///
/// All fields are optional on the wire; [`PriceRule::validate`] reports every
/// problem at once so the caller can fix the payload in one round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceRule {
    pub name: String,
    pub description: String,
    /// Discount shape. Required; unknown values are rejected during decoding.
    #[serde(rename = "type")]
    pub rule_type: Option<PriceRuleType>,
    /// Discount value. For buy-x-get-y this carries Y.
    pub value: Decimal,
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS`; empty means unset.
    pub start_date: String,
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS`; empty means unset.
    pub expiration_date: String,
    /// Total redemptions allowed per coupon. Zero means unlimited.
    pub total_limit: i32,
    /// Redemptions allowed per customer. Zero means unlimited.
    pub per_customer_limit: i32,
    pub priority: i32,
    /// When true the host generates a unique coupon code per redemption.
    pub is_unique: bool,
    pub discard_subsequent_rules: bool,
    pub apply_to_shipping: bool,
    pub free_shipping_to_matching_items_only: bool,
    /// Maximum quantity the discount applies to.
    pub max_quantity: Decimal,
    /// X of buy-x-get-y.
    pub buy_x_quantity: i32,
    pub min_purchase_amount: Decimal,
    pub min_quantity: Decimal,
    /// Cart-side category conditions. Mutually exclusive with `rule_products`.
    pub rule_categories: Vec<CategoryId>,
    /// Cart-side product conditions. Mutually exclusive with `rule_categories`.
    pub rule_products: Vec<ProductId>,
    /// Target-side category conditions. Mutually exclusive with `action_products`.
    pub action_categories: Vec<CategoryId>,
    /// Target-side product conditions. Mutually exclusive with `action_categories`.
    pub action_products: Vec<ProductId>,
    pub website_id: i32,
}

impl PriceRule {
    /// Validate the DTO. An empty list means the rule is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        match self.rule_type {
            None => errors.push("type is required".to_string()),
            Some(PriceRuleType::Percentage | PriceRuleType::FreeShipping)
                if self.value > MAX_PERCENTAGE =>
            {
                errors.push("percentage value cannot exceed 100".to_string());
            }
            Some(PriceRuleType::BuyXGetY) if self.buy_x_quantity <= 0 => {
                errors.push("buy-x-get-y requires a positive buy_x_quantity".to_string());
            }
            Some(_) => {}
        }
        if self.value < Decimal::ZERO {
            errors.push("value cannot be negative".to_string());
        }
        if self.website_id <= 0 {
            errors.push("website_id must be positive".to_string());
        }
        if self.total_limit < 0 {
            errors.push("total_limit cannot be negative".to_string());
        }
        if self.per_customer_limit < 0 {
            errors.push("per_customer_limit cannot be negative".to_string());
        }
        if self.max_quantity < Decimal::ZERO {
            errors.push("max_quantity cannot be negative".to_string());
        }
        if self.min_purchase_amount < Decimal::ZERO {
            errors.push("min_purchase_amount cannot be negative".to_string());
        }
        if self.min_quantity < Decimal::ZERO {
            errors.push("min_quantity cannot be negative".to_string());
        }
        if !self.rule_categories.is_empty() && !self.rule_products.is_empty() {
            errors.push("rule categories and rule products are mutually exclusive".to_string());
        }
        if !self.action_categories.is_empty() && !self.action_products.is_empty() {
            errors.push("action categories and action products are mutually exclusive".to_string());
        }
        if !self.start_date.trim().is_empty() && parse_utc(&self.start_date).is_none() {
            errors.push("start_date is not a valid datetime".to_string());
        }
        if !self.expiration_date.trim().is_empty() && parse_utc(&self.expiration_date).is_none() {
            errors.push("expiration_date is not a valid datetime".to_string());
        }

        errors
    }
}

/// Response body for rule create/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRuleResponse {
    pub id: RuleId,
}

/// Parse an incoming datetime in either RFC 3339 or `YYYY-MM-DD HH:MM:SS`
/// form, normalised to UTC. Returns `None` when neither form matches.
#[must_use]
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whether a datetime is the host's "empty" sentinel (`0001-01-01 00:00:00`).
#[must_use]
pub fn is_empty_sentinel(dt: &DateTime<Utc>) -> bool {
    dt.year() == 1 && dt.month() == 1 && dt.day() == 1 && dt.num_seconds_from_midnight() == 0
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn valid_rule() -> PriceRule {
        PriceRule {
            name: "Spring sale".to_string(),
            rule_type: Some(PriceRuleType::Percentage),
            value: dec!(15),
            website_id: 1,
            ..PriceRule::default()
        }
    }

    #[test]
    fn test_valid_rule_passes() {
        assert!(valid_rule().validate().is_empty());
    }

    #[test]
    fn test_missing_name_and_type() {
        let rule = PriceRule::default();
        let errors = rule.validate();
        assert!(errors.iter().any(|e| e.contains("name")));
        assert!(errors.iter().any(|e| e.contains("type")));
    }

    #[test]
    fn test_percentage_over_hundred_rejected() {
        let mut rule = valid_rule();
        rule.value = dec!(101);
        assert!(rule
            .validate()
            .iter()
            .any(|e| e.contains("cannot exceed 100")));
    }

    #[test]
    fn test_mutually_exclusive_conditions() {
        let mut rule = valid_rule();
        rule.rule_categories = vec![CategoryId::new(3)];
        rule.rule_products = vec![ProductId::new(7)];
        assert!(rule
            .validate()
            .iter()
            .any(|e| e.contains("mutually exclusive")));

        let mut rule = valid_rule();
        rule.action_categories = vec![CategoryId::new(3)];
        rule.action_products = vec![ProductId::new(7)];
        assert!(rule
            .validate()
            .iter()
            .any(|e| e.contains("mutually exclusive")));
    }

    #[test]
    fn test_buy_x_get_y_requires_step() {
        let mut rule = valid_rule();
        rule.rule_type = Some(PriceRuleType::BuyXGetY);
        rule.value = dec!(1);
        rule.buy_x_quantity = 0;
        assert!(rule.validate().iter().any(|e| e.contains("buy_x_quantity")));
    }

    #[test]
    fn test_bad_date_reported() {
        let mut rule = valid_rule();
        rule.start_date = "tomorrow".to_string();
        assert!(rule.validate().iter().any(|e| e.contains("start_date")));
    }

    #[test]
    fn test_parse_utc_both_formats() {
        let rfc = parse_utc("2024-06-01T10:30:00+02:00").expect("rfc3339");
        assert_eq!(rfc.to_rfc3339(), "2024-06-01T08:30:00+00:00");
        let plain = parse_utc("2024-06-01 08:30:00").expect("naive");
        assert_eq!(rfc, plain);
        assert!(parse_utc("not a date").is_none());
    }

    #[test]
    fn test_empty_sentinel() {
        let sentinel = parse_utc("0001-01-01 00:00:00").expect("parse");
        assert!(is_empty_sentinel(&sentinel));
        let real = parse_utc("2024-06-01 08:30:00").expect("parse");
        assert!(!is_empty_sentinel(&real));
    }
}
