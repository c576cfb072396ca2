//! Price-rule classification as the marketing service describes it.

use serde::{Deserialize, Serialize};

/// Discount type of an incoming price rule.
///
/// These are the shapes the marketing service can express; the connector
/// maps each onto the host platform's simple-action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceRuleType {
    /// Fixed amount off each matching item.
    FixedPerItem,
    /// Fixed amount off the whole cart.
    FixedCartTotal,
    /// Percentage off matching items.
    Percentage,
    /// Free shipping (value is ignored and forced to zero).
    FreeShipping,
    /// Buy X quantity, get Y free. The rule value carries Y.
    BuyXGetY,
}

impl std::fmt::Display for PriceRuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FixedPerItem => "fixed-per-item",
            Self::FixedCartTotal => "fixed-cart-total",
            Self::Percentage => "percentage",
            Self::FreeShipping => "free-shipping",
            Self::BuyXGetY => "buy-x-get-y",
        };
        f.write_str(s)
    }
}
