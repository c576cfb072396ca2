//! Coupon (discount) DTO.

use serde::{Deserialize, Serialize};

/// Coupon issuance request and response.
///
/// On the way in, `code` is the requested shared code (or an optional prefix
/// when the rule auto-generates codes). On the way out it carries the code
/// that was issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discount {
    pub rule_id: i32,
    pub code: String,
}

impl Discount {
    /// Validate the DTO. An empty list means the request is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.rule_id <= 0 {
            errors.push("rule_id must be positive".to_string());
        }
        errors
    }
}
