//! Hierarchical configuration scope returned by the scope resolver.

use serde::{Deserialize, Serialize};
use storelink_core::{ScopeType, StoreId};

/// A configuration boundary (website or store) and its connection state.
///
/// A store scope always carries its parent website scope; a website scope has
/// no parent. The default value is the "empty scope" handed back when
/// resolution fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigScope {
    pub id: i32,
    pub scope_type: ScopeType,
    pub name: String,
    pub code: String,
    pub base_url: String,
    pub website_id: i32,
    /// Stores covered by this scope: the website's stores, or the store itself.
    pub store_ids: Vec<StoreId>,
    pub parent: Option<Box<ConfigScope>>,
    /// Whether the connector is enabled at this scope. Does not affect the
    /// connection rules below.
    pub is_active: bool,
    /// True only when this scope opted in with its own API key, not merely
    /// by inheriting the parent's.
    pub is_explicitly_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_scope() {
        let scope = ConfigScope::default();
        assert_eq!(scope.id, 0);
        assert_eq!(scope.scope_type, ScopeType::Website);
        assert!(!scope.is_explicitly_connected);
        assert!(scope.parent.is_none());
    }

    #[test]
    fn test_scope_json_shape() {
        let scope = ConfigScope {
            id: 2,
            scope_type: ScopeType::Store,
            name: "DE Store".to_string(),
            code: "de".to_string(),
            base_url: "https://de.example.com/".to_string(),
            website_id: 1,
            store_ids: vec![StoreId::new(2)],
            parent: Some(Box::new(ConfigScope {
                id: 1,
                name: "Main".to_string(),
                ..ConfigScope::default()
            })),
            is_active: true,
            is_explicitly_connected: true,
        };
        let json = serde_json::to_value(&scope).expect("serialize");
        assert_eq!(json["scope_type"], "store");
        assert_eq!(json["parent"]["id"], 1);
        assert_eq!(json["store_ids"][0], 2);
    }
}
