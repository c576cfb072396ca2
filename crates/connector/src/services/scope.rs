//! Configuration-scope resolution.
//!
//! Builds hierarchical [`ConfigScope`] values from the host's store
//! directory and per-scope settings. A scope counts as connected only when
//! it opted in with its own API key, not when it merely inherits one.

use std::sync::Arc;

use storelink_core::{ScopeType, StoreId, WebsiteId};
use tracing::instrument;

use crate::models::ConfigScope;
use crate::platform::{ConfigReader, PlatformError, StoreDirectory};

/// Resolves configuration scopes against the store directory.
pub struct ScopeResolver {
    directory: Arc<dyn StoreDirectory>,
    config: Arc<dyn ConfigReader>,
}

impl ScopeResolver {
    pub fn new(directory: Arc<dyn StoreDirectory>, config: Arc<dyn ConfigReader>) -> Self {
        Self { directory, config }
    }

    /// Every website and store scope that is explicitly connected.
    ///
    /// Failures while building an individual scope are logged and the scope
    /// skipped; the enumeration itself never fails.
    #[instrument(skip(self))]
    pub async fn active_scopes(&self) -> Vec<ConfigScope> {
        let mut result = Vec::new();

        match self.directory.websites().await {
            Ok(websites) => {
                for website in websites {
                    match self.website_scope(website.id).await {
                        Ok(scope) if scope.is_explicitly_connected => result.push(scope),
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(
                                website_id = %website.id,
                                error = %e,
                                "Failed to initialise website scope"
                            );
                        }
                    }
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to list websites"),
        }

        match self.directory.stores().await {
            Ok(stores) => {
                for store in stores {
                    match self.store_scope(store.id).await {
                        Ok(scope) if scope.is_explicitly_connected => result.push(scope),
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(
                                store_id = %store.id,
                                error = %e,
                                "Failed to initialise store scope"
                            );
                        }
                    }
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to list stores"),
        }

        result
    }

    /// Fully populate a scope of the given type.
    ///
    /// # Errors
    ///
    /// Propagates [`PlatformError::NotFound`] for unknown websites/stores.
    pub async fn initialise_scope(
        &self,
        scope_type: ScopeType,
        id: i32,
    ) -> Result<ConfigScope, PlatformError> {
        match scope_type {
            ScopeType::Website => self.website_scope(WebsiteId::new(id)).await,
            ScopeType::Store => self.store_scope(StoreId::new(id)).await,
        }
    }

    /// Resolve the scope an inbound request refers to, preferring the
    /// website id when both are present. Any failure yields the empty scope.
    #[instrument(skip(self))]
    pub async fn current_scope(
        &self,
        website_id: Option<i32>,
        store_id: Option<i32>,
    ) -> ConfigScope {
        let result = match (website_id, store_id) {
            (Some(id), _) => self.initialise_scope(ScopeType::Website, id).await,
            (None, Some(id)) => self.initialise_scope(ScopeType::Store, id).await,
            (None, None) => return ConfigScope::default(),
        };
        match result {
            Ok(scope) => scope,
            Err(e) => {
                tracing::error!(error = %e, "Failed to get current configuration scope");
                ConfigScope::default()
            }
        }
    }

    async fn website_scope(&self, id: WebsiteId) -> Result<ConfigScope, PlatformError> {
        let website = self.directory.website(id).await?;
        let api_key = self.config.api_key(ScopeType::Website, id.as_i32()).await?;
        let is_active = self.config.is_active(ScopeType::Website, id.as_i32()).await?;
        let store_ids = self
            .directory
            .stores()
            .await?
            .into_iter()
            .filter(|store| store.website_id == id)
            .map(|store| store.id)
            .collect();

        Ok(ConfigScope {
            id: id.as_i32(),
            scope_type: ScopeType::Website,
            name: website.name,
            code: website.code,
            base_url: website.base_url,
            website_id: id.as_i32(),
            store_ids,
            parent: None,
            is_active,
            is_explicitly_connected: !api_key.is_empty(),
        })
    }

    async fn store_scope(&self, id: StoreId) -> Result<ConfigScope, PlatformError> {
        let store = self.directory.store(id).await?;
        let website_id = store.website_id;
        let website_key = self
            .config
            .api_key(ScopeType::Website, website_id.as_i32())
            .await?;
        let store_key = self.config.api_key(ScopeType::Store, id.as_i32()).await?;
        let is_active = self.config.is_active(ScopeType::Store, id.as_i32()).await?;
        let parent = self.website_scope(website_id).await?;

        Ok(ConfigScope {
            id: id.as_i32(),
            scope_type: ScopeType::Store,
            name: store.name,
            code: store.code,
            base_url: store.base_url,
            website_id: website_id.as_i32(),
            store_ids: vec![id],
            parent: Some(Box::new(parent)),
            is_active,
            is_explicitly_connected: !store_key.is_empty() && store_key != website_key,
        })
    }
}
