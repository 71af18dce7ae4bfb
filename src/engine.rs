//! Engine context: the stores and the generation client, built once per process.

use crate::error::{EngineError, StorageError};
use crate::persist::Provenance;
use crate::provider::{DashScopeClient, GenerationClient, ProviderConfig};
use crate::store::{ResultStore, SledResultStore};
use crate::taxonomy::{SledTaxonomyStore, TaxonomySource};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Shared handles passed by reference to the gap detector, persister and scheduler.
#[derive(Clone)]
pub struct EngineContext {
    pub taxonomy: Arc<dyn TaxonomySource>,
    pub results: Arc<dyn ResultStore>,
    pub client: Arc<dyn GenerationClient>,
}

impl EngineContext {
    pub fn new(
        taxonomy: Arc<dyn TaxonomySource>,
        results: Arc<dyn ResultStore>,
        client: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            taxonomy,
            results,
            client,
        }
    }

    /// Build on already opened stores. Taxonomy and results share one database.
    pub fn with_stores(
        stores: &EngineStores,
        provider: ProviderConfig,
    ) -> Result<Self, EngineError> {
        let client = DashScopeClient::new(provider)?;

        info!(
            provider = %client.provider_name(),
            model = %client.model_name(),
            "Engine context ready"
        );

        Ok(Self::new(
            stores.taxonomy.clone(),
            stores.results.clone(),
            Arc::new(client),
        ))
    }

    pub fn provenance(&self) -> Provenance {
        Provenance {
            provider: self.client.provider_name().to_string(),
            model: self.client.model_name().to_string(),
        }
    }
}

/// Concrete sled-backed stores, for commands that need more than the traits expose.
pub struct EngineStores {
    pub taxonomy: Arc<SledTaxonomyStore>,
    pub results: Arc<SledResultStore>,
}

impl EngineStores {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            taxonomy: Arc::new(SledTaxonomyStore::from_db(db.clone())?),
            results: Arc::new(SledResultStore::from_db(db)?),
        })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.taxonomy.flush()?;
        self.results.flush()
    }
}
