//! Shared fixtures for integration tests

use async_trait::async_trait;
use gapfill::engine::EngineStores;
use gapfill::error::EngineError;
use gapfill::provider::{GenerationClient, ParsedProduct, ParsedResult};
use gapfill::taxonomy::{
    Category, Dimension, Level1, Level2, Level3, MarketRegion, PriceBand,
};
use gapfill::types::CategoryId;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Health > Supplements > Fish Oil with two dimensions and two price bands.
pub fn fish_oil() -> Category {
    Category {
        id: CategoryId::new("fish-oil"),
        level1: Level1 {
            name: "Health".to_string(),
            slug: "health".to_string(),
            icon: None,
            region: MarketRegion::Both,
        },
        level2: Level2 {
            name: "Supplements".to_string(),
            slug: "supplements".to_string(),
            icon: None,
        },
        level3: Level3 {
            name: "Fish Oil".to_string(),
            slug: "fish-oil".to_string(),
            description: None,
            dimensions: vec![Dimension::named("Purity"), Dimension::named("Value")],
            price_ranges: vec![
                PriceBand::new("Budget", 0.0, Some(100.0)),
                PriceBand::new("Premium", 100.0, Some(300.0)),
            ],
        },
    }
}

/// Sled stores in a fresh temporary directory.
pub fn temp_stores() -> (TempDir, EngineStores) {
    let temp_dir = TempDir::new().unwrap();
    let stores = EngineStores::open(&temp_dir.path().join("store")).unwrap();
    (temp_dir, stores)
}

/// Client that returns a fixed product and counts calls.
#[derive(Default)]
pub struct CannedClient {
    calls: AtomicUsize,
}

impl CannedClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for CannedClient {
    async fn generate(&self, _prompt: &str) -> Result<ParsedResult, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ParsedResult {
            product: Some(ParsedProduct {
                name: Some("Omega Pure".to_string()),
                brand: None,
                price: None,
            }),
            recommendation: None,
        })
    }

    fn provider_name(&self) -> &str {
        "canned"
    }

    fn model_name(&self) -> &str {
        "canned-1"
    }
}
