//! Generation Result Store
//!
//! The persisted result collection owned by the engine. One document per satisfied slot,
//! unique on `(category_id, dimension, price_band)`.

pub mod persistence;

pub use persistence::SledResultStore;

use crate::error::StorageError;
use crate::slot::Slot;
use crate::taxonomy::Region;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Price band snapshot stored with a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeSnapshot {
    pub name: String,
    pub min: f64,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub value: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub brand: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub summary: String,
    pub detailed: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Generation provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiGenerated {
    pub is_generated: bool,
    pub provider: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// Persisted answer for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Hex-encoded BLAKE3 digest of the slot key
    pub id: String,
    pub category_id: CategoryId,
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub dimension: String,
    pub price_range: PriceRangeSnapshot,
    pub product: Product,
    pub recommendation: Recommendation,
    pub region: Region,
    pub ai_generated: AiGenerated,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationResult {
    pub fn slot(&self) -> Slot {
        Slot::new(
            self.category_id.clone(),
            self.dimension.clone(),
            self.price_range.name.clone(),
        )
    }
}

/// Outcome of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A result for the same slot key already exists.
    Duplicate,
}

/// Result collection interface
pub trait ResultStore: Send + Sync {
    /// `(dimension, price_band)` pairs already satisfied for one category.
    fn satisfied_slots(
        &self,
        category_id: &CategoryId,
    ) -> Result<HashSet<(String, String)>, StorageError>;

    /// Insert a result unless its slot key is already present. Atomic per key.
    fn insert_if_absent(&self, result: &GenerationResult) -> Result<InsertOutcome, StorageError>;

    fn get(&self, slot: &Slot) -> Result<Option<GenerationResult>, StorageError>;

    /// Total number of stored results.
    fn count(&self) -> Result<usize, StorageError>;
}
