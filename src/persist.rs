//! Persister
//!
//! Turns a parsed provider response into a `GenerationResult`, filling every absent
//! field with a default, and stores it exactly once per slot.

use crate::error::EngineError;
use crate::provider::ParsedResult;
use crate::slot::SlotWork;
use crate::store::{
    AiGenerated, GenerationResult, InsertOutcome, Price, PriceRangeSnapshot, Product,
    Recommendation, ResultStore,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_BRAND: &str = "Well-known Brand";
const DEFAULT_DETAILED: &str =
    "After detailed evaluation, this product performs excellently in its class.";
const DEFAULT_PROS: [&str; 2] = ["Excellent performance", "Solid build quality"];
const DEFAULT_CONS: [&str; 1] = ["Relatively expensive"];

/// Provider and model recorded on every result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub provider: String,
    pub model: String,
}

/// Outcome of saving one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Inserted(GenerationResult),
    /// Another run already filled this slot. Not an error.
    AlreadySatisfied,
}

pub struct Persister {
    results: Arc<dyn ResultStore>,
    provenance: Provenance,
}

impl Persister {
    pub fn new(results: Arc<dyn ResultStore>, provenance: Provenance) -> Self {
        Self {
            results,
            provenance,
        }
    }

    /// Build and insert the result for `work`.
    ///
    /// A uniqueness conflict is reported as `AlreadySatisfied`; any other store failure
    /// as `EngineError::Persist`.
    pub fn save_result(
        &self,
        work: &SlotWork,
        parsed: ParsedResult,
    ) -> Result<SaveOutcome, EngineError> {
        let result = build_result(work, parsed, &self.provenance, Utc::now());
        match self
            .results
            .insert_if_absent(&result)
            .map_err(EngineError::Persist)?
        {
            InsertOutcome::Inserted => {
                debug!(slot = %work.slot, result_id = %result.id, "Stored generation result");
                Ok(SaveOutcome::Inserted(result))
            }
            InsertOutcome::Duplicate => Ok(SaveOutcome::AlreadySatisfied),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_empty_list(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value
        .map(|items| {
            items
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|items| !items.is_empty())
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Apply field-level defaults and assemble the persisted document. Pure.
pub fn build_result(
    work: &SlotWork,
    parsed: ParsedResult,
    provenance: &Provenance,
    now: DateTime<Utc>,
) -> GenerationResult {
    let product = parsed.product.unwrap_or_default();
    let recommendation = parsed.recommendation.unwrap_or_default();
    let leaf = &work.path.level3;

    let price = product
        .price
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or_else(|| work.price_band.floor_midpoint());

    GenerationResult {
        id: hex::encode(work.slot.result_id()),
        category_id: work.slot.category_id.clone(),
        level1: work.path.level1.clone(),
        level2: work.path.level2.clone(),
        level3: leaf.clone(),
        dimension: work.slot.dimension.clone(),
        price_range: PriceRangeSnapshot {
            name: work.price_band.name.clone(),
            min: work.price_band.min,
            max: work.price_band.max,
        },
        product: Product {
            name: non_blank(product.name).unwrap_or_else(|| format!("{} Top Pick", leaf)),
            brand: non_blank(product.brand).unwrap_or_else(|| DEFAULT_BRAND.to_string()),
            price: Price {
                value: price,
                currency: work.price_band.unit.clone(),
            },
        },
        recommendation: Recommendation {
            summary: non_blank(recommendation.summary)
                .unwrap_or_else(|| format!("The best choice in {}", leaf)),
            detailed: non_blank(recommendation.detailed)
                .unwrap_or_else(|| DEFAULT_DETAILED.to_string()),
            pros: non_empty_list(recommendation.pros).unwrap_or_else(|| owned(&DEFAULT_PROS)),
            cons: non_empty_list(recommendation.cons).unwrap_or_else(|| owned(&DEFAULT_CONS)),
        },
        region: work.region,
        ai_generated: AiGenerated {
            is_generated: true,
            provider: provenance.provider.clone(),
            model: provenance.model.clone(),
            generated_at: now,
        },
        created_at: now,
        updated_at: now,
    }
}
