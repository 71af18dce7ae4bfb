//! Gap Detector
//!
//! Computes the required slot set (each category's dimensions × price bands) and
//! subtracts slots that already have a persisted result. Output order is taxonomy order,
//! then declared dimension order, then declared price band order.

use crate::error::EngineError;
use crate::slot::SlotWork;
use crate::store::ResultStore;
use crate::taxonomy::TaxonomySource;
use crate::types::CategoryId;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Per-category coverage numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCoverage {
    pub category_id: CategoryId,
    pub path: String,
    pub required: usize,
    pub satisfied: usize,
}

impl CategoryCoverage {
    pub fn missing(&self) -> usize {
        self.required - self.satisfied
    }
}

/// Coverage of the whole taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub categories: Vec<CategoryCoverage>,
}

impl CoverageReport {
    pub fn required(&self) -> usize {
        self.categories.iter().map(|c| c.required).sum()
    }

    pub fn satisfied(&self) -> usize {
        self.categories.iter().map(|c| c.satisfied).sum()
    }

    pub fn missing(&self) -> usize {
        self.required() - self.satisfied()
    }
}

pub struct GapDetector {
    taxonomy: Arc<dyn TaxonomySource>,
    results: Arc<dyn ResultStore>,
}

impl GapDetector {
    pub fn new(taxonomy: Arc<dyn TaxonomySource>, results: Arc<dyn ResultStore>) -> Self {
        Self { taxonomy, results }
    }

    /// Every required slot that has no persisted result, in deterministic order.
    pub fn compute_missing_slots(&self) -> Result<Vec<SlotWork>, EngineError> {
        let mut missing = Vec::new();

        for category in self.taxonomy.categories()? {
            if category.slot_count() == 0 {
                continue;
            }
            // One query per category bounds the cost of the existence checks.
            let satisfied = self.results.satisfied_slots(&category.id)?;

            for dimension in &category.level3.dimensions {
                for price_band in &category.level3.price_ranges {
                    let key = (dimension.name.clone(), price_band.name.clone());
                    if !satisfied.contains(&key) {
                        missing.push(SlotWork::new(&category, dimension, price_band));
                    }
                }
            }
        }

        debug!(missing = missing.len(), "Computed missing slots");
        Ok(missing)
    }

    /// Required / satisfied counts per category. Results for slots no longer in the
    /// taxonomy are ignored.
    pub fn coverage(&self) -> Result<CoverageReport, EngineError> {
        let mut report = CoverageReport::default();
        for category in self.taxonomy.categories()? {
            let satisfied = self.results.satisfied_slots(&category.id)?;
            let mut required = 0;
            let mut filled = 0;
            for dimension in &category.level3.dimensions {
                for price_band in &category.level3.price_ranges {
                    required += 1;
                    if satisfied.contains(&(dimension.name.clone(), price_band.name.clone())) {
                        filled += 1;
                    }
                }
            }
            report.categories.push(CategoryCoverage {
                category_id: category.id.clone(),
                path: category.path().to_string(),
                required,
                satisfied: filled,
            });
        }
        Ok(report)
    }
}
