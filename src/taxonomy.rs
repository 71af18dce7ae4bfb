//! Taxonomy Model
//!
//! Read-only view of the three-level product taxonomy. A level3 node owns the ordered
//! dimensions and price bands the engine crosses into answer slots.

pub mod store;

pub use store::{SledTaxonomyStore, TaxonomySource};

use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market a level1 group is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRegion {
    Global,
    China,
    #[default]
    Both,
}

/// Region stamped on a generated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Global,
    China,
}

impl From<MarketRegion> for Region {
    fn from(market: MarketRegion) -> Self {
        match market {
            MarketRegion::China => Region::China,
            MarketRegion::Global | MarketRegion::Both => Region::Global,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level1 {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub region: MarketRegion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level2 {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level3 {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default, alias = "priceRanges")]
    pub price_ranges: Vec<PriceBand>,
}

/// Named evaluation axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Weight used by the browsing layer; ignored here.
    #[serde(default)]
    pub importance: Option<f64>,
}

impl Dimension {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            importance: None,
        }
    }
}

fn default_unit() -> String {
    "CNY".to_string()
}

/// Named price interval. `min` is inclusive; `max` is inclusive or open-ended when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub name: String,
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl PriceBand {
    pub fn new(name: impl Into<String>, min: f64, max: Option<f64>) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            unit: default_unit(),
        }
    }

    /// Midpoint of the band rounded down; the lower bound for open-ended bands.
    pub fn floor_midpoint(&self) -> f64 {
        match self.max {
            Some(max) => ((self.min + max) / 2.0).floor(),
            None => self.min.floor(),
        }
    }
}

/// Render whole amounts without a trailing `.0`.
pub(crate) fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// A taxonomy leaf with its full path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub level1: Level1,
    pub level2: Level2,
    pub level3: Level3,
}

impl Category {
    pub fn path(&self) -> CategoryPath {
        CategoryPath {
            level1: self.level1.name.clone(),
            level2: self.level2.name.clone(),
            level3: self.level3.name.clone(),
        }
    }

    pub fn region(&self) -> Region {
        self.level1.region.into()
    }

    /// Number of answer slots this category requires.
    pub fn slot_count(&self) -> usize {
        self.level3.dimensions.len() * self.level3.price_ranges.len()
    }
}

/// Denormalized level1 > level2 > level3 names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPath {
    pub level1: String,
    pub level2: String,
    pub level3: String,
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {} > {}", self.level1, self.level2, self.level3)
    }
}
