//! Slot Model
//!
//! A slot is the unit of required work: one category crossed with one dimension and one
//! price band. Its byte key is the uniqueness key of the result collection.

use crate::taxonomy::{Category, CategoryPath, Dimension, PriceBand, Region};
use crate::types::{CategoryId, ResultId};
use std::fmt;

const KEY_SEPARATOR: u8 = 0x00;

/// `(category_id, dimension_name, price_band_name)`. Equal iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub category_id: CategoryId,
    pub dimension: String,
    pub price_band: String,
}

impl Slot {
    pub fn new(
        category_id: CategoryId,
        dimension: impl Into<String>,
        price_band: impl Into<String>,
    ) -> Self {
        Self {
            category_id,
            dimension: dimension.into(),
            price_band: price_band.into(),
        }
    }

    /// Storage key: `category_id 0x00 dimension 0x00 price_band`.
    ///
    /// All keys of one category share the `category_prefix`, so a prefix scan returns
    /// exactly that category's results.
    pub fn key(&self) -> Vec<u8> {
        let mut key = Self::category_prefix(&self.category_id);
        key.extend_from_slice(self.dimension.as_bytes());
        key.push(KEY_SEPARATOR);
        key.extend_from_slice(self.price_band.as_bytes());
        key
    }

    pub fn category_prefix(category_id: &CategoryId) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(category_id.as_str().len() + 1);
        prefix.extend_from_slice(category_id.as_str().as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix
    }

    /// Split a key back into `(dimension, price_band)` after the category prefix.
    pub fn decode_suffix(key: &[u8], prefix_len: usize) -> Option<(String, String)> {
        let suffix = key.get(prefix_len..)?;
        let split = suffix.iter().position(|b| *b == KEY_SEPARATOR)?;
        let dimension = std::str::from_utf8(&suffix[..split]).ok()?;
        let price_band = std::str::from_utf8(&suffix[split + 1..]).ok()?;
        Some((dimension.to_string(), price_band.to_string()))
    }

    /// Content-addressed id of the result that satisfies this slot.
    pub fn result_id(&self) -> ResultId {
        *blake3::hash(&self.key()).as_bytes()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.category_id, self.dimension, self.price_band
        )
    }
}

/// A missing slot together with the taxonomy data needed to fill it.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotWork {
    pub slot: Slot,
    pub path: CategoryPath,
    pub dimension: Dimension,
    pub price_band: PriceBand,
    pub region: Region,
}

impl SlotWork {
    pub fn new(category: &Category, dimension: &Dimension, price_band: &PriceBand) -> Self {
        Self {
            slot: Slot::new(
                category.id.clone(),
                dimension.name.clone(),
                price_band.name.clone(),
            ),
            path: category.path(),
            dimension: dimension.clone(),
            price_band: price_band.clone(),
            region: category.region(),
        }
    }
}
