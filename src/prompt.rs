//! Prompt Builder
//!
//! Maps a slot to the natural-language request sent to the generation API. The JSON
//! schema requested here is the contract `provider::ParsedResult` decodes.

use crate::slot::Slot;
use crate::taxonomy::{format_amount, CategoryPath, Dimension, PriceBand};

/// System message sent ahead of every slot prompt.
pub const SYSTEM_PROMPT: &str =
    "You are a professional product-review expert. Always answer with JSON in the requested format.";

/// Build the user prompt for one slot. Pure and deterministic.
pub fn build_prompt(
    slot: &Slot,
    path: &CategoryPath,
    dimension: &Dimension,
    price_band: &PriceBand,
) -> String {
    let price_bounds = match price_band.max {
        Some(max) => format!(
            "{} to {} {}",
            format_amount(price_band.min),
            format_amount(max),
            price_band.unit
        ),
        None => format!(
            "{} {} and above",
            format_amount(price_band.min),
            price_band.unit
        ),
    };

    format!(
        r#"You are a professional product-review editor writing for the "Global Best Products Encyclopedia".

Within the category "{path}", select the single product that performs best overall on the dimension "{dimension}".

Price requirement: {band} ({bounds})

Reference: {key}

Reply strictly with one JSON object in the following format:
{{
  "product": {{
    "name": "Full product name",
    "brand": "Brand name",
    "price": 0
  }},
  "recommendation": {{
    "summary": "One-sentence summary",
    "detailed": "Detailed reasons for the recommendation",
    "pros": ["Pro 1", "Pro 2", "Pro 3"],
    "cons": ["Con 1", "Con 2"]
  }}
}}"#,
        path = path,
        dimension = dimension.name,
        band = price_band.name,
        bounds = price_bounds,
        key = slot,
    )
}
