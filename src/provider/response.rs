//! Partially-trusted provider output.
//!
//! Every field is optional and decoded leniently: a value of the wrong JSON type is
//! treated as absent rather than failing the whole response. Defaults are applied later
//! by the persister.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedRecommendation {
    pub summary: Option<String>,
    pub detailed: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
}

/// Decoded `{ product, recommendation }` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedResult {
    pub product: Option<ParsedProduct>,
    pub recommendation: Option<ParsedRecommendation>,
}

impl ParsedResult {
    pub fn from_value(value: &Value) -> Self {
        let product = value.get("product").filter(|v| v.is_object()).map(|p| ParsedProduct {
            name: text_field(p, "name"),
            brand: text_field(p, "brand"),
            price: number_field(p, "price"),
        });

        let recommendation = value
            .get("recommendation")
            .filter(|v| v.is_object())
            .map(|r| ParsedRecommendation {
                summary: text_field(r, "summary"),
                detailed: text_field(r, "detailed"),
                pros: list_field(r, "pros"),
                cons: list_field(r, "cons"),
            });

        Self {
            product,
            recommendation,
        }
    }
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts a JSON number, or a string such as "199" / "¥1,299.00" / "约199元".
fn number_field(value: &Value, field: &str) -> Option<f64> {
    match value.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        Value::Object(map) => map.get("value").and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }),
        _ => None,
    }
}

const CURRENCY_SYMBOLS: &[char] = &['¥', '￥', '$', '€', '£'];

/// Single numeric token after dropping currency marks, thousands separators and whitespace.
///
/// Ranges such as "299-399" and other multi-number text yield `None`. The sign is kept.
fn parse_price_text(text: &str) -> Option<f64> {
    let compact: String = text
        .chars()
        .filter(|c| {
            !c.is_whitespace() && !matches!(*c, ',' | '，') && !CURRENCY_SYMBOLS.contains(c)
        })
        .collect();
    let token = compact.trim_matches(|c: char| c.is_alphabetic());
    if token.is_empty() || !token.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse::<f64>().ok()
}

/// Accepts a list of strings (non-strings are skipped) or a single string.
fn list_field(value: &Value, field: &str) -> Option<Vec<String>> {
    match value.get(field)? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}
