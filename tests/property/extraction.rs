//! Completion extraction never panics and agrees with direct parsing

use gapfill::provider::extract::{json_object_span, parse_completion, strip_code_fence};
use proptest::prelude::*;

/// Arbitrary text never panics the extractor; failures are always malformed responses.
#[test]
fn test_parse_completion_never_panics() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<String>(), |text| {
            if let Err(err) = parse_completion(&text) {
                prop_assert_eq!(err.class(), "malformed_response");
            }
            Ok(())
        })
        .unwrap();
}

/// Brace-heavy text exercises the span scan on every char boundary case.
#[test]
fn test_span_is_brace_delimited() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&"[{}a-z\u{4e00}-\u{4e10}` \n]{0,64}", |text| {
            if let Some(span) = json_object_span(&text) {
                prop_assert!(span.starts_with('{'), "span must open with a brace");
                prop_assert!(span.ends_with('}'), "span must close with a brace");
                prop_assert!(text.contains(span), "span must come from the input");
            }
            let _ = strip_code_fence(&text);
            Ok(())
        })
        .unwrap();
}

/// A product name survives any prose prefix and fence wrapping.
#[test]
fn test_embedded_object_is_recovered() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[A-Za-z ,.!]{0,40}", "[A-Za-z][A-Za-z0-9 ]{0,20}", any::<bool>()),
            |(prose, name, fenced)| {
                let object = serde_json::json!({ "product": { "name": name } }).to_string();
                let text = if fenced {
                    format!("```json\n{}\n```", object)
                } else {
                    format!("{} {}", prose, object)
                };

                let parsed = parse_completion(&text).unwrap();
                let recovered = parsed.product.and_then(|p| p.name);
                prop_assert_eq!(recovered.as_deref(), Some(name.as_str()));
                Ok(())
            },
        )
        .unwrap();
}
