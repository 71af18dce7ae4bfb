//! Property-based tests for determinism guarantees

use gapfill::prompt::build_prompt;
use gapfill::slot::Slot;
use gapfill::taxonomy::{CategoryPath, Dimension, PriceBand};
use gapfill::types::CategoryId;
use proptest::prelude::*;

/// The same slot always produces byte-identical prompts that embed its identity.
#[test]
fn test_prompt_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                "[a-z-]{1,16}",
                "[A-Za-z ]{1,24}",
                "[A-Za-z]{1,12}",
                0u32..10_000,
                proptest::option::of(0u32..10_000),
            ),
            |(category, dimension, band, min, span)| {
                let min = f64::from(min);
                let max = span.map(|s| min + f64::from(s));
                let price_band = PriceBand::new(band.clone(), min, max);
                let category_id = CategoryId::new(category.as_str());
                let slot = Slot::new(category_id, dimension.clone(), band.clone());
                let path = CategoryPath {
                    level1: "Health".to_string(),
                    level2: "Supplements".to_string(),
                    level3: category.clone(),
                };
                let dimension = Dimension::named(dimension);

                let first = build_prompt(&slot, &path, &dimension, &price_band);
                let second = build_prompt(&slot, &path, &dimension, &price_band);
                prop_assert_eq!(&first, &second);
                prop_assert!(first.contains(&dimension.name));
                prop_assert!(first.contains(&band));
                Ok(())
            },
        )
        .unwrap();
}

/// Result identity depends only on the slot key.
#[test]
fn test_result_id_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<String>(), any::<String>(), any::<String>()),
            |(category, dimension, band)| {
                let category_id = CategoryId::new(category.as_str());
                let a = Slot::new(category_id, dimension.clone(), band.clone());
                let b = Slot::new(CategoryId::new(category.as_str()), dimension, band);
                prop_assert_eq!(a.result_id(), b.result_id());
                prop_assert_eq!(a.key(), b.key());
                Ok(())
            },
        )
        .unwrap();
}
