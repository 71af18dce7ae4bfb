//! End-to-end gap filling over the sled stores

use super::test_utils::{fish_oil, temp_stores, CannedClient};
use gapfill::engine::{EngineContext, EngineStores};
use gapfill::gaps::GapDetector;
use gapfill::persist::{Persister, Provenance, SaveOutcome};
use gapfill::provider::ParsedResult;
use gapfill::scheduler::{Scheduler, SchedulerConfig};
use gapfill::slot::{Slot, SlotWork};
use gapfill::store::ResultStore;
use gapfill::taxonomy::{Category, Dimension, PriceBand, Region};
use gapfill::types::CategoryId;
use std::sync::Arc;

fn immediate() -> SchedulerConfig {
    SchedulerConfig {
        max_per_run: 20,
        item_delay_ms: 0,
        round_interval_ms: 0,
    }
}

fn detector(stores: &EngineStores) -> GapDetector {
    GapDetector::new(stores.taxonomy.clone(), stores.results.clone())
}

#[tokio::test]
async fn test_fish_oil_backlog_drains_to_zero() {
    let (_temp_dir, stores) = temp_stores();
    stores.taxonomy.put_category(&fish_oil()).unwrap();

    let missing = detector(&stores).compute_missing_slots().unwrap();
    let labels: Vec<String> = missing.iter().map(|w| w.slot.to_string()).collect();
    assert_eq!(
        labels,
        vec![
            "fish-oil / Purity / Budget",
            "fish-oil / Purity / Premium",
            "fish-oil / Value / Budget",
            "fish-oil / Value / Premium",
        ]
    );

    let client = Arc::new(CannedClient::default());
    let context = EngineContext::new(
        stores.taxonomy.clone(),
        stores.results.clone(),
        client.clone(),
    );
    let scheduler = Scheduler::new(&context, immediate());

    let summary = scheduler.run_round().await.unwrap();
    assert_eq!(summary.missing, 4);
    assert_eq!(summary.generated, 4);
    assert_eq!(summary.total_results, Some(4));
    assert_eq!(client.calls(), 4);

    assert!(detector(&stores).compute_missing_slots().unwrap().is_empty());

    let stored = stores
        .results
        .get(&Slot::new(CategoryId::new("fish-oil"), "Purity", "Budget"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.product.name, "Omega Pure");
    assert_eq!(stored.product.brand, "Well-known Brand");
    assert_eq!(stored.product.price.value, 50.0);
    assert_eq!(stored.product.price.currency, "CNY");
    assert_eq!(stored.region, Region::Global);
    assert_eq!(stored.ai_generated.provider, "canned");
    assert!(stored.ai_generated.is_generated);

    let next = scheduler.run_round().await.unwrap();
    assert_eq!(next.missing, 0);
    assert_eq!(next.attempted, 0);
    assert_eq!(client.calls(), 4);
}

#[test]
fn test_second_save_is_already_satisfied() {
    let (_temp_dir, stores) = temp_stores();
    let category = fish_oil();
    let work = SlotWork::new(
        &category,
        &category.level3.dimensions[0],
        &category.level3.price_ranges[1],
    );
    let persister = Persister::new(
        stores.results.clone(),
        Provenance {
            provider: "qwen".to_string(),
            model: "qwen-max".to_string(),
        },
    );

    let first = persister.save_result(&work, ParsedResult::default()).unwrap();
    assert!(matches!(first, SaveOutcome::Inserted(_)));
    let second = persister.save_result(&work, ParsedResult::default()).unwrap();
    assert_eq!(second, SaveOutcome::AlreadySatisfied);
    assert_eq!(stores.results.count().unwrap(), 1);
}

#[test]
fn test_missing_is_cross_product_minus_satisfied() {
    let (_temp_dir, stores) = temp_stores();
    let mut wide: Category = fish_oil();
    wide.id = CategoryId::new("krill-oil");
    wide.level3.name = "Krill Oil".to_string();
    wide.level3.slug = "krill-oil".to_string();
    wide.level3.dimensions = (0..5).map(|i| Dimension::named(format!("D{}", i))).collect();
    wide.level3.price_ranges = vec![
        PriceBand::new("Low", 0.0, Some(50.0)),
        PriceBand::new("Mid", 50.0, Some(150.0)),
        PriceBand::new("High", 150.0, None),
    ];
    stores.taxonomy.put_category(&fish_oil()).unwrap();
    stores.taxonomy.put_category(&wide).unwrap();

    let persister = Persister::new(
        stores.results.clone(),
        Provenance {
            provider: "qwen".to_string(),
            model: "qwen-max".to_string(),
        },
    );
    let backlog = detector(&stores).compute_missing_slots().unwrap();
    assert_eq!(backlog.len(), 4 + 15);

    for work in backlog.iter().step_by(3) {
        persister.save_result(work, ParsedResult::default()).unwrap();
    }
    let filled = backlog.iter().step_by(3).count();

    let remaining = detector(&stores).compute_missing_slots().unwrap();
    assert_eq!(remaining.len(), 19 - filled);

    let coverage = detector(&stores).coverage().unwrap();
    assert_eq!(coverage.required(), 19);
    assert_eq!(coverage.satisfied(), filled);
    assert_eq!(coverage.missing(), remaining.len());
}

#[test]
fn test_results_survive_reopen() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let store_path = temp_dir.path().join("store");
    {
        let stores = EngineStores::open(&store_path).unwrap();
        stores.taxonomy.put_category(&fish_oil()).unwrap();
        let category = fish_oil();
        let work = SlotWork::new(
            &category,
            &category.level3.dimensions[1],
            &category.level3.price_ranges[0],
        );
        Persister::new(
            stores.results.clone(),
            Provenance {
                provider: "qwen".to_string(),
                model: "qwen-max".to_string(),
            },
        )
        .save_result(&work, ParsedResult::default())
        .unwrap();
        stores.flush().unwrap();
    }

    let stores = EngineStores::open(&store_path).unwrap();
    assert_eq!(stores.results.count().unwrap(), 1);
    assert_eq!(detector(&stores).compute_missing_slots().unwrap().len(), 3);
}
