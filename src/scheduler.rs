//! Scheduler Loop
//!
//! Single sequential worker. Each round scans for missing slots, processes at most
//! `max_per_run` of them with a fixed delay after every item, then cools down for the
//! round interval. Per-slot failures are logged, counted and left in the backlog.

use crate::engine::EngineContext;
use crate::error::EngineError;
use crate::gaps::GapDetector;
use crate::persist::{Persister, SaveOutcome};
use crate::prompt::build_prompt;
use crate::provider::GenerationClient;
use crate::slot::SlotWork;
use crate::store::ResultStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Ceiling on slots attempted per round
    #[serde(default = "default_max_per_run")]
    pub max_per_run: usize,

    /// Delay after each slot, success or failure
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Sleep between rounds
    #[serde(default = "default_round_interval_ms")]
    pub round_interval_ms: u64,
}

fn default_max_per_run() -> usize {
    20
}

fn default_item_delay_ms() -> u64 {
    3000
}

fn default_round_interval_ms() -> u64 {
    60 * 60 * 1000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_per_run: default_max_per_run(),
            item_delay_ms: default_item_delay_ms(),
            round_interval_ms: default_round_interval_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_per_run == 0 {
            return Err("max_per_run must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }
}

/// Loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    #[default]
    Draining,
    Cooling,
    Stopped,
}

/// Counts for one Draining phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    /// Backlog size at scan time
    pub missing: usize,
    pub attempted: usize,
    pub generated: usize,
    pub already_satisfied: usize,
    pub failed: usize,
    /// Persisted results after the round; `None` when the count could not be read
    pub total_results: Option<usize>,
    /// Round ended early on cancellation
    pub cancelled: bool,
}

/// Cumulative statistics, readable while the loop runs
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStats {
    pub state: SchedulerState,
    pub rounds_completed: u64,
    pub rounds_aborted: u64,
    pub attempted: u64,
    pub generated: u64,
    pub already_satisfied: u64,
    pub failed: u64,
    pub failures_by_class: HashMap<String, u64>,
    pub last_round: Option<RoundSummary>,
}

/// Sequential gap-filling scheduler
pub struct Scheduler {
    detector: GapDetector,
    persister: Persister,
    client: Arc<dyn GenerationClient>,
    results: Arc<dyn ResultStore>,
    config: SchedulerConfig,
    stats: Arc<RwLock<SchedulerStats>>,
}

impl Scheduler {
    pub fn new(context: &EngineContext, config: SchedulerConfig) -> Self {
        Self {
            detector: GapDetector::new(
                Arc::clone(&context.taxonomy),
                Arc::clone(&context.results),
            ),
            persister: Persister::new(Arc::clone(&context.results), context.provenance()),
            client: Arc::clone(&context.client),
            results: Arc::clone(&context.results),
            config,
            stats: Arc::new(RwLock::new(SchedulerStats::default())),
        }
    }

    /// Snapshot of the cumulative statistics
    pub fn stats(&self) -> SchedulerStats {
        self.stats.read().clone()
    }

    /// Run rounds until `cancel` fires.
    ///
    /// Cancellation is observed at item boundaries and during every sleep. A slot already
    /// in flight completes first.
    pub async fn run(&self, cancel: CancellationToken) -> SchedulerStats {
        info!(
            max_per_run = self.config.max_per_run,
            item_delay_ms = self.config.item_delay_ms,
            round_interval_ms = self.config.round_interval_ms,
            "Scheduler started"
        );

        while !cancel.is_cancelled() {
            self.set_state(SchedulerState::Draining);
            match self.drain(&cancel).await {
                Ok(summary) if summary.cancelled => break,
                Ok(_) => {}
                Err(e) => {
                    self.stats.write().rounds_aborted += 1;
                    error!(
                        error = %e,
                        error_class = e.class(),
                        "Gap scan failed, round aborted"
                    );
                }
            }

            self.set_state(SchedulerState::Cooling);
            debug!(
                round_interval_ms = self.config.round_interval_ms,
                "Cooling down before next round"
            );
            if !sleep_or_cancel(self.config.round_interval(), &cancel).await {
                break;
            }
        }

        self.set_state(SchedulerState::Stopped);
        let stats = self.stats();
        info!(
            rounds_completed = stats.rounds_completed,
            generated = stats.generated,
            failed = stats.failed,
            "Scheduler stopped"
        );
        stats
    }

    /// Run exactly one Draining phase.
    pub async fn run_round(&self) -> Result<RoundSummary, EngineError> {
        self.set_state(SchedulerState::Draining);
        let summary = self.drain(&CancellationToken::new()).await;
        self.set_state(SchedulerState::Stopped);
        if summary.is_err() {
            self.stats.write().rounds_aborted += 1;
        }
        summary
    }

    async fn drain(&self, cancel: &CancellationToken) -> Result<RoundSummary, EngineError> {
        let backlog = self.detector.compute_missing_slots()?;
        let mut summary = RoundSummary {
            missing: backlog.len(),
            ..RoundSummary::default()
        };

        info!(
            missing = summary.missing,
            batch = summary.missing.min(self.config.max_per_run),
            "Gap scan complete"
        );

        for work in backlog.iter().take(self.config.max_per_run) {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            summary.attempted += 1;
            match self.process_slot(work).await {
                Ok(SaveOutcome::Inserted(_)) => {
                    summary.generated += 1;
                    info!(
                        category_id = %work.slot.category_id,
                        dimension = %work.slot.dimension,
                        price_band = %work.slot.price_band,
                        "Slot filled"
                    );
                }
                Ok(SaveOutcome::AlreadySatisfied) => {
                    summary.already_satisfied += 1;
                    debug!(
                        category_id = %work.slot.category_id,
                        dimension = %work.slot.dimension,
                        price_band = %work.slot.price_band,
                        "Slot already satisfied"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    *self
                        .stats
                        .write()
                        .failures_by_class
                        .entry(e.class().to_string())
                        .or_insert(0) += 1;
                    warn!(
                        category_id = %work.slot.category_id,
                        dimension = %work.slot.dimension,
                        price_band = %work.slot.price_band,
                        error_class = e.class(),
                        error = %e,
                        "Slot generation failed"
                    );
                }
            }

            if !sleep_or_cancel(self.config.item_delay(), cancel).await {
                summary.cancelled = true;
                break;
            }
        }

        summary.total_results = match self.results.count() {
            Ok(total) => Some(total),
            Err(e) => {
                warn!(error = %e, "Failed to count stored results");
                None
            }
        };

        info!(
            attempted = summary.attempted,
            generated = summary.generated,
            already_satisfied = summary.already_satisfied,
            failed = summary.failed,
            total_results = summary.total_results,
            cancelled = summary.cancelled,
            "Round complete"
        );

        self.record_round(&summary);
        Ok(summary)
    }

    /// Prompt, generate and persist one slot.
    async fn process_slot(&self, work: &SlotWork) -> Result<SaveOutcome, EngineError> {
        let prompt = build_prompt(&work.slot, &work.path, &work.dimension, &work.price_band);
        let parsed = self.client.generate(&prompt).await?;
        self.persister.save_result(work, parsed)
    }

    fn set_state(&self, state: SchedulerState) {
        self.stats.write().state = state;
    }

    fn record_round(&self, summary: &RoundSummary) {
        let mut stats = self.stats.write();
        stats.rounds_completed += 1;
        stats.attempted += summary.attempted as u64;
        stats.generated += summary.generated as u64;
        stats.already_satisfied += summary.already_satisfied as u64;
        stats.failed += summary.failed as u64;
        stats.last_round = Some(summary.clone());
    }
}

/// Sleep for `duration`; `false` when cancelled first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(duration) => true,
    }
}
