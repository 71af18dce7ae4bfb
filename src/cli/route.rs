//! CLI route: single route table and run context. Dispatches to engine services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_coverage_json, format_coverage_text, format_round_summary, format_run_stats,
};
use crate::config::GapfillConfig;
use crate::engine::{EngineContext, EngineStores};
use crate::error::EngineError;
use crate::gaps::GapDetector;
use crate::scheduler::Scheduler;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runtime context for CLI execution: resolved config and the opened stores.
pub struct RunContext {
    config: GapfillConfig,
    stores: EngineStores,
}

impl RunContext {
    /// Validate `config` and open the store it names under `workspace_root`.
    pub fn new(config: GapfillConfig, workspace_root: &Path) -> Result<Self, EngineError> {
        config.ensure_valid()?;
        let stores = EngineStores::open(&config.store_path(workspace_root))?;
        Ok(Self { config, stores })
    }

    /// Execute a command. `cancel` stops the `run` loop.
    pub async fn execute(
        &self,
        command: &Commands,
        cancel: CancellationToken,
    ) -> Result<String, EngineError> {
        match command {
            Commands::Run => {
                let scheduler = self.scheduler()?;
                let stats = scheduler.run(cancel).await;
                self.stores.flush()?;
                Ok(format_run_stats(&stats))
            }
            Commands::Once { format } => {
                let scheduler = self.scheduler()?;
                let summary = scheduler.run_round().await?;
                self.stores.flush()?;
                format_round_summary(&summary, format)
            }
            Commands::Status { format } => {
                let detector = GapDetector::new(
                    self.stores.taxonomy.clone(),
                    self.stores.results.clone(),
                );
                let report = detector.coverage()?;
                if format == "json" {
                    format_coverage_json(&report)
                } else {
                    Ok(format_coverage_text(&report))
                }
            }
            Commands::ImportTaxonomy { file } => {
                let imported = self.stores.taxonomy.import_file(file)?;
                Ok(format!(
                    "Imported {} categories from {}",
                    imported,
                    file.display()
                ))
            }
        }
    }

    fn scheduler(&self) -> Result<Scheduler, EngineError> {
        let context = EngineContext::with_stores(&self.stores, self.config.provider.clone())?;
        Ok(Scheduler::new(&context, self.config.scheduler.clone()))
    }
}
