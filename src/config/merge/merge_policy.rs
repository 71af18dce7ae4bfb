//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Fields not listed here fall back to their `#[serde(default)]`.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("storage.path", ".gapfill/store")?
        .set_default("scheduler.max_per_run", 20)?
        .set_default("scheduler.item_delay_ms", 3000)?
        .set_default("scheduler.round_interval_ms", 3_600_000)
}
