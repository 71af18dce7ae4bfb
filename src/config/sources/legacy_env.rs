//! Legacy environment variables: `QWEN_API_KEY` and the `AUTOEXPAND_*` scheduler knobs.
//!
//! These sit below the `GAPFILL__SECTION__KEY` overrides.

use config::{ConfigError, Map, Source, Value, ValueKind};
use std::collections::HashMap;

/// Legacy variable name → (config key, numeric).
const LEGACY_KEYS: &[(&str, &str, bool)] = &[
    ("QWEN_API_KEY", "provider.api_key", false),
    ("AUTOEXPAND_MAX_PER_RUN", "scheduler.max_per_run", true),
    ("AUTOEXPAND_INTERVAL_MS", "scheduler.item_delay_ms", true),
    ("AUTOEXPAND_LOOP_INTERVAL_MS", "scheduler.round_interval_ms", true),
];

/// `config::Source` reading the legacy variables from the process environment, or from an
/// injected map.
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    vars: Option<HashMap<String, String>>,
}

impl LegacyEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from `vars` instead of the process environment.
    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

impl Source for LegacyEnv {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = String::from("legacy environment");
        let mut map = Map::new();

        for (var, key, numeric) in LEGACY_KEYS {
            let Some(raw) = self.lookup(var) else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let kind = if *numeric {
                let parsed: i64 = raw.parse().map_err(|_| {
                    ConfigError::Message(format!("{} must be an integer, got '{}'", var, raw))
                })?;
                ValueKind::I64(parsed)
            } else {
                ValueKind::String(raw.to_string())
            };

            map.insert((*key).to_string(), Value::new(Some(&origin), kind));
        }

        Ok(map)
    }
}
