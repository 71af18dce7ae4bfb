//! Configuration System
//!
//! Layered configuration for the engine: built-in defaults, a global user file, workspace
//! files, legacy environment variables and `GAPFILL__SECTION__KEY` overrides, in that
//! order of increasing precedence.

use crate::error::EngineError;
use crate::logging::LoggingConfig;
use crate::provider::ProviderConfig;
use crate::scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::{ConfigLoader, LoadOptions};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory holding both the taxonomy and the result collection.
    /// Relative paths resolve against the workspace root.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".gapfill/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapfillConfig {
    /// Generation provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Batch ceiling and delays
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Provider(String),
    Scheduler(String),
    Storage(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Scheduler(msg) => write!(f, "Scheduler: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GapfillConfig {
    /// Validate the entire configuration.
    ///
    /// A missing provider credential is not a validation error: it fails each generation
    /// call instead of the process.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.scheduler.validate() {
            errors.push(ValidationError::Scheduler(e));
        }
        if self.storage.path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "Store path cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `EngineError::Config`.
    pub fn ensure_valid(&self) -> Result<(), EngineError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            EngineError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Store path resolved against `workspace_root`.
    pub fn store_path(&self, workspace_root: &std::path::Path) -> PathBuf {
        if self.storage.path.is_absolute() {
            self.storage.path.clone()
        } else {
            workspace_root.join(&self.storage.path)
        }
    }
}
