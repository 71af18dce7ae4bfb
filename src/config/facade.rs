//! Configuration loader.

use super::merge::merge_policy;
use super::sources::{global_file, legacy_env::LegacyEnv, workspace_file};
use super::GapfillConfig;
use crate::error::EngineError;
use config::{Environment, File};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_ENV_NAME: &str = "development";

/// Optional inputs to a configuration load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file, layered above the workspace files.
    pub config_file: Option<PathBuf>,

    /// Environment snapshot used instead of the process environment.
    pub env: Option<HashMap<String, String>>,

    /// Skip the per-user global file.
    pub skip_global: bool,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root` from every layer.
    pub fn load(workspace_root: &Path) -> Result<GapfillConfig, EngineError> {
        Self::load_with(workspace_root, &LoadOptions::default())
    }

    /// Load configuration with explicit options.
    ///
    /// Layers, lowest precedence first: built-in defaults, global file, workspace
    /// `config/config.toml`, workspace `config/$GAPFILL_ENV.toml`, explicit file, legacy
    /// variables, `GAPFILL__SECTION__KEY` variables.
    pub fn load_with(
        workspace_root: &Path,
        options: &LoadOptions,
    ) -> Result<GapfillConfig, EngineError> {
        let lookup = |name: &str| -> Option<String> {
            match &options.env {
                Some(env) => env.get(name).cloned(),
                None => std::env::var(name).ok(),
            }
        };

        let mut builder = merge_policy::builder_with_defaults()?;

        if !options.skip_global {
            builder = global_file::add_to_builder(builder)?;
        }

        let env_name = lookup("GAPFILL_ENV").unwrap_or_else(|| DEFAULT_ENV_NAME.to_string());
        builder = workspace_file::add_to_builder(builder, workspace_root, &env_name)?;

        if let Some(path) = &options.config_file {
            if !path.exists() {
                return Err(EngineError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.clone()).required(true));
        }

        builder = match &options.env {
            Some(env) => builder.add_source(LegacyEnv::with_vars(env.clone())),
            None => builder.add_source(LegacyEnv::new()),
        };

        let environment = Environment::with_prefix("GAPFILL")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(options.env.clone());
        builder = builder.add_source(environment);

        let config: GapfillConfig = builder.build()?.try_deserialize()?;

        debug!(
            workspace_root = %workspace_root.display(),
            env_name = %env_name,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<GapfillConfig, EngineError> {
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}
