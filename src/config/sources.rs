//! Configuration sources, lowest precedence first.

pub mod global_file;
pub mod legacy_env;
pub mod workspace_file;
