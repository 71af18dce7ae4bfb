//! CLI output: error mapping from engine errors to stable CLI surface.

use crate::error::EngineError;

/// Map engine errors to a string for CLI output, prefixed with the error class.
pub fn map_error(e: &EngineError) -> String {
    format!("[{}] {}", e.class(), e)
}
