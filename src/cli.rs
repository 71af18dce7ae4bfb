//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to engine services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_coverage_json, format_coverage_text, format_round_summary, format_run_stats,
};
pub use route::RunContext;
