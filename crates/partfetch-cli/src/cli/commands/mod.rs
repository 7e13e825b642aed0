//! CLI command handlers, one file per subcommand.

mod get;
mod plan;
mod probe;

pub use get::run_get;
pub use plan::run_plan;
pub use probe::run_probe;
