//! CLI command handlers, one file per command.

mod entries;
mod fetch;
mod resolve;

pub use entries::run_entries;
pub use fetch::run_fetch;
pub use resolve::run_resolve;
