pub mod config;
pub mod logging;

pub mod catalog;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod materialize;
pub mod target_path;
pub mod transport;

pub use error::{FetchError, FetchErrorKind};
pub use fetch::FetchCoordinator;
pub use target_path::{resolve_target_path, LocalTargetPath};
