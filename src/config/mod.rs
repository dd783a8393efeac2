//! Configuration system: TOML file + environment overrides, process-wide
//! access through [`with_config`].

pub mod macros;
mod schemas;
mod utils;

pub use schemas::*;
pub use utils::*;
