//! Configuration loading and validation
//!
//! Configuration comes from an optional TOML file; every field has a
//! default so the binary runs with no file at all.

mod parser;
mod types;
mod validation;

pub use parser::{load_config, load_config_or_default};
pub use types::{Config, CrawlerConfig, IndexConfig, StorageConfig};
pub use validation::validate;
