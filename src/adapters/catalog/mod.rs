//! Tier catalog adapters.
//!
//! - `StaticTierCatalog` - Serves a validated `TierCatalogData` from memory
//! - `load_catalog_file` - Reads a YAML catalog override

mod static_catalog;
mod yaml_loader;

pub use static_catalog::StaticTierCatalog;
pub use yaml_loader::{load_catalog_file, parse_catalog_yaml};

use crate::config::{ConfigError, GovernanceConfig};

/// The YAML override named by `tier_catalog_path`, else the built-in catalog.
pub fn catalog_for(config: &GovernanceConfig) -> Result<StaticTierCatalog, ConfigError> {
    match &config.tier_catalog_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading tier catalog override");
            load_catalog_file(path)
        }
        None => Ok(StaticTierCatalog::builtin()),
    }
}
