//! YAML tier catalog loading.
//!
//! The file has the same shape as `TierCatalogData`:
//!
//! ```yaml
//! student_tiers:
//!   - id: 6c696e67-7561-0000-0000-000000000002
//!     plan: BASIC
//!     name: Basic
//!     price: 999
//!     billing_cycle: MONTHLY
//!     enrollment_quota: 5
//!     ...
//! institution_tiers: [...]
//! commission_tiers:
//!   - plan: STARTER
//!     rate: 2500
//! ```

use std::path::Path;

use crate::config::ConfigError;
use crate::domain::catalog::TierCatalogData;

use super::StaticTierCatalog;

/// Parse and validate a catalog from YAML text.
pub fn parse_catalog_yaml(yaml: &str) -> Result<StaticTierCatalog, ConfigError> {
    let data: TierCatalogData =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::TierCatalog(e.to_string()))?;
    StaticTierCatalog::new(data).map_err(|e| ConfigError::TierCatalog(e.to_string()))
}

/// Read a catalog override from disk.
pub fn load_catalog_file(path: &Path) -> Result<StaticTierCatalog, ConfigError> {
    let yaml = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::TierCatalog(format!("cannot read {}: {}", path.display(), e))
    })?;
    let catalog = parse_catalog_yaml(&yaml)?;
    tracing::info!(
        path = %path.display(),
        student_tiers = catalog.data().student_tiers.len(),
        institution_tiers = catalog.data().institution_tiers.len(),
        "Loaded tier catalog"
    );
    Ok(catalog)
}
