use std::collections::BTreeMap;
use std::path::PathBuf;

use super::BundleLocator;
use crate::error::ResolutionError;

/// Bundle directories declared in the project settings.
#[derive(Debug, Clone, Default)]
pub struct BundleRegistry {
    bundles: BTreeMap<String, PathBuf>,
}

impl BundleRegistry {
    #[must_use]
    pub const fn new(bundles: BTreeMap<String, PathBuf>) -> Self {
        Self { bundles }
    }
}

impl BundleLocator for BundleRegistry {
    fn bundle_path(&self, name: &str) -> Result<PathBuf, ResolutionError> {
        self.bundles
            .get(name)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownBundle { name: name.to_string() })
    }
}
