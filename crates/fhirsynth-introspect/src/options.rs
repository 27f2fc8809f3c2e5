use std::path::PathBuf;

/// Options that control how resources are discovered.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// FHIR release to load when no catalog file is given.
    pub fhir_version: String,
    /// Catalog file replacing the embedded catalog.
    pub catalog_path: Option<PathBuf>,
    /// Resources need more than this many fields to be listed.
    pub min_fields: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            fhir_version: crate::BUILTIN_FHIR_VERSION.to_string(),
            catalog_path: None,
            min_fields: 3,
        }
    }
}
