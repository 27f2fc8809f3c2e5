use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use fhirsynth_core::{
    Error, ModelCatalog, ResourceModel, Result, TypeCatalog, validate_catalog,
};

use crate::document::CatalogDocument;
use crate::options::DiscoveryOptions;

const BUILTIN_R4: &str = include_str!("../catalog/r4.json");

/// Trait implemented by sources of FHIR resource models.
pub trait ResourceProvider {
    /// FHIR release the provider serves (e.g. `R4`).
    fn fhir_version(&self) -> &str;

    /// Names of the resource types that can be generated, sorted.
    fn resource_types(&self) -> Vec<&str>;

    /// Field model of a resource type.
    fn resource(&self, name: &str) -> Option<&ResourceModel>;

    /// Composite-type lookup used while flattening.
    fn catalog(&self) -> &dyn TypeCatalog;
}

/// Provider backed by a catalog document.
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    fhir_version: String,
    resources: BTreeSet<String>,
    models: ModelCatalog,
}

impl CatalogProvider {
    /// Load the catalog embedded in this crate.
    pub fn builtin(fhir_version: &str) -> Result<Self> {
        Self::builtin_with_options(&DiscoveryOptions {
            fhir_version: fhir_version.to_string(),
            ..DiscoveryOptions::default()
        })
    }

    fn builtin_with_options(options: &DiscoveryOptions) -> Result<Self> {
        if !options
            .fhir_version
            .eq_ignore_ascii_case(crate::BUILTIN_FHIR_VERSION)
        {
            return Err(Error::Unsupported(format!(
                "FHIR version '{}' (embedded catalog provides {})",
                options.fhir_version,
                crate::BUILTIN_FHIR_VERSION
            )));
        }
        let document: CatalogDocument = serde_json::from_str(BUILTIN_R4)
            .map_err(|err| Error::InvalidSchema(format!("embedded catalog: {err}")))?;
        Self::from_document(document, options)
    }

    /// Load a catalog file in the [`CatalogDocument`] JSON format.
    pub fn from_path(path: &Path, options: &DiscoveryOptions) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::Other(format!("failed to read catalog {}: {err}", path.display()))
        })?;
        let document: CatalogDocument = serde_json::from_str(&content).map_err(|err| {
            Error::InvalidSchema(format!("catalog {}: {err}", path.display()))
        })?;
        Self::from_document(document, options)
    }

    /// Build a provider from an in-memory document.
    ///
    /// Resources with `options.min_fields` fields or fewer are kept as
    /// composite types but not offered for generation.
    pub fn from_document(document: CatalogDocument, options: &DiscoveryOptions) -> Result<Self> {
        let mut models = ModelCatalog::new();
        let mut resources = BTreeSet::new();

        for def in &document.datatypes {
            if models.insert(def.to_model()).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "duplicate type definition: {}",
                    def.name
                )));
            }
        }

        for def in &document.resources {
            if models.insert(def.to_model()).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "duplicate type definition: {}",
                    def.name
                )));
            }
            if def.fields.len() > options.min_fields {
                resources.insert(def.name.clone());
            } else {
                debug!(
                    resource = %def.name,
                    fields = def.fields.len(),
                    "resource skipped: too few fields"
                );
            }
        }

        validate_catalog(&models)?;

        info!(
            fhir_version = %document.fhir_version,
            resources = resources.len(),
            types = models.len(),
            "resource catalog loaded"
        );

        Ok(Self {
            fhir_version: document.fhir_version,
            resources,
            models,
        })
    }
}

impl ResourceProvider for CatalogProvider {
    fn fhir_version(&self) -> &str {
        &self.fhir_version
    }

    fn resource_types(&self) -> Vec<&str> {
        self.resources.iter().map(String::as_str).collect()
    }

    fn resource(&self, name: &str) -> Option<&ResourceModel> {
        if self.resources.contains(name) {
            self.models.get(name)
        } else {
            None
        }
    }

    fn catalog(&self) -> &dyn TypeCatalog {
        &self.models
    }
}

/// Resolve a provider from discovery options.
///
/// A configured catalog file takes precedence over the embedded catalog.
pub fn discover(options: &DiscoveryOptions) -> Result<CatalogProvider> {
    match &options.catalog_path {
        Some(path) => CatalogProvider::from_path(path, options),
        None => CatalogProvider::builtin_with_options(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_lists_core_resources() {
        let provider = CatalogProvider::builtin("r4").expect("load builtin catalog");
        let types = provider.resource_types();
        assert!(types.contains(&"Patient"));
        assert!(types.contains(&"Observation"));
        assert!(!types.contains(&"HumanName"));
        assert!(provider.catalog().composite("HumanName").is_some());
    }

    #[test]
    fn unknown_version_is_unsupported() {
        let err = CatalogProvider::builtin("R5").expect_err("R5 is not embedded");
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
