//! Resource model providers.
//!
//! Loads FHIR resource and datatype definitions, either from the catalog
//! embedded in this crate or from a catalog file, and exposes them as
//! [`ResourceModel`]s the flattener can traverse.

pub mod document;
pub mod options;
pub mod provider;

pub use document::{CatalogDocument, ElementDef, ModelDef};
pub use options::DiscoveryOptions;
pub use provider::{CatalogProvider, ResourceProvider, discover};

pub use fhirsynth_core::ResourceModel;

/// FHIR release of the embedded catalog.
pub const BUILTIN_FHIR_VERSION: &str = "R4";
