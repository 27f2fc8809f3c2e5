//! Core contracts and helpers for fhirsynth.
//!
//! This crate defines the resource field model, the naming-convention
//! transforms and the schema flattener that turns a nested resource model
//! into flat column names.

pub mod case;
pub mod config;
pub mod error;
pub mod flatten;
pub mod model;
pub mod types;
pub mod validation;

pub use case::{to_camel_case, to_case, to_pascal_case, to_snake_case};
pub use config::{CaseStyle, FlattenConfig};
pub use error::{Error, Result};
pub use flatten::{ColumnList, column_list, dedup_columns, flatten, flatten_from};
pub use model::{FieldDescriptor, InnerKind, ModelCatalog, ResourceModel, TypeCatalog};
pub use types::{FieldType, PrimitiveKind, UnwrappedType};
pub use validation::validate_catalog;

/// Default column separator used when flattening nested fields.
pub const DEFAULT_SEPARATOR: &str = "_";
