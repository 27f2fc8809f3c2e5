use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::FieldType;

/// One field of a resource or datatype model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered field model of a resource type or composite datatype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceModel {
    /// Type name (e.g. `Patient`, `HumanName`).
    pub name: String,
    /// Fields in declaration order; flattening follows this order.
    pub fields: Vec<FieldDescriptor>,
}

impl ResourceModel {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// Lookup of composite types supplied by a schema provider.
pub trait TypeCatalog {
    /// Returns the field model when `type_name` is a composite type.
    fn composite(&self, type_name: &str) -> Option<&ResourceModel>;

    /// Classify the inner (unwrapped) type of a field.
    fn classify<'a>(&'a self, inner: &FieldType) -> InnerKind<'a> {
        match inner {
            FieldType::Named(name) => match self.composite(name) {
                Some(model) => InnerKind::Composite(model),
                None => InnerKind::Opaque,
            },
            _ => InnerKind::Primitive,
        }
    }
}

/// How the flattener treats the inner type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerKind<'a> {
    /// Scalar, or a field without resolvable type information.
    Primitive,
    /// Nested record with its own field model.
    Composite(&'a ResourceModel),
    /// Named type the catalog does not know.
    Opaque,
}

/// In-memory catalog of models keyed by type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: BTreeMap<String, ResourceModel>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a model, returning the one it replaced.
    pub fn insert(&mut self, model: ResourceModel) -> Option<ResourceModel> {
        self.models.insert(model.name.clone(), model)
    }

    pub fn get(&self, name: &str) -> Option<&ResourceModel> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResourceModel)> {
        self.models.iter()
    }
}

impl FromIterator<ResourceModel> for ModelCatalog {
    fn from_iter<I: IntoIterator<Item = ResourceModel>>(iter: I) -> Self {
        let mut catalog = ModelCatalog::new();
        for model in iter {
            catalog.insert(model);
        }
        catalog
    }
}

impl TypeCatalog for ModelCatalog {
    fn composite(&self, type_name: &str) -> Option<&ResourceModel> {
        self.models.get(type_name)
    }
}
