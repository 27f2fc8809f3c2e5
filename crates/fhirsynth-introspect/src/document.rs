use serde::{Deserialize, Serialize};

use fhirsynth_core::{FieldDescriptor, FieldType, PrimitiveKind, ResourceModel};

/// On-disk catalog of FHIR resources and the datatypes they reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// FHIR release the definitions belong to (e.g. `R4`).
    pub fhir_version: String,
    /// Resource types that can be generated.
    #[serde(default)]
    pub resources: Vec<ModelDef>,
    /// Composite datatypes referenced by resources.
    #[serde(default)]
    pub datatypes: Vec<ModelDef>,
}

/// A resource or datatype definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ElementDef>,
}

/// A single element with its FHIR type code and cardinality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDef {
    pub name: String,
    /// FHIR type code; absent when the element type is unknown.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(default)]
    pub min: u32,
    /// Upper cardinality: a number or `*`.
    #[serde(default = "default_max")]
    pub max: String,
}

fn default_max() -> String {
    "1".to_string()
}

impl ModelDef {
    pub fn to_model(&self) -> ResourceModel {
        ResourceModel::new(
            self.name.clone(),
            self.fields.iter().map(ElementDef::to_field).collect(),
        )
    }
}

impl ElementDef {
    /// Convert to a field descriptor.
    ///
    /// Repeating elements become `List`, and elements with `min == 0` are
    /// wrapped in `Optional` on the outside.
    pub fn to_field(&self) -> FieldDescriptor {
        let mut field_type = match self.type_code.as_deref() {
            Some(code) => type_for_code(code),
            None => FieldType::Unknown,
        };
        if self.is_repeating() {
            field_type = FieldType::list(field_type);
        }
        if self.min == 0 {
            field_type = FieldType::optional(field_type);
        }
        FieldDescriptor::new(self.name.clone(), field_type)
    }

    pub fn is_repeating(&self) -> bool {
        match self.max.trim() {
            "*" => true,
            other => other.parse::<u32>().map(|max| max > 1).unwrap_or(false),
        }
    }
}

/// Map a FHIR type code to a field type.
pub fn type_for_code(code: &str) -> FieldType {
    match primitive_for_code(code) {
        Some(kind) => FieldType::Primitive(kind),
        None => FieldType::named(code),
    }
}

fn primitive_for_code(code: &str) -> Option<PrimitiveKind> {
    let kind = match code {
        "string" | "code" | "id" | "uri" | "url" | "canonical" | "markdown" | "base64Binary"
        | "oid" | "uuid" | "xhtml" | "date" | "dateTime" | "instant" | "time" => {
            PrimitiveKind::String
        }
        "integer" | "positiveInt" | "unsignedInt" | "integer64" => PrimitiveKind::Integer,
        "decimal" => PrimitiveKind::Decimal,
        "boolean" => PrimitiveKind::Boolean,
        "null" => PrimitiveKind::Null,
        _ => return None,
    };
    Some(kind)
}
