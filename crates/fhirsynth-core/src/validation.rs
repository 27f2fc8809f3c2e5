use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::model::ModelCatalog;

/// Validate internal consistency of a model catalog.
///
/// This checks:
/// - every model and field has a non-empty name
/// - catalog keys match model names
/// - field names are unique within a model
///
/// References to unknown type names are allowed; they flatten as opaque leaves.
pub fn validate_catalog(catalog: &ModelCatalog) -> Result<()> {
    for (key, model) in catalog.iter() {
        if model.name.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "model registered as '{key}' has an empty name"
            )));
        }
        if *key != model.name {
            return Err(Error::InvalidSchema(format!(
                "model '{}' registered under mismatched key '{key}'",
                model.name
            )));
        }

        let mut fields = BTreeSet::new();
        for field in &model.fields {
            if field.name.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "model '{}' has a field with an empty name",
                    model.name
                )));
            }
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate field name: {}.{}",
                    model.name, field.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, ResourceModel};
    use crate::types::FieldType;

    #[test]
    fn rejects_duplicate_fields() {
        let catalog: ModelCatalog = [ResourceModel::new(
            "Patient",
            vec![
                FieldDescriptor::new("id", FieldType::Unknown),
                FieldDescriptor::new("id", FieldType::Unknown),
            ],
        )]
        .into_iter()
        .collect();

        let err = validate_catalog(&catalog).expect_err("duplicate should fail");
        assert!(err.to_string().contains("duplicate field name: Patient.id"));
    }

    #[test]
    fn accepts_dangling_type_references() {
        let catalog: ModelCatalog = [ResourceModel::new(
            "Patient",
            vec![FieldDescriptor::new(
                "contained",
                FieldType::list(FieldType::named("Resource")),
            )],
        )]
        .into_iter()
        .collect();

        assert!(validate_catalog(&catalog).is_ok());
    }
}
