//! Schema flattening: nested resource models to flat column names.

use std::collections::HashSet;

use tracing::debug;

use crate::case::to_case;
use crate::config::FlattenConfig;
use crate::model::{InnerKind, ResourceModel, TypeCatalog};

/// Ordered column names with duplicates removed, first occurrence kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnList(Vec<String>);

impl ColumnList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ColumnList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Flatten a model from the top level.
pub fn flatten(
    model: &ResourceModel,
    catalog: &dyn TypeCatalog,
    config: &FlattenConfig,
) -> Vec<String> {
    let columns = flatten_from(model, catalog, config, "", 0);
    debug!(
        resource = %model.name,
        columns = columns.len(),
        max_depth = config.max_depth,
        "schema flattened"
    );
    columns
}

/// Flatten a model whose columns sit under `prefix` at nesting level `depth`.
///
/// The output may contain duplicates; see [`dedup_columns`].
pub fn flatten_from(
    model: &ResourceModel,
    catalog: &dyn TypeCatalog,
    config: &FlattenConfig,
    prefix: &str,
    depth: usize,
) -> Vec<String> {
    let mut columns = Vec::new();
    collect(model, catalog, config, prefix, depth, &mut columns);
    columns
}

fn collect(
    model: &ResourceModel,
    catalog: &dyn TypeCatalog,
    config: &FlattenConfig,
    prefix: &str,
    depth: usize,
    columns: &mut Vec<String>,
) {
    if depth >= config.max_depth {
        return;
    }

    let separator = config.separator.as_str();

    for field in &model.fields {
        if config.exclude_fields.contains(&field.name) {
            continue;
        }
        if depth == 0
            && !config.include_fields.is_empty()
            && !config.include_fields.contains(&field.name)
        {
            continue;
        }

        let unwrapped = field.field_type.strip_wrappers();
        let kind = catalog.classify(unwrapped.inner);

        let column_base = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}{separator}{}", field.name)
        };

        if unwrapped.is_list {
            for index in 0..config.max_array_items {
                let indexed = format!("{column_base}{separator}{index}");
                match kind {
                    InnerKind::Composite(nested) => {
                        collect(nested, catalog, config, &indexed, depth + 1, columns);
                    }
                    InnerKind::Primitive | InnerKind::Opaque => {
                        columns.push(to_case(&indexed, &config.case));
                    }
                }
            }
        } else {
            match kind {
                InnerKind::Composite(nested) => {
                    collect(nested, catalog, config, &column_base, depth + 1, columns);
                }
                InnerKind::Primitive | InnerKind::Opaque => {
                    columns.push(to_case(&column_base, &config.case));
                }
            }
        }
    }
}

/// Remove repeated names, keeping the first occurrence and its position.
pub fn dedup_columns(columns: Vec<String>) -> ColumnList {
    let mut seen = HashSet::with_capacity(columns.len());
    let unique = columns
        .into_iter()
        .filter(|column| seen.insert(column.clone()))
        .collect();
    ColumnList(unique)
}

/// Flatten and deduplicate in one step.
pub fn column_list(
    model: &ResourceModel,
    catalog: &dyn TypeCatalog,
    config: &FlattenConfig,
) -> ColumnList {
    dedup_columns(flatten(model, catalog, config))
}
