use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::DEFAULT_SEPARATOR;

/// Naming convention applied to column names.
///
/// Unrecognised style names are kept verbatim and leave names untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseStyle {
    #[default]
    Snake,
    Camel,
    Pascal,
    Preserve(String),
}

impl CaseStyle {
    pub fn as_str(&self) -> &str {
        match self {
            CaseStyle::Snake => "snake",
            CaseStyle::Camel => "camel",
            CaseStyle::Pascal => "pascal",
            CaseStyle::Preserve(raw) => raw,
        }
    }
}

impl From<&str> for CaseStyle {
    fn from(value: &str) -> Self {
        match value {
            "snake" => CaseStyle::Snake,
            "camel" => CaseStyle::Camel,
            "pascal" => CaseStyle::Pascal,
            other => CaseStyle::Preserve(other.to_string()),
        }
    }
}

impl From<String> for CaseStyle {
    fn from(value: String) -> Self {
        CaseStyle::from(value.as_str())
    }
}

impl From<CaseStyle> for String {
    fn from(value: CaseStyle) -> Self {
        value.as_str().to_string()
    }
}

impl JsonSchema for CaseStyle {
    fn schema_name() -> String {
        "CaseStyle".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules controlling how a resource model is flattened into columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FlattenConfig {
    /// Joins path segments and array indices.
    pub separator: String,
    /// Case style applied to every emitted column.
    pub case: CaseStyle,
    /// Nesting levels traversed; 0 yields no columns. Negative values clamp to 0.
    #[serde(deserialize_with = "non_negative")]
    #[schemars(with = "i64")]
    pub max_depth: usize,
    /// Indexed columns emitted per list field. Negative values clamp to 0.
    #[serde(deserialize_with = "non_negative")]
    #[schemars(with = "i64")]
    pub max_array_items: usize,
    /// Top-level fields to keep; empty keeps all.
    pub include_fields: BTreeSet<String>,
    /// Fields skipped at every depth.
    pub exclude_fields: BTreeSet<String>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            case: CaseStyle::Snake,
            max_depth: 3,
            max_array_items: 3,
            include_fields: BTreeSet::new(),
            exclude_fields: BTreeSet::new(),
        }
    }
}

impl FlattenConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_array_items(mut self, max_array_items: usize) -> Self {
        self.max_array_items = max_array_items;
        self
    }

    pub fn with_case(mut self, case: CaseStyle) -> Self {
        self.case = case;
        self
    }

    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields.extend(fields.into_iter().map(Into::into));
        self
    }
}

fn non_negative<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_limits_clamp_to_zero() {
        let config: FlattenConfig =
            serde_json::from_str(r#"{"max_depth": -2, "max_array_items": -1}"#)
                .expect("parse config");
        assert_eq!(config.max_depth, 0);
        assert_eq!(config.max_array_items, 0);
        assert_eq!(config.separator, "_");
    }

    #[test]
    fn unknown_case_style_is_preserved() {
        let config: FlattenConfig =
            serde_json::from_str(r#"{"case": "kebab"}"#).expect("parse config");
        assert_eq!(config.case, CaseStyle::Preserve("kebab".to_string()));

        let json = serde_json::to_value(&config).expect("serialize config");
        assert_eq!(json["case"], "kebab");
    }
}
