use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fhirsynth_core::FlattenConfig;
use fhirsynth_generate::OutputFormat;
use fhirsynth_introspect::{
    BUILTIN_FHIR_VERSION, DiscoveryOptions, ResourceModel, ResourceProvider,
};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Fields that carry no tabular data in FHIR resources.
pub const DEFAULT_EXCLUDES: [&str; 4] = ["contained", "meta", "extension", "modifierExtension"];

const CONFIG_EXTENSIONS: [&str; 3] = ["jsonc", "json", "toml"];
const DEFAULT_CONFIG_STEM: &str = "fhirsynth";
const LISTED_RESOURCES: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json config: {0}")]
    Jsonc(#[from] json5::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid toml config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("configuration missing 'resource_type'")]
    MissingResourceType,
    #[error("resource '{resource}' not found; available resources: {available}")]
    UnknownResource { resource: String, available: String },
}

/// Generator configuration file (`.jsonc`, `.json` or `.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GeneratorConfig {
    /// FHIR resource type to generate, e.g. `Patient`.
    pub resource_type: String,
    pub fhir_version: String,
    /// Catalog document replacing the builtin one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    pub output: OutputSettings,
    pub schema: FlattenConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            resource_type: String::new(),
            fhir_version: BUILTIN_FHIR_VERSION.to_string(),
            catalog_path: None,
            output: OutputSettings::default(),
            schema: FlattenConfig::default().exclude(DEFAULT_EXCLUDES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// Output file; empty or missing derives a name inside `dir`.
    #[serde(
        deserialize_with = "empty_path_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<PathBuf>,
    pub dir: PathBuf,
    pub count: u64,
    /// Fixed seed for reproducible output; random when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Date used for non-birth date columns; today when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub base_date: Option<NaiveDate>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::ParquetZstd,
            path: None,
            dir: PathBuf::from("."),
            count: 1000,
            seed: None,
            base_date: None,
        }
    }
}

impl GeneratorConfig {
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            fhir_version: self.fhir_version.clone(),
            catalog_path: self.catalog_path.clone(),
            ..DiscoveryOptions::default()
        }
    }

    /// Look up the configured resource in `provider`.
    pub fn resolve_resource<'a>(
        &self,
        provider: &'a dyn ResourceProvider,
    ) -> Result<&'a ResourceModel, ConfigError> {
        let resource = self.resource_type.trim();
        if resource.is_empty() {
            return Err(ConfigError::MissingResourceType);
        }
        provider.resource(resource).ok_or_else(|| {
            let names = provider.resource_types();
            let mut available = names
                .iter()
                .take(LISTED_RESOURCES)
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            if names.len() > LISTED_RESOURCES {
                available.push_str(", ...");
            }
            ConfigError::UnknownResource {
                resource: resource.to_string(),
                available,
            }
        })
    }
}

fn empty_path_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<PathBuf>::deserialize(deserializer)?;
    Ok(value.filter(|path| !path.as_os_str().is_empty()))
}

pub fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let config = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        parse_jsonc(&content)?
    };
    Ok(config)
}

pub fn save_config(path: &Path, config: &GeneratorConfig) -> Result<(), ConfigError> {
    let encoded = if is_toml(path) {
        toml::to_string_pretty(config)?
    } else {
        let json = serde_json::to_string_pretty(config)?;
        format!("// fhirsynth configuration\n{json}\n")
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encoded)?;
    Ok(())
}

/// JSON with comments and trailing commas, read as JSON5.
pub fn parse_jsonc(content: &str) -> Result<GeneratorConfig, ConfigError> {
    Ok(json5::from_str(content)?)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// First existing `<base>.jsonc`, `<base>.json` or `<base>.toml`.
pub fn find_config_beside(base: &Path) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| base.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// Config named after the running executable, then `fhirsynth.*`, in `dir`.
pub fn find_default_config(dir: &Path) -> Option<PathBuf> {
    let exe_stem = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_os_string()));
    exe_stem
        .into_iter()
        .map(|stem| dir.join(stem))
        .chain(std::iter::once(dir.join(DEFAULT_CONFIG_STEM)))
        .find_map(|base| find_config_beside(&base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_trailing_commas() {
        let input = r#"{
  // resource to generate
  "resource_type": "Patient", /* inline */
  "output": {"path": "a//b.csv", "count": 10,},
  "schema": {"exclude_fields": ["meta",],},
}"#;
        let config = parse_jsonc(input).expect("parse config with comments");
        assert_eq!(config.resource_type, "Patient");
        assert_eq!(config.output.path, Some(PathBuf::from("a//b.csv")));
        assert_eq!(config.output.count, 10);
        assert_eq!(config.schema.exclude_fields.len(), 1);
    }

    #[test]
    fn keeps_escaped_quotes_inside_strings() {
        let input = r#"{"resource_type": "Pa\"//tient,}", /* note */ "fhir_version": "R4",}"#;
        let config = parse_jsonc(input).expect("parse config");
        assert_eq!(config.resource_type, "Pa\"//tient,}");
        assert_eq!(config.fhir_version, "R4");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = parse_jsonc("{}").expect("empty config");
        assert_eq!(config.fhir_version, "R4");
        assert_eq!(config.output.format, OutputFormat::ParquetZstd);
        assert_eq!(config.output.count, 1000);
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert_eq!(config.schema.max_depth, 3);
        assert!(config.schema.exclude_fields.contains("modifierExtension"));
    }

    #[test]
    fn empty_output_path_means_unset() {
        let config = parse_jsonc(r#"{"output": {"path": ""}}"#).expect("config");
        assert_eq!(config.output.path, None);
    }

    #[test]
    fn output_formats_load_by_name() {
        for (name, format) in [
            ("csv", OutputFormat::Csv),
            ("jsonl", OutputFormat::Ndjson),
            ("parquet", OutputFormat::Parquet),
            ("parquet+zstd", OutputFormat::ParquetZstd),
        ] {
            let input = format!(r#"{{"output": {{"format": "{name}"}}}}"#);
            let config = parse_jsonc(&input).expect("config");
            assert_eq!(config.output.format, format);
        }
        assert!(parse_jsonc(r#"{"output": {"format": "xlsx"}}"#).is_err());
    }

    #[test]
    fn round_trips_through_jsonc_and_toml_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut config = GeneratorConfig::default();
        config.resource_type = "Observation".to_string();
        config.output.seed = Some(9);
        config.output.format = OutputFormat::Parquet;
        config.output.base_date = NaiveDate::from_ymd_opt(2024, 2, 29);

        for name in ["cfg.jsonc", "cfg.toml"] {
            let path = temp.path().join(name);
            save_config(&path, &config).expect("save");
            let loaded = load_config(&path).expect("load");
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_config(Path::new("does/not/exist.jsonc")).expect_err("missing");
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn finds_config_by_extension_priority() {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path().join("fhirsynth");
        assert_eq!(find_config_beside(&base), None);

        std::fs::write(base.with_extension("toml"), "").expect("write toml");
        assert_eq!(find_config_beside(&base), Some(base.with_extension("toml")));

        std::fs::write(base.with_extension("jsonc"), "{}").expect("write jsonc");
        assert_eq!(find_config_beside(&base), Some(base.with_extension("jsonc")));
        assert_eq!(find_default_config(temp.path()), Some(base.with_extension("jsonc")));
    }

    #[test]
    fn resolves_resources_against_provider() {
        let provider =
            fhirsynth_introspect::CatalogProvider::builtin("R4").expect("builtin catalog");

        let mut config = GeneratorConfig::default();
        assert!(matches!(
            config.resolve_resource(&provider),
            Err(ConfigError::MissingResourceType)
        ));

        config.resource_type = "Spaceship".to_string();
        let err = config.resolve_resource(&provider).expect_err("unknown");
        let ConfigError::UnknownResource { available, .. } = err else {
            panic!("expected unknown resource");
        };
        assert!(available.contains("Patient"));

        config.resource_type = "Patient".to_string();
        let model = config.resolve_resource(&provider).expect("patient");
        assert_eq!(model.name, "Patient");
    }
}
