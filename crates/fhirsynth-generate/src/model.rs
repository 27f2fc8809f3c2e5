use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Output encoding.
    pub format: OutputFormat,
    /// Directory for generated files when `path` is not set.
    pub out_dir: PathBuf,
    /// Explicit output file.
    pub path: Option<PathBuf>,
    /// Number of records to generate.
    pub count: u64,
    /// Seed for the value generators.
    pub seed: u64,
    /// Date used for non-birth date columns.
    pub base_date: NaiveDate,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::ParquetZstd,
            out_dir: PathBuf::from("."),
            path: None,
            count: 1000,
            seed: 0,
            base_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub resource_type: String,
    pub records: u64,
    pub columns: usize,
    pub format: OutputFormat,
    pub output_path: PathBuf,
    pub bytes_written: u64,
    pub duration_ms: u128,
    /// Columns served by each generator id.
    pub generator_usage: BTreeMap<String, u64>,
    /// Columns no heuristic matched; they are written empty.
    pub fallback_count: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, resource_type: String, format: OutputFormat) -> Self {
        Self {
            run_id,
            resource_type,
            records: 0,
            columns: 0,
            format,
            output_path: PathBuf::new(),
            bytes_written: 0,
            duration_ms: 0,
            generator_usage: BTreeMap::new(),
            fallback_count: 0,
        }
    }

    pub fn record_generator_usage(&mut self, id: &str) {
        *self.generator_usage.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallback_count += 1;
    }

    /// Bytes written relative to a 10-byte-per-cell baseline.
    pub fn compression_ratio(&self) -> Option<f64> {
        let cells = self.records.checked_mul(self.columns as u64)?;
        if cells == 0 {
            return None;
        }
        Some(self.bytes_written as f64 / (cells as f64 * 10.0))
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes_written as f64 / 1024.0
    }
}
