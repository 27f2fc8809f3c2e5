use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ::parquet::basic::{Compression, ZstdLevel};
use chrono::NaiveDateTime;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

mod csv;
mod ndjson;
mod parquet;

pub use self::csv::CsvRecordWriter;
pub use self::ndjson::NdjsonRecordWriter;
pub use self::parquet::ParquetRecordWriter;

/// Encoding of the generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    Csv,
    Ndjson,
    /// Snappy-compressed parquet.
    Parquet,
    #[default]
    ParquetZstd,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Ndjson => "ndjson",
            OutputFormat::Parquet => "parquet",
            OutputFormat::ParquetZstd => "parquet+zstd",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Ndjson => "jsonl",
            OutputFormat::Parquet | OutputFormat::ParquetZstd => "parquet",
        }
    }

    /// Appended to the file stem of derived output paths.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            OutputFormat::ParquetZstd => "_zstd",
            _ => "",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = GenerationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "ndjson" | "jsonl" => Ok(OutputFormat::Ndjson),
            "parquet" => Ok(OutputFormat::Parquet),
            "parquet+zstd" | "parquet_zstd" => Ok(OutputFormat::ParquetZstd),
            _ => Err(GenerationError::UnknownFormat(value.to_string())),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = GenerationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(value: OutputFormat) -> Self {
        value.as_str().to_string()
    }
}

impl JsonSchema for OutputFormat {
    fn schema_name() -> String {
        "OutputFormat".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// Sink for generated records.
pub trait RecordWriter {
    fn write_header(&mut self, columns: &[String]) -> Result<(), GenerationError>;

    fn write_record(&mut self, values: &[GeneratedValue]) -> Result<(), GenerationError>;

    /// Flush and return the number of bytes written.
    fn finish(self: Box<Self>) -> Result<u64, GenerationError>;
}

/// Create `path` and open a writer for `format`.
pub fn open_writer(
    path: &Path,
    format: OutputFormat,
) -> Result<Box<dyn RecordWriter>, GenerationError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvRecordWriter::new(file)),
        OutputFormat::Ndjson => Box::new(NdjsonRecordWriter::new(file)),
        OutputFormat::Parquet => Box::new(ParquetRecordWriter::new(file, Compression::SNAPPY)),
        OutputFormat::ParquetZstd => Box::new(ParquetRecordWriter::new(
            file,
            Compression::ZSTD(ZstdLevel::default()),
        )),
    })
}

/// `{resource}_synthetic_{count}_{YYYYmmdd_HHMMSS}{suffix}.{ext}` inside `dir`.
pub fn default_output_path(
    dir: &Path,
    resource_type: &str,
    count: u64,
    format: OutputFormat,
    now: NaiveDateTime,
) -> PathBuf {
    dir.join(format!(
        "{}_synthetic_{}_{}{}.{}",
        resource_type.to_lowercase(),
        count,
        now.format("%Y%m%d_%H%M%S"),
        format.file_suffix(),
        format.extension()
    ))
}

pub(crate) struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    pub(crate) fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
