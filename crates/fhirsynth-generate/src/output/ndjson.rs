use std::io::Write;

use serde_json::{Map, Value};

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

use super::{CountingWriter, RecordWriter};

/// JSON Lines writer; each record is one object keyed by column name, in
/// column order.
pub struct NdjsonRecordWriter<W: Write> {
    inner: CountingWriter<W>,
    columns: Vec<String>,
}

impl<W: Write> NdjsonRecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: CountingWriter::new(inner),
            columns: Vec::new(),
        }
    }
}

impl<W: Write> RecordWriter for NdjsonRecordWriter<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), GenerationError> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_record(&mut self, values: &[GeneratedValue]) -> Result<(), GenerationError> {
        let mut object = Map::with_capacity(self.columns.len());
        for (column, value) in self.columns.iter().zip(values) {
            object.insert(column.clone(), value.to_json());
        }
        serde_json::to_writer(&mut self.inner, &Value::Object(object))?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<u64, GenerationError> {
        let mut inner = self.inner;
        inner.flush()?;
        Ok(inner.bytes_written())
    }
}
