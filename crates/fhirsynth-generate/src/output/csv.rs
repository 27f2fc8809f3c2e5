use std::io::Write;

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

use super::{CountingWriter, RecordWriter};

/// CSV writer with a header row and one row per record.
pub struct CsvRecordWriter<W: Write> {
    writer: csv::Writer<CountingWriter<W>>,
}

impl<W: Write> CsvRecordWriter<W> {
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(CountingWriter::new(inner));
        Self { writer }
    }
}

impl<W: Write> RecordWriter for CsvRecordWriter<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), GenerationError> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_record(&mut self, values: &[GeneratedValue]) -> Result<(), GenerationError> {
        self.writer
            .write_record(values.iter().map(GeneratedValue::to_csv))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<u64, GenerationError> {
        let mut writer = self.writer;
        writer.flush()?;
        let mut counting = writer.into_inner().map_err(|err| err.into_error())?;
        counting.flush()?;
        Ok(counting.bytes_written())
    }
}
