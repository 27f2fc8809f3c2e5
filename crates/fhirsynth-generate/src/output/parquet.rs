use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Date32Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

use super::{CountingWriter, RecordWriter};

/// Rows buffered before a record batch is handed to the parquet writer.
const BATCH_ROWS: usize = 8_192;
/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parquet writer; column types come from the first record.
pub struct ParquetRecordWriter<W: Write + Send> {
    sink: Sink<W>,
    compression: Compression,
    columns: Vec<String>,
    pending: Vec<Vec<GeneratedValue>>,
}

enum Sink<W: Write + Send> {
    Idle(CountingWriter<W>),
    Open {
        writer: ArrowWriter<CountingWriter<W>>,
        schema: SchemaRef,
    },
    Closed,
}

impl<W: Write + Send> ParquetRecordWriter<W> {
    pub fn new(inner: W, compression: Compression) -> Self {
        Self {
            sink: Sink::Idle(CountingWriter::new(inner)),
            compression,
            columns: Vec::new(),
            pending: Vec::with_capacity(BATCH_ROWS),
        }
    }

    fn open(&mut self, sample: Option<&[GeneratedValue]>) -> Result<(), GenerationError> {
        if !matches!(self.sink, Sink::Idle(_)) {
            return Ok(());
        }
        let Sink::Idle(inner) = std::mem::replace(&mut self.sink, Sink::Closed) else {
            return Ok(());
        };
        let fields: Vec<Field> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let data_type = sample
                    .and_then(|values| values.get(index))
                    .map(data_type_of)
                    .unwrap_or(DataType::Utf8);
                Field::new(column, data_type, true)
            })
            .collect();
        let schema: SchemaRef = Arc::new(Schema::new(fields));
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .build();
        let writer = ArrowWriter::try_new(inner, Arc::clone(&schema), Some(props))?;
        self.sink = Sink::Open { writer, schema };
        Ok(())
    }

    fn flush_batch(&mut self) -> Result<(), GenerationError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let sample = self.pending.first().cloned();
        self.open(sample.as_deref())?;
        let Sink::Open { writer, schema } = &mut self.sink else {
            return Err(GenerationError::Io(std::io::Error::other(
                "parquet writer already closed",
            )));
        };
        let arrays: Vec<ArrayRef> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| build_array(field.data_type(), &self.pending, index))
            .collect();
        let batch = RecordBatch::try_new(Arc::clone(schema), arrays)?;
        writer.write(&batch)?;
        self.pending.clear();
        Ok(())
    }
}

impl<W: Write + Send> RecordWriter for ParquetRecordWriter<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), GenerationError> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_record(&mut self, values: &[GeneratedValue]) -> Result<(), GenerationError> {
        self.pending.push(values.to_vec());
        if self.pending.len() >= BATCH_ROWS {
            self.flush_batch()?;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64, GenerationError> {
        self.flush_batch()?;
        // A run without records still gets a valid file with an all-text schema.
        self.open(None)?;
        let Sink::Open { writer, .. } = std::mem::replace(&mut self.sink, Sink::Closed) else {
            return Err(GenerationError::Io(std::io::Error::other(
                "parquet writer already closed",
            )));
        };
        let mut inner = writer.into_inner()?;
        inner.flush()?;
        Ok(inner.bytes_written())
    }
}

fn data_type_of(value: &GeneratedValue) -> DataType {
    match value {
        GeneratedValue::Bool(_) => DataType::Boolean,
        GeneratedValue::Int(_) => DataType::Int64,
        GeneratedValue::Date(_) => DataType::Date32,
        GeneratedValue::Null | GeneratedValue::Text(_) | GeneratedValue::Uuid(_) => {
            DataType::Utf8
        }
    }
}

/// Values that do not fit the column type are stored as nulls.
fn build_array(data_type: &DataType, rows: &[Vec<GeneratedValue>], index: usize) -> ArrayRef {
    let cells = rows.iter().map(|row| row.get(index));
    match data_type {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(rows.len());
            for cell in cells {
                match cell {
                    Some(GeneratedValue::Bool(value)) => builder.append_value(*value),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(rows.len());
            for cell in cells {
                match cell {
                    Some(GeneratedValue::Int(value)) => builder.append_value(*value),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Date32 => {
            let mut builder = Date32Builder::with_capacity(rows.len());
            for cell in cells {
                match cell {
                    Some(GeneratedValue::Date(date)) => {
                        builder.append_value(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
                    }
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        _ => {
            let mut builder = StringBuilder::new();
            for cell in cells {
                match cell {
                    None | Some(GeneratedValue::Null) => builder.append_null(),
                    Some(value) => builder.append_value(value.to_csv()),
                }
            }
            Arc::new(builder.finish())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Date32Type, Int64Type};
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use parquet::basic::ZstdLevel;

    use super::*;

    fn write(compression: Compression, rows: &[Vec<GeneratedValue>]) -> File {
        let mut buffer = Vec::new();
        let mut writer: Box<dyn RecordWriter + '_> =
            Box::new(ParquetRecordWriter::new(&mut buffer, compression));
        writer
            .write_header(&[
                "id".to_string(),
                "active".to_string(),
                "value_integer".to_string(),
                "birth_date".to_string(),
            ])
            .expect("header");
        for row in rows {
            writer.write_record(row).expect("record");
        }
        let bytes = writer.finish().expect("finish");
        assert_eq!(bytes, buffer.len() as u64);

        let mut file = tempfile::tempfile().expect("tempfile");
        file.write_all(&buffer).expect("write parquet bytes");
        file
    }

    #[test]
    fn infers_column_types_from_first_record() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).expect("valid date");
        let rows = vec![
            vec![
                GeneratedValue::Text("patient-000001".into()),
                GeneratedValue::Bool(true),
                GeneratedValue::Int(42),
                GeneratedValue::Date(date),
            ],
            vec![
                GeneratedValue::Text("patient-000002".into()),
                GeneratedValue::Text(String::new()),
                GeneratedValue::Int(7),
                GeneratedValue::Date(date),
            ],
        ];
        let file = write(Compression::ZSTD(ZstdLevel::default()), &rows);

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader");
        let compression = builder.metadata().row_group(0).column(0).compression();
        assert!(matches!(compression, Compression::ZSTD(_)));

        let batches: Vec<RecordBatch> = builder
            .build()
            .expect("reader")
            .collect::<Result<_, _>>()
            .expect("batches");
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Utf8);
        assert_eq!(batch.schema().field(1).data_type(), &DataType::Boolean);

        assert_eq!(batch.column(0).as_string::<i32>().value(1), "patient-000002");
        assert!(batch.column(1).as_boolean().value(0));
        assert!(batch.column(1).is_null(1));
        assert_eq!(batch.column(2).as_primitive::<Int64Type>().value(0), 42);
        assert_eq!(batch.column(3).as_primitive::<Date32Type>().value(0), 10);
    }

    #[test]
    fn empty_run_writes_text_schema() {
        let file = write(Compression::SNAPPY, &[]);
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader");
        let schema = builder.schema();
        assert_eq!(schema.fields().len(), 4);
        assert!(schema.fields().iter().all(|field| field.data_type() == &DataType::Utf8));
        assert_eq!(builder.metadata().file_metadata().num_rows(), 0);
    }
}
