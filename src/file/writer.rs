// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Row-based file writer.
//!
//! [`SerializedFileWriter`] shreds appended records into an in-memory
//! row group buffer, flushes a row group (one column chunk per leaf)
//! whenever the configured row count is reached, and finishes the file
//! with the footer metadata block on [`SerializedFileWriter::close`].
//!
//! A shred error leaves the in-progress row group with misaligned
//! streams, so the writer refuses further records afterwards; closing
//! is still safe and keeps every previously flushed row group.

use std::io::Write;

use tracing::debug;

use crate::column::writer::write_column_chunk;
use crate::errors::{ParquetError, Result};
use crate::file::metadata::{
    ColumnChunkMetaData, FileMetaData, KeyValue, ParquetMetaData, RowGroupMetaData,
    FORMAT_VERSION,
};
use crate::file::properties::WriterPropertiesPtr;
use crate::file::PARQUET_MAGIC;
use crate::record::{shred_record, Row, RowGroupBuffer};
use crate::schema::types::SchemaDescPtr;
use crate::thrift::CompactWriter;

/// A [`Write`] wrapper that counts the bytes written through it.
pub struct TrackedWrite<W> {
    inner: W,
    bytes_written: usize,
}

impl<W: Write> TrackedWrite<W> {
    /// Wraps a [`Write`].
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for TrackedWrite<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Writes records into the Parquet file envelope.
pub struct SerializedFileWriter<W: Write> {
    buf: TrackedWrite<W>,
    schema: SchemaDescPtr,
    props: WriterPropertiesPtr,
    buffer: RowGroupBuffer,
    row_groups: Vec<RowGroupMetaData>,
    key_value_metadata: Vec<KeyValue>,
    poisoned: bool,
    closed: bool,
}

impl<W: Write> SerializedFileWriter<W> {
    /// Creates a writer over `sink`, writing the leading magic
    /// immediately.
    pub fn new(sink: W, schema: SchemaDescPtr, props: WriterPropertiesPtr) -> Result<Self> {
        let mut buf = TrackedWrite::new(sink);
        buf.write_all(&PARQUET_MAGIC)?;
        let buffer = RowGroupBuffer::new(schema.clone());
        Ok(Self {
            buf,
            schema,
            props,
            buffer,
            row_groups: Vec::new(),
            key_value_metadata: Vec::new(),
            poisoned: false,
            closed: false,
        })
    }

    /// Shreds one record into the current row group, flushing the group
    /// when it reaches the configured size.
    pub fn append_row(&mut self, row: &Row) -> Result<()> {
        self.ensure_usable()?;
        if let Err(e) = shred_record(&self.schema, row, &mut self.buffer) {
            self.poisoned = true;
            return Err(e);
        }
        if self.buffer.row_count() >= self.props.row_group_size() {
            self.flush_row_group()?;
        }
        Ok(())
    }

    /// Records a user key/value pair for the footer. Setting an
    /// existing key overwrites its value.
    pub fn set_metadata(&mut self, key: &str, value: &str) {
        match self
            .key_value_metadata
            .iter_mut()
            .find(|pair| pair.key == key)
        {
            Some(pair) => pair.value = Some(value.to_owned()),
            None => self
                .key_value_metadata
                .push(KeyValue::new(key.to_owned(), value.to_owned())),
        }
    }

    /// The schema this writer was created with.
    pub fn schema(&self) -> &SchemaDescPtr {
        &self.schema
    }

    /// Metadata of row groups flushed so far.
    pub fn flushed_row_groups(&self) -> &[RowGroupMetaData] {
        &self.row_groups
    }

    /// Finishes the file: flushes the pending row group and writes the
    /// footer. Idempotent; later calls are no-ops. After a shred error
    /// the pending (misaligned) row group is discarded and the file is
    /// finalized with the groups already flushed.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.poisoned {
            self.buffer.clear();
        }
        self.flush_row_group()?;
        self.write_footer()?;
        self.buf.flush()?;
        self.closed = true;
        debug!(
            row_groups = self.row_groups.len(),
            bytes = self.buf.bytes_written(),
            "closed file"
        );
        Ok(())
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.closed {
            return Err(config_err!("writer is already closed"));
        }
        if self.poisoned {
            return Err(config_err!(
                "writer is unusable after a failed shred; the column streams are misaligned"
            ));
        }
        Ok(())
    }

    fn flush_row_group(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let buffer =
            std::mem::replace(&mut self.buffer, RowGroupBuffer::new(self.schema.clone()));
        let num_rows = buffer.row_count();
        let mut chunks = Vec::with_capacity(buffer.columns().len());
        for column in buffer.columns() {
            let descr = column.descriptor().clone();
            let compression = descr
                .compression()
                .unwrap_or_else(|| self.props.compression());
            let encoded =
                write_column_chunk(column, num_rows, compression, self.props.data_page_v2())?;
            let data_page_offset = self.buf.bytes_written() as i64;
            self.buf.write_all(&encoded.bytes)?;
            chunks.push(
                ColumnChunkMetaData::builder(descr)
                    .set_encodings(encoded.encodings)
                    .set_compression(compression)
                    .set_num_values(encoded.num_values)
                    .set_total_uncompressed_size(encoded.total_uncompressed_size)
                    .set_total_compressed_size(encoded.total_compressed_size)
                    .set_data_page_offset(data_page_offset)
                    .set_statistics(encoded.statistics)
                    .build(),
            );
        }
        debug!(num_rows, columns = chunks.len(), "flushed row group");
        self.row_groups.push(RowGroupMetaData::new(chunks, num_rows as i64));
        Ok(())
    }

    fn write_footer(&mut self) -> Result<()> {
        let num_rows = self.row_groups.iter().map(|g| g.num_rows()).sum();
        let key_value_metadata = if self.key_value_metadata.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.key_value_metadata))
        };
        let metadata = ParquetMetaData::new(
            FileMetaData::new(
                FORMAT_VERSION,
                num_rows,
                Some(self.props.created_by().to_owned()),
                key_value_metadata,
                self.schema.clone(),
            ),
            std::mem::take(&mut self.row_groups),
        );

        let start = self.buf.bytes_written();
        metadata.write_thrift(&mut CompactWriter::new(&mut self.buf))?;
        let metadata_len = (self.buf.bytes_written() - start) as u32;
        self.buf.write_all(&metadata_len.to_le_bytes())?;
        self.buf.write_all(&PARQUET_MAGIC)?;
        self.row_groups = metadata.row_groups().to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::file::properties::WriterProperties;
    use crate::record::Field;
    use crate::record::shredder::tests::{dremel_record_a, row};
    use crate::schema::types::tests::doc_schema;

    #[test]
    fn test_file_starts_and_ends_with_magic() {
        let mut sink = Vec::new();
        let schema = Arc::new(doc_schema());
        let mut writer = SerializedFileWriter::new(
            &mut sink,
            schema,
            Arc::new(WriterProperties::default()),
        )
        .unwrap();
        writer.append_row(&dremel_record_a()).unwrap();
        writer.close().unwrap();
        assert_eq!(&sink[..4], b"PAR1");
        assert_eq!(&sink[sink.len() - 4..], b"PAR1");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut sink = Vec::new();
        let schema = Arc::new(doc_schema());
        let mut writer = SerializedFileWriter::new(
            &mut sink,
            schema,
            Arc::new(WriterProperties::default()),
        )
        .unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_append_after_close_fails() {
        let mut sink = Vec::new();
        let schema = Arc::new(doc_schema());
        let mut writer = SerializedFileWriter::new(
            &mut sink,
            schema,
            Arc::new(WriterProperties::default()),
        )
        .unwrap();
        writer.close().unwrap();
        let err = writer.append_row(&dremel_record_a()).unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));
    }

    #[test]
    fn test_writer_poisoned_after_shred_error() {
        let mut sink = Vec::new();
        let schema = Arc::new(doc_schema());
        let mut writer = SerializedFileWriter::new(
            &mut sink,
            schema,
            Arc::new(WriterProperties::default()),
        )
        .unwrap();
        // missing required DocId
        let bad = row(vec![("Links", Field::Group(Row::new()))]);
        assert!(writer.append_row(&bad).is_err());
        let err = writer.append_row(&dremel_record_a()).unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));
        // close still succeeds and produces a valid, empty file
        writer.close().unwrap();
        assert_eq!(&sink[sink.len() - 4..], b"PAR1");
    }

    #[test]
    fn test_row_group_flush_on_size() {
        let mut sink = Vec::new();
        let schema = Arc::new(doc_schema());
        let props = WriterProperties::builder().set_row_group_size(2).build();
        let mut writer =
            SerializedFileWriter::new(&mut sink, schema, Arc::new(props)).unwrap();
        for _ in 0..5 {
            writer.append_row(&dremel_record_a()).unwrap();
        }
        assert_eq!(writer.flushed_row_groups().len(), 2);
        writer.close().unwrap();
    }
}
