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

//! File reader and row/column cursors.
//!
//! [`SerializedFileReader`] validates the envelope and decodes the
//! footer eagerly; row groups are fetched lazily, one at a time, as a
//! cursor crosses into them. Any byte source implementing
//! [`ChunkReader`] works; [`File`] and in-memory [`Bytes`] are
//! provided. Independent cursors may read concurrently when the source
//! supports overlapping range reads; each cursor owns the decoded
//! buffers of its current row group.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::column::reader::read_column_chunk;
use crate::errors::{ParquetError, Result};
use crate::file::metadata::{KeyValue, ParquetMetaData};
use crate::file::{FOOTER_SIZE, PARQUET_MAGIC};
use crate::record::{
    materialize_column_values, materialize_records, ColumnBuffer, Field, Row,
    RowGroupBuffer,
};
use crate::schema::types::{
    ColumnPath, NodePtr, SchemaDescPtr, SchemaDescriptor, SchemaNode,
};

/// Byte-source length.
pub trait Length {
    /// Total size of the source in bytes.
    fn len(&self) -> u64;
}

/// A byte source supporting random range reads.
pub trait ChunkReader: Length {
    /// Reads `length` bytes starting at `start`.
    fn get_bytes(&self, start: u64, length: usize) -> Result<Bytes>;
}

impl Length for File {
    fn len(&self) -> u64 {
        self.metadata().map(|m| m.len()).unwrap_or(0)
    }
}

impl ChunkReader for File {
    fn get_bytes(&self, start: u64, length: usize) -> Result<Bytes> {
        let mut file = self.try_clone()?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; length];
        file.read_exact(&mut buf)?;
        Ok(buf.into())
    }
}

impl Length for Bytes {
    fn len(&self) -> u64 {
        Bytes::len(self) as u64
    }
}

impl ChunkReader for Bytes {
    fn get_bytes(&self, start: u64, length: usize) -> Result<Bytes> {
        let start = start as usize;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= Bytes::len(self))
            .ok_or_else(|| {
                corrupt_err!("byte range {}..{} outside the buffer", start, start + length)
            })?;
        Ok(self.slice(start..end))
    }
}

/// Validates both magics and the footer length, then decodes the
/// metadata block.
pub fn parse_footer<R: ChunkReader>(reader: &R) -> Result<ParquetMetaData> {
    let file_size = reader.len();
    if file_size < (PARQUET_MAGIC.len() + FOOTER_SIZE) as u64 {
        return Err(corrupt_err!(
            "file of {} bytes is smaller than the envelope",
            file_size
        ));
    }
    let header = reader.get_bytes(0, PARQUET_MAGIC.len())?;
    if header[..] != PARQUET_MAGIC {
        return Err(corrupt_err!("bad leading magic"));
    }
    let footer = reader.get_bytes(file_size - FOOTER_SIZE as u64, FOOTER_SIZE)?;
    if footer[4..] != PARQUET_MAGIC {
        return Err(corrupt_err!("bad trailing magic"));
    }
    let metadata_len = u32::from_le_bytes(footer[..4].try_into().unwrap()) as u64;
    let metadata_start = file_size
        .checked_sub(FOOTER_SIZE as u64 + metadata_len)
        .ok_or_else(|| {
            corrupt_err!(
                "footer declares {} metadata bytes in a {} byte file",
                metadata_len,
                file_size
            )
        })?;
    if metadata_start < PARQUET_MAGIC.len() as u64 {
        return Err(corrupt_err!(
            "metadata offset {} overlaps the leading magic",
            metadata_start
        ));
    }
    let metadata = reader.get_bytes(metadata_start, metadata_len as usize)?;
    ParquetMetaData::read_thrift(&metadata)
}

/// Reads records and columns out of one Parquet file.
#[derive(Debug)]
pub struct SerializedFileReader<R: ChunkReader> {
    chunk_reader: Arc<R>,
    metadata: Arc<ParquetMetaData>,
}

impl<R: ChunkReader> SerializedFileReader<R> {
    /// Opens the source: validates the envelope and decodes the footer.
    pub fn new(reader: R) -> Result<Self> {
        let metadata = Arc::new(parse_footer(&reader)?);
        debug!(
            row_groups = metadata.num_row_groups(),
            num_rows = metadata.file_metadata().num_rows(),
            "opened file"
        );
        Ok(Self {
            chunk_reader: Arc::new(reader),
            metadata,
        })
    }

    /// All metadata decoded from the footer.
    pub fn metadata(&self) -> &ParquetMetaData {
        &self.metadata
    }

    /// The file's schema.
    pub fn schema(&self) -> &SchemaDescPtr {
        self.metadata.file_metadata().schema_descr()
    }

    /// Total record count.
    pub fn num_rows(&self) -> i64 {
        self.metadata.file_metadata().num_rows()
    }

    /// User key/value metadata from the footer.
    pub fn key_value_metadata(&self) -> Option<&Vec<KeyValue>> {
        self.metadata.file_metadata().key_value_metadata()
    }

    /// Returns a record cursor. With a projection, only the named
    /// columns are fetched and the yielded rows contain only them.
    pub fn get_row_iter(&self, projection: Option<Vec<ColumnPath>>) -> Result<RowIter<R>> {
        let schema = match projection {
            Some(paths) => Arc::new(prune_schema(self.schema(), &paths)?),
            None => self.schema().clone(),
        };
        Ok(RowIter {
            reader: self.chunk_reader.clone(),
            metadata: self.metadata.clone(),
            schema,
            group_index: 0,
            rows: Vec::new().into_iter(),
            finished: false,
        })
    }

    /// Returns a lazy per-row cursor over one column: scalars for flat
    /// columns, nested lists under repeated ancestry, `Field::Null` for
    /// absent positions.
    pub fn get_column_iter(&self, path: &ColumnPath) -> Result<ColumnValueIter<R>> {
        let index = self
            .schema()
            .index_of(path)
            .ok_or_else(|| schema_err!("no column with path '{}'", path))?;
        Ok(ColumnValueIter {
            reader: self.chunk_reader.clone(),
            metadata: self.metadata.clone(),
            column_index: index,
            group_index: 0,
            values: Vec::new().into_iter(),
            finished: false,
        })
    }

    /// Releases the byte source. Dropping the reader has the same
    /// effect; this form makes the hand-back explicit.
    pub fn close(self) -> Result<()> {
        Ok(())
    }

    /// Decodes one row group into column streams, honoring the given
    /// (possibly pruned) schema.
    pub fn read_row_group(&self, index: usize, schema: &SchemaDescPtr) -> Result<RowGroupBuffer> {
        read_row_group(&self.chunk_reader, &self.metadata, index, schema)
    }
}

fn read_row_group<R: ChunkReader>(
    reader: &Arc<R>,
    metadata: &Arc<ParquetMetaData>,
    index: usize,
    schema: &SchemaDescPtr,
) -> Result<RowGroupBuffer> {
    let row_group = metadata.row_group(index);
    let full_schema = metadata.file_metadata().schema_descr();
    let mut columns = Vec::with_capacity(schema.num_columns());
    for descr in schema.columns() {
        let chunk_index = full_schema
            .index_of(descr.path())
            .ok_or_else(|| schema_err!("no column with path '{}'", descr.path()))?;
        let chunk = row_group.column(chunk_index);
        let bytes = reader.get_bytes(
            chunk.data_page_offset() as u64,
            chunk.total_compressed_size() as usize,
        )?;
        columns.push(read_column_chunk(
            &bytes,
            descr.clone(),
            chunk.compression(),
            chunk.num_values(),
        )?);
    }
    debug!(index, columns = columns.len(), "fetched row group");
    Ok(RowGroupBuffer::from_parts(
        schema.clone(),
        columns,
        row_group.num_rows() as usize,
    ))
}

fn read_one_column<R: ChunkReader>(
    reader: &Arc<R>,
    metadata: &Arc<ParquetMetaData>,
    group_index: usize,
    column_index: usize,
) -> Result<(ColumnBuffer, usize)> {
    let row_group = metadata.row_group(group_index);
    let chunk = row_group.column(column_index);
    let descr = metadata
        .file_metadata()
        .schema_descr()
        .column(column_index);
    let bytes = reader.get_bytes(
        chunk.data_page_offset() as u64,
        chunk.total_compressed_size() as usize,
    )?;
    let column = read_column_chunk(&bytes, descr, chunk.compression(), chunk.num_values())?;
    Ok((column, row_group.num_rows() as usize))
}

/// Keeps only the selected leaves, dropping groups left without any.
fn prune_schema(schema: &SchemaDescPtr, paths: &[ColumnPath]) -> Result<SchemaDescriptor> {
    let keep: HashSet<&ColumnPath> = paths.iter().collect();
    for path in &keep {
        if schema.index_of(path).is_none() {
            return Err(schema_err!("no column with path '{}'", path));
        }
    }
    let root = schema.root();
    let mut prefix = Vec::new();
    let mut fields = Vec::new();
    for field in root.fields() {
        if let Some(kept) = prune_node(field, &mut prefix, &keep)? {
            fields.push(kept);
        }
    }
    let pruned = SchemaNode::group_builder(root.name())
        .with_fields(fields)
        .build()?;
    SchemaDescriptor::new(pruned)
}

fn prune_node(
    node: &NodePtr,
    prefix: &mut Vec<String>,
    keep: &HashSet<&ColumnPath>,
) -> Result<Option<NodePtr>> {
    prefix.push(node.name().to_owned());
    let result = if node.is_leaf() {
        let path = ColumnPath::new(prefix.clone());
        if keep.contains(&path) {
            Some(node.clone())
        } else {
            None
        }
    } else {
        let mut fields = Vec::new();
        for field in node.fields() {
            if let Some(kept) = prune_node(field, prefix, keep)? {
                fields.push(kept);
            }
        }
        if fields.is_empty() {
            None
        } else {
            let mut builder = SchemaNode::group_builder(node.name()).with_fields(fields);
            if let Some(repetition) = node.repetition() {
                builder = builder.with_repetition(repetition);
            }
            Some(builder.build()?)
        }
    };
    prefix.pop();
    Ok(result)
}

/// A cursor over records, fetching row groups lazily in file order.
pub struct RowIter<R: ChunkReader> {
    reader: Arc<R>,
    metadata: Arc<ParquetMetaData>,
    schema: SchemaDescPtr,
    group_index: usize,
    rows: std::vec::IntoIter<Row>,
    finished: bool,
}

impl<R: ChunkReader> RowIter<R> {
    /// Stops the cursor: the current row group buffer is released and
    /// no further records are produced.
    pub fn close(&mut self) {
        self.finished = true;
        self.rows = Vec::new().into_iter();
    }
}

impl<R: ChunkReader> Iterator for RowIter<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(row) = self.rows.next() {
                return Some(Ok(row));
            }
            if self.group_index >= self.metadata.num_row_groups() {
                self.finished = true;
                return None;
            }
            let index = self.group_index;
            self.group_index += 1;
            let buffer =
                match read_row_group(&self.reader, &self.metadata, index, &self.schema) {
                    Ok(buffer) => buffer,
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                };
            match materialize_records(&self.schema, &buffer) {
                Ok(rows) => self.rows = rows.into_iter(),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// A cursor over one column's per-row values, fetching that column's
/// chunk of each row group lazily.
pub struct ColumnValueIter<R: ChunkReader> {
    reader: Arc<R>,
    metadata: Arc<ParquetMetaData>,
    column_index: usize,
    group_index: usize,
    values: std::vec::IntoIter<Field>,
    finished: bool,
}

impl<R: ChunkReader> ColumnValueIter<R> {
    /// Stops the cursor and releases its buffers.
    pub fn close(&mut self) {
        self.finished = true;
        self.values = Vec::new().into_iter();
    }
}

impl<R: ChunkReader> Iterator for ColumnValueIter<R> {
    type Item = Result<Field>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(value) = self.values.next() {
                return Some(Ok(value));
            }
            if self.group_index >= self.metadata.num_row_groups() {
                self.finished = true;
                return None;
            }
            let index = self.group_index;
            self.group_index += 1;
            let decoded = read_one_column(
                &self.reader,
                &self.metadata,
                index,
                self.column_index,
            )
            .and_then(|(column, num_rows)| materialize_column_values(&column, num_rows));
            match decoded {
                Ok(values) => self.values = values.into_iter(),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: ChunkReader> IntoIterator for SerializedFileReader<R> {
    type Item = Result<Row>;
    type IntoIter = RowIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        RowIter {
            reader: self.chunk_reader.clone(),
            schema: self.schema().clone(),
            metadata: self.metadata.clone(),
            group_index: 0,
            rows: Vec::new().into_iter(),
            finished: false,
        }
    }
}

impl TryFrom<File> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(file: File) -> Result<Self> {
        Self::new(file)
    }
}

impl<'a> TryFrom<&'a Path> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: &Path) -> Result<Self> {
        Self::try_from(File::open(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::file::properties::WriterProperties;
    use crate::file::writer::SerializedFileWriter;
    use crate::record::shredder::tests::{dremel_record_a, dremel_record_b};
    use crate::schema::types::tests::doc_schema;

    fn write_sample() -> Bytes {
        let mut sink = Vec::new();
        let schema = Arc::new(doc_schema());
        let mut writer = SerializedFileWriter::new(
            &mut sink,
            schema,
            Arc::new(WriterProperties::default()),
        )
        .unwrap();
        writer.append_row(&dremel_record_a()).unwrap();
        writer.append_row(&dremel_record_b()).unwrap();
        writer.set_metadata("origin", "reader-test");
        writer.close().unwrap();
        sink.into()
    }

    #[test]
    fn test_read_back_records() {
        let reader = SerializedFileReader::new(write_sample()).unwrap();
        assert_eq!(reader.num_rows(), 2);
        let rows: Vec<Row> = reader
            .get_row_iter(None)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec![dremel_record_a(), dremel_record_b()]);
    }

    #[test]
    fn test_metadata_exposed() {
        let reader = SerializedFileReader::new(write_sample()).unwrap();
        let pairs = reader.key_value_metadata().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key, "origin");
        assert_eq!(pairs[0].value.as_deref(), Some("reader-test"));
        assert!(reader
            .metadata()
            .file_metadata()
            .created_by()
            .unwrap()
            .starts_with("parquetry"));
    }

    #[test]
    fn test_projection() {
        let reader = SerializedFileReader::new(write_sample()).unwrap();
        let rows: Vec<Row> = reader
            .get_row_iter(Some(vec![
                ColumnPath::from("DocId"),
                ColumnPath::from("Name.Url"),
            ]))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].get("DocId").is_some());
        assert!(rows[0].get("Name").is_some());
        assert!(rows[0].get("Links").is_none());

        let err = reader
            .get_row_iter(Some(vec![ColumnPath::from("Missing")]))
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, ParquetError::SchemaMismatch(_)));
    }

    #[test]
    fn test_column_cursor() {
        let reader = SerializedFileReader::new(write_sample()).unwrap();
        let values: Vec<Field> = reader
            .get_column_iter(&ColumnPath::from("DocId"))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(values, vec![Field::Long(10), Field::Long(20)]);
    }

    #[test]
    fn test_cursor_close_stops_iteration() {
        let reader = SerializedFileReader::new(write_sample()).unwrap();
        let mut iter = reader.get_row_iter(None).unwrap();
        assert!(iter.next().is_some());
        iter.close();
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_corrupt_trailing_magic() {
        let mut data = write_sample().to_vec();
        let n = data.len();
        data[n - 1] = b'X';
        let err = SerializedFileReader::new(Bytes::from(data)).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_corrupt_leading_magic() {
        let mut data = write_sample().to_vec();
        data[0] = b'X';
        let err = SerializedFileReader::new(Bytes::from(data)).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_footer_length_exceeding_file() {
        let data = Bytes::from(vec![
            255, 255, 0, 0, b'P', b'A', b'R', b'1',
        ]);
        let err = SerializedFileReader::new(data).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_metadata_offset_overlapping_magic() {
        // 13-byte file: magic + 1 byte + 8-byte footer claiming 2
        // metadata bytes, which would start inside the leading magic
        let mut data = b"PAR1x".to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(b"PAR1");
        let err = SerializedFileReader::new(Bytes::from(data)).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_file_smaller_than_envelope() {
        let err = SerializedFileReader::new(Bytes::from(vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }
}
