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

//! File, row group and column chunk metadata, and its serialized form.
//!
//! The footer carries a `FileMetaData` struct in the Thrift compact
//! protocol: format version, the pre-order schema, the total row count,
//! one entry per row group with its column chunks, user key/value
//! pairs, and the writer's identity.

use std::sync::Arc;

use crate::basic::{Compression, Encoding, Type};
use crate::errors::{ParquetError, Result};
use crate::file::statistics::Statistics;
use crate::schema::flat::{self, SchemaElement};
use crate::schema::types::{ColumnDescPtr, ColumnPath, SchemaDescPtr, SchemaDescriptor};
use crate::thrift::{CompactSliceReader, CompactWriter, FieldType};

/// The format version this crate writes.
pub const FORMAT_VERSION: i32 = 1;

/// A user-supplied key/value pair stored in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The key.
    pub key: String,
    /// The value; the format allows key-only entries.
    pub value: Option<String>,
}

impl KeyValue {
    /// Creates a pair with a value.
    pub fn new(key: String, value: String) -> Self {
        Self {
            key,
            value: Some(value),
        }
    }
}

/// Metadata for one column chunk.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
    column_descr: ColumnDescPtr,
    encodings: Vec<Encoding>,
    compression: Compression,
    num_values: i64,
    total_uncompressed_size: i64,
    total_compressed_size: i64,
    data_page_offset: i64,
    statistics: Option<Statistics>,
}

impl ColumnChunkMetaData {
    /// Returns a builder for the given column.
    pub fn builder(column_descr: ColumnDescPtr) -> ColumnChunkMetaDataBuilder {
        ColumnChunkMetaDataBuilder::new(column_descr)
    }

    /// Descriptor of the column this chunk stores.
    pub fn column_descr(&self) -> &ColumnDescPtr {
        &self.column_descr
    }

    /// Path of the column.
    pub fn column_path(&self) -> &ColumnPath {
        self.column_descr.path()
    }

    /// Compression applied to this chunk's pages.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Total number of level positions (values plus placeholders).
    pub fn num_values(&self) -> i64 {
        self.num_values
    }

    /// Size of the chunk's pages before compression, headers included.
    pub fn total_uncompressed_size(&self) -> i64 {
        self.total_uncompressed_size
    }

    /// Size of the chunk's pages as stored.
    pub fn total_compressed_size(&self) -> i64 {
        self.total_compressed_size
    }

    /// Byte offset of the first data page in the file.
    pub fn data_page_offset(&self) -> i64 {
        self.data_page_offset
    }

    /// Value encodings present in this chunk.
    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    /// Statistics recorded for this chunk, if any.
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    fn write_thrift<W: std::io::Write>(&self, w: &mut CompactWriter<W>) -> Result<()> {
        // ColumnChunk wrapper: deprecated file_offset, then meta_data
        w.write_field_begin(FieldType::I64, 2, 0)?;
        w.write_i64(self.data_page_offset)?;
        w.write_field_begin(FieldType::Struct, 3, 2)?;
        {
            w.write_field_begin(FieldType::I32, 1, 0)?;
            w.write_i32(self.column_descr.physical_type().as_wire())?;
            w.write_field_begin(FieldType::List, 2, 1)?;
            w.write_list_begin(FieldType::I32, self.encodings.len())?;
            for encoding in &self.encodings {
                w.write_i32(encoding.as_wire())?;
            }
            w.write_field_begin(FieldType::List, 3, 2)?;
            let parts = self.column_descr.path().parts();
            w.write_list_begin(FieldType::Binary, parts.len())?;
            for part in parts {
                w.write_str(part)?;
            }
            w.write_field_begin(FieldType::I32, 4, 3)?;
            w.write_i32(self.compression.as_wire())?;
            w.write_field_begin(FieldType::I64, 5, 4)?;
            w.write_i64(self.num_values)?;
            w.write_field_begin(FieldType::I64, 6, 5)?;
            w.write_i64(self.total_uncompressed_size)?;
            w.write_field_begin(FieldType::I64, 7, 6)?;
            w.write_i64(self.total_compressed_size)?;
            w.write_field_begin(FieldType::I64, 9, 7)?;
            w.write_i64(self.data_page_offset)?;
            if let Some(statistics) = &self.statistics {
                w.write_field_begin(FieldType::Struct, 12, 9)?;
                statistics.write_thrift(w)?;
            }
            w.write_struct_end()?;
        }
        w.write_struct_end()
    }
}

/// Builder for [`ColumnChunkMetaData`].
pub struct ColumnChunkMetaDataBuilder {
    inner: ColumnChunkMetaData,
}

impl ColumnChunkMetaDataBuilder {
    fn new(column_descr: ColumnDescPtr) -> Self {
        Self {
            inner: ColumnChunkMetaData {
                column_descr,
                encodings: Vec::new(),
                compression: Compression::UNCOMPRESSED,
                num_values: 0,
                total_uncompressed_size: 0,
                total_compressed_size: 0,
                data_page_offset: 0,
                statistics: None,
            },
        }
    }

    /// Sets the value encodings present in the chunk.
    pub fn set_encodings(mut self, encodings: Vec<Encoding>) -> Self {
        self.inner.encodings = encodings;
        self
    }

    /// Sets the chunk's compression.
    pub fn set_compression(mut self, compression: Compression) -> Self {
        self.inner.compression = compression;
        self
    }

    /// Sets the number of level positions.
    pub fn set_num_values(mut self, num_values: i64) -> Self {
        self.inner.num_values = num_values;
        self
    }

    /// Sets the uncompressed page size total.
    pub fn set_total_uncompressed_size(mut self, size: i64) -> Self {
        self.inner.total_uncompressed_size = size;
        self
    }

    /// Sets the stored page size total.
    pub fn set_total_compressed_size(mut self, size: i64) -> Self {
        self.inner.total_compressed_size = size;
        self
    }

    /// Sets the offset of the first data page.
    pub fn set_data_page_offset(mut self, offset: i64) -> Self {
        self.inner.data_page_offset = offset;
        self
    }

    /// Attaches statistics.
    pub fn set_statistics(mut self, statistics: Statistics) -> Self {
        self.inner.statistics = Some(statistics);
        self
    }

    /// Builds the metadata.
    pub fn build(self) -> ColumnChunkMetaData {
        self.inner
    }
}

/// Metadata for one row group.
#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
    columns: Vec<ColumnChunkMetaData>,
    num_rows: i64,
    total_byte_size: i64,
}

impl RowGroupMetaData {
    /// Creates row group metadata from its column chunks.
    pub fn new(columns: Vec<ColumnChunkMetaData>, num_rows: i64) -> Self {
        let total_byte_size = columns.iter().map(|c| c.total_compressed_size()).sum();
        Self {
            columns,
            num_rows,
            total_byte_size,
        }
    }

    /// Number of records in this row group.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    /// Stored size of all column chunks.
    pub fn total_byte_size(&self) -> i64 {
        self.total_byte_size
    }

    /// Column chunks in schema order.
    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    /// Chunk metadata of column `i`.
    pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
        &self.columns[i]
    }

    fn write_thrift<W: std::io::Write>(&self, w: &mut CompactWriter<W>) -> Result<()> {
        w.write_field_begin(FieldType::List, 1, 0)?;
        w.write_list_begin(FieldType::Struct, self.columns.len())?;
        for column in &self.columns {
            column.write_thrift(w)?;
        }
        w.write_field_begin(FieldType::I64, 2, 1)?;
        w.write_i64(self.total_byte_size)?;
        w.write_field_begin(FieldType::I64, 3, 2)?;
        w.write_i64(self.num_rows)?;
        w.write_struct_end()
    }
}

/// File-level metadata: version, counts, schema, writer identity and
/// user pairs.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    version: i32,
    num_rows: i64,
    created_by: Option<String>,
    key_value_metadata: Option<Vec<KeyValue>>,
    schema_descr: SchemaDescPtr,
}

impl FileMetaData {
    /// Creates file metadata.
    pub fn new(
        version: i32,
        num_rows: i64,
        created_by: Option<String>,
        key_value_metadata: Option<Vec<KeyValue>>,
        schema_descr: SchemaDescPtr,
    ) -> Self {
        Self {
            version,
            num_rows,
            created_by,
            key_value_metadata,
            schema_descr,
        }
    }

    /// Format version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Total number of records in the file.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    /// Identity string of the writer, if recorded.
    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// User key/value pairs, if any.
    pub fn key_value_metadata(&self) -> Option<&Vec<KeyValue>> {
        self.key_value_metadata.as_ref()
    }

    /// The file's schema.
    pub fn schema_descr(&self) -> &SchemaDescPtr {
        &self.schema_descr
    }
}

/// All metadata of one file.
#[derive(Debug, Clone)]
pub struct ParquetMetaData {
    file_metadata: FileMetaData,
    row_groups: Vec<RowGroupMetaData>,
}

impl ParquetMetaData {
    /// Creates file metadata with its row groups.
    pub fn new(file_metadata: FileMetaData, row_groups: Vec<RowGroupMetaData>) -> Self {
        Self {
            file_metadata,
            row_groups,
        }
    }

    /// File-level metadata.
    pub fn file_metadata(&self) -> &FileMetaData {
        &self.file_metadata
    }

    /// Number of row groups.
    pub fn num_row_groups(&self) -> usize {
        self.row_groups.len()
    }

    /// Metadata of row group `i`.
    pub fn row_group(&self, i: usize) -> &RowGroupMetaData {
        &self.row_groups[i]
    }

    /// All row groups in file order.
    pub fn row_groups(&self) -> &[RowGroupMetaData] {
        &self.row_groups
    }

    /// Serializes the footer metadata block.
    pub(crate) fn write_thrift<W: std::io::Write>(
        &self,
        w: &mut CompactWriter<W>,
    ) -> Result<()> {
        let meta = &self.file_metadata;
        w.write_field_begin(FieldType::I32, 1, 0)?;
        w.write_i32(meta.version)?;

        let elements = flat::to_elements(meta.schema_descr.root());
        w.write_field_begin(FieldType::List, 2, 1)?;
        w.write_list_begin(FieldType::Struct, elements.len())?;
        for element in &elements {
            element.write_thrift(w)?;
        }

        w.write_field_begin(FieldType::I64, 3, 2)?;
        w.write_i64(meta.num_rows)?;

        w.write_field_begin(FieldType::List, 4, 3)?;
        w.write_list_begin(FieldType::Struct, self.row_groups.len())?;
        for row_group in &self.row_groups {
            row_group.write_thrift(w)?;
        }
        let mut last_id = 4i16;

        if let Some(pairs) = &meta.key_value_metadata {
            w.write_field_begin(FieldType::List, 5, last_id)?;
            w.write_list_begin(FieldType::Struct, pairs.len())?;
            for pair in pairs {
                w.write_field_begin(FieldType::Binary, 1, 0)?;
                w.write_str(&pair.key)?;
                if let Some(value) = &pair.value {
                    w.write_field_begin(FieldType::Binary, 2, 1)?;
                    w.write_str(value)?;
                }
                w.write_struct_end()?;
            }
            last_id = 5;
        }
        if let Some(created_by) = &meta.created_by {
            w.write_field_begin(FieldType::Binary, 6, last_id)?;
            w.write_str(created_by)?;
        }
        w.write_struct_end()
    }

    /// Parses the footer metadata block.
    pub(crate) fn read_thrift(buf: &[u8]) -> Result<Self> {
        let mut r = CompactSliceReader::new(buf);
        let mut version = None;
        let mut elements: Option<Vec<SchemaElement>> = None;
        let mut num_rows = None;
        let mut raw_row_groups: Option<Vec<RawRowGroup>> = None;
        let mut key_value_metadata = None;
        let mut created_by = None;

        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => version = Some(r.read_i32()?),
                    2 => {
                        let list = r.read_list_meta()?;
                        let mut parsed = Vec::with_capacity(list.size);
                        for _ in 0..list.size {
                            parsed.push(SchemaElement::read_thrift(&mut r)?);
                        }
                        elements = Some(parsed);
                    }
                    3 => num_rows = Some(r.read_i64()?),
                    4 => {
                        let list = r.read_list_meta()?;
                        let mut parsed = Vec::with_capacity(list.size);
                        for _ in 0..list.size {
                            parsed.push(RawRowGroup::read_thrift(&mut r)?);
                        }
                        raw_row_groups = Some(parsed);
                    }
                    5 => {
                        let list = r.read_list_meta()?;
                        let mut pairs = Vec::with_capacity(list.size);
                        for _ in 0..list.size {
                            pairs.push(read_key_value(&mut r)?);
                        }
                        key_value_metadata = Some(pairs);
                    }
                    6 => created_by = Some(r.read_string()?),
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }

        let elements =
            elements.ok_or_else(|| corrupt_err!("file metadata without a schema"))?;
        let root = flat::from_elements(&elements)?;
        let schema_descr = Arc::new(SchemaDescriptor::new(root)?);

        let mut row_groups = Vec::new();
        for raw in raw_row_groups.unwrap_or_default() {
            row_groups.push(raw.resolve(&schema_descr)?);
        }

        let file_metadata = FileMetaData::new(
            version.ok_or_else(|| corrupt_err!("file metadata without a version"))?,
            num_rows.ok_or_else(|| corrupt_err!("file metadata without a row count"))?,
            created_by,
            key_value_metadata,
            schema_descr,
        );
        Ok(ParquetMetaData::new(file_metadata, row_groups))
    }
}

fn read_key_value(r: &mut CompactSliceReader<'_>) -> Result<KeyValue> {
    let mut key = None;
    let mut value = None;
    let mut last_id = 0i16;
    loop {
        let field = r.read_field_meta(last_id)?;
        match field.field_type {
            FieldType::Stop => break,
            _ => match field.id {
                1 => key = Some(r.read_string()?),
                2 => value = Some(r.read_string()?),
                _ => r.skip(field.field_type)?,
            },
        }
        last_id = field.id;
    }
    Ok(KeyValue {
        key: key.ok_or_else(|| corrupt_err!("key/value pair without a key"))?,
        value,
    })
}

/// Row group structure as parsed, before column paths are resolved
/// against the schema.
struct RawRowGroup {
    columns: Vec<RawColumnChunk>,
    total_byte_size: i64,
    num_rows: i64,
}

impl RawRowGroup {
    fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut columns = Vec::new();
        let mut total_byte_size = None;
        let mut num_rows = None;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => {
                        let list = r.read_list_meta()?;
                        for _ in 0..list.size {
                            columns.push(RawColumnChunk::read_thrift(r)?);
                        }
                    }
                    2 => total_byte_size = Some(r.read_i64()?),
                    3 => num_rows = Some(r.read_i64()?),
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        Ok(Self {
            columns,
            total_byte_size: total_byte_size
                .ok_or_else(|| corrupt_err!("row group without a byte size"))?,
            num_rows: num_rows
                .ok_or_else(|| corrupt_err!("row group without a row count"))?,
        })
    }

    fn resolve(self, schema: &SchemaDescriptor) -> Result<RowGroupMetaData> {
        if self.columns.len() != schema.num_columns() {
            return Err(corrupt_err!(
                "row group has {} column chunks for a schema of {} columns",
                self.columns.len(),
                schema.num_columns()
            ));
        }
        let mut columns = Vec::with_capacity(self.columns.len());
        for raw in self.columns {
            let path = ColumnPath::new(raw.path);
            let descr = schema.column_by_path(&path).ok_or_else(|| {
                corrupt_err!("column chunk path '{}' is not in the schema", path)
            })?;
            let declared = Type::try_from(raw.physical_type)?;
            if declared != descr.physical_type() {
                return Err(corrupt_err!(
                    "column '{}' declares {} but the schema says {}",
                    path,
                    declared,
                    descr.physical_type()
                ));
            }
            let mut encodings = Vec::with_capacity(raw.encodings.len());
            for tag in raw.encodings {
                encodings.push(Encoding::try_from(tag)?);
            }
            columns.push(ColumnChunkMetaData {
                column_descr: descr,
                encodings,
                compression: Compression::try_from(raw.codec)?,
                num_values: raw.num_values,
                total_uncompressed_size: raw.total_uncompressed_size,
                total_compressed_size: raw.total_compressed_size,
                data_page_offset: raw.data_page_offset,
                statistics: raw.statistics,
            });
        }
        Ok(RowGroupMetaData {
            columns,
            num_rows: self.num_rows,
            total_byte_size: self.total_byte_size,
        })
    }
}

/// Column chunk structure as parsed from the footer.
struct RawColumnChunk {
    physical_type: i32,
    encodings: Vec<i32>,
    path: Vec<String>,
    codec: i32,
    num_values: i64,
    total_uncompressed_size: i64,
    total_compressed_size: i64,
    data_page_offset: i64,
    statistics: Option<Statistics>,
}

impl RawColumnChunk {
    fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut meta = None;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    3 => meta = Some(Self::read_column_meta(r)?),
                    // file_path, file_offset and the index fields are
                    // not modeled
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        meta.ok_or_else(|| corrupt_err!("column chunk without embedded metadata"))
    }

    fn read_column_meta(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut physical_type = None;
        let mut encodings = Vec::new();
        let mut path = Vec::new();
        let mut codec = None;
        let mut num_values = None;
        let mut total_uncompressed_size = None;
        let mut total_compressed_size = None;
        let mut data_page_offset = None;
        let mut statistics = None;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => physical_type = Some(r.read_i32()?),
                    2 => {
                        let list = r.read_list_meta()?;
                        for _ in 0..list.size {
                            encodings.push(r.read_i32()?);
                        }
                    }
                    3 => {
                        let list = r.read_list_meta()?;
                        for _ in 0..list.size {
                            path.push(r.read_string()?);
                        }
                    }
                    4 => codec = Some(r.read_i32()?),
                    5 => num_values = Some(r.read_i64()?),
                    6 => total_uncompressed_size = Some(r.read_i64()?),
                    7 => total_compressed_size = Some(r.read_i64()?),
                    9 => data_page_offset = Some(r.read_i64()?),
                    12 => statistics = Some(Statistics::read_thrift(r)?),
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        let missing = |name: &str| corrupt_err!("column chunk metadata without {}", name);
        Ok(Self {
            physical_type: physical_type.ok_or_else(|| missing("a type"))?,
            encodings,
            path,
            codec: codec.ok_or_else(|| missing("a codec"))?,
            num_values: num_values.ok_or_else(|| missing("a value count"))?,
            total_uncompressed_size: total_uncompressed_size
                .ok_or_else(|| missing("an uncompressed size"))?,
            total_compressed_size: total_compressed_size
                .ok_or_else(|| missing("a compressed size"))?,
            data_page_offset: data_page_offset
                .ok_or_else(|| missing("a data page offset"))?,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::tests::doc_schema;

    fn sample_metadata() -> ParquetMetaData {
        let schema = Arc::new(doc_schema());
        let columns = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(i, descr)| {
                ColumnChunkMetaData::builder(descr.clone())
                    .set_encodings(vec![Encoding::PLAIN, Encoding::RLE])
                    .set_compression(Compression::SNAPPY)
                    .set_num_values(100 + i as i64)
                    .set_total_uncompressed_size(1000)
                    .set_total_compressed_size(600)
                    .set_data_page_offset(4 + i as i64 * 600)
                    .set_statistics(Statistics {
                        null_count: Some(3),
                        distinct_count: Some(42),
                        min_value: Some(vec![0, 0, 0, 0, 0, 0, 0, 0]),
                        max_value: Some(vec![9, 0, 0, 0, 0, 0, 0, 0]),
                    })
                    .build()
            })
            .collect::<Vec<_>>();
        let row_group = RowGroupMetaData::new(columns, 57);
        let file_metadata = FileMetaData::new(
            FORMAT_VERSION,
            57,
            Some("parquetry test".to_owned()),
            Some(vec![
                KeyValue::new("origin".to_owned(), "unit-test".to_owned()),
                KeyValue {
                    key: "flag".to_owned(),
                    value: None,
                },
            ]),
            schema,
        );
        ParquetMetaData::new(file_metadata, vec![row_group])
    }

    #[test]
    fn test_metadata_thrift_roundtrip() {
        let metadata = sample_metadata();
        let mut buf = Vec::new();
        metadata
            .write_thrift(&mut CompactWriter::new(&mut buf))
            .unwrap();
        let back = ParquetMetaData::read_thrift(&buf).unwrap();

        let file = back.file_metadata();
        assert_eq!(file.version(), FORMAT_VERSION);
        assert_eq!(file.num_rows(), 57);
        assert_eq!(file.created_by(), Some("parquetry test"));
        assert_eq!(
            file.key_value_metadata().unwrap(),
            metadata.file_metadata().key_value_metadata().unwrap()
        );
        assert_eq!(file.schema_descr().num_columns(), 6);

        assert_eq!(back.num_row_groups(), 1);
        let row_group = back.row_group(0);
        assert_eq!(row_group.num_rows(), 57);
        assert_eq!(row_group.total_byte_size(), 600 * 6);
        for (i, chunk) in row_group.columns().iter().enumerate() {
            let original = metadata.row_group(0).column(i);
            assert_eq!(chunk.column_path(), original.column_path());
            assert_eq!(chunk.compression(), Compression::SNAPPY);
            assert_eq!(chunk.num_values(), original.num_values());
            assert_eq!(chunk.data_page_offset(), original.data_page_offset());
            assert_eq!(chunk.statistics(), original.statistics());
            assert_eq!(chunk.encodings(), original.encodings());
        }
    }

    #[test]
    fn test_truncated_metadata_is_corrupt() {
        let metadata = sample_metadata();
        let mut buf = Vec::new();
        metadata
            .write_thrift(&mut CompactWriter::new(&mut buf))
            .unwrap();
        buf.truncate(buf.len() / 2);
        let err = ParquetMetaData::read_thrift(&buf).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_missing_schema_is_corrupt() {
        // a footer with only a version field
        let mut buf = Vec::new();
        {
            let mut w = CompactWriter::new(&mut buf);
            w.write_field_begin(FieldType::I32, 1, 0).unwrap();
            w.write_i32(1).unwrap();
            w.write_struct_end().unwrap();
        }
        let err = ParquetMetaData::read_thrift(&buf).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }
}
