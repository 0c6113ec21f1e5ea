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

//! Page headers and their Thrift representation.
//!
//! Every page in a column chunk is prefixed by a compact-protocol
//! `PageHeader`; its encoded length is discovered by parsing. Only data
//! pages (v1 and v2) are modeled; dictionary and index pages are
//! recognized so they can be rejected as unsupported.

use crate::basic::{Encoding, PageType};
use crate::errors::{ParquetError, Result};
use crate::thrift::{CompactSliceReader, CompactWriter, FieldType};

/// Header fields of a data page, version 1.
#[derive(Debug, PartialEq)]
pub(crate) struct DataPageHeader {
    pub(crate) num_values: i32,
    pub(crate) encoding: Encoding,
    pub(crate) def_level_encoding: Encoding,
    pub(crate) rep_level_encoding: Encoding,
}

/// Header fields of a data page, version 2. Levels are stored raw ahead
/// of the (optionally compressed) values, repetition levels first.
#[derive(Debug, PartialEq)]
pub(crate) struct DataPageHeaderV2 {
    pub(crate) num_values: i32,
    pub(crate) num_nulls: i32,
    pub(crate) num_rows: i32,
    pub(crate) encoding: Encoding,
    pub(crate) def_levels_byte_length: i32,
    pub(crate) rep_levels_byte_length: i32,
    pub(crate) is_compressed: bool,
}

/// The header preceding every page of a column chunk.
#[derive(Debug, PartialEq)]
pub(crate) struct PageHeader {
    pub(crate) page_type: PageType,
    pub(crate) uncompressed_page_size: i32,
    pub(crate) compressed_page_size: i32,
    pub(crate) data_page_header: Option<DataPageHeader>,
    pub(crate) data_page_header_v2: Option<DataPageHeaderV2>,
}

impl PageHeader {
    pub(crate) fn write_thrift<W: std::io::Write>(
        &self,
        w: &mut CompactWriter<W>,
    ) -> Result<()> {
        w.write_field_begin(FieldType::I32, 1, 0)?;
        w.write_i32(self.page_type.as_wire())?;
        w.write_field_begin(FieldType::I32, 2, 1)?;
        w.write_i32(self.uncompressed_page_size)?;
        w.write_field_begin(FieldType::I32, 3, 2)?;
        w.write_i32(self.compressed_page_size)?;
        let mut last_id = 3i16;
        if let Some(header) = &self.data_page_header {
            w.write_field_begin(FieldType::Struct, 5, last_id)?;
            header.write_thrift(w)?;
            last_id = 5;
        }
        if let Some(header) = &self.data_page_header_v2 {
            w.write_field_begin(FieldType::Struct, 8, last_id)?;
            header.write_thrift(w)?;
        }
        w.write_struct_end()
    }

    pub(crate) fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut page_type = None;
        let mut uncompressed_page_size = None;
        let mut compressed_page_size = None;
        let mut data_page_header = None;
        let mut data_page_header_v2 = None;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => page_type = Some(PageType::try_from(r.read_i32()?)?),
                    2 => uncompressed_page_size = Some(r.read_i32()?),
                    3 => compressed_page_size = Some(r.read_i32()?),
                    5 => data_page_header = Some(DataPageHeader::read_thrift(r)?),
                    8 => data_page_header_v2 = Some(DataPageHeaderV2::read_thrift(r)?),
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        let page_type =
            page_type.ok_or_else(|| corrupt_err!("page header without a page type"))?;
        let uncompressed_page_size = uncompressed_page_size
            .ok_or_else(|| corrupt_err!("page header without an uncompressed size"))?;
        let compressed_page_size = compressed_page_size
            .ok_or_else(|| corrupt_err!("page header without a compressed size"))?;
        if uncompressed_page_size < 0 || compressed_page_size < 0 {
            return Err(corrupt_err!("page header with a negative size"));
        }
        Ok(Self {
            page_type,
            uncompressed_page_size,
            compressed_page_size,
            data_page_header,
            data_page_header_v2,
        })
    }
}

impl DataPageHeader {
    fn write_thrift<W: std::io::Write>(&self, w: &mut CompactWriter<W>) -> Result<()> {
        w.write_field_begin(FieldType::I32, 1, 0)?;
        w.write_i32(self.num_values)?;
        w.write_field_begin(FieldType::I32, 2, 1)?;
        w.write_i32(self.encoding.as_wire())?;
        w.write_field_begin(FieldType::I32, 3, 2)?;
        w.write_i32(self.def_level_encoding.as_wire())?;
        w.write_field_begin(FieldType::I32, 4, 3)?;
        w.write_i32(self.rep_level_encoding.as_wire())?;
        w.write_struct_end()
    }

    fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut num_values = None;
        let mut encoding = None;
        let mut def_level_encoding = None;
        let mut rep_level_encoding = None;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => num_values = Some(r.read_i32()?),
                    2 => encoding = Some(Encoding::try_from(r.read_i32()?)?),
                    3 => def_level_encoding = Some(Encoding::try_from(r.read_i32()?)?),
                    4 => rep_level_encoding = Some(Encoding::try_from(r.read_i32()?)?),
                    // statistics and friends are not modeled at page level
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        Ok(Self {
            num_values: num_values
                .ok_or_else(|| corrupt_err!("data page header without num_values"))?,
            encoding: encoding
                .ok_or_else(|| corrupt_err!("data page header without an encoding"))?,
            def_level_encoding: def_level_encoding
                .ok_or_else(|| corrupt_err!("data page header without level encoding"))?,
            rep_level_encoding: rep_level_encoding
                .ok_or_else(|| corrupt_err!("data page header without level encoding"))?,
        })
    }
}

impl DataPageHeaderV2 {
    fn write_thrift<W: std::io::Write>(&self, w: &mut CompactWriter<W>) -> Result<()> {
        w.write_field_begin(FieldType::I32, 1, 0)?;
        w.write_i32(self.num_values)?;
        w.write_field_begin(FieldType::I32, 2, 1)?;
        w.write_i32(self.num_nulls)?;
        w.write_field_begin(FieldType::I32, 3, 2)?;
        w.write_i32(self.num_rows)?;
        w.write_field_begin(FieldType::I32, 4, 3)?;
        w.write_i32(self.encoding.as_wire())?;
        w.write_field_begin(FieldType::I32, 5, 4)?;
        w.write_i32(self.def_levels_byte_length)?;
        w.write_field_begin(FieldType::I32, 6, 5)?;
        w.write_i32(self.rep_levels_byte_length)?;
        w.write_bool_field(self.is_compressed, 7, 6)?;
        w.write_struct_end()
    }

    fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut num_values = None;
        let mut num_nulls = None;
        let mut num_rows = None;
        let mut encoding = None;
        let mut def_levels_byte_length = None;
        let mut rep_levels_byte_length = None;
        // absent means compressed per the format definition
        let mut is_compressed = true;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => num_values = Some(r.read_i32()?),
                    2 => num_nulls = Some(r.read_i32()?),
                    3 => num_rows = Some(r.read_i32()?),
                    4 => encoding = Some(Encoding::try_from(r.read_i32()?)?),
                    5 => def_levels_byte_length = Some(r.read_i32()?),
                    6 => rep_levels_byte_length = Some(r.read_i32()?),
                    7 => {
                        is_compressed = field
                            .bool_val
                            .ok_or_else(|| corrupt_err!("is_compressed is not a bool"))?
                    }
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        let missing = |name: &str| corrupt_err!("data page v2 header without {}", name);
        Ok(Self {
            num_values: num_values.ok_or_else(|| missing("num_values"))?,
            num_nulls: num_nulls.ok_or_else(|| missing("num_nulls"))?,
            num_rows: num_rows.ok_or_else(|| missing("num_rows"))?,
            encoding: encoding.ok_or_else(|| missing("an encoding"))?,
            def_levels_byte_length: def_levels_byte_length
                .ok_or_else(|| missing("definition level length"))?,
            rep_levels_byte_length: rep_levels_byte_length
                .ok_or_else(|| missing("repetition level length"))?,
            is_compressed,
        })
    }
}
