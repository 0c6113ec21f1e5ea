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

//! Column chunk decoding.
//!
//! Pages are parsed back to back until the chunk's byte range is
//! exhausted, and their level/value streams are accumulated into one
//! [`ColumnBuffer`]. Dictionary and index pages, and any value encoding
//! other than PLAIN, are rejected as unsupported.

use tracing::trace;

use crate::basic::{Compression, Encoding, PageType};
use crate::column::page::PageHeader;
use crate::compression::create_codec;
use crate::data_type::ColumnValues;
use crate::encodings::{levels, plain};
use crate::errors::{ParquetError, Result};
use crate::record::ColumnBuffer;
use crate::schema::types::ColumnDescPtr;
use crate::thrift::CompactSliceReader;

/// Decodes a column chunk's pages. `data` must span exactly the chunk's
/// total compressed size; `expected_levels` is the value count the
/// chunk's metadata declares.
pub(crate) fn read_column_chunk(
    data: &[u8],
    desc: ColumnDescPtr,
    compression: Compression,
    expected_levels: i64,
) -> Result<ColumnBuffer> {
    let mut codec = create_codec(compression)?;
    let mut def_levels: Vec<i16> = Vec::new();
    let mut rep_levels: Vec<i16> = Vec::new();
    let mut values = ColumnValues::new(desc.physical_type());

    let mut pos = 0usize;
    while pos < data.len() {
        let mut reader = CompactSliceReader::new(&data[pos..]);
        let header = PageHeader::read_thrift(&mut reader)?;
        pos += data.len() - pos - reader.remaining();

        let body_len = header.compressed_page_size as usize;
        let body = data
            .get(pos..pos + body_len)
            .ok_or_else(|| corrupt_err!("page body extends past the column chunk"))?;
        pos += body_len;

        match header.page_type {
            PageType::DATA_PAGE => {
                let page = header.data_page_header.as_ref().ok_or_else(|| {
                    corrupt_err!("DATA_PAGE without a data page header")
                })?;
                require_plain(page.encoding)?;
                require_rle(page.def_level_encoding)?;
                require_rle(page.rep_level_encoding)?;
                if page.num_values < 0 {
                    return Err(corrupt_err!(
                        "page declares {} values",
                        page.num_values
                    ));
                }
                let num_values = page.num_values as usize;

                let owned;
                let uncompressed = match codec.as_mut() {
                    Some(codec) => {
                        let mut out =
                            Vec::with_capacity(header.uncompressed_page_size as usize);
                        codec.decompress(
                            body,
                            &mut out,
                            Some(header.uncompressed_page_size as usize),
                        )?;
                        owned = out;
                        &owned[..]
                    }
                    None => body,
                };
                if uncompressed.len() != header.uncompressed_page_size as usize {
                    return Err(corrupt_err!(
                        "page declared {} uncompressed bytes but has {}",
                        header.uncompressed_page_size,
                        uncompressed.len()
                    ));
                }

                let (rep, rep_consumed) = levels::decode_enveloped(
                    desc.max_rep_level(),
                    num_values,
                    uncompressed,
                )?;
                let (def, def_consumed) = levels::decode_enveloped(
                    desc.max_def_level(),
                    num_values,
                    &uncompressed[rep_consumed..],
                )?;
                let value_count = def
                    .iter()
                    .filter(|d| **d == desc.max_def_level())
                    .count();
                let page_values = plain::decode(
                    &uncompressed[rep_consumed + def_consumed..],
                    value_count,
                    &values,
                    desc.type_length(),
                )?;

                rep_levels.extend_from_slice(&rep);
                def_levels.extend_from_slice(&def);
                values.append(page_values);
            }
            PageType::DATA_PAGE_V2 => {
                let page = header.data_page_header_v2.as_ref().ok_or_else(|| {
                    corrupt_err!("DATA_PAGE_V2 without a data page header")
                })?;
                require_plain(page.encoding)?;
                if page.num_values < 0
                    || page.num_nulls < 0
                    || page.num_nulls > page.num_values
                    || page.rep_levels_byte_length < 0
                    || page.def_levels_byte_length < 0
                {
                    return Err(corrupt_err!(
                        "page declares {} values and {} nulls",
                        page.num_values,
                        page.num_nulls
                    ));
                }
                let num_values = page.num_values as usize;
                let rep_len = page.rep_levels_byte_length as usize;
                let def_len = page.def_levels_byte_length as usize;
                if rep_len + def_len > body.len()
                    || rep_len + def_len > header.uncompressed_page_size as usize
                {
                    return Err(corrupt_err!(
                        "level streams of {} bytes exceed the page body of {}",
                        rep_len + def_len,
                        body.len()
                    ));
                }

                let rep =
                    levels::decode_raw(desc.max_rep_level(), num_values, &body[..rep_len])?;
                let def = levels::decode_raw(
                    desc.max_def_level(),
                    num_values,
                    &body[rep_len..rep_len + def_len],
                )?;

                let defined = def
                    .iter()
                    .filter(|d| **d == desc.max_def_level())
                    .count();
                if defined != num_values - page.num_nulls as usize {
                    return Err(corrupt_err!(
                        "page declares {} nulls but levels define {} of {} positions",
                        page.num_nulls,
                        defined,
                        num_values
                    ));
                }

                let raw_values = &body[rep_len + def_len..];
                let values_uncompressed_len =
                    header.uncompressed_page_size as usize - rep_len - def_len;
                let owned;
                let value_bytes = match codec.as_mut() {
                    Some(codec) if page.is_compressed => {
                        let mut out = Vec::with_capacity(values_uncompressed_len);
                        codec.decompress(raw_values, &mut out, Some(values_uncompressed_len))?;
                        owned = out;
                        &owned[..]
                    }
                    _ => raw_values,
                };
                if value_bytes.len() != values_uncompressed_len {
                    return Err(corrupt_err!(
                        "page declared {} uncompressed value bytes but has {}",
                        values_uncompressed_len,
                        value_bytes.len()
                    ));
                }
                let page_values =
                    plain::decode(value_bytes, defined, &values, desc.type_length())?;

                rep_levels.extend_from_slice(&rep);
                def_levels.extend_from_slice(&def);
                values.append(page_values);
            }
            other => {
                return Err(unsupported_err!(
                    "page type {} in column '{}'",
                    other,
                    desc.path()
                ));
            }
        }
    }

    if def_levels.len() as i64 != expected_levels {
        return Err(corrupt_err!(
            "column '{}' declares {} values but its pages hold {}",
            desc.path(),
            expected_levels,
            def_levels.len()
        ));
    }

    trace!(
        column = %desc.path(),
        levels = def_levels.len(),
        values = values.len(),
        "decoded column chunk"
    );

    Ok(ColumnBuffer::from_parts(desc, def_levels, rep_levels, values))
}

fn require_plain(encoding: Encoding) -> Result<()> {
    if encoding != Encoding::PLAIN {
        return Err(unsupported_err!("value encoding {}", encoding));
    }
    Ok(())
}

fn require_rle(encoding: Encoding) -> Result<()> {
    if encoding != Encoding::RLE {
        return Err(unsupported_err!("level encoding {}", encoding));
    }
    Ok(())
}
