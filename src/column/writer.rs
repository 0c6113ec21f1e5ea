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

//! Column chunk encoding.
//!
//! A chunk holds one data page per row group here. Version 1 pages
//! envelope both level streams, then compress levels and values as one
//! body. Version 2 pages store the level streams raw ahead of the
//! values and compress only the values.

use tracing::trace;

use crate::basic::{Compression, Encoding, PageType};
use crate::column::page::{DataPageHeader, DataPageHeaderV2, PageHeader};
use crate::compression::create_codec;
use crate::encodings::{levels::LevelEncoder, plain};
use crate::errors::Result;
use crate::file::statistics::Statistics;
use crate::record::ColumnBuffer;
use crate::thrift::CompactWriter;

/// A fully encoded column chunk plus the figures its metadata records.
pub(crate) struct EncodedChunk {
    pub(crate) bytes: Vec<u8>,
    pub(crate) num_values: i64,
    pub(crate) total_uncompressed_size: i64,
    pub(crate) total_compressed_size: i64,
    pub(crate) statistics: Statistics,
    pub(crate) encodings: Vec<Encoding>,
}

/// Encodes one column's streams into a chunk.
pub(crate) fn write_column_chunk(
    column: &ColumnBuffer,
    num_rows: usize,
    compression: Compression,
    use_v2: bool,
) -> Result<EncodedChunk> {
    let desc = column.descriptor();
    let num_levels = column.num_levels();
    let statistics = Statistics::from_column(column);
    let mut codec = create_codec(compression)?;

    let value_bytes = plain::encode(column.values());

    let (header, page_body) = if use_v2 {
        let mut rep_encoder = LevelEncoder::v2(desc.max_rep_level(), num_levels);
        rep_encoder.put(column.rep_levels());
        let rep_bytes = rep_encoder.consume();
        let mut def_encoder = LevelEncoder::v2(desc.max_def_level(), num_levels);
        def_encoder.put(column.def_levels());
        let def_bytes = def_encoder.consume();

        let uncompressed_size = (rep_bytes.len() + def_bytes.len() + value_bytes.len()) as i32;
        let compressed_values = match codec.as_mut() {
            Some(codec) => {
                let mut out = Vec::new();
                codec.compress(&value_bytes, &mut out)?;
                out
            }
            None => value_bytes,
        };

        let header = PageHeader {
            page_type: PageType::DATA_PAGE_V2,
            uncompressed_page_size: uncompressed_size,
            compressed_page_size: (rep_bytes.len() + def_bytes.len() + compressed_values.len())
                as i32,
            data_page_header: None,
            data_page_header_v2: Some(DataPageHeaderV2 {
                num_values: num_levels as i32,
                num_nulls: (num_levels - column.num_values()) as i32,
                num_rows: num_rows as i32,
                encoding: Encoding::PLAIN,
                def_levels_byte_length: def_bytes.len() as i32,
                rep_levels_byte_length: rep_bytes.len() as i32,
                is_compressed: codec.is_some(),
            }),
        };
        let mut body = rep_bytes;
        body.extend_from_slice(&def_bytes);
        body.extend_from_slice(&compressed_values);
        (header, body)
    } else {
        let mut rep_encoder = LevelEncoder::v1(desc.max_rep_level(), num_levels);
        rep_encoder.put(column.rep_levels());
        let mut body = rep_encoder.consume();
        let mut def_encoder = LevelEncoder::v1(desc.max_def_level(), num_levels);
        def_encoder.put(column.def_levels());
        body.extend_from_slice(&def_encoder.consume());
        body.extend_from_slice(&value_bytes);

        let uncompressed_size = body.len() as i32;
        let body = match codec.as_mut() {
            Some(codec) => {
                let mut out = Vec::new();
                codec.compress(&body, &mut out)?;
                out
            }
            None => body,
        };

        let header = PageHeader {
            page_type: PageType::DATA_PAGE,
            uncompressed_page_size: uncompressed_size,
            compressed_page_size: body.len() as i32,
            data_page_header: Some(DataPageHeader {
                num_values: num_levels as i32,
                encoding: Encoding::PLAIN,
                def_level_encoding: Encoding::RLE,
                rep_level_encoding: Encoding::RLE,
            }),
            data_page_header_v2: None,
        };
        (header, body)
    };

    let mut bytes = Vec::with_capacity(page_body.len() + 64);
    header.write_thrift(&mut CompactWriter::new(&mut bytes))?;
    let header_len = bytes.len();
    bytes.extend_from_slice(&page_body);

    trace!(
        column = %desc.path(),
        num_levels,
        page_bytes = bytes.len(),
        v2 = use_v2,
        "encoded column chunk"
    );

    Ok(EncodedChunk {
        num_values: num_levels as i64,
        total_uncompressed_size: (header_len + header.uncompressed_page_size as usize) as i64,
        total_compressed_size: bytes.len() as i64,
        statistics,
        encodings: vec![Encoding::PLAIN, Encoding::RLE],
        bytes,
    })
}
