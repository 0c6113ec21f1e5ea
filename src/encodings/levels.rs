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

//! Framing of definition/repetition level streams.
//!
//! Levels use the RLE hybrid at a bit width derived from the maximum
//! level. Data page v1 prefixes the stream with its byte length as a
//! 4-byte little-endian integer; data page v2 stores the stream raw and
//! carries the byte length in the page header. A maximum level of zero
//! puts nothing on the wire in either framing.

use crate::encodings::rle::{max_buffer_size, RleDecoder, RleEncoder};
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::num_required_bits;

/// Encoder for one level stream.
pub enum LevelEncoder {
    /// Data page v1: stream wrapped in a length envelope.
    Enveloped(RleEncoder),
    /// Data page v2: raw stream.
    Raw(RleEncoder),
    /// Maximum level zero: every level is zero and nothing is stored.
    Empty,
}

impl LevelEncoder {
    /// Encoder with the v1 envelope framing.
    pub fn v1(max_level: i16, num_values: usize) -> Self {
        if max_level == 0 {
            return LevelEncoder::Empty;
        }
        let bit_width = num_required_bits(max_level as u64);
        let mut buffer = Vec::with_capacity(4 + max_buffer_size(bit_width, num_values));
        // room for the length header, patched in consume()
        buffer.extend_from_slice(&[0; 4]);
        LevelEncoder::Enveloped(RleEncoder::new_from_buf(bit_width, buffer))
    }

    /// Encoder with the v2 raw framing.
    pub fn v2(max_level: i16, num_values: usize) -> Self {
        if max_level == 0 {
            return LevelEncoder::Empty;
        }
        let bit_width = num_required_bits(max_level as u64);
        let buffer = Vec::with_capacity(max_buffer_size(bit_width, num_values));
        LevelEncoder::Raw(RleEncoder::new_from_buf(bit_width, buffer))
    }

    /// Encodes the complete level sequence.
    pub fn put(&mut self, levels: &[i16]) {
        let widened: Vec<u64> = levels.iter().map(|l| *l as u64).collect();
        match self {
            LevelEncoder::Enveloped(encoder) | LevelEncoder::Raw(encoder) => {
                encoder.encode(&widened)
            }
            LevelEncoder::Empty => {}
        }
    }

    /// Finishes the stream, patching the v1 length envelope.
    pub fn consume(self) -> Vec<u8> {
        match self {
            LevelEncoder::Enveloped(encoder) => {
                let mut data = encoder.consume();
                let body_len = (data.len() - 4) as u32;
                data[..4].copy_from_slice(&body_len.to_le_bytes());
                data
            }
            LevelEncoder::Raw(encoder) => encoder.consume(),
            LevelEncoder::Empty => Vec::new(),
        }
    }
}

/// Decodes a v1 enveloped level stream from the front of `data`.
/// Returns the levels and the total bytes consumed including the
/// envelope.
pub fn decode_enveloped(
    max_level: i16,
    count: usize,
    data: &[u8],
) -> Result<(Vec<i16>, usize)> {
    if max_level == 0 {
        return Ok((vec![0; count], 0));
    }
    let prefix = data
        .get(..4)
        .ok_or_else(|| corrupt_err!("level stream envelope truncated"))?;
    let byte_len = u32::from_le_bytes(prefix.try_into().unwrap()) as usize;
    let body = data.get(4..4 + byte_len).ok_or_else(|| {
        corrupt_err!(
            "level stream envelope of {} bytes exceeds page body of {}",
            byte_len,
            data.len() - 4
        )
    })?;
    let levels = decode_raw(max_level, count, body)?;
    Ok((levels, 4 + byte_len))
}

/// Decodes a v2 raw level stream; `data` must be exactly the byte length
/// the page header declares.
pub fn decode_raw(max_level: i16, count: usize, data: &[u8]) -> Result<Vec<i16>> {
    if max_level == 0 {
        if !data.is_empty() {
            return Err(corrupt_err!(
                "level stream of {} bytes for a column with maximum level 0",
                data.len()
            ));
        }
        return Ok(vec![0; count]);
    }
    let bit_width = num_required_bits(max_level as u64);
    let mut decoder = RleDecoder::new(bit_width, data);
    let raw = decoder.get_batch(count)?;
    if decoder.bytes_consumed() != data.len() {
        return Err(corrupt_err!(
            "level stream declared {} bytes but {} values consumed {}",
            data.len(),
            count,
            decoder.bytes_consumed()
        ));
    }
    let mut levels = Vec::with_capacity(count);
    for v in raw {
        if v > max_level as u64 {
            return Err(corrupt_err!(
                "level {} exceeds the maximum of {}",
                v,
                max_level
            ));
        }
        levels.push(v as i16);
    }
    Ok(levels)
}
