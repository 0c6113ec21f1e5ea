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

//! RLE/bit-packed hybrid encoding for small unsigned integers.
//!
//! The stream alternates two frame kinds, selected by a ULEB128 header
//! `H`:
//!
//! * `H & 1 == 0` is a run: `H >> 1` repetitions of one value, stored in
//!   `ceil(W/8)` little-endian bytes;
//! * `H & 1 == 1` is bit-packed: `(H >> 1) * 8` values, each `W` bits,
//!   LSB-first across byte boundaries.
//!
//! Runs shorter than eight values are folded into bit-packed frames; the
//! final frame is zero-padded up to a multiple of eight values and the
//! decoder discards the padding.

use crate::errors::{ParquetError, Result};
use crate::util::bit_util::{ceil, BitWriter};

/// Minimum length for a repetition to become a run frame. Groups are
/// eight values, so shorter runs pack tighter as literals.
const MIN_RUN_LENGTH: usize = 8;

/// Worst-case encoded size: all values in bit-packed frames plus one
/// header byte per group.
pub fn max_buffer_size(bit_width: u8, num_values: usize) -> usize {
    let groups = ceil(num_values, 8);
    groups * bit_width as usize + groups + 10
}

/// Encoder for one complete value sequence.
pub struct RleEncoder {
    bit_width: u8,
    buffer: Vec<u8>,
}

impl RleEncoder {
    pub fn new(bit_width: u8) -> Self {
        Self::new_from_buf(bit_width, Vec::new())
    }

    /// Keeps any bytes already in `buffer` (used for the length-prefix
    /// framing of data page v1).
    pub fn new_from_buf(bit_width: u8, buffer: Vec<u8>) -> Self {
        debug_assert!(bit_width <= 32);
        Self { bit_width, buffer }
    }

    /// Encodes `values` as the complete sequence of this stream. Values
    /// must fit in `bit_width` bits. A zero bit width encodes nothing.
    pub fn encode(&mut self, values: &[u64]) {
        if self.bit_width == 0 {
            return;
        }
        let mut literal: Vec<u64> = Vec::new();
        let mut i = 0;
        while i < values.len() {
            let mut j = i + 1;
            while j < values.len() && values[j] == values[i] {
                j += 1;
            }
            let run = j - i;
            if run >= MIN_RUN_LENGTH && literal.len() % 8 == 0 {
                self.flush_literal(&mut literal, false);
                self.write_run(values[i], run);
                i = j;
            } else if run >= MIN_RUN_LENGTH {
                // complete the open literal group with the head of the
                // run, then revisit the remainder
                let pad = 8 - literal.len() % 8;
                literal.extend(std::iter::repeat(values[i]).take(pad));
                i += pad;
            } else {
                literal.extend_from_slice(&values[i..j]);
                i = j;
            }
        }
        self.flush_literal(&mut literal, true);
    }

    /// Finishes the stream and returns the buffer.
    pub fn consume(self) -> Vec<u8> {
        self.buffer
    }

    fn write_vlq(&mut self, mut v: u64) {
        while v > 0x7f {
            self.buffer.push(v as u8 | 0x80);
            v >>= 7;
        }
        self.buffer.push(v as u8);
    }

    fn write_run(&mut self, value: u64, length: usize) {
        self.write_vlq((length as u64) << 1);
        let width_bytes = ceil(self.bit_width as usize, 8);
        self.buffer
            .extend_from_slice(&value.to_le_bytes()[..width_bytes]);
    }

    fn flush_literal(&mut self, literal: &mut Vec<u64>, pad_final: bool) {
        if literal.is_empty() {
            return;
        }
        if pad_final {
            while literal.len() % 8 != 0 {
                literal.push(0);
            }
        }
        debug_assert_eq!(literal.len() % 8, 0);
        let groups = literal.len() / 8;
        self.write_vlq(((groups as u64) << 1) | 1);
        let mut writer = BitWriter::new_from_buf(std::mem::take(&mut self.buffer));
        for v in literal.iter() {
            writer.put_value(*v, self.bit_width as usize);
        }
        self.buffer = writer.consume();
        literal.clear();
    }
}

/// Decoder over a byte slice. Tracks how many bytes the requested values
/// actually consumed so framings can verify exact consumption.
pub struct RleDecoder<'a> {
    bit_width: u8,
    data: &'a [u8],
    pos: usize,
}

impl<'a> RleDecoder<'a> {
    pub fn new(bit_width: u8, data: &'a [u8]) -> Self {
        debug_assert!(bit_width <= 32);
        Self {
            bit_width,
            data,
            pos: 0,
        }
    }

    /// Decodes exactly `count` values. Padding values in the final
    /// bit-packed frame are consumed and discarded.
    pub fn get_batch(&mut self, count: usize) -> Result<Vec<u64>> {
        let mut out = Vec::with_capacity(count);
        if self.bit_width == 0 {
            out.resize(count, 0);
            return Ok(out);
        }
        while out.len() < count {
            let header = self.read_vlq()?;
            if header & 1 == 0 {
                let run = (header >> 1) as usize;
                if run == 0 {
                    return Err(corrupt_err!("level run of length zero"));
                }
                let width_bytes = ceil(self.bit_width as usize, 8);
                let value = self.read_le_value(width_bytes)?;
                // surplus repetitions beyond the requested count are
                // padding and carry no bytes of their own
                let take = run.min(count - out.len());
                out.resize(out.len() + take, value);
            } else {
                let groups = (header >> 1) as usize;
                if groups == 0 {
                    return Err(corrupt_err!("bit-packed level group of length zero"));
                }
                let num_values = groups * 8;
                let byte_len = num_values * self.bit_width as usize / 8;
                let slice = self
                    .data
                    .get(self.pos..self.pos + byte_len)
                    .ok_or_else(|| corrupt_err!("bit-packed level group truncated"))?;
                self.pos += byte_len;
                let mut reader = crate::util::bit_util::BitReader::new(slice);
                let take = num_values.min(count - out.len());
                for _ in 0..take {
                    let v = reader
                        .get_value(self.bit_width as usize)
                        .ok_or_else(|| corrupt_err!("bit-packed level group truncated"))?;
                    out.push(v);
                }
            }
        }
        Ok(out)
    }

    /// Bytes consumed by the values decoded so far.
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    fn read_vlq(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| corrupt_err!("level stream truncated"))?;
            self.pos += 1;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(corrupt_err!("level run header overflows"));
            }
        }
    }

    fn read_le_value(&mut self, width_bytes: usize) -> Result<u64> {
        let slice = self
            .data
            .get(self.pos..self.pos + width_bytes)
            .ok_or_else(|| corrupt_err!("level stream truncated"))?;
        self.pos += width_bytes;
        let mut buf = [0u8; 8];
        buf[..width_bytes].copy_from_slice(slice);
        Ok(u64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::bit_util::num_required_bits;
    use rand::Rng;

    fn roundtrip(bit_width: u8, values: &[u64]) -> Vec<u8> {
        let mut encoder = RleEncoder::new(bit_width);
        encoder.encode(values);
        let buf = encoder.consume();
        let mut decoder = RleDecoder::new(bit_width, &buf);
        let decoded = decoder.get_batch(values.len()).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(decoder.bytes_consumed(), buf.len());
        buf
    }

    #[test]
    fn test_long_run_uses_rle_frame() {
        let values = vec![3u64; 100];
        let buf = roundtrip(2, &values);
        // header (1 byte vlq of 200) + one value byte
        assert!(buf.len() <= 3);
        assert_eq!(buf[0] & 1, 0);
    }

    #[test]
    fn test_alternating_values_use_bit_packing() {
        let values: Vec<u64> = (0..64).map(|i| i % 2).collect();
        let buf = roundtrip(1, &values);
        assert_eq!(buf[0] & 1, 1);
        // one header byte + 64 bits
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn test_run_after_literals() {
        let mut values: Vec<u64> = (0..8).map(|i| i % 4).collect();
        values.extend(std::iter::repeat(2u64).take(40));
        roundtrip(3, &values);
    }

    #[test]
    fn test_short_run_mid_literals_absorbed() {
        // run of 5 between irregular values stays within literals
        let mut values: Vec<u64> = vec![0, 1, 2];
        values.extend(std::iter::repeat(7).take(5));
        values.extend([1, 0, 3, 2]);
        roundtrip(3, &values);
    }

    #[test]
    fn test_run_head_completes_open_group() {
        // 3 literals followed by a run of 20: five run values complete
        // the literal group, the remaining 15 become a run frame
        let mut values: Vec<u64> = vec![1, 0, 1];
        values.extend(std::iter::repeat(3).take(20));
        roundtrip(2, &values);
    }

    #[test]
    fn test_random_roundtrip_many_widths() {
        let mut rng = rand::rng();
        for bit_width in [1u8, 2, 3, 8, 16] {
            let max = (1u64 << bit_width) - 1;
            let values: Vec<u64> = (0..10_000)
                .map(|_| rng.random_range(0..=max))
                .collect();
            let buf = roundtrip(bit_width, &values);
            // within framing overhead of the bit-packed baseline
            let baseline = 10_000 * bit_width as usize / 8;
            assert!(
                buf.len() <= baseline + 10_000 / 8 + 16,
                "width {bit_width}: {} bytes vs baseline {}",
                buf.len(),
                baseline
            );
        }
    }

    #[test]
    fn test_zero_bit_width_encodes_nothing() {
        let mut encoder = RleEncoder::new(0);
        encoder.encode(&[0, 0, 0]);
        let buf = encoder.consume();
        assert!(buf.is_empty());
        let mut decoder = RleDecoder::new(0, &buf);
        assert_eq!(decoder.get_batch(3).unwrap(), vec![0, 0, 0]);
        assert_eq!(decoder.bytes_consumed(), 0);
    }

    #[test]
    fn test_zero_length_run_is_corrupt() {
        // header 0 declares an empty run
        let buf = [0u8, 1];
        let err = RleDecoder::new(1, &buf).get_batch(1).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_truncated_stream_is_corrupt() {
        let mut encoder = RleEncoder::new(8);
        encoder.encode(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut buf = encoder.consume();
        buf.truncate(buf.len() - 1);
        let err = RleDecoder::new(8, &buf).get_batch(9).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_max_buffer_size_bounds_output() {
        for bit_width in [1u8, 3, 8] {
            let values: Vec<u64> =
                (0..1000).map(|i| i % (1 << bit_width.min(6))).collect();
            let mut encoder = RleEncoder::new(bit_width);
            encoder.encode(&values);
            assert!(encoder.consume().len() <= max_buffer_size(bit_width, 1000));
        }
    }

    #[test]
    fn test_num_required_bits_matches_levels() {
        assert_eq!(num_required_bits(0), 0);
        assert_eq!(num_required_bits(3), 2);
    }
}
