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

//! PLAIN encoding.
//!
//! Numerics are little-endian at their natural width, BOOLEAN is
//! bit-packed LSB-first, BYTE_ARRAY carries a 4-byte little-endian
//! length prefix per value, FIXED_LEN_BYTE_ARRAY is raw bytes of the
//! schema-declared width.

use crate::data_type::{ByteArray, ColumnValues, Int96};
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::{ceil, BitReader, BitWriter};

/// Encodes a value sequence into its PLAIN representation.
pub fn encode(values: &ColumnValues) -> Vec<u8> {
    match values {
        ColumnValues::Bool(v) => {
            let mut writer = BitWriter::new_from_buf(Vec::with_capacity(ceil(v.len(), 8)));
            for b in v {
                writer.put_value(*b as u64, 1);
            }
            writer.consume()
        }
        ColumnValues::Int32(v) => {
            let mut out = Vec::with_capacity(v.len() * 4);
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
            out
        }
        ColumnValues::Int64(v) => {
            let mut out = Vec::with_capacity(v.len() * 8);
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
            out
        }
        ColumnValues::Int96(v) => {
            let mut out = Vec::with_capacity(v.len() * 12);
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
            out
        }
        ColumnValues::Float(v) => {
            let mut out = Vec::with_capacity(v.len() * 4);
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
            out
        }
        ColumnValues::Double(v) => {
            let mut out = Vec::with_capacity(v.len() * 8);
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
            out
        }
        ColumnValues::ByteArray(v) => {
            let total: usize = v.iter().map(|b| 4 + b.len()).sum();
            let mut out = Vec::with_capacity(total);
            for b in v {
                out.extend_from_slice(&(b.len() as u32).to_le_bytes());
                out.extend_from_slice(b.as_bytes());
            }
            out
        }
        ColumnValues::FixedLenByteArray(v) => {
            let mut out = Vec::new();
            for b in v {
                out.extend_from_slice(b.as_bytes());
            }
            out
        }
    }
}

/// Encodes a single value of an already-typed container; used for
/// statistics min/max, which share the PLAIN representation.
pub fn encode_single(values: &ColumnValues, index: usize) -> Vec<u8> {
    match values {
        ColumnValues::Bool(v) => vec![v[index] as u8],
        ColumnValues::Int32(v) => v[index].to_le_bytes().to_vec(),
        ColumnValues::Int64(v) => v[index].to_le_bytes().to_vec(),
        ColumnValues::Int96(v) => v[index].to_le_bytes().to_vec(),
        ColumnValues::Float(v) => v[index].to_le_bytes().to_vec(),
        ColumnValues::Double(v) => v[index].to_le_bytes().to_vec(),
        ColumnValues::ByteArray(v) => {
            let b = &v[index];
            let mut out = Vec::with_capacity(4 + b.len());
            out.extend_from_slice(&(b.len() as u32).to_le_bytes());
            out.extend_from_slice(b.as_bytes());
            out
        }
        ColumnValues::FixedLenByteArray(v) => v[index].as_bytes().to_vec(),
    }
}

/// Decodes exactly `count` values of the given shape from `data`,
/// consuming the whole slice.
pub fn decode(
    data: &[u8],
    count: usize,
    shape: &ColumnValues,
    type_length: i32,
) -> Result<ColumnValues> {
    let mut cursor = Cursor { data, pos: 0 };
    let values = match shape {
        ColumnValues::Bool(_) => {
            let byte_len = ceil(count, 8);
            let slice = cursor.take(byte_len)?;
            let mut reader = BitReader::new(slice);
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(
                    reader
                        .get_value(1)
                        .ok_or_else(|| corrupt_err!("boolean values truncated"))?
                        != 0,
                );
            }
            ColumnValues::Bool(v)
        }
        ColumnValues::Int32(_) => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(i32::from_le_bytes(cursor.take(4)?.try_into().unwrap()));
            }
            ColumnValues::Int32(v)
        }
        ColumnValues::Int64(_) => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(i64::from_le_bytes(cursor.take(8)?.try_into().unwrap()));
            }
            ColumnValues::Int64(v)
        }
        ColumnValues::Int96(_) => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(Int96::from_le_bytes(cursor.take(12)?.try_into().unwrap()));
            }
            ColumnValues::Int96(v)
        }
        ColumnValues::Float(_) => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(f32::from_le_bytes(cursor.take(4)?.try_into().unwrap()));
            }
            ColumnValues::Float(v)
        }
        ColumnValues::Double(_) => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(f64::from_le_bytes(cursor.take(8)?.try_into().unwrap()));
            }
            ColumnValues::Double(v)
        }
        ColumnValues::ByteArray(_) => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                let len =
                    u32::from_le_bytes(cursor.take(4)?.try_into().unwrap()) as usize;
                v.push(ByteArray::from(cursor.take(len)?));
            }
            ColumnValues::ByteArray(v)
        }
        ColumnValues::FixedLenByteArray(_) => {
            if type_length <= 0 {
                return Err(corrupt_err!(
                    "fixed-width column without a declared type length"
                ));
            }
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ByteArray::from(cursor.take(type_length as usize)?));
            }
            ColumnValues::FixedLenByteArray(v)
        }
    };
    if cursor.pos != data.len() {
        return Err(corrupt_err!(
            "{} bytes of PLAIN values left over after {} values",
            data.len() - cursor.pos,
            count
        ));
    }
    Ok(values)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let slice = self
            .data
            .get(self.pos..self.pos + n)
            .ok_or_else(|| corrupt_err!("PLAIN values truncated"))?;
        self.pos += n;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::Type;

    fn roundtrip(values: ColumnValues, type_length: i32) {
        let encoded = encode(&values);
        let decoded = decode(&encoded, values.len(), &values, type_length).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_boolean_bit_packing() {
        let values = ColumnValues::Bool(vec![true, false, true, true, false, true, false, false, true]);
        let encoded = encode(&values);
        // nine booleans span two bytes, LSB first
        assert_eq!(encoded, vec![0b0010_1101, 0b0000_0001]);
        roundtrip(values, -1);
    }

    #[test]
    fn test_numeric_roundtrips() {
        roundtrip(ColumnValues::Int32(vec![i32::MIN, -1, 0, 1, i32::MAX]), -1);
        roundtrip(ColumnValues::Int64(vec![i64::MIN, -1, 0, 1, i64::MAX]), -1);
        roundtrip(ColumnValues::Float(vec![0.0, -1.5, f32::MAX]), -1);
        roundtrip(ColumnValues::Double(vec![0.0, -1.5, f64::MIN]), -1);
        roundtrip(
            ColumnValues::Int96(vec![Int96::new(1, 2, 3), Int96::new(0, 0, u32::MAX)]),
            -1,
        );
    }

    #[test]
    fn test_int32_little_endian() {
        let encoded = encode(&ColumnValues::Int32(vec![1]));
        assert_eq!(encoded, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_byte_array_length_prefix() {
        let values = ColumnValues::ByteArray(vec![
            ByteArray::from("ab"),
            ByteArray::from(""),
            ByteArray::from("xyz"),
        ]);
        let encoded = encode(&values);
        assert_eq!(
            encoded,
            vec![2, 0, 0, 0, b'a', b'b', 0, 0, 0, 0, 3, 0, 0, 0, b'x', b'y', b'z']
        );
        roundtrip(values, -1);
    }

    #[test]
    fn test_fixed_len_byte_array_no_prefix() {
        let values = ColumnValues::FixedLenByteArray(vec![
            ByteArray::from(vec![1u8, 2, 3, 4]),
            ByteArray::from(vec![5u8, 6, 7, 8]),
        ]);
        let encoded = encode(&values);
        assert_eq!(encoded.len(), 8);
        roundtrip(values, 4);
    }

    #[test]
    fn test_truncated_input_is_corrupt() {
        let values = ColumnValues::Int64(vec![1, 2, 3]);
        let mut encoded = encode(&values);
        encoded.truncate(encoded.len() - 2);
        let err = decode(&encoded, 3, &values, -1).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_leftover_bytes_are_corrupt() {
        let values = ColumnValues::Int32(vec![7]);
        let mut encoded = encode(&values);
        encoded.extend_from_slice(&[0; 4]);
        let err = decode(&encoded, 1, &values, -1).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_empty_shape_for_each_type() {
        for t in [Type::BOOLEAN, Type::BYTE_ARRAY, Type::INT96] {
            let shape = ColumnValues::new(t);
            let decoded = decode(&[], 0, &shape, 12).unwrap();
            assert_eq!(decoded.len(), 0);
        }
    }

    #[test]
    fn test_encode_single_matches_stream() {
        let values = ColumnValues::ByteArray(vec![ByteArray::from("apples")]);
        // min/max statistics share the length-prefixed form
        assert_eq!(encode_single(&values, 0), encode(&values));
    }
}
