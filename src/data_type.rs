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

//! Value containers for the Parquet physical types.

use std::fmt;

use bytes::Bytes;

use crate::basic::Type;

/// A 96 bit value, three little-endian 32 bit words. Kept opaque; legacy
/// writers used it for nanosecond timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Int96 {
    value: [u32; 3],
}

impl Int96 {
    /// Creates an INT96 from its three little-endian words.
    pub fn new(w0: u32, w1: u32, w2: u32) -> Self {
        Self {
            value: [w0, w1, w2],
        }
    }

    /// The three words, least significant first.
    pub fn data(&self) -> &[u32; 3] {
        &self.value
    }

    /// The 12-byte little-endian representation.
    pub fn to_le_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        for (i, w) in self.value.iter().enumerate() {
            out[i * 4..(i + 1) * 4].copy_from_slice(&w.to_le_bytes());
        }
        out
    }

    /// Reconstructs an INT96 from 12 little-endian bytes.
    pub fn from_le_bytes(bytes: [u8; 12]) -> Self {
        let word = |i: usize| u32::from_le_bytes(bytes[i * 4..(i + 1) * 4].try_into().unwrap());
        Self::new(word(0), word(1), word(2))
    }
}

impl fmt::Display for Int96 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

/// A variable or fixed length byte sequence.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteArray {
    data: Bytes,
}

impl ByteArray {
    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Interprets the bytes as UTF8, if valid.
    pub fn as_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl PartialOrd for ByteArray {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteArray {
    /// Unsigned byte-wise lexicographic order; the order column
    /// statistics are computed in.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.data.as_ref().cmp(other.data.as_ref())
    }
}

impl fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_utf8() {
            Some(s) => write!(f, "ByteArray({s:?})"),
            None => write!(f, "ByteArray({:?})", self.data.as_ref()),
        }
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(data: Vec<u8>) -> Self {
        Self { data: data.into() }
    }
}

impl From<&[u8]> for ByteArray {
    fn from(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }
}

impl From<&str> for ByteArray {
    fn from(data: &str) -> Self {
        Self {
            data: Bytes::copy_from_slice(data.as_bytes()),
        }
    }
}

impl From<Bytes> for ByteArray {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

/// An INTERVAL value: months, days and milliseconds, each independent of
/// the others. Stored as FIXED_LEN_BYTE_ARRAY(12), each component a
/// 4-byte little-endian unsigned integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Number of months.
    pub months: u32,
    /// Number of days.
    pub days: u32,
    /// Number of milliseconds.
    pub millis: u32,
}

impl Interval {
    /// The on-disk 12-byte representation.
    pub fn to_le_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.months.to_le_bytes());
        out[4..8].copy_from_slice(&self.days.to_le_bytes());
        out[8..12].copy_from_slice(&self.millis.to_le_bytes());
        out
    }

    /// Reconstructs an interval from its 12-byte representation.
    pub fn from_le_bytes(bytes: [u8; 12]) -> Self {
        let word = |i: usize| u32::from_le_bytes(bytes[i * 4..(i + 1) * 4].try_into().unwrap());
        Self {
            months: word(0),
            days: word(1),
            millis: word(2),
        }
    }
}

/// A column's decoded values: one homogeneous vector per physical type.
/// Fixed-width byte arrays are kept apart from variable ones because the
/// PLAIN encodings differ.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// BOOLEAN values.
    Bool(Vec<bool>),
    /// INT32 values.
    Int32(Vec<i32>),
    /// INT64 values.
    Int64(Vec<i64>),
    /// INT96 values.
    Int96(Vec<Int96>),
    /// FLOAT values.
    Float(Vec<f32>),
    /// DOUBLE values.
    Double(Vec<f64>),
    /// BYTE_ARRAY values.
    ByteArray(Vec<ByteArray>),
    /// FIXED_LEN_BYTE_ARRAY values.
    FixedLenByteArray(Vec<ByteArray>),
}

impl ColumnValues {
    /// An empty container for the given physical type.
    pub fn new(physical_type: Type) -> Self {
        match physical_type {
            Type::BOOLEAN => ColumnValues::Bool(Vec::new()),
            Type::INT32 => ColumnValues::Int32(Vec::new()),
            Type::INT64 => ColumnValues::Int64(Vec::new()),
            Type::INT96 => ColumnValues::Int96(Vec::new()),
            Type::FLOAT => ColumnValues::Float(Vec::new()),
            Type::DOUBLE => ColumnValues::Double(Vec::new()),
            Type::BYTE_ARRAY => ColumnValues::ByteArray(Vec::new()),
            Type::FIXED_LEN_BYTE_ARRAY => ColumnValues::FixedLenByteArray(Vec::new()),
        }
    }

    /// The physical type of the contained values.
    pub fn physical_type(&self) -> Type {
        match self {
            ColumnValues::Bool(_) => Type::BOOLEAN,
            ColumnValues::Int32(_) => Type::INT32,
            ColumnValues::Int64(_) => Type::INT64,
            ColumnValues::Int96(_) => Type::INT96,
            ColumnValues::Float(_) => Type::FLOAT,
            ColumnValues::Double(_) => Type::DOUBLE,
            ColumnValues::ByteArray(_) => Type::BYTE_ARRAY,
            ColumnValues::FixedLenByteArray(_) => Type::FIXED_LEN_BYTE_ARRAY,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Int96(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::ByteArray(v) => v.len(),
            ColumnValues::FixedLenByteArray(v) => v.len(),
        }
    }

    /// Whether the container holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves the values of `other` to the end of `self`. Both sides must
    /// hold the same physical type; page decoding guarantees that.
    pub(crate) fn append(&mut self, other: ColumnValues) {
        match (self, other) {
            (ColumnValues::Bool(a), ColumnValues::Bool(mut b)) => a.append(&mut b),
            (ColumnValues::Int32(a), ColumnValues::Int32(mut b)) => a.append(&mut b),
            (ColumnValues::Int64(a), ColumnValues::Int64(mut b)) => a.append(&mut b),
            (ColumnValues::Int96(a), ColumnValues::Int96(mut b)) => a.append(&mut b),
            (ColumnValues::Float(a), ColumnValues::Float(mut b)) => a.append(&mut b),
            (ColumnValues::Double(a), ColumnValues::Double(mut b)) => a.append(&mut b),
            (ColumnValues::ByteArray(a), ColumnValues::ByteArray(mut b)) => a.append(&mut b),
            (ColumnValues::FixedLenByteArray(a), ColumnValues::FixedLenByteArray(mut b)) => {
                a.append(&mut b)
            }
            _ => unreachable!("page decoding always yields the column's type"),
        }
    }
}
