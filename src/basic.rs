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

//! Rust mappings for the enums of the Parquet Thrift definition.
//!
//! Variant names and numeric tags mirror `parquet.thrift`; an unknown tag
//! on read is corruption, a known-but-unimplemented feature surfaces as
//! `Unsupported` at the point of use.

use std::fmt;

use crate::errors::{ParquetError, Result};

// ----------------------------------------------------------------------
// Mirrors thrift enum `Type`

/// Physical types supported by Parquet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Type {
    /// One bit per value, bit-packed.
    BOOLEAN,
    /// 32 bit signed integer.
    INT32,
    /// 64 bit signed integer.
    INT64,
    /// 96 bit value, used by legacy writers for timestamps.
    INT96,
    /// IEEE 754 single precision.
    FLOAT,
    /// IEEE 754 double precision.
    DOUBLE,
    /// Length-prefixed byte sequence.
    BYTE_ARRAY,
    /// Byte sequence of schema-declared fixed length.
    FIXED_LEN_BYTE_ARRAY,
}

impl Type {
    pub(crate) fn as_wire(self) -> i32 {
        match self {
            Type::BOOLEAN => 0,
            Type::INT32 => 1,
            Type::INT64 => 2,
            Type::INT96 => 3,
            Type::FLOAT => 4,
            Type::DOUBLE => 5,
            Type::BYTE_ARRAY => 6,
            Type::FIXED_LEN_BYTE_ARRAY => 7,
        }
    }
}

impl TryFrom<i32> for Type {
    type Error = ParquetError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => Type::BOOLEAN,
            1 => Type::INT32,
            2 => Type::INT64,
            3 => Type::INT96,
            4 => Type::FLOAT,
            5 => Type::DOUBLE,
            6 => Type::BYTE_ARRAY,
            7 => Type::FIXED_LEN_BYTE_ARRAY,
            _ => return Err(corrupt_err!("unexpected physical type {}", value)),
        })
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift enum `ConvertedType`
//
// `NONE` is added for absent annotations, so wire tags are offset by one.

/// Logical annotations layered over the physical types.
///
/// Only the annotations this crate converts at the record boundary are
/// listed (plus `NONE`); the remaining tags of the Thrift enum are
/// preserved on read via [`ConvertedType::OTHER`] so foreign metadata
/// survives a round-trip of the schema tree in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ConvertedType {
    /// No annotation.
    NONE,
    /// BYTE_ARRAY holding UTF8 encoded characters.
    UTF8,
    /// INT32 days since the Unix epoch.
    DATE,
    /// INT64 milliseconds since the Unix epoch.
    TIMESTAMP_MILLIS,
    /// INT64 microseconds since the Unix epoch.
    TIMESTAMP_MICROS,
    /// BYTE_ARRAY holding an embedded JSON document.
    JSON,
    /// BYTE_ARRAY holding an embedded BSON document.
    BSON,
    /// FIXED_LEN_BYTE_ARRAY(12): months, days, milliseconds, each
    /// unsigned 4-byte little-endian.
    INTERVAL,
    /// Any other annotation tag; carried but not interpreted.
    OTHER(i32),
}

impl ConvertedType {
    pub(crate) fn as_wire(self) -> Option<i32> {
        match self {
            ConvertedType::NONE => None,
            ConvertedType::UTF8 => Some(0),
            ConvertedType::DATE => Some(6),
            ConvertedType::TIMESTAMP_MILLIS => Some(9),
            ConvertedType::TIMESTAMP_MICROS => Some(10),
            ConvertedType::JSON => Some(19),
            ConvertedType::BSON => Some(20),
            ConvertedType::INTERVAL => Some(21),
            ConvertedType::OTHER(tag) => Some(tag),
        }
    }

    pub(crate) fn from_wire(value: i32) -> Result<Self> {
        Ok(match value {
            0 => ConvertedType::UTF8,
            6 => ConvertedType::DATE,
            9 => ConvertedType::TIMESTAMP_MILLIS,
            10 => ConvertedType::TIMESTAMP_MICROS,
            19 => ConvertedType::JSON,
            20 => ConvertedType::BSON,
            21 => ConvertedType::INTERVAL,
            1..=5 | 7 | 8 | 11..=18 => ConvertedType::OTHER(value),
            _ => return Err(corrupt_err!("unexpected converted type {}", value)),
        })
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift enum `FieldRepetitionType`

/// Representation of field repetition in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Repetition {
    /// Field is deterministically present, exactly once.
    REQUIRED,
    /// Field is present zero or one times.
    OPTIONAL,
    /// Field is present zero or more times.
    REPEATED,
}

impl Repetition {
    pub(crate) fn as_wire(self) -> i32 {
        match self {
            Repetition::REQUIRED => 0,
            Repetition::OPTIONAL => 1,
            Repetition::REPEATED => 2,
        }
    }
}

impl TryFrom<i32> for Repetition {
    type Error = ParquetError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => Repetition::REQUIRED,
            1 => Repetition::OPTIONAL,
            2 => Repetition::REPEATED,
            _ => return Err(corrupt_err!("unexpected repetition {}", value)),
        })
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift enum `Encoding`

/// Encodings supported by Parquet. PLAIN and the RLE level hybrid are
/// implemented; the rest are recognized so their presence in a file is an
/// `Unsupported` error rather than corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    /// Fixed-width little-endian values, length-prefixed byte arrays,
    /// bit-packed booleans.
    PLAIN,
    /// Deprecated dictionary encoding.
    PLAIN_DICTIONARY,
    /// RLE / bit-packed hybrid, used for definition and repetition
    /// levels.
    RLE,
    /// Deprecated bit packing.
    BIT_PACKED,
    /// Delta encoding for integers.
    DELTA_BINARY_PACKED,
    /// Delta encoding of byte array lengths.
    DELTA_LENGTH_BYTE_ARRAY,
    /// Incremental-prefix delta encoding of byte arrays.
    DELTA_BYTE_ARRAY,
    /// Dictionary indices encoded with the RLE hybrid.
    RLE_DICTIONARY,
    /// Byte-transposed numeric encoding.
    BYTE_STREAM_SPLIT,
}

impl Encoding {
    pub(crate) fn as_wire(self) -> i32 {
        match self {
            Encoding::PLAIN => 0,
            Encoding::PLAIN_DICTIONARY => 2,
            Encoding::RLE => 3,
            Encoding::BIT_PACKED => 4,
            Encoding::DELTA_BINARY_PACKED => 5,
            Encoding::DELTA_LENGTH_BYTE_ARRAY => 6,
            Encoding::DELTA_BYTE_ARRAY => 7,
            Encoding::RLE_DICTIONARY => 8,
            Encoding::BYTE_STREAM_SPLIT => 9,
        }
    }
}

impl TryFrom<i32> for Encoding {
    type Error = ParquetError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => Encoding::PLAIN,
            2 => Encoding::PLAIN_DICTIONARY,
            3 => Encoding::RLE,
            4 => Encoding::BIT_PACKED,
            5 => Encoding::DELTA_BINARY_PACKED,
            6 => Encoding::DELTA_LENGTH_BYTE_ARRAY,
            7 => Encoding::DELTA_BYTE_ARRAY,
            8 => Encoding::RLE_DICTIONARY,
            9 => Encoding::BYTE_STREAM_SPLIT,
            _ => return Err(corrupt_err!("unexpected encoding {}", value)),
        })
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift enum `CompressionCodec`

/// Supported compression algorithms. The codec itself is delegated to a
/// backend crate; see `crate::compression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Compression {
    /// No compression.
    UNCOMPRESSED,
    /// Snappy raw block format.
    SNAPPY,
    /// Gzip (RFC 1952).
    GZIP,
    /// LZO; recognized, no backend.
    LZO,
    /// Brotli.
    BROTLI,
    /// LZ4 frame format.
    LZ4,
    /// Zstandard; recognized, no backend.
    ZSTD,
}

impl Compression {
    pub(crate) fn as_wire(self) -> i32 {
        match self {
            Compression::UNCOMPRESSED => 0,
            Compression::SNAPPY => 1,
            Compression::GZIP => 2,
            Compression::LZO => 3,
            Compression::BROTLI => 4,
            Compression::LZ4 => 5,
            Compression::ZSTD => 6,
        }
    }
}

impl TryFrom<i32> for Compression {
    type Error = ParquetError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => Compression::UNCOMPRESSED,
            1 => Compression::SNAPPY,
            2 => Compression::GZIP,
            3 => Compression::LZO,
            4 => Compression::BROTLI,
            5 => Compression::LZ4,
            6 => Compression::ZSTD,
            _ => return Err(corrupt_err!("unexpected compression codec {}", value)),
        })
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift enum `PageType`

/// Types of pages found in column chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum PageType {
    /// Data page, version 1.
    DATA_PAGE,
    /// Index page; not supported.
    INDEX_PAGE,
    /// Dictionary page; not supported.
    DICTIONARY_PAGE,
    /// Data page, version 2.
    DATA_PAGE_V2,
}

impl PageType {
    pub(crate) fn as_wire(self) -> i32 {
        match self {
            PageType::DATA_PAGE => 0,
            PageType::INDEX_PAGE => 1,
            PageType::DICTIONARY_PAGE => 2,
            PageType::DATA_PAGE_V2 => 3,
        }
    }
}

impl TryFrom<i32> for PageType {
    type Error = ParquetError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => PageType::DATA_PAGE,
            1 => PageType::INDEX_PAGE,
            2 => PageType::DICTIONARY_PAGE,
            3 => PageType::DATA_PAGE_V2,
            _ => return Err(corrupt_err!("unexpected page type {}", value)),
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for ConvertedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_type_wire_roundtrip() {
        for t in [
            Type::BOOLEAN,
            Type::INT32,
            Type::INT64,
            Type::INT96,
            Type::FLOAT,
            Type::DOUBLE,
            Type::BYTE_ARRAY,
            Type::FIXED_LEN_BYTE_ARRAY,
        ] {
            assert_eq!(Type::try_from(t.as_wire()).unwrap(), t);
        }
        assert!(Type::try_from(8).is_err());
    }

    #[test]
    fn test_converted_type_wire_roundtrip() {
        for c in [
            ConvertedType::UTF8,
            ConvertedType::DATE,
            ConvertedType::TIMESTAMP_MILLIS,
            ConvertedType::TIMESTAMP_MICROS,
            ConvertedType::JSON,
            ConvertedType::BSON,
            ConvertedType::INTERVAL,
        ] {
            assert_eq!(ConvertedType::from_wire(c.as_wire().unwrap()).unwrap(), c);
        }
        // DECIMAL is carried through untouched
        assert_eq!(
            ConvertedType::from_wire(5).unwrap(),
            ConvertedType::OTHER(5)
        );
        assert!(ConvertedType::from_wire(22).is_err());
        assert_eq!(ConvertedType::NONE.as_wire(), None);
    }

    #[test]
    fn test_compression_wire_roundtrip() {
        for c in [
            Compression::UNCOMPRESSED,
            Compression::SNAPPY,
            Compression::GZIP,
            Compression::LZO,
            Compression::BROTLI,
            Compression::LZ4,
            Compression::ZSTD,
        ] {
            assert_eq!(Compression::try_from(c.as_wire()).unwrap(), c);
        }
        assert!(Compression::try_from(9).is_err());
    }

    #[test]
    fn test_page_type_display() {
        assert_eq!(PageType::DATA_PAGE_V2.to_string(), "DATA_PAGE_V2");
        assert_eq!(Encoding::PLAIN.to_string(), "PLAIN");
    }
}
