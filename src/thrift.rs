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

//! Thrift [compact protocol] reader and writer.
//!
//! Page headers and footer metadata are Thrift compact binary. Both sides
//! of the protocol live here: [`CompactSliceReader`] decodes from an
//! in-memory slice (all page and footer bytes are buffered before
//! decoding), [`CompactWriter`] encodes to any [`Write`]. Struct-level
//! serialization is hand-written next to each struct definition.
//!
//! [compact protocol]: https://github.com/apache/thrift/blob/master/doc/specs/thrift-compact-protocol.md

use std::io::Write;

use crate::errors::{ParquetError, Result};

/// Wire types used for struct fields and list elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FieldType {
    Stop = 0,
    BooleanTrue = 1,
    BooleanFalse = 2,
    Byte = 3,
    I16 = 4,
    I32 = 5,
    I64 = 6,
    Double = 7,
    Binary = 8,
    List = 9,
    Set = 10,
    Map = 11,
    Struct = 12,
}

impl TryFrom<u8> for FieldType {
    type Error = ParquetError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Stop),
            // inside lists booleans are a single data byte, and both
            // nibble values denote the bool element type
            1 => Ok(Self::BooleanTrue),
            2 => Ok(Self::BooleanFalse),
            3 => Ok(Self::Byte),
            4 => Ok(Self::I16),
            5 => Ok(Self::I32),
            6 => Ok(Self::I64),
            7 => Ok(Self::Double),
            8 => Ok(Self::Binary),
            9 => Ok(Self::List),
            10 => Ok(Self::Set),
            11 => Ok(Self::Map),
            12 => Ok(Self::Struct),
            _ => Err(corrupt_err!("unknown thrift field type {}", value)),
        }
    }
}

/// A decoded struct-field marker: wire type, resolved field id, and the
/// inline value for booleans (which carry no data bytes).
pub(crate) struct FieldMeta {
    pub(crate) field_type: FieldType,
    pub(crate) id: i16,
    pub(crate) bool_val: Option<bool>,
}

/// A decoded list header.
pub(crate) struct ListMeta {
    pub(crate) element_type: FieldType,
    pub(crate) size: usize,
}

/// Thrift compact protocol decoder over a byte slice.
pub(crate) struct CompactSliceReader<'a> {
    buf: &'a [u8],
}

impl<'a> CompactSliceReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed. The caller derives the encoded length of a
    /// parsed struct from the change in this value.
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8> {
        let ret = *self
            .buf
            .first()
            .ok_or_else(|| corrupt_err!("unexpected end of thrift data"))?;
        self.buf = &self.buf[1..];
        Ok(ret)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let ret = self
            .buf
            .get(..n)
            .ok_or_else(|| corrupt_err!("unexpected end of thrift data"))?;
        self.buf = &self.buf[n..];
        Ok(ret)
    }

    /// Read a ULEB128 varint.
    pub(crate) fn read_vlq(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            result |= ((byte & 0x7f) as u64).wrapping_shl(shift);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(corrupt_err!("thrift varint longer than 10 bytes"));
            }
        }
    }

    /// Read a zig-zag encoded signed varint.
    pub(crate) fn read_zig_zag(&mut self) -> Result<i64> {
        let val = self.read_vlq()?;
        Ok((val >> 1) as i64 ^ -((val & 1) as i64))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_zig_zag()? as i16)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_zig_zag()? as i32)
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        self.read_zig_zag()
    }

    pub(crate) fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_vlq()? as usize;
        self.take(len)
    }

    pub(crate) fn read_string(&mut self) -> Result<String> {
        let slice = self.read_bytes()?;
        String::from_utf8(slice.to_vec())
            .map_err(|_| corrupt_err!("invalid utf8 in thrift string"))
    }

    /// Read the field marker for the next struct field. `last_field_id`
    /// resolves the short-form field-id delta.
    pub(crate) fn read_field_meta(&mut self, last_field_id: i16) -> Result<FieldMeta> {
        let byte = self.read_byte()?;
        let delta = (byte & 0xf0) >> 4;
        let field_type = FieldType::try_from(byte & 0x0f)?;

        if field_type == FieldType::Stop {
            return Ok(FieldMeta {
                field_type,
                id: 0,
                bool_val: None,
            });
        }

        let bool_val = match field_type {
            FieldType::BooleanTrue => Some(true),
            FieldType::BooleanFalse => Some(false),
            _ => None,
        };
        let id = if delta != 0 {
            last_field_id
                .checked_add(delta as i16)
                .ok_or_else(|| corrupt_err!("thrift field id overflow"))?
        } else {
            self.read_i16()?
        };

        Ok(FieldMeta {
            field_type,
            id,
            bool_val,
        })
    }

    pub(crate) fn read_list_meta(&mut self) -> Result<ListMeta> {
        let header = self.read_byte()?;
        // a zero header is an empty list written without an element type
        if header == 0 {
            return Ok(ListMeta {
                element_type: FieldType::Byte,
                size: 0,
            });
        }
        let element_type = FieldType::try_from(header & 0x0f)?;
        let short_size = (header & 0xf0) >> 4;
        let size = if short_size != 0xf {
            short_size as usize
        } else {
            self.read_vlq()? as usize
        };
        Ok(ListMeta { element_type, size })
    }

    /// Skip over one value of the given wire type, recursing into structs
    /// and lists up to a fixed depth. Used for fields this crate does not
    /// model (column orders, encoding stats, ...).
    pub(crate) fn skip(&mut self, field_type: FieldType) -> Result<()> {
        self.skip_till_depth(field_type, 16)
    }

    fn skip_till_depth(&mut self, field_type: FieldType, depth: u8) -> Result<()> {
        if depth == 0 {
            return Err(corrupt_err!("thrift skip recursion limit reached"));
        }
        match field_type {
            FieldType::BooleanTrue | FieldType::BooleanFalse => Ok(()),
            FieldType::Byte => self.read_byte().map(|_| ()),
            FieldType::I16 | FieldType::I32 | FieldType::I64 => {
                self.read_zig_zag().map(|_| ())
            }
            FieldType::Double => self.take(8).map(|_| ()),
            FieldType::Binary => self.read_bytes().map(|_| ()),
            FieldType::Struct => {
                let mut last_field_id = 0i16;
                loop {
                    let field = self.read_field_meta(last_field_id)?;
                    if field.field_type == FieldType::Stop {
                        return Ok(());
                    }
                    self.skip_till_depth(field.field_type, depth - 1)?;
                    last_field_id = field.id;
                }
            }
            FieldType::List | FieldType::Set => {
                let list = self.read_list_meta()?;
                for _ in 0..list.size {
                    // boolean list elements carry a data byte
                    let elem = match list.element_type {
                        FieldType::BooleanTrue | FieldType::BooleanFalse => FieldType::Byte,
                        other => other,
                    };
                    self.skip_till_depth(elem, depth - 1)?;
                }
                Ok(())
            }
            FieldType::Map | FieldType::Stop => {
                Err(corrupt_err!("cannot skip thrift field type {:?}", field_type))
            }
        }
    }
}

/// Thrift compact protocol encoder over any [`Write`].
pub(crate) struct CompactWriter<W: Write> {
    sink: W,
}

impl<W: Write> CompactWriter<W> {
    pub(crate) fn new(sink: W) -> Self {
        Self { sink }
    }

    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.sink.write_all(&[b])?;
        Ok(())
    }

    pub(crate) fn write_vlq(&mut self, val: u64) -> Result<()> {
        let mut v = val;
        while v > 0x7f {
            self.write_byte(v as u8 | 0x80)?;
            v >>= 7;
        }
        self.write_byte(v as u8)
    }

    fn write_zig_zag(&mut self, val: i64) -> Result<()> {
        self.write_vlq(((val << 1) ^ (val >> 63)) as u64)
    }

    /// Write a struct-field marker, using the delta short form when the
    /// id gap fits in a nibble.
    pub(crate) fn write_field_begin(
        &mut self,
        field_type: FieldType,
        field_id: i16,
        last_field_id: i16,
    ) -> Result<()> {
        let delta = field_id.wrapping_sub(last_field_id);
        if delta > 0 && delta <= 0xf {
            self.write_byte((delta as u8) << 4 | field_type as u8)
        } else {
            self.write_byte(field_type as u8)?;
            self.write_i16(field_id)
        }
    }

    pub(crate) fn write_bool_field(
        &mut self,
        val: bool,
        field_id: i16,
        last_field_id: i16,
    ) -> Result<()> {
        let field_type = if val {
            FieldType::BooleanTrue
        } else {
            FieldType::BooleanFalse
        };
        self.write_field_begin(field_type, field_id, last_field_id)
    }

    pub(crate) fn write_list_begin(
        &mut self,
        element_type: FieldType,
        len: usize,
    ) -> Result<()> {
        if len < 15 {
            self.write_byte((len as u8) << 4 | element_type as u8)
        } else {
            self.write_byte(0xf0 | element_type as u8)?;
            self.write_vlq(len as u64)
        }
    }

    pub(crate) fn write_struct_end(&mut self) -> Result<()> {
        self.write_byte(0)
    }

    pub(crate) fn write_i16(&mut self, val: i16) -> Result<()> {
        self.write_zig_zag(val as i64)
    }

    pub(crate) fn write_i32(&mut self, val: i32) -> Result<()> {
        self.write_zig_zag(val as i64)
    }

    pub(crate) fn write_i64(&mut self, val: i64) -> Result<()> {
        self.write_zig_zag(val)
    }

    pub(crate) fn write_bytes(&mut self, val: &[u8]) -> Result<()> {
        self.write_vlq(val.len() as u64)?;
        self.sink.write_all(val)?;
        Ok(())
    }

    pub(crate) fn write_str(&mut self, val: &str) -> Result<()> {
        self.write_bytes(val.as_bytes())
    }
}
