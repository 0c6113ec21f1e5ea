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

//! Column chunk statistics.
//!
//! Per chunk the writer records the null count (positions below the
//! maximum definition level), the exact distinct count, and min/max
//! values under type-aware ordering: numeric order for numerics,
//! unsigned byte-wise order for byte arrays. Min/max are stored in the
//! PLAIN representation, so BYTE_ARRAY extremes carry their 4-byte
//! length prefix. INT96 columns record no extremes; their byte order is
//! not meaningful. On read, `distinct_count` is advisory: ecosystem
//! writers routinely omit it.

use std::collections::HashSet;

use crate::data_type::ColumnValues;
use crate::encodings::plain;
use crate::errors::Result;
use crate::record::ColumnBuffer;
use crate::thrift::{CompactSliceReader, CompactWriter, FieldType};

/// Statistics of one column chunk, as stored in its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Count of positions whose definition level is below the maximum.
    pub null_count: Option<i64>,
    /// Count of distinct stored values.
    pub distinct_count: Option<i64>,
    /// PLAIN-encoded minimum value.
    pub min_value: Option<Vec<u8>>,
    /// PLAIN-encoded maximum value.
    pub max_value: Option<Vec<u8>>,
}

impl Statistics {
    /// Computes the statistics of a shredded column stream.
    pub(crate) fn from_column(column: &ColumnBuffer) -> Self {
        let values = column.values();
        let mut distinct = HashSet::new();
        for i in 0..values.len() {
            distinct.insert(plain::encode_single(values, i));
        }
        let (min_value, max_value) = match min_max_indices(values) {
            Some((min_i, max_i)) => (
                Some(plain::encode_single(values, min_i)),
                Some(plain::encode_single(values, max_i)),
            ),
            None => (None, None),
        };
        Self {
            null_count: Some(column.null_count() as i64),
            distinct_count: Some(distinct.len() as i64),
            min_value,
            max_value,
        }
    }

    pub(crate) fn write_thrift<W: std::io::Write>(
        &self,
        w: &mut CompactWriter<W>,
    ) -> Result<()> {
        let mut last_id = 0i16;
        if let Some(nulls) = self.null_count {
            w.write_field_begin(FieldType::I64, 3, last_id)?;
            w.write_i64(nulls)?;
            last_id = 3;
        }
        if let Some(distinct) = self.distinct_count {
            w.write_field_begin(FieldType::I64, 4, last_id)?;
            w.write_i64(distinct)?;
            last_id = 4;
        }
        if let Some(max) = &self.max_value {
            w.write_field_begin(FieldType::Binary, 5, last_id)?;
            w.write_bytes(max)?;
            last_id = 5;
        }
        if let Some(min) = &self.min_value {
            w.write_field_begin(FieldType::Binary, 6, last_id)?;
            w.write_bytes(min)?;
        }
        w.write_struct_end()
    }

    pub(crate) fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut stats = Statistics::default();
        let mut legacy_min = None;
        let mut legacy_max = None;
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => break,
                _ => match field.id {
                    1 => legacy_max = Some(r.read_bytes()?.to_vec()),
                    2 => legacy_min = Some(r.read_bytes()?.to_vec()),
                    3 => stats.null_count = Some(r.read_i64()?),
                    4 => stats.distinct_count = Some(r.read_i64()?),
                    5 => stats.max_value = Some(r.read_bytes()?.to_vec()),
                    6 => stats.min_value = Some(r.read_bytes()?.to_vec()),
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
        // fall back to the deprecated min/max fields of older writers
        if stats.min_value.is_none() {
            stats.min_value = legacy_min;
        }
        if stats.max_value.is_none() {
            stats.max_value = legacy_max;
        }
        Ok(stats)
    }
}

/// Positions of the minimum and maximum value under the type's
/// ordering, `None` for empty streams and for INT96.
fn min_max_indices(values: &ColumnValues) -> Option<(usize, usize)> {
    fn extremes<T, F>(v: &[T], less: F) -> Option<(usize, usize)>
    where
        F: Fn(&T, &T) -> bool,
    {
        if v.is_empty() {
            return None;
        }
        let mut min_i = 0;
        let mut max_i = 0;
        for i in 1..v.len() {
            if less(&v[i], &v[min_i]) {
                min_i = i;
            }
            if less(&v[max_i], &v[i]) {
                max_i = i;
            }
        }
        Some((min_i, max_i))
    }

    match values {
        ColumnValues::Bool(v) => extremes(v, |a, b| !a & b),
        ColumnValues::Int32(v) => extremes(v, |a, b| a < b),
        ColumnValues::Int64(v) => extremes(v, |a, b| a < b),
        ColumnValues::Int96(_) => None,
        ColumnValues::Float(v) => extremes(v, |a, b| a.total_cmp(b).is_lt()),
        ColumnValues::Double(v) => extremes(v, |a, b| a.total_cmp(b).is_lt()),
        ColumnValues::ByteArray(v) | ColumnValues::FixedLenByteArray(v) => {
            extremes(v, |a, b| a < b)
        }
    }
}
