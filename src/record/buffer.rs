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

//! In-memory column streams.
//!
//! A [`RowGroupBuffer`] holds, for every leaf of a schema, the three
//! parallel streams of the Dremel model: definition levels, repetition
//! levels and values. The shredder appends to it record by record; the
//! column decoder fills the identical shape when reading, so assembly
//! works from either side.

use crate::data_type::ColumnValues;
use crate::schema::types::{ColumnDescPtr, ColumnPath, SchemaDescPtr};

/// The three parallel streams of one column.
///
/// `def_levels` and `rep_levels` always have the same length; `values`
/// holds one entry per position where the definition level reaches the
/// column's maximum.
#[derive(Debug)]
pub struct ColumnBuffer {
    desc: ColumnDescPtr,
    pub(crate) def_levels: Vec<i16>,
    pub(crate) rep_levels: Vec<i16>,
    pub(crate) values: ColumnValues,
}

impl ColumnBuffer {
    /// An empty stream for the given column.
    pub fn new(desc: ColumnDescPtr) -> Self {
        let values = ColumnValues::new(desc.physical_type());
        Self {
            desc,
            def_levels: Vec::new(),
            rep_levels: Vec::new(),
            values,
        }
    }

    /// Builds a buffer from decoded streams.
    pub(crate) fn from_parts(
        desc: ColumnDescPtr,
        def_levels: Vec<i16>,
        rep_levels: Vec<i16>,
        values: ColumnValues,
    ) -> Self {
        debug_assert_eq!(def_levels.len(), rep_levels.len());
        Self {
            desc,
            def_levels,
            rep_levels,
            values,
        }
    }

    /// The column this stream belongs to.
    pub fn descriptor(&self) -> &ColumnDescPtr {
        &self.desc
    }

    /// Total number of emitted positions, values and placeholders alike.
    pub fn num_levels(&self) -> usize {
        self.def_levels.len()
    }

    /// Number of materialized values.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Number of positions with a definition level below the maximum.
    pub fn null_count(&self) -> u64 {
        let max = self.desc.max_def_level();
        self.def_levels.iter().filter(|d| **d < max).count() as u64
    }

    /// Definition level stream.
    pub fn def_levels(&self) -> &[i16] {
        &self.def_levels
    }

    /// Repetition level stream.
    pub fn rep_levels(&self) -> &[i16] {
        &self.rep_levels
    }

    /// Value stream.
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }
}

/// Accumulated streams for every column of one row group.
#[derive(Debug)]
pub struct RowGroupBuffer {
    schema: SchemaDescPtr,
    columns: Vec<ColumnBuffer>,
    pub(crate) row_count: usize,
}

impl RowGroupBuffer {
    /// An empty buffer for the given schema.
    pub fn new(schema: SchemaDescPtr) -> Self {
        let columns = schema.columns().iter().cloned().map(ColumnBuffer::new).collect();
        Self {
            schema,
            columns,
            row_count: 0,
        }
    }

    /// Builds a buffer from decoded columns.
    pub(crate) fn from_parts(
        schema: SchemaDescPtr,
        columns: Vec<ColumnBuffer>,
        row_count: usize,
    ) -> Self {
        Self {
            schema,
            columns,
            row_count,
        }
    }

    /// The schema the buffer was created for.
    pub fn schema(&self) -> &SchemaDescPtr {
        &self.schema
    }

    /// Number of records shredded into (or decoded into) this buffer.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Whether any record has been appended.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Column streams in schema order.
    pub fn columns(&self) -> &[ColumnBuffer] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [ColumnBuffer] {
        &mut self.columns
    }

    /// The stream of the column with the given path.
    pub fn column_by_path(&self, path: &ColumnPath) -> Option<&ColumnBuffer> {
        self.schema.index_of(path).map(|i| &self.columns[i])
    }

    /// Resets the buffer for the next row group, keeping allocations'
    /// column layout.
    pub fn clear(&mut self) {
        let schema = self.schema.clone();
        *self = Self::new(schema);
    }
}
