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

//! Dremel record shredding.
//!
//! [`shred_record`] walks a record against the schema tree and appends,
//! for every leaf column, values plus definition and repetition levels:
//!
//! * a present leaf emits its value at the leaf's maximum definition
//!   level;
//! * an absent optional (or empty repeated) branch emits one placeholder
//!   at the level of the deepest present ancestor;
//! * the first emission for a record carries the repetition level
//!   inherited from the enclosing context (0 at the record root), later
//!   elements of a repeated field carry that field's maximum repetition
//!   level.
//!
//! Failures leave the buffer with a partially appended record; callers
//! must treat the buffer as unusable afterwards (the file writer does).

use crate::basic::{ConvertedType, Repetition};
use crate::data_type::ColumnValues;
use crate::errors::{ParquetError, Result};
use crate::record::api::{Field, Row};
use crate::record::buffer::{ColumnBuffer, RowGroupBuffer};
use crate::schema::types::{NodePtr, SchemaDescriptor};

/// Appends one record to the buffer and increments its row count.
///
/// A scalar supplied where the schema declares REPEATED is treated as a
/// one-element list. A list longer than one element supplied to a
/// non-repeated field, an absent required field, and any value of the
/// wrong type are [`ParquetError::SchemaMismatch`].
pub fn shred_record(
    schema: &SchemaDescriptor,
    record: &Row,
    buffer: &mut RowGroupBuffer,
) -> Result<()> {
    let root = schema.root().clone();
    let mut cursor = 0usize;
    shred_fields(
        root.fields(),
        Some(record),
        0,
        0,
        0,
        buffer.columns_mut(),
        &mut cursor,
    )?;
    buffer.row_count += 1;
    Ok(())
}

impl RowGroupBuffer {
    /// Appends one record; see [`shred_record`].
    pub fn shred_record(&mut self, record: &Row) -> Result<()> {
        let schema = self.schema().clone();
        shred_record(&schema, record, self)
    }
}

/// The occurrences a record supplies for one schema field.
enum Occurrences<'a> {
    Absent,
    One(&'a Field),
    Many(&'a [Field]),
}

impl<'a> Occurrences<'a> {
    fn len(&self) -> usize {
        match self {
            Occurrences::Absent => 0,
            Occurrences::One(_) => 1,
            Occurrences::Many(items) => items.len(),
        }
    }

    fn get(&self, i: usize) -> &'a Field {
        match *self {
            Occurrences::Absent => unreachable!("absent field has no occurrences"),
            Occurrences::One(field) => field,
            Occurrences::Many(items) => &items[i],
        }
    }
}

/// Shreds the fields of one schema level.
///
/// * `record`: the group value at this level; `None` when an ancestor
///   was absent and only placeholders are emitted.
/// * `rep`: repetition level for the first emission at this level.
/// * `def`: definition level of the deepest present ancestor.
/// * `rep_max`: repetition level max of the enclosing context.
/// * `cursor`: index of the next leaf column; each field consumes the
///   contiguous run of columns beneath it.
fn shred_fields(
    fields: &[NodePtr],
    record: Option<&Row>,
    rep: i16,
    def: i16,
    rep_max: i16,
    columns: &mut [ColumnBuffer],
    cursor: &mut usize,
) -> Result<()> {
    for node in fields {
        let repetition = node
            .repetition()
            .expect("non-root nodes always carry a repetition");
        let supplied = record.and_then(|r| r.get(node.name()));
        let occurrences = match supplied {
            None | Some(Field::Null) => Occurrences::Absent,
            Some(Field::List(items)) if items.is_empty() => Occurrences::Absent,
            Some(Field::List(items)) => Occurrences::Many(items),
            Some(field) => Occurrences::One(field),
        };

        if occurrences.len() == 0 {
            if record.is_some() && repetition == Repetition::REQUIRED {
                return Err(schema_err!(
                    "missing required field '{}'",
                    node.name()
                ));
            }
            emit_placeholders(node, rep, def, columns, cursor)?;
            continue;
        }
        if occurrences.len() > 1 && repetition != Repetition::REPEATED {
            return Err(schema_err!(
                "field '{}' is not repeated but got {} values",
                node.name(),
                occurrences.len()
            ));
        }

        let child_def = match repetition {
            Repetition::REQUIRED => def,
            Repetition::OPTIONAL | Repetition::REPEATED => def + 1,
        };
        let child_rep_max = match repetition {
            Repetition::REPEATED => rep_max + 1,
            _ => rep_max,
        };

        let start = *cursor;
        for i in 0..occurrences.len() {
            *cursor = start;
            let value = occurrences.get(i);
            // later elements of a repeated field start at its own level
            let rep_i = if i == 0 { rep } else { child_rep_max };
            if node.is_leaf() {
                let column = &mut columns[*cursor];
                push_leaf_value(column, node, value)?;
                column.def_levels.push(child_def);
                column.rep_levels.push(rep_i);
                *cursor += 1;
            } else {
                let group = match value {
                    Field::Group(row) => row,
                    other => {
                        return Err(schema_err!(
                            "field '{}' is a group but got {}",
                            node.name(),
                            other
                        ));
                    }
                };
                shred_fields(
                    node.fields(),
                    Some(group),
                    rep_i,
                    child_def,
                    child_rep_max,
                    columns,
                    cursor,
                )?;
            }
        }
    }
    Ok(())
}

/// Emits one placeholder per leaf beneath `node` at the levels of the
/// deepest present ancestor.
fn emit_placeholders(
    node: &NodePtr,
    rep: i16,
    def: i16,
    columns: &mut [ColumnBuffer],
    cursor: &mut usize,
) -> Result<()> {
    if node.is_leaf() {
        let column = &mut columns[*cursor];
        column.def_levels.push(def);
        column.rep_levels.push(rep);
        *cursor += 1;
        Ok(())
    } else {
        shred_fields(node.fields(), None, rep, def, 0, columns, cursor)
    }
}

/// Converts a record value to the column's physical representation and
/// appends it, honoring the converted-type annotation.
fn push_leaf_value(column: &mut ColumnBuffer, node: &NodePtr, value: &Field) -> Result<()> {
    let desc = column.descriptor().clone();
    let converted = desc.converted_type();
    match (&mut column.values, value) {
        (ColumnValues::Bool(v), Field::Bool(b)) => v.push(*b),
        (ColumnValues::Int32(v), Field::Int(x)) => v.push(*x),
        (ColumnValues::Int32(v), Field::Date(x)) if converted == ConvertedType::DATE => {
            v.push(*x)
        }
        (ColumnValues::Int64(v), Field::Long(x)) => v.push(*x),
        (ColumnValues::Int64(v), Field::Int(x)) => v.push(*x as i64),
        (ColumnValues::Int64(v), Field::TimestampMillis(x))
            if converted == ConvertedType::TIMESTAMP_MILLIS =>
        {
            v.push(*x)
        }
        (ColumnValues::Int64(v), Field::TimestampMicros(x))
            if converted == ConvertedType::TIMESTAMP_MICROS =>
        {
            v.push(*x)
        }
        (ColumnValues::Int96(v), Field::Int96(x)) => v.push(*x),
        (ColumnValues::Float(v), Field::Float(x)) => v.push(*x),
        (ColumnValues::Float(v), Field::Double(x)) => v.push(*x as f32),
        (ColumnValues::Double(v), Field::Double(x)) => v.push(*x),
        (ColumnValues::Double(v), Field::Float(x)) => v.push(*x as f64),
        (ColumnValues::ByteArray(v), Field::Str(s)) => v.push(s.as_str().into()),
        (ColumnValues::ByteArray(v), Field::Bytes(b)) => v.push(b.clone()),
        (ColumnValues::FixedLenByteArray(v), Field::Interval(iv))
            if converted == ConvertedType::INTERVAL =>
        {
            v.push(iv.to_le_bytes().as_slice().into())
        }
        (ColumnValues::FixedLenByteArray(v), Field::Bytes(b)) => {
            let expected = desc.type_length() as usize;
            if b.len() != expected {
                return Err(schema_err!(
                    "field '{}' expects {} bytes, got {}",
                    node.name(),
                    expected,
                    b.len()
                ));
            }
            v.push(b.clone());
        }
        (values, field) => {
            return Err(schema_err!(
                "cannot store {} into {} field '{}'",
                field,
                values.physical_type(),
                node.name()
            ));
        }
    }
    debug_assert_eq!(column.values.physical_type(), desc.physical_type());
    Ok(())
}
