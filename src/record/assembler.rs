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

//! Dremel record assembly.
//!
//! The assembler inverts the shredder. It keeps one counter per
//! repetition depth: a position with repetition level `r` increments the
//! counter at depth `r` and resets all deeper counters, which yields the
//! element index at every repeated ancestor. Positions with repetition
//! level 0 start records, so the depth-0 counter is the (one-based)
//! record index.
//!
//! Canonicalization: absent optionals stay absent in the output, and an
//! empty repeated container assembles as absent. Records therefore
//! round-trip up to that equivalence.

use crate::basic::{ConvertedType, Repetition};
use crate::data_type::{ColumnValues, Interval};
use crate::errors::{ParquetError, Result};
use crate::record::api::{Field, Row};
use crate::record::buffer::{ColumnBuffer, RowGroupBuffer};
use crate::schema::types::{BranchStep, ColumnDescriptor, ColumnPath, SchemaDescriptor};

/// Reconstructs all records of a row group. Yields exactly
/// `buffer.row_count()` rows with fields in schema order.
pub fn materialize_records(
    schema: &SchemaDescriptor,
    buffer: &RowGroupBuffer,
) -> Result<Vec<Row>> {
    debug_assert_eq!(schema.num_columns(), buffer.columns().len());
    let mut rows = vec![Row::new(); buffer.row_count()];
    for column in buffer.columns() {
        materialize_column_into(column, &mut rows)?;
    }
    Ok(rows)
}

/// Reconstructs the per-row view of a single column: the value (or
/// [`Field::Null`] when absent) for columns without repeated ancestry,
/// nested lists otherwise, one list level per repeated ancestor
/// including the leaf itself.
pub fn materialize_column(buffer: &RowGroupBuffer, path: &ColumnPath) -> Result<Vec<Field>> {
    let column = buffer
        .column_by_path(path)
        .ok_or_else(|| schema_err!("no column with path '{}'", path))?;
    materialize_column_values(column, buffer.row_count())
}

/// Walks one column's level streams, invoking `place` for every
/// position with the per-depth indices, the definition level and the
/// decoded value (for fully defined positions).
fn walk_levels<F>(column: &ColumnBuffer, num_rows: usize, mut place: F) -> Result<()>
where
    F: FnMut(usize, &[usize], i16, Option<Field>) -> Result<()>,
{
    let desc = column.descriptor();
    let max_def = desc.max_def_level();
    let max_rep = desc.max_rep_level();
    let mut counters = vec![0usize; max_rep as usize + 1];
    let mut next_value = 0usize;

    for i in 0..column.num_levels() {
        let d = column.def_levels()[i];
        let r = column.rep_levels()[i];
        if d < 0 || d > max_def {
            return Err(corrupt_err!(
                "column '{}': definition level {} outside [0, {}]",
                desc.path(),
                d,
                max_def
            ));
        }
        if r < 0 || r > max_rep {
            return Err(corrupt_err!(
                "column '{}': repetition level {} outside [0, {}]",
                desc.path(),
                r,
                max_rep
            ));
        }
        if i == 0 && r != 0 {
            return Err(corrupt_err!(
                "column '{}' does not start at a record boundary",
                desc.path()
            ));
        }

        counters[r as usize] += 1;
        for deeper in counters[r as usize + 1..].iter_mut() {
            *deeper = 0;
        }

        let value = if d == max_def {
            if next_value >= column.num_values() {
                return Err(corrupt_err!(
                    "column '{}': more defined positions than values",
                    desc.path()
                ));
            }
            let field = value_to_field(column.values(), next_value, desc)?;
            next_value += 1;
            Some(field)
        } else {
            None
        };

        let row_index = counters[0] - 1;
        if row_index >= num_rows {
            return Err(corrupt_err!(
                "column '{}': more record starts than the {} rows of the group",
                desc.path(),
                num_rows
            ));
        }
        place(row_index, &counters[1..], d, value)?;
    }

    if next_value != column.num_values() {
        return Err(corrupt_err!(
            "column '{}': {} values but only {} defined positions",
            desc.path(),
            column.num_values(),
            next_value
        ));
    }
    if counters[0] != num_rows {
        return Err(corrupt_err!(
            "column '{}': {} record starts in a group of {} rows",
            desc.path(),
            counters[0],
            num_rows
        ));
    }
    Ok(())
}

fn materialize_column_into(column: &ColumnBuffer, rows: &mut [Row]) -> Result<()> {
    let desc = column.descriptor().clone();
    let num_rows = rows.len();
    walk_levels(column, num_rows, |row_index, indices, d, value| {
        place_record_field(&mut rows[row_index], desc.branch(), indices, d, value);
        Ok(())
    })
}

pub(crate) fn materialize_column_values(
    column: &ColumnBuffer,
    num_rows: usize,
) -> Result<Vec<Field>> {
    let desc = column.descriptor().clone();
    // definition level required for each nested list level to exist
    let list_levels: Vec<i16> = desc
        .branch()
        .iter()
        .filter(|step| step.node.repetition() == Some(Repetition::REPEATED))
        .map(|step| step.def_level)
        .collect();
    let mut rows = vec![Field::Null; num_rows];
    walk_levels(column, num_rows, |row_index, indices, d, value| {
        place_column_value(&mut rows[row_index], &list_levels, indices, d, value);
        Ok(())
    })?;
    Ok(rows)
}

/// Places one position into a record, creating the enclosing groups and
/// lists its definition level proves to exist.
fn place_record_field(
    row: &mut Row,
    branch: &[BranchStep],
    indices: &[usize],
    d: i16,
    value: Option<Field>,
) {
    let step = &branch[0];
    if d < step.def_level {
        // the branch is absent below this depth
        return;
    }
    let repeated = step.node.repetition() == Some(Repetition::REPEATED);
    let slot = row.entry(step.node.name());

    if branch.len() > 1 {
        if repeated {
            if slot.is_null() {
                *slot = Field::List(Vec::new());
            }
            let Field::List(items) = slot else {
                unreachable!("repeated group slot is always a list")
            };
            let index = indices[0];
            while items.len() <= index {
                items.push(Field::Group(Row::new()));
            }
            let Field::Group(inner) = &mut items[index] else {
                unreachable!("repeated group elements are always groups")
            };
            place_record_field(inner, &branch[1..], &indices[1..], d, value);
        } else {
            if slot.is_null() {
                *slot = Field::Group(Row::new());
            }
            let Field::Group(inner) = slot else {
                unreachable!("group slot is always a group")
            };
            place_record_field(inner, &branch[1..], indices, d, value);
        }
    } else if repeated {
        if slot.is_null() {
            *slot = Field::List(Vec::new());
        }
        let Field::List(items) = slot else {
            unreachable!("repeated leaf slot is always a list")
        };
        if let Some(v) = value {
            let index = indices[0];
            while items.len() <= index {
                items.push(Field::Null);
            }
            items[index] = v;
        }
    } else if let Some(v) = value {
        *slot = v;
    }
}

/// Places one position into a column-iteration slot: nested lists down
/// to the deepest repeated ancestor the definition level proves, then
/// the value (or nothing, leaving the slot absent).
fn place_column_value(
    slot: &mut Field,
    list_levels: &[i16],
    indices: &[usize],
    d: i16,
    value: Option<Field>,
) {
    match list_levels.split_first() {
        None => {
            if let Some(v) = value {
                *slot = v;
            }
        }
        Some((level, rest)) => {
            if d < *level {
                return;
            }
            if slot.is_null() {
                *slot = Field::List(Vec::new());
            }
            let Field::List(items) = slot else {
                unreachable!("list slot is always a list")
            };
            let index = indices[0];
            while items.len() <= index {
                items.push(Field::Null);
            }
            place_column_value(&mut items[index], rest, &indices[1..], d, value);
        }
    }
}

/// Converts a stored value back to its record form, applying the
/// converted-type annotation.
fn value_to_field(
    values: &ColumnValues,
    index: usize,
    desc: &ColumnDescriptor,
) -> Result<Field> {
    let converted = desc.converted_type();
    Ok(match values {
        ColumnValues::Bool(v) => Field::Bool(v[index]),
        ColumnValues::Int32(v) => match converted {
            ConvertedType::DATE => Field::Date(v[index]),
            _ => Field::Int(v[index]),
        },
        ColumnValues::Int64(v) => match converted {
            ConvertedType::TIMESTAMP_MILLIS => Field::TimestampMillis(v[index]),
            ConvertedType::TIMESTAMP_MICROS => Field::TimestampMicros(v[index]),
            _ => Field::Long(v[index]),
        },
        ColumnValues::Int96(v) => Field::Int96(v[index]),
        ColumnValues::Float(v) => Field::Float(v[index]),
        ColumnValues::Double(v) => Field::Double(v[index]),
        ColumnValues::ByteArray(v) => match converted {
            ConvertedType::UTF8 => {
                let s = v[index].as_utf8().ok_or_else(|| {
                    corrupt_err!("column '{}': invalid UTF8 value", desc.path())
                })?;
                Field::Str(s.to_owned())
            }
            _ => Field::Bytes(v[index].clone()),
        },
        ColumnValues::FixedLenByteArray(v) => match converted {
            ConvertedType::INTERVAL => {
                let bytes: [u8; 12] = v[index].as_bytes().try_into().map_err(|_| {
                    corrupt_err!(
                        "column '{}': INTERVAL value is not 12 bytes",
                        desc.path()
                    )
                })?;
                Field::Interval(Interval::from_le_bytes(bytes))
            }
            _ => Field::Bytes(v[index].clone()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::record::buffer::RowGroupBuffer;
    use crate::record::shredder::tests::{
        dremel_record_a, dremel_record_b, group, row, shredded_dremel_buffer, str_field,
    };
    use crate::schema::types::tests::doc_schema;

    #[test]
    fn test_dremel_roundtrip() {
        let buffer = shredded_dremel_buffer();
        let rows = materialize_records(buffer.schema(), &buffer).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], dremel_record_a());
        assert_eq!(rows[1], dremel_record_b());
    }

    #[test]
    fn test_optional_empty_nested_canonicalization() {
        let schema = {
            use crate::basic::{ConvertedType, Repetition, Type};
            use crate::schema::types::{SchemaDescriptor, SchemaNode};
            let fruit = SchemaNode::group_builder("fruit")
                .with_repetition(Repetition::OPTIONAL)
                .with_fields(vec![
                    SchemaNode::leaf_builder("color", Type::BYTE_ARRAY)
                        .with_converted_type(ConvertedType::UTF8)
                        .with_repetition(Repetition::REPEATED)
                        .build()
                        .unwrap(),
                    SchemaNode::leaf_builder("type", Type::BYTE_ARRAY)
                        .with_converted_type(ConvertedType::UTF8)
                        .with_repetition(Repetition::OPTIONAL)
                        .build()
                        .unwrap(),
                ])
                .build()
                .unwrap();
            let root = SchemaNode::group_builder("m")
                .with_fields(vec![fruit])
                .build()
                .unwrap();
            Arc::new(SchemaDescriptor::new(root).unwrap())
        };
        let mut buffer = RowGroupBuffer::new(schema.clone());
        buffer.shred_record(&row(vec![])).unwrap();
        buffer.shred_record(&row(vec![("fruit", group(vec![]))])).unwrap();
        buffer
            .shred_record(&row(vec![("fruit", group(vec![("color", Field::List(vec![]))]))]))
            .unwrap();
        buffer
            .shred_record(&row(vec![(
                "fruit",
                group(vec![
                    (
                        "color",
                        Field::List(vec![str_field("red"), str_field("blue")]),
                    ),
                    ("type", str_field("x")),
                ]),
            )]))
            .unwrap();

        let rows = materialize_records(&schema, &buffer).unwrap();
        assert_eq!(rows[0], row(vec![]));
        assert_eq!(rows[1], row(vec![("fruit", group(vec![]))]));
        // the empty repeated container canonicalizes to absent
        assert_eq!(rows[2], row(vec![("fruit", group(vec![]))]));
        assert_eq!(
            rows[3],
            row(vec![(
                "fruit",
                group(vec![
                    (
                        "color",
                        Field::List(vec![str_field("red"), str_field("blue")]),
                    ),
                    ("type", str_field("x")),
                ]),
            )])
        );
    }

    #[test]
    fn test_materialize_single_columns() {
        let buffer = shredded_dremel_buffer();

        let doc_ids =
            materialize_column(&buffer, &ColumnPath::from("DocId")).unwrap();
        assert_eq!(doc_ids, vec![Field::Long(10), Field::Long(20)]);

        let forward =
            materialize_column(&buffer, &ColumnPath::from("Links.Forward")).unwrap();
        assert_eq!(
            forward,
            vec![
                Field::List(vec![
                    Field::Long(20),
                    Field::Long(40),
                    Field::Long(60)
                ]),
                Field::List(vec![Field::Long(80)]),
            ]
        );

        let codes =
            materialize_column(&buffer, &ColumnPath::from("Name.Language.Code")).unwrap();
        assert_eq!(
            codes,
            vec![
                Field::List(vec![
                    Field::List(vec![str_field("en-us"), str_field("en")]),
                    Field::Null,
                    Field::List(vec![str_field("en-gb")]),
                ]),
                Field::List(vec![Field::Null]),
            ]
        );

        let urls = materialize_column(&buffer, &ColumnPath::from("Name.Url")).unwrap();
        assert_eq!(
            urls,
            vec![
                Field::List(vec![
                    str_field("http://A"),
                    str_field("http://B"),
                    Field::Null,
                ]),
                Field::List(vec![str_field("http://C")]),
            ]
        );
    }

    #[test]
    fn test_unknown_column_path() {
        let buffer = shredded_dremel_buffer();
        let err = materialize_column(&buffer, &ColumnPath::from("Nope")).unwrap_err();
        assert!(matches!(err, ParquetError::SchemaMismatch(_)));
    }

    fn corrupt_buffer(
        def_levels: Vec<i16>,
        rep_levels: Vec<i16>,
        values: Vec<i64>,
        row_count: usize,
    ) -> RowGroupBuffer {
        use crate::record::buffer::ColumnBuffer;
        let schema = Arc::new(doc_schema());
        let mut columns = Vec::new();
        for (i, desc) in schema.columns().iter().enumerate() {
            if i == 0 {
                columns.push(ColumnBuffer::from_parts(
                    desc.clone(),
                    def_levels.clone(),
                    rep_levels.clone(),
                    ColumnValues::Int64(values.clone()),
                ));
            } else {
                // placeholders so other columns stay consistent
                columns.push(ColumnBuffer::from_parts(
                    desc.clone(),
                    vec![0; row_count],
                    vec![0; row_count],
                    ColumnValues::new(desc.physical_type()),
                ));
            }
        }
        RowGroupBuffer::from_parts(schema, columns, row_count)
    }

    #[test]
    fn test_definition_level_overflow_is_corrupt() {
        let buffer = corrupt_buffer(vec![1], vec![0], vec![], 1);
        let err = materialize_records(&doc_schema(), &buffer).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_repetition_level_overflow_is_corrupt() {
        let buffer = corrupt_buffer(vec![0, 0], vec![0, 1], vec![10, 20], 2);
        let err = materialize_records(&doc_schema(), &buffer).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_value_count_mismatch_is_corrupt() {
        // two defined positions, one value
        let buffer = corrupt_buffer(vec![0, 0], vec![0, 0], vec![10], 2);
        let err = materialize_records(&doc_schema(), &buffer).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));

        // one defined position, two values
        let buffer = corrupt_buffer(vec![0], vec![0], vec![10, 20], 1);
        let err = materialize_records(&doc_schema(), &buffer).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_row_count_mismatch_is_corrupt() {
        let buffer = corrupt_buffer(vec![0, 0], vec![0, 0], vec![10, 20], 3);
        let err = materialize_records(&doc_schema(), &buffer).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }
}
