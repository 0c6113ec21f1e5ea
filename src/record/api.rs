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

//! Dynamic records: the unit the shredder consumes and the assembler
//! produces.
//!
//! A [`Row`] is an ordered set of named [`Field`]s. Nested groups are
//! rows again, repeated fields are lists. Absent optional fields are
//! simply not present in the row; [`Field::Null`] appears only inside
//! lists materialized by column iteration.

use std::fmt;

use chrono::{DateTime, NaiveDate};

use crate::data_type::{ByteArray, Int96, Interval};
use crate::errors::{ParquetError, Result};

/// A single value of any supported type.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// An absent value; produced by column iteration for undefined
    /// positions.
    Null,
    /// BOOLEAN.
    Bool(bool),
    /// INT32.
    Int(i32),
    /// INT64.
    Long(i64),
    /// INT96.
    Int96(Int96),
    /// FLOAT.
    Float(f32),
    /// DOUBLE.
    Double(f64),
    /// BYTE_ARRAY annotated UTF8.
    Str(String),
    /// BYTE_ARRAY or FIXED_LEN_BYTE_ARRAY, unannotated or BSON/JSON.
    Bytes(ByteArray),
    /// INT32 annotated DATE; days since the Unix epoch.
    Date(i32),
    /// INT64 annotated TIMESTAMP_MILLIS.
    TimestampMillis(i64),
    /// INT64 annotated TIMESTAMP_MICROS.
    TimestampMicros(i64),
    /// FIXED_LEN_BYTE_ARRAY(12) annotated INTERVAL.
    Interval(Interval),
    /// A nested group.
    Group(Row),
    /// A repeated field's values.
    List(Vec<Field>),
}

impl Field {
    /// Whether this is [`Field::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Null => write!(f, "null"),
            Field::Bool(v) => write!(f, "{v}"),
            Field::Int(v) => write!(f, "{v}"),
            Field::Long(v) => write!(f, "{v}"),
            Field::Int96(v) => write!(f, "{v}"),
            Field::Float(v) => write!(f, "{v:?}"),
            Field::Double(v) => write!(f, "{v:?}"),
            Field::Str(v) => write!(f, "{v:?}"),
            Field::Bytes(v) => write!(f, "{v:?}"),
            Field::Date(days) => {
                let date = NaiveDate::from_num_days_from_ce_opt(*days + 719_163);
                match date {
                    Some(d) => write!(f, "{d}"),
                    None => write!(f, "Date({days})"),
                }
            }
            Field::TimestampMillis(ms) => match DateTime::from_timestamp_millis(*ms) {
                Some(ts) => write!(f, "{}", ts.naive_utc()),
                None => write!(f, "TimestampMillis({ms})"),
            },
            Field::TimestampMicros(us) => match DateTime::from_timestamp_micros(*us) {
                Some(ts) => write!(f, "{}", ts.naive_utc()),
                None => write!(f, "TimestampMicros({us})"),
            },
            Field::Interval(iv) => {
                write!(f, "{}m {}d {}ms", iv.months, iv.days, iv.millis)
            }
            Field::Group(row) => write!(f, "{row}"),
            Field::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An ordered collection of named fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Field)>,
}

impl Row {
    /// An empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// A row from name/value pairs, kept in the given order.
    pub fn from_fields(fields: Vec<(String, Field)>) -> Self {
        Self { fields }
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Appends a field. An existing field of the same name is
    /// overwritten in place.
    pub fn set(&mut self, name: &str, value: Field) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_owned(), value)),
        }
    }

    /// Iterates name/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The field with the given name, inserting [`Field::Null`] first if
    /// absent. Used by the assembler to create structure incrementally.
    pub(crate) fn entry(&mut self, name: &str) -> &mut Field {
        let pos = match self.fields.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.fields.push((name.to_owned(), Field::Null));
                self.fields.len() - 1
            }
        };
        &mut self.fields[pos].1
    }

    /// Typed accessor for a BOOLEAN field.
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Some(Field::Bool(v)) => Ok(*v),
            other => Err(type_mismatch(name, "BOOLEAN", other)),
        }
    }

    /// Typed accessor for an INT64 field.
    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(Field::Long(v)) => Ok(*v),
            Some(Field::Int(v)) => Ok(*v as i64),
            other => Err(type_mismatch(name, "INT64", other)),
        }
    }

    /// Typed accessor for a UTF8 field.
    pub fn get_string(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(Field::Str(v)) => Ok(v),
            other => Err(type_mismatch(name, "UTF8", other)),
        }
    }

    /// Typed accessor for a nested group.
    pub fn get_group(&self, name: &str) -> Result<&Row> {
        match self.get(name) {
            Some(Field::Group(v)) => Ok(v),
            other => Err(type_mismatch(name, "group", other)),
        }
    }

    /// Typed accessor for a repeated field.
    pub fn get_list(&self, name: &str) -> Result<&[Field]> {
        match self.get(name) {
            Some(Field::List(v)) => Ok(v),
            other => Err(type_mismatch(name, "list", other)),
        }
    }
}

fn type_mismatch(name: &str, expected: &str, actual: Option<&Field>) -> ParquetError {
    match actual {
        Some(field) => schema_err!("field '{}' is not {}: {}", name, expected, field),
        None => schema_err!("field '{}' is not present", name),
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get_and_set() {
        let mut row = Row::new();
        row.set("a", Field::Int(1));
        row.set("b", Field::Str("x".into()));
        row.set("a", Field::Int(2));
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("a"), Some(&Field::Int(2)));
        assert_eq!(row.get_string("b").unwrap(), "x");
        assert!(row.get("c").is_none());
    }

    #[test]
    fn test_typed_accessor_mismatch() {
        let row = Row::from_fields(vec![("a".into(), Field::Int(1))]);
        let err = row.get_string("a").unwrap_err();
        assert!(matches!(err, ParquetError::SchemaMismatch(_)));
        let err = row.get_long("missing").unwrap_err();
        assert!(matches!(err, ParquetError::SchemaMismatch(_)));
    }

    #[test]
    fn test_display() {
        let row = Row::from_fields(vec![
            ("id".into(), Field::Long(10)),
            (
                "names".into(),
                Field::List(vec![Field::Str("a".into()), Field::Null]),
            ),
            (
                "inner".into(),
                Field::Group(Row::from_fields(vec![("x".into(), Field::Bool(true))])),
            ),
        ]);
        assert_eq!(
            row.to_string(),
            "{id: 10, names: [\"a\", null], inner: {x: true}}"
        );
    }

    #[test]
    fn test_date_display() {
        // 2020-01-01 is 18262 days after the epoch
        assert_eq!(Field::Date(18262).to_string(), "2020-01-01");
        assert_eq!(Field::Date(0).to_string(), "1970-01-01");
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(
            Field::TimestampMillis(0).to_string(),
            "1970-01-01 00:00:00"
        );
        assert_eq!(
            Field::TimestampMicros(1_500_000).to_string(),
            "1970-01-01 00:00:01.500"
        );
    }
}
