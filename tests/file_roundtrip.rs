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

//! End-to-end write/read coverage over the compression and page
//! version matrix.

use std::sync::Arc;

use bytes::Bytes;

use parquetry::basic::{Compression, ConvertedType, Repetition, Type};
use parquetry::data_type::{ByteArray, Int96, Interval};
use parquetry::errors::Result;
use parquetry::file::properties::{WriterProperties, WriterPropertiesPtr};
use parquetry::file::reader::SerializedFileReader;
use parquetry::file::writer::SerializedFileWriter;
use parquetry::record::{Field, Row};
use parquetry::schema::types::{ColumnPath, SchemaDescPtr, SchemaDescriptor, SchemaNode};

fn event_schema() -> SchemaDescPtr {
    let location = SchemaNode::group_builder("location")
        .with_repetition(Repetition::OPTIONAL)
        .with_fields(vec![
            SchemaNode::leaf_builder("lat", Type::DOUBLE).build().unwrap(),
            SchemaNode::leaf_builder("lon", Type::DOUBLE).build().unwrap(),
        ])
        .build()
        .unwrap();
    let tags = SchemaNode::group_builder("tags")
        .with_repetition(Repetition::REPEATED)
        .with_fields(vec![
            SchemaNode::leaf_builder("key", Type::BYTE_ARRAY)
                .with_converted_type(ConvertedType::UTF8)
                .build()
                .unwrap(),
            SchemaNode::leaf_builder("value", Type::BYTE_ARRAY)
                .with_converted_type(ConvertedType::UTF8)
                .with_repetition(Repetition::OPTIONAL)
                .build()
                .unwrap(),
        ])
        .build()
        .unwrap();
    let root = SchemaNode::group_builder("event")
        .with_fields(vec![
            SchemaNode::leaf_builder("id", Type::INT64).build().unwrap(),
            SchemaNode::leaf_builder("name", Type::BYTE_ARRAY)
                .with_converted_type(ConvertedType::UTF8)
                .with_repetition(Repetition::OPTIONAL)
                .build()
                .unwrap(),
            SchemaNode::leaf_builder("scores", Type::INT32)
                .with_repetition(Repetition::REPEATED)
                .build()
                .unwrap(),
            location,
            tags,
            SchemaNode::leaf_builder("flag", Type::BOOLEAN).build().unwrap(),
            SchemaNode::leaf_builder("day", Type::INT32)
                .with_converted_type(ConvertedType::DATE)
                .with_repetition(Repetition::OPTIONAL)
                .build()
                .unwrap(),
            SchemaNode::leaf_builder("ts", Type::INT64)
                .with_converted_type(ConvertedType::TIMESTAMP_MICROS)
                .with_repetition(Repetition::OPTIONAL)
                .build()
                .unwrap(),
            SchemaNode::leaf_builder("code", Type::FIXED_LEN_BYTE_ARRAY)
                .with_type_length(4)
                .with_repetition(Repetition::OPTIONAL)
                .build()
                .unwrap(),
        ])
        .build()
        .unwrap();
    Arc::new(SchemaDescriptor::new(root).unwrap())
}

/// Builds row `i` directly in canonical form: fields in schema order,
/// absent optionals and empty repeated fields left out.
fn event_row(i: i64) -> Row {
    let mut fields: Vec<(String, Field)> = vec![("id".into(), Field::Long(i))];
    if i % 3 != 0 {
        fields.push(("name".into(), Field::Str(format!("name-{i}"))));
    }
    let scores: Vec<Field> = (0..i % 4).map(|k| Field::Int((i * 10 + k) as i32)).collect();
    if !scores.is_empty() {
        fields.push(("scores".into(), Field::List(scores)));
    }
    if i % 5 != 0 {
        fields.push((
            "location".into(),
            Field::Group(Row::from_fields(vec![
                ("lat".into(), Field::Double(i as f64 / 10.0)),
                ("lon".into(), Field::Double(-(i as f64) / 2.0)),
            ])),
        ));
    }
    if i % 7 == 0 {
        let mut tag_a = vec![("key".into(), Field::Str(format!("k{i}")))];
        if i % 2 == 0 {
            tag_a.push(("value".into(), Field::Str("even".into())));
        }
        fields.push((
            "tags".into(),
            Field::List(vec![
                Field::Group(Row::from_fields(tag_a)),
                Field::Group(Row::from_fields(vec![(
                    "key".into(),
                    Field::Str("fixed".into()),
                )])),
            ]),
        ));
    }
    fields.push(("flag".into(), Field::Bool(i % 2 == 0)));
    if i % 2 == 0 {
        fields.push(("day".into(), Field::Date(18_000 + i as i32)));
    }
    fields.push(("ts".into(), Field::TimestampMicros(i * 1_000_000)));
    if i % 4 != 0 {
        let code = (i as u32).to_le_bytes();
        fields.push(("code".into(), Field::Bytes(ByteArray::from(code.as_slice()))));
    }
    Row::from_fields(fields)
}

fn write_events(
    schema: SchemaDescPtr,
    props: WriterPropertiesPtr,
    num_rows: i64,
) -> Bytes {
    let mut sink = Vec::new();
    let mut writer = SerializedFileWriter::new(&mut sink, schema, props).unwrap();
    for i in 0..num_rows {
        writer.append_row(&event_row(i)).unwrap();
    }
    writer.close().unwrap();
    sink.into()
}

#[test]
fn roundtrip_across_compressions_and_page_versions() {
    let schema = event_schema();
    for data_page_v2 in [false, true] {
        for compression in [
            Compression::UNCOMPRESSED,
            Compression::SNAPPY,
            Compression::GZIP,
            Compression::BROTLI,
            Compression::LZ4,
        ] {
            let props = WriterProperties::builder()
                .set_compression(compression)
                .set_data_page_v2(data_page_v2)
                .build();
            let data = write_events(schema.clone(), Arc::new(props), 1000);
            let reader = SerializedFileReader::new(data).unwrap();
            assert_eq!(reader.num_rows(), 1000);
            let rows: Vec<Row> = reader
                .get_row_iter(None)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(rows.len(), 1000);
            for (i, row) in rows.iter().enumerate() {
                assert_eq!(
                    row,
                    &event_row(i as i64),
                    "row {i} under {compression} v2={data_page_v2}"
                );
            }
        }
    }
}

#[test]
fn rows_split_across_row_groups_in_order() {
    let schema = event_schema();
    let props = WriterProperties::builder()
        .set_row_group_size(64)
        .set_compression(Compression::SNAPPY)
        .build();
    let data = write_events(schema.clone(), Arc::new(props), 300);
    let reader = SerializedFileReader::new(data).unwrap();
    assert_eq!(reader.metadata().num_row_groups(), 5);
    assert_eq!(reader.metadata().row_group(0).num_rows(), 64);
    assert_eq!(reader.metadata().row_group(4).num_rows(), 300 - 4 * 64);

    let ids: Vec<i64> = reader
        .get_row_iter(None)
        .unwrap()
        .map(|row| row.unwrap().get_long("id").unwrap())
        .collect();
    assert_eq!(ids, (0..300).collect::<Vec<_>>());
}

#[test]
fn per_column_compression_override() {
    let location_override = SchemaNode::group_builder("m")
        .with_fields(vec![
            SchemaNode::leaf_builder("a", Type::INT64)
                .with_compression(Compression::GZIP)
                .build()
                .unwrap(),
            SchemaNode::leaf_builder("b", Type::INT64).build().unwrap(),
        ])
        .build()
        .unwrap();
    let schema = Arc::new(SchemaDescriptor::new(location_override).unwrap());
    let mut sink = Vec::new();
    let mut writer = SerializedFileWriter::new(
        &mut sink,
        schema,
        Arc::new(WriterProperties::builder().set_compression(Compression::SNAPPY).build()),
    )
    .unwrap();
    for i in 0..10 {
        writer
            .append_row(&Row::from_fields(vec![
                ("a".into(), Field::Long(i)),
                ("b".into(), Field::Long(-i)),
            ]))
            .unwrap();
    }
    writer.close().unwrap();

    let reader = SerializedFileReader::new(Bytes::from(sink)).unwrap();
    let row_group = reader.metadata().row_group(0);
    assert_eq!(row_group.column(0).compression(), Compression::GZIP);
    assert_eq!(row_group.column(1).compression(), Compression::SNAPPY);
    let rows: Vec<Row> = reader
        .get_row_iter(None)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(rows[3].get_long("a").unwrap(), 3);
    assert_eq!(rows[3].get_long("b").unwrap(), -3);
}

#[test]
fn statistics_recorded_in_chunk_metadata() {
    let root = SchemaNode::group_builder("m")
        .with_fields(vec![SchemaNode::leaf_builder("word", Type::BYTE_ARRAY)
            .with_converted_type(ConvertedType::UTF8)
            .with_repetition(Repetition::OPTIONAL)
            .build()
            .unwrap()])
        .build()
        .unwrap();
    let schema = Arc::new(SchemaDescriptor::new(root).unwrap());
    let words = ["oranges", "apples", "bananas", "grapes"];
    let mut sink = Vec::new();
    let mut writer = SerializedFileWriter::new(
        &mut sink,
        schema,
        Arc::new(WriterProperties::builder().set_row_group_size(10_000).build()),
    )
    .unwrap();
    for i in 0..4000usize {
        let row = if i % 2 == 0 {
            Row::from_fields(vec![(
                "word".into(),
                Field::Str(words[(i / 2) % 4].into()),
            )])
        } else {
            Row::new()
        };
        writer.append_row(&row).unwrap();
    }
    writer.close().unwrap();

    let reader = SerializedFileReader::new(Bytes::from(sink)).unwrap();
    let stats = reader
        .metadata()
        .row_group(0)
        .column(0)
        .statistics()
        .unwrap()
        .clone();
    assert_eq!(stats.null_count, Some(2000));
    assert_eq!(stats.distinct_count, Some(4));
    let mut min = 6u32.to_le_bytes().to_vec();
    min.extend_from_slice(b"apples");
    let mut max = 7u32.to_le_bytes().to_vec();
    max.extend_from_slice(b"oranges");
    assert_eq!(stats.min_value, Some(min));
    assert_eq!(stats.max_value, Some(max));
}

#[test]
fn int96_and_interval_roundtrip() {
    let root = SchemaNode::group_builder("m")
        .with_fields(vec![
            SchemaNode::leaf_builder("legacy_ts", Type::INT96).build().unwrap(),
            SchemaNode::leaf_builder("span", Type::FIXED_LEN_BYTE_ARRAY)
                .with_converted_type(ConvertedType::INTERVAL)
                .build()
                .unwrap(),
        ])
        .build()
        .unwrap();
    let schema = Arc::new(SchemaDescriptor::new(root).unwrap());
    let row = Row::from_fields(vec![
        ("legacy_ts".into(), Field::Int96(Int96::new(101, 202, 303))),
        (
            "span".into(),
            Field::Interval(Interval {
                months: 14,
                days: 3,
                millis: 86_400_000,
            }),
        ),
    ]);
    let mut sink = Vec::new();
    let mut writer = SerializedFileWriter::new(
        &mut sink,
        schema,
        Arc::new(WriterProperties::default()),
    )
    .unwrap();
    writer.append_row(&row).unwrap();
    writer.close().unwrap();

    let reader = SerializedFileReader::new(Bytes::from(sink)).unwrap();
    let rows: Vec<Row> = reader
        .get_row_iter(None)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(rows, vec![row]);
}

#[test]
fn column_cursor_spans_row_groups() {
    let schema = event_schema();
    let props = WriterProperties::builder().set_row_group_size(40).build();
    let data = write_events(schema, Arc::new(props), 100);
    let reader = SerializedFileReader::new(data).unwrap();

    let ids: Vec<Field> = reader
        .get_column_iter(&ColumnPath::from("id"))
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(ids.len(), 100);
    assert_eq!(ids[0], Field::Long(0));
    assert_eq!(ids[99], Field::Long(99));

    let scores: Vec<Field> = reader
        .get_column_iter(&ColumnPath::from("scores"))
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(scores.len(), 100);
    // rows with i % 4 == 0 have no scores and canonicalize to absent
    assert_eq!(scores[4], Field::Null);
    assert_eq!(
        scores[5],
        Field::List(vec![Field::Int(50)])
    );
}

#[test]
fn file_on_disk_roundtrip() {
    let schema = event_schema();
    let props = WriterProperties::builder()
        .set_compression(Compression::GZIP)
        .build();
    let data = write_events(schema, Arc::new(props), 50);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.parquet");
    std::fs::write(&path, &data).unwrap();

    let reader = SerializedFileReader::try_from(path.as_path()).unwrap();
    assert_eq!(reader.num_rows(), 50);
    let rows: Vec<Row> = reader
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row, &event_row(i as i64));
    }
}

#[test]
fn truncated_file_fails_to_read_rows() {
    let schema = event_schema();
    let data = write_events(schema, Arc::new(WriterProperties::default()), 100);

    // drop bytes from the middle: the footer stays intact but a column
    // chunk's byte range now reaches past the end of the buffer
    let cut = data.len() / 2;
    let mut broken = data[..cut].to_vec();
    broken.extend_from_slice(&data[data.len() - 8..]);
    match SerializedFileReader::new(Bytes::from(broken)) {
        Err(e) => assert!(matches!(
            e,
            parquetry::errors::ParquetError::Corrupt(_)
        )),
        Ok(reader) => {
            let result: Result<Vec<Row>> = reader.get_row_iter(None).unwrap().collect();
            assert!(result.is_err());
        }
    }
}
