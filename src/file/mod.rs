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

//! File envelope: metadata, statistics, writer and reader.
//!
//! A file is the 4-byte magic `PAR1`, the concatenated row groups, the
//! footer metadata block, its 4-byte little-endian length, and the
//! magic again.
//!
//! # Example of writing and reading a file
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parquetry::basic::Type;
//! use parquetry::file::properties::WriterProperties;
//! use parquetry::file::reader::SerializedFileReader;
//! use parquetry::file::writer::SerializedFileWriter;
//! use parquetry::record::{Field, Row};
//! use parquetry::schema::types::{SchemaDescriptor, SchemaNode};
//!
//! let root = SchemaNode::group_builder("message")
//!     .with_fields(vec![SchemaNode::leaf_builder("id", Type::INT64)
//!         .build()
//!         .unwrap()])
//!     .build()
//!     .unwrap();
//! let schema = Arc::new(SchemaDescriptor::new(root).unwrap());
//!
//! let mut sink = Vec::new();
//! let mut writer = SerializedFileWriter::new(
//!     &mut sink,
//!     schema,
//!     Arc::new(WriterProperties::default()),
//! )
//! .unwrap();
//! writer
//!     .append_row(&Row::from_fields(vec![("id".into(), Field::Long(7))]))
//!     .unwrap();
//! writer.close().unwrap();
//!
//! let reader = SerializedFileReader::new(bytes::Bytes::from(sink)).unwrap();
//! assert_eq!(reader.num_rows(), 1);
//! for row in reader.get_row_iter(None).unwrap() {
//!     assert_eq!(row.unwrap().get_long("id").unwrap(), 7);
//! }
//! ```

pub mod metadata;
pub mod properties;
pub mod reader;
pub mod statistics;
pub mod writer;

/// The length of the fixed trailer: metadata length plus magic.
pub const FOOTER_SIZE: usize = 8;
pub(crate) const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];
