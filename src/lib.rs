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

//! A native Rust implementation of the [Parquet] columnar file format.
//!
//! The crate covers the core of the format: the [Dremel] record
//! shredding and assembly model, the PLAIN and RLE/bit-packed hybrid
//! encodings, data pages v1 and v2 with pluggable page compression, and
//! the `PAR1` file envelope with its Thrift compact footer.
//!
//! # Writing and reading
//!
//! Schemas are built with the node builders in [`schema::types`] and
//! are immutable afterwards; records are dynamic [`record::Row`]s.
//! [`file::writer::SerializedFileWriter`] shreds appended rows and cuts
//! row groups at a configured size;
//! [`file::reader::SerializedFileReader`] exposes lazy record and
//! column cursors over any byte source with random range reads.
//!
//! Dictionary, delta and byte-stream-split encodings, page indexes,
//! bloom filters and encryption are out of scope; files using them are
//! rejected as unsupported rather than misread.
//!
//! [Parquet]: https://parquet.apache.org/
//! [Dremel]: https://research.google/pubs/pub36632/

#[macro_use]
pub mod errors;
pub mod basic;
pub mod data_type;

mod thrift;

mod column;
pub mod compression;
pub mod encodings;
pub mod file;
pub mod record;
pub mod schema;
mod util;
