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

//! Common error types and convenience macros.

use std::error::Error;
use std::{io, result};

/// Error enumeration covering every failure mode of reading and writing
/// Parquet data.
#[derive(Debug)]
pub enum ParquetError {
    /// A record does not conform to the schema it is shredded against:
    /// a required field is absent, a non-repeated field received a list,
    /// or a value has the wrong type.
    SchemaMismatch(String),
    /// Stored bytes violate the format: bad magic, level overflow,
    /// value/level count mismatch, unknown enum tag, truncated stream.
    Corrupt(String),
    /// The data uses a feature this crate recognizes but does not
    /// implement, e.g. dictionary pages or delta encodings.
    Unsupported(String),
    /// A schema or writer configuration is invalid, e.g. a fixed-width
    /// type without a length.
    InvalidConfig(String),
    /// Failure in the underlying byte source or sink.
    Io(io::Error),
    /// An error raised by a compression backend.
    External(Box<dyn Error + Send + Sync>),
}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            ParquetError::SchemaMismatch(message) => {
                write!(fmt, "Schema mismatch: {message}")
            }
            ParquetError::Corrupt(message) => write!(fmt, "Corrupt: {message}"),
            ParquetError::Unsupported(message) => write!(fmt, "Unsupported: {message}"),
            ParquetError::InvalidConfig(message) => {
                write!(fmt, "Invalid configuration: {message}")
            }
            ParquetError::Io(e) => write!(fmt, "IO error: {e}"),
            ParquetError::External(e) => write!(fmt, "External: {e}"),
        }
    }
}

impl Error for ParquetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParquetError::Io(e) => Some(e),
            ParquetError::External(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for ParquetError {
    fn from(e: io::Error) -> ParquetError {
        ParquetError::Io(e)
    }
}

impl From<snap::Error> for ParquetError {
    fn from(e: snap::Error) -> ParquetError {
        ParquetError::External(Box::new(e))
    }
}

impl From<ParquetError> for io::Error {
    fn from(e: ParquetError) -> Self {
        io::Error::other(e)
    }
}

/// A specialized `Result` for Parquet errors.
pub type Result<T, E = ParquetError> = result::Result<T, E>;

// ----------------------------------------------------------------------
// Convenient macros for different errors

macro_rules! schema_err {
    ($fmt:expr) => (ParquetError::SchemaMismatch($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::SchemaMismatch(format!($fmt, $($args),*)));
}

macro_rules! corrupt_err {
    ($fmt:expr) => (ParquetError::Corrupt($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::Corrupt(format!($fmt, $($args),*)));
}

macro_rules! unsupported_err {
    ($fmt:expr) => (ParquetError::Unsupported($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::Unsupported(format!($fmt, $($args),*)));
}

macro_rules! config_err {
    ($fmt:expr) => (ParquetError::InvalidConfig($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::InvalidConfig(format!($fmt, $($args),*)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            schema_err!("missing required field {}", "DocId").to_string(),
            "Schema mismatch: missing required field DocId"
        );
        assert_eq!(corrupt_err!("bad magic").to_string(), "Corrupt: bad magic");
        assert_eq!(
            unsupported_err!("DICTIONARY_PAGE").to_string(),
            "Unsupported: DICTIONARY_PAGE"
        );
        assert_eq!(
            config_err!("type length required").to_string(),
            "Invalid configuration: type length required"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err = ParquetError::from(io_err);
        assert!(matches!(err, ParquetError::Io(_)));
        assert!(err.source().is_some());
    }
}
