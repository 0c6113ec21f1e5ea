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

//! Writer properties.
//!
//! # Usage
//!
//! ```rust
//! use parquetry::basic::Compression;
//! use parquetry::file::properties::WriterProperties;
//!
//! let props = WriterProperties::builder()
//!     .set_compression(Compression::SNAPPY)
//!     .set_data_page_v2(true)
//!     .set_row_group_size(10_000)
//!     .build();
//! assert_eq!(props.compression(), Compression::SNAPPY);
//! assert!(props.data_page_v2());
//! ```

use std::sync::Arc;

use crate::basic::Compression;

const DEFAULT_DATA_PAGE_V2: bool = false;
const DEFAULT_COMPRESSION: Compression = Compression::UNCOMPRESSED;
const DEFAULT_ROW_GROUP_SIZE: usize = 4096;
const DEFAULT_CREATED_BY: &str = concat!("parquetry version ", env!("CARGO_PKG_VERSION"));

/// Reference counted writer properties.
pub type WriterPropertiesPtr = Arc<WriterProperties>;

/// Immutable configuration of a file writer; assemble with
/// [`WriterProperties::builder`].
#[derive(Debug, Clone)]
pub struct WriterProperties {
    data_page_v2: bool,
    compression: Compression,
    row_group_size: usize,
    created_by: String,
}

impl Default for WriterProperties {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WriterProperties {
    /// Returns a builder with default values.
    pub fn builder() -> WriterPropertiesBuilder {
        WriterPropertiesBuilder::with_defaults()
    }

    /// Whether data pages are written in version 2 framing.
    pub fn data_page_v2(&self) -> bool {
        self.data_page_v2
    }

    /// Default compression for columns without an override.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Target number of records per row group.
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Writer identity recorded in the footer.
    pub fn created_by(&self) -> &str {
        &self.created_by
    }
}

/// Builder for [`WriterProperties`].
pub struct WriterPropertiesBuilder {
    data_page_v2: bool,
    compression: Compression,
    row_group_size: usize,
    created_by: String,
}

impl WriterPropertiesBuilder {
    fn with_defaults() -> Self {
        Self {
            data_page_v2: DEFAULT_DATA_PAGE_V2,
            compression: DEFAULT_COMPRESSION,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            created_by: DEFAULT_CREATED_BY.to_owned(),
        }
    }

    /// Selects the data page version: `false` for v1 (default), `true`
    /// for v2.
    pub fn set_data_page_v2(mut self, enabled: bool) -> Self {
        self.data_page_v2 = enabled;
        self
    }

    /// Sets the compression applied to columns without a schema-level
    /// override.
    pub fn set_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the target number of records per row group. Values below 1
    /// are clamped to 1.
    pub fn set_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows.max(1);
        self
    }

    /// Overrides the writer identity string.
    pub fn set_created_by(mut self, created_by: String) -> Self {
        self.created_by = created_by;
        self
    }

    /// Finalizes the properties.
    pub fn build(self) -> WriterProperties {
        WriterProperties {
            data_page_v2: self.data_page_v2,
            compression: self.compression,
            row_group_size: self.row_group_size,
            created_by: self.created_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let props = WriterProperties::default();
        assert!(!props.data_page_v2());
        assert_eq!(props.compression(), Compression::UNCOMPRESSED);
        assert_eq!(props.row_group_size(), DEFAULT_ROW_GROUP_SIZE);
        assert!(props.created_by().starts_with("parquetry version"));
    }

    #[test]
    fn test_row_group_size_clamped() {
        let props = WriterProperties::builder().set_row_group_size(0).build();
        assert_eq!(props.row_group_size(), 1);
    }
}
