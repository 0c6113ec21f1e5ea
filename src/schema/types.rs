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

//! In-memory schema tree and the per-column view derived from it.
//!
//! A schema is a tree of [`SchemaNode`]s: groups with named, ordered
//! children and leaves with a physical type. [`SchemaDescriptor`] walks
//! the tree once at construction and derives, for every leaf, its
//! [`ColumnPath`] and the maximum definition and repetition levels the
//! Dremel shredder and assembler operate against. Levels are never
//! recomputed after construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::basic::{Compression, ConvertedType, Encoding, Repetition, Type};
use crate::errors::{ParquetError, Result};

/// Reference counted schema node.
pub type NodePtr = Arc<SchemaNode>;

/// Reference counted column descriptor.
pub type ColumnDescPtr = Arc<ColumnDescriptor>;

/// A node in the schema tree: either a group of named fields or a leaf
/// carrying a physical type. Construct through [`SchemaNode::group_builder`]
/// and [`SchemaNode::leaf_builder`].
#[derive(Debug, PartialEq)]
pub enum SchemaNode {
    /// An intermediate node with ordered children.
    Group {
        /// Field name; the root's name is decorative.
        name: String,
        /// `None` only for the root, which contributes to no levels.
        repetition: Option<Repetition>,
        /// Children in declaration order.
        fields: Vec<NodePtr>,
    },
    /// A terminal node; the unit of columnar storage.
    Leaf {
        /// Field name.
        name: String,
        repetition: Repetition,
        physical_type: Type,
        converted_type: ConvertedType,
        /// Byte length for FIXED_LEN_BYTE_ARRAY, `-1` otherwise.
        type_length: i32,
        /// Value encoding; PLAIN is the only one this crate writes.
        encoding: Encoding,
        /// Per-column codec override; the writer default applies when
        /// `None`.
        compression: Option<Compression>,
    },
}

impl SchemaNode {
    /// Returns a builder for a leaf node of the given physical type.
    pub fn leaf_builder(name: &str, physical_type: Type) -> LeafBuilder {
        LeafBuilder::new(name, physical_type)
    }

    /// Returns a builder for a group node.
    pub fn group_builder(name: &str) -> GroupBuilder {
        GroupBuilder::new(name)
    }

    /// Field name of this node.
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Group { name, .. } => name,
            SchemaNode::Leaf { name, .. } => name,
        }
    }

    /// Repetition of this node. The root has none.
    pub fn repetition(&self) -> Option<Repetition> {
        match self {
            SchemaNode::Group { repetition, .. } => *repetition,
            SchemaNode::Leaf { repetition, .. } => Some(*repetition),
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, SchemaNode::Leaf { .. })
    }

    /// Children of a group; empty for leaves.
    pub fn fields(&self) -> &[NodePtr] {
        match self {
            SchemaNode::Group { fields, .. } => fields,
            SchemaNode::Leaf { .. } => &[],
        }
    }

    /// Looks up a direct child by name.
    pub fn field(&self, name: &str) -> Option<&NodePtr> {
        self.fields().iter().find(|f| f.name() == name)
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize, root: bool) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            SchemaNode::Group {
                name,
                repetition,
                fields,
            } => {
                if root {
                    writeln!(f, "message {name} {{")?;
                } else {
                    let rep = repetition.unwrap_or(Repetition::REQUIRED);
                    writeln!(f, "{pad}{rep} group {name} {{")?;
                }
                for field in fields {
                    field.fmt_tree(f, indent + 1, false)?;
                }
                writeln!(f, "{pad}}}")
            }
            SchemaNode::Leaf {
                name,
                repetition,
                physical_type,
                converted_type,
                type_length,
                ..
            } => {
                write!(f, "{pad}{repetition} {physical_type}")?;
                if *type_length >= 0 {
                    write!(f, "({type_length})")?;
                }
                write!(f, " {name}")?;
                if *converted_type != ConvertedType::NONE {
                    write!(f, " ({converted_type})")?;
                }
                writeln!(f, ";")
            }
        }
    }
}

/// Builder for leaf nodes. Fields default to REQUIRED, unannotated,
/// PLAIN encoded, writer-default compression.
pub struct LeafBuilder {
    name: String,
    repetition: Repetition,
    physical_type: Type,
    converted_type: ConvertedType,
    type_length: i32,
    encoding: Encoding,
    compression: Option<Compression>,
}

impl LeafBuilder {
    fn new(name: &str, physical_type: Type) -> Self {
        Self {
            name: name.to_owned(),
            repetition: Repetition::REQUIRED,
            physical_type,
            converted_type: ConvertedType::NONE,
            type_length: -1,
            encoding: Encoding::PLAIN,
            compression: None,
        }
    }

    /// Sets the repetition of the field.
    pub fn with_repetition(mut self, repetition: Repetition) -> Self {
        self.repetition = repetition;
        self
    }

    /// Annotates the field with a converted type.
    pub fn with_converted_type(mut self, converted_type: ConvertedType) -> Self {
        self.converted_type = converted_type;
        self
    }

    /// Sets the byte length of a FIXED_LEN_BYTE_ARRAY field.
    pub fn with_type_length(mut self, length: i32) -> Self {
        self.type_length = length;
        self
    }

    /// Sets the value encoding recorded for the column.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Overrides the writer-level compression for this column.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression.into();
        self
    }

    /// Validates the configuration and builds the node.
    pub fn build(mut self) -> Result<NodePtr> {
        if self.encoding != Encoding::PLAIN {
            return Err(unsupported_err!(
                "value encoding {} for column '{}'; only PLAIN is implemented",
                self.encoding,
                self.name
            ));
        }
        match self.converted_type {
            ConvertedType::UTF8 | ConvertedType::JSON | ConvertedType::BSON
                if self.physical_type != Type::BYTE_ARRAY =>
            {
                return Err(config_err!(
                    "{} annotation requires BYTE_ARRAY, got {} for '{}'",
                    self.converted_type,
                    self.physical_type,
                    self.name
                ));
            }
            ConvertedType::DATE if self.physical_type != Type::INT32 => {
                return Err(config_err!(
                    "DATE annotation requires INT32, got {} for '{}'",
                    self.physical_type,
                    self.name
                ));
            }
            ConvertedType::TIMESTAMP_MILLIS | ConvertedType::TIMESTAMP_MICROS
                if self.physical_type != Type::INT64 =>
            {
                return Err(config_err!(
                    "{} annotation requires INT64, got {} for '{}'",
                    self.converted_type,
                    self.physical_type,
                    self.name
                ));
            }
            ConvertedType::INTERVAL => {
                if self.physical_type != Type::FIXED_LEN_BYTE_ARRAY {
                    return Err(config_err!(
                        "INTERVAL annotation requires FIXED_LEN_BYTE_ARRAY(12) for '{}'",
                        self.name
                    ));
                }
                if self.type_length < 0 {
                    self.type_length = 12;
                }
                if self.type_length != 12 {
                    return Err(config_err!(
                        "INTERVAL column '{}' must have type length 12, got {}",
                        self.name,
                        self.type_length
                    ));
                }
            }
            _ => {}
        }
        if self.physical_type == Type::FIXED_LEN_BYTE_ARRAY && self.type_length <= 0 {
            return Err(config_err!(
                "FIXED_LEN_BYTE_ARRAY column '{}' requires a positive type length",
                self.name
            ));
        }
        if self.physical_type != Type::FIXED_LEN_BYTE_ARRAY && self.type_length >= 0 {
            return Err(config_err!(
                "type length set on non fixed-width column '{}'",
                self.name
            ));
        }
        Ok(Arc::new(SchemaNode::Leaf {
            name: self.name,
            repetition: self.repetition,
            physical_type: self.physical_type,
            converted_type: self.converted_type,
            type_length: self.type_length,
            encoding: self.encoding,
            compression: self.compression,
        }))
    }
}

/// Builder for group nodes.
pub struct GroupBuilder {
    name: String,
    repetition: Option<Repetition>,
    fields: Vec<NodePtr>,
}

impl GroupBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            repetition: None,
            fields: Vec::new(),
        }
    }

    /// Sets the repetition of the group. Leave unset for the root.
    pub fn with_repetition(mut self, repetition: Repetition) -> Self {
        self.repetition = Some(repetition);
        self
    }

    /// Sets the children, in declaration order.
    pub fn with_fields(mut self, fields: Vec<NodePtr>) -> Self {
        self.fields = fields;
        self
    }

    /// Validates the configuration and builds the node.
    pub fn build(self) -> Result<NodePtr> {
        if self.fields.is_empty() {
            return Err(config_err!("group '{}' has no fields", self.name));
        }
        let mut seen = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            if let Some(prev) = seen.insert(field.name().to_owned(), i) {
                return Err(config_err!(
                    "duplicate field name '{}' in group '{}' (positions {} and {})",
                    field.name(),
                    self.name,
                    prev,
                    i
                ));
            }
        }
        Ok(Arc::new(SchemaNode::Group {
            name: self.name,
            repetition: self.repetition,
            fields: self.fields,
        }))
    }
}

// ----------------------------------------------------------------------
// Column paths and descriptors

/// The dot-separated path from the schema root to a leaf; the stable
/// identity of a column.
#[derive(Clone, PartialEq, Debug, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnPath {
    parts: Vec<String>,
}

impl ColumnPath {
    /// Creates a path from a vector of field names.
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    /// Path segments, outermost first.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Dot-joined rendering, e.g. `"Name.Language.Code"`.
    pub fn string(&self) -> String {
        self.parts.join(".")
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.string())
    }
}

impl From<&str> for ColumnPath {
    fn from(single_path: &str) -> Self {
        ColumnPath::new(single_path.split('.').map(|s| s.to_owned()).collect())
    }
}

impl From<Vec<String>> for ColumnPath {
    fn from(parts: Vec<String>) -> Self {
        ColumnPath::new(parts)
    }
}

/// One step on the path from the root to a leaf, with the definition and
/// repetition levels accumulated once that step has been entered.
#[derive(Debug, Clone)]
pub(crate) struct BranchStep {
    pub(crate) node: NodePtr,
    /// Definition level after entering this node.
    pub(crate) def_level: i16,
    /// Repetition level after entering this node.
    pub(crate) rep_level: i16,
}

/// Per-leaf view of the schema: path, levels and the chain of nodes the
/// shredder and assembler walk.
#[derive(Debug)]
pub struct ColumnDescriptor {
    path: ColumnPath,
    branch: Vec<BranchStep>,
    max_def_level: i16,
    max_rep_level: i16,
}

impl ColumnDescriptor {
    /// The column's path from the root.
    pub fn path(&self) -> &ColumnPath {
        &self.path
    }

    /// The leaf node itself.
    pub fn leaf(&self) -> &NodePtr {
        &self.branch.last().expect("branch is never empty").node
    }

    /// Maximum definition level of this column.
    pub fn max_def_level(&self) -> i16 {
        self.max_def_level
    }

    /// Maximum repetition level of this column.
    pub fn max_rep_level(&self) -> i16 {
        self.max_rep_level
    }

    /// Field name of the leaf.
    pub fn name(&self) -> &str {
        self.leaf().name()
    }

    /// Physical type of the leaf.
    pub fn physical_type(&self) -> Type {
        match self.leaf().as_ref() {
            SchemaNode::Leaf { physical_type, .. } => *physical_type,
            SchemaNode::Group { .. } => unreachable!("descriptor always wraps a leaf"),
        }
    }

    /// Converted type of the leaf.
    pub fn converted_type(&self) -> ConvertedType {
        match self.leaf().as_ref() {
            SchemaNode::Leaf { converted_type, .. } => *converted_type,
            SchemaNode::Group { .. } => unreachable!("descriptor always wraps a leaf"),
        }
    }

    /// Declared byte length for fixed-width columns, `-1` otherwise.
    pub fn type_length(&self) -> i32 {
        match self.leaf().as_ref() {
            SchemaNode::Leaf { type_length, .. } => *type_length,
            SchemaNode::Group { .. } => unreachable!("descriptor always wraps a leaf"),
        }
    }

    /// Per-column compression override.
    pub fn compression(&self) -> Option<Compression> {
        match self.leaf().as_ref() {
            SchemaNode::Leaf { compression, .. } => *compression,
            SchemaNode::Group { .. } => unreachable!("descriptor always wraps a leaf"),
        }
    }

    /// The node chain from just below the root down to the leaf,
    /// annotated with accumulated levels.
    pub(crate) fn branch(&self) -> &[BranchStep] {
        &self.branch
    }
}

/// A schema plus its flat column view, shared immutably by writers,
/// readers and cursors.
#[derive(Debug)]
pub struct SchemaDescriptor {
    root: NodePtr,
    leaves: Vec<ColumnDescPtr>,
    leaf_index: HashMap<ColumnPath, usize>,
}

impl SchemaDescriptor {
    /// Derives the column view of a schema tree. The root must be a
    /// group; its repetition is ignored for level computation.
    pub fn new(root: NodePtr) -> Result<Self> {
        if root.is_leaf() {
            return Err(config_err!("schema root must be a group"));
        }
        let mut leaves = Vec::new();
        let mut branch = Vec::new();
        for field in root.fields() {
            Self::collect_leaves(field, 0, 0, &mut branch, &mut leaves)?;
        }
        if leaves.is_empty() {
            return Err(config_err!("schema has no columns"));
        }
        let leaf_index = leaves
            .iter()
            .enumerate()
            .map(|(i, leaf): (usize, &ColumnDescPtr)| (leaf.path().clone(), i))
            .collect();
        Ok(Self {
            root,
            leaves,
            leaf_index,
        })
    }

    fn collect_leaves(
        node: &NodePtr,
        def_level: i16,
        rep_level: i16,
        branch: &mut Vec<BranchStep>,
        leaves: &mut Vec<ColumnDescPtr>,
    ) -> Result<()> {
        let repetition = node
            .repetition()
            .ok_or_else(|| config_err!("field '{}' has no repetition", node.name()))?;
        let (def_level, rep_level) = match repetition {
            Repetition::REQUIRED => (def_level, rep_level),
            Repetition::OPTIONAL => (def_level + 1, rep_level),
            Repetition::REPEATED => (def_level + 1, rep_level + 1),
        };
        branch.push(BranchStep {
            node: node.clone(),
            def_level,
            rep_level,
        });
        if node.is_leaf() {
            let path = ColumnPath::new(
                branch.iter().map(|s| s.node.name().to_owned()).collect(),
            );
            leaves.push(Arc::new(ColumnDescriptor {
                path,
                branch: branch.clone(),
                max_def_level: def_level,
                max_rep_level: rep_level,
            }));
        } else {
            for field in node.fields() {
                Self::collect_leaves(field, def_level, rep_level, branch, leaves)?;
            }
        }
        branch.pop();
        Ok(())
    }

    /// The schema tree root.
    pub fn root(&self) -> &NodePtr {
        &self.root
    }

    /// Number of leaf columns.
    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    /// Descriptor of column `i` in schema order.
    ///
    /// # Panics
    ///
    /// Panics when `i` is out of bounds.
    pub fn column(&self, i: usize) -> ColumnDescPtr {
        self.leaves[i].clone()
    }

    /// All column descriptors in schema order.
    pub fn columns(&self) -> &[ColumnDescPtr] {
        &self.leaves
    }

    /// Looks up a column by path.
    pub fn column_by_path(&self, path: &ColumnPath) -> Option<ColumnDescPtr> {
        self.leaf_index.get(path).map(|i| self.leaves[*i].clone())
    }

    /// Position of a column in schema order.
    pub fn index_of(&self, path: &ColumnPath) -> Option<usize> {
        self.leaf_index.get(path).copied()
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.root.fmt_tree(f, 0, true)
    }
}

/// Reference counted schema descriptor.
pub type SchemaDescPtr = Arc<SchemaDescriptor>;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // The document schema of the Dremel paper.
    pub(crate) fn doc_schema() -> SchemaDescriptor {
        let doc_id = SchemaNode::leaf_builder("DocId", Type::INT64)
            .build()
            .unwrap();
        let links = SchemaNode::group_builder("Links")
            .with_repetition(Repetition::OPTIONAL)
            .with_fields(vec![
                SchemaNode::leaf_builder("Backward", Type::INT64)
                    .with_repetition(Repetition::REPEATED)
                    .build()
                    .unwrap(),
                SchemaNode::leaf_builder("Forward", Type::INT64)
                    .with_repetition(Repetition::REPEATED)
                    .build()
                    .unwrap(),
            ])
            .build()
            .unwrap();
        let language = SchemaNode::group_builder("Language")
            .with_repetition(Repetition::REPEATED)
            .with_fields(vec![
                SchemaNode::leaf_builder("Code", Type::BYTE_ARRAY)
                    .with_converted_type(ConvertedType::UTF8)
                    .build()
                    .unwrap(),
                SchemaNode::leaf_builder("Country", Type::BYTE_ARRAY)
                    .with_converted_type(ConvertedType::UTF8)
                    .with_repetition(Repetition::OPTIONAL)
                    .build()
                    .unwrap(),
            ])
            .build()
            .unwrap();
        let name = SchemaNode::group_builder("Name")
            .with_repetition(Repetition::REPEATED)
            .with_fields(vec![
                language,
                SchemaNode::leaf_builder("Url", Type::BYTE_ARRAY)
                    .with_converted_type(ConvertedType::UTF8)
                    .with_repetition(Repetition::OPTIONAL)
                    .build()
                    .unwrap(),
            ])
            .build()
            .unwrap();
        let root = SchemaNode::group_builder("Document")
            .with_fields(vec![doc_id, links, name])
            .build()
            .unwrap();
        SchemaDescriptor::new(root).unwrap()
    }

    #[test]
    fn test_doc_schema_levels() {
        let schema = doc_schema();
        let expected: Vec<(&str, i16, i16)> = vec![
            ("DocId", 0, 0),
            ("Links.Backward", 2, 1),
            ("Links.Forward", 2, 1),
            ("Name.Language.Code", 2, 2),
            ("Name.Language.Country", 3, 2),
            ("Name.Url", 2, 1),
        ];
        assert_eq!(schema.num_columns(), expected.len());
        for (i, (path, def, rep)) in expected.iter().enumerate() {
            let col = schema.column(i);
            assert_eq!(col.path().string(), *path, "column {i}");
            assert_eq!(col.max_def_level(), *def, "def level of {path}");
            assert_eq!(col.max_rep_level(), *rep, "rep level of {path}");
            assert!(col.max_def_level() >= col.max_rep_level());
        }
    }

    #[test]
    fn test_column_lookup() {
        let schema = doc_schema();
        let path = ColumnPath::from("Name.Language.Country");
        let col = schema.column_by_path(&path).unwrap();
        assert_eq!(col.name(), "Country");
        assert_eq!(schema.index_of(&path), Some(4));
        assert!(schema
            .column_by_path(&ColumnPath::from("Name.Missing"))
            .is_none());
    }

    #[test]
    fn test_branch_levels() {
        let schema = doc_schema();
        let col = schema
            .column_by_path(&ColumnPath::from("Name.Language.Country"))
            .unwrap();
        let levels: Vec<(i16, i16)> = col
            .branch()
            .iter()
            .map(|s| (s.def_level, s.rep_level))
            .collect();
        // Name (repeated), Language (repeated), Country (optional)
        assert_eq!(levels, vec![(1, 1), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_duplicate_field_name_rejected() {
        let err = SchemaNode::group_builder("root")
            .with_fields(vec![
                SchemaNode::leaf_builder("a", Type::INT32).build().unwrap(),
                SchemaNode::leaf_builder("a", Type::INT64).build().unwrap(),
            ])
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));
    }

    #[test]
    fn test_fixed_len_requires_length() {
        let err = SchemaNode::leaf_builder("f", Type::FIXED_LEN_BYTE_ARRAY)
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));

        let ok = SchemaNode::leaf_builder("f", Type::FIXED_LEN_BYTE_ARRAY)
            .with_type_length(16)
            .build()
            .unwrap();
        assert_eq!(ok.name(), "f");
    }

    #[test]
    fn test_interval_defaults_to_twelve_bytes() {
        let node = SchemaNode::leaf_builder("iv", Type::FIXED_LEN_BYTE_ARRAY)
            .with_converted_type(ConvertedType::INTERVAL)
            .build()
            .unwrap();
        match node.as_ref() {
            SchemaNode::Leaf { type_length, .. } => assert_eq!(*type_length, 12),
            SchemaNode::Group { .. } => panic!("expected leaf"),
        }

        let err = SchemaNode::leaf_builder("iv", Type::INT64)
            .with_converted_type(ConvertedType::INTERVAL)
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));
    }

    #[test]
    fn test_annotation_type_pairing() {
        let err = SchemaNode::leaf_builder("s", Type::INT32)
            .with_converted_type(ConvertedType::UTF8)
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));

        let err = SchemaNode::leaf_builder("d", Type::INT64)
            .with_converted_type(ConvertedType::DATE)
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_group_rejected() {
        let err = SchemaNode::group_builder("g").build().unwrap_err();
        assert!(matches!(err, ParquetError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_plain_encoding_unsupported() {
        let err = SchemaNode::leaf_builder("x", Type::INT32)
            .with_encoding(Encoding::DELTA_BINARY_PACKED)
            .build()
            .unwrap_err();
        assert!(matches!(err, ParquetError::Unsupported(_)));
    }

    #[test]
    fn test_display_message_style() {
        let schema = doc_schema();
        let printed = schema.to_string();
        assert!(printed.starts_with("message Document {"));
        assert!(printed.contains("REQUIRED INT64 DocId;"));
        assert!(printed.contains("OPTIONAL group Links {"));
        assert!(printed.contains("OPTIONAL BYTE_ARRAY Country (UTF8);"));
    }
}
