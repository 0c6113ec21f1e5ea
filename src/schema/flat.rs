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

//! Conversion between the schema tree and its on-disk form.
//!
//! On disk a schema is a pre-order sequence of `SchemaElement` structs.
//! Group elements carry their child count; the root carries the number of
//! top-level fields. Leaves carry type, repetition and annotations.
//! Definition and repetition levels are not stored; they are re-derived
//! when the tree is rebuilt.

use crate::basic::{ConvertedType, Repetition, Type};
use crate::errors::{ParquetError, Result};
use crate::schema::types::{NodePtr, SchemaNode};
use crate::thrift::{CompactSliceReader, CompactWriter, FieldType};

/// Mirror of the Thrift `SchemaElement` struct.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct SchemaElement {
    pub(crate) physical_type: Option<i32>,
    pub(crate) type_length: Option<i32>,
    pub(crate) repetition: Option<i32>,
    pub(crate) name: String,
    pub(crate) num_children: Option<i32>,
    pub(crate) converted_type: Option<i32>,
}

impl SchemaElement {
    pub(crate) fn write_thrift<W: std::io::Write>(
        &self,
        w: &mut CompactWriter<W>,
    ) -> Result<()> {
        let mut last_id = 0i16;
        if let Some(t) = self.physical_type {
            w.write_field_begin(FieldType::I32, 1, last_id)?;
            w.write_i32(t)?;
            last_id = 1;
        }
        if let Some(len) = self.type_length {
            w.write_field_begin(FieldType::I32, 2, last_id)?;
            w.write_i32(len)?;
            last_id = 2;
        }
        if let Some(rep) = self.repetition {
            w.write_field_begin(FieldType::I32, 3, last_id)?;
            w.write_i32(rep)?;
            last_id = 3;
        }
        w.write_field_begin(FieldType::Binary, 4, last_id)?;
        w.write_str(&self.name)?;
        last_id = 4;
        if let Some(n) = self.num_children {
            w.write_field_begin(FieldType::I32, 5, last_id)?;
            w.write_i32(n)?;
            last_id = 5;
        }
        if let Some(c) = self.converted_type {
            w.write_field_begin(FieldType::I32, 6, last_id)?;
            w.write_i32(c)?;
        }
        w.write_struct_end()
    }

    pub(crate) fn read_thrift(r: &mut CompactSliceReader<'_>) -> Result<Self> {
        let mut elem = SchemaElement::default();
        let mut last_id = 0i16;
        loop {
            let field = r.read_field_meta(last_id)?;
            match field.field_type {
                FieldType::Stop => return Ok(elem),
                _ => match field.id {
                    1 => elem.physical_type = Some(r.read_i32()?),
                    2 => elem.type_length = Some(r.read_i32()?),
                    3 => elem.repetition = Some(r.read_i32()?),
                    4 => elem.name = r.read_string()?,
                    5 => elem.num_children = Some(r.read_i32()?),
                    6 => elem.converted_type = Some(r.read_i32()?),
                    _ => r.skip(field.field_type)?,
                },
            }
            last_id = field.id;
        }
    }
}

/// Flattens a schema tree into its pre-order element sequence.
pub(crate) fn to_elements(root: &NodePtr) -> Vec<SchemaElement> {
    let mut elements = Vec::new();
    flatten(root, true, &mut elements);
    elements
}

fn flatten(node: &NodePtr, is_root: bool, out: &mut Vec<SchemaElement>) {
    match node.as_ref() {
        SchemaNode::Group {
            name,
            repetition,
            fields,
        } => {
            out.push(SchemaElement {
                name: name.clone(),
                repetition: if is_root {
                    None
                } else {
                    repetition.map(|r| r.as_wire())
                },
                num_children: Some(fields.len() as i32),
                ..Default::default()
            });
            for field in fields {
                flatten(field, false, out);
            }
        }
        SchemaNode::Leaf {
            name,
            repetition,
            physical_type,
            converted_type,
            type_length,
            ..
        } => {
            out.push(SchemaElement {
                physical_type: Some(physical_type.as_wire()),
                type_length: (*type_length >= 0).then_some(*type_length),
                repetition: Some(repetition.as_wire()),
                name: name.clone(),
                num_children: None,
                converted_type: converted_type.as_wire(),
            });
        }
    }
}

/// Rebuilds the schema tree from its pre-order element sequence.
pub(crate) fn from_elements(elements: &[SchemaElement]) -> Result<NodePtr> {
    if elements.is_empty() {
        return Err(corrupt_err!("schema element sequence is empty"));
    }
    let root = &elements[0];
    let num_children = root.num_children.unwrap_or(0);
    if num_children <= 0 {
        return Err(corrupt_err!("schema root has no fields"));
    }
    let mut next = 1usize;
    let mut fields = Vec::with_capacity(num_children as usize);
    for _ in 0..num_children {
        let (field, rest) = rebuild_node(elements, next)?;
        fields.push(field);
        next = rest;
    }
    if next != elements.len() {
        return Err(corrupt_err!(
            "schema declares {} elements but carries {}",
            next,
            elements.len()
        ));
    }
    SchemaNode::group_builder(&root.name)
        .with_fields(fields)
        .build()
}

fn rebuild_node(elements: &[SchemaElement], index: usize) -> Result<(NodePtr, usize)> {
    let elem = elements
        .get(index)
        .ok_or_else(|| corrupt_err!("schema element sequence truncated at {}", index))?;
    let repetition = Repetition::try_from(
        elem.repetition
            .ok_or_else(|| corrupt_err!("schema element '{}' has no repetition", elem.name))?,
    )?;
    match elem.num_children {
        Some(n) if n > 0 => {
            let mut next = index + 1;
            let mut fields = Vec::with_capacity(n as usize);
            for _ in 0..n {
                let (field, rest) = rebuild_node(elements, next)?;
                fields.push(field);
                next = rest;
            }
            let node = SchemaNode::group_builder(&elem.name)
                .with_repetition(repetition)
                .with_fields(fields)
                .build()?;
            Ok((node, next))
        }
        _ => {
            let physical_type = Type::try_from(elem.physical_type.ok_or_else(|| {
                corrupt_err!("schema leaf '{}' has no physical type", elem.name)
            })?)?;
            let mut builder = SchemaNode::leaf_builder(&elem.name, physical_type)
                .with_repetition(repetition);
            if let Some(len) = elem.type_length {
                builder = builder.with_type_length(len);
            }
            if let Some(tag) = elem.converted_type {
                builder = builder.with_converted_type(ConvertedType::from_wire(tag)?);
            }
            Ok((builder.build()?, index + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::tests::doc_schema;
    use crate::schema::types::SchemaDescriptor;

    #[test]
    fn test_flatten_doc_schema() {
        let schema = doc_schema();
        let elements = to_elements(schema.root());
        // root + Links/Name groups + Language group + 6 leaves
        assert_eq!(elements.len(), 10);
        assert_eq!(elements[0].name, "Document");
        assert_eq!(elements[0].num_children, Some(3));
        assert_eq!(elements[0].repetition, None);
        assert_eq!(elements[1].name, "DocId");
        assert_eq!(elements[1].physical_type, Some(Type::INT64.as_wire()));
        assert_eq!(elements[2].name, "Links");
        assert_eq!(elements[2].num_children, Some(2));
    }

    #[test]
    fn test_tree_element_roundtrip() {
        let schema = doc_schema();
        let elements = to_elements(schema.root());
        let rebuilt = from_elements(&elements).unwrap();
        assert_eq!(&rebuilt, schema.root());

        let descr = SchemaDescriptor::new(rebuilt).unwrap();
        assert_eq!(descr.num_columns(), schema.num_columns());
        for (a, b) in descr.columns().iter().zip(schema.columns()) {
            assert_eq!(a.path(), b.path());
            assert_eq!(a.max_def_level(), b.max_def_level());
            assert_eq!(a.max_rep_level(), b.max_rep_level());
        }
    }

    #[test]
    fn test_thrift_element_roundtrip() {
        let schema = doc_schema();
        for elem in to_elements(schema.root()) {
            let mut buf = Vec::new();
            elem.write_thrift(&mut CompactWriter::new(&mut buf)).unwrap();
            let mut reader = CompactSliceReader::new(&buf);
            let back = SchemaElement::read_thrift(&mut reader).unwrap();
            assert_eq!(back, elem);
            assert_eq!(reader.remaining(), 0);
        }
    }

    #[test]
    fn test_leaf_without_type_is_corrupt() {
        let elements = vec![
            SchemaElement {
                name: "root".into(),
                num_children: Some(1),
                ..Default::default()
            },
            SchemaElement {
                name: "a".into(),
                repetition: Some(Repetition::REQUIRED.as_wire()),
                ..Default::default()
            },
        ];
        let err = from_elements(&elements).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }

    #[test]
    fn test_truncated_sequence_is_corrupt() {
        let elements = vec![SchemaElement {
            name: "root".into(),
            num_children: Some(2),
            ..Default::default()
        }];
        let err = from_elements(&elements).unwrap_err();
        assert!(matches!(err, ParquetError::Corrupt(_)));
    }
}
