use std::fmt;

use crate::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    UInt,
    Bitmap,
    Bcd,
    Bytes,
    Boolean,
    /// Characters or digits decoded out of one or more wire fields.
    Text,
    /// Padding up to a boundary.
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    UInt(u64),
    Bytes(Vec<u8>),
}

impl RawValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            RawValue::UInt(x) => Some(*x),
            RawValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RawValue::UInt(_) => None,
            RawValue::Bytes(xs) => Some(xs),
        }
    }
}

/// One decoded primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField {
    pub name: &'static str,
    pub bit_offset: usize,
    pub bit_width: usize,
    pub raw: RawValue,
    pub rendering: String,
    pub kind: FieldKind,
}

impl DecodedField {
    pub fn byte_offset(&self) -> usize {
        self.bit_offset / 8
    }

    pub fn value(&self) -> Option<u64> {
        self.raw.as_uint()
    }
}

impl fmt::Display for DecodedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.rendering)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Field(DecodedField),
    Node(DecodedNode),
}

/// A labelled group of fields and nested groups, children kept in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNode {
    pub label: String,
    pub bit_offset: usize,
    pub bit_width: usize,
    pub children: Vec<Child>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodedNode {
    pub fn new(label: impl Into<String>, bit_offset: usize) -> Self {
        DecodedNode {
            label: label.into(),
            bit_offset,
            bit_width: 0,
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn byte_offset(&self) -> usize {
        self.bit_offset / 8
    }

    pub fn fields(&self) -> impl Iterator<Item = &DecodedField> {
        self.children.iter().filter_map(|child| match child {
            Child::Field(field) => Some(field),
            Child::Node(_) => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DecodedNode> {
        self.children.iter().filter_map(|child| match child {
            Child::Node(node) => Some(node),
            Child::Field(_) => None,
        })
    }

    /// First direct child field with the given name.
    pub fn field(&self, name: &str) -> Option<&DecodedField> {
        self.fields().find(|field| field.name == name)
    }

    /// First direct child node with the given label.
    pub fn node(&self, label: &str) -> Option<&DecodedNode> {
        self.nodes().find(|node| node.label == label)
    }

    /// Depth-first search for a field anywhere below this node.
    pub fn find_field(&self, name: &str) -> Option<&DecodedField> {
        self.children.iter().find_map(|child| match child {
            Child::Field(field) if field.name == name => Some(field),
            Child::Field(_) => None,
            Child::Node(node) => node.find_field(name),
        })
    }

    /// Depth-first search for a node anywhere below this node.
    pub fn find_node(&self, label: &str) -> Option<&DecodedNode> {
        self.nodes()
            .find_map(|node| if node.label == label { Some(node) } else { node.find_node(label) })
    }

    /// Every field below this node, in wire order.
    pub fn walk_fields(&self) -> Vec<&DecodedField> {
        let mut ret = Vec::new();
        self.collect_fields(&mut ret);
        ret
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a DecodedField>) {
        for child in &self.children {
            match child {
                Child::Field(field) => out.push(field),
                Child::Node(node) => node.collect_fields(out),
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.label, indent = depth * 2)?;
        for diag in &self.diagnostics {
            writeln!(f, "{:indent$}[{}]", "", diag, indent = depth * 2 + 2)?;
        }
        for child in &self.children {
            match child {
                Child::Field(field) => {
                    writeln!(f, "{:indent$}{}", "", field, indent = depth * 2 + 2)?
                }
                Child::Node(node) => node.render(f, depth + 1)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for DecodedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}
