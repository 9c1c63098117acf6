//! Structural type model.
//!
//! A `Type` is a closed tree of structural variants. Cycles are expressed only
//! through `RecursiveReference`, which names an arena slot (`NamedId`) of a
//! `TypeGraph` instead of owning its target, so every `Type` value is finite.
//!
//! Named declarations are shared through `Arc` and never mutated once built.
pub mod equality;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

pub use equality::{permutation_eq, sequence_eq};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
}

/// Stable index of a named declaration inside a `TypeGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NamedId(pub(crate) u32);

#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    properties: IndexMap<String, Type>, // declaration order
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Number(OrderedFloat<f64>),
}

#[derive(Debug, Clone, Default)]
pub struct EnumType {
    members: IndexMap<String, EnumValue>,
}

#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: String,
    pub origin_module: String,
    pub is_exported: bool,
    pub target: Type,
}

/// Back-edge to a declaration that was still under construction when the
/// reference was created.
#[derive(Debug, Clone)]
pub struct RecursiveReference {
    pub target: NamedId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum Type {
    Primitive(PrimitiveKind),
    Object(ObjectType),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Enum(EnumType),
    LiteralString(String),
    LiteralNumber(OrderedFloat<f64>),
    LiteralBoolean(bool),
    Named(Arc<NamedType>),
    RecursiveReference(RecursiveReference),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NamedId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NamedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ObjectType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an object from `(name, type)` pairs, rejecting repeated names.
    pub fn of<I, K>(properties: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        let mut object = Self::new();
        for (name, ty) in properties {
            object.add_property(name, ty)?;
        }
        Ok(object)
    }

    pub fn add_property(&mut self, name: impl Into<String>, ty: Type) -> Result<&mut Self, GraphError> {
        let name = name.into();
        if self.properties.contains_key(&name) {
            return Err(GraphError::DuplicateProperty { name });
        }
        self.properties.insert(name, ty);
        Ok(self)
    }

    pub fn properties(&self) -> &IndexMap<String, Type> {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        EnumValue::String(value.to_owned())
    }
}

impl From<f64> for EnumValue {
    fn from(value: f64) -> Self {
        EnumValue::Number(OrderedFloat(value))
    }
}

impl EnumType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<I, K>(members: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (K, EnumValue)>,
        K: Into<String>,
    {
        let mut out = Self::new();
        for (name, value) in members {
            out.add(name, value)?;
        }
        Ok(out)
    }

    pub fn add(&mut self, name: impl Into<String>, value: EnumValue) -> Result<&mut Self, GraphError> {
        let name = name.into();
        if self.members.contains_key(&name) {
            return Err(GraphError::DuplicateEnumMember { name });
        }
        self.members.insert(name, value);
        Ok(self)
    }

    pub fn members(&self) -> &IndexMap<String, EnumValue> {
        &self.members
    }
}

impl NamedType {
    pub fn new(
        name: impl Into<String>,
        origin_module: impl Into<String>,
        is_exported: bool,
        target: Type,
    ) -> Self {
        Self {
            name: name.into(),
            origin_module: origin_module.into(),
            is_exported,
            target,
        }
    }
}

impl Type {
    pub fn number() -> Self { Type::Primitive(PrimitiveKind::Number) }
    pub fn string() -> Self { Type::Primitive(PrimitiveKind::String) }
    pub fn boolean() -> Self { Type::Primitive(PrimitiveKind::Boolean) }
    pub fn null() -> Self { Type::Primitive(PrimitiveKind::Null) }
    pub fn undefined() -> Self { Type::Primitive(PrimitiveKind::Undefined) }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn tuple(positional: impl IntoIterator<Item = Type>) -> Self {
        Type::Tuple(positional.into_iter().collect())
    }

    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        Type::Union(members.into_iter().collect())
    }

    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Self {
        Type::Intersection(members.into_iter().collect())
    }

    /// `T | null`
    pub fn nullable(inner: Type) -> Self {
        Type::Union(vec![inner, Type::null()])
    }

    pub fn literal_string(value: impl Into<String>) -> Self {
        Type::LiteralString(value.into())
    }

    pub fn literal_number(value: f64) -> Self {
        Type::LiteralNumber(OrderedFloat(value))
    }

    pub fn literal_boolean(value: bool) -> Self {
        Type::LiteralBoolean(value)
    }

    pub fn named(
        name: impl Into<String>,
        origin_module: impl Into<String>,
        is_exported: bool,
        target: Type,
    ) -> Self {
        Type::Named(Arc::new(NamedType::new(name, origin_module, is_exported, target)))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Primitive(_) => "primitive",
            Type::Object(_) => "object",
            Type::Array(_) => "array",
            Type::Tuple(_) => "tuple",
            Type::Union(_) => "union",
            Type::Intersection(_) => "intersection",
            Type::Enum(_) => "enum",
            Type::LiteralString(_) => "literal string",
            Type::LiteralNumber(_) => "literal number",
            Type::LiteralBoolean(_) => "literal boolean",
            Type::Named(_) => "named",
            Type::RecursiveReference(_) => "recursive reference",
        }
    }

    pub fn as_named(&self) -> Option<&Arc<NamedType>> {
        match self {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }
}

impl From<ObjectType> for Type {
    fn from(object: ObjectType) -> Self {
        Type::Object(object)
    }
}

impl From<EnumType> for Type {
    fn from(enum_: EnumType) -> Self {
        Type::Enum(enum_)
    }
}

// ------------------------------- Tests ------------------------------------ //
