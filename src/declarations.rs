//! JSON declaration documents → `TypeGraph`.
//!
//! ```json
//! { "module": "models.ts",
//!   "declarations": {
//!     "Tree": { "exported": true,
//!               "type": { "object": { "value": "number",
//!                                     "children": { "array": { "ref": "Tree" } } } } } } }
//! ```
//!
//! Object and enum maps keep repeated keys so the builder can reject them
//! instead of silently keeping the last one.
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{BuildError, LoadError};
use crate::path_de::{from_slice_with_path, from_str_with_path, PathError};
use crate::resolver::{DeclarationHeader, RecursiveResolver, TypeGraph, Visit};
use crate::types::{EnumType, EnumValue, NamedType, ObjectType, PrimitiveKind, Type};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationDocument {
    pub module: String,
    pub declarations: Entries<Declaration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    #[serde(default)]
    pub exported: bool,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    Keyword(PrimitiveKind),
    Composite(Composite),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composite {
    Object(Entries<TypeExpr>),
    Array(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    Enum(Entries<EnumValue>),
    Literal(LiteralExpr),
    Ref(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LiteralExpr {
    Boolean(bool),
    Number(f64),
    String(String),
}

/// A JSON object read as an ordered list of entries, repeated keys included.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<T>(pub Vec<(String, T)>);

#[derive(Debug, Clone)]
struct Entry {
    module: String,
    exported: bool,
    ty: TypeExpr,
}

/// Declarations collected from one or more documents, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    entries: IndexMap<String, Entry>,
}

struct Builder<'a> {
    set: &'a DeclarationSet,
    resolver: RecursiveResolver<&'a str>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl FromStr for DeclarationDocument {
    type Err = PathError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        from_str_with_path(src)
    }
}

impl DeclarationDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PathError> {
        from_slice_with_path(bytes)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, T>()? {
                    out.push(entry);
                }
                Ok(Entries(out))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every declaration of `document`. A name may be declared only once
    /// across all documents.
    pub fn extend(&mut self, document: DeclarationDocument) -> Result<(), BuildError> {
        let DeclarationDocument { module, declarations } = document;
        debug!(%module, count = declarations.0.len(), "adding declarations");
        for (name, declaration) in declarations.0 {
            if let Some(first) = self.entries.get(&name) {
                return Err(BuildError::DuplicateDeclaration {
                    name,
                    first: first.module.clone(),
                    second: module,
                });
            }
            self.entries.insert(
                name,
                Entry {
                    module: module.clone(),
                    exported: declaration.exported,
                    ty: declaration.ty,
                },
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn exported_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.exported)
            .map(|(name, _)| name.as_str())
    }

    /// Build the graph reachable from `root`.
    pub fn build(&self, root: &str) -> Result<TypeGraph, BuildError> {
        let mut builder = Builder {
            set: self,
            resolver: RecursiveResolver::new(),
        };
        let (key, entry) = builder.lookup(root, "build root")?;
        // nothing is visiting or finished yet, so the root is always entered fresh
        builder.resolver.enter(key, entry.header(key))?;
        let named = builder.complete(key, entry)?;
        Ok(builder.resolver.into_graph(named)?)
    }
}

impl Entry {
    fn header(&self, name: &str) -> DeclarationHeader {
        DeclarationHeader::new(name, self.module.as_str(), self.exported)
    }
}

impl<'a> Builder<'a> {
    fn lookup(&self, name: &str, referenced_from: &str) -> Result<(&'a str, &'a Entry), BuildError> {
        let set = self.set;
        match set.entries.get_key_value(name) {
            Some((key, entry)) => Ok((key.as_str(), entry)),
            None => Err(BuildError::UnknownDeclaration {
                name: name.to_owned(),
                referenced_from: referenced_from.to_owned(),
            }),
        }
    }

    fn reference(&mut self, name: &str, referenced_from: &str) -> Result<Type, BuildError> {
        let (key, entry) = self.lookup(name, referenced_from)?;
        match self.resolver.enter(key, entry.header(key))? {
            Visit::Enter(_) => Ok(Type::Named(self.complete(key, entry)?)),
            Visit::Cycle(ty) | Visit::Finished(ty) => Ok(ty),
        }
    }

    /// Build the body of a declaration that was just entered and finish it.
    fn complete(&mut self, key: &'a str, entry: &'a Entry) -> Result<Arc<NamedType>, BuildError> {
        trace!(name = key, "building declaration");
        let body = self.expr(&entry.ty, key)?;
        Ok(self.resolver.finish(&key, body)?)
    }

    fn expr(&mut self, expr: &'a TypeExpr, owner: &str) -> Result<Type, BuildError> {
        let composite = match expr {
            TypeExpr::Keyword(kind) => return Ok(Type::Primitive(*kind)),
            TypeExpr::Composite(composite) => composite,
        };
        Ok(match composite {
            Composite::Object(Entries(properties)) => {
                let mut object = ObjectType::new();
                for (name, ty) in properties {
                    let ty = self.expr(ty, owner)?;
                    object.add_property(name.as_str(), ty)?;
                }
                object.into()
            }
            Composite::Array(element) => Type::array(self.expr(element, owner)?),
            Composite::Tuple(items) => Type::Tuple(self.list(items, owner)?),
            Composite::Union(items) => Type::Union(self.list(items, owner)?),
            Composite::Intersection(items) => Type::Intersection(self.list(items, owner)?),
            Composite::Enum(Entries(members)) => {
                let mut out = EnumType::new();
                for (name, value) in members {
                    out.add(name.as_str(), value.clone())?;
                }
                out.into()
            }
            Composite::Literal(LiteralExpr::Boolean(value)) => Type::literal_boolean(*value),
            Composite::Literal(LiteralExpr::Number(value)) => Type::literal_number(*value),
            Composite::Literal(LiteralExpr::String(value)) => Type::literal_string(value.as_str()),
            Composite::Ref(target) => self.reference(target, owner)?,
        })
    }

    fn list(&mut self, items: &'a [TypeExpr], owner: &str) -> Result<Vec<Type>, BuildError> {
        items.iter().map(|item| self.expr(item, owner)).collect()
    }
}

// ------------------------------- Tests ------------------------------------ //
