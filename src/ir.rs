// Validation IR: one node per semantic check, independent of any output syntax.

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::types::{NamedId, PrimitiveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonCheck {
    IsObject,
    IsArray,
    IsNumber,
    IsString,
    IsBoolean,
    IsNull,
    IsUndefined,
}

/// Constant a value must be strictly equal to; the variant is the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Literal {
    Number(OrderedFloat<f64>),
    String(String),
    Boolean(bool),
}

/// Where a `Referencable` node came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub name: String,
    pub origin_module: String,
    pub is_exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    Common(CommonCheck),
    /// `body` only applies to values that passed `guard`.
    Precondition {
        guard: Box<Validation>,
        body: Box<Validation>,
    },
    Property {
        name: String,
        validator: Box<Validation>,
    },
    ArrayElements(Box<Validation>),
    ArrayElement {
        index: usize,
        validator: Box<Validation>,
    },
    AllRequired(Vec<Validation>),  // conjunction; empty is `true`
    SomeRequired(Vec<Validation>), // disjunction; empty is `false`
    PrimitiveEquals(Literal),
    EnumMembership,                // placeholder; no emitter supports it
    Recursive {
        target: NamedId,
        name: String,
    },
    Referencable {
        provenance: Provenance,
        inner: Box<Validation>,
    },
}

impl CommonCheck {
    pub fn for_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Number => CommonCheck::IsNumber,
            PrimitiveKind::String => CommonCheck::IsString,
            PrimitiveKind::Boolean => CommonCheck::IsBoolean,
            PrimitiveKind::Null => CommonCheck::IsNull,
            PrimitiveKind::Undefined => CommonCheck::IsUndefined,
        }
    }
}

impl Validation {
    pub fn precondition(guard: Validation, body: Validation) -> Self {
        Validation::Precondition {
            guard: Box::new(guard),
            body: Box::new(body),
        }
    }

    pub fn property(name: impl Into<String>, validator: Validation) -> Self {
        Validation::Property {
            name: name.into(),
            validator: Box::new(validator),
        }
    }

    pub fn element(index: usize, validator: Validation) -> Self {
        Validation::ArrayElement {
            index,
            validator: Box::new(validator),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Validation::Common(_) => "common",
            Validation::Precondition { .. } => "precondition",
            Validation::Property { .. } => "property",
            Validation::ArrayElements(_) => "array elements",
            Validation::ArrayElement { .. } => "array element",
            Validation::AllRequired(_) => "all required",
            Validation::SomeRequired(_) => "some required",
            Validation::PrimitiveEquals(_) => "primitive equals",
            Validation::EnumMembership => "enum membership",
            Validation::Recursive { .. } => "recursive reference",
            Validation::Referencable { .. } => "referencable",
        }
    }
}
