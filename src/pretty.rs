//! Human-readable rendering of a `Type`, independent of the Validation IR.
//!
//! A rendering is either a single-line fragment or a block (opening line,
//! children indented by two spaces, closing line). Composite types stay inline
//! while all their parts are inline and fall back to a labeled block otherwise.
use std::fmt;
use std::sync::Arc;

use crate::codegen::expression::render_number;
use crate::error::GraphError;
use crate::resolver::TypeGraph;
use crate::types::{EnumType, EnumValue, NamedType, ObjectType, Type};

const INDENT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pretty {
    Inline(String),
    Block {
        opening: String,
        parts: Vec<Pretty>,
        end: String,
    },
}

impl Pretty {
    pub fn block(opening: impl Into<String>, parts: Vec<Pretty>, end: impl Into<String>) -> Self {
        Pretty::Block { opening: opening.into(), parts, end: end.into() }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Pretty::Inline(_))
    }

    /// Prefix the first line and suffix the last line.
    pub fn surround(self, prefix: &str, suffix: &str) -> Self {
        match self {
            Pretty::Inline(text) => Pretty::Inline(format!("{prefix}{text}{suffix}")),
            Pretty::Block { opening, parts, end } => Pretty::Block {
                opening: format!("{prefix}{opening}"),
                parts,
                end: format!("{end}{suffix}"),
            },
        }
    }

    /// Suffix the first line only.
    pub fn with_suffix(self, suffix: &str) -> Self {
        match self {
            Pretty::Inline(text) => Pretty::Inline(text + suffix),
            Pretty::Block { opening, parts, end } => Pretty::Block {
                opening: opening + suffix,
                parts,
                end,
            },
        }
    }

    pub fn to_lines(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        match self {
            Pretty::Inline(text) => format!("{pad}{text}"),
            Pretty::Block { opening, parts, end } => {
                let mut lines = vec![format!("{pad}{opening}")];
                lines.extend(parts.iter().map(|part| part.to_lines(indent + INDENT)));
                lines.push(format!("{pad}{end}"));
                lines.join("\n")
            }
        }
    }
}

impl fmt::Display for Pretty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(0))
    }
}

/// Renders types, dereferencing recursive references through `graph`.
///
/// Keeps the declarations currently being rendered on a stack; a reference
/// back into one of them prints `RecursiveReference<Name>` instead of
/// descending again.
pub struct PrettyPrinter<'g> {
    graph: Option<&'g TypeGraph>,
    rendering: Vec<Arc<NamedType>>,
}

pub fn pretty_print(ty: &Type, graph: Option<&TypeGraph>) -> Result<Pretty, GraphError> {
    PrettyPrinter::new(graph).print(ty)
}

/// Pretty-print the root declaration of a graph.
pub fn pretty_print_graph(graph: &TypeGraph) -> Result<Pretty, GraphError> {
    PrettyPrinter::new(Some(graph)).print(&Type::Named(graph.root().clone()))
}

impl<'g> PrettyPrinter<'g> {
    pub fn new(graph: Option<&'g TypeGraph>) -> Self {
        Self { graph, rendering: Vec::new() }
    }

    pub fn print(&mut self, ty: &Type) -> Result<Pretty, GraphError> {
        match ty {
            Type::Primitive(kind) => Ok(Pretty::Inline(kind.to_string())),
            Type::Array(element) => self.print_array(element),
            Type::Object(object) => self.print_object(object),
            Type::Union(members) => self.print_list(members, " | ", "", "", "Union("),
            Type::Intersection(members) => self.print_list(members, " & ", "", "", "Intersection("),
            Type::Tuple(positional) => self.print_list(positional, ", ", "[", "]", "Tuple("),
            Type::Enum(enum_) => Ok(print_enum(enum_)),
            Type::LiteralString(value) => Ok(Pretty::Inline(quote(value))),
            Type::LiteralNumber(value) => Ok(Pretty::Inline(render_number(*value))),
            Type::LiteralBoolean(value) => Ok(Pretty::Inline(value.to_string())),
            Type::Named(named) => self.print_named(named),
            Type::RecursiveReference(reference) => {
                let graph = self.graph.ok_or(GraphError::Unresolved { id: reference.target })?;
                let target = graph.resolve_reference(reference)?;
                if self.is_rendering(target) {
                    Ok(Pretty::Inline(format!("RecursiveReference<{}>", reference.name)))
                } else {
                    self.print_named(target)
                }
            }
        }
    }

    fn is_rendering(&self, named: &Arc<NamedType>) -> bool {
        self.rendering.iter().any(|seen| Arc::ptr_eq(seen, named))
    }

    fn print_named(&mut self, named: &Arc<NamedType>) -> Result<Pretty, GraphError> {
        self.rendering.push(named.clone());
        let inner = self.print(&named.target);
        self.rendering.pop();
        Ok(inner?.with_suffix(&format!(" [{}]", named.name)))
    }

    fn print_array(&mut self, element: &Type) -> Result<Pretty, GraphError> {
        let pretty = self.print(element)?;
        Ok(match (element, pretty) {
            (Type::Primitive(_), Pretty::Inline(text)) => Pretty::Inline(format!("{text}[]")),
            (_, pretty) => pretty.surround("Array<", ">"),
        })
    }

    fn print_object(&mut self, object: &ObjectType) -> Result<Pretty, GraphError> {
        let mut parts = Vec::with_capacity(object.len());
        for (name, ty) in object.properties() {
            parts.push(self.print(ty)?.surround(&format!("{name}: "), ""));
        }
        Ok(Pretty::block("{", parts, "}"))
    }

    fn print_list(
        &mut self,
        members: &[Type],
        joiner: &str,
        prefix: &str,
        suffix: &str,
        label: &str,
    ) -> Result<Pretty, GraphError> {
        let parts = members
            .iter()
            .map(|member| self.print(member))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.iter().all(Pretty::is_inline) {
            let texts: Vec<String> = parts
                .into_iter()
                .filter_map(|part| match part {
                    Pretty::Inline(text) => Some(text),
                    Pretty::Block { .. } => None,
                })
                .collect();
            Ok(Pretty::Inline(format!("{prefix}{}{suffix}", texts.join(joiner))))
        } else {
            Ok(Pretty::block(label, parts, ")"))
        }
    }
}

fn print_enum(enum_: &EnumType) -> Pretty {
    let parts = enum_
        .members()
        .iter()
        .map(|(name, value)| {
            let value = match value {
                EnumValue::String(s) => quote(s),
                EnumValue::Number(n) => render_number(*n),
            };
            Pretty::Inline(format!("{name}={value},"))
        })
        .collect();
    Pretty::block("Enum(", parts, ")")
}

// Single quotes; embedded quotes are left as-is.
fn quote(s: &str) -> String {
    format!("'{s}'")
}

// ------------------------------- Tests ------------------------------------ //
