//! Error types shared by the graph builder, the emitters and the declaration loader.

use crate::types::NamedId;

/// Violations of Type Graph construction invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate property `{name}` in object type")]
    DuplicateProperty { name: String },

    #[error("duplicate member `{name}` in enumerated type")]
    DuplicateEnumMember { name: String },

    #[error("declaration `{name}` was already registered")]
    AlreadyRegistered { name: String },

    #[error("recursive reference to {id} dereferenced before it was resolved")]
    Unresolved { id: NamedId },

    #[error("unknown declaration slot {id}")]
    UnknownSlot { id: NamedId },

    #[error("finished `{finished}` while `{top}` was still under construction")]
    VisitOrder { finished: String, top: String },

    #[error("finished `{name}` without entering it first")]
    NotVisiting { name: String },

    #[error("unresolved recursive references remain after construction: {}", names.join(", "))]
    UnresolvedPlaceholders { names: Vec<String> },
}

/// Validation IR nodes an emitter refuses to render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("not implemented: {what} cannot be emitted as an expression")]
    NotImplemented { what: &'static str },
}

/// Failures turning declaration documents into a `TypeGraph`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("`{name}` is not declared (referenced from {referenced_from})")]
    UnknownDeclaration { name: String, referenced_from: String },

    #[error("`{name}` is declared in both `{first}` and `{second}`")]
    DuplicateDeclaration { name: String, first: String, second: String },
}

/// Failures reading a declaration document from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: crate::path_de::PathError,
    },
}
