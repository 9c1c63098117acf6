//! Structural type graphs and runtime type-guard generation.
//!
//! Pipeline: declarations → `TypeGraph` (via `RecursiveResolver`) → Validation
//! IR (`lower`) → boolean expression / guard function (`codegen`). `pretty`
//! renders a graph for humans.
pub mod codegen;
pub mod declarations;
pub mod error;
pub mod ir;
pub mod lower;
pub mod path_de;
pub mod pretty;
pub mod resolver;
pub mod types;

use std::sync::Once;

pub use error::{BuildError, EmitError, GraphError, LoadError};
pub use resolver::{RecursiveResolver, TypeGraph};
pub use types::{NamedType, Type};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`. Does nothing when the
/// variable is unset or a subscriber was already installed.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
