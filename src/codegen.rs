//! Emitters from Validation IR to source text.
//!
//! - `expression`: a boolean expression over one free variable
//! - `function`: a named type-guard function wrapping that expression
//! - `path`: the immutable access path threaded through both
pub mod expression;
pub mod function;
pub mod path;

pub use expression::emit_expression;
pub use function::{emit_function, emit_module, FunctionOptions};
pub use path::AccessPath;
