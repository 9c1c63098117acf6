use rayon::prelude::*;

use super::expression::emit_expression;
use crate::error::EmitError;
use crate::lower::lower_to_validation;
use crate::resolver::TypeGraph;
use crate::types::NamedType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOptions {
    pub export: bool,
    pub parameter: String,
}

impl Default for FunctionOptions {
    fn default() -> Self {
        Self {
            export: false,
            parameter: "value".to_owned(),
        }
    }
}

/// Emit `function is<Name>(value: unknown): value is <Name>` for a declaration.
pub fn emit_function(named: &NamedType, options: &FunctionOptions) -> Result<String, EmitError> {
    let validation = lower_to_validation(&named.target);
    let expression = emit_expression(&validation, &options.parameter)?;
    let export = if options.export { "export " } else { "" };
    let parameter = &options.parameter;
    tracing::trace!(name = %named.name, bytes = expression.len(), "emitted guard");
    Ok(format!(
        "{export}function {}({parameter}: unknown): {parameter} is {} {{\n    return {expression}\n}}\n",
        function_name(&named.name),
        named.name,
    ))
}

/// Guards for the root and every exported declaration, root first.
///
/// Declarations are emitted in parallel; the first failure aborts the whole module.
pub fn emit_module(graph: &TypeGraph, options: &FunctionOptions) -> Result<String, EmitError> {
    let functions = graph
        .exported()
        .par_iter()
        .map(|named| emit_function(named, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(functions.join("\n"))
}

pub fn function_name(type_name: &str) -> String {
    format!("is{}", capitalize(type_name))
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectType, Type};
    use pretty_assertions::assert_eq;

    #[test]
    fn capitalizes_first_character_only() {
        assert_eq!(capitalize("lead"), "Lead");
        assert_eq!(capitalize("arrayOfNumbers"), "ArrayOfNumbers");
        assert_eq!(capitalize("ébauche"), "Ébauche");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn validator_for_null() {
        let named = NamedType::new("Null", "unknown", false, Type::null());
        assert_eq!(
            emit_function(&named, &FunctionOptions::default()).unwrap(),
            "function isNull(value: unknown): value is Null {\n    return value === null\n}\n"
        );
        let exported = FunctionOptions { export: true, ..FunctionOptions::default() };
        assert_eq!(
            emit_function(&named, &exported).unwrap(),
            "export function isNull(value: unknown): value is Null {\n    return value === null\n}\n"
        );
    }

    #[test]
    fn validator_for_object_with_array_of_numbers() {
        let named = NamedType::new(
            "ArrayOfNumbers",
            "unknown",
            false,
            ObjectType::of([("scores", Type::array(Type::number()))]).unwrap().into(),
        );
        assert_eq!(
            emit_function(&named, &FunctionOptions::default()).unwrap(),
            "function isArrayOfNumbers(value: unknown): value is ArrayOfNumbers {\n    \
             return ((Object(value) === value) && (((((Array.isArray(value.scores)) && \
             (value.scores.every(element => typeof element === 'number')))))))\n}\n"
        );
    }

    #[test]
    fn custom_parameter_name() {
        let named = NamedType::new("Flag", "m", true, Type::boolean());
        let options = FunctionOptions { export: false, parameter: "input".into() };
        assert_eq!(
            emit_function(&named, &options).unwrap(),
            "function isFlag(input: unknown): input is Flag {\n    return typeof input === 'boolean'\n}\n"
        );
    }

    #[test]
    fn module_emits_root_first() {
        let graph = TypeGraph::new(NamedType::new("Root", "m", true, Type::string()));
        let module = emit_module(&graph, &FunctionOptions::default()).unwrap();
        assert!(module.starts_with("function isRoot(value: unknown): value is Root {"));
    }
}
