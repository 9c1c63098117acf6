//! Validation IR → boolean JS expression over a single free variable.
//!
//! Rendering rules:
//! - conjunctions/disjunctions parenthesize every operand; empty ones are `true`/`false`
//! - preconditions use `&&` so the body never sees a value failing the guard
//! - literals render by kind: numbers bare, strings double-quoted, booleans bare
//! - `Recursive` and `EnumMembership` are rejected with `EmitError::NotImplemented`
use ordered_float::OrderedFloat;

use super::path::{quote_string, AccessPath};
use crate::error::EmitError;
use crate::ir::{CommonCheck, Literal, Validation};

pub fn emit_expression(validation: &Validation, variable: &str) -> Result<String, EmitError> {
    emit(validation, &AccessPath::root(variable))
}

pub fn emit(validation: &Validation, path: &AccessPath) -> Result<String, EmitError> {
    match validation {
        Validation::Common(check) => Ok(emit_common(*check, path)),
        Validation::Precondition { guard, body } => {
            let guard = emit(guard, path)?;
            let body = emit(body, path)?;
            Ok(format!("(({guard}) && ({body}))"))
        }
        Validation::Property { name, validator } => emit(validator, &path.property(name)),
        Validation::ArrayElement { index, validator } => emit(validator, &path.index(*index)),
        Validation::ArrayElements(validator) => {
            let element = path.bind_element();
            let body = emit(validator, &element)?;
            Ok(format!("{path}.every({element} => {body})"))
        }
        Validation::AllRequired(list) => join(list, " && ", "true", path),
        Validation::SomeRequired(list) => join(list, " || ", "false", path),
        Validation::PrimitiveEquals(literal) => Ok(format!("{path} === {}", render_literal(literal))),
        Validation::Referencable { inner, .. } => emit(inner, path),
        Validation::EnumMembership => Err(EmitError::NotImplemented { what: "enum membership" }),
        Validation::Recursive { .. } => Err(EmitError::NotImplemented { what: "recursive reference" }),
    }
}

fn emit_common(check: CommonCheck, path: &AccessPath) -> String {
    match check {
        CommonCheck::IsObject => format!("Object({path}) === {path}"),
        CommonCheck::IsArray => format!("Array.isArray({path})"),
        CommonCheck::IsNumber => format!("typeof {path} === 'number'"),
        CommonCheck::IsString => format!("typeof {path} === 'string'"),
        CommonCheck::IsBoolean => format!("typeof {path} === 'boolean'"),
        CommonCheck::IsNull => format!("{path} === null"),
        CommonCheck::IsUndefined => format!("{path} === undefined"),
    }
}

fn join(list: &[Validation], operator: &str, identity: &str, path: &AccessPath) -> Result<String, EmitError> {
    if list.is_empty() {
        return Ok(identity.to_owned());
    }
    let operands = list
        .iter()
        .map(|v| emit(v, path).map(|e| format!("({e})")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", operands.join(operator)))
}

pub fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Number(value) => render_number(*value),
        Literal::String(value) => quote_string(value),
        Literal::Boolean(value) => value.to_string(),
    }
}

/// JS numeric literal: integral values without a fraction, non-finite values as globals.
pub fn render_number(OrderedFloat(value): OrderedFloat<f64>) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ------------------------------- Tests ------------------------------------ //
