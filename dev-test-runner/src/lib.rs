//! Test harness for emitted guards: a small JavaScript evaluator and a
//! fixture runner that checks guards against sample values.
pub mod fixture;
pub mod js;

pub use fixture::{Fixture, Report};
pub use js::{evaluate, JsError};

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use guardgen::codegen::emit_expression;
    use guardgen::declarations::{DeclarationDocument, DeclarationSet};
    use guardgen::error::EmitError;
    use guardgen::ir::{Literal, Validation};
    use guardgen::lower::lower_to_validation;
    use guardgen::types::{ObjectType, Type};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    use super::*;

    fn guard(ty: &Type) -> String {
        emit_expression(&lower_to_validation(ty), "value").unwrap()
    }

    fn check(expression: &str, value: Value) -> bool {
        evaluate(expression, "value", &value).unwrap()
    }

    #[test]
    fn object_with_tuple_property() {
        let ty: Type = ObjectType::of([
            ("a", Type::number()),
            ("b", Type::tuple([Type::number(), Type::string()])),
        ])
        .unwrap()
        .into();
        let expression = guard(&ty);
        assert!(check(&expression, json!({"a": 10, "b": [5, "test"]})));
        assert!(!check(&expression, json!({"a": 10, "b": [5]})));
        assert!(!check(&expression, json!(null)));
        assert!(!check(&expression, json!([])));
    }

    #[test]
    fn discriminated_union() {
        let variant = |kind: &str, b: Type| -> Type {
            ObjectType::of([
                ("kind", Type::literal_string(kind)),
                ("a", Type::number()),
                ("b", b),
            ])
            .unwrap()
            .into()
        };
        let ty = Type::union([variant("o1", Type::string()), variant("o2", Type::number())]);
        let expression = guard(&ty);
        assert!(check(&expression, json!({"kind": "o1", "a": 10, "b": ""})));
        assert!(!check(&expression, json!({"kind": "o2", "a": 10, "b": ""})));
        assert!(check(&expression, json!({"kind": "o2", "a": 10, "b": 20})));
    }

    #[test]
    fn bare_number() {
        let expression = guard(&Type::number());
        assert_eq!(expression, "typeof value === 'number'");
        assert!(check(&expression, json!(10)));
        assert!(!check(&expression, json!("10")));
        assert!(!check(&expression, json!(null)));
    }

    #[test]
    fn boolean_literal_matches_the_runtime_boolean() {
        let validation = Validation::PrimitiveEquals(Literal::Boolean(true));
        let expression = emit_expression(&validation, "value").unwrap();
        assert_eq!(expression, "value === true");
        assert!(check(&expression, json!(true)));
        assert!(!check(&expression, json!("true")));
        assert!(!check(&expression, json!(false)));
    }

    #[test]
    fn property_names_that_are_not_identifiers() {
        let ty: Type = ObjectType::of([("content-type", Type::string()), ("0", Type::boolean())])
            .unwrap()
            .into();
        let expression = guard(&ty);
        assert_eq!(
            expression,
            "((Object(value) === value) && \
             (((typeof value[\"content-type\"] === 'string') && (typeof value[\"0\"] === 'boolean'))))"
        );
        assert!(check(&expression, json!({"content-type": "json", "0": false})));
        assert!(!check(&expression, json!({"content-type": 1, "0": false})));
    }

    #[test]
    fn nested_arrays_bind_distinct_elements() {
        let ty = Type::array(ObjectType::of([("xs", Type::array(Type::number()))]).unwrap().into());
        let expression = guard(&ty);
        assert!(check(&expression, json!([{"xs": [1, 2]}, {"xs": []}])));
        assert!(!check(&expression, json!([{"xs": [1, "2"]}])));
    }

    #[test]
    fn recursive_declarations_are_rejected_by_the_expression_emitter() {
        let document: DeclarationDocument = r#"{ "module": "m", "declarations": {
            "List": { "type": { "union": ["null", { "object": { "head": "number", "tail": { "ref": "List" } } }] } } } }"#
            .parse()
            .unwrap();
        let mut set = DeclarationSet::new();
        set.extend(document).unwrap();
        let graph = set.build("List").unwrap();
        let err = emit_expression(&lower_to_validation(&graph.root().target), "value").unwrap_err();
        assert_eq!(err, EmitError::NotImplemented { what: "recursive reference" });
    }

    #[test]
    fn bundled_fixtures_pass() {
        let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/*.json");
        let mut seen = 0;
        for path in glob::glob(pattern).unwrap() {
            let path = path.unwrap();
            let report = Fixture::load(&path).unwrap().run(&path).unwrap();
            assert!(report.passed(), "{report:#?}");
            assert_eq!(report.label(), path.file_name().unwrap().to_string_lossy());
            seen += 1;
        }
        assert!(seen > 0, "no fixtures under {pattern}");
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-100i64..100).prop_map(|n| json!(n)),
            "[a-z]{0,3}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-c]", inner), 0..4)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn nullable_string_guard_agrees_with_json_kind(value in json_value()) {
            let expression = guard(&Type::nullable(Type::string()));
            let accepted = evaluate(&expression, "value", &value).unwrap();
            prop_assert_eq!(accepted, value.is_string() || value.is_null());
        }

        #[test]
        fn guards_never_read_through_a_failed_check(value in json_value()) {
            let ty: Type = ObjectType::of([
                ("a", Type::array(Type::number())),
                ("b", ObjectType::of([("c", Type::tuple([Type::string()]))]).unwrap().into()),
            ])
            .unwrap()
            .into();
            // a TypeError here would mean a property was read before its container was checked
            prop_assert!(evaluate(&guard(&ty), "value", &value).is_ok());
        }
    }
}
