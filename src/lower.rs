use crate::ir::{CommonCheck, Literal, Provenance, Validation};
use crate::types::{NamedType, ObjectType, Type};

/// Compile a type into the checks a value must pass to inhabit it.
///
/// Pure and total: every `Type` variant has exactly one rule. Recursive
/// references become terminal `Recursive` leaves so the result stays finite.
pub fn lower_to_validation(ty: &Type) -> Validation {
    match ty {
        Type::Primitive(kind) => Validation::Common(CommonCheck::for_primitive(*kind)),
        Type::Object(object) => lower_object(object),
        Type::Array(element) => Validation::precondition(
            Validation::Common(CommonCheck::IsArray),
            Validation::ArrayElements(Box::new(lower_to_validation(element))),
        ),
        Type::Tuple(positional) => lower_tuple(positional),
        Type::Union(members) => Validation::SomeRequired(members.iter().map(lower_to_validation).collect()),
        Type::Intersection(members) => {
            Validation::AllRequired(members.iter().map(lower_to_validation).collect())
        }
        Type::Enum(_) => Validation::EnumMembership,
        Type::LiteralString(value) => Validation::PrimitiveEquals(Literal::String(value.clone())),
        Type::LiteralNumber(value) => Validation::PrimitiveEquals(Literal::Number(*value)),
        Type::LiteralBoolean(value) => Validation::PrimitiveEquals(Literal::Boolean(*value)),
        Type::RecursiveReference(reference) => Validation::Recursive {
            target: reference.target,
            name: reference.name.clone(),
        },
        Type::Named(named) => lower_named(named),
    }
}

pub fn lower_named(named: &NamedType) -> Validation {
    tracing::trace!(name = %named.name, kind = named.target.kind_name(), "lowering declaration");
    Validation::Referencable {
        provenance: Provenance {
            name: named.name.clone(),
            origin_module: named.origin_module.clone(),
            is_exported: named.is_exported,
        },
        inner: Box::new(lower_to_validation(&named.target)),
    }
}

// Properties are checked in declaration order.
fn lower_object(object: &ObjectType) -> Validation {
    let properties = object
        .properties()
        .iter()
        .map(|(name, ty)| Validation::property(name.clone(), lower_to_validation(ty)))
        .collect();
    Validation::precondition(
        Validation::Common(CommonCheck::IsObject),
        Validation::AllRequired(properties),
    )
}

fn lower_tuple(positional: &[Type]) -> Validation {
    let arity = Literal::Number((positional.len() as f64).into());
    let elements = positional
        .iter()
        .enumerate()
        .map(|(index, ty)| Validation::element(index, lower_to_validation(ty)))
        .collect();
    Validation::precondition(
        Validation::AllRequired(vec![
            Validation::Common(CommonCheck::IsArray),
            Validation::property("length", Validation::PrimitiveEquals(arity)),
        ]),
        Validation::AllRequired(elements),
    )
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumType, EnumValue, NamedId, RecursiveReference};
    use pretty_assertions::assert_eq;

    #[test]
    fn primitives_become_common_checks() {
        assert_eq!(lower_to_validation(&Type::number()), Validation::Common(CommonCheck::IsNumber));
        assert_eq!(lower_to_validation(&Type::string()), Validation::Common(CommonCheck::IsString));
        assert_eq!(lower_to_validation(&Type::boolean()), Validation::Common(CommonCheck::IsBoolean));
        assert_eq!(lower_to_validation(&Type::null()), Validation::Common(CommonCheck::IsNull));
        assert_eq!(
            lower_to_validation(&Type::undefined()),
            Validation::Common(CommonCheck::IsUndefined)
        );
    }

    #[test]
    fn object_checks_properties_in_declaration_order() {
        let object = ObjectType::of([("b", Type::string()), ("a", Type::number())]).unwrap();
        assert_eq!(
            lower_to_validation(&object.into()),
            Validation::precondition(
                Validation::Common(CommonCheck::IsObject),
                Validation::AllRequired(vec![
                    Validation::property("b", Validation::Common(CommonCheck::IsString)),
                    Validation::property("a", Validation::Common(CommonCheck::IsNumber)),
                ]),
            )
        );
    }

    #[test]
    fn tuple_checks_length_then_positions() {
        let tuple = Type::tuple([Type::number(), Type::string()]);
        assert_eq!(
            lower_to_validation(&tuple),
            Validation::precondition(
                Validation::AllRequired(vec![
                    Validation::Common(CommonCheck::IsArray),
                    Validation::property(
                        "length",
                        Validation::PrimitiveEquals(Literal::Number(2.0.into()))
                    ),
                ]),
                Validation::AllRequired(vec![
                    Validation::element(0, Validation::Common(CommonCheck::IsNumber)),
                    Validation::element(1, Validation::Common(CommonCheck::IsString)),
                ]),
            )
        );
    }

    #[test]
    fn array_guards_elements_with_is_array() {
        assert_eq!(
            lower_to_validation(&Type::array(Type::boolean())),
            Validation::precondition(
                Validation::Common(CommonCheck::IsArray),
                Validation::ArrayElements(Box::new(Validation::Common(CommonCheck::IsBoolean))),
            )
        );
    }

    #[test]
    fn union_and_intersection_keep_member_order() {
        let members = [Type::literal_string("a"), Type::literal_number(1.0), Type::literal_boolean(true)];
        let expected = vec![
            Validation::PrimitiveEquals(Literal::String("a".into())),
            Validation::PrimitiveEquals(Literal::Number(1.0.into())),
            Validation::PrimitiveEquals(Literal::Boolean(true)),
        ];
        assert_eq!(
            lower_to_validation(&Type::union(members.clone())),
            Validation::SomeRequired(expected.clone())
        );
        assert_eq!(
            lower_to_validation(&Type::intersection(members)),
            Validation::AllRequired(expected)
        );
    }

    #[test]
    fn enums_lower_to_membership_placeholder() {
        let enum_ = EnumType::of([("A", EnumValue::from(0.0))]).unwrap();
        assert_eq!(lower_to_validation(&enum_.into()), Validation::EnumMembership);
    }

    #[test]
    fn recursive_reference_is_a_leaf() {
        let reference = Type::RecursiveReference(RecursiveReference {
            target: NamedId(3),
            name: "Tree".into(),
        });
        assert_eq!(
            lower_to_validation(&reference),
            Validation::Recursive { target: NamedId(3), name: "Tree".into() }
        );
    }

    #[test]
    fn named_wraps_with_provenance() {
        let named = Type::named("Score", "scores.ts", false, Type::number());
        assert_eq!(
            lower_to_validation(&named),
            Validation::Referencable {
                provenance: Provenance {
                    name: "Score".into(),
                    origin_module: "scores.ts".into(),
                    is_exported: false,
                },
                inner: Box::new(Validation::Common(CommonCheck::IsNumber)),
            }
        );
    }
}
