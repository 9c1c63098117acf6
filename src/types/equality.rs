//! Structural equality over `Type`.
//!
//! - union/intersection: member lists must be permutations of each other
//!   (multiset semantics, duplicates count)
//! - tuple: same length, same-position equality
//! - named: equal name and equal target
//! - recursive reference: equal target name only; never followed through the cycle
use super::{EnumType, NamedType, ObjectType, Type};

impl Type {
    pub fn equal_declaration(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Object(a), Type::Object(b)) => a.equal_declaration(b),
            (Type::Array(a), Type::Array(b)) => a.equal_declaration(b),
            (Type::Tuple(a), Type::Tuple(b)) => sequence_eq(a, b, Type::equal_declaration),
            (Type::Union(a), Type::Union(b)) => permutation_eq(a, b, Type::equal_declaration),
            (Type::Intersection(a), Type::Intersection(b)) => {
                permutation_eq(a, b, Type::equal_declaration)
            }
            (Type::Enum(a), Type::Enum(b)) => a.equal_declaration(b),
            (Type::LiteralString(a), Type::LiteralString(b)) => a == b,
            (Type::LiteralNumber(a), Type::LiteralNumber(b)) => a == b,
            (Type::LiteralBoolean(a), Type::LiteralBoolean(b)) => a == b,
            (Type::Named(a), Type::Named(b)) => a.equal_declaration(b),
            (Type::RecursiveReference(a), Type::RecursiveReference(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl ObjectType {
    /// Same property names (in any order) with pairwise equal types.
    pub fn equal_declaration(&self, other: &ObjectType) -> bool {
        self.properties.len() == other.properties.len()
            && self.properties.iter().all(|(name, ty)| {
                other
                    .properties
                    .get(name)
                    .is_some_and(|candidate| ty.equal_declaration(candidate))
            })
    }
}

impl EnumType {
    pub fn equal_declaration(&self, other: &EnumType) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .all(|(name, value)| other.members.get(name) == Some(value))
    }
}

impl NamedType {
    pub fn equal_declaration(&self, other: &NamedType) -> bool {
        self.name == other.name && self.target.equal_declaration(&other.target)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equal_declaration(other)
    }
}

impl Eq for Type {}

impl PartialEq for NamedType {
    fn eq(&self, other: &Self) -> bool {
        self.equal_declaration(other)
    }
}

// ------------------------------ Sequences --------------------------------- //

/// Same length and pairwise equal at every position.
pub fn sequence_eq<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| eq(x, y))
}

/// Whether `b` is a permutation of `a` under `eq`.
///
/// Each element of `a` consumes the first still-unmatched element of `b` it
/// equals; O(n²) comparisons in the worst case.
pub fn permutation_eq<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if sequence_eq(a, b, &eq) {
        return true;
    }
    let mut remaining: Vec<&T> = b.iter().collect();
    for wanted in a {
        match remaining.iter().position(|candidate| eq(wanted, *candidate)) {
            Some(at) => {
                remaining.swap_remove(at);
            }
            None => return false,
        }
    }
    true
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumValue, NamedId, RecursiveReference};
    use proptest::prelude::*;

    fn samples() -> Vec<Type> {
        vec![
            Type::number(),
            Type::string(),
            Type::boolean(),
            Type::null(),
            Type::undefined(),
            ObjectType::new().into(),
            ObjectType::of([("a", Type::boolean())]).unwrap().into(),
            Type::array(Type::null()),
            Type::array(Type::string()),
            Type::union([Type::number(), Type::string()]),
            Type::union([Type::null(), Type::string()]),
            Type::intersection([Type::number(), Type::string()]),
            Type::intersection([Type::null(), Type::string()]),
            Type::tuple([Type::number(), Type::string()]),
            EnumType::of([("a", EnumValue::from(10.0)), ("b", EnumValue::from("test"))])
                .unwrap()
                .into(),
            EnumType::of([("a", EnumValue::from(20.0)), ("b", EnumValue::from("test"))])
                .unwrap()
                .into(),
            Type::literal_string("test"),
            Type::literal_string("another"),
            Type::literal_number(10.0),
            Type::literal_number(20.0),
            Type::literal_boolean(true),
            Type::literal_boolean(false),
            Type::named("test", "module", true, Type::number()),
            Type::named("another", "module", true, Type::number()),
        ]
    }

    #[test]
    fn types_equal_themselves_and_nothing_else() {
        let types = samples();
        for (i, base) in types.iter().enumerate() {
            assert!(base.equal_declaration(base), "{base:?} should equal itself");
            for (j, candidate) in types.iter().enumerate() {
                if i != j {
                    assert!(
                        !base.equal_declaration(candidate),
                        "{base:?} should not equal {candidate:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn union_and_intersection_ignore_member_order() {
        assert_eq!(
            Type::union([Type::string(), Type::number()]),
            Type::union([Type::number(), Type::string()])
        );
        assert_eq!(
            Type::intersection([Type::string(), Type::number()]),
            Type::intersection([Type::number(), Type::string()])
        );
    }

    #[test]
    fn union_members_are_a_multiset() {
        assert_ne!(
            Type::union([Type::string(), Type::string(), Type::number()]),
            Type::union([Type::string(), Type::number(), Type::number()])
        );
        assert_ne!(
            Type::union([Type::string(), Type::string()]),
            Type::union([Type::string()])
        );
    }

    #[test]
    fn tuple_order_matters() {
        assert_ne!(
            Type::tuple([Type::string(), Type::number()]),
            Type::tuple([Type::number(), Type::string()])
        );
    }

    #[test]
    fn object_equality_is_symmetric() {
        let small: Type = ObjectType::of([("a", Type::number())]).unwrap().into();
        let large: Type = ObjectType::of([("a", Type::number()), ("b", Type::string())])
            .unwrap()
            .into();
        assert!(!small.equal_declaration(&large));
        assert!(!large.equal_declaration(&small));
    }

    #[test]
    fn object_equality_ignores_property_order() {
        let ab: Type = ObjectType::of([("a", Type::number()), ("b", Type::string())])
            .unwrap()
            .into();
        let ba: Type = ObjectType::of([("b", Type::string()), ("a", Type::number())])
            .unwrap()
            .into();
        assert_eq!(ab, ba);
    }

    #[test]
    fn named_equality_ignores_origin() {
        assert_eq!(
            Type::named("A", "one.ts", true, Type::number()),
            Type::named("A", "two.ts", false, Type::number())
        );
        assert_ne!(
            Type::named("A", "m", true, Type::number()),
            Type::named("A", "m", true, Type::string())
        );
    }

    #[test]
    fn recursive_references_compare_by_target_name() {
        let a = Type::RecursiveReference(RecursiveReference { target: NamedId(0), name: "Tree".into() });
        let b = Type::RecursiveReference(RecursiveReference { target: NamedId(7), name: "Tree".into() });
        let c = Type::RecursiveReference(RecursiveReference { target: NamedId(0), name: "List".into() });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn nan_literals_are_reflexive() {
        let nan = Type::literal_number(f64::NAN);
        assert!(nan.equal_declaration(&nan));
    }

    #[test]
    fn permutation_helper_handles_empty_and_mismatched_lengths() {
        let eq = |a: &i32, b: &i32| a == b;
        assert!(permutation_eq::<i32>(&[], &[], eq));
        assert!(!permutation_eq(&[1], &[], eq));
        assert!(permutation_eq(&[1, 2, 2], &[2, 1, 2], eq));
        assert!(!permutation_eq(&[1, 1, 2], &[1, 2, 2], eq));
    }

    fn leaf() -> impl Strategy<Value = Type> {
        prop_oneof![
            Just(Type::number()),
            Just(Type::string()),
            Just(Type::boolean()),
            Just(Type::null()),
            Just(Type::undefined()),
            "[a-z]{1,4}".prop_map(Type::literal_string),
            (-100i32..100).prop_map(|n| Type::literal_number(f64::from(n))),
            any::<bool>().prop_map(Type::literal_boolean),
            ("[A-Z][a-z]{0,3}", 0u32..4).prop_map(|(name, id)| {
                Type::RecursiveReference(RecursiveReference { target: NamedId(id), name })
            }),
            prop::collection::btree_map("[a-d]", enum_value(), 0..4)
                .prop_map(|members| Type::from(EnumType::of(members).unwrap())),
        ]
    }

    fn enum_value() -> impl Strategy<Value = EnumValue> {
        prop_oneof![
            (-10i32..10).prop_map(|n| EnumValue::from(f64::from(n))),
            "[a-z]{0,3}".prop_map(EnumValue::String),
        ]
    }

    fn arb_type() -> impl Strategy<Value = Type> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(Type::array),
                prop::collection::vec(inner.clone(), 0..4).prop_map(Type::tuple),
                prop::collection::vec(inner.clone(), 0..4).prop_map(Type::union),
                prop::collection::vec(inner.clone(), 0..4).prop_map(Type::intersection),
                prop::collection::btree_map("[a-d]", inner.clone(), 0..4)
                    .prop_map(|properties| Type::from(ObjectType::of(properties).unwrap())),
                ("[A-Z][a-z]{0,4}", inner).prop_map(|(name, t)| Type::named(name, "m", true, t)),
            ]
        })
    }

    proptest! {
        #[test]
        fn equality_is_reflexive(t in arb_type()) {
            prop_assert!(t.equal_declaration(&t));
        }

        #[test]
        fn object_equality_ignores_declaration_order(
            properties in prop::collection::btree_map("[a-f]", arb_type(), 0..5),
        ) {
            let forward = ObjectType::of(properties.clone()).unwrap();
            let backward = ObjectType::of(properties.into_iter().rev()).unwrap();
            prop_assert!(forward.equal_declaration(&backward));
            prop_assert!(backward.equal_declaration(&forward));
        }

        #[test]
        fn union_equality_survives_any_permutation(
            members in prop::collection::vec(arb_type(), 0..5),
            seed in any::<u64>(),
        ) {
            let mut shuffled = members.clone();
            // deterministic rotation + reversal driven by the seed
            if !shuffled.is_empty() {
                let k = (seed as usize) % shuffled.len();
                shuffled.rotate_left(k);
                if seed % 2 == 0 {
                    shuffled.reverse();
                }
            }
            let a = Type::union(members.clone());
            let b = Type::union(shuffled.clone());
            prop_assert!(a.equal_declaration(&b));
            prop_assert!(b.equal_declaration(&a));
            prop_assert!(Type::intersection(members).equal_declaration(&Type::intersection(shuffled)));
        }
    }
}
