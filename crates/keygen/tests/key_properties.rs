//! Behavioural properties of generated keys

use plankey_core::{EdmType, PrimitiveTypeKind, TypeUsage};
use plankey_ir::{ArithmeticOp, ConstantValue, Expr, entity_set, load_tree_from_string, primitive, save_tree_to_string};
use plankey_keygen::{KeyGenConfig, KeyGenerator, generate_key, try_generate_key};
use pretty_assertions::{assert_eq, assert_ne};
use proptest::prelude::*;

fn key(tree: &Expr) -> String {
    generate_key(tree).unwrap().into_string()
}

fn int(v: i32) -> Expr {
    Expr::constant(v)
}

fn orders_filter(variable: &str, status: &str) -> Expr {
    let input = Expr::scan(entity_set("Shop", "Orders", "Shop.Order")).bind_as(variable);
    let property = input
        .variable_ref()
        .property("Status", primitive(PrimitiveTypeKind::String));
    input.filter(property.equal(Expr::constant(status)))
}

#[test]
fn literal_type_is_part_of_the_key() {
    assert_ne!(key(&Expr::constant(1i32)), key(&Expr::constant(1i64)));
}

#[test]
fn operator_is_part_of_the_key() {
    assert_ne!(key(&int(1).plus(int(2))), key(&int(1).minus(int(2))));
    assert_ne!(key(&int(1).equal(int(2))), key(&int(1).not_equal(int(2))));
}

#[test]
fn negation_with_two_operands_is_rejected() {
    let minus = int(1).minus(int(2));
    let malformed = int(1).arithmetic(ArithmeticOp::UnaryMinus, int(2));
    assert_ne!(minus, malformed);
    assert!(try_generate_key(&malformed).unwrap_err().is_contract_violation());
    assert!(try_generate_key(&minus).unwrap().is_some());
}

#[test]
fn operand_order_is_part_of_the_key() {
    assert_ne!(key(&int(1).minus(int(2))), key(&int(2).minus(int(1))));
}

#[test]
fn quotes_in_string_literals_are_doubled() {
    let k = key(&Expr::constant("O'Brien"));
    assert!(k.contains("'O''Brien'"), "{}", k);
}

#[test]
fn escaped_strings_do_not_collide() {
    // `a'` followed by `,'b` and `a` followed by `',b` must not meet in the middle
    let left = int(0).in_list(vec![Expr::constant("a'"), Expr::constant("b")]);
    let right = int(0).in_list(vec![Expr::constant("a"), Expr::constant("'b")]);
    assert_ne!(key(&left), key(&right));
}

#[test]
fn entity_set_identity_is_part_of_the_key() {
    let orders = Expr::scan(entity_set("Shop", "Orders", "Shop.Order"));
    let archive = Expr::scan(entity_set("Archive", "Orders", "Shop.Order"));
    assert_ne!(key(&orders), key(&archive));
}

#[test]
fn unsupported_kind_is_not_an_error() {
    let tree = Expr::extension("FullTextMatch", TypeUsage::boolean(), vec![int(1)]);
    assert_eq!(try_generate_key(&tree).unwrap(), None);
}

#[test]
fn mistyped_constant_is_not_cacheable() {
    let tree = Expr::typed_constant(
        ConstantValue::Int32(5),
        primitive(PrimitiveTypeKind::Binary),
    );
    assert_eq!(try_generate_key(&tree).unwrap(), None);
}

#[test]
fn case_branches_keep_their_order() {
    let p1 = Expr::parameter("p1", TypeUsage::boolean());
    let p2 = Expr::parameter("p2", TypeUsage::boolean());
    let forward = Expr::case(vec![(p1.clone(), int(1)), (p2.clone(), int(2))], int(0));
    let swapped = Expr::case(vec![(p2, int(2)), (p1, int(1))], int(0));

    let k = key(&forward);
    let positions: Vec<usize> = [
        "WHEN:(@p1",
        "THEN:(1:",
        "WHEN:(@p2",
        "THEN:(2:",
        "ELSE:(0:",
    ]
    .iter()
    .map(|needle| k.find(needle).unwrap_or_else(|| panic!("{} missing in {}", needle, k)))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", k);
    assert_ne!(k, key(&swapped));
}

#[test]
fn filter_over_scan_contains_segments_in_order() {
    let k = key(&orders_filter("x", "Open"));
    let segments = ["[Filter]", "'x'", "Shop.Orders", "[=]", "Status", "'Open':Edm.String"];
    let mut from = 0;
    for segment in segments {
        let at = k[from..]
            .find(segment)
            .unwrap_or_else(|| panic!("{} missing after {} in {}", segment, from, k));
        from += at + segment.len();
    }
}

#[test]
fn variable_names_distinguish_keys() {
    assert_ne!(key(&orders_filter("x", "Open")), key(&orders_filter("y", "Open")));
}

#[test]
fn key_survives_a_tree_file_round_trip() {
    let tree = orders_filter("x", "Open");
    let reloaded = load_tree_from_string(&save_tree_to_string(&tree).unwrap()).unwrap();
    assert_eq!(key(&tree), key(&reloaded));
}

#[test]
fn facets_distinguish_parameters() {
    let narrow = TypeUsage::with_facets(
        EdmType::primitive(PrimitiveTypeKind::String),
        &[plankey_core::Facet::new("MaxLength", "10")],
    );
    let wide = TypeUsage::with_facets(
        EdmType::primitive(PrimitiveTypeKind::String),
        &[plankey_core::Facet::new("MaxLength", "4000")],
    );
    assert_ne!(
        key(&Expr::parameter("name", narrow)),
        key(&Expr::parameter("name", wide))
    );
}

#[test]
fn depth_limit_applies_to_nested_casts() {
    let mut tree = int(1);
    for _ in 0..64 {
        tree = tree.cast_to(primitive(PrimitiveTypeKind::Int64));
    }
    let bounded = KeyGenerator::new(KeyGenConfig::default().with_max_depth(32));
    assert_eq!(bounded.try_generate(&tree).unwrap(), None);

    let unbounded = KeyGenerator::new(KeyGenConfig::default().without_depth_limit());
    assert!(unbounded.try_generate(&tree).unwrap().is_some());
}

// ============================================================================
// Property tests
// ============================================================================

/// Small arithmetic/comparison trees over integer leaves and parameters
fn arb_scalar() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        any::<i32>().prop_map(|v| Expr::constant(v)),
        any::<i64>().prop_map(|v| Expr::constant(v)),
        "[a-z]{1,3}".prop_map(|n| Expr::parameter(n, primitive(PrimitiveTypeKind::Int32))),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.plus(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.minus(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.multiply(b)),
            inner.clone().prop_map(Expr::negate),
            (inner.clone(), inner).prop_map(|(a, b)| a.less_than(b)),
        ]
    })
}

proptest! {
    #[test]
    fn keys_are_deterministic(tree in arb_scalar()) {
        let first = generate_key(&tree).unwrap();
        let second = generate_key(&tree.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn equal_keys_mean_equal_trees(a in arb_scalar(), b in arb_scalar()) {
        let same_key = generate_key(&a).unwrap() == generate_key(&b).unwrap();
        prop_assert_eq!(same_key, a == b);
    }

    #[test]
    fn any_string_literal_is_keyed(s in ".*") {
        let k = generate_key(&Expr::constant(s.as_str())).unwrap();
        let quoted = format!("'{}'", s.replace('\'', "''"));
        prop_assert!(k.as_str().starts_with(&quoted));
    }

    #[test]
    fn int_width_is_never_confused(v in any::<i32>()) {
        prop_assert_ne!(
            generate_key(&Expr::constant(v)).unwrap(),
            generate_key(&Expr::constant(i64::from(v))).unwrap()
        );
    }
}
