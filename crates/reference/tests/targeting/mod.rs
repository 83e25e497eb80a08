use hclang_reference::{Origins, Target};
use hclang_schema::Type;
use pretty_assertions::assert_eq;

use crate::{addr, nested, origin, scoped, target, typed};

#[test]
fn test_no_origins() {
    let t = target(addr("test", &[]), Some(Type::String), None);
    assert!(Origins::default().targeting(&t).is_empty());
}

#[test]
fn test_exact_address_match() {
    let matching = origin(addr("test", &[]), vec![typed(Type::String)]);
    let origins = Origins::new(vec![origin(addr("foo", &[]), vec![typed(Type::String)]), matching.clone()]);
    let t = target(addr("test", &[]), Some(Type::String), None);
    assert_eq!(origins.targeting(&t), Origins::new(vec![matching]));
}

#[test]
fn test_no_match() {
    let origins = Origins::new(vec![origin(addr("foo", &[]), vec![typed(Type::String)])]);
    let t = target(addr("test", &[]), Some(Type::String), None);
    assert!(origins.targeting(&t).is_empty());
}

#[test]
fn test_nested_target_two_matches() {
    let top = origin(addr("test", &[]), vec![typed(Type::Dynamic)]);
    let second = origin(addr("test", &["second"]), vec![typed(Type::String)]);
    let origins = Origins::new(vec![origin(addr("foo", &[]), vec![]), top.clone(), second.clone()]);
    let t = nested(
        target(addr("test", &[]), Some(Type::object([("second", Type::String)])), None),
        vec![target(addr("test", &["second"]), Some(Type::String), None)],
    );
    assert_eq!(origins.targeting(&t), Origins::new(vec![top, second]));
}

#[test]
fn test_nested_targets_do_not_duplicate() {
    let first = origin(addr("test", &["first"]), vec![typed(Type::Number)]);
    let second = origin(addr("test", &["second"]), vec![typed(Type::String)]);
    let unrelated = origin(addr("other", &["first"]), vec![typed(Type::Number)]);
    let origins = Origins::new(vec![first.clone(), unrelated, second.clone()]);
    let t = nested(
        target(
            addr("test", &[]),
            Some(Type::object([("first", Type::Number), ("second", Type::String)])),
            None,
        ),
        vec![
            target(addr("test", &["first"]), Some(Type::Number), None),
            target(addr("test", &["second"]), Some(Type::String), None),
        ],
    );
    assert_eq!(origins.targeting(&t), Origins::new(vec![first, second]));
}

#[test]
fn test_loose_match_of_unknown_type() {
    let top = origin(addr("test", &[]), vec![Default::default()]);
    let second = origin(addr("test", &["second"]), vec![Default::default()]);
    let origins = Origins::new(vec![
        origin(addr("foo", &[]), vec![Default::default()]),
        top.clone(),
        second.clone(),
    ]);
    let t = target(addr("test", &[]), Some(Type::Dynamic), None);
    assert_eq!(origins.targeting(&t), Origins::new(vec![top, second]));
}

#[test]
fn test_scope_only_constraint_needs_typed_target() {
    let origins = Origins::new(vec![origin(addr("test", &[]), vec![scoped("test")])]);
    let t = target(addr("test", &[]), Some(Type::String), Some("test"));
    assert!(origins.targeting(&t).is_empty());
}

#[test]
fn test_scope_mismatch_rejects_matching_type() {
    let mut cons = typed(Type::String);
    cons.of_scope_id = Some("one".into());
    let origins = Origins::new(vec![origin(addr("test", &[]), vec![cons])]);
    assert!(origins
        .targeting(&target(addr("test", &[]), Some(Type::String), Some("two")))
        .is_empty());
    assert!(origins
        .targeting(&target(addr("test", &[]), Some(Type::String), None))
        .is_empty());
    assert_eq!(
        origins
            .targeting(&target(addr("test", &[]), Some(Type::String), Some("one")))
            .len(),
        1
    );
}

#[test]
fn test_type_only_constraint_skips_scoped_target() {
    let origins = Origins::new(vec![origin(addr("var", &["foo"]), vec![typed(Type::String)])]);
    let t = target(addr("var", &["foo"]), Some(Type::String), Some("variable"));
    assert!(origins.targeting(&t).is_empty());
}

#[test]
fn test_concrete_type_mismatch() {
    let origins = Origins::new(vec![origin(addr("test", &[]), vec![typed(Type::String)])]);
    let t = target(addr("test", &[]), Some(Type::list(Type::String)), None);
    assert!(origins.targeting(&t).is_empty());
}

#[test]
fn test_nil_signature_never_matches() {
    let origins = Origins::new(vec![
        origin(addr("test", &[]), vec![]),
        origin(addr("test", &[]), vec![typed(Type::Dynamic)]),
    ]);
    let t = Target {
        addr: Some(addr("test", &[])),
        ..Target::default()
    };
    assert!(origins.targeting(&t).is_empty());
}

#[test]
fn test_constraint_less_origin_and_scope_only_target() {
    let origins = Origins::new(vec![origin(addr("var", &["alpha"]), vec![])]);
    let t = target(addr("var", &["alpha"]), None, Some("variable"));
    assert!(origins.targeting(&t).is_empty());
}

#[test]
fn test_constraint_less_origin_and_type_aware_target() {
    let beta = origin(addr("var", &["beta"]), vec![]);
    let origins = Origins::new(vec![beta.clone()]);
    let t = target(addr("var", &["beta"]), Some(Type::Dynamic), Some("variable"));
    assert_eq!(origins.targeting(&t), Origins::new(vec![beta]));
}
