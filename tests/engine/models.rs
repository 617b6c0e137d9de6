//! Integration tests for the mapping model

use ontobridge_engine::{BridgeMapping, ClassMapping, LinkDirection};
use ontobridge_foundation::{Datatype, ErrorKind, Literal, Term, ValueType};
use ontobridge_function::{
    Argument, BuilderArena, EvalContext, FunctionRegistry, FunctionSignature, NativeFn,
};

use crate::fixtures::{attr, between, call, iri, people};

// =============================================================================
// Context Lifecycle
// =============================================================================

#[test]
fn contexts_are_unique_per_grouping_pair() {
    let mut model = people().model();
    let a = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let b = model.create_context(iri("urn:Address"), iri("urn:User")).unwrap();
    assert_ne!(a, b);
    assert_eq!(model.create_context(iri("urn:Person"), iri("urn:User")).unwrap(), a);
    assert_eq!(model.find_context(&iri("urn:Address"), &iri("urn:User")), Some(b));
    assert_eq!(model.len(), 2);

    let ids: Vec<_> = model.contexts().map(|c| c.id()).collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn sub_groupings_and_thing_are_groupings() {
    let mut model = people().model();
    assert!(model.create_context(iri("urn:Employee"), iri("urn:User")).is_ok());
    assert!(
        model
            .create_context(iri("urn:Person"), iri(ontobridge_foundation::vocab::OWL_THING))
            .is_ok()
    );
    let err = model
        .create_context(iri("urn:firstName"), iri("urn:User"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));
}

#[test]
fn deleting_a_context_drops_its_bridges() {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let mapping = call(&model, "identity", vec![("value", attr("urn:firstName"))]);
    let bridge = model
        .add_property_bridge(ctx, None, mapping, iri("urn:fullName"))
        .unwrap();

    let removed = model.delete_context(ctx).unwrap();
    assert_eq!(removed.bridges().count(), 1);
    assert!(model.context(ctx).is_err());
    assert!(model.delete_property_bridge(bridge).is_err());
}

// =============================================================================
// Bridge Validation
// =============================================================================

#[test]
fn class_rules_need_target_producing_mappings() {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();

    let value = call(&model, "identity", vec![("value", attr("urn:firstName"))]);
    let err = model.add_class_bridge(ctx, None, value).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));
    assert!(model.context(ctx).unwrap().class_rule().is_none());

    let filter = between(&model, "urn:age", 17, 120);
    let id = call(&model, "generateId", vec![]);
    model.add_class_bridge(ctx, Some(filter), id).unwrap();
    let rule = model.context(ctx).unwrap().class_rule().unwrap();
    assert!(rule.filter.is_some());
    assert!(matches!(rule.mapping, ClassMapping::Call(_)));
}

#[test]
fn property_bridges_check_attribute_and_range() {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();

    // Not an attribute of User.
    let name = call(&model, "identity", vec![("value", attr("urn:firstName"))]);
    let err = model
        .add_property_bridge(ctx, None, name, iri("urn:city"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));

    // Target-producing mapping on an attribute.
    let id = call(&model, "generateId", vec![]);
    let err = model
        .add_property_bridge(ctx, None, id, iri("urn:fullName"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));

    // String value into an integer attribute.
    let upper = call(&model, "upperCase", vec![("value", attr("urn:firstName"))]);
    let err = model
        .add_property_bridge(ctx, None, upper, iri("urn:userAge"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));

    assert_eq!(model.context(ctx).unwrap().bridges().count(), 0);
}

#[test]
fn filters_must_be_boolean() {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let upper = call(&model, "upperCase", vec![("value", attr("urn:firstName"))]);
    let err = model
        .add_property_bridge(ctx, Some(upper.clone()), upper, iri("urn:fullName"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));

    let filter = between(&model, "urn:age", 0, 150);
    let age = call(&model, "identity", vec![("value", attr("urn:age"))]);
    assert!(
        model
            .add_property_bridge(ctx, Some(filter), age, iri("urn:userAge"))
            .is_ok()
    );
}

fn shout(
    args: &ontobridge_function::Arguments<'_>,
    _: &mut EvalContext<'_>,
) -> ontobridge_foundation::Result<Option<Term>> {
    Ok(args
        .get("value")
        .map(|v| Term::from(Literal::string(format!("{}!", v.lexical())))))
}

#[test]
fn validate_rejects_functions_from_another_registry() {
    let model = people().model();
    let other = FunctionRegistry::with_builtins();
    other.register(
        FunctionSignature::builder("urn:custom:shout", ValueType::Datatype(Datatype::String))
            .argument(Argument::required("value", ValueType::Literal))
            .build()
            .unwrap(),
        shout as NativeFn,
    );

    let mut arena = BuilderArena::new();
    let b = arena.create_named(&other, &iri("urn:custom:shout")).unwrap();
    arena.add(b, "value", Literal::string("hi")).unwrap();
    let foreign = arena.build(b).unwrap();

    let err = model.validate(&foreign).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(_)));

    let native = call(&model, "upperCase", vec![("value", Literal::string("hi").into())]);
    assert!(model.validate(&native).is_ok());
}

// =============================================================================
// Related and Attached Contexts
// =============================================================================

#[test]
fn related_context_uses_the_named_link() {
    let mut model = people().model();
    let person = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let address = model
        .create_related_context(person, iri("urn:Address"), Some(iri("urn:livesAt")))
        .unwrap();

    let rule = model.context(address).unwrap().class_rule().unwrap();
    match &rule.mapping {
        ClassMapping::Related { parent, link } => {
            assert_eq!(*parent, person);
            assert_eq!(link.property, iri("urn:livesAt"));
            assert_eq!(link.direction, LinkDirection::Inverse);
        }
        other => panic!("unexpected mapping: {other:?}"),
    }
    assert_eq!(model.dependents_of(person), vec![address]);

    let err = model
        .create_related_context(person, iri("urn:Address"), Some(iri("urn:hasAccount")))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));
}

#[test]
fn related_context_for_an_existing_pair_is_reused() {
    let mut model = people().model();
    let person = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let existing = model.create_context(iri("urn:Address"), iri("urn:User")).unwrap();
    let related = model
        .create_related_context(person, iri("urn:Address"), None)
        .unwrap();
    assert_eq!(related, existing);
    assert_eq!(model.len(), 2);
}

#[test]
fn bind_discovers_the_link_between_targets() {
    let mut model = people().model();
    let user = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let account = model.create_context(iri("urn:Person"), iri("urn:Account")).unwrap();

    let bridge = model.bind_contexts(user, account).unwrap();
    let bound = model.context(user).unwrap().bridge(bridge).unwrap();
    assert_eq!(bound.target_attribute(), &iri("urn:hasAccount"));
    assert!(matches!(
        bound.mapping(),
        BridgeMapping::Attached { context, direction: LinkDirection::Forward } if *context == account
    ));
    assert_eq!(model.dependents_of(account), vec![user]);

    let err = model.delete_context(account).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Dependency { .. }));
    model.delete_property_bridge(bridge).unwrap();
    assert!(model.delete_context(account).is_ok());
}

#[test]
fn bind_without_a_link_fails() {
    let mut model = people().model();
    let user = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let address = model.create_context(iri("urn:Person"), iri("urn:Address")).unwrap();
    let err = model.bind_contexts(user, address).unwrap_err();
    match err.kind {
        ErrorKind::LinkResolution { candidates, .. } => assert!(candidates.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(model.context(user).unwrap().bridges().count(), 0);
}
