//! End-to-end mapping scenarios
//!
//! Each test builds a mapping model, runs it over a small source graph, and
//! checks the derived target graph or the error raised on the way.

use ontobridge::engine::InferenceEngine;
use ontobridge::foundation::{ErrorKind, Literal, Term, Triple};
use ontobridge::storage::{Graph, GraphStore, GraphView};

use crate::support::{
    add_person, age_between, full_name, instances, iri, model, person_context, unary,
};

// =============================================================================
// Derivation
// =============================================================================

#[test]
fn generated_user_gets_concatenated_name() {
    let mut model = model(&[]);
    let ctx = person_context(&mut model);
    let mapping = full_name(&model);
    model
        .add_property_bridge(ctx, None, mapping, iri("urn:fullName"))
        .unwrap();

    let mut source = Graph::new();
    add_person(&mut source, "urn:ann", "Ann", "Lee", 30);
    let mut target = Graph::new();
    InferenceEngine::new(&model).run(&source, &mut target).unwrap();

    let users = instances(&target, "urn:User");
    assert_eq!(users.len(), 1);
    assert_eq!(
        target.objects(&users[0], &iri("urn:fullName")),
        vec![Term::from(Literal::string("Ann-Lee"))]
    );
    assert_eq!(target.len(), 2);
}

#[test]
fn filtered_bridge_only_fires_in_range() {
    let mut model = model(&[]);
    let ctx = person_context(&mut model);
    let filter = age_between(&model, 25, 100);
    let mapping = unary(&model, "identity", "urn:age");
    model
        .add_property_bridge(ctx, Some(filter), mapping, iri("urn:userAge"))
        .unwrap();

    let mut source = Graph::new();
    add_person(&mut source, "urn:young", "Kim", "Ito", 10);
    add_person(&mut source, "urn:adult", "Ann", "Lee", 42);
    add_person(&mut source, "urn:ancient", "Old", "Timer", 150);
    let mut target = Graph::new();
    InferenceEngine::new(&model).run(&source, &mut target).unwrap();

    assert_eq!(instances(&target, "urn:User").len(), 3);
    let ages: Vec<_> = target
        .triples_matching(None, Some(&iri("urn:userAge")), None)
        .into_iter()
        .map(|t| t.object)
        .collect();
    assert_eq!(ages, vec![Term::from(Literal::integer(42))]);
}

#[test]
fn rejected_bridge_derives_nothing() {
    let mut model = model(&[]);
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let not_boolean = unary(&model, "upperCase", "urn:firstName");
    let mapping = full_name(&model);

    let err = model
        .add_property_bridge(ctx, Some(not_boolean), mapping, iri("urn:fullName"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BridgeValidation(_)));
    assert_eq!(model.context(ctx).unwrap().bridges().count(), 0);

    let mut source = Graph::new();
    add_person(&mut source, "urn:ann", "Ann", "Lee", 30);
    let mut target = Graph::new();
    let report = InferenceEngine::new(&model).run(&source, &mut target).unwrap();
    assert_eq!(report.triples_added, 0);
    assert!(target.is_empty());
}

#[test]
fn related_context_assigns_to_the_parent_target() {
    let mut model = model(&["urn:livesAt"]);
    let person = person_context(&mut model);
    let address = model
        .create_related_context(person, iri("urn:Address"), None)
        .unwrap();
    let street = unary(&model, "upperCase", "urn:street");
    model
        .add_property_bridge(address, None, street, iri("urn:address"))
        .unwrap();

    let mut source = Graph::new();
    let ann = add_person(&mut source, "urn:ann", "Ann", "Lee", 30);
    let home = Term::iri("urn:home");
    source.insert(Triple::typed(home.clone(), iri("urn:Address")));
    source.insert(Triple::new(
        home.clone(),
        "urn:street",
        Literal::string("main st"),
    ));
    source.insert(Triple::new(ann, "urn:livesAt", home));

    let mut target = Graph::new();
    InferenceEngine::new(&model).run(&source, &mut target).unwrap();
    let users = instances(&target, "urn:User");
    assert_eq!(users.len(), 1);
    assert_eq!(
        target.objects(&users[0], &iri("urn:address")),
        vec![Term::from(Literal::string("MAIN ST"))]
    );
}

// =============================================================================
// Link Resolution
// =============================================================================

#[test]
fn missing_link_is_reported_without_candidates() {
    let mut model = model(&[]);
    let person = person_context(&mut model);
    let err = model
        .create_related_context(person, iri("urn:Place"), None)
        .unwrap_err();
    match err.kind {
        ErrorKind::LinkResolution { candidates, .. } => assert!(candidates.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(model.len(), 1);
}

#[test]
fn ambiguous_link_names_every_candidate() {
    let mut model = model(&["urn:homeAddress", "urn:workAddress"]);
    let person = person_context(&mut model);
    let err = model
        .create_related_context(person, iri("urn:Address"), None)
        .unwrap_err();
    let message = err.to_string();
    match err.kind {
        ErrorKind::LinkResolution { candidates, .. } => {
            assert_eq!(candidates, vec![iri("urn:homeAddress"), iri("urn:workAddress")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(message.contains("homeAddress"));
    assert!(message.contains("workAddress"));

    // Naming the link resolves the ambiguity.
    assert!(
        model
            .create_related_context(person, iri("urn:Address"), Some(iri("urn:workAddress")))
            .is_ok()
    );
}

// =============================================================================
// Dependencies
// =============================================================================

#[test]
fn related_parent_cannot_be_deleted_first() {
    let mut model = model(&["urn:livesAt"]);
    let person = person_context(&mut model);
    let address = model
        .create_related_context(person, iri("urn:Address"), None)
        .unwrap();

    let err = model.delete_context(person).unwrap_err();
    match err.kind {
        ErrorKind::Dependency { dependents, .. } => {
            assert_eq!(dependents, vec![address.to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(model.delete_context(address).is_ok());
    assert!(model.delete_context(person).is_ok());
    assert!(model.is_empty());
}

#[test]
fn attached_context_cannot_be_deleted_first() {
    let mut model = model(&["urn:livesAt"]);
    let person = model.create_context(iri("urn:Person"), iri("urn:Person")).unwrap();
    let home = model.create_context(iri("urn:Person"), iri("urn:Address")).unwrap();
    model.attach_context(person, home, iri("urn:livesAt")).unwrap();

    let err = model.delete_context(home).unwrap_err();
    match err.kind {
        ErrorKind::Dependency { context, dependents } => {
            assert_eq!(context, home.to_string());
            assert_eq!(dependents, vec![person.to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(model.delete_context(person).is_ok());
    assert!(model.delete_context(home).is_ok());
}
