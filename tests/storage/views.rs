//! Integration tests for union views

use ontobridge_foundation::{Iri, Literal, Term, Triple};
use ontobridge_storage::{Graph, GraphStore, GraphView, UnionView};

#[test]
fn union_collapses_duplicates() {
    let shared = Triple::new(Term::iri("urn:ann"), "urn:name", Literal::string("Ann"));
    let a = Graph::from_triples([shared.clone()]);
    let b = Graph::from_triples([
        shared.clone(),
        Triple::new(Term::iri("urn:ann"), "urn:age", Literal::integer(42)),
    ]);

    let view = UnionView::new().with(&a).with(&b);
    assert_eq!(view.parts(), 2);
    assert_eq!(view.len(), 2);
    assert!(view.contains(&shared));
    assert_eq!(view.triples_matching(Some(&Term::iri("urn:ann")), None, None).len(), 2);
}

#[test]
fn union_sees_both_sides() {
    let mut source = Graph::new();
    source.insert(Triple::typed(Term::iri("urn:ann"), Iri::new("urn:Person")));
    let mut target = Graph::new();
    target.insert(Triple::typed(Term::iri("urn:u1"), Iri::new("urn:User")));

    let mut view = UnionView::new();
    view.push(&source);
    view.push(&target);
    assert_eq!(view.typed_individuals(), vec![Term::iri("urn:ann"), Term::iri("urn:u1")]);
}

#[test]
fn empty_union_is_empty() {
    let view = UnionView::new();
    assert!(view.is_empty());
    assert!(view.triples_matching(None, None, None).is_empty());
}
