//! Integration tests for the in-memory graph

use ontobridge_foundation::{Iri, Literal, Term, Triple, vocab};
use ontobridge_storage::{Graph, GraphStore, GraphView};

fn fact(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(Term::iri(s), p, Literal::string(o))
}

fn people() -> Graph {
    Graph::from_triples([
        Triple::typed(Term::iri("urn:ann"), Iri::new("urn:Person")),
        Triple::typed(Term::iri("urn:bob"), Iri::new("urn:Person")),
        fact("urn:ann", "urn:name", "Ann"),
        fact("urn:ann", "urn:nick", "A"),
        fact("urn:bob", "urn:name", "Bob"),
    ])
}

// =============================================================================
// Insert / Remove
// =============================================================================

#[test]
fn insert_is_idempotent() {
    let mut g = Graph::new();
    assert!(g.insert(fact("urn:ann", "urn:name", "Ann")));
    assert!(!g.insert(fact("urn:ann", "urn:name", "Ann")));
    assert_eq!(g.len(), 1);
}

#[test]
fn remove_clears_every_index() {
    let mut g = people();
    let t = fact("urn:bob", "urn:name", "Bob");
    assert!(g.remove(&t));
    assert!(!g.remove(&t));
    assert!(!g.contains(&t));
    assert!(g.objects(&Term::iri("urn:bob"), &Iri::new("urn:name")).is_empty());
    assert!(
        g.triples_matching(None, Some(&Iri::new("urn:name")), Some(&Literal::string("Bob").into()))
            .is_empty()
    );
}

#[test]
fn extend_counts_new_triples() {
    let mut g = people();
    let added = g.extend([
        fact("urn:ann", "urn:name", "Ann"),
        fact("urn:cid", "urn:name", "Cid"),
    ]);
    assert_eq!(added, 1);
}

// =============================================================================
// Pattern Matching
// =============================================================================

#[test]
fn wildcards_match_by_position() {
    let g = people();
    let name = Iri::new("urn:name");
    assert_eq!(g.triples_matching(None, Some(&name), None).len(), 2);
    assert_eq!(g.triples_matching(Some(&Term::iri("urn:ann")), None, None).len(), 3);
    assert_eq!(g.triples_matching(None, None, None).len(), g.len());
}

#[test]
fn typed_individuals_are_sorted() {
    let g = people();
    assert_eq!(
        g.typed_individuals(),
        vec![Term::iri("urn:ann"), Term::iri("urn:bob")]
    );
    assert_eq!(g.types_of(&Term::iri("urn:ann")), vec![Iri::new("urn:Person")]);
    assert_eq!(
        g.subjects(&Iri::new(vocab::RDF_TYPE), &Term::iri("urn:Person")).len(),
        2
    );
}

// =============================================================================
// Versions and Snapshots
// =============================================================================

#[test]
fn versions_move_on_effective_mutation_only() {
    let mut g = people();
    let v0 = g.version();
    g.insert(fact("urn:ann", "urn:name", "Ann"));
    assert_eq!(g.version(), v0);
    g.insert(fact("urn:cid", "urn:name", "Cid"));
    assert_ne!(g.version(), v0);
}

#[test]
fn clones_are_independent_snapshots() {
    let before = people();
    let mut after = before.clone();
    after.insert(fact("urn:cid", "urn:name", "Cid"));
    assert_eq!(after.difference(&before), vec![fact("urn:cid", "urn:name", "Cid")]);
    assert!(before.difference(&after).is_empty());
    assert_ne!(before, after);
}
