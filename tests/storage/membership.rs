//! Integration tests for the schema oracle and class membership

use ontobridge_foundation::{Datatype, Iri, Term, Triple, ValueType, vocab};
use ontobridge_storage::{Graph, GraphStore, Ontology, SchemaOracle};

fn iri(s: &str) -> Iri {
    Iri::new(s)
}

fn t(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(Term::iri(s), Iri::new(p), Term::iri(o))
}

/// Agent = unionOf(Person, Org); Employee subClassOf Person and a restriction on badge.
fn ontology() -> Ontology {
    let mut g = Graph::from_triples([
        t("urn:Person", vocab::RDF_TYPE, vocab::OWL_CLASS),
        t("urn:Org", vocab::RDF_TYPE, vocab::OWL_CLASS),
        t("urn:Employee", vocab::RDFS_SUB_CLASS_OF, "urn:Person"),
        t("urn:Agent", vocab::OWL_UNION_OF, "urn:l1"),
        t("urn:l1", vocab::RDF_FIRST, "urn:Person"),
        t("urn:l1", vocab::RDF_REST, "urn:l2"),
        t("urn:l2", vocab::RDF_FIRST, "urn:Org"),
        t("urn:l2", vocab::RDF_REST, vocab::RDF_NIL),
        t("urn:name", vocab::RDFS_DOMAIN, "urn:Person"),
        t("urn:agentId", vocab::RDFS_DOMAIN, "urn:Agent"),
        t("urn:worksFor", vocab::RDFS_DOMAIN, "urn:Employee"),
        t("urn:worksFor", vocab::RDFS_RANGE, "urn:Org"),
        t("urn:worksFor", vocab::RDF_TYPE, vocab::OWL_OBJECT_PROPERTY),
    ]);
    g.insert(t("urn:age", vocab::RDFS_DOMAIN, "urn:Person"));
    g.insert(Triple::new(
        Term::iri("urn:age"),
        Iri::new(vocab::RDFS_RANGE),
        Term::Iri(Datatype::Integer.iri()),
    ));
    g.insert(Triple::new(
        Term::iri("urn:Employee"),
        Iri::new(vocab::RDFS_SUB_CLASS_OF),
        Term::blank("r"),
    ));
    g.insert(Triple::new(Term::blank("r"), Iri::new(vocab::RDF_TYPE), Term::iri(vocab::OWL_RESTRICTION)));
    g.insert(Triple::new(Term::blank("r"), Iri::new(vocab::OWL_ON_PROPERTY), Term::iri("urn:badge")));
    Ontology::new(g)
}

// =============================================================================
// Attribute Sets
// =============================================================================

#[test]
fn attributes_follow_every_relation() {
    let onto = ontology();
    let employee = onto.attributes_of(&iri("urn:Employee"));
    for a in ["urn:name", "urn:age", "urn:agentId", "urn:worksFor", "urn:badge", vocab::RDFS_LABEL] {
        assert!(employee.contains(&iri(a)), "missing {a}");
    }

    let org = onto.attributes_of(&iri("urn:Org"));
    assert!(org.contains(&iri("urn:agentId")));
    assert!(!org.contains(&iri("urn:name")));
}

#[test]
fn groupings_are_reflexive_and_rooted() {
    let onto = ontology();
    let closure = onto.groupings_of(&iri("urn:Employee"));
    for g in ["urn:Employee", "urn:Person", "urn:Agent", vocab::OWL_THING] {
        assert!(closure.contains(&iri(g)), "missing {g}");
    }
    assert!(onto.specializes(&iri("urn:Employee"), &iri("urn:Agent")));
    assert!(!onto.specializes(&iri("urn:Person"), &iri("urn:Employee")));
}

#[test]
fn repeated_queries_hit_the_cache() {
    let onto = ontology();
    let first = onto.attributes_of(&iri("urn:Person"));
    let second = onto.attributes_of(&iri("urn:Person"));
    assert_eq!(first, second);
    assert_eq!(onto.membership().cached(), 1);
}

#[test]
fn schema_mutation_is_visible_next_read() {
    let mut onto = ontology();
    assert!(!onto.is_member(&iri("urn:email"), &iri("urn:Employee")));
    onto.graph_mut().insert(t("urn:email", vocab::RDFS_DOMAIN, "urn:Agent"));
    assert!(onto.is_member(&iri("urn:email"), &iri("urn:Employee")));

    onto.graph_mut().remove(&t("urn:Employee", vocab::RDFS_SUB_CLASS_OF, "urn:Person"));
    assert!(!onto.is_member(&iri("urn:name"), &iri("urn:Employee")));
}

// =============================================================================
// Oracle
// =============================================================================

#[test]
fn oracle_classifies_identifiers() {
    let onto = ontology();
    let g = onto.graph();
    assert!(g.is_grouping(&iri("urn:Person")));
    assert!(g.is_datatype(&Datatype::Integer.iri()));
    assert_eq!(g.classify(&iri("urn:worksFor")), ValueType::ObjectProperty);
    assert_eq!(g.ranges(&iri("urn:worksFor")), vec![iri("urn:Org")]);
    assert_eq!(g.domains(&iri("urn:name")), vec![iri("urn:Person")]);
}
