//! Read-only schema introspection over a graph.
//!
//! The oracle answers the questions class membership, bridge validation,
//! and link discovery ask of an ontology: hierarchy edges, union
//! membership, domain/range declarations, and category of an identifier.

use std::collections::BTreeSet;

use ontobridge_foundation::{Datatype, Iri, Term, ValueType, vocab};

use crate::graph::GraphView;

/// Schema questions answered from ontology facts.
pub trait SchemaOracle {
    /// Direct named super-groupings (`rdfs:subClassOf`).
    fn super_groupings(&self, grouping: &Iri) -> Vec<Iri>;

    /// Named groupings declared equivalent, in either direction.
    fn equivalent_groupings(&self, grouping: &Iri) -> Vec<Iri>;

    /// Named groupings whose union-of list includes `grouping`.
    fn unions_containing(&self, grouping: &Iri) -> Vec<Iri>;

    /// Attributes declared directly on a grouping: domain declarations
    /// and restrictions the grouping specializes or is equivalent to.
    fn declared_attributes(&self, grouping: &Iri) -> Vec<Iri>;

    /// Declared domains of an attribute.
    fn domains(&self, attribute: &Iri) -> Vec<Iri>;

    /// Declared ranges of an attribute.
    fn ranges(&self, attribute: &Iri) -> Vec<Iri>;

    /// Every identifier the schema knows as an attribute.
    fn attributes(&self) -> Vec<Iri>;

    /// The declared property category of an identifier, if it is one.
    fn property_kind(&self, iri: &Iri) -> Option<ValueType>;

    /// Returns true if the identifier names a grouping.
    fn is_grouping(&self, iri: &Iri) -> bool;

    /// Returns true if the identifier names a datatype.
    fn is_datatype(&self, iri: &Iri) -> bool;

    /// Stamp that changes whenever the schema changes.
    fn schema_version(&self) -> u64;

    /// Classifies an identifier onto the type lattice.
    fn classify(&self, iri: &Iri) -> ValueType {
        if self.is_datatype(iri) {
            ValueType::DatatypeClass
        } else if self.is_grouping(iri) {
            ValueType::Class
        } else if let Some(kind) = self.property_kind(iri) {
            kind
        } else {
            ValueType::Resource
        }
    }
}

fn iri(value: &str) -> Iri {
    Iri::new(value)
}

fn named(terms: Vec<Term>) -> Vec<Iri> {
    let set: BTreeSet<Iri> = terms.into_iter().filter_map(|t| t.as_iri().cloned()).collect();
    set.into_iter().collect()
}

/// Walks `rdf:rest` links backwards from a list cell to the list head.
fn list_heads<G: GraphView + ?Sized>(graph: &G, cell: Term) -> Vec<Term> {
    let rest = iri(vocab::RDF_REST);
    let mut heads = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![cell];
    while let Some(cell) = stack.pop() {
        if !seen.insert(cell.clone()) {
            continue;
        }
        let previous = graph.subjects(&rest, &cell);
        if previous.is_empty() {
            heads.push(cell);
        } else {
            stack.extend(previous);
        }
    }
    heads
}

/// Union nodes (named or anonymous) whose member list contains `grouping`.
fn union_nodes<G: GraphView + ?Sized>(graph: &G, grouping: &Iri) -> Vec<Term> {
    let first = iri(vocab::RDF_FIRST);
    let union_of = iri(vocab::OWL_UNION_OF);
    let mut nodes = BTreeSet::new();
    for cell in graph.subjects(&first, &Term::Iri(grouping.clone())) {
        for head in list_heads(graph, cell) {
            nodes.extend(graph.subjects(&union_of, &head));
        }
    }
    nodes.into_iter().collect()
}

impl<G: GraphView + ?Sized> SchemaOracle for G {
    fn super_groupings(&self, grouping: &Iri) -> Vec<Iri> {
        named(self.objects(&Term::Iri(grouping.clone()), &iri(vocab::RDFS_SUB_CLASS_OF)))
    }

    fn equivalent_groupings(&self, grouping: &Iri) -> Vec<Iri> {
        let equivalent = iri(vocab::OWL_EQUIVALENT_CLASS);
        let node = Term::Iri(grouping.clone());
        let mut terms = self.objects(&node, &equivalent);
        terms.extend(self.subjects(&equivalent, &node));
        let mut found = named(terms);
        found.retain(|g| g != grouping);
        found
    }

    fn unions_containing(&self, grouping: &Iri) -> Vec<Iri> {
        let equivalent = iri(vocab::OWL_EQUIVALENT_CLASS);
        let mut found = BTreeSet::new();
        for node in union_nodes(self, grouping) {
            match &node {
                Term::Iri(head) => {
                    found.insert(head.clone());
                }
                _ => {
                    // Anonymous unions are reached through their named equivalents.
                    found.extend(named(self.subjects(&equivalent, &node)));
                    found.extend(named(self.objects(&node, &equivalent)));
                }
            }
        }
        found.remove(grouping);
        found.into_iter().collect()
    }

    fn declared_attributes(&self, grouping: &Iri) -> Vec<Iri> {
        let domain = iri(vocab::RDFS_DOMAIN);
        let on_property = iri(vocab::OWL_ON_PROPERTY);
        let node = Term::Iri(grouping.clone());

        let mut found: BTreeSet<Iri> = named(self.subjects(&domain, &node)).into_iter().collect();

        // Domains declared on an anonymous union apply to every member.
        for union in union_nodes(self, grouping) {
            if !matches!(union, Term::Iri(_)) {
                found.extend(named(self.subjects(&domain, &union)));
            }
        }

        let mut related = self.objects(&node, &iri(vocab::RDFS_SUB_CLASS_OF));
        related.extend(self.objects(&node, &iri(vocab::OWL_EQUIVALENT_CLASS)));
        for restriction in related {
            found.extend(named(self.objects(&restriction, &on_property)));
        }
        found.into_iter().collect()
    }

    fn domains(&self, attribute: &Iri) -> Vec<Iri> {
        named(self.objects(&Term::Iri(attribute.clone()), &iri(vocab::RDFS_DOMAIN)))
    }

    fn ranges(&self, attribute: &Iri) -> Vec<Iri> {
        named(self.objects(&Term::Iri(attribute.clone()), &iri(vocab::RDFS_RANGE)))
    }

    fn attributes(&self) -> Vec<Iri> {
        let mut found = BTreeSet::new();
        for kind in [
            vocab::RDF_PROPERTY,
            vocab::OWL_OBJECT_PROPERTY,
            vocab::OWL_DATATYPE_PROPERTY,
            vocab::OWL_ANNOTATION_PROPERTY,
        ] {
            found.extend(named(self.subjects(&iri(vocab::RDF_TYPE), &Term::iri(kind))));
        }
        for predicate in [vocab::RDFS_DOMAIN, vocab::RDFS_RANGE] {
            found.extend(named(
                self.triples_matching(None, Some(&iri(predicate)), None)
                    .into_iter()
                    .map(|t| t.subject)
                    .collect(),
            ));
        }
        found.into_iter().collect()
    }

    fn property_kind(&self, candidate: &Iri) -> Option<ValueType> {
        let types = self.types_of(&Term::Iri(candidate.clone()));
        let has = |kind: &str| types.iter().any(|t| t.as_str() == kind);
        if has(vocab::OWL_OBJECT_PROPERTY) {
            Some(ValueType::ObjectProperty)
        } else if has(vocab::OWL_DATATYPE_PROPERTY) {
            Some(ValueType::DatatypeProperty)
        } else if has(vocab::OWL_ANNOTATION_PROPERTY) {
            Some(ValueType::AnnotationProperty)
        } else if has(vocab::RDF_PROPERTY)
            || !self.domains(candidate).is_empty()
            || !self.ranges(candidate).is_empty()
        {
            Some(ValueType::Property)
        } else {
            None
        }
    }

    fn is_grouping(&self, candidate: &Iri) -> bool {
        if candidate.as_str() == vocab::OWL_THING {
            return true;
        }
        let node = Term::Iri(candidate.clone());
        let types = self.types_of(&node);
        if types
            .iter()
            .any(|t| t.as_str() == vocab::OWL_CLASS || t.as_str() == vocab::RDFS_CLASS)
        {
            return true;
        }
        let sub_class_of = iri(vocab::RDFS_SUB_CLASS_OF);
        !self.objects(&node, &sub_class_of).is_empty()
            || !self.subjects(&sub_class_of, &node).is_empty()
    }

    fn is_datatype(&self, candidate: &Iri) -> bool {
        Datatype::from_iri(candidate.as_str()).is_some()
            || matches!(
                candidate.as_str(),
                vocab::RDFS_LITERAL | vocab::RDF_PLAIN_LITERAL
            )
            || self
                .types_of(&Term::Iri(candidate.clone()))
                .iter()
                .any(|t| t.as_str() == vocab::RDFS_DATATYPE)
    }

    fn schema_version(&self) -> u64 {
        self.version()
    }
}
