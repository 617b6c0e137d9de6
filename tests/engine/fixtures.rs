//! Shared schema and call builders for engine tests

use std::sync::Arc;

use ontobridge_engine::MappingModel;
use ontobridge_foundation::{Datatype, Iri, Term, Triple, vocab};
use ontobridge_function::{ArgInput, BuilderArena, Call, FunctionRegistry};
use ontobridge_storage::{Graph, GraphStore, Ontology};

pub fn iri(s: &str) -> Iri {
    Iri::new(s)
}

pub fn fname(local: &str) -> Iri {
    Iri::new(vocab::function(local))
}

/// Builder for small test schemas.
#[derive(Default)]
pub struct Schema {
    graph: Graph,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: &str) -> Self {
        self.graph
            .insert(Triple::new(Term::iri(class), vocab::RDF_TYPE, Term::iri(vocab::OWL_CLASS)));
        self
    }

    pub fn sub_class(mut self, class: &str, parent: &str) -> Self {
        self.graph
            .insert(Triple::new(Term::iri(class), vocab::RDFS_SUB_CLASS_OF, Term::iri(parent)));
        self
    }

    pub fn attribute(mut self, property: &str, domain: &str, range: Datatype) -> Self {
        self.graph
            .insert(Triple::new(Term::iri(property), vocab::RDFS_DOMAIN, Term::iri(domain)));
        self.graph
            .insert(Triple::new(Term::iri(property), vocab::RDFS_RANGE, Term::Iri(range.iri())));
        self
    }

    pub fn link(mut self, property: &str, domain: &str, range: &str) -> Self {
        self.graph
            .insert(Triple::new(Term::iri(property), vocab::RDFS_DOMAIN, Term::iri(domain)));
        self.graph
            .insert(Triple::new(Term::iri(property), vocab::RDFS_RANGE, Term::iri(range)));
        self
    }

    pub fn model(self) -> MappingModel {
        MappingModel::new(Ontology::new(self.graph), Arc::new(FunctionRegistry::with_builtins()))
    }
}

/// Person/Address/User/Account schema used across the engine tests.
pub fn people() -> Schema {
    Schema::new()
        .class("urn:Person")
        .class("urn:Address")
        .class("urn:User")
        .class("urn:Account")
        .sub_class("urn:Employee", "urn:Person")
        .attribute("urn:firstName", "urn:Person", Datatype::String)
        .attribute("urn:lastName", "urn:Person", Datatype::String)
        .attribute("urn:age", "urn:Person", Datatype::Integer)
        .attribute("urn:city", "urn:Address", Datatype::String)
        .attribute("urn:fullName", "urn:User", Datatype::String)
        .attribute("urn:userAge", "urn:User", Datatype::Integer)
        .attribute("urn:login", "urn:Account", Datatype::String)
        .link("urn:livesAt", "urn:Person", "urn:Address")
        .link("urn:hasAccount", "urn:User", "urn:Account")
}

/// Attribute reference argument.
pub fn attr(s: &str) -> ArgInput {
    ArgInput::Resource(Iri::new(s))
}

/// Builds a flat call against the model's registry.
pub fn call(model: &MappingModel, function: &str, args: Vec<(&str, ArgInput)>) -> Call {
    let mut arena = BuilderArena::new();
    let b = arena.create_named(model.registry(), &fname(function)).unwrap();
    for (name, value) in args {
        arena.add(b, name, value).unwrap();
    }
    arena.build(b).unwrap()
}

/// `and(greaterThan(attribute, low), lessThan(attribute, high))`
pub fn between(model: &MappingModel, attribute: &str, low: i64, high: i64) -> Call {
    use ontobridge_foundation::Literal;

    let mut arena = BuilderArena::new();
    let and = arena.create_named(model.registry(), &fname("and")).unwrap();
    for (function, bound) in [("greaterThan", low), ("lessThan", high)] {
        let cmp = arena.create_named(model.registry(), &fname(function)).unwrap();
        arena.add(cmp, "left", iri(attribute)).unwrap();
        arena.add(cmp, "right", Literal::integer(bound)).unwrap();
        arena.add_nested(and, "operand", cmp).unwrap();
    }
    arena.build(and).unwrap()
}
