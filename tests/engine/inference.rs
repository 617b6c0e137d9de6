//! Integration tests for inference runs

use ontobridge_engine::{
    AbortHandle, EngineConfig, InferenceEngine, MappingModel, NativeQueryFacility, QueryFacility,
    RuleTemplate, TemplateBindings, TemplateOutput,
};
use ontobridge_foundation::{Error, ErrorKind, Iri, Literal, Result, Term, Triple, vocab};
use ontobridge_function::EvalContext;
use ontobridge_storage::{Graph, GraphStore, GraphView};

use crate::fixtures::{attr, call, iri, people};

// =============================================================================
// Fixtures
// =============================================================================

fn person(g: &mut Graph, id: &str, grouping: &str, first: &str, age: i64) -> Term {
    let subject = Term::iri(id);
    g.insert(Triple::typed(subject.clone(), iri(grouping)));
    g.insert(Triple::new(subject.clone(), "urn:firstName", Literal::string(first)));
    g.insert(Triple::new(subject.clone(), "urn:age", Literal::integer(age)));
    subject
}

fn users(g: &Graph) -> Vec<Term> {
    g.subjects(&Iri::new(vocab::RDF_TYPE), &Term::iri("urn:User"))
}

/// Person -> User with a generated id and an upper-cased name.
fn naming_model() -> MappingModel {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let id = call(&model, "generateId", vec![]);
    model.add_class_bridge(ctx, None, id).unwrap();
    let upper = call(&model, "upperCase", vec![("value", attr("urn:firstName"))]);
    model
        .add_property_bridge(ctx, None, upper, iri("urn:fullName"))
        .unwrap();
    model
}

// =============================================================================
// Rule Applicability
// =============================================================================

#[test]
fn rules_apply_to_sub_groupings_by_default() {
    let model = naming_model();
    let mut source = Graph::new();
    person(&mut source, "urn:emp", "urn:Employee", "Eve", 30);

    let mut target = Graph::new();
    let report = InferenceEngine::new(&model).run(&source, &mut target).unwrap();
    let found = users(&target);
    assert_eq!(found.len(), 1);
    assert_eq!(
        target.objects(&found[0], &iri("urn:fullName")),
        vec![Term::from(Literal::string("EVE"))]
    );
    assert_eq!(report.executions, 2);
}

#[test]
fn exact_matching_ignores_sub_groupings() {
    let model = naming_model();
    let mut source = Graph::new();
    person(&mut source, "urn:emp", "urn:Employee", "Eve", 30);
    person(&mut source, "urn:ann", "urn:Person", "Ann", 40);

    let mut target = Graph::new();
    let report = InferenceEngine::new(&model)
        .with_config(EngineConfig::default().with_inherit_rules(false))
        .run(&source, &mut target)
        .unwrap();
    assert_eq!(users(&target).len(), 1);
    assert_eq!(report.executions, 2);
}

#[test]
fn individuals_without_data_get_no_attributes() {
    let model = naming_model();
    let mut source = Graph::new();
    source.insert(Triple::typed(Term::iri("urn:anon"), iri("urn:Person")));

    let mut target = Graph::new();
    let report = InferenceEngine::new(&model).run(&source, &mut target).unwrap();
    assert_eq!(users(&target).len(), 1);
    assert_eq!(target.len(), 1);
    assert_eq!(report.triples_added, 1);
}

#[test]
fn equal_seeds_mint_equal_identifiers() {
    let model = naming_model();
    let mut source = Graph::new();
    person(&mut source, "urn:ann", "urn:Person", "Ann", 40);

    let run = |seed: u64| {
        let mut target = Graph::new();
        InferenceEngine::new(&model)
            .with_config(
                EngineConfig::default()
                    .with_id_seed(seed)
                    .with_id_namespace("urn:test:"),
            )
            .run(&source, &mut target)
            .unwrap();
        users(&target)
    };
    let first = run(7);
    assert_eq!(first, run(7));
    assert_ne!(first, run(8));
    assert!(first[0].to_string().contains("urn:test:"));
}

// =============================================================================
// Attached Contexts
// =============================================================================

#[test]
fn attached_contexts_link_their_targets() {
    let mut model = people().model();
    let user = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let account = model.create_context(iri("urn:Person"), iri("urn:Account")).unwrap();
    for ctx in [user, account] {
        let id = call(&model, "generateId", vec![]);
        model.add_class_bridge(ctx, None, id).unwrap();
    }
    model.bind_contexts(user, account).unwrap();

    let mut source = Graph::new();
    person(&mut source, "urn:ann", "urn:Person", "Ann", 40);
    let mut target = Graph::new();
    InferenceEngine::new(&model).run(&source, &mut target).unwrap();

    let found = users(&target);
    assert_eq!(found.len(), 1);
    let linked = target.objects(&found[0], &iri("urn:hasAccount"));
    assert_eq!(linked.len(), 1);
    assert_eq!(target.types_of(&linked[0]), vec![iri("urn:Account")]);
    assert_eq!(target.len(), 3);
}

// =============================================================================
// Facilities and Aborts
// =============================================================================

/// Aborts the run from inside the first execution.
struct Aborting {
    handle: AbortHandle,
}

impl QueryFacility for Aborting {
    fn execute(
        &self,
        template: &RuleTemplate,
        bindings: &TemplateBindings<'_>,
        view: &dyn GraphView,
        eval: &mut EvalContext<'_>,
    ) -> Result<Vec<Triple>> {
        self.handle.abort();
        NativeQueryFacility.execute(template, bindings, view, eval)
    }
}

#[test]
fn abort_keeps_partial_results() {
    let model = naming_model();
    let mut source = Graph::new();
    person(&mut source, "urn:ann", "urn:Person", "Ann", 40);
    person(&mut source, "urn:bob", "urn:Person", "Bob", 50);

    let engine = InferenceEngine::new(&model);
    let handle = engine.abort_handle();
    let engine = engine.with_facility(Aborting {
        handle: handle.clone(),
    });

    let mut target = Graph::new();
    let err = engine.run(&source, &mut target).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Aborted));
    assert!(handle.is_aborted());
    // The first individual finished before the abort was observed.
    assert_eq!(users(&target).len(), 1);
}

/// Rejects attribute templates, passes everything else through.
struct NoAttributes;

impl QueryFacility for NoAttributes {
    fn execute(
        &self,
        template: &RuleTemplate,
        bindings: &TemplateBindings<'_>,
        view: &dyn GraphView,
        eval: &mut EvalContext<'_>,
    ) -> Result<Vec<Triple>> {
        match template.output() {
            TemplateOutput::Attribute => Err(Error::internal("attribute templates unsupported")),
            TemplateOutput::Type => NativeQueryFacility.execute(template, bindings, view, eval),
        }
    }
}

#[test]
fn facility_errors_stop_the_run() {
    let model = naming_model();
    let mut source = Graph::new();
    person(&mut source, "urn:ann", "urn:Person", "Ann", 40);

    let mut target = Graph::new();
    let err = InferenceEngine::new(&model)
        .with_facility(NoAttributes)
        .run(&source, &mut target)
        .unwrap_err();
    match &err.kind {
        ErrorKind::RuleExecution { rule, individual, cause } => {
            assert!(rule.contains("bridge"));
            assert_eq!(individual, "<urn:ann>");
            assert!(matches!(cause.kind, ErrorKind::Internal(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(users(&target).len(), 1);
}
