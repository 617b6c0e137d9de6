//! Integration tests for Error types
//!
//! Tests error construction, display, context, and aggregation.

use ontobridge_foundation::{
    Datatype, Error, ErrorContext, ErrorKind, Iri, SemanticLimit, ValueType,
};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(
        "left",
        ValueType::Datatype(Datatype::Integer),
        ValueType::Datatype(Datatype::String),
    );
    let ErrorKind::TypeMismatch { argument, .. } = &err.kind else {
        panic!("expected type mismatch, got {err}");
    };
    assert_eq!(argument, "left");
    assert!(err.to_string().contains("left"));
}

#[test]
fn error_missing_argument() {
    let err = Error::missing_argument(Iri::new("urn:fn:concat"), "value");
    assert!(matches!(err.kind, ErrorKind::MissingRequiredArgument { .. }));
    assert!(err.to_string().contains("value"));
}

#[test]
fn error_link_resolution_names_candidates() {
    let absent = Error::link_resolution(Iri::new("urn:A"), Iri::new("urn:B"), vec![]);
    assert!(absent.to_string().contains("no link"));

    let ambiguous = Error::link_resolution(
        Iri::new("urn:A"),
        Iri::new("urn:B"),
        vec![Iri::new("urn:p"), Iri::new("urn:q")],
    );
    let msg = ambiguous.to_string();
    assert!(msg.contains("urn:p"));
    assert!(msg.contains("urn:q"));
}

#[test]
fn error_dependency_names_dependents() {
    let err = Error::dependency("context-0001", vec!["context-0002".to_string()]);
    assert!(err.to_string().contains("context-0002"));
}

#[test]
fn error_limit_exceeded() {
    let err = Error::limit_exceeded(SemanticLimit::MaxExecutions {
        limit: 10,
        context: Some("context-0001/class".to_string()),
    });
    let msg = err.to_string();
    assert!(msg.contains("10"));
    assert!(msg.contains("context-0001/class"));
}

// =============================================================================
// Context and Aggregation
// =============================================================================

#[test]
fn error_with_context() {
    let err = Error::template_synthesis("too many slots")
        .with_context(ErrorContext::new().with_source("context-0003/bridge-0001"));
    let context = err.context.as_ref().and_then(|c| c.source.as_deref());
    assert_eq!(context, Some("context-0003/bridge-0001"));
}

#[test]
fn aggregate_errors_flatten_to_leaves() {
    let inner = Error::invalid_call(
        Iri::new("urn:fn:inner"),
        vec![Error::missing_argument(Iri::new("urn:fn:inner"), "a")],
    );
    let outer = Error::invalid_call(
        Iri::new("urn:fn:outer"),
        vec![inner, Error::missing_argument(Iri::new("urn:fn:outer"), "b")],
    );
    let leaves = outer.leaves();
    assert_eq!(leaves.len(), 2);
    assert!(
        leaves
            .iter()
            .all(|e| matches!(e.kind, ErrorKind::MissingRequiredArgument { .. }))
    );
}

#[test]
fn rule_execution_keeps_its_cause() {
    let err = Error::rule_execution("context-0001/class", "<urn:ann>", Error::internal("boom"));
    let ErrorKind::RuleExecution { cause, .. } = &err.kind else {
        panic!("expected rule execution error");
    };
    assert!(matches!(cause.kind, ErrorKind::Internal(_)));
    assert!(err.to_string().contains("boom"));
}
