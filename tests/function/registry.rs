//! Integration tests for the function registry and synonyms

use std::sync::Arc;
use std::thread;

use ontobridge_foundation::{Datatype, ErrorKind, Iri, Literal, Term, ValueType, vocab};
use ontobridge_function::{
    Argument, BuilderArena, EvalContext, FunctionRegistry, FunctionRole, FunctionSignature, IdMinter,
    NativeFn, evaluate,
};

fn fname(local: &str) -> Iri {
    Iri::new(vocab::function(local))
}

fn shout(
    args: &ontobridge_function::Arguments<'_>,
    _: &mut EvalContext<'_>,
) -> ontobridge_foundation::Result<Option<Term>> {
    Ok(args
        .get("value")
        .map(|v| Term::from(Literal::string(format!("{}!", v.lexical())))))
}

fn shout_signature() -> FunctionSignature {
    FunctionSignature::builder("urn:custom:shout", ValueType::Datatype(Datatype::String))
        .argument(Argument::required("value", ValueType::Literal))
        .build()
        .unwrap()
}

// =============================================================================
// Lookup and Listing
// =============================================================================

#[test]
fn builtins_are_registered_with_roles() {
    let registry = FunctionRegistry::with_builtins();
    assert_eq!(registry.get_function(&fname("and")).unwrap().role(), FunctionRole::Boolean);
    assert_eq!(registry.get_function(&fname("generateId")).unwrap().role(), FunctionRole::Target);
    assert_eq!(registry.get_function(&fname("concat")).unwrap().role(), FunctionRole::Value);

    let err = registry.get_function(&fname("missing")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(_)));
}

#[test]
fn listing_is_restartable() {
    let registry = FunctionRegistry::with_builtins();
    let mut functions = registry.functions();
    let first: Vec<Iri> = functions.by_ref().map(|f| f.name().clone()).collect();
    assert_eq!(first.len(), registry.len());
    assert!(functions.next().is_none());

    functions.restart();
    let second: Vec<Iri> = functions.map(|f| f.name().clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn signatures_reject_duplicates() {
    let err = FunctionSignature::builder("urn:custom:dup", ValueType::Any)
        .argument(Argument::required("a", ValueType::Any))
        .argument(Argument::optional("a", ValueType::Any))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Signature(_)));
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn snapshots_do_not_see_later_registrations() {
    let registry = FunctionRegistry::with_builtins();
    let before = registry.snapshot();
    registry.register(shout_signature(), shout as NativeFn);

    assert!(!before.contains(&Iri::new("urn:custom:shout")));
    assert!(registry.snapshot().contains(&Iri::new("urn:custom:shout")));
    assert_eq!(registry.len(), before.len() + 1);
}

#[test]
fn readers_and_a_writer_share_the_registry() {
    let registry = Arc::new(FunctionRegistry::with_builtins());
    let baseline = registry.len();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = registry.snapshot();
                    let listed = snapshot.functions().count();
                    assert_eq!(listed, snapshot.len());
                    assert!(listed >= baseline);
                }
            })
        })
        .collect();
    registry.register(shout_signature(), shout as NativeFn);
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.len(), baseline + 1);
}

// =============================================================================
// Synonyms
// =============================================================================

#[test]
fn synonyms_evaluate_their_body() {
    let registry = FunctionRegistry::with_builtins();
    let mut arena = BuilderArena::new();
    let upper = arena.create_named(&registry, &fname("upperCase")).unwrap();
    arena.add(upper, "value", Iri::new("urn:name")).unwrap();
    let body = arena.build(upper).unwrap();

    let signature = registry
        .register_synonym(Iri::new("urn:custom:loudName"), &[&body])
        .unwrap();
    assert!(signature.is_user_defined());
    assert_eq!(signature.arguments().len(), 1);
    let parameter = signature.arguments()[0].name().to_string();

    let call = arena.create_named(&registry, signature.name()).unwrap();
    arena.add(call, &parameter, Iri::new("urn:label")).unwrap();
    let call = arena.build(call).unwrap();

    let snapshot = registry.snapshot();
    let mut minter = IdMinter::new(0, "urn:id:");
    let mut ctx = EvalContext::new(Term::iri("urn:ann"), &snapshot, &mut minter).with_bindings(
        [(Iri::new("urn:label"), Some(Term::from(Literal::string("ann"))))]
            .into_iter()
            .collect(),
    );
    assert_eq!(
        evaluate(&call, &mut ctx).unwrap(),
        Some(Term::from(Literal::string("ANN")))
    );
}

#[test]
fn synonyms_require_registered_functions() {
    let source = FunctionRegistry::with_builtins();
    source.register(shout_signature(), shout as NativeFn);
    let mut arena = BuilderArena::new();
    let b = arena.create_named(&source, &Iri::new("urn:custom:shout")).unwrap();
    arena.add(b, "value", Iri::new("urn:name")).unwrap();
    let body = arena.build(b).unwrap();

    let other = FunctionRegistry::with_builtins();
    let err = other
        .register_synonym(Iri::new("urn:custom:loud"), &[&body])
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(_)));
}
