//! Built-in function library.
//!
//! Functions are organized by category:
//! - `string`: text manipulation
//! - `math`: arithmetic and datatype casts
//! - `logic`: conditions and comparisons (filters)
//! - `target`: target individual producers

#[allow(clippy::unnecessary_wraps)]
mod logic;
#[allow(clippy::unnecessary_wraps)]
mod math;
#[allow(clippy::unnecessary_wraps)]
#[allow(clippy::redundant_closure_for_method_calls)]
mod string;
#[allow(clippy::unnecessary_wraps)]
mod target;

use ontobridge_foundation::{Error, Iri, Literal, Result, Term, vocab};

use crate::registry::NativeFn;
use crate::signature::FunctionSignature;

/// Every built-in signature with its implementation.
pub(crate) fn builtins() -> Vec<(FunctionSignature, NativeFn)> {
    let mut all = Vec::new();
    all.extend(string::signatures());
    all.extend(math::signatures());
    all.extend(logic::signatures());
    all.extend(target::signatures());
    all
}

/// Identifier of a built-in function.
pub(crate) fn name(local: &str) -> Iri {
    Iri::new(vocab::function(local))
}

/// Wraps a boolean result.
pub(crate) fn boolean(value: bool) -> Option<Term> {
    Some(Term::Literal(Literal::boolean(value)))
}

/// Reads a term as a number.
///
/// Non-numeric datatypes are parsed from their lexical form.
pub(crate) fn number(term: &Term) -> Result<f64> {
    let parsed = match term {
        Term::Literal(lit) => lit.as_f64().or_else(|| lit.lexical().trim().parse().ok()),
        _ => None,
    };
    parsed.ok_or_else(|| Error::internal(format!("not a number: {term}")))
}
