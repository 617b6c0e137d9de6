//! Conditions, connectives, and comparisons.
//!
//! Connectives use three-valued logic: a deciding operand wins, otherwise
//! any absent operand makes the result absent.

use std::cmp::Ordering;

use ontobridge_foundation::{Datatype, Literal, Result, Term, ValueType};

use super::{boolean, name};
use crate::eval::{Arguments, EvalContext};
use crate::registry::NativeFn;
use crate::signature::{Argument, FunctionSignature};

fn bool_type() -> ValueType {
    ValueType::Datatype(Datatype::Boolean)
}

fn comparison(local: &str) -> FunctionSignature {
    FunctionSignature::builder(name(local), bool_type())
        .argument(Argument::required("left", ValueType::Literal))
        .argument(Argument::required("right", ValueType::Literal))
        .build_trusted()
}

fn connective(local: &str) -> FunctionSignature {
    FunctionSignature::builder(name(local), bool_type())
        .argument(Argument::required("operand", bool_type()).vararg())
        .build_trusted()
}

pub(super) fn signatures() -> Vec<(FunctionSignature, NativeFn)> {
    vec![
        (
            FunctionSignature::builder(name("if"), ValueType::Any)
                .argument(Argument::required("condition", bool_type()))
                .argument(Argument::required("then", ValueType::Any))
                .argument(Argument::optional("else", ValueType::Any))
                .build_trusted(),
            native_if as NativeFn,
        ),
        (connective("and"), native_and as NativeFn),
        (connective("or"), native_or as NativeFn),
        (
            FunctionSignature::builder(name("not"), bool_type())
                .argument(Argument::required("value", bool_type()))
                .build_trusted(),
            native_not as NativeFn,
        ),
        (
            FunctionSignature::builder(name("equals"), bool_type())
                .argument(Argument::required("left", ValueType::Any))
                .argument(Argument::required("right", ValueType::Any))
                .build_trusted(),
            native_equals as NativeFn,
        ),
        (comparison("greaterThan"), native_greater_than as NativeFn),
        (comparison("lessThan"), native_less_than as NativeFn),
        (comparison("greaterOrEqual"), native_greater_or_equal as NativeFn),
        (comparison("lessOrEqual"), native_less_or_equal as NativeFn),
        (
            FunctionSignature::builder(name("bound"), bool_type())
                .argument(Argument::optional("value", ValueType::Any))
                .description("True if the value is present")
                .build_trusted(),
            native_bound as NativeFn,
        ),
    ]
}

/// if(condition, then, else)
pub(crate) fn native_if(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(match args.get("condition").and_then(Term::as_bool) {
        Some(true) => args.get("then").cloned(),
        Some(false) => args.get("else").cloned(),
        None => None,
    })
}

fn connect(args: &Arguments<'_>, decider: bool) -> Option<Term> {
    let mut absent = false;
    for value in args.raw("operand") {
        match value.as_ref().and_then(Term::as_bool) {
            Some(b) if b == decider => return boolean(decider),
            Some(_) => {}
            None => absent = true,
        }
    }
    if absent { None } else { boolean(!decider) }
}

/// and(operand...)
pub(crate) fn native_and(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(connect(args, false))
}

/// or(operand...)
pub(crate) fn native_or(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(connect(args, true))
}

/// not(value)
pub(crate) fn native_not(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(args.get("value").and_then(Term::as_bool).and_then(|b| boolean(!b)))
}

fn numeric(term: &Term) -> Option<f64> {
    term.as_literal().and_then(Literal::as_f64)
}

/// Numeric when both sides are numeric literals, lexical otherwise.
fn compare(left: &Term, right: &Term) -> Option<Ordering> {
    match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => Some(left.lexical().cmp(right.lexical())),
    }
}

fn ordered(args: &Arguments<'_>, accept: fn(Ordering) -> bool) -> Option<Term> {
    let ordering = compare(args.get("left")?, args.get("right")?)?;
    boolean(accept(ordering))
}

/// equals(left, right)
pub(crate) fn native_equals(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    let (Some(left), Some(right)) = (args.get("left"), args.get("right")) else {
        return Ok(None);
    };
    if let (Some(l), Some(r)) = (numeric(left), numeric(right)) {
        return Ok(boolean(l.partial_cmp(&r) == Some(Ordering::Equal)));
    }
    Ok(boolean(left == right))
}

/// greaterThan(left, right)
pub(crate) fn native_greater_than(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(ordered(args, Ordering::is_gt))
}

/// lessThan(left, right)
pub(crate) fn native_less_than(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(ordered(args, Ordering::is_lt))
}

/// greaterOrEqual(left, right)
pub(crate) fn native_greater_or_equal(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(ordered(args, Ordering::is_ge))
}

/// lessOrEqual(left, right)
pub(crate) fn native_less_or_equal(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(ordered(args, Ordering::is_le))
}

/// bound(value)
pub(crate) fn native_bound(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(boolean(args.get("value").is_some()))
}
