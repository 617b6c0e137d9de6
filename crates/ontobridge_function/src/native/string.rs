//! Text functions.

use ontobridge_foundation::{Datatype, Literal, Result, Term, ValueType};

use super::name;
use crate::eval::{Arguments, EvalContext};
use crate::registry::NativeFn;
use crate::signature::{Argument, FunctionSignature};

fn string() -> ValueType {
    ValueType::Datatype(Datatype::String)
}

pub(super) fn signatures() -> Vec<(FunctionSignature, NativeFn)> {
    vec![
        (
            FunctionSignature::builder(name("identity"), ValueType::Any)
                .argument(Argument::required("value", ValueType::Any))
                .description("Returns its argument unchanged")
                .build_trusted(),
            native_identity as NativeFn,
        ),
        (
            FunctionSignature::builder(name("concat"), string())
                .argument(Argument::required("value", ValueType::Literal).vararg())
                .argument(Argument::optional("sep", string()).with_default(Literal::string("")))
                .description("Joins the present values with a separator")
                .build_trusted(),
            native_concat as NativeFn,
        ),
        (
            FunctionSignature::builder(name("upperCase"), string())
                .argument(Argument::required("value", ValueType::Literal))
                .build_trusted(),
            native_upper_case as NativeFn,
        ),
        (
            FunctionSignature::builder(name("lowerCase"), string())
                .argument(Argument::required("value", ValueType::Literal))
                .build_trusted(),
            native_lower_case as NativeFn,
        ),
        (
            FunctionSignature::builder(name("trim"), string())
                .argument(Argument::required("value", ValueType::Literal))
                .build_trusted(),
            native_trim as NativeFn,
        ),
        (
            FunctionSignature::builder(name("strlen"), ValueType::Datatype(Datatype::Integer))
                .argument(Argument::required("value", ValueType::Literal))
                .description("Length in characters")
                .build_trusted(),
            native_strlen as NativeFn,
        ),
    ]
}

/// Rewrites the text of a literal, keeping its language tag.
fn retext(term: &Term, f: impl FnOnce(&str) -> String) -> Term {
    let text = f(term.lexical());
    match term.as_literal().and_then(Literal::language) {
        Some(lang) => Term::from(Literal::lang_string(text, lang)),
        None => Term::from(Literal::string(text)),
    }
}

/// identity(value)
pub(crate) fn native_identity(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(args.get("value").cloned())
}

/// concat(value..., sep)
pub(crate) fn native_concat(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    let values = args.all("value");
    if values.is_empty() {
        return Ok(None);
    }
    let sep = args.get("sep").map_or("", |t| t.lexical());
    let joined = values
        .iter()
        .map(|t| t.lexical())
        .collect::<Vec<_>>()
        .join(sep);
    Ok(Some(Term::from(Literal::string(joined))))
}

/// upperCase(value)
pub(crate) fn native_upper_case(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(args.get("value").map(|t| retext(t, str::to_uppercase)))
}

/// lowerCase(value)
pub(crate) fn native_lower_case(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(args.get("value").map(|t| retext(t, str::to_lowercase)))
}

/// trim(value)
pub(crate) fn native_trim(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(args.get("value").map(|t| retext(t, |s| s.trim().to_string())))
}

/// strlen(value)
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn native_strlen(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(args
        .get("value")
        .map(|t| Term::from(Literal::integer(t.lexical().chars().count() as i64))))
}
