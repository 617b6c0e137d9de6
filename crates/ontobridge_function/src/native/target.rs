//! Target individual producers.

use std::fmt::Write;

use ontobridge_foundation::{Datatype, Iri, Result, Term, ValueType, vocab};

use super::name;
use crate::eval::{Arguments, EvalContext};
use crate::registry::NativeFn;
use crate::signature::{Argument, FunctionSignature};

pub(super) fn signatures() -> Vec<(FunctionSignature, NativeFn)> {
    vec![
        (
            FunctionSignature::builder(name("generateId"), ValueType::Resource)
                .target()
                .not_nestable()
                .description("Mints a fresh identifier per source individual")
                .build_trusted(),
            native_generate_id as NativeFn,
        ),
        (
            FunctionSignature::builder(name("buildUri"), ValueType::Resource)
                .argument(Argument::required("namespace", ValueType::Datatype(Datatype::String)))
                .argument(Argument::required("value", ValueType::Literal).vararg())
                .target()
                .description("Builds an identifier from key values")
                .build_trusted(),
            native_build_uri as NativeFn,
        ),
        (
            FunctionSignature::builder(name("self"), ValueType::Resource)
                .argument(Argument::required(vocab::THIS_ARGUMENT, ValueType::Resource))
                .target()
                .not_nestable()
                .description("Reuses the source individual as the target")
                .build_trusted(),
            native_self as NativeFn,
        ),
    ]
}

/// generateId()
pub(crate) fn native_generate_id(_: &Arguments<'_>, ctx: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(Some(Term::Iri(ctx.minter().mint())))
}

fn percent_encode(text: &str, out: &mut String) {
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
}

/// buildUri(namespace, value...); absent if any key value is absent
pub(crate) fn native_build_uri(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    let Some(namespace) = args.get("namespace") else {
        return Ok(None);
    };
    let values = args.raw("value");
    if values.is_empty() || values.iter().any(Option::is_none) {
        return Ok(None);
    }
    let mut uri = namespace.lexical().to_string();
    for (i, value) in values.iter().flatten().enumerate() {
        if i > 0 {
            uri.push('/');
        }
        percent_encode(value.lexical(), &mut uri);
    }
    Ok(Some(Term::Iri(Iri::new(uri))))
}

/// self(this)
pub(crate) fn native_self(args: &Arguments<'_>, ctx: &mut EvalContext<'_>) -> Result<Option<Term>> {
    Ok(Some(
        args.get(vocab::THIS_ARGUMENT)
            .cloned()
            .unwrap_or_else(|| ctx.current().clone()),
    ))
}
