//! Arithmetic and datatype casts.
//!
//! Integer operands stay integers (with overflow checks); anything else is
//! computed in `f64` and returned as `xsd:decimal`.

use ontobridge_foundation::{Datatype, Error, Literal, Result, Term, ValueType};

use super::{name, number};
use crate::eval::{Arguments, EvalContext};
use crate::registry::NativeFn;
use crate::signature::{Argument, FunctionSignature};

fn binary(local: &str) -> FunctionSignature {
    FunctionSignature::builder(name(local), ValueType::Datatype(Datatype::Decimal))
        .argument(Argument::required("left", ValueType::Datatype(Datatype::Double)))
        .argument(Argument::required("right", ValueType::Datatype(Datatype::Double)))
        .build_trusted()
}

pub(super) fn signatures() -> Vec<(FunctionSignature, NativeFn)> {
    vec![
        (binary("add"), native_add as NativeFn),
        (binary("subtract"), native_subtract as NativeFn),
        (binary("multiply"), native_multiply as NativeFn),
        (binary("divide"), native_divide as NativeFn),
        (
            FunctionSignature::builder(name("cast"), ValueType::Literal)
                .argument(Argument::required("value", ValueType::Literal))
                .argument(Argument::required("datatype", ValueType::DatatypeClass))
                .description("Re-types a literal, absent if the lexical form does not fit")
                .build_trusted(),
            native_cast as NativeFn,
        ),
    ]
}

fn operands<'a>(args: &'a Arguments<'_>) -> Option<(&'a Term, &'a Term)> {
    Some((args.get("left")?, args.get("right")?))
}

fn integers(left: &Term, right: &Term) -> Option<(i64, i64)> {
    Some((left.as_literal()?.as_i64()?, right.as_literal()?.as_i64()?))
}

fn arithmetic(
    args: &Arguments<'_>,
    op: &str,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Option<Term>> {
    let Some((left, right)) = operands(args) else {
        return Ok(None);
    };
    if let Some((l, r)) = integers(left, right) {
        let result = int(l, r).ok_or_else(|| Error::internal(format!("integer overflow in {op}")))?;
        return Ok(Some(Term::from(Literal::integer(result))));
    }
    let result = float(number(left)?, number(right)?);
    Ok(Some(Term::from(Literal::decimal(result))))
}

/// add(left, right)
pub(crate) fn native_add(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    arithmetic(args, "add", i64::checked_add, |l, r| l + r)
}

/// subtract(left, right)
pub(crate) fn native_subtract(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    arithmetic(args, "subtract", i64::checked_sub, |l, r| l - r)
}

/// multiply(left, right)
pub(crate) fn native_multiply(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    arithmetic(args, "multiply", i64::checked_mul, |l, r| l * r)
}

/// divide(left, right); always decimal
pub(crate) fn native_divide(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    let Some((left, right)) = operands(args) else {
        return Ok(None);
    };
    let divisor = number(right)?;
    if divisor == 0.0 {
        return Err(Error::internal("division by zero"));
    }
    Ok(Some(Term::from(Literal::decimal(number(left)? / divisor))))
}

/// cast(value, datatype)
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn native_cast(args: &Arguments<'_>, _: &mut EvalContext<'_>) -> Result<Option<Term>> {
    let (Some(value), Some(Term::Iri(target))) = (args.get("value"), args.get("datatype")) else {
        return Ok(None);
    };
    let lexical = value.lexical().trim();
    let Some(datatype) = Datatype::from_iri(target.as_str()) else {
        return Ok(Some(Term::from(Literal::with_datatype(lexical, target.clone()))));
    };

    let cast = if datatype.is_integer() {
        lexical
            .parse::<i64>()
            .ok()
            .or_else(|| {
                lexical
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
            .map(|i| Literal::typed(i.to_string(), datatype))
    } else if datatype.is_numeric() {
        lexical
            .parse::<f64>()
            .ok()
            .map(|f| Literal::typed(Literal::decimal(f).lexical(), datatype))
    } else {
        match datatype {
            Datatype::Boolean => match lexical {
                "true" | "1" => Some(Literal::boolean(true)),
                "false" | "0" => Some(Literal::boolean(false)),
                _ => None,
            },
            Datatype::String => Some(Literal::string(value.lexical())),
            other => Some(Literal::typed(value.lexical(), other)),
        }
    };

    if cast.is_none() {
        tracing::debug!(value = %value, datatype = %datatype, "cast does not fit");
    }
    Ok(cast.map(Term::from))
}
