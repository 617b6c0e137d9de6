//! Saving calls as reusable functions.
//!
//! A synonym turns the resource references of one or more calls into
//! parameters, keeps literals in the body, and registers the result as a
//! user-defined function. References bound to structural arguments (classes,
//! datatypes, properties) are constants, not parameters.

use std::fmt;

use ontobridge_foundation::{Error, Iri, Result, ValueType, vocab};

use crate::call::{Call, CallValue};
use crate::signature::{Argument, FunctionSignature, is_structural};

/// A saved call: its derived signature, body, and parameter bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synonym {
    signature: FunctionSignature,
    body: Call,
    parameters: Vec<(String, Iri)>,
}

impl Synonym {
    /// The derived signature.
    #[must_use]
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// The call evaluated when the synonym is invoked.
    #[must_use]
    pub fn body(&self) -> &Call {
        &self.body
    }

    /// Parameter name and the attribute it stands for, in argument order.
    #[must_use]
    pub fn parameters(&self) -> &[(String, Iri)] {
        &self.parameters
    }

    pub(crate) fn add_dependency(&mut self, function: Iri) {
        self.signature.add_dependency(function);
    }

    pub(crate) fn into_parts(self) -> (FunctionSignature, Self) {
        (self.signature.clone(), self)
    }
}

impl fmt::Display for Synonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.signature, self.body)
    }
}

struct Parameter {
    attribute: Iri,
    name: String,
    optional: bool,
    value_type: ValueType,
}

impl Parameter {
    fn merge(&mut self, optional: bool, value_type: &ValueType) {
        self.optional &= optional;
        if self.value_type != *value_type {
            self.value_type = ValueType::Any;
        }
    }
}

/// Collects (attribute, optional, type) occurrences, depth-first.
fn occurrences(call: &Call, inherited_optional: bool, out: &mut Vec<(Iri, bool, ValueType)>) {
    let sig = call.function();
    for (key, value) in call.entries() {
        let Some(arg) = sig.arguments().get(key.index) else {
            continue;
        };
        let optional = inherited_optional || arg.is_optional() || arg.default().is_some();
        match value {
            CallValue::Resource(iri) if !is_structural(arg.value_type()) => {
                out.push((iri.clone(), optional, arg.value_type().clone()));
            }
            CallValue::Call(nested) => occurrences(nested, optional, out),
            _ => {}
        }
    }
}

fn unique_name(attribute: &Iri, taken: &[Parameter]) -> String {
    let base = match attribute.local_name() {
        "" => "arg",
        local if local == vocab::THIS_ARGUMENT => "this_value",
        local => local,
    };
    let used = |candidate: &str| taken.iter().any(|p| p.name == candidate);
    if !used(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !used(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl Call {
    /// Derives a synonym named `name` from one or more calls.
    ///
    /// The first call is the body, and only attributes it references become
    /// parameters. The remaining calls refine optionality: a parameter stays
    /// optional only if it is optional at every occurrence across all calls.
    /// Optional parameters come first, each group in first-seen order.
    ///
    /// The recorded dependencies are the functions the calls use directly;
    /// registering the synonym widens them to the transitive closure.
    ///
    /// # Errors
    ///
    /// Returns a signature error if `calls` is empty.
    pub fn derive_synonym(name: Iri, calls: &[&Call]) -> Result<Synonym> {
        let Some(body) = calls.first() else {
            return Err(Error::signature(format!(
                "{name}: a synonym needs at least one call"
            )));
        };

        let mut found = Vec::new();
        occurrences(body, false, &mut found);
        let mut params: Vec<Parameter> = Vec::new();
        for (attribute, optional, value_type) in found {
            if let Some(existing) = params.iter_mut().find(|p| p.attribute == attribute) {
                existing.merge(optional, &value_type);
                continue;
            }
            let name = unique_name(&attribute, &params);
            params.push(Parameter {
                attribute,
                name,
                optional,
                value_type,
            });
        }

        // The other calls only refine parameters the body reads.
        let mut others = Vec::new();
        for call in &calls[1..] {
            occurrences(call, false, &mut others);
        }
        for (attribute, optional, value_type) in others {
            if let Some(existing) = params.iter_mut().find(|p| p.attribute == attribute) {
                existing.merge(optional, &value_type);
            }
        }
        // Stable: optional first, then required, first-seen within each.
        params.sort_by_key(|p| !p.optional);

        let mut builder = FunctionSignature::builder(name, body.return_type().clone()).user_defined();
        if body.is_target() {
            builder = builder.target();
        }
        for param in &params {
            builder = builder.argument(if param.optional {
                Argument::optional(param.name.clone(), param.value_type.clone())
            } else {
                Argument::required(param.name.clone(), param.value_type.clone())
            });
        }
        for call in calls {
            for function in call.functions_used() {
                builder = builder.depends_on(function);
            }
        }

        Ok(Synonym {
            signature: builder.build()?,
            body: (*body).clone(),
            parameters: params.into_iter().map(|p| (p.name, p.attribute)).collect(),
        })
    }
}
