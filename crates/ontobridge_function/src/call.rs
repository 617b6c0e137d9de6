//! Immutable, fully-resolved function calls.
//!
//! A [`Call`] is produced by [`crate::BuilderArena::build`] and never changes
//! afterwards. Cloning is O(1); nested calls share their subtrees.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ontobridge_foundation::{Error, Iri, Literal, Result, Term, ValueType};

use crate::signature::FunctionSignature;

/// Position of a bound value: declaration index, then vararg position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArgumentKey {
    /// Index of the argument in the signature.
    pub index: usize,
    /// Position within a vararg argument (always 0 otherwise).
    pub position: usize,
}

impl ArgumentKey {
    /// Key of a non-vararg argument.
    #[must_use]
    pub const fn single(index: usize) -> Self {
        Self { index, position: 0 }
    }
}

/// A value bound to an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallValue {
    /// A literal constant.
    Literal(Literal),
    /// A reference to an attribute or a constant resource.
    Resource(Iri),
    /// A nested call.
    Call(Call),
    /// The individual currently being processed.
    Current,
}

impl CallValue {
    /// Converts a signature default into a bound value.
    #[must_use]
    pub fn from_term(term: &Term) -> Self {
        match term {
            Term::Literal(lit) => Self::Literal(lit.clone()),
            Term::Iri(iri) => Self::Resource(iri.clone()),
            Term::Blank(node) => Self::Resource(Iri::new(format!("_:{}", node.label()))),
        }
    }

    /// Returns the nested call, if any.
    #[must_use]
    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Returns the referenced resource, if any.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Iri> {
        match self {
            Self::Resource(iri) => Some(iri),
            _ => None,
        }
    }
}

impl fmt::Display for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Resource(iri) => write!(f, "{iri:?}"),
            Self::Call(call) => write!(f, "{call}"),
            Self::Current => write!(f, "?this"),
        }
    }
}

/// An immutable invocation of a function with bound arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    function: Arc<FunctionSignature>,
    arguments: Arc<BTreeMap<ArgumentKey, CallValue>>,
}

impl Call {
    /// Assembles a call; callers must have checked the invariants.
    pub(crate) fn from_parts(
        function: Arc<FunctionSignature>,
        arguments: BTreeMap<ArgumentKey, CallValue>,
    ) -> Self {
        Self {
            function,
            arguments: Arc::new(arguments),
        }
    }

    /// The called function.
    #[must_use]
    pub fn function(&self) -> &Arc<FunctionSignature> {
        &self.function
    }

    /// The called function's name.
    #[must_use]
    pub fn name(&self) -> &Iri {
        self.function.name()
    }

    /// Returns true if the call computes a filter condition.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.function.is_boolean()
    }

    /// Returns true if the call produces target individuals.
    #[must_use]
    pub fn is_target(&self) -> bool {
        self.function.is_target()
    }

    /// Declared return type.
    #[must_use]
    pub fn return_type(&self) -> &ValueType {
        self.function.return_type()
    }

    /// First value bound to the named argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CallValue> {
        self.values(name).into_iter().next()
    }

    /// Every value bound to the named argument, in position order.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<&CallValue> {
        let Some(index) = self.function.argument_index(name) else {
            return Vec::new();
        };
        self.arguments
            .range(ArgumentKey::single(index)..ArgumentKey::single(index + 1))
            .map(|(_, v)| v)
            .collect()
    }

    /// Iterates over bound values in declaration then position order.
    pub fn entries(&self) -> impl Iterator<Item = (ArgumentKey, &CallValue)> {
        self.arguments.iter().map(|(k, v)| (*k, v))
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Resource references anywhere in the tree, in first-seen order.
    ///
    /// These are attribute candidates; whether each is a source attribute,
    /// a target attribute, or a constant is decided against a schema.
    #[must_use]
    pub fn attribute_references(&self) -> Vec<Iri> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references(&self, found: &mut Vec<Iri>) {
        for value in self.arguments.values() {
            match value {
                CallValue::Resource(iri) => {
                    if !found.contains(iri) {
                        found.push(iri.clone());
                    }
                }
                CallValue::Call(nested) => nested.collect_references(found),
                CallValue::Literal(_) | CallValue::Current => {}
            }
        }
    }

    /// Names of every function used in the tree, this one first.
    #[must_use]
    pub fn functions_used(&self) -> Vec<Iri> {
        let mut found = vec![self.name().clone()];
        let mut stack: Vec<&Call> = vec![self];
        while let Some(call) = stack.pop() {
            for value in call.arguments.values() {
                if let CallValue::Call(nested) = value {
                    if !found.contains(nested.name()) {
                        found.push(nested.name().clone());
                    }
                    stack.push(nested);
                }
            }
        }
        found
    }

    /// Returns true if the current individual is referenced anywhere.
    #[must_use]
    pub fn uses_current(&self) -> bool {
        self.arguments.values().any(|v| match v {
            CallValue::Current => true,
            CallValue::Call(nested) => nested.uses_current(),
            _ => false,
        })
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.name().local_name())?;
        for (i, (key, value)) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let name = self
                .function
                .arguments()
                .get(key.index)
                .map_or("?", |a| a.name());
            write!(f, "{name}={value}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Re-checks the invariants of a call tree without changing anything.
///
/// Every key must name an assignable argument, varargs alone may use
/// positions past zero, required arguments must be bound, literal values
/// must fit their declared types, and nesting must respect both the host's
/// and the nested function's policy.
///
/// # Errors
///
/// Returns an aggregate [`ontobridge_foundation::ErrorKind::InvalidCall`]
/// listing every violation.
pub fn validate(call: &Call) -> Result<()> {
    let mut problems = Vec::new();
    collect_violations(call, &mut problems);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_call(call.name().clone(), problems))
    }
}

fn collect_violations(call: &Call, problems: &mut Vec<Error>) {
    let sig = call.function();
    for (key, value) in call.entries() {
        let Some(arg) = sig.arguments().get(key.index) else {
            problems.push(Error::signature(format!(
                "{}: no argument at index {}",
                sig.name(),
                key.index
            )));
            continue;
        };
        if !arg.is_assignable() {
            problems.push(Error::signature(format!(
                "{}: argument {} is not assignable",
                sig.name(),
                arg.name()
            )));
        }
        if key.position > 0 && !arg.is_vararg() {
            problems.push(Error::signature(format!(
                "{}: argument {} is bound more than once",
                sig.name(),
                arg.name()
            )));
        }
        match value {
            CallValue::Literal(lit) => {
                if !arg.value_type().accepts(&lit.value_type()) {
                    problems.push(Error::type_mismatch(
                        arg.name(),
                        arg.value_type().clone(),
                        lit.value_type(),
                    ));
                }
            }
            CallValue::Call(nested) => {
                if !sig.can_have_nested() {
                    problems.push(Error::nesting_policy(format!(
                        "{} does not accept nested calls",
                        sig.name()
                    )));
                }
                if !nested.function().can_be_nested() {
                    problems.push(Error::nesting_policy(format!(
                        "{} cannot be nested",
                        nested.name()
                    )));
                }
                if !arg.value_type().accepts(nested.return_type()) {
                    problems.push(Error::type_mismatch(
                        arg.name(),
                        arg.value_type().clone(),
                        nested.return_type().clone(),
                    ));
                }
                if let Err(err) = validate(nested) {
                    problems.push(err);
                }
            }
            CallValue::Resource(_) | CallValue::Current => {}
        }
    }
    for (index, arg) in sig.arguments().iter().enumerate() {
        if arg.is_required()
            && call
                .arguments
                .range(ArgumentKey::single(index)..ArgumentKey::single(index + 1))
                .next()
                .is_none()
        {
            problems.push(Error::missing_argument(sig.name().clone(), arg.name()));
        }
    }
}
