//! Expression evaluation over bound slot values.
//!
//! The individual being processed travels explicitly in [`EvalContext`];
//! nothing is held in a hidden global binding. Unbound values are *absent*
//! (`None`): a function whose required input is absent yields absent rather
//! than failing, so a missing source fact simply produces no target fact.

use std::collections::BTreeMap;

use ontobridge_foundation::{Error, Iri, Result, Term};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::call::{Call, CallValue};
use crate::registry::{Implementation, RegistrySnapshot};
use crate::signature::FunctionSignature;

/// Nesting depth past which evaluation gives up (runaway synonyms).
const MAX_DEPTH: usize = 256;

// =============================================================================
// IdMinter
// =============================================================================

/// Deterministic source of fresh identifiers.
#[derive(Debug, Clone)]
pub struct IdMinter {
    rng: ChaCha8Rng,
    namespace: String,
    minted: u64,
}

impl IdMinter {
    /// Creates a minter; equal seeds mint equal sequences.
    #[must_use]
    pub fn new(seed: u64, namespace: impl Into<String>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            namespace: namespace.into(),
            minted: 0,
        }
    }

    /// Mints the next identifier.
    pub fn mint(&mut self) -> Iri {
        self.minted += 1;
        Iri::new(format!("{}{:016x}", self.namespace, self.rng.next_u64()))
    }

    /// Namespace minted identifiers live in.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of identifiers minted so far.
    #[must_use]
    pub fn minted(&self) -> u64 {
        self.minted
    }
}

// =============================================================================
// EvalContext
// =============================================================================

/// Everything an expression sees while it is evaluated.
pub struct EvalContext<'a> {
    current: Term,
    /// Slot attribute -> value for this solution; `None` marks an absent fact.
    bindings: BTreeMap<Iri, Option<Term>>,
    registry: &'a RegistrySnapshot,
    minter: &'a mut IdMinter,
    depth: usize,
}

impl<'a> EvalContext<'a> {
    /// Creates a context for one individual.
    pub fn new(current: Term, registry: &'a RegistrySnapshot, minter: &'a mut IdMinter) -> Self {
        Self {
            current,
            bindings: BTreeMap::new(),
            registry,
            minter,
            depth: 0,
        }
    }

    /// Sets the slot bindings of this solution.
    #[must_use]
    pub fn with_bindings(mut self, bindings: BTreeMap<Iri, Option<Term>>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replaces the slot bindings, keeping the current individual.
    pub fn bind(&mut self, bindings: BTreeMap<Iri, Option<Term>>) {
        self.bindings = bindings;
    }

    /// The individual being processed.
    #[must_use]
    pub fn current(&self) -> &Term {
        &self.current
    }

    /// The registry snapshot functions resolve against.
    #[must_use]
    pub fn registry(&self) -> &RegistrySnapshot {
        self.registry
    }

    /// The identifier minter.
    pub fn minter(&mut self) -> &mut IdMinter {
        &mut *self.minter
    }

    /// Resolves a resource reference.
    ///
    /// Slot attributes resolve to their bound value (possibly absent);
    /// anything else is a constant resource.
    #[must_use]
    pub fn resolve(&self, reference: &Iri) -> Option<Term> {
        match self.bindings.get(reference) {
            Some(bound) => bound.clone(),
            None => Some(Term::Iri(reference.clone())),
        }
    }

    /// A child context for evaluating a synonym body.
    fn child(&mut self, bindings: BTreeMap<Iri, Option<Term>>) -> EvalContext<'_> {
        EvalContext {
            current: self.current.clone(),
            bindings,
            registry: self.registry,
            minter: &mut *self.minter,
            depth: self.depth + 1,
        }
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Evaluated argument values handed to an implementation.
pub struct Arguments<'s> {
    signature: &'s FunctionSignature,
    values: Vec<Vec<Option<Term>>>,
}

impl<'s> Arguments<'s> {
    /// Builds an argument list directly.
    #[must_use]
    pub fn new(signature: &'s FunctionSignature, values: Vec<Vec<Option<Term>>>) -> Self {
        Self { signature, values }
    }

    /// The called function.
    #[must_use]
    pub fn signature(&self) -> &FunctionSignature {
        self.signature
    }

    /// Every value of an argument, absent ones included.
    #[must_use]
    pub fn raw(&self, name: &str) -> &[Option<Term>] {
        self.signature
            .argument_index(name)
            .and_then(|i| self.values.get(i))
            .map_or(&[][..], Vec::as_slice)
    }

    /// First present value of an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.raw(name).iter().flatten().next()
    }

    /// Every present value of an argument.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<&Term> {
        self.raw(name).iter().flatten().collect()
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates a call tree.
///
/// # Errors
///
/// Returns an error if a function is not registered, an implementation
/// fails (division by zero, unparsable number), or nesting runs away.
pub fn evaluate(call: &Call, ctx: &mut EvalContext<'_>) -> Result<Option<Term>> {
    if ctx.depth > MAX_DEPTH {
        return Err(Error::internal(format!(
            "evaluation of {} nested deeper than {MAX_DEPTH}",
            call.name()
        )));
    }

    let sig = call.function();
    let mut values: Vec<Vec<Option<Term>>> = vec![Vec::new(); sig.arguments().len()];
    for (key, value) in call.entries() {
        let resolved = match value {
            CallValue::Literal(lit) => Some(Term::Literal(lit.clone())),
            CallValue::Resource(iri) => ctx.resolve(iri),
            CallValue::Call(nested) => evaluate(nested, ctx)?,
            CallValue::Current => Some(ctx.current.clone()),
        };
        if let Some(slot) = values.get_mut(key.index) {
            slot.push(resolved);
        }
    }

    for (arg, vals) in sig.arguments().iter().zip(values.iter_mut()) {
        if vals.iter().all(Option::is_none) {
            if let Some(default) = arg.default() {
                *vals = vec![Some(default.clone())];
            } else if !arg.is_optional() && !arg.is_vararg() {
                tracing::trace!(function = %sig.name(), argument = arg.name(), "absent input");
                return Ok(None);
            }
        }
    }

    let args = Arguments::new(sig, values);
    match ctx.registry.implementation(sig.name())? {
        Implementation::Native(native) => native(&args, ctx),
        Implementation::Synonym(synonym) => {
            let bindings = synonym
                .parameters()
                .iter()
                .map(|(name, attribute)| (attribute.clone(), args.get(name).cloned()))
                .collect();
            let mut child = ctx.child(bindings);
            evaluate(synonym.body(), &mut child)
        }
    }
}

/// Evaluates a filter; only a present `true` passes.
///
/// # Errors
///
/// Propagates evaluation failures.
pub fn passes(filter: &Call, ctx: &mut EvalContext<'_>) -> Result<bool> {
    Ok(evaluate(filter, ctx)?.and_then(|t| t.as_bool()) == Some(true))
}
