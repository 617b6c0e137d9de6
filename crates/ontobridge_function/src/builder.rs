//! Mutable call builders held in a generational arena.
//!
//! Builders reference nested builders by [`BuilderId`] handle rather than
//! by ownership, so cycle detection walks handles and no reference cycle can
//! form. Ownership of a subtree is acquired only when [`BuilderArena::build`]
//! turns it into an immutable [`Call`].

// Allow usize to u32 casts - arenas never hold four billion builders
#![allow(clippy::cast_possible_truncation)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use ontobridge_foundation::{Error, Iri, Literal, Result, vocab};

use crate::call::{ArgumentKey, Call, CallValue};
use crate::registry::FunctionRegistry;
use crate::signature::{Argument, FunctionSignature};

/// Generation-stamped handle to a builder.
///
/// Odd generations are live; releasing a builder bumps the generation so
/// outstanding handles go stale.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuilderId {
    index: u32,
    generation: u32,
}

impl fmt::Debug for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "builder#{}.{}", self.index, self.generation)
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A value supplied to [`BuilderArena::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgInput {
    /// A literal constant.
    Literal(Literal),
    /// An attribute or constant resource reference.
    Resource(Iri),
    /// The individual currently being processed.
    Current,
}

impl From<Literal> for ArgInput {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl From<Iri> for ArgInput {
    fn from(value: Iri) -> Self {
        Self::Resource(value)
    }
}

#[derive(Debug, Clone)]
enum Binding {
    Value(CallValue),
    Nested(BuilderId),
}

#[derive(Debug, Clone)]
struct CallBuilder {
    function: Arc<FunctionSignature>,
    bindings: BTreeMap<ArgumentKey, Binding>,
}

impl CallBuilder {
    fn nested(&self) -> impl Iterator<Item = BuilderId> + '_ {
        self.bindings.values().filter_map(|b| match b {
            Binding::Nested(id) => Some(*id),
            Binding::Value(_) => None,
        })
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    builder: Option<CallBuilder>,
}

/// Arena of call builders.
///
/// Not safe for concurrent mutation; `Call`s built from it are.
#[derive(Debug, Default)]
pub struct BuilderArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl BuilderArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a function.
    pub fn create(&mut self, function: Arc<FunctionSignature>) -> BuilderId {
        let builder = CallBuilder {
            function,
            bindings: BTreeMap::new(),
        };
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.builder = Some(builder);
            BuilderId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                builder: Some(builder),
            });
            BuilderId {
                index,
                generation: 1,
            }
        }
    }

    /// Creates a builder for a registered function.
    ///
    /// # Errors
    ///
    /// Returns an error if no function is registered under `name`.
    pub fn create_named(&mut self, registry: &FunctionRegistry, name: &Iri) -> Result<BuilderId> {
        let function = registry.get_function(name)?;
        Ok(self.create(function))
    }

    /// Returns true if the handle refers to a live builder.
    #[must_use]
    pub fn is_live(&self, id: BuilderId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|s| s.generation == id.generation && s.builder.is_some())
    }

    /// Number of live builders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.builder.is_some()).count()
    }

    /// Returns true if no builder is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The function a builder calls.
    ///
    /// # Errors
    ///
    /// Returns a stale handle error if the builder was released.
    pub fn function(&self, id: BuilderId) -> Result<&Arc<FunctionSignature>> {
        Ok(&self.get(id)?.function)
    }

    fn get(&self, id: BuilderId) -> Result<&CallBuilder> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.builder.as_ref())
            .ok_or_else(|| Error::stale_handle(id.to_string()))
    }

    fn get_mut(&mut self, id: BuilderId) -> Result<&mut CallBuilder> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.builder.as_mut())
            .ok_or_else(|| Error::stale_handle(id.to_string()))
    }

    /// Resolves an argument name to its index, checking assignability.
    fn assignable(function: &FunctionSignature, name: &str) -> Result<(usize, Argument)> {
        let index = function.argument_index(name).ok_or_else(|| {
            Error::signature(format!("{} has no argument {name}", function.name()))
        })?;
        let arg = function.arguments()[index].clone();
        if !arg.is_assignable() {
            return Err(Error::signature(format!(
                "argument {name} of {} is not assignable",
                function.name()
            )));
        }
        Ok((index, arg))
    }

    /// Key for the next binding of an argument.
    ///
    /// Vararg bindings accumulate at the next unused position.
    fn next_key(builder: &CallBuilder, index: usize, arg: &Argument) -> ArgumentKey {
        if !arg.is_vararg() {
            return ArgumentKey::single(index);
        }
        let position = builder
            .bindings
            .range(ArgumentKey::single(index)..ArgumentKey::single(index + 1))
            .next_back()
            .map_or(0, |(k, _)| k.position + 1);
        ArgumentKey { index, position }
    }

    /// Binds a literal, resource reference, or the current individual.
    ///
    /// Literal types are checked against the lattice here; resource
    /// references are checked later against a schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale, the argument is unknown or
    /// not assignable, or a literal does not fit the declared type.
    pub fn add(&mut self, id: BuilderId, name: &str, value: impl Into<ArgInput>) -> Result<ArgumentKey> {
        let value = value.into();
        let builder = self.get_mut(id)?;
        let (index, arg) = Self::assignable(&builder.function, name)?;

        let bound = match value {
            ArgInput::Literal(lit) => {
                let actual = lit.value_type();
                if !arg.value_type().accepts(&actual) {
                    return Err(Error::type_mismatch(name, arg.value_type().clone(), actual));
                }
                CallValue::Literal(lit)
            }
            ArgInput::Resource(iri) => CallValue::Resource(iri),
            ArgInput::Current => CallValue::Current,
        };

        let key = Self::next_key(builder, index, &arg);
        builder.bindings.insert(key, Binding::Value(bound));
        Ok(key)
    }

    /// Binds a nested builder to an argument.
    ///
    /// # Errors
    ///
    /// Returns an error if either handle is stale, the argument is unknown
    /// or not assignable, the nesting would create a cycle, the nesting
    /// policy forbids it, or the nested return type does not fit.
    pub fn add_nested(&mut self, id: BuilderId, name: &str, nested: BuilderId) -> Result<ArgumentKey> {
        self.test_add_nested(id, nested)?;

        let nested_fn = Arc::clone(&self.get(nested)?.function);
        let host_fn = Arc::clone(&self.get(id)?.function);
        let (index, arg) = Self::assignable(&host_fn, name)?;

        if !host_fn.can_have_nested() {
            return Err(Error::nesting_policy(format!(
                "{} does not accept nested calls",
                host_fn.name()
            )));
        }
        if !nested_fn.can_be_nested() {
            return Err(Error::nesting_policy(format!(
                "{} cannot be nested",
                nested_fn.name()
            )));
        }
        if !arg.value_type().accepts(nested_fn.return_type()) {
            return Err(Error::type_mismatch(
                name,
                arg.value_type().clone(),
                nested_fn.return_type().clone(),
            ));
        }

        let builder = self.get_mut(id)?;
        let key = Self::next_key(builder, index, &arg);
        builder.bindings.insert(key, Binding::Nested(nested));
        Ok(key)
    }

    /// Checks that nesting `candidate` under `host` keeps the graph acyclic.
    ///
    /// Walks the candidate's transitive nested builders and fails if the
    /// host is among them.
    ///
    /// # Errors
    ///
    /// Returns a recursion error on a cycle, or a stale handle error.
    pub fn test_add_nested(&self, host: BuilderId, candidate: BuilderId) -> Result<()> {
        let host_fn = self.get(host)?.function.name().clone();
        self.get(candidate)?;

        let mut seen = BTreeSet::new();
        let mut stack = vec![candidate];
        while let Some(current) = stack.pop() {
            if current == host {
                return Err(Error::recursion(host_fn));
            }
            if !seen.insert(current) {
                continue;
            }
            // Stale handles cannot lead back to the host.
            if let Ok(builder) = self.get(current) {
                stack.extend(builder.nested());
            }
        }
        Ok(())
    }

    /// Removes every binding of an argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or the argument is unknown.
    pub fn remove(&mut self, id: BuilderId, name: &str) -> Result<bool> {
        let builder = self.get_mut(id)?;
        let index = builder.function.argument_index(name).ok_or_else(|| {
            Error::signature(format!("{} has no argument {name}", builder.function.name()))
        })?;
        let keys: Vec<ArgumentKey> = builder
            .bindings
            .range(ArgumentKey::single(index)..ArgumentKey::single(index + 1))
            .map(|(k, _)| *k)
            .collect();
        for key in &keys {
            builder.bindings.remove(key);
        }
        Ok(!keys.is_empty())
    }

    /// Removes every binding.
    ///
    /// # Errors
    ///
    /// Returns a stale handle error if the builder was released.
    pub fn clear(&mut self, id: BuilderId) -> Result<()> {
        self.get_mut(id)?.bindings.clear();
        Ok(())
    }

    /// Releases a builder; its handle and copies of it go stale.
    ///
    /// Returns false if the handle was already stale.
    pub fn release(&mut self, id: BuilderId) -> bool {
        if !self.is_live(id) {
            tracing::warn!(builder = %id, "release of stale builder handle");
            return false;
        }
        let slot = &mut self.slots[id.index as usize];
        slot.generation += 1;
        slot.builder = None;
        self.free_list.push(id.index);
        true
    }

    /// Builds an immutable call.
    ///
    /// Nested builders are built first; every failure anywhere in the tree
    /// is collected rather than stopping at the first. A target function
    /// that declares the current-individual argument gets it bound
    /// automatically. Unbound arguments take their default, stay unbound
    /// when optional, or are reported missing.
    ///
    /// # Errors
    ///
    /// Returns a stale handle error for a released builder, or a single
    /// [`ontobridge_foundation::ErrorKind::InvalidCall`] carrying every
    /// problem as a suppressed cause.
    pub fn build(&self, id: BuilderId) -> Result<Call> {
        let mut in_progress = BTreeSet::new();
        self.build_inner(id, &mut in_progress)
    }

    fn build_inner(&self, id: BuilderId, in_progress: &mut BTreeSet<BuilderId>) -> Result<Call> {
        let builder = self.get(id)?;
        let function = Arc::clone(&builder.function);
        if !in_progress.insert(id) {
            return Err(Error::recursion(function.name().clone()));
        }

        let mut problems = Vec::new();
        let mut arguments = BTreeMap::new();

        for (key, binding) in &builder.bindings {
            match binding {
                Binding::Value(value) => {
                    arguments.insert(*key, value.clone());
                }
                Binding::Nested(nested) => match self.build_inner(*nested, in_progress) {
                    Ok(call) => {
                        arguments.insert(*key, CallValue::Call(call));
                    }
                    Err(err) => problems.push(err),
                },
            }
        }
        in_progress.remove(&id);

        if function.is_target() {
            if let Some(index) = function.argument_index(vocab::THIS_ARGUMENT) {
                arguments
                    .entry(ArgumentKey::single(index))
                    .or_insert(CallValue::Current);
            }
        }

        for (index, arg) in function.arguments().iter().enumerate() {
            if arg.is_vararg() || arguments.contains_key(&ArgumentKey::single(index)) {
                continue;
            }
            if let Some(default) = arg.default() {
                arguments.insert(ArgumentKey::single(index), CallValue::from_term(default));
            } else if !arg.is_optional() {
                problems.push(Error::missing_argument(function.name().clone(), arg.name()));
            }
        }

        if problems.is_empty() {
            Ok(Call::from_parts(function, arguments))
        } else {
            Err(Error::invalid_call(function.name().clone(), problems))
        }
    }
}
