//! Function registry with copy-on-write snapshots.
//!
//! Readers take a [`RegistrySnapshot`] and keep resolving against it while
//! writers register new functions; a snapshot never observes a later
//! registration.

use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use im::OrdMap;
use ontobridge_foundation::{Error, Iri, Result, Term};
use parking_lot::RwLock;

use crate::call::Call;
use crate::eval::{Arguments, EvalContext};
use crate::native;
use crate::signature::FunctionSignature;
use crate::synonym::Synonym;

/// Native implementation of a function.
pub type NativeFn = fn(&Arguments<'_>, &mut EvalContext<'_>) -> Result<Option<Term>>;

/// How a registered function computes its result.
#[derive(Clone)]
pub enum Implementation {
    /// Built-in Rust code.
    Native(NativeFn),
    /// A saved call evaluated with its parameters bound.
    Synonym(Arc<Synonym>),
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => write!(f, "Native"),
            Self::Synonym(synonym) => write!(f, "Synonym({})", synonym.body()),
        }
    }
}

impl From<NativeFn> for Implementation {
    fn from(native: NativeFn) -> Self {
        Self::Native(native)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    signature: Arc<FunctionSignature>,
    implementation: Implementation,
}

// =============================================================================
// RegistrySnapshot
// =============================================================================

/// Immutable view of the registry at one point in time.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: Arc<OrdMap<Iri, Entry>>,
}

impl RegistrySnapshot {
    /// Looks up a signature.
    ///
    /// # Errors
    ///
    /// Returns an unknown function error if `name` is not registered.
    pub fn get_function(&self, name: &Iri) -> Result<Arc<FunctionSignature>> {
        self.entries
            .get(name)
            .map(|e| Arc::clone(&e.signature))
            .ok_or_else(|| Error::unknown_function(name.clone()))
    }

    /// Looks up an implementation.
    ///
    /// # Errors
    ///
    /// Returns an unknown function error if `name` is not registered.
    pub fn implementation(&self, name: &Iri) -> Result<Implementation> {
        self.entries
            .get(name)
            .map(|e| e.implementation.clone())
            .ok_or_else(|| Error::unknown_function(name.clone()))
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &Iri) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over registered signatures in name order.
    #[must_use]
    pub fn functions(&self) -> Functions {
        Functions {
            entries: Arc::clone(&self.entries),
            cursor: None,
        }
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Restartable iterator over a snapshot's signatures.
///
/// Holds its own snapshot, so registrations made while iterating are not
/// seen.
#[derive(Debug, Clone)]
pub struct Functions {
    entries: Arc<OrdMap<Iri, Entry>>,
    cursor: Option<Iri>,
}

impl Functions {
    /// Rewinds to the first signature.
    pub fn restart(&mut self) {
        self.cursor = None;
    }
}

impl Iterator for Functions {
    type Item = Arc<FunctionSignature>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match &self.cursor {
            None => self.entries.iter().next(),
            Some(last) => self
                .entries
                .range::<_, Iri>((Bound::Excluded(last), Bound::<&Iri>::Unbounded))
                .next(),
        };
        let (name, entry) = next?;
        self.cursor = Some(name.clone());
        Some(Arc::clone(&entry.signature))
    }
}

// =============================================================================
// FunctionRegistry
// =============================================================================

/// Shared registry of callable functions.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    current: RwLock<RegistrySnapshot>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in function library.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for (signature, native) in native::builtins() {
            registry.insert(signature, Implementation::Native(native));
        }
        registry
    }

    fn insert(&self, signature: FunctionSignature, implementation: Implementation) -> Arc<FunctionSignature> {
        let signature = Arc::new(signature);
        let mut current = self.current.write();
        let mut entries = (*current.entries).clone();
        let replaced = entries
            .insert(
                signature.name().clone(),
                Entry {
                    signature: Arc::clone(&signature),
                    implementation,
                },
            )
            .is_some();
        current.entries = Arc::new(entries);
        tracing::debug!(function = %signature.name(), replaced, "registered function");
        signature
    }

    /// Registers a function, replacing any entry of the same name.
    ///
    /// Snapshots taken earlier keep the previous entry.
    pub fn register(
        &self,
        signature: FunctionSignature,
        implementation: impl Into<Implementation>,
    ) -> Arc<FunctionSignature> {
        self.insert(signature, implementation.into())
    }

    /// Saves calls as a user-defined function.
    ///
    /// The synonym's dependencies include those of every synonym it uses,
    /// so they are transitive.
    ///
    /// # Errors
    ///
    /// Returns an error if no call is given or a function the calls use is
    /// not registered.
    pub fn register_synonym(&self, name: Iri, calls: &[&Call]) -> Result<Arc<FunctionSignature>> {
        let snapshot = self.snapshot();
        let mut inherited = Vec::new();
        for call in calls {
            for used in call.functions_used() {
                let signature = snapshot.get_function(&used)?;
                // Registered synonyms already carry their closure.
                inherited.extend(signature.dependencies().iter().cloned());
            }
        }
        let mut synonym = Call::derive_synonym(name, calls)?;
        for function in inherited {
            synonym.add_dependency(function);
        }
        let (signature, synonym) = synonym.into_parts();
        Ok(self.insert(signature, Implementation::Synonym(Arc::new(synonym))))
    }

    /// Looks up a signature in the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an unknown function error if `name` is not registered.
    pub fn get_function(&self, name: &Iri) -> Result<Arc<FunctionSignature>> {
        self.current.read().get_function(name)
    }

    /// Looks up an implementation in the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an unknown function error if `name` is not registered.
    pub fn implementation(&self, name: &Iri) -> Result<Implementation> {
        self.current.read().implementation(name)
    }

    /// Takes a snapshot; O(1).
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.current.read().clone()
    }

    /// Iterates over the signatures registered right now.
    #[must_use]
    pub fn functions(&self) -> Functions {
        self.snapshot().functions()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
