//! Function signatures and their arguments.
//!
//! A [`FunctionSignature`] is the immutable descriptor of a function a
//! mapping may call: its name, return type, role, and ordered arguments.
//! The role is a closed sum type fixed at construction, so validation and
//! template synthesis match on it exhaustively.

use std::collections::BTreeSet;
use std::fmt;

use ontobridge_foundation::{Error, Iri, Result, Term, ValueType, vocab};

// =============================================================================
// Role and Origin
// =============================================================================

/// What a function's result is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionRole {
    /// Computes an attribute value.
    Value,
    /// Computes a filter condition (`xsd:boolean`).
    Boolean,
    /// Produces the target individual of a class rule.
    Target,
}

/// Where a function came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionOrigin {
    /// Shipped with the library.
    Builtin,
    /// Saved from a call at load time.
    UserDefined,
}

// =============================================================================
// Argument
// =============================================================================

/// A declared function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    name: String,
    value_type: ValueType,
    optional: bool,
    default: Option<Term>,
    vararg: bool,
    assignable: bool,
}

impl Argument {
    /// A required argument.
    #[must_use]
    pub fn required(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            optional: false,
            default: None,
            vararg: false,
            assignable: true,
        }
    }

    /// An optional argument.
    #[must_use]
    pub fn optional(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, value_type)
        }
    }

    /// Sets the value used when the argument is left unbound.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Term>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the argument as accepting any number of values.
    #[must_use]
    pub fn vararg(mut self) -> Self {
        self.vararg = true;
        self
    }

    /// Marks the argument as not assignable by callers.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.assignable = false;
        self
    }

    /// Argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Whether the argument may stay unbound.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Signature-level default value.
    #[must_use]
    pub fn default(&self) -> Option<&Term> {
        self.default.as_ref()
    }

    /// Whether repeated bindings accumulate.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        self.vararg
    }

    /// Whether callers may bind it.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        self.assignable
    }

    /// Whether an unbound argument makes a call incomplete.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.optional && !self.vararg && self.default.is_none()
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "[{}: {}", self.name, self.value_type)?;
        } else {
            write!(f, "{}: {}", self.name, self.value_type)?;
        }
        if self.vararg {
            write!(f, "...")?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        if self.optional {
            write!(f, "]")?;
        }
        Ok(())
    }
}

// =============================================================================
// FunctionSignature
// =============================================================================

/// Immutable descriptor of a callable function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: Iri,
    return_type: ValueType,
    role: FunctionRole,
    origin: FunctionOrigin,
    arguments: Vec<Argument>,
    can_be_nested: bool,
    can_have_nested: bool,
    dependencies: Vec<Iri>,
    description: Option<String>,
}

impl FunctionSignature {
    /// Starts declaring a function.
    #[must_use]
    pub fn builder(name: impl Into<Iri>, return_type: ValueType) -> SignatureBuilder {
        SignatureBuilder {
            signature: Self {
                name: name.into(),
                role: if return_type.is_boolean() {
                    FunctionRole::Boolean
                } else {
                    FunctionRole::Value
                },
                return_type,
                origin: FunctionOrigin::Builtin,
                arguments: Vec::new(),
                can_be_nested: true,
                can_have_nested: true,
                dependencies: Vec::new(),
                description: None,
            },
        }
    }

    /// Function identifier.
    #[must_use]
    pub fn name(&self) -> &Iri {
        &self.name
    }

    /// Declared return type.
    #[must_use]
    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    /// Function role.
    #[must_use]
    pub fn role(&self) -> FunctionRole {
        self.role
    }

    /// Function origin.
    #[must_use]
    pub fn origin(&self) -> FunctionOrigin {
        self.origin
    }

    /// Returns true for filter functions.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.role == FunctionRole::Boolean
    }

    /// Returns true for target-producing functions.
    #[must_use]
    pub fn is_target(&self) -> bool {
        self.role == FunctionRole::Target
    }

    /// Returns true for saved synonyms.
    #[must_use]
    pub fn is_user_defined(&self) -> bool {
        self.origin == FunctionOrigin::UserDefined
    }

    /// Ordered arguments.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Finds an argument by name.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Declaration index of an argument.
    #[must_use]
    pub fn argument_index(&self, name: &str) -> Option<usize> {
        self.arguments.iter().position(|a| a.name == name)
    }

    /// The vararg argument, if any.
    #[must_use]
    pub fn vararg(&self) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.vararg)
    }

    /// Whether this function may appear nested inside another call.
    #[must_use]
    pub fn can_be_nested(&self) -> bool {
        self.can_be_nested
    }

    /// Whether this function accepts nested calls as arguments.
    #[must_use]
    pub fn can_have_nested(&self) -> bool {
        self.can_have_nested
    }

    /// Functions referenced transitively by a saved synonym.
    #[must_use]
    pub fn dependencies(&self) -> &[Iri] {
        &self.dependencies
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the function declares the current-individual argument.
    #[must_use]
    pub fn declares_this(&self) -> bool {
        self.argument(vocab::THIS_ARGUMENT).is_some()
    }

    pub(crate) fn add_dependency(&mut self, function: Iri) {
        if !self.dependencies.contains(&function) {
            self.dependencies.push(function);
        }
    }
}

/// Returns true for types whose values name schema terms (classes,
/// datatypes, properties) rather than data.
#[must_use]
pub fn is_structural(value_type: &ValueType) -> bool {
    value_type.is_property() || matches!(value_type, ValueType::Class | ValueType::DatatypeClass)
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name.local_name())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

// =============================================================================
// SignatureBuilder
// =============================================================================

/// Collects the parts of a [`FunctionSignature`].
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    signature: FunctionSignature,
}

impl SignatureBuilder {
    /// Appends an argument.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.signature.arguments.push(argument);
        self
    }

    /// Marks the function as producing target individuals.
    #[must_use]
    pub fn target(mut self) -> Self {
        self.signature.role = FunctionRole::Target;
        if self.signature.return_type.is_any() {
            self.signature.return_type = ValueType::Resource;
        }
        self
    }

    /// Marks the function as a saved synonym.
    #[must_use]
    pub fn user_defined(mut self) -> Self {
        self.signature.origin = FunctionOrigin::UserDefined;
        self
    }

    /// Forbids nesting this function inside others.
    #[must_use]
    pub fn not_nestable(mut self) -> Self {
        self.signature.can_be_nested = false;
        self
    }

    /// Forbids nested calls as arguments.
    #[must_use]
    pub fn no_nested(mut self) -> Self {
        self.signature.can_have_nested = false;
        self
    }

    /// Records a dependency on another function.
    #[must_use]
    pub fn depends_on(mut self, function: Iri) -> Self {
        self.signature.add_dependency(function);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.signature.description = Some(text.into());
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// Returns a signature error if two arguments share a name or more than
    /// one argument is a vararg.
    pub fn build(self) -> Result<FunctionSignature> {
        let sig = &self.signature;
        let mut names = BTreeSet::new();
        for arg in &sig.arguments {
            if !names.insert(arg.name.as_str()) {
                return Err(Error::signature(format!(
                    "{}: duplicate argument {}",
                    sig.name, arg.name
                )));
            }
        }
        if sig.arguments.iter().filter(|a| a.vararg).count() > 1 {
            return Err(Error::signature(format!(
                "{}: more than one vararg argument",
                sig.name
            )));
        }
        Ok(self.signature)
    }

    /// Finishes a declaration known to be well-formed.
    pub(crate) fn build_trusted(self) -> FunctionSignature {
        debug_assert!(self.clone().build().is_ok());
        self.signature
    }
}
