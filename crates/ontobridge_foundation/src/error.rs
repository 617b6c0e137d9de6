//! Error types for ontobridge.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! One error type serves every layer; aggregate failures carry their
//! individual causes in [`Error::suppressed`].

use std::fmt;

use thiserror::Error;

use crate::term::Iri;
use crate::types::ValueType;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for ontobridge operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
    /// Causes collected while building an aggregate error.
    pub suppressed: Vec<Error>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            suppressed: Vec::new(),
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Attaches suppressed causes.
    #[must_use]
    pub fn with_suppressed(mut self, causes: Vec<Error>) -> Self {
        self.suppressed.extend(causes);
        self
    }

    /// Creates a signature error (unknown or fixed argument, malformed declaration).
    #[must_use]
    pub fn signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Signature(message.into()))
    }

    /// Creates a type mismatch error for the named argument.
    #[must_use]
    pub fn type_mismatch(argument: impl Into<String>, expected: ValueType, actual: ValueType) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            argument: argument.into(),
            expected,
            actual,
        })
    }

    /// Creates a builder cycle error.
    #[must_use]
    pub fn recursion(function: Iri) -> Self {
        Self::new(ErrorKind::Recursion(function))
    }

    /// Creates a nesting policy error.
    #[must_use]
    pub fn nesting_policy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NestingPolicy(message.into()))
    }

    /// Creates a missing required argument error.
    #[must_use]
    pub fn missing_argument(function: Iri, argument: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRequiredArgument {
            function,
            argument: argument.into(),
        })
    }

    /// Creates the aggregate error raised by call construction.
    #[must_use]
    pub fn invalid_call(function: Iri, causes: Vec<Error>) -> Self {
        Self::new(ErrorKind::InvalidCall {
            function,
            count: causes.len(),
        })
        .with_suppressed(causes)
    }

    /// Creates an unknown function error.
    #[must_use]
    pub fn unknown_function(name: Iri) -> Self {
        Self::new(ErrorKind::UnknownFunction(name))
    }

    /// Creates a stale handle error.
    #[must_use]
    pub fn stale_handle(handle: impl Into<String>) -> Self {
        Self::new(ErrorKind::StaleHandle(handle.into()))
    }

    /// Creates a bridge validation error.
    #[must_use]
    pub fn bridge_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BridgeValidation(message.into()))
    }

    /// Creates a link resolution error between two groupings.
    #[must_use]
    pub fn link_resolution(from: Iri, to: Iri, candidates: Vec<Iri>) -> Self {
        Self::new(ErrorKind::LinkResolution {
            from,
            to,
            candidates,
        })
    }

    /// Creates a dependency error naming the dependents.
    #[must_use]
    pub fn dependency(context: impl Into<String>, dependents: Vec<String>) -> Self {
        Self::new(ErrorKind::Dependency {
            context: context.into(),
            dependents,
        })
    }

    /// Creates a template synthesis error.
    #[must_use]
    pub fn template_synthesis(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TemplateSynthesis(message.into()))
    }

    /// Wraps a failure raised while executing a rule.
    #[must_use]
    pub fn rule_execution(rule: impl Into<String>, individual: impl Into<String>, cause: Error) -> Self {
        Self::new(ErrorKind::RuleExecution {
            rule: rule.into(),
            individual: individual.into(),
            cause: Box::new(cause),
        })
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an aborted-run error.
    #[must_use]
    pub fn aborted() -> Self {
        Self::new(ErrorKind::Aborted)
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns every leaf error, flattening aggregates.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Error> {
        if self.suppressed.is_empty() {
            return vec![self];
        }
        self.suppressed.iter().flat_map(Error::leaves).collect()
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Unknown or non-assignable argument, or a malformed signature.
    #[error("signature error: {0}")]
    Signature(String),

    /// Type lattice rejection.
    #[error("type mismatch on argument {argument}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The offending argument.
        argument: String,
        /// The declared type.
        expected: ValueType,
        /// The type that was supplied.
        actual: ValueType,
    },

    /// A builder would become reachable from itself.
    #[error("builder cycle: {0} would contain itself")]
    Recursion(Iri),

    /// Function cannot be nested, or host cannot accept nested calls.
    #[error("nesting policy: {0}")]
    NestingPolicy(String),

    /// A required argument has neither a value nor a default.
    #[error("missing required argument {argument} of {function}")]
    MissingRequiredArgument {
        /// The function being built.
        function: Iri,
        /// The unbound argument.
        argument: String,
    },

    /// Aggregate of every problem found while building a call.
    #[error("invalid call to {function}: {count} problem(s)")]
    InvalidCall {
        /// The function being built.
        function: Iri,
        /// Number of suppressed causes.
        count: usize,
    },

    /// No function is registered under this name.
    #[error("unknown function: {0}")]
    UnknownFunction(Iri),

    /// A builder handle was released or never existed.
    #[error("stale handle: {0}")]
    StaleHandle(String),

    /// Wrong function class or attribute for a bridge.
    #[error("bridge validation: {0}")]
    BridgeValidation(String),

    /// Absent or ambiguous relational link between groupings.
    #[error("{}", describe_link(.from, .to, .candidates))]
    LinkResolution {
        /// Grouping the link starts from.
        from: Iri,
        /// Grouping the link should reach.
        to: Iri,
        /// Candidate links found (empty when absent).
        candidates: Vec<Iri>,
    },

    /// Deleting a context that others depend on.
    #[error("context {context} is referenced by {}", .dependents.join(", "))]
    Dependency {
        /// The context whose deletion was refused.
        context: String,
        /// Contexts referencing it.
        dependents: Vec<String>,
    },

    /// A rule could not be turned into a template.
    #[error("template synthesis: {0}")]
    TemplateSynthesis(String),

    /// A rule failed while running; fatal for the run.
    #[error("rule {rule} failed on {individual}: {cause}")]
    RuleExecution {
        /// The rule identity.
        rule: String,
        /// The individual being processed.
        individual: String,
        /// The underlying failure.
        #[source]
        cause: Box<Error>,
    },

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// The run was aborted through its handle.
    #[error("run aborted")]
    Aborted,

    /// Internal error (should not happen), or an evaluation failure.
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe_link(from: &Iri, to: &Iri, candidates: &[Iri]) -> String {
    if candidates.is_empty() {
        format!("no link connects {from} and {to}")
    } else {
        let names: Vec<&str> = candidates.iter().map(Iri::as_str).collect();
        format!(
            "ambiguous link between {from} and {to}: {}",
            names.join(", ")
        )
    }
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Maximum rule executions per run exceeded.
    MaxExecutions {
        /// The configured limit.
        limit: usize,
        /// Additional context about which rule caused the issue.
        context: Option<String>,
    },
    /// Maximum propagation generations exceeded.
    MaxPropagationDepth {
        /// The configured limit.
        limit: usize,
        /// The individual that was about to exceed it.
        individual: Option<String>,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxExecutions { limit, context } => {
                write!(f, "max executions ({limit}) exceeded")?;
                if let Some(ctx) = context {
                    write!(f, ": {ctx}")?;
                }
                Ok(())
            }
            Self::MaxPropagationDepth { limit, individual } => {
                write!(f, "max propagation depth ({limit}) exceeded")?;
                if let Some(ind) = individual {
                    write!(f, " at {ind}")?;
                }
                Ok(())
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule or context name.
    pub source: Option<String>,
    /// Stack of rule/function frames.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
