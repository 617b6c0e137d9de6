//! Compiled rules for the inference engine.
//!
//! A context's class rule and each of its property bridges compile to one
//! [`CompiledRule`] carrying its template, its slot attributes, and the
//! grouping whose individuals trigger it.

pub mod compiler;

pub use compiler::RuleCompiler;

use std::fmt;
use std::sync::Arc;

use ontobridge_foundation::{Iri, Term};
use ontobridge_function::Call;

use crate::context::{BridgeId, ContextId, Link};
use crate::template::RuleTemplate;

// =============================================================================
// Rule Identity
// =============================================================================

/// Identity of a compiled rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    /// The class rule of a context.
    Class(ContextId),
    /// A property bridge.
    Bridge(BridgeId),
}

impl RuleId {
    /// The context the rule belongs to.
    #[must_use]
    pub fn context(self) -> ContextId {
        match self {
            Self::Class(context) => context,
            Self::Bridge(bridge) => bridge.context(),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(context) => write!(f, "{context}/class"),
            Self::Bridge(bridge) => write!(f, "{bridge}"),
        }
    }
}

// =============================================================================
// Slots and Bodies
// =============================================================================

/// An attribute a rule reads, bound per execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    /// The attribute read.
    pub attribute: Iri,
    /// Value used when the fact is absent.
    pub default: Option<Term>,
}

/// What a compiled rule does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleBody {
    /// Produce target individuals with a target-producing call.
    Class {
        /// Optional boolean filter.
        filter: Option<Call>,
        /// Target-producing call.
        mapping: Call,
    },
    /// Type the target a parent context derived for a linked individual.
    Related {
        /// Optional boolean filter.
        filter: Option<Call>,
        /// Context whose targets are reused.
        parent: ContextId,
        /// Link from the individual to the parent's individuals.
        link: Link,
    },
    /// Derive an attribute value on the target individual.
    Attribute {
        /// Optional boolean filter.
        filter: Option<Call>,
        /// Value call.
        mapping: Call,
        /// Attribute asserted.
        attribute: Iri,
    },
    /// Link the targets two contexts derived for the same individual.
    Attached {
        /// Optional boolean filter.
        filter: Option<Call>,
        /// The other context.
        other: ContextId,
        /// The asserted link, oriented from this context's target.
        link: Link,
    },
}

impl RuleBody {
    /// The filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&Call> {
        match self {
            Self::Class { filter, .. }
            | Self::Related { filter, .. }
            | Self::Attribute { filter, .. }
            | Self::Attached { filter, .. } => filter.as_ref(),
        }
    }

    /// The expression evaluated per solution, if the body has one.
    #[must_use]
    pub fn expression(&self) -> Option<&Call> {
        match self {
            Self::Class { mapping, .. } | Self::Attribute { mapping, .. } => Some(mapping),
            Self::Related { .. } | Self::Attached { .. } => None,
        }
    }

    /// Returns true for bodies that assert types.
    #[must_use]
    pub fn derives_type(&self) -> bool {
        matches!(self, Self::Class { .. } | Self::Related { .. })
    }
}

// =============================================================================
// Compiled Rule
// =============================================================================

/// A rule ready for execution.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    /// Rule identity.
    pub id: RuleId,
    /// Grouping whose individuals trigger the rule.
    pub trigger: Iri,
    /// Grouping the rule's context maps onto.
    pub target_grouping: Iri,
    /// What the rule does.
    pub body: RuleBody,
    /// Shared template for the rule's shape.
    pub template: Arc<RuleTemplate>,
    /// Attributes read from the individual, in slot order.
    pub source_slots: Vec<Slot>,
    /// Attributes read from the target individual, in slot order.
    pub target_slots: Vec<Slot>,
}

impl CompiledRule {
    /// The context the rule belongs to.
    #[must_use]
    pub fn context(&self) -> ContextId {
        self.id.context()
    }

    /// Execution rank; type-deriving rules run first.
    #[must_use]
    pub fn rank(&self) -> u8 {
        u8::from(!self.body.derives_type())
    }

    /// Rank, then textual identity.
    #[must_use]
    pub fn order_key(&self) -> (u8, String) {
        (self.rank(), self.id.to_string())
    }
}
