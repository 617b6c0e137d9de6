//! Contexts (class bridges) and their property bridges.
//!
//! A [`Context`] maps individuals of a source grouping onto individuals of a
//! target grouping. Its class rule produces (or locates) the target
//! individual; its property bridges derive attribute values on it.

use std::collections::BTreeMap;
use std::fmt;

use ontobridge_foundation::Iri;
use ontobridge_function::Call;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of a context within a mapping model.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(pub(crate) u32);

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context-{:04}", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifier of a property bridge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BridgeId {
    pub(crate) context: ContextId,
    pub(crate) index: u32,
}

impl BridgeId {
    /// The context owning the bridge.
    #[must_use]
    pub fn context(self) -> ContextId {
        self.context
    }
}

impl fmt::Debug for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/bridge-{:04}", self.context, self.index)
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Links
// =============================================================================

/// Which side of a link triple the first grouping sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkDirection {
    /// `first link second`
    Forward,
    /// `second link first`
    Inverse,
}

/// A relational attribute connecting two groupings.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    /// The connecting attribute.
    pub property: Iri,
    /// Orientation relative to the grouping the link was resolved from.
    pub direction: LinkDirection,
}

impl Link {
    /// A forward link.
    #[must_use]
    pub fn forward(property: Iri) -> Self {
        Self {
            property,
            direction: LinkDirection::Forward,
        }
    }

    /// An inverse link.
    #[must_use]
    pub fn inverse(property: Iri) -> Self {
        Self {
            property,
            direction: LinkDirection::Inverse,
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            LinkDirection::Forward => write!(f, "{}", self.property),
            LinkDirection::Inverse => write!(f, "^{}", self.property),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// How a context finds its target individual.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassMapping {
    /// Evaluate a target-producing call.
    Call(Call),
    /// Reuse the target the parent context derived for a linked individual.
    Related {
        /// Context whose target is reused.
        parent: ContextId,
        /// Link from this context's source to the parent's source.
        link: Link,
    },
}

/// The class rule of a context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassRule {
    /// Optional boolean filter.
    pub filter: Option<Call>,
    /// Target production.
    pub mapping: ClassMapping,
}

/// How a property bridge computes its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeMapping {
    /// Evaluate a value call.
    Call(Call),
    /// Point at the target another context derived for the same individual.
    Attached {
        /// The other context.
        context: ContextId,
        /// Orientation of the asserted link.
        direction: LinkDirection,
    },
}

/// An attribute-level rule of a context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyBridge {
    pub(crate) id: BridgeId,
    pub(crate) filter: Option<Call>,
    pub(crate) mapping: BridgeMapping,
    pub(crate) target_attribute: Iri,
}

impl PropertyBridge {
    /// Bridge identifier.
    #[must_use]
    pub fn id(&self) -> BridgeId {
        self.id
    }

    /// Optional boolean filter.
    #[must_use]
    pub fn filter(&self) -> Option<&Call> {
        self.filter.as_ref()
    }

    /// Value computation.
    #[must_use]
    pub fn mapping(&self) -> &BridgeMapping {
        &self.mapping
    }

    /// Attribute asserted on the target individual.
    #[must_use]
    pub fn target_attribute(&self) -> &Iri {
        &self.target_attribute
    }
}

// =============================================================================
// Context
// =============================================================================

/// A mapping from one source grouping to one target grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub(crate) id: ContextId,
    pub(crate) source: Iri,
    pub(crate) target: Iri,
    pub(crate) class_rule: Option<ClassRule>,
    pub(crate) bridges: BTreeMap<BridgeId, PropertyBridge>,
}

impl Context {
    pub(crate) fn new(id: ContextId, source: Iri, target: Iri) -> Self {
        Self {
            id,
            source,
            target,
            class_rule: None,
            bridges: BTreeMap::new(),
        }
    }

    /// Context identifier.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Source grouping.
    #[must_use]
    pub fn source(&self) -> &Iri {
        &self.source
    }

    /// Target grouping.
    #[must_use]
    pub fn target(&self) -> &Iri {
        &self.target
    }

    /// The class rule, if one is attached.
    #[must_use]
    pub fn class_rule(&self) -> Option<&ClassRule> {
        self.class_rule.as_ref()
    }

    /// Property bridges in creation order.
    pub fn bridges(&self) -> impl Iterator<Item = &PropertyBridge> {
        self.bridges.values()
    }

    /// Looks up a property bridge.
    #[must_use]
    pub fn bridge(&self, id: BridgeId) -> Option<&PropertyBridge> {
        self.bridges.get(&id)
    }

    /// Contexts this one structurally references.
    #[must_use]
    pub fn references(&self) -> Vec<ContextId> {
        let mut found = Vec::new();
        if let Some(ClassRule {
            mapping: ClassMapping::Related { parent, .. },
            ..
        }) = &self.class_rule
        {
            found.push(*parent);
        }
        for bridge in self.bridges.values() {
            if let BridgeMapping::Attached { context, .. } = bridge.mapping {
                if !found.contains(&context) {
                    found.push(context);
                }
            }
        }
        found
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} -> {})", self.id, self.source, self.target)
    }
}
