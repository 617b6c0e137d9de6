//! Transitive attribute membership of groupings.
//!
//! A grouping's attribute set is the union of the attributes declared on it
//! and on every grouping reachable through super-grouping, equivalence, and
//! union-membership edges. Those edges may form cycles, so the walk is an
//! iterative worklist with a seen-set.
//!
//! Results are memoized per grouping. The memo table is stamped with the
//! schema version and cleared wholesale when the version moves.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ontobridge_foundation::{Iri, vocab};
use parking_lot::RwLock;

use crate::graph::Graph;
use crate::schema::SchemaOracle;

#[derive(Debug, Default)]
struct MembershipCache {
    version: u64,
    attributes: HashMap<Iri, Arc<BTreeSet<Iri>>>,
    groupings: HashMap<Iri, Arc<BTreeSet<Iri>>>,
}

impl MembershipCache {
    fn sync(&mut self, version: u64) {
        if self.version != version {
            if !self.attributes.is_empty() || !self.groupings.is_empty() {
                tracing::debug!(
                    old = self.version,
                    new = version,
                    "schema changed, clearing membership cache"
                );
            }
            self.attributes.clear();
            self.groupings.clear();
            self.version = version;
        }
    }
}

/// Memoized attribute and grouping closure over a schema.
#[derive(Debug, Default)]
pub struct ClassMembership {
    cache: RwLock<MembershipCache>,
}

impl ClassMembership {
    /// Creates an empty membership cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every attribute belonging to `grouping`.
    ///
    /// The root grouping is an implicit super-grouping of everything, so
    /// its label attribute is always a member.
    pub fn attributes_of<S: SchemaOracle + ?Sized>(
        &self,
        schema: &S,
        grouping: &Iri,
    ) -> Arc<BTreeSet<Iri>> {
        let version = schema.schema_version();
        {
            let cache = self.cache.read();
            if cache.version == version {
                if let Some(hit) = cache.attributes.get(grouping) {
                    return Arc::clone(hit);
                }
            }
        }

        let closure = self.groupings_of(schema, grouping);
        let mut attributes = BTreeSet::new();
        for member in closure.iter() {
            attributes.extend(schema.declared_attributes(member));
            if member.as_str() == vocab::OWL_THING {
                attributes.insert(Iri::new(vocab::RDFS_LABEL));
            }
        }
        let attributes = Arc::new(attributes);

        let mut cache = self.cache.write();
        cache.sync(version);
        cache
            .attributes
            .insert(grouping.clone(), Arc::clone(&attributes));
        attributes
    }

    /// Returns `grouping` and every grouping it inherits attributes from.
    pub fn groupings_of<S: SchemaOracle + ?Sized>(
        &self,
        schema: &S,
        grouping: &Iri,
    ) -> Arc<BTreeSet<Iri>> {
        let version = schema.schema_version();
        {
            let cache = self.cache.read();
            if cache.version == version {
                if let Some(hit) = cache.groupings.get(grouping) {
                    return Arc::clone(hit);
                }
            }
        }

        let root = Iri::new(vocab::OWL_THING);
        let mut seen = BTreeSet::new();
        let mut worklist = vec![grouping.clone(), root];
        while let Some(current) = worklist.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            worklist.extend(schema.super_groupings(&current));
            worklist.extend(schema.equivalent_groupings(&current));
            worklist.extend(
                schema
                    .unions_containing(&current)
                    .into_iter()
                    .filter(|u| *u != current),
            );
        }
        let closure = Arc::new(seen);

        let mut cache = self.cache.write();
        cache.sync(version);
        cache.groupings.insert(grouping.clone(), Arc::clone(&closure));
        closure
    }

    /// Returns true if `attribute` belongs to `grouping`.
    pub fn is_member<S: SchemaOracle + ?Sized>(
        &self,
        schema: &S,
        attribute: &Iri,
        grouping: &Iri,
    ) -> bool {
        self.attributes_of(schema, grouping).contains(attribute)
    }

    /// Returns true if `grouping` specializes (or equals) `ancestor`.
    pub fn specializes<S: SchemaOracle + ?Sized>(
        &self,
        schema: &S,
        grouping: &Iri,
        ancestor: &Iri,
    ) -> bool {
        self.groupings_of(schema, grouping).contains(ancestor)
    }

    /// Drops every memoized result.
    pub fn invalidate(&self) {
        let mut cache = self.cache.write();
        cache.attributes.clear();
        cache.groupings.clear();
    }

    /// Number of memoized attribute sets.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.read().attributes.len()
    }
}

// =============================================================================
// Ontology
// =============================================================================

/// A schema graph together with its membership cache.
///
/// Mutating the graph through [`Ontology::graph_mut`] moves its version, so
/// the next membership query recomputes.
#[derive(Debug, Default)]
pub struct Ontology {
    graph: Graph,
    membership: ClassMembership,
}

impl Ontology {
    /// Wraps a schema graph.
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            membership: ClassMembership::new(),
        }
    }

    /// Returns the schema graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the schema graph for mutation.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Returns the membership cache.
    #[must_use]
    pub fn membership(&self) -> &ClassMembership {
        &self.membership
    }

    /// Attributes belonging to a grouping.
    #[must_use]
    pub fn attributes_of(&self, grouping: &Iri) -> Arc<BTreeSet<Iri>> {
        self.membership.attributes_of(&self.graph, grouping)
    }

    /// Reflexive grouping closure.
    #[must_use]
    pub fn groupings_of(&self, grouping: &Iri) -> Arc<BTreeSet<Iri>> {
        self.membership.groupings_of(&self.graph, grouping)
    }

    /// Returns true if `attribute` belongs to `grouping`.
    #[must_use]
    pub fn is_member(&self, attribute: &Iri, grouping: &Iri) -> bool {
        self.membership.is_member(&self.graph, attribute, grouping)
    }

    /// Returns true if `grouping` specializes (or equals) `ancestor`.
    #[must_use]
    pub fn specializes(&self, grouping: &Iri, ancestor: &Iri) -> bool {
        self.membership.specializes(&self.graph, grouping, ancestor)
    }
}

impl Clone for Ontology {
    fn clone(&self) -> Self {
        Self::new(self.graph.clone())
    }
}

impl From<Graph> for Ontology {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}
