//! Read-only composition of several graphs.

use std::collections::BTreeSet;

use ontobridge_foundation::{Iri, Term, Triple};

use crate::graph::GraphView;

/// Flattens several views into one; duplicate triples collapse.
///
/// Used to let a run see source data, already-derived target data, and
/// schema facts through a single queryable view.
#[derive(Default)]
pub struct UnionView<'a> {
    parts: Vec<&'a dyn GraphView>,
}

impl<'a> UnionView<'a> {
    /// Creates an empty union.
    #[must_use]
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Adds a view to the union.
    #[must_use]
    pub fn with(mut self, part: &'a dyn GraphView) -> Self {
        self.parts.push(part);
        self
    }

    /// Adds a view to the union in place.
    pub fn push(&mut self, part: &'a dyn GraphView) {
        self.parts.push(part);
    }

    /// Returns the number of composed views.
    #[must_use]
    pub fn parts(&self) -> usize {
        self.parts.len()
    }
}

impl GraphView for UnionView<'_> {
    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        let merged: BTreeSet<Triple> = self
            .parts
            .iter()
            .flat_map(|part| part.triples_matching(subject, predicate, object))
            .collect();
        merged.into_iter().collect()
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.parts.iter().any(|part| part.contains(triple))
    }

    fn len(&self) -> usize {
        self.triples_matching(None, None, None).len()
    }

    fn version(&self) -> u64 {
        self.parts
            .iter()
            .fold(0u64, |acc, part| acc.wrapping_mul(31).wrapping_add(part.version()))
    }
}
