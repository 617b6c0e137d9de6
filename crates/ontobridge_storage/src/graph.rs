//! Triple storage with persistent indices.
//!
//! A [`Graph`] keeps every triple in an ordered set plus forward, reverse,
//! and predicate indices. All four are `im` collections, so cloning a graph
//! is O(1) and clones share structure until one side mutates.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use im::{OrdMap, OrdSet};
use ontobridge_foundation::{Iri, Term, Triple, vocab};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Version stamps are unique across all graphs in the process, so a cache
/// keyed by a stamp can never confuse two unrelated graphs.
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

// =============================================================================
// Traits
// =============================================================================

/// Read access to a set of triples.
///
/// Results are returned in term order so that callers iterate
/// deterministically.
pub trait GraphView {
    /// Returns every triple matching the pattern; `None` is a wildcard.
    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple>;

    /// Returns true if the triple is present.
    fn contains(&self, triple: &Triple) -> bool;

    /// Returns the number of distinct triples.
    fn len(&self) -> usize;

    /// Returns a stamp that changes whenever the contents change.
    fn version(&self) -> u64;

    /// Returns true if there are no triples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the objects of `subject predicate ?o`.
    fn objects(&self, subject: &Term, predicate: &Iri) -> Vec<Term> {
        self.triples_matching(Some(subject), Some(predicate), None)
            .into_iter()
            .map(|t| t.object)
            .collect()
    }

    /// Returns the subjects of `?s predicate object`.
    fn subjects(&self, predicate: &Iri, object: &Term) -> Vec<Term> {
        self.triples_matching(None, Some(predicate), Some(object))
            .into_iter()
            .map(|t| t.subject)
            .collect()
    }

    /// Returns the explicit types of a resource.
    fn types_of(&self, subject: &Term) -> Vec<Iri> {
        self.objects(subject, &Iri::new(vocab::RDF_TYPE))
            .into_iter()
            .filter_map(|o| o.as_iri().cloned())
            .collect()
    }

    /// Returns every resource that carries at least one explicit type.
    fn typed_individuals(&self) -> Vec<Term> {
        let typed: BTreeSet<Term> = self
            .triples_matching(None, Some(&Iri::new(vocab::RDF_TYPE)), None)
            .into_iter()
            .map(|t| t.subject)
            .collect();
        typed.into_iter().collect()
    }
}

/// Write access to a set of triples.
pub trait GraphStore: GraphView {
    /// Inserts a triple, returning true if it was not already present.
    fn insert(&mut self, triple: Triple) -> bool;

    /// Removes a triple, returning true if it was present.
    fn remove(&mut self, triple: &Triple) -> bool;

    /// Inserts every triple, returning how many were new.
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, triples: I) -> usize
    where
        Self: Sized,
    {
        triples
            .into_iter()
            .map(|t| usize::from(self.insert(t)))
            .sum()
    }
}

// =============================================================================
// Graph
// =============================================================================

type Index = OrdMap<Term, OrdMap<Iri, OrdSet<Term>>>;

/// An in-memory triple graph.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Graph {
    triples: OrdSet<Triple>,
    /// subject -> predicate -> objects
    forward: Index,
    /// object -> predicate -> subjects
    reverse: Index,
    /// predicate -> triples
    by_predicate: OrdMap<Iri, OrdSet<Triple>>,
    #[cfg_attr(feature = "serde", serde(skip, default = "next_version"))]
    version: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            triples: OrdSet::new(),
            forward: OrdMap::new(),
            reverse: OrdMap::new(),
            by_predicate: OrdMap::new(),
            version: next_version(),
        }
    }

    /// Creates a graph holding the given triples.
    #[must_use]
    pub fn from_triples<I: IntoIterator<Item = Triple>>(triples: I) -> Self {
        let mut graph = Self::new();
        graph.extend(triples);
        graph
    }

    /// Iterates over all triples in order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Returns triples present here but not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Graph) -> Vec<Triple> {
        self.triples
            .iter()
            .filter(|t| !other.triples.contains(*t))
            .cloned()
            .collect()
    }

    fn index_insert(index: &mut Index, key: &Term, predicate: &Iri, value: &Term) {
        index
            .entry(key.clone())
            .or_default()
            .entry(predicate.clone())
            .or_default()
            .insert(value.clone());
    }

    fn index_remove(index: &mut Index, key: &Term, predicate: &Iri, value: &Term) {
        let Some(by_pred) = index.get_mut(key) else {
            return;
        };
        if let Some(values) = by_pred.get_mut(predicate) {
            values.remove(value);
            if values.is_empty() {
                by_pred.remove(predicate);
            }
        }
        if by_pred.is_empty() {
            index.remove(key);
        }
    }
}

impl GraphView for Graph {
    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        match (subject, predicate, object) {
            (Some(s), Some(p), Some(o)) => {
                let triple = Triple::new(s.clone(), p.clone(), o.clone());
                if self.triples.contains(&triple) {
                    vec![triple]
                } else {
                    Vec::new()
                }
            }
            (Some(s), p, o) => self
                .forward
                .get(s)
                .into_iter()
                .flat_map(|by_pred| by_pred.iter())
                .filter(|(pred, _)| p.is_none_or(|p| p == *pred))
                .flat_map(|(pred, objects)| {
                    objects
                        .iter()
                        .filter(|obj| o.is_none_or(|o| o == *obj))
                        .map(|obj| Triple::new(s.clone(), pred.clone(), obj.clone()))
                })
                .collect(),
            (None, p, Some(o)) => {
                let mut found: Vec<Triple> = self
                    .reverse
                    .get(o)
                    .into_iter()
                    .flat_map(|by_pred| by_pred.iter())
                    .filter(|(pred, _)| p.is_none_or(|p| p == *pred))
                    .flat_map(|(pred, subjects)| {
                        subjects
                            .iter()
                            .map(|subj| Triple::new(subj.clone(), pred.clone(), o.clone()))
                    })
                    .collect();
                found.sort();
                found
            }
            (None, Some(p), None) => self
                .by_predicate
                .get(p)
                .map(|ts| ts.iter().cloned().collect())
                .unwrap_or_default(),
            (None, None, None) => self.triples.iter().cloned().collect(),
        }
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    fn len(&self) -> usize {
        self.triples.len()
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl GraphStore for Graph {
    fn insert(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }
        Self::index_insert(
            &mut self.forward,
            &triple.subject,
            &triple.predicate,
            &triple.object,
        );
        Self::index_insert(
            &mut self.reverse,
            &triple.object,
            &triple.predicate,
            &triple.subject,
        );
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .insert(triple.clone());
        self.triples.insert(triple);
        self.version = next_version();
        true
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        if self.triples.remove(triple).is_none() {
            return false;
        }
        Self::index_remove(
            &mut self.forward,
            &triple.subject,
            &triple.predicate,
            &triple.object,
        );
        Self::index_remove(
            &mut self.reverse,
            &triple.object,
            &triple.predicate,
            &triple.subject,
        );
        if let Some(ts) = self.by_predicate.get_mut(&triple.predicate) {
            ts.remove(triple);
            if ts.is_empty() {
                self.by_predicate.remove(&triple.predicate);
            }
        }
        self.version = next_version();
        true
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self::from_triples(iter)
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.triples == other.triples
    }
}

impl Eq for Graph {}
