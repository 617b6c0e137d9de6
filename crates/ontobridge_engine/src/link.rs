//! Relational link discovery between groupings.

use std::collections::{BTreeMap, BTreeSet};

use ontobridge_foundation::{Error, Iri, Result};
use ontobridge_storage::{Ontology, SchemaOracle};

use crate::context::{Link, LinkDirection};

fn reaches(sides: &[Iri], groupings: &BTreeSet<Iri>) -> bool {
    sides.iter().any(|s| groupings.contains(s))
}

/// Every relational attribute connecting `from` and `to`, in property order.
///
/// A property whose range is a datatype is never a link. Forward wins when
/// a property connects the groupings both ways.
#[must_use]
pub fn candidate_links(ontology: &Ontology, from: &Iri, to: &Iri) -> Vec<Link> {
    let schema = ontology.graph();
    let from_groupings = ontology.groupings_of(from);
    let to_groupings = ontology.groupings_of(to);

    let mut found: BTreeMap<Iri, LinkDirection> = BTreeMap::new();
    for property in schema.attributes() {
        let ranges = schema.ranges(&property);
        if ranges.is_empty() || ranges.iter().any(|r| schema.is_datatype(r)) {
            continue;
        }
        let domains = schema.domains(&property);
        if reaches(&domains, &from_groupings) && reaches(&ranges, &to_groupings) {
            found.insert(property, LinkDirection::Forward);
        } else if reaches(&domains, &to_groupings) && reaches(&ranges, &from_groupings) {
            found.entry(property).or_insert(LinkDirection::Inverse);
        }
    }
    found
        .into_iter()
        .map(|(property, direction)| Link { property, direction })
        .collect()
}

/// Finds the unique relational attribute connecting two groupings.
///
/// # Errors
///
/// Returns a link resolution error when no attribute or more than one
/// attribute connects them; the ambiguous case names every candidate.
pub fn discover_link(ontology: &Ontology, from: &Iri, to: &Iri) -> Result<Link> {
    let mut candidates = candidate_links(ontology, from, to);
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(Error::link_resolution(from.clone(), to.clone(), Vec::new())),
        _ => Err(Error::link_resolution(
            from.clone(),
            to.clone(),
            candidates.into_iter().map(|l| l.property).collect(),
        )),
    }
}

/// Orients an explicitly named link between two groupings.
///
/// # Errors
///
/// Returns a bridge validation error if `property` does not connect them.
pub fn check_link(ontology: &Ontology, from: &Iri, to: &Iri, property: &Iri) -> Result<Link> {
    candidate_links(ontology, from, to)
        .into_iter()
        .find(|l| l.property == *property)
        .ok_or_else(|| Error::bridge_validation(format!("{property} does not connect {from} and {to}")))
}
